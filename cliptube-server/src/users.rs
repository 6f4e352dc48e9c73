use axum::routing::{get, patch, post};
use cliptube_core::{Credentials, NewPlainUser, UpdatedUser};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::ServerResult,
    schemas::{LoginSchema, RefreshSchema, RegisterSchema, UpdateAccountSchema, ValidatedJson},
    serialized::{Envelope, ToSerialized, TokenPair, User},
    Router,
};

#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    tag = "users",
    request_body = RegisterSchema,
    responses(
        (status = 201, body = User)
    )
)]
async fn register(
    context: ServerContext,
    ValidatedJson(body): ValidatedJson<RegisterSchema>,
) -> ServerResult<Envelope<User>> {
    let user = context
        .app
        .auth
        .register(NewPlainUser {
            username: body.username,
            email: body.email,
            password: body.password,
            full_name: body.full_name,
            avatar: body.avatar,
            cover_image: body.cover_image,
        })
        .await?;

    Ok(Envelope::created(
        user.to_serialized(),
        "User registered successfully",
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    tag = "users",
    request_body = LoginSchema,
    responses(
        (status = 200, body = TokenPair)
    )
)]
async fn login(
    context: ServerContext,
    ValidatedJson(body): ValidatedJson<LoginSchema>,
) -> ServerResult<Envelope<TokenPair>> {
    let tokens = context
        .app
        .auth
        .login(Credentials {
            username: body.username,
            password: body.password,
        })
        .await?;

    Ok(Envelope::ok(
        tokens.to_serialized(),
        "User logged in successfully",
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/refresh-token",
    tag = "users",
    request_body = RefreshSchema,
    responses(
        (status = 200, body = TokenPair)
    )
)]
async fn refresh_token(
    context: ServerContext,
    ValidatedJson(body): ValidatedJson<RefreshSchema>,
) -> ServerResult<Envelope<TokenPair>> {
    let tokens = context.app.auth.refresh(&body.refresh_token).await?;

    Ok(Envelope::ok(tokens.to_serialized(), "Access token refreshed"))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/logout",
    tag = "users",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200)
    )
)]
async fn logout(session: Session, context: ServerContext) -> ServerResult<Envelope<()>> {
    context.app.auth.logout(session.user.id).await?;

    Ok(Envelope::ok((), "User logged out successfully"))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/current-user",
    tag = "users",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = User)
    )
)]
async fn current_user(session: Session) -> Envelope<User> {
    Envelope::ok(session.user.to_serialized(), "Current user fetched")
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/update-account",
    tag = "users",
    request_body = UpdateAccountSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = User)
    )
)]
async fn update_account(
    session: Session,
    context: ServerContext,
    ValidatedJson(body): ValidatedJson<UpdateAccountSchema>,
) -> ServerResult<Envelope<User>> {
    let user = context
        .app
        .auth
        .update_user(UpdatedUser {
            id: session.user.id,
            full_name: body.full_name,
            email: body.email,
            avatar: body.avatar,
            cover_image: body.cover_image,
        })
        .await?;

    Ok(Envelope::ok(user.to_serialized(), "Account updated"))
}

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .route("/logout", post(logout))
        .route("/current-user", get(current_user))
        .route("/update-account", patch(update_account))
}
