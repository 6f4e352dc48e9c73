use axum::{
    extract::Path,
    routing::{get, post},
};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::{parse_id, ServerResult},
    serialized::{Envelope, SubscriptionState, ToSerialized, User},
    Router,
};

#[utoipa::path(
    post,
    path = "/api/v1/subscriptions/c/{channelId}",
    tag = "subscriptions",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = SubscriptionState)
    )
)]
async fn toggle_subscription(
    session: Session,
    context: ServerContext,
    Path(channel_id): Path<String>,
) -> ServerResult<Envelope<SubscriptionState>> {
    let channel_id = parse_id(&channel_id, "channelId")?;

    let outcome = context
        .app
        .subscriptions
        .toggle(session.user.id, channel_id)
        .await?;

    Ok(Envelope::ok(outcome.to_serialized(), "Subscription toggled"))
}

#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/c/{channelId}",
    tag = "subscriptions",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<User>)
    )
)]
async fn channel_subscribers(
    _session: Session,
    context: ServerContext,
    Path(channel_id): Path<String>,
) -> ServerResult<Envelope<Vec<User>>> {
    let channel_id = parse_id(&channel_id, "channelId")?;
    let subscribers = context.app.subscriptions.subscribers(channel_id).await?;

    Ok(Envelope::ok(
        subscribers.to_serialized(),
        "Subscribers fetched",
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/u/{subscriberId}",
    tag = "subscriptions",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<User>)
    )
)]
async fn subscribed_channels(
    _session: Session,
    context: ServerContext,
    Path(subscriber_id): Path<String>,
) -> ServerResult<Envelope<Vec<User>>> {
    let subscriber_id = parse_id(&subscriber_id, "subscriberId")?;

    let channels = context
        .app
        .subscriptions
        .subscribed_channels(subscriber_id)
        .await?;

    Ok(Envelope::ok(
        channels.to_serialized(),
        "Subscribed channels fetched",
    ))
}

pub fn router() -> Router {
    Router::new()
        .route("/c/:channelId", post(toggle_subscription))
        .route("/c/:channelId", get(channel_subscribers))
        .route("/u/:subscriberId", get(subscribed_channels))
}
