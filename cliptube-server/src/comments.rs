use axum::{
    extract::{Path, Query},
    routing::{delete, get, patch, post},
};
use cliptube_core::listing::PageParams;

use crate::{
    auth::Session,
    context::ServerContext,
    errors::{parse_id, ServerResult},
    schemas::{CommentSchema, PageQuery, ValidatedJson},
    serialized::{Comment, CommentPage, Envelope, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/api/v1/comments/{videoId}",
    tag = "comments",
    params(PageQuery),
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = CommentPage)
    )
)]
async fn comments_by_video(
    _session: Session,
    context: ServerContext,
    Path(video_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ServerResult<Envelope<CommentPage>> {
    let video_id = parse_id(&video_id, "videoId")?;

    let page = context
        .app
        .comments
        .by_video(video_id, PageParams::new(query.page, query.limit))
        .await?;

    Ok(Envelope::ok(page.to_serialized(), "Comments fetched"))
}

#[utoipa::path(
    post,
    path = "/api/v1/comments/{videoId}",
    tag = "comments",
    request_body = CommentSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 201, body = Comment)
    )
)]
async fn add_comment(
    session: Session,
    context: ServerContext,
    Path(video_id): Path<String>,
    ValidatedJson(body): ValidatedJson<CommentSchema>,
) -> ServerResult<Envelope<Comment>> {
    let video_id = parse_id(&video_id, "videoId")?;

    let comment = context
        .app
        .comments
        .add(&session.user, video_id, body.content)
        .await?;

    Ok(Envelope::created(comment.to_serialized(), "Comment added"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/comments/c/{commentId}",
    tag = "comments",
    request_body = CommentSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Comment)
    )
)]
async fn update_comment(
    session: Session,
    context: ServerContext,
    Path(comment_id): Path<String>,
    ValidatedJson(body): ValidatedJson<CommentSchema>,
) -> ServerResult<Envelope<Comment>> {
    let comment_id = parse_id(&comment_id, "commentId")?;

    let comment = context
        .app
        .comments
        .update(&session.user, comment_id, body.content)
        .await?;

    Ok(Envelope::ok(comment.to_serialized(), "Comment updated"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/comments/c/{commentId}",
    tag = "comments",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200)
    )
)]
async fn delete_comment(
    session: Session,
    context: ServerContext,
    Path(comment_id): Path<String>,
) -> ServerResult<Envelope<()>> {
    let comment_id = parse_id(&comment_id, "commentId")?;
    context.app.comments.delete(&session.user, comment_id).await?;

    Ok(Envelope::ok((), "Comment deleted"))
}

pub fn router() -> Router {
    Router::new()
        .route("/:videoId", get(comments_by_video))
        .route("/:videoId", post(add_comment))
        .route("/c/:commentId", patch(update_comment))
        .route("/c/:commentId", delete(delete_comment))
}
