use axum::{
    extract::Path,
    routing::{get, post},
};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::{parse_id, ServerResult},
    serialized::{Envelope, LikeState, ToSerialized, Video},
    Router,
};

#[utoipa::path(
    post,
    path = "/api/v1/likes/toggle/v/{videoId}",
    tag = "likes",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = LikeState)
    )
)]
async fn toggle_video_like(
    session: Session,
    context: ServerContext,
    Path(video_id): Path<String>,
) -> ServerResult<Envelope<LikeState>> {
    let video_id = parse_id(&video_id, "videoId")?;

    let outcome = context
        .app
        .likes
        .toggle_video(session.user.id, video_id)
        .await?;

    Ok(Envelope::ok(outcome.to_serialized(), "Video like toggled"))
}

#[utoipa::path(
    post,
    path = "/api/v1/likes/toggle/c/{commentId}",
    tag = "likes",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = LikeState)
    )
)]
async fn toggle_comment_like(
    session: Session,
    context: ServerContext,
    Path(comment_id): Path<String>,
) -> ServerResult<Envelope<LikeState>> {
    let comment_id = parse_id(&comment_id, "commentId")?;

    let outcome = context
        .app
        .likes
        .toggle_comment(session.user.id, comment_id)
        .await?;

    Ok(Envelope::ok(outcome.to_serialized(), "Comment like toggled"))
}

#[utoipa::path(
    post,
    path = "/api/v1/likes/toggle/t/{tweetId}",
    tag = "likes",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = LikeState)
    )
)]
async fn toggle_tweet_like(
    session: Session,
    context: ServerContext,
    Path(tweet_id): Path<String>,
) -> ServerResult<Envelope<LikeState>> {
    let tweet_id = parse_id(&tweet_id, "tweetId")?;

    let outcome = context
        .app
        .likes
        .toggle_tweet(session.user.id, tweet_id)
        .await?;

    Ok(Envelope::ok(outcome.to_serialized(), "Tweet like toggled"))
}

#[utoipa::path(
    get,
    path = "/api/v1/likes/videos",
    tag = "likes",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Video>)
    )
)]
async fn liked_videos(
    session: Session,
    context: ServerContext,
) -> ServerResult<Envelope<Vec<Video>>> {
    let videos = context.app.likes.liked_videos(session.user.id).await?;

    Ok(Envelope::ok(videos.to_serialized(), "Liked videos fetched"))
}

pub fn router() -> Router {
    Router::new()
        .route("/toggle/v/:videoId", post(toggle_video_like))
        .route("/toggle/c/:commentId", post(toggle_comment_like))
        .route("/toggle/t/:tweetId", post(toggle_tweet_like))
        .route("/videos", get(liked_videos))
}
