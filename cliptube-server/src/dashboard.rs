use axum::{extract::Path, routing::get};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::{parse_id, ServerResult},
    serialized::{ChannelStats, Envelope, ToSerialized, Video},
    Router,
};

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/stats/{channelId}",
    tag = "dashboard",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = ChannelStats)
    )
)]
async fn channel_stats(
    _session: Session,
    context: ServerContext,
    Path(channel_id): Path<String>,
) -> ServerResult<Envelope<ChannelStats>> {
    let channel_id = parse_id(&channel_id, "channelId")?;
    let stats = context.app.stats.channel(channel_id).await?;

    Ok(Envelope::ok(stats.to_serialized(), "Channel stats fetched"))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/videos/{channelId}",
    tag = "dashboard",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Video>)
    )
)]
async fn channel_videos(
    _session: Session,
    context: ServerContext,
    Path(channel_id): Path<String>,
) -> ServerResult<Envelope<Vec<Video>>> {
    let channel_id = parse_id(&channel_id, "channelId")?;
    let videos = context.app.videos.by_channel(channel_id).await?;

    Ok(Envelope::ok(videos.to_serialized(), "Channel videos fetched"))
}

pub fn router() -> Router {
    Router::new()
        .route("/stats/:channelId", get(channel_stats))
        .route("/videos/:channelId", get(channel_videos))
}
