use std::path::PathBuf;

use axum::{
    extract::{
        multipart::{Field, Multipart},
        DefaultBodyLimit, Path, Query,
    },
    routing::{delete, get, patch, post},
};
use cliptube_core::{
    listing::{PageParams, VideoListing},
    VideoEdit, VideoUpload,
};
use rand::{distributions::Alphanumeric, Rng};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::{parse_id, ServerError, ServerResult},
    schemas::VideoListQuery,
    serialized::{Envelope, ToSerialized, Video, VideoPage},
    Router,
};

/// Uploads carry whole video files, so these routes replace axum's
/// default 2 MB request body cap
const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

/// Writes an uploaded multipart field to a temporary file
async fn save_upload(field: Field<'_>) -> ServerResult<PathBuf> {
    let file_name = field.file_name().unwrap_or("upload").to_string();

    let bytes = field
        .bytes()
        .await
        .map_err(|e| ServerError::InvalidArgument(e.to_string()))?;

    let suffix: String = rand::thread_rng()
        .sample_iter(Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();

    let path = std::env::temp_dir().join(format!("cliptube-{suffix}-{file_name}"));

    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| ServerError::Unknown(e.to_string()))?;

    Ok(path)
}

async fn remove_upload(path: &std::path::Path) {
    let _ = tokio::fs::remove_file(path).await;
}

#[utoipa::path(
    get,
    path = "/api/v1/videos",
    tag = "videos",
    params(VideoListQuery),
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = VideoPage)
    )
)]
async fn list_videos(
    _session: Session,
    context: ServerContext,
    Query(query): Query<VideoListQuery>,
) -> ServerResult<Envelope<VideoPage>> {
    let owner_id = parse_id(&query.user_id, "userId")?;

    let listing = VideoListing::from_raw(
        owner_id,
        query.query,
        query.sort_by,
        query.sort_type,
        PageParams::new(query.page, query.limit),
    )?;

    let page = context.app.videos.list(listing).await?;

    Ok(Envelope::ok(page.to_serialized(), "Videos fetched"))
}

#[utoipa::path(
    post,
    path = "/api/v1/videos",
    tag = "videos",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 201, body = Video)
    )
)]
async fn publish_video(
    session: Session,
    context: ServerContext,
    mut multipart: Multipart,
) -> ServerResult<Envelope<Video>> {
    let mut title = None;
    let mut description = None;
    let mut published = true;
    let mut video_path = None;
    let mut thumbnail_path = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::InvalidArgument(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "title" => {
                title = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ServerError::InvalidArgument(e.to_string()))?,
                )
            }
            "description" => {
                description = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ServerError::InvalidArgument(e.to_string()))?,
                )
            }
            "published" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ServerError::InvalidArgument(e.to_string()))?;

                published = raw != "false";
            }
            "videoFile" => video_path = Some(save_upload(field).await?),
            "thumbnail" => thumbnail_path = Some(save_upload(field).await?),
            _ => continue,
        }
    }

    let title = title
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ServerError::InvalidArgument("title is required".to_string()))?;

    let video_path = video_path
        .ok_or_else(|| ServerError::InvalidArgument("videoFile is required".to_string()))?;

    let thumbnail_path = thumbnail_path
        .ok_or_else(|| ServerError::InvalidArgument("thumbnail is required".to_string()))?;

    let result = context
        .app
        .videos
        .publish(VideoUpload {
            owner_id: session.user.id,
            title,
            description: description.unwrap_or_default(),
            video_path: video_path.clone(),
            thumbnail_path: thumbnail_path.clone(),
            published,
        })
        .await;

    remove_upload(&video_path).await;
    remove_upload(&thumbnail_path).await;

    Ok(Envelope::created(
        result?.to_serialized(),
        "Video published successfully",
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/videos/{videoId}",
    tag = "videos",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Video)
    )
)]
async fn video(
    _session: Session,
    context: ServerContext,
    Path(video_id): Path<String>,
) -> ServerResult<Envelope<Video>> {
    let video_id = parse_id(&video_id, "videoId")?;
    let video = context.app.videos.get(video_id).await?;

    Ok(Envelope::ok(video.to_serialized(), "Video fetched"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/videos/{videoId}",
    tag = "videos",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Video)
    )
)]
async fn update_video(
    session: Session,
    context: ServerContext,
    Path(video_id): Path<String>,
    mut multipart: Multipart,
) -> ServerResult<Envelope<Video>> {
    let video_id = parse_id(&video_id, "videoId")?;

    let mut edit = VideoEdit::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::InvalidArgument(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "title" => {
                edit.title = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ServerError::InvalidArgument(e.to_string()))?,
                )
            }
            "description" => {
                edit.description = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ServerError::InvalidArgument(e.to_string()))?,
                )
            }
            "thumbnail" => edit.new_thumbnail_path = Some(save_upload(field).await?),
            _ => continue,
        }
    }

    let thumbnail_path = edit.new_thumbnail_path.clone();
    let result = context.app.videos.update(&session.user, video_id, edit).await;

    if let Some(path) = thumbnail_path {
        remove_upload(&path).await;
    }

    Ok(Envelope::ok(result?.to_serialized(), "Video updated"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/videos/{videoId}",
    tag = "videos",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200)
    )
)]
async fn delete_video(
    session: Session,
    context: ServerContext,
    Path(video_id): Path<String>,
) -> ServerResult<Envelope<()>> {
    let video_id = parse_id(&video_id, "videoId")?;
    context.app.videos.delete(&session.user, video_id).await?;

    Ok(Envelope::ok((), "Video deleted"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/videos/toggle/publish/{videoId}",
    tag = "videos",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Video)
    )
)]
async fn toggle_publish(
    session: Session,
    context: ServerContext,
    Path(video_id): Path<String>,
) -> ServerResult<Envelope<Video>> {
    let video_id = parse_id(&video_id, "videoId")?;

    let video = context
        .app
        .videos
        .toggle_publish(&session.user, video_id)
        .await?;

    Ok(Envelope::ok(
        video.to_serialized(),
        "Publish status toggled",
    ))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_videos))
        .route("/", post(publish_video))
        .route("/:videoId", get(video))
        .route("/:videoId", patch(update_video))
        .route("/:videoId", delete(delete_video))
        .route("/toggle/publish/:videoId", patch(toggle_publish))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
