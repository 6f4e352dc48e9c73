use axum::{
    extract::Path,
    routing::{delete, get, patch, post},
};
use cliptube_core::UpdatedPlaylist;

use crate::{
    auth::Session,
    context::ServerContext,
    errors::{parse_id, ServerResult},
    schemas::{NewPlaylistSchema, UpdatePlaylistSchema, ValidatedJson},
    serialized::{Envelope, Playlist, ToSerialized},
    Router,
};

#[utoipa::path(
    post,
    path = "/api/v1/playlists",
    tag = "playlists",
    request_body = NewPlaylistSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 201, body = Playlist)
    )
)]
async fn create_playlist(
    session: Session,
    context: ServerContext,
    ValidatedJson(body): ValidatedJson<NewPlaylistSchema>,
) -> ServerResult<Envelope<Playlist>> {
    let playlist = context
        .app
        .playlists
        .create(&session.user, body.name, body.description, body.video_id)
        .await?;

    Ok(Envelope::created(playlist.to_serialized(), "Playlist created"))
}

#[utoipa::path(
    get,
    path = "/api/v1/playlists/{playlistId}",
    tag = "playlists",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Playlist)
    )
)]
async fn playlist(
    _session: Session,
    context: ServerContext,
    Path(playlist_id): Path<String>,
) -> ServerResult<Envelope<Playlist>> {
    let playlist_id = parse_id(&playlist_id, "playlistId")?;
    let playlist = context.app.playlists.get(playlist_id).await?;

    Ok(Envelope::ok(playlist.to_serialized(), "Playlist fetched"))
}

#[utoipa::path(
    get,
    path = "/api/v1/playlists/user/{userId}",
    tag = "playlists",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Playlist>)
    )
)]
async fn playlists_by_user(
    _session: Session,
    context: ServerContext,
    Path(user_id): Path<String>,
) -> ServerResult<Envelope<Vec<Playlist>>> {
    let user_id = parse_id(&user_id, "userId")?;
    let playlists = context.app.playlists.by_owner(user_id).await?;

    Ok(Envelope::ok(playlists.to_serialized(), "Playlists fetched"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/playlists/{playlistId}",
    tag = "playlists",
    request_body = UpdatePlaylistSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Playlist)
    )
)]
async fn update_playlist(
    session: Session,
    context: ServerContext,
    Path(playlist_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdatePlaylistSchema>,
) -> ServerResult<Envelope<Playlist>> {
    let playlist_id = parse_id(&playlist_id, "playlistId")?;

    let playlist = context
        .app
        .playlists
        .update(
            &session.user,
            UpdatedPlaylist {
                id: playlist_id,
                name: body.name,
                description: body.description,
            },
        )
        .await?;

    Ok(Envelope::ok(playlist.to_serialized(), "Playlist updated"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/playlists/{playlistId}",
    tag = "playlists",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200)
    )
)]
async fn delete_playlist(
    session: Session,
    context: ServerContext,
    Path(playlist_id): Path<String>,
) -> ServerResult<Envelope<()>> {
    let playlist_id = parse_id(&playlist_id, "playlistId")?;
    context.app.playlists.delete(&session.user, playlist_id).await?;

    Ok(Envelope::ok((), "Playlist deleted"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/playlists/add/{videoId}/{playlistId}",
    tag = "playlists",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Playlist)
    )
)]
async fn add_video(
    session: Session,
    context: ServerContext,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> ServerResult<Envelope<Playlist>> {
    let video_id = parse_id(&video_id, "videoId")?;
    let playlist_id = parse_id(&playlist_id, "playlistId")?;

    let playlist = context
        .app
        .playlists
        .add_video(&session.user, playlist_id, video_id)
        .await?;

    Ok(Envelope::ok(
        playlist.to_serialized(),
        "Video added to playlist",
    ))
}

#[utoipa::path(
    patch,
    path = "/api/v1/playlists/remove/{videoId}/{playlistId}",
    tag = "playlists",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Playlist)
    )
)]
async fn remove_video(
    session: Session,
    context: ServerContext,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> ServerResult<Envelope<Playlist>> {
    let video_id = parse_id(&video_id, "videoId")?;
    let playlist_id = parse_id(&playlist_id, "playlistId")?;

    let playlist = context
        .app
        .playlists
        .remove_video(&session.user, playlist_id, video_id)
        .await?;

    Ok(Envelope::ok(
        playlist.to_serialized(),
        "Video removed from playlist",
    ))
}

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_playlist))
        .route("/:playlistId", get(playlist))
        .route("/:playlistId", patch(update_playlist))
        .route("/:playlistId", delete(delete_playlist))
        .route("/user/:userId", get(playlists_by_user))
        .route("/add/:videoId/:playlistId", patch(add_video))
        .route("/remove/:videoId/:playlistId", patch(remove_video))
}
