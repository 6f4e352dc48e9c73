use std::path::PathBuf;
use std::sync::Arc;

use log::info;

use crate::{
    listing::{Paginated, VideoListing},
    ContentError, Database, MediaHost, MediaKind, NewVideo, PrimaryKey, UpdatedVideo, UserData,
    VideoData, VideoWithOwner,
};

/// Manages the video collection and its hosted media
pub struct VideoManager<Db, M> {
    db: Arc<Db>,
    media: Arc<M>,
}

/// A publish request: metadata plus the local paths of the uploaded files
#[derive(Debug)]
pub struct VideoUpload {
    pub owner_id: PrimaryKey,
    pub title: String,
    pub description: String,
    pub video_path: PathBuf,
    pub thumbnail_path: PathBuf,
    pub published: bool,
}

/// An edit to a video's metadata, optionally replacing the thumbnail
#[derive(Debug, Default)]
pub struct VideoEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub new_thumbnail_path: Option<PathBuf>,
}

impl<Db, M> VideoManager<Db, M>
where
    Db: Database,
    M: MediaHost,
{
    pub fn new(db: &Arc<Db>, media: &Arc<M>) -> Self {
        Self {
            db: db.clone(),
            media: media.clone(),
        }
    }

    /// Uploads both assets to the media host, then records the video
    pub async fn publish(&self, upload: VideoUpload) -> Result<VideoData, ContentError> {
        // The owner must exist before anything is uploaded
        let owner = self.db.user_by_id(upload.owner_id).await?;

        let video_file = self
            .media
            .upload(&upload.video_path, MediaKind::Video)
            .await?;

        let thumbnail = self
            .media
            .upload(&upload.thumbnail_path, MediaKind::Image)
            .await?;

        let video = self
            .db
            .create_video(NewVideo {
                owner_id: owner.id,
                title: upload.title,
                description: upload.description,
                video_key: video_file.key,
                video_url: video_file.url,
                thumbnail_key: thumbnail.key,
                thumbnail_url: thumbnail.url,
                duration: video_file.duration.unwrap_or_default(),
                published: upload.published,
            })
            .await?;

        info!("{} published video {}", owner.username, video.id);
        Ok(video)
    }

    /// Returns a video with its owner populated
    pub async fn get(&self, video_id: PrimaryKey) -> Result<VideoWithOwner, ContentError> {
        Ok(self.db.video_with_owner(video_id).await?)
    }

    /// Runs the listing pipeline. The owner must resolve to an existing
    /// user: an unknown owner is an error, never an empty page.
    pub async fn list(
        &self,
        listing: VideoListing,
    ) -> Result<Paginated<VideoWithOwner>, ContentError> {
        let _ = self.db.user_by_id(listing.owner_id).await?;

        Ok(self.db.list_videos(&listing).await?)
    }

    /// Updates a video's metadata, uploading a replacement thumbnail if given
    pub async fn update(
        &self,
        actor: &UserData,
        video_id: PrimaryKey,
        edit: VideoEdit,
    ) -> Result<VideoData, ContentError> {
        let video = self.db.video_by_id(video_id).await?;

        if video.owner_id != actor.id {
            return Err(ContentError::NotOwner("video"));
        }

        let mut updated = UpdatedVideo {
            id: video_id,
            title: edit.title,
            description: edit.description,
            ..Default::default()
        };

        if let Some(path) = edit.new_thumbnail_path {
            let thumbnail = self.media.upload(&path, MediaKind::Image).await?;
            updated.thumbnail_key = Some(thumbnail.key);
            updated.thumbnail_url = Some(thumbnail.url);
        }

        Ok(self.db.update_video(updated).await?)
    }

    /// Deletes a video and removes both of its assets from the media host.
    /// The database row goes first so a host failure can't resurrect it.
    pub async fn delete(&self, actor: &UserData, video_id: PrimaryKey) -> Result<(), ContentError> {
        let video = self.db.video_by_id(video_id).await?;

        if video.owner_id != actor.id {
            return Err(ContentError::NotOwner("video"));
        }

        self.db.delete_video(video_id).await?;

        self.media.delete(&video.video_key, MediaKind::Video).await?;
        self.media
            .delete(&video.thumbnail_key, MediaKind::Image)
            .await?;

        info!("{} deleted video {video_id}", actor.username);
        Ok(())
    }

    /// Flips the published flag
    pub async fn toggle_publish(
        &self,
        actor: &UserData,
        video_id: PrimaryKey,
    ) -> Result<VideoData, ContentError> {
        let video = self.db.video_by_id(video_id).await?;

        if video.owner_id != actor.id {
            return Err(ContentError::NotOwner("video"));
        }

        Ok(self
            .db
            .set_video_published(video_id, !video.published)
            .await?)
    }

    /// All videos uploaded by a channel
    pub async fn by_channel(&self, channel_id: PrimaryKey) -> Result<Vec<VideoData>, ContentError> {
        let _ = self.db.user_by_id(channel_id).await?;

        Ok(self.db.videos_by_owner(channel_id).await?)
    }
}
