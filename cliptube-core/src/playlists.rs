use std::sync::Arc;

use crate::{
    ContentError, Database, NewPlaylist, PlaylistData, PrimaryKey, UpdatedPlaylist, UserData,
};

/// Manages playlists and their ordered video membership
pub struct PlaylistManager<Db> {
    db: Arc<Db>,
}

impl<Db> PlaylistManager<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    /// Creates a playlist, optionally seeded with a first video
    pub async fn create(
        &self,
        owner: &UserData,
        name: String,
        description: Option<String>,
        first_video_id: Option<PrimaryKey>,
    ) -> Result<PlaylistData, ContentError> {
        if let Some(video_id) = first_video_id {
            // The seed video must exist before the playlist is created
            let _ = self.db.video_by_id(video_id).await?;
        }

        let playlist = self
            .db
            .create_playlist(NewPlaylist {
                owner_id: owner.id,
                name,
                description,
            })
            .await?;

        if let Some(video_id) = first_video_id {
            self.db.add_video_to_playlist(playlist.id, video_id).await?;
            return Ok(self.db.playlist_by_id(playlist.id).await?);
        }

        Ok(playlist)
    }

    pub async fn get(&self, playlist_id: PrimaryKey) -> Result<PlaylistData, ContentError> {
        Ok(self.db.playlist_by_id(playlist_id).await?)
    }

    pub async fn by_owner(&self, owner_id: PrimaryKey) -> Result<Vec<PlaylistData>, ContentError> {
        let _ = self.db.user_by_id(owner_id).await?;

        Ok(self.db.playlists_by_owner(owner_id).await?)
    }

    pub async fn update(
        &self,
        actor: &UserData,
        updated: UpdatedPlaylist,
    ) -> Result<PlaylistData, ContentError> {
        let playlist = self.db.playlist_by_id(updated.id).await?;

        if playlist.owner_id != actor.id {
            return Err(ContentError::NotOwner("playlist"));
        }

        Ok(self.db.update_playlist(updated).await?)
    }

    pub async fn delete(
        &self,
        actor: &UserData,
        playlist_id: PrimaryKey,
    ) -> Result<(), ContentError> {
        let playlist = self.db.playlist_by_id(playlist_id).await?;

        if playlist.owner_id != actor.id {
            return Err(ContentError::NotOwner("playlist"));
        }

        Ok(self.db.delete_playlist(playlist_id).await?)
    }

    /// Appends a video to the playlist. Re-adding is a conflict.
    pub async fn add_video(
        &self,
        actor: &UserData,
        playlist_id: PrimaryKey,
        video_id: PrimaryKey,
    ) -> Result<PlaylistData, ContentError> {
        let playlist = self.db.playlist_by_id(playlist_id).await?;

        if playlist.owner_id != actor.id {
            return Err(ContentError::NotOwner("playlist"));
        }

        let _ = self.db.video_by_id(video_id).await?;

        self.db.add_video_to_playlist(playlist_id, video_id).await?;
        Ok(self.db.playlist_by_id(playlist_id).await?)
    }

    /// Removes a video from the playlist. The membership row is all that
    /// goes away; the video and its hosted media are untouched.
    pub async fn remove_video(
        &self,
        actor: &UserData,
        playlist_id: PrimaryKey,
        video_id: PrimaryKey,
    ) -> Result<PlaylistData, ContentError> {
        let playlist = self.db.playlist_by_id(playlist_id).await?;

        if playlist.owner_id != actor.id {
            return Err(ContentError::NotOwner("playlist"));
        }

        self.db
            .remove_video_from_playlist(playlist_id, video_id)
            .await?;
        Ok(self.db.playlist_by_id(playlist_id).await?)
    }
}
