use async_trait::async_trait;
use thiserror::Error;

mod data;
pub use data::*;

mod pg;
pub use pg::*;

#[cfg(test)]
mod memory;
#[cfg(test)]
pub use memory::MemoryDatabase;

use crate::listing::{PageParams, Paginated, VideoListing};

pub type Result<T> = std::result::Result<T, DatabaseError>;
pub type BoxedDatabase = Box<dyn Database>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// An unknown or internal error happened with the database
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
    /// A resource already exists
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        /// The resource in question
        resource: &'static str,
        /// The field that is conflicting
        field: &'static str,
        /// The conflicting value
        value: String,
    },
    /// A resource in the database doesn't exist
    #[error("{resource}:{identifier} doesn't exist")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
}

/// Helper trait to reduce boilerplate
pub trait IntoDatabaseError {
    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError;
    fn conflict_or(self, resource: &'static str, field: &'static str, value: &str)
        -> DatabaseError;
    fn any(self) -> DatabaseError;
}

/// Represents a type that can fetch and store cliptube data
#[async_trait]
pub trait Database: Send + Sync + 'static {
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData>;
    async fn user_by_username(&self, username: &str) -> Result<UserData>;
    async fn user_by_email(&self, email: &str) -> Result<UserData>;
    async fn user_by_refresh_token(&self, token: &str) -> Result<UserData>;
    async fn create_user(&self, new_user: NewUser) -> Result<UserData>;
    async fn update_user(&self, updated_user: UpdatedUser) -> Result<UserData>;
    async fn set_refresh_token(&self, user_id: PrimaryKey, token: Option<String>) -> Result<()>;

    async fn video_by_id(&self, video_id: PrimaryKey) -> Result<VideoData>;
    async fn video_with_owner(&self, video_id: PrimaryKey) -> Result<VideoWithOwner>;
    async fn create_video(&self, new_video: NewVideo) -> Result<VideoData>;
    async fn update_video(&self, updated_video: UpdatedVideo) -> Result<VideoData>;
    async fn delete_video(&self, video_id: PrimaryKey) -> Result<()>;
    async fn set_video_published(&self, video_id: PrimaryKey, published: bool)
        -> Result<VideoData>;
    async fn list_videos(&self, listing: &VideoListing) -> Result<Paginated<VideoWithOwner>>;
    async fn videos_by_owner(&self, owner_id: PrimaryKey) -> Result<Vec<VideoData>>;

    /// Inserts a like if absent, returning whether a row was inserted.
    /// The unique constraint on (user, video) makes this atomic.
    async fn insert_video_like(&self, user_id: PrimaryKey, video_id: PrimaryKey) -> Result<bool>;
    async fn delete_video_like(&self, user_id: PrimaryKey, video_id: PrimaryKey) -> Result<bool>;
    async fn insert_comment_like(
        &self,
        user_id: PrimaryKey,
        comment_id: PrimaryKey,
    ) -> Result<bool>;
    async fn delete_comment_like(
        &self,
        user_id: PrimaryKey,
        comment_id: PrimaryKey,
    ) -> Result<bool>;
    async fn insert_tweet_like(&self, user_id: PrimaryKey, tweet_id: PrimaryKey) -> Result<bool>;
    async fn delete_tweet_like(&self, user_id: PrimaryKey, tweet_id: PrimaryKey) -> Result<bool>;
    async fn liked_videos(&self, user_id: PrimaryKey) -> Result<Vec<VideoData>>;

    async fn insert_subscription(
        &self,
        subscriber_id: PrimaryKey,
        channel_id: PrimaryKey,
    ) -> Result<bool>;
    async fn delete_subscription(
        &self,
        subscriber_id: PrimaryKey,
        channel_id: PrimaryKey,
    ) -> Result<bool>;
    async fn channel_subscribers(&self, channel_id: PrimaryKey) -> Result<Vec<UserData>>;
    async fn subscribed_channels(&self, subscriber_id: PrimaryKey) -> Result<Vec<UserData>>;

    async fn playlist_by_id(&self, playlist_id: PrimaryKey) -> Result<PlaylistData>;
    async fn playlists_by_owner(&self, owner_id: PrimaryKey) -> Result<Vec<PlaylistData>>;
    async fn create_playlist(&self, new_playlist: NewPlaylist) -> Result<PlaylistData>;
    async fn update_playlist(&self, updated_playlist: UpdatedPlaylist) -> Result<PlaylistData>;
    async fn delete_playlist(&self, playlist_id: PrimaryKey) -> Result<()>;
    async fn add_video_to_playlist(
        &self,
        playlist_id: PrimaryKey,
        video_id: PrimaryKey,
    ) -> Result<()>;
    async fn remove_video_from_playlist(
        &self,
        playlist_id: PrimaryKey,
        video_id: PrimaryKey,
    ) -> Result<()>;

    async fn tweet_by_id(&self, tweet_id: PrimaryKey) -> Result<TweetData>;
    async fn create_tweet(&self, new_tweet: NewTweet) -> Result<TweetData>;
    async fn update_tweet(&self, tweet_id: PrimaryKey, content: String) -> Result<TweetData>;
    async fn delete_tweet(&self, tweet_id: PrimaryKey) -> Result<()>;
    async fn tweets_by_owner(&self, owner_id: PrimaryKey) -> Result<Vec<TweetData>>;

    async fn comment_by_id(&self, comment_id: PrimaryKey) -> Result<CommentData>;
    async fn create_comment(&self, new_comment: NewComment) -> Result<CommentData>;
    async fn update_comment(&self, comment_id: PrimaryKey, content: String)
        -> Result<CommentData>;
    async fn delete_comment(&self, comment_id: PrimaryKey) -> Result<()>;
    async fn comments_by_video(
        &self,
        video_id: PrimaryKey,
        params: &PageParams,
    ) -> Result<Paginated<CommentData>>;

    /// Reduces a channel's videos and their likes into one summary record.
    /// A channel without videos yields a summary with every counter at zero.
    async fn channel_stats(&self, channel_id: PrimaryKey) -> Result<ChannelStatsData>;
}
