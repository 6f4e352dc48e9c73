use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// The type used for primary keys in the database.
pub type PrimaryKey = i32;

/// A cliptube account
#[derive(Debug, Clone, FromRow)]
pub struct UserData {
    pub id: PrimaryKey,
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
    /// Set while the user has a live login, cleared on logout
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
}

#[derive(Debug, Default)]
pub struct UpdatedUser {
    pub id: PrimaryKey,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
}

/// An uploaded video and its hosted media references
#[derive(Debug, Clone, FromRow)]
pub struct VideoData {
    pub id: PrimaryKey,
    pub owner_id: PrimaryKey,
    pub title: String,
    pub description: String,
    /// Key of the video asset on the media host
    pub video_key: String,
    pub video_url: String,
    pub thumbnail_key: String,
    pub thumbnail_url: String,
    /// Duration in seconds, as reported by the media host
    pub duration: f64,
    pub views: i64,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewVideo {
    pub owner_id: PrimaryKey,
    pub title: String,
    pub description: String,
    pub video_key: String,
    pub video_url: String,
    pub thumbnail_key: String,
    pub thumbnail_url: String,
    pub duration: f64,
    pub published: bool,
}

#[derive(Debug, Default)]
pub struct UpdatedVideo {
    pub id: PrimaryKey,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_key: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// The owner fields projected into a video listing.
/// Only these three fields are ever exposed from the joined user.
#[derive(Debug, Clone)]
pub struct OwnerSummary {
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
}

/// A video with its owning user joined in.
/// The owner is None when the join found no matching user.
#[derive(Debug, Clone)]
pub struct VideoWithOwner {
    pub video: VideoData,
    pub owner: Option<OwnerSummary>,
}

/// An ordered collection of video references
#[derive(Debug, Clone)]
pub struct PlaylistData {
    pub id: PrimaryKey,
    pub owner_id: PrimaryKey,
    pub name: String,
    pub description: Option<String>,
    /// Video ids in playlist order
    pub video_ids: Vec<PrimaryKey>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewPlaylist {
    pub owner_id: PrimaryKey,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default)]
pub struct UpdatedPlaylist {
    pub id: PrimaryKey,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct TweetData {
    pub id: PrimaryKey,
    pub owner_id: PrimaryKey,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewTweet {
    pub owner_id: PrimaryKey,
    pub content: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct CommentData {
    pub id: PrimaryKey,
    pub owner_id: PrimaryKey,
    pub video_id: PrimaryKey,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewComment {
    pub owner_id: PrimaryKey,
    pub video_id: PrimaryKey,
    pub content: String,
}

/// The per-channel summary produced by the stats reduce
#[derive(Debug, Clone, Default, FromRow)]
pub struct ChannelStatsData {
    pub total_views: i64,
    pub total_videos: i64,
    pub total_likes: i64,
    pub total_subscribers: i64,
}
