//! All schemas that are exposed from endpoints are defined here
//! along with the [ToSerialized] impls

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use cliptube_core::{
    listing::Paginated, AuthTokens, ChannelStatsData, CommentData, OwnerSummary, PlaylistData,
    ToggleOutcome, TweetData, UserData, VideoData, VideoWithOwner,
};
use serde::Serialize;
use utoipa::ToSchema;

/// Every successful response is wrapped in this envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    status_code: u16,
    data: T,
    message: String,
    success: bool,
}

impl<T> Envelope<T>
where
    T: Serialize,
{
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            data,
            message: message.into(),
            success: true,
        }
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::CREATED.as_u16(),
            data,
            message: message.into(),
            success: true,
        }
    }
}

impl<T> IntoResponse for Envelope<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: i32,
    username: String,
    email: String,
    full_name: String,
    avatar: Option<String>,
    cover_image: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    access_token: String,
    refresh_token: String,
    user: User,
}

/// The owner fields joined into a listed video
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    username: String,
    email: String,
    avatar: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    id: i32,
    owner_id: i32,
    owner: Option<Owner>,
    title: String,
    description: String,
    video_url: String,
    thumbnail_url: String,
    duration: f64,
    views: i64,
    published: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoPage {
    items: Vec<Video>,
    page: i64,
    limit: i64,
    total: i64,
    total_pages: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    id: i32,
    owner_id: i32,
    name: String,
    description: Option<String>,
    video_ids: Vec<i32>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    id: i32,
    owner_id: i32,
    content: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    id: i32,
    owner_id: i32,
    video_id: i32,
    content: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentPage {
    items: Vec<Comment>,
    page: i64,
    limit: i64,
    total: i64,
    total_pages: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    total_views: i64,
    total_videos: i64,
    total_likes: i64,
    total_subscribers: i64,
}

/// Which side a like toggle landed on
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeState {
    liked: bool,
}

/// Which side a subscription toggle landed on
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionState {
    subscribed: bool,
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl ToSerialized<User> for UserData {
    fn to_serialized(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            avatar: self.avatar.clone(),
            cover_image: self.cover_image.clone(),
            created_at: self.created_at,
        }
    }
}

impl ToSerialized<TokenPair> for AuthTokens {
    fn to_serialized(&self) -> TokenPair {
        TokenPair {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            user: self.user.to_serialized(),
        }
    }
}

impl ToSerialized<Owner> for OwnerSummary {
    fn to_serialized(&self) -> Owner {
        Owner {
            username: self.username.clone(),
            email: self.email.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

impl ToSerialized<Video> for VideoData {
    fn to_serialized(&self) -> Video {
        Video {
            id: self.id,
            owner_id: self.owner_id,
            owner: None,
            title: self.title.clone(),
            description: self.description.clone(),
            video_url: self.video_url.clone(),
            thumbnail_url: self.thumbnail_url.clone(),
            duration: self.duration,
            views: self.views,
            published: self.published,
            created_at: self.created_at,
        }
    }
}

impl ToSerialized<Video> for VideoWithOwner {
    fn to_serialized(&self) -> Video {
        let mut video = self.video.to_serialized();
        video.owner = self.owner.as_ref().map(|o| o.to_serialized());
        video
    }
}

impl ToSerialized<VideoPage> for Paginated<VideoWithOwner> {
    fn to_serialized(&self) -> VideoPage {
        VideoPage {
            items: self.items.to_serialized(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            total_pages: self.total_pages(),
        }
    }
}

impl ToSerialized<Playlist> for PlaylistData {
    fn to_serialized(&self) -> Playlist {
        Playlist {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name.clone(),
            description: self.description.clone(),
            video_ids: self.video_ids.clone(),
            created_at: self.created_at,
        }
    }
}

impl ToSerialized<Tweet> for TweetData {
    fn to_serialized(&self) -> Tweet {
        Tweet {
            id: self.id,
            owner_id: self.owner_id,
            content: self.content.clone(),
            created_at: self.created_at,
        }
    }
}

impl ToSerialized<Comment> for CommentData {
    fn to_serialized(&self) -> Comment {
        Comment {
            id: self.id,
            owner_id: self.owner_id,
            video_id: self.video_id,
            content: self.content.clone(),
            created_at: self.created_at,
        }
    }
}

impl ToSerialized<CommentPage> for Paginated<CommentData> {
    fn to_serialized(&self) -> CommentPage {
        CommentPage {
            items: self.items.to_serialized(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            total_pages: self.total_pages(),
        }
    }
}

impl ToSerialized<ChannelStats> for ChannelStatsData {
    fn to_serialized(&self) -> ChannelStats {
        ChannelStats {
            total_views: self.total_views,
            total_videos: self.total_videos,
            total_likes: self.total_likes,
            total_subscribers: self.total_subscribers,
        }
    }
}

impl ToSerialized<LikeState> for ToggleOutcome {
    fn to_serialized(&self) -> LikeState {
        LikeState {
            liked: matches!(self, ToggleOutcome::Created),
        }
    }
}

impl ToSerialized<SubscriptionState> for ToggleOutcome {
    fn to_serialized(&self) -> SubscriptionState {
        SubscriptionState {
            subscribed: matches!(self, ToggleOutcome::Created),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelopes_serialize_in_camel_case() {
        let envelope = Envelope::created(LikeState { liked: true }, "Video liked");
        let value = serde_json::to_value(&envelope).expect("serializes");

        assert_eq!(value["statusCode"], 201);
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "Video liked");
        assert_eq!(value["data"]["liked"], true);
    }

    #[test]
    fn toggle_outcomes_resolve_to_both_states() {
        let liked: LikeState = ToggleOutcome::Created.to_serialized();
        let unsubscribed: SubscriptionState = ToggleOutcome::Removed.to_serialized();

        assert!(liked.liked);
        assert!(!unsubscribed.subscribed);
    }
}
