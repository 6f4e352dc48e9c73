//! An in-memory [Database] used by the manager tests. It honors the same
//! contracts as the postgres implementation: unique (actor, target) pairs,
//! insertion-order ids, and the listing stage semantics.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::{
    listing::{PageParams, Paginated, SortDirection, SortField, Stage, VideoListing},
    ChannelStatsData, CommentData, Database, DatabaseError, NewComment, NewPlaylist, NewTweet,
    NewUser, NewVideo, OwnerSummary, PlaylistData, PrimaryKey, Result, TweetData, UpdatedPlaylist,
    UpdatedUser, UpdatedVideo, UserData, VideoData, VideoWithOwner,
};

#[derive(Default)]
struct State {
    next_id: PrimaryKey,
    users: Vec<UserData>,
    videos: Vec<VideoData>,
    playlists: Vec<PlaylistData>,
    tweets: Vec<TweetData>,
    comments: Vec<CommentData>,
    // relation rows in insertion order
    video_likes: Vec<(PrimaryKey, PrimaryKey)>,
    comment_likes: Vec<(PrimaryKey, PrimaryKey)>,
    tweet_likes: Vec<(PrimaryKey, PrimaryKey)>,
    subscriptions: Vec<(PrimaryKey, PrimaryKey)>,
}

impl State {
    fn next_id(&mut self) -> PrimaryKey {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryDatabase {
    state: Mutex<State>,
}

fn not_found(resource: &'static str, identifier: &'static str) -> DatabaseError {
    DatabaseError::NotFound {
        resource,
        identifier,
    }
}

fn toggle_insert(rows: &mut Vec<(PrimaryKey, PrimaryKey)>, pair: (PrimaryKey, PrimaryKey)) -> bool {
    if rows.contains(&pair) {
        return false;
    }

    rows.push(pair);
    true
}

fn toggle_delete(rows: &mut Vec<(PrimaryKey, PrimaryKey)>, pair: (PrimaryKey, PrimaryKey)) -> bool {
    let before = rows.len();
    rows.retain(|row| *row != pair);
    rows.len() != before
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData> {
        self.state
            .lock()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| not_found("user", "id"))
    }

    async fn user_by_username(&self, username: &str) -> Result<UserData> {
        self.state
            .lock()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| not_found("user", "username"))
    }

    async fn user_by_email(&self, email: &str) -> Result<UserData> {
        self.state
            .lock()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| not_found("user", "email"))
    }

    async fn user_by_refresh_token(&self, token: &str) -> Result<UserData> {
        self.state
            .lock()
            .users
            .iter()
            .find(|u| u.refresh_token.as_deref() == Some(token))
            .cloned()
            .ok_or_else(|| not_found("user", "refresh_token"))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserData> {
        let mut state = self.state.lock();

        if state.users.iter().any(|u| u.username == new_user.username) {
            return Err(DatabaseError::Conflict {
                resource: "user",
                field: "username",
                value: new_user.username,
            });
        }

        if state.users.iter().any(|u| u.email == new_user.email) {
            return Err(DatabaseError::Conflict {
                resource: "user",
                field: "email",
                value: new_user.email,
            });
        }

        let user = UserData {
            id: state.next_id(),
            username: new_user.username,
            email: new_user.email,
            password: new_user.password,
            full_name: new_user.full_name,
            avatar: new_user.avatar,
            cover_image: new_user.cover_image,
            refresh_token: None,
            created_at: Utc::now(),
        };

        state.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, updated_user: UpdatedUser) -> Result<UserData> {
        let mut state = self.state.lock();

        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == updated_user.id)
            .ok_or_else(|| not_found("user", "id"))?;

        if let Some(full_name) = updated_user.full_name {
            user.full_name = full_name;
        }
        if let Some(email) = updated_user.email {
            user.email = email;
        }
        if updated_user.avatar.is_some() {
            user.avatar = updated_user.avatar;
        }
        if updated_user.cover_image.is_some() {
            user.cover_image = updated_user.cover_image;
        }

        Ok(user.clone())
    }

    async fn set_refresh_token(&self, user_id: PrimaryKey, token: Option<String>) -> Result<()> {
        let mut state = self.state.lock();

        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| not_found("user", "id"))?;

        user.refresh_token = token;
        Ok(())
    }

    async fn video_by_id(&self, video_id: PrimaryKey) -> Result<VideoData> {
        self.state
            .lock()
            .videos
            .iter()
            .find(|v| v.id == video_id)
            .cloned()
            .ok_or_else(|| not_found("video", "id"))
    }

    async fn video_with_owner(&self, video_id: PrimaryKey) -> Result<VideoWithOwner> {
        let video = self.video_by_id(video_id).await?;
        let owner = self.user_by_id(video.owner_id).await.ok();

        Ok(VideoWithOwner {
            video,
            owner: owner.map(|u| OwnerSummary {
                username: u.username,
                email: u.email,
                avatar: u.avatar,
            }),
        })
    }

    async fn create_video(&self, new_video: NewVideo) -> Result<VideoData> {
        let mut state = self.state.lock();

        let video = VideoData {
            id: state.next_id(),
            owner_id: new_video.owner_id,
            title: new_video.title,
            description: new_video.description,
            video_key: new_video.video_key,
            video_url: new_video.video_url,
            thumbnail_key: new_video.thumbnail_key,
            thumbnail_url: new_video.thumbnail_url,
            duration: new_video.duration,
            views: 0,
            published: new_video.published,
            created_at: Utc::now(),
        };

        state.videos.push(video.clone());
        Ok(video)
    }

    async fn update_video(&self, updated_video: UpdatedVideo) -> Result<VideoData> {
        let mut state = self.state.lock();

        let video = state
            .videos
            .iter_mut()
            .find(|v| v.id == updated_video.id)
            .ok_or_else(|| not_found("video", "id"))?;

        if let Some(title) = updated_video.title {
            video.title = title;
        }
        if let Some(description) = updated_video.description {
            video.description = description;
        }
        if let Some(key) = updated_video.thumbnail_key {
            video.thumbnail_key = key;
        }
        if let Some(url) = updated_video.thumbnail_url {
            video.thumbnail_url = url;
        }

        Ok(video.clone())
    }

    async fn delete_video(&self, video_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.lock();

        if !state.videos.iter().any(|v| v.id == video_id) {
            return Err(not_found("video", "id"));
        }

        state.videos.retain(|v| v.id != video_id);
        state.video_likes.retain(|(_, target)| *target != video_id);
        state.comments.retain(|c| c.video_id != video_id);
        Ok(())
    }

    async fn set_video_published(
        &self,
        video_id: PrimaryKey,
        published: bool,
    ) -> Result<VideoData> {
        let mut state = self.state.lock();

        let video = state
            .videos
            .iter_mut()
            .find(|v| v.id == video_id)
            .ok_or_else(|| not_found("video", "id"))?;

        video.published = published;
        Ok(video.clone())
    }

    async fn list_videos(&self, listing: &VideoListing) -> Result<Paginated<VideoWithOwner>> {
        let state = self.state.lock();
        let stages = listing.stages();

        let mut matches: Vec<VideoData> = state.videos.clone();

        for stage in &stages {
            match stage {
                Stage::MatchOwner(owner_id) => matches.retain(|v| v.owner_id == *owner_id),
                Stage::MatchText(query) => {
                    let needle = query.to_lowercase();
                    matches.retain(|v| {
                        v.title.to_lowercase().contains(&needle)
                            || v.description.to_lowercase().contains(&needle)
                    });
                }
                _ => {}
            }
        }

        let total = matches.len() as i64;

        if let Some(Stage::Sort { field, direction }) = stages
            .iter()
            .find(|s| matches!(s, Stage::Sort { .. }))
        {
            matches.sort_by(|a, b| {
                let ordering = match field {
                    SortField::Title => a.title.cmp(&b.title),
                    SortField::Duration => a.duration.total_cmp(&b.duration),
                    SortField::Views => a.views.cmp(&b.views),
                    SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                };

                let ordering = match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                };

                // Stable tiebreak on id
                ordering.then(a.id.cmp(&b.id))
            });
        }

        let offset = listing.params.offset() as usize;
        let limit = listing.params.limit() as usize;

        let items: Vec<_> = matches
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|video| {
                let owner = state.users.iter().find(|u| u.id == video.owner_id);

                VideoWithOwner {
                    owner: owner.map(|u| OwnerSummary {
                        username: u.username.clone(),
                        email: u.email.clone(),
                        avatar: u.avatar.clone(),
                    }),
                    video,
                }
            })
            .collect();

        Ok(Paginated::new(items, &listing.params, total))
    }

    async fn videos_by_owner(&self, owner_id: PrimaryKey) -> Result<Vec<VideoData>> {
        Ok(self
            .state
            .lock()
            .videos
            .iter()
            .filter(|v| v.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn insert_video_like(&self, user_id: PrimaryKey, video_id: PrimaryKey) -> Result<bool> {
        Ok(toggle_insert(
            &mut self.state.lock().video_likes,
            (user_id, video_id),
        ))
    }

    async fn delete_video_like(&self, user_id: PrimaryKey, video_id: PrimaryKey) -> Result<bool> {
        Ok(toggle_delete(
            &mut self.state.lock().video_likes,
            (user_id, video_id),
        ))
    }

    async fn insert_comment_like(
        &self,
        user_id: PrimaryKey,
        comment_id: PrimaryKey,
    ) -> Result<bool> {
        Ok(toggle_insert(
            &mut self.state.lock().comment_likes,
            (user_id, comment_id),
        ))
    }

    async fn delete_comment_like(
        &self,
        user_id: PrimaryKey,
        comment_id: PrimaryKey,
    ) -> Result<bool> {
        Ok(toggle_delete(
            &mut self.state.lock().comment_likes,
            (user_id, comment_id),
        ))
    }

    async fn insert_tweet_like(&self, user_id: PrimaryKey, tweet_id: PrimaryKey) -> Result<bool> {
        Ok(toggle_insert(
            &mut self.state.lock().tweet_likes,
            (user_id, tweet_id),
        ))
    }

    async fn delete_tweet_like(&self, user_id: PrimaryKey, tweet_id: PrimaryKey) -> Result<bool> {
        Ok(toggle_delete(
            &mut self.state.lock().tweet_likes,
            (user_id, tweet_id),
        ))
    }

    async fn liked_videos(&self, user_id: PrimaryKey) -> Result<Vec<VideoData>> {
        let state = self.state.lock();

        let liked: HashSet<_> = state
            .video_likes
            .iter()
            .filter(|(user, _)| *user == user_id)
            .map(|(_, video)| *video)
            .collect();

        Ok(state
            .videos
            .iter()
            .filter(|v| liked.contains(&v.id))
            .cloned()
            .collect())
    }

    async fn insert_subscription(
        &self,
        subscriber_id: PrimaryKey,
        channel_id: PrimaryKey,
    ) -> Result<bool> {
        Ok(toggle_insert(
            &mut self.state.lock().subscriptions,
            (subscriber_id, channel_id),
        ))
    }

    async fn delete_subscription(
        &self,
        subscriber_id: PrimaryKey,
        channel_id: PrimaryKey,
    ) -> Result<bool> {
        Ok(toggle_delete(
            &mut self.state.lock().subscriptions,
            (subscriber_id, channel_id),
        ))
    }

    async fn channel_subscribers(&self, channel_id: PrimaryKey) -> Result<Vec<UserData>> {
        let state = self.state.lock();

        Ok(state
            .subscriptions
            .iter()
            .filter(|(_, channel)| *channel == channel_id)
            .filter_map(|(subscriber, _)| state.users.iter().find(|u| u.id == *subscriber))
            .cloned()
            .collect())
    }

    async fn subscribed_channels(&self, subscriber_id: PrimaryKey) -> Result<Vec<UserData>> {
        let state = self.state.lock();

        Ok(state
            .subscriptions
            .iter()
            .filter(|(subscriber, _)| *subscriber == subscriber_id)
            .filter_map(|(_, channel)| state.users.iter().find(|u| u.id == *channel))
            .cloned()
            .collect())
    }

    async fn playlist_by_id(&self, playlist_id: PrimaryKey) -> Result<PlaylistData> {
        self.state
            .lock()
            .playlists
            .iter()
            .find(|p| p.id == playlist_id)
            .cloned()
            .ok_or_else(|| not_found("playlist", "id"))
    }

    async fn playlists_by_owner(&self, owner_id: PrimaryKey) -> Result<Vec<PlaylistData>> {
        Ok(self
            .state
            .lock()
            .playlists
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn create_playlist(&self, new_playlist: NewPlaylist) -> Result<PlaylistData> {
        let mut state = self.state.lock();

        let playlist = PlaylistData {
            id: state.next_id(),
            owner_id: new_playlist.owner_id,
            name: new_playlist.name,
            description: new_playlist.description,
            video_ids: vec![],
            created_at: Utc::now(),
        };

        state.playlists.push(playlist.clone());
        Ok(playlist)
    }

    async fn update_playlist(&self, updated_playlist: UpdatedPlaylist) -> Result<PlaylistData> {
        let mut state = self.state.lock();

        let playlist = state
            .playlists
            .iter_mut()
            .find(|p| p.id == updated_playlist.id)
            .ok_or_else(|| not_found("playlist", "id"))?;

        if let Some(name) = updated_playlist.name {
            playlist.name = name;
        }
        if updated_playlist.description.is_some() {
            playlist.description = updated_playlist.description;
        }

        Ok(playlist.clone())
    }

    async fn delete_playlist(&self, playlist_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.lock();

        if !state.playlists.iter().any(|p| p.id == playlist_id) {
            return Err(not_found("playlist", "id"));
        }

        state.playlists.retain(|p| p.id != playlist_id);
        Ok(())
    }

    async fn add_video_to_playlist(
        &self,
        playlist_id: PrimaryKey,
        video_id: PrimaryKey,
    ) -> Result<()> {
        let mut state = self.state.lock();

        let playlist = state
            .playlists
            .iter_mut()
            .find(|p| p.id == playlist_id)
            .ok_or_else(|| not_found("playlist", "id"))?;

        if playlist.video_ids.contains(&video_id) {
            return Err(DatabaseError::Conflict {
                resource: "playlist video",
                field: "playlist:video",
                value: format!("{playlist_id}:{video_id}"),
            });
        }

        playlist.video_ids.push(video_id);
        Ok(())
    }

    async fn remove_video_from_playlist(
        &self,
        playlist_id: PrimaryKey,
        video_id: PrimaryKey,
    ) -> Result<()> {
        let mut state = self.state.lock();

        let playlist = state
            .playlists
            .iter_mut()
            .find(|p| p.id == playlist_id)
            .ok_or_else(|| not_found("playlist", "id"))?;

        if !playlist.video_ids.contains(&video_id) {
            return Err(not_found("playlist video", "playlist:video"));
        }

        playlist.video_ids.retain(|id| *id != video_id);
        Ok(())
    }

    async fn tweet_by_id(&self, tweet_id: PrimaryKey) -> Result<TweetData> {
        self.state
            .lock()
            .tweets
            .iter()
            .find(|t| t.id == tweet_id)
            .cloned()
            .ok_or_else(|| not_found("tweet", "id"))
    }

    async fn create_tweet(&self, new_tweet: NewTweet) -> Result<TweetData> {
        let mut state = self.state.lock();

        let tweet = TweetData {
            id: state.next_id(),
            owner_id: new_tweet.owner_id,
            content: new_tweet.content,
            created_at: Utc::now(),
        };

        state.tweets.push(tweet.clone());
        Ok(tweet)
    }

    async fn update_tweet(&self, tweet_id: PrimaryKey, content: String) -> Result<TweetData> {
        let mut state = self.state.lock();

        let tweet = state
            .tweets
            .iter_mut()
            .find(|t| t.id == tweet_id)
            .ok_or_else(|| not_found("tweet", "id"))?;

        tweet.content = content;
        Ok(tweet.clone())
    }

    async fn delete_tweet(&self, tweet_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.lock();

        if !state.tweets.iter().any(|t| t.id == tweet_id) {
            return Err(not_found("tweet", "id"));
        }

        state.tweets.retain(|t| t.id != tweet_id);
        state.tweet_likes.retain(|(_, target)| *target != tweet_id);
        Ok(())
    }

    async fn tweets_by_owner(&self, owner_id: PrimaryKey) -> Result<Vec<TweetData>> {
        Ok(self
            .state
            .lock()
            .tweets
            .iter()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn comment_by_id(&self, comment_id: PrimaryKey) -> Result<CommentData> {
        self.state
            .lock()
            .comments
            .iter()
            .find(|c| c.id == comment_id)
            .cloned()
            .ok_or_else(|| not_found("comment", "id"))
    }

    async fn create_comment(&self, new_comment: NewComment) -> Result<CommentData> {
        let mut state = self.state.lock();

        let comment = CommentData {
            id: state.next_id(),
            owner_id: new_comment.owner_id,
            video_id: new_comment.video_id,
            content: new_comment.content,
            created_at: Utc::now(),
        };

        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn update_comment(
        &self,
        comment_id: PrimaryKey,
        content: String,
    ) -> Result<CommentData> {
        let mut state = self.state.lock();

        let comment = state
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| not_found("comment", "id"))?;

        comment.content = content;
        Ok(comment.clone())
    }

    async fn delete_comment(&self, comment_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.lock();

        if !state.comments.iter().any(|c| c.id == comment_id) {
            return Err(not_found("comment", "id"));
        }

        state.comments.retain(|c| c.id != comment_id);
        state
            .comment_likes
            .retain(|(_, target)| *target != comment_id);
        Ok(())
    }

    async fn comments_by_video(
        &self,
        video_id: PrimaryKey,
        params: &PageParams,
    ) -> Result<Paginated<CommentData>> {
        let state = self.state.lock();

        let matches: Vec<_> = state
            .comments
            .iter()
            .filter(|c| c.video_id == video_id)
            .cloned()
            .collect();

        let total = matches.len() as i64;
        let items = matches
            .into_iter()
            .skip(params.offset() as usize)
            .take(params.limit() as usize)
            .collect();

        Ok(Paginated::new(items, params, total))
    }

    async fn channel_stats(&self, channel_id: PrimaryKey) -> Result<ChannelStatsData> {
        let state = self.state.lock();

        let videos: Vec<_> = state
            .videos
            .iter()
            .filter(|v| v.owner_id == channel_id)
            .collect();

        let total_likes = state
            .video_likes
            .iter()
            .filter(|(_, video)| videos.iter().any(|v| v.id == *video))
            .count() as i64;

        let total_subscribers = state
            .subscriptions
            .iter()
            .filter(|(_, channel)| *channel == channel_id)
            .count() as i64;

        Ok(ChannelStatsData {
            total_views: videos.iter().map(|v| v.views).sum(),
            total_videos: videos.len() as i64,
            total_likes,
            total_subscribers,
        })
    }
}

impl MemoryDatabase {
    /// Directly sets a video's view counter, for stats tests
    pub fn set_views(&self, video_id: PrimaryKey, views: i64) {
        let mut state = self.state.lock();

        if let Some(video) = state.videos.iter_mut().find(|v| v.id == video_id) {
            video.views = views;
        }
    }
}
