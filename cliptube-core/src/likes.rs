use std::sync::Arc;

use crate::{ContentError, Database, PrimaryKey, ToggleOutcome, VideoData};

/// Manages the like relations. Each target type has its own relation,
/// keyed on (user, target) with a uniqueness guarantee, so a toggle is an
/// atomic insert-if-absent followed by the complementary delete.
pub struct LikeManager<Db> {
    db: Arc<Db>,
}

impl<Db> LikeManager<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    /// Flips the like relation between a user and a video
    pub async fn toggle_video(
        &self,
        user_id: PrimaryKey,
        video_id: PrimaryKey,
    ) -> Result<ToggleOutcome, ContentError> {
        // The target must exist; liking a missing video is an error
        let _ = self.db.video_by_id(video_id).await?;

        if self.db.insert_video_like(user_id, video_id).await? {
            return Ok(ToggleOutcome::Created);
        }

        // The insert lost to an existing row, so this call turns the like off
        self.db.delete_video_like(user_id, video_id).await?;
        Ok(ToggleOutcome::Removed)
    }

    pub async fn toggle_comment(
        &self,
        user_id: PrimaryKey,
        comment_id: PrimaryKey,
    ) -> Result<ToggleOutcome, ContentError> {
        let _ = self.db.comment_by_id(comment_id).await?;

        if self.db.insert_comment_like(user_id, comment_id).await? {
            return Ok(ToggleOutcome::Created);
        }

        self.db.delete_comment_like(user_id, comment_id).await?;
        Ok(ToggleOutcome::Removed)
    }

    pub async fn toggle_tweet(
        &self,
        user_id: PrimaryKey,
        tweet_id: PrimaryKey,
    ) -> Result<ToggleOutcome, ContentError> {
        let _ = self.db.tweet_by_id(tweet_id).await?;

        if self.db.insert_tweet_like(user_id, tweet_id).await? {
            return Ok(ToggleOutcome::Created);
        }

        self.db.delete_tweet_like(user_id, tweet_id).await?;
        Ok(ToggleOutcome::Removed)
    }

    /// All videos the user has liked, in like order
    pub async fn liked_videos(&self, user_id: PrimaryKey) -> Result<Vec<VideoData>, ContentError> {
        Ok(self.db.liked_videos(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DatabaseError, MemoryDatabase, NewUser, NewVideo};

    async fn seed(db: &MemoryDatabase) -> (PrimaryKey, PrimaryKey) {
        let user = db
            .create_user(NewUser {
                username: "liker".to_string(),
                email: "liker@example.com".to_string(),
                password: "hash".to_string(),
                full_name: "Liker".to_string(),
                avatar: None,
                cover_image: None,
            })
            .await
            .expect("user is created");

        let video = db
            .create_video(NewVideo {
                owner_id: user.id,
                title: "intro".to_string(),
                description: String::new(),
                video_key: "vk".to_string(),
                video_url: "vu".to_string(),
                thumbnail_key: "tk".to_string(),
                thumbnail_url: "tu".to_string(),
                duration: 1.0,
                published: true,
            })
            .await
            .expect("video is created");

        (user.id, video.id)
    }

    #[tokio::test]
    async fn double_toggle_returns_to_the_original_state() {
        let db = Arc::new(MemoryDatabase::default());
        let likes = LikeManager::new(&db);
        let (user_id, video_id) = seed(&db).await;

        let first = likes.toggle_video(user_id, video_id).await.expect("toggles");
        assert_eq!(first, ToggleOutcome::Created);
        assert_eq!(likes.liked_videos(user_id).await.expect("lists").len(), 1);

        let second = likes.toggle_video(user_id, video_id).await.expect("toggles");
        assert_eq!(second, ToggleOutcome::Removed);
        assert!(likes.liked_videos(user_id).await.expect("lists").is_empty());
    }

    #[tokio::test]
    async fn liking_a_missing_video_is_not_found() {
        let db = Arc::new(MemoryDatabase::default());
        let likes = LikeManager::new(&db);
        let (user_id, _) = seed(&db).await;

        let result = likes.toggle_video(user_id, 999).await;
        assert!(matches!(
            result,
            Err(ContentError::Db(DatabaseError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn comment_and_tweet_likes_are_distinct_relations() {
        let db = Arc::new(MemoryDatabase::default());
        let likes = LikeManager::new(&db);
        let (user_id, video_id) = seed(&db).await;

        let comment = db
            .create_comment(crate::NewComment {
                owner_id: user_id,
                video_id,
                content: "nice".to_string(),
            })
            .await
            .expect("comment is created");

        let tweet = db
            .create_tweet(crate::NewTweet {
                owner_id: user_id,
                content: "hello".to_string(),
            })
            .await
            .expect("tweet is created");

        likes
            .toggle_comment(user_id, comment.id)
            .await
            .expect("toggles comment like");
        likes
            .toggle_tweet(user_id, tweet.id)
            .await
            .expect("toggles tweet like");

        // Neither toggle bleeds into the video like relation
        assert!(likes.liked_videos(user_id).await.expect("lists").is_empty());
    }
}
