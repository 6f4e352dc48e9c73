use std::sync::Arc;

use crate::{ContentError, Database, NewTweet, PrimaryKey, TweetData, UserData};

/// Manages the short text posts users publish to their channel
pub struct TweetManager<Db> {
    db: Arc<Db>,
}

impl<Db> TweetManager<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    pub async fn create(
        &self,
        owner: &UserData,
        content: String,
    ) -> Result<TweetData, ContentError> {
        let tweet = self
            .db
            .create_tweet(NewTweet {
                owner_id: owner.id,
                content,
            })
            .await?;

        Ok(tweet)
    }

    /// Every tweet by the given user, newest last
    pub async fn by_owner(&self, owner_id: PrimaryKey) -> Result<Vec<TweetData>, ContentError> {
        let _ = self.db.user_by_id(owner_id).await?;

        Ok(self.db.tweets_by_owner(owner_id).await?)
    }

    pub async fn update(
        &self,
        actor: &UserData,
        tweet_id: PrimaryKey,
        content: String,
    ) -> Result<TweetData, ContentError> {
        let tweet = self.db.tweet_by_id(tweet_id).await?;

        if tweet.owner_id != actor.id {
            return Err(ContentError::NotOwner("tweet"));
        }

        Ok(self.db.update_tweet(tweet_id, content).await?)
    }

    pub async fn delete(&self, actor: &UserData, tweet_id: PrimaryKey) -> Result<(), ContentError> {
        let tweet = self.db.tweet_by_id(tweet_id).await?;

        if tweet.owner_id != actor.id {
            return Err(ContentError::NotOwner("tweet"));
        }

        Ok(self.db.delete_tweet(tweet_id).await?)
    }
}
