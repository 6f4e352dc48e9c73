use std::sync::Arc;

use crate::{ContentError, Database, PrimaryKey, ToggleOutcome, UserData};

/// Manages the subscriber/channel relation
pub struct SubscriptionManager<Db> {
    db: Arc<Db>,
}

impl<Db> SubscriptionManager<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    /// Flips the subscription between a user and a channel
    pub async fn toggle(
        &self,
        subscriber_id: PrimaryKey,
        channel_id: PrimaryKey,
    ) -> Result<ToggleOutcome, ContentError> {
        // The channel must be a real user
        let _ = self.db.user_by_id(channel_id).await?;

        if self.db.insert_subscription(subscriber_id, channel_id).await? {
            return Ok(ToggleOutcome::Created);
        }

        self.db.delete_subscription(subscriber_id, channel_id).await?;
        Ok(ToggleOutcome::Removed)
    }

    /// Everyone subscribed to the channel
    pub async fn subscribers(&self, channel_id: PrimaryKey) -> Result<Vec<UserData>, ContentError> {
        let _ = self.db.user_by_id(channel_id).await?;

        Ok(self.db.channel_subscribers(channel_id).await?)
    }

    /// Every channel the user is subscribed to
    pub async fn subscribed_channels(
        &self,
        subscriber_id: PrimaryKey,
    ) -> Result<Vec<UserData>, ContentError> {
        let _ = self.db.user_by_id(subscriber_id).await?;

        Ok(self.db.subscribed_channels(subscriber_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DatabaseError, MemoryDatabase, NewUser};

    async fn seed_user(db: &MemoryDatabase, username: &str) -> UserData {
        db.create_user(NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "hash".to_string(),
            full_name: username.to_string(),
            avatar: None,
            cover_image: None,
        })
        .await
        .expect("user is created")
    }

    #[tokio::test]
    async fn toggle_subscribes_and_unsubscribes() {
        let db = Arc::new(MemoryDatabase::default());
        let subscriptions = SubscriptionManager::new(&db);

        let viewer = seed_user(&db, "viewer").await;
        let channel = seed_user(&db, "channel").await;

        let first = subscriptions
            .toggle(viewer.id, channel.id)
            .await
            .expect("toggles");
        assert_eq!(first, ToggleOutcome::Created);

        let subscribers = subscriptions.subscribers(channel.id).await.expect("lists");
        assert_eq!(subscribers.len(), 1);
        assert_eq!(subscribers[0].id, viewer.id);

        let second = subscriptions
            .toggle(viewer.id, channel.id)
            .await
            .expect("toggles");
        assert_eq!(second, ToggleOutcome::Removed);

        assert!(subscriptions
            .subscribers(channel.id)
            .await
            .expect("lists")
            .is_empty());
    }

    #[tokio::test]
    async fn subscribing_to_a_missing_channel_is_not_found() {
        let db = Arc::new(MemoryDatabase::default());
        let subscriptions = SubscriptionManager::new(&db);
        let viewer = seed_user(&db, "viewer").await;

        let result = subscriptions.toggle(viewer.id, 999).await;
        assert!(matches!(
            result,
            Err(ContentError::Db(DatabaseError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn subscribed_channels_lists_the_other_side() {
        let db = Arc::new(MemoryDatabase::default());
        let subscriptions = SubscriptionManager::new(&db);

        let viewer = seed_user(&db, "viewer").await;
        let first = seed_user(&db, "first").await;
        let second = seed_user(&db, "second").await;

        subscriptions.toggle(viewer.id, first.id).await.expect("toggles");
        subscriptions.toggle(viewer.id, second.id).await.expect("toggles");

        let channels = subscriptions
            .subscribed_channels(viewer.id)
            .await
            .expect("lists");

        let names: Vec<_> = channels.iter().map(|c| c.username.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}
