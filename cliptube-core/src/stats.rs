use std::sync::Arc;

use crate::{ChannelStatsData, ContentError, Database, PrimaryKey};

/// Computes per-channel summary statistics
pub struct StatsManager<Db> {
    db: Arc<Db>,
}

impl<Db> StatsManager<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    /// Total views, videos, likes and subscribers for a channel.
    /// A channel with no videos gets a summary of zeroes, not an error.
    pub async fn channel(&self, channel_id: PrimaryKey) -> Result<ChannelStatsData, ContentError> {
        let _ = self.db.user_by_id(channel_id).await?;

        Ok(self.db.channel_stats(channel_id).await?)
    }
}
