mod auth;
mod comments;
mod db;
mod likes;
mod media;
mod playlists;
mod stats;
mod subscriptions;
mod tweets;
mod videos;

pub mod listing;
mod util;

use std::sync::Arc;
use thiserror::Error;

pub use auth::*;
pub use comments::*;
pub use db::*;
pub use likes::*;
pub use media::*;
pub use playlists::*;
pub use stats::*;
pub use subscriptions::*;
pub use tweets::*;
pub use videos::*;

use listing::ListingError;

/// The error shared by operations on owned content
#[derive(Debug, Error)]
pub enum ContentError {
    /// The acting user doesn't own the resource they tried to mutate
    #[error("Only the owner can modify this {0}")]
    NotOwner(&'static str),
    #[error(transparent)]
    Db(#[from] DatabaseError),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error(transparent)]
    Listing(#[from] ListingError),
}

/// The result of a toggle operation. Every call flips the relation,
/// so the outcome tells the caller which side it landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Created,
    Removed,
}

/// The cliptube system, composing every resource manager over one
/// database and one media host.
pub struct Cliptube<Db, M> {
    pub auth: Auth<Db>,
    pub videos: VideoManager<Db, M>,
    pub likes: LikeManager<Db>,
    pub subscriptions: SubscriptionManager<Db>,
    pub playlists: PlaylistManager<Db>,
    pub tweets: TweetManager<Db>,
    pub comments: CommentManager<Db>,
    pub stats: StatsManager<Db>,
}

impl<Db, M> Cliptube<Db, M>
where
    Db: Database,
    M: MediaHost,
{
    pub fn new(database: Db, media: M, tokens: TokenConfig) -> Self {
        let database = Arc::new(database);
        let media = Arc::new(media);

        Self {
            auth: Auth::new(&database, tokens),
            videos: VideoManager::new(&database, &media),
            likes: LikeManager::new(&database),
            subscriptions: SubscriptionManager::new(&database),
            playlists: PlaylistManager::new(&database),
            tweets: TweetManager::new(&database),
            comments: CommentManager::new(&database),
            stats: StatsManager::new(&database),
        }
    }
}
