use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::info;
use sqlx::{
    postgres::PgPoolOptions, Error as SqlxError, FromRow, PgPool, Postgres, QueryBuilder,
};

use crate::{
    listing::{escape_like, PageParams, Paginated, Stage, VideoListing},
    ChannelStatsData, CommentData, Database, DatabaseError, IntoDatabaseError, NewComment,
    NewPlaylist, NewTweet, NewUser, NewVideo, OwnerSummary, PlaylistData, PrimaryKey, Result,
    TweetData, UpdatedPlaylist, UpdatedUser, UpdatedVideo, UserData, VideoData, VideoWithOwner,
};

/// A postgres database implementation for cliptube
pub struct PgDatabase {
    pool: PgPool,
}

/// The flattened row produced by the owner join
#[derive(FromRow)]
struct VideoOwnerRow {
    id: PrimaryKey,
    owner_id: PrimaryKey,
    title: String,
    description: String,
    video_key: String,
    video_url: String,
    thumbnail_key: String,
    thumbnail_url: String,
    duration: f64,
    views: i64,
    published: bool,
    created_at: DateTime<Utc>,
    owner_username: Option<String>,
    owner_email: Option<String>,
    owner_avatar: Option<String>,
}

#[derive(FromRow)]
struct PlaylistRow {
    id: PrimaryKey,
    owner_id: PrimaryKey,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

const VIDEO_OWNER_COLUMNS: &str = "v.id, v.owner_id, v.title, v.description, \
    v.video_key, v.video_url, v.thumbnail_key, v.thumbnail_url, \
    v.duration, v.views, v.published, v.created_at, \
    u.username AS owner_username, u.email AS owner_email, u.avatar AS owner_avatar";

const VIDEO_COLUMNS: &str = "v.id, v.owner_id, v.title, v.description, \
    v.video_key, v.video_url, v.thumbnail_key, v.thumbnail_url, \
    v.duration, v.views, v.published, v.created_at, \
    NULL::text AS owner_username, NULL::text AS owner_email, NULL::text AS owner_avatar";

impl From<VideoOwnerRow> for VideoWithOwner {
    fn from(row: VideoOwnerRow) -> Self {
        let owner = match (row.owner_username, row.owner_email) {
            (Some(username), Some(email)) => Some(OwnerSummary {
                username,
                email,
                avatar: row.owner_avatar,
            }),
            _ => None,
        };

        Self {
            video: VideoData {
                id: row.id,
                owner_id: row.owner_id,
                title: row.title,
                description: row.description,
                video_key: row.video_key,
                video_url: row.video_url,
                thumbnail_key: row.thumbnail_key,
                thumbnail_url: row.thumbnail_url,
                duration: row.duration,
                views: row.views,
                published: row.published,
                created_at: row.created_at,
            },
            owner,
        }
    }
}

impl PgDatabase {
    pub async fn new(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))?;

        Ok(Self { pool })
    }

    /// Applies pending schema migrations
    pub async fn migrate(&self) -> Result<()> {
        info!("Applying pending migrations...");

        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))?;

        Ok(())
    }

    async fn playlist_video_ids(&self, playlist_id: PrimaryKey) -> Result<Vec<PrimaryKey>> {
        sqlx::query_scalar(
            "SELECT video_id FROM playlist_videos WHERE playlist_id = $1 ORDER BY position",
        )
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn assemble_playlist(&self, row: PlaylistRow) -> Result<PlaylistData> {
        let video_ids = self.playlist_video_ids(row.id).await?;

        Ok(PlaylistData {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            description: row.description,
            video_ids,
            created_at: row.created_at,
        })
    }

    /// Toggles one half of a (actor, target) relation table. The insert
    /// relies on the table's unique constraint, so two concurrent toggles
    /// can never both insert.
    async fn insert_relation(
        &self,
        table: &'static str,
        target_column: &'static str,
        user_id: PrimaryKey,
        target_id: PrimaryKey,
    ) -> Result<bool> {
        let sql = format!(
            "INSERT INTO {table} (user_id, {target_column}) VALUES ($1, $2) \
             ON CONFLICT (user_id, {target_column}) DO NOTHING"
        );

        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(target_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_relation(
        &self,
        table: &'static str,
        target_column: &'static str,
        user_id: PrimaryKey,
        target_id: PrimaryKey,
    ) -> Result<bool> {
        let sql = format!("DELETE FROM {table} WHERE user_id = $1 AND {target_column} = $2");

        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(target_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        Ok(result.rows_affected() == 1)
    }
}

/// Renders the filter stages into a WHERE clause.
/// Shared between the data query and the pre-pagination count query.
fn push_video_filters(builder: &mut QueryBuilder<'_, Postgres>, stages: &[Stage]) {
    let mut separator = " WHERE ";

    for stage in stages {
        match stage {
            Stage::MatchOwner(owner_id) => {
                builder.push(separator).push("v.owner_id = ");
                builder.push_bind(*owner_id);
                separator = " AND ";
            }
            Stage::MatchText(query) => {
                let pattern = format!("%{}%", escape_like(query));
                builder.push(separator).push("(v.title ILIKE ");
                builder.push_bind(pattern.clone());
                builder.push(" OR v.description ILIKE ");
                builder.push_bind(pattern);
                builder.push(")");
                separator = " AND ";
            }
            _ => {}
        }
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData> {
        sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("user", "id"))
    }

    async fn user_by_username(&self, username: &str) -> Result<UserData> {
        sqlx::query_as("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("user", "username"))
    }

    async fn user_by_email(&self, email: &str) -> Result<UserData> {
        sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("user", "email"))
    }

    async fn user_by_refresh_token(&self, token: &str) -> Result<UserData> {
        sqlx::query_as("SELECT * FROM users WHERE refresh_token = $1")
            .bind(token)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("user", "refresh_token"))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserData> {
        sqlx::query_as(
            "INSERT INTO users (username, email, password, full_name, avatar, cover_image) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password)
        .bind(&new_user.full_name)
        .bind(&new_user.avatar)
        .bind(&new_user.cover_image)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // The violated constraint tells us which column collided
            let constraint = e
                .as_database_error()
                .and_then(|d| d.constraint())
                .map(str::to_owned);

            match constraint.as_deref() {
                Some("users_username_key") => DatabaseError::Conflict {
                    resource: "user",
                    field: "username",
                    value: new_user.username.clone(),
                },
                Some("users_email_key") => DatabaseError::Conflict {
                    resource: "user",
                    field: "email",
                    value: new_user.email.clone(),
                },
                _ => e.conflict_or("user", "username or email", &new_user.username),
            }
        })
    }

    async fn update_user(&self, updated_user: UpdatedUser) -> Result<UserData> {
        let user = self.user_by_id(updated_user.id).await?;

        sqlx::query_as(
            "UPDATE users SET full_name = $1, email = $2, avatar = $3, cover_image = $4 \
             WHERE id = $5 RETURNING *",
        )
        .bind(updated_user.full_name.unwrap_or(user.full_name))
        .bind(updated_user.email.clone().unwrap_or(user.email))
        .bind(updated_user.avatar.or(user.avatar))
        .bind(updated_user.cover_image.or(user.cover_image))
        .bind(updated_user.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            e.conflict_or(
                "user",
                "email",
                updated_user.email.as_deref().unwrap_or_default(),
            )
        })
    }

    async fn set_refresh_token(&self, user_id: PrimaryKey, token: Option<String>) -> Result<()> {
        // Ensure user exists
        let _ = self.user_by_id(user_id).await?;

        sqlx::query("UPDATE users SET refresh_token = $1 WHERE id = $2")
            .bind(token)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn video_by_id(&self, video_id: PrimaryKey) -> Result<VideoData> {
        sqlx::query_as("SELECT * FROM videos WHERE id = $1")
            .bind(video_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("video", "id"))
    }

    async fn video_with_owner(&self, video_id: PrimaryKey) -> Result<VideoWithOwner> {
        let row: VideoOwnerRow = sqlx::query_as(&format!(
            "SELECT {VIDEO_OWNER_COLUMNS} FROM videos v \
             LEFT JOIN users u ON u.id = v.owner_id WHERE v.id = $1"
        ))
        .bind(video_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.not_found_or("video", "id"))?;

        Ok(row.into())
    }

    async fn create_video(&self, new_video: NewVideo) -> Result<VideoData> {
        sqlx::query_as(
            "INSERT INTO videos \
             (owner_id, title, description, video_key, video_url, thumbnail_key, thumbnail_url, duration, published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(new_video.owner_id)
        .bind(&new_video.title)
        .bind(&new_video.description)
        .bind(&new_video.video_key)
        .bind(&new_video.video_url)
        .bind(&new_video.thumbnail_key)
        .bind(&new_video.thumbnail_url)
        .bind(new_video.duration)
        .bind(new_video.published)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn update_video(&self, updated_video: UpdatedVideo) -> Result<VideoData> {
        let video = self.video_by_id(updated_video.id).await?;

        sqlx::query_as(
            "UPDATE videos SET title = $1, description = $2, thumbnail_key = $3, thumbnail_url = $4 \
             WHERE id = $5 RETURNING *",
        )
        .bind(updated_video.title.unwrap_or(video.title))
        .bind(updated_video.description.unwrap_or(video.description))
        .bind(updated_video.thumbnail_key.unwrap_or(video.thumbnail_key))
        .bind(updated_video.thumbnail_url.unwrap_or(video.thumbnail_url))
        .bind(updated_video.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn delete_video(&self, video_id: PrimaryKey) -> Result<()> {
        // Ensure video exists
        let _ = self.video_by_id(video_id).await?;

        sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(video_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn set_video_published(
        &self,
        video_id: PrimaryKey,
        published: bool,
    ) -> Result<VideoData> {
        sqlx::query_as("UPDATE videos SET published = $1 WHERE id = $2 RETURNING *")
            .bind(published)
            .bind(video_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("video", "id"))
    }

    async fn list_videos(&self, listing: &VideoListing) -> Result<Paginated<VideoWithOwner>> {
        let stages = listing.stages();

        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM videos v");
        push_video_filters(&mut count_builder, &stages);

        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.any())?;

        let mut builder = QueryBuilder::new("SELECT ");

        // The owner columns reference the joined table, so the
        // projection and the join are gated on the same stage
        if stages.contains(&Stage::JoinOwner) {
            builder.push(VIDEO_OWNER_COLUMNS);
            builder.push(" FROM videos v LEFT JOIN users u ON u.id = v.owner_id");
        } else {
            builder.push(VIDEO_COLUMNS);
            builder.push(" FROM videos v");
        }

        push_video_filters(&mut builder, &stages);

        // Ties always break on id so pagination stays stable
        match stages.iter().find_map(|s| match s {
            Stage::Sort { field, direction } => Some((field, direction)),
            _ => None,
        }) {
            Some((field, direction)) => {
                builder.push(" ORDER BY v.");
                builder.push(field.column());
                builder.push(" ");
                builder.push(direction.sql());
                builder.push(", v.id ASC");
            }
            None => {
                builder.push(" ORDER BY v.id ASC");
            }
        }

        if let Some(Stage::Paginate { offset, limit }) = stages
            .iter()
            .find(|s| matches!(s, Stage::Paginate { .. }))
        {
            builder.push(" LIMIT ");
            builder.push_bind(*limit);
            builder.push(" OFFSET ");
            builder.push_bind(*offset);
        }

        let rows: Vec<VideoOwnerRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?;

        Ok(Paginated::new(
            rows.into_iter().map(Into::into).collect(),
            &listing.params,
            total,
        ))
    }

    async fn videos_by_owner(&self, owner_id: PrimaryKey) -> Result<Vec<VideoData>> {
        sqlx::query_as("SELECT * FROM videos WHERE owner_id = $1 ORDER BY id")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())
    }

    async fn insert_video_like(&self, user_id: PrimaryKey, video_id: PrimaryKey) -> Result<bool> {
        self.insert_relation("video_likes", "video_id", user_id, video_id)
            .await
    }

    async fn delete_video_like(&self, user_id: PrimaryKey, video_id: PrimaryKey) -> Result<bool> {
        self.delete_relation("video_likes", "video_id", user_id, video_id)
            .await
    }

    async fn insert_comment_like(
        &self,
        user_id: PrimaryKey,
        comment_id: PrimaryKey,
    ) -> Result<bool> {
        self.insert_relation("comment_likes", "comment_id", user_id, comment_id)
            .await
    }

    async fn delete_comment_like(
        &self,
        user_id: PrimaryKey,
        comment_id: PrimaryKey,
    ) -> Result<bool> {
        self.delete_relation("comment_likes", "comment_id", user_id, comment_id)
            .await
    }

    async fn insert_tweet_like(&self, user_id: PrimaryKey, tweet_id: PrimaryKey) -> Result<bool> {
        self.insert_relation("tweet_likes", "tweet_id", user_id, tweet_id)
            .await
    }

    async fn delete_tweet_like(&self, user_id: PrimaryKey, tweet_id: PrimaryKey) -> Result<bool> {
        self.delete_relation("tweet_likes", "tweet_id", user_id, tweet_id)
            .await
    }

    async fn liked_videos(&self, user_id: PrimaryKey) -> Result<Vec<VideoData>> {
        sqlx::query_as(
            "SELECT v.* FROM video_likes vl \
             INNER JOIN videos v ON v.id = vl.video_id \
             WHERE vl.user_id = $1 ORDER BY vl.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn insert_subscription(
        &self,
        subscriber_id: PrimaryKey,
        channel_id: PrimaryKey,
    ) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO subscriptions (subscriber_id, channel_id) VALUES ($1, $2) \
             ON CONFLICT (subscriber_id, channel_id) DO NOTHING",
        )
        .bind(subscriber_id)
        .bind(channel_id)
        .execute(&self.pool)
        .await
        .map_err(|e| e.any())?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_subscription(
        &self,
        subscriber_id: PrimaryKey,
        channel_id: PrimaryKey,
    ) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = $1 AND channel_id = $2")
                .bind(subscriber_id)
                .bind(channel_id)
                .execute(&self.pool)
                .await
                .map_err(|e| e.any())?;

        Ok(result.rows_affected() == 1)
    }

    async fn channel_subscribers(&self, channel_id: PrimaryKey) -> Result<Vec<UserData>> {
        sqlx::query_as(
            "SELECT u.* FROM subscriptions s \
             INNER JOIN users u ON u.id = s.subscriber_id \
             WHERE s.channel_id = $1 ORDER BY s.id",
        )
        .bind(channel_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn subscribed_channels(&self, subscriber_id: PrimaryKey) -> Result<Vec<UserData>> {
        sqlx::query_as(
            "SELECT u.* FROM subscriptions s \
             INNER JOIN users u ON u.id = s.channel_id \
             WHERE s.subscriber_id = $1 ORDER BY s.id",
        )
        .bind(subscriber_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn playlist_by_id(&self, playlist_id: PrimaryKey) -> Result<PlaylistData> {
        let row: PlaylistRow = sqlx::query_as("SELECT * FROM playlists WHERE id = $1")
            .bind(playlist_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("playlist", "id"))?;

        self.assemble_playlist(row).await
    }

    async fn playlists_by_owner(&self, owner_id: PrimaryKey) -> Result<Vec<PlaylistData>> {
        let rows: Vec<PlaylistRow> =
            sqlx::query_as("SELECT * FROM playlists WHERE owner_id = $1 ORDER BY id")
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| e.any())?;

        let mut playlists = Vec::with_capacity(rows.len());

        for row in rows {
            playlists.push(self.assemble_playlist(row).await?);
        }

        Ok(playlists)
    }

    async fn create_playlist(&self, new_playlist: NewPlaylist) -> Result<PlaylistData> {
        let row: PlaylistRow = sqlx::query_as(
            "INSERT INTO playlists (owner_id, name, description) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(new_playlist.owner_id)
        .bind(&new_playlist.name)
        .bind(&new_playlist.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.assemble_playlist(row).await
    }

    async fn update_playlist(&self, updated_playlist: UpdatedPlaylist) -> Result<PlaylistData> {
        let playlist = self.playlist_by_id(updated_playlist.id).await?;

        let row: PlaylistRow = sqlx::query_as(
            "UPDATE playlists SET name = $1, description = $2 WHERE id = $3 RETURNING *",
        )
        .bind(updated_playlist.name.unwrap_or(playlist.name))
        .bind(updated_playlist.description.or(playlist.description))
        .bind(updated_playlist.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.assemble_playlist(row).await
    }

    async fn delete_playlist(&self, playlist_id: PrimaryKey) -> Result<()> {
        // Ensure playlist exists
        let _ = self.playlist_by_id(playlist_id).await?;

        sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(playlist_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn add_video_to_playlist(
        &self,
        playlist_id: PrimaryKey,
        video_id: PrimaryKey,
    ) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO playlist_videos (playlist_id, video_id, position) \
             VALUES ($1, $2, (SELECT COALESCE(MAX(position) + 1, 0) \
                              FROM playlist_videos WHERE playlist_id = $1)) \
             ON CONFLICT (playlist_id, video_id) DO NOTHING",
        )
        .bind(playlist_id)
        .bind(video_id)
        .execute(&self.pool)
        .await
        .map_err(|e| e.any())?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::Conflict {
                resource: "playlist video",
                field: "playlist:video",
                value: format!("{playlist_id}:{video_id}"),
            });
        }

        Ok(())
    }

    async fn remove_video_from_playlist(
        &self,
        playlist_id: PrimaryKey,
        video_id: PrimaryKey,
    ) -> Result<()> {
        let result =
            sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = $1 AND video_id = $2")
                .bind(playlist_id)
                .bind(video_id)
                .execute(&self.pool)
                .await
                .map_err(|e| e.any())?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound {
                resource: "playlist video",
                identifier: "playlist:video",
            });
        }

        Ok(())
    }

    async fn tweet_by_id(&self, tweet_id: PrimaryKey) -> Result<TweetData> {
        sqlx::query_as("SELECT * FROM tweets WHERE id = $1")
            .bind(tweet_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("tweet", "id"))
    }

    async fn create_tweet(&self, new_tweet: NewTweet) -> Result<TweetData> {
        sqlx::query_as("INSERT INTO tweets (owner_id, content) VALUES ($1, $2) RETURNING *")
            .bind(new_tweet.owner_id)
            .bind(&new_tweet.content)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.any())
    }

    async fn update_tweet(&self, tweet_id: PrimaryKey, content: String) -> Result<TweetData> {
        sqlx::query_as("UPDATE tweets SET content = $1 WHERE id = $2 RETURNING *")
            .bind(content)
            .bind(tweet_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("tweet", "id"))
    }

    async fn delete_tweet(&self, tweet_id: PrimaryKey) -> Result<()> {
        // Ensure tweet exists
        let _ = self.tweet_by_id(tweet_id).await?;

        sqlx::query("DELETE FROM tweets WHERE id = $1")
            .bind(tweet_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn tweets_by_owner(&self, owner_id: PrimaryKey) -> Result<Vec<TweetData>> {
        sqlx::query_as("SELECT * FROM tweets WHERE owner_id = $1 ORDER BY id")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())
    }

    async fn comment_by_id(&self, comment_id: PrimaryKey) -> Result<CommentData> {
        sqlx::query_as("SELECT * FROM comments WHERE id = $1")
            .bind(comment_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("comment", "id"))
    }

    async fn create_comment(&self, new_comment: NewComment) -> Result<CommentData> {
        sqlx::query_as(
            "INSERT INTO comments (owner_id, video_id, content) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(new_comment.owner_id)
        .bind(new_comment.video_id)
        .bind(&new_comment.content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn update_comment(
        &self,
        comment_id: PrimaryKey,
        content: String,
    ) -> Result<CommentData> {
        sqlx::query_as("UPDATE comments SET content = $1 WHERE id = $2 RETURNING *")
            .bind(content)
            .bind(comment_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("comment", "id"))
    }

    async fn delete_comment(&self, comment_id: PrimaryKey) -> Result<()> {
        // Ensure comment exists
        let _ = self.comment_by_id(comment_id).await?;

        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn comments_by_video(
        &self,
        video_id: PrimaryKey,
        params: &PageParams,
    ) -> Result<Paginated<CommentData>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE video_id = $1")
            .bind(video_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.any())?;

        let comments = sqlx::query_as(
            "SELECT * FROM comments WHERE video_id = $1 ORDER BY id LIMIT $2 OFFSET $3",
        )
        .bind(video_id)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())?;

        Ok(Paginated::new(comments, params, total))
    }

    async fn channel_stats(&self, channel_id: PrimaryKey) -> Result<ChannelStatsData> {
        sqlx::query_as(
            "SELECT \
                COALESCE(SUM(v.views), 0)::BIGINT AS total_views, \
                COUNT(v.id) AS total_videos, \
                COALESCE(SUM(l.like_count), 0)::BIGINT AS total_likes, \
                (SELECT COUNT(*) FROM subscriptions WHERE channel_id = $1) AS total_subscribers \
             FROM videos v \
             LEFT JOIN (SELECT video_id, COUNT(*) AS like_count \
                        FROM video_likes GROUP BY video_id) l ON l.video_id = v.id \
             WHERE v.owner_id = $1",
        )
        .bind(channel_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }
}

impl IntoDatabaseError for SqlxError {
    fn any(self) -> DatabaseError {
        DatabaseError::Internal(Box::new(self))
    }

    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError {
        match self {
            SqlxError::RowNotFound => DatabaseError::NotFound {
                resource,
                identifier,
            },
            e => Self::any(e),
        }
    }

    fn conflict_or(
        self,
        resource: &'static str,
        field: &'static str,
        value: &str,
    ) -> DatabaseError {
        let is_unique_violation = self
            .as_database_error()
            .and_then(|e| e.code())
            .map(|code| code == "23505")
            .unwrap_or(false);

        if is_unique_violation {
            DatabaseError::Conflict {
                resource,
                field,
                value: value.to_string(),
            }
        } else {
            Self::any(self)
        }
    }
}
