use std::sync::Arc;

use crate::{
    listing::{PageParams, Paginated},
    CommentData, ContentError, Database, NewComment, PrimaryKey, UserData,
};

/// Manages the comments attached to videos
pub struct CommentManager<Db> {
    db: Arc<Db>,
}

impl<Db> CommentManager<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    /// A page of comments on a video, oldest first
    pub async fn by_video(
        &self,
        video_id: PrimaryKey,
        params: PageParams,
    ) -> Result<Paginated<CommentData>, ContentError> {
        let _ = self.db.video_by_id(video_id).await?;

        Ok(self.db.comments_by_video(video_id, &params).await?)
    }

    pub async fn add(
        &self,
        owner: &UserData,
        video_id: PrimaryKey,
        content: String,
    ) -> Result<CommentData, ContentError> {
        let _ = self.db.video_by_id(video_id).await?;

        let comment = self
            .db
            .create_comment(NewComment {
                owner_id: owner.id,
                video_id,
                content,
            })
            .await?;

        Ok(comment)
    }

    pub async fn update(
        &self,
        actor: &UserData,
        comment_id: PrimaryKey,
        content: String,
    ) -> Result<CommentData, ContentError> {
        let comment = self.db.comment_by_id(comment_id).await?;

        if comment.owner_id != actor.id {
            return Err(ContentError::NotOwner("comment"));
        }

        Ok(self.db.update_comment(comment_id, content).await?)
    }

    pub async fn delete(
        &self,
        actor: &UserData,
        comment_id: PrimaryKey,
    ) -> Result<(), ContentError> {
        let comment = self.db.comment_by_id(comment_id).await?;

        if comment.owner_id != actor.id {
            return Err(ContentError::NotOwner("comment"));
        }

        Ok(self.db.delete_comment(comment_id).await?)
    }
}
