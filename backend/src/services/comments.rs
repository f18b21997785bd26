use super::ensure_owner;
use super::error::ServiceResult;
use crate::db::repository::FullRepository;
use crate::models::{CommentId, CommentInput, PostComment, PostId, User};

pub async fn list_comments<R: FullRepository + ?Sized>(
    repo: &R,
    post_id: Option<PostId>,
) -> ServiceResult<Vec<PostComment>> {
    Ok(repo.list_comments(post_id).await?)
}

pub async fn get_comment<R: FullRepository + ?Sized>(
    repo: &R,
    comment_id: CommentId,
) -> ServiceResult<PostComment> {
    Ok(repo.get_comment(comment_id).await?)
}

/// Change the text of a comment the caller wrote.
pub async fn update_comment<R: FullRepository + ?Sized>(
    repo: &R,
    user: &User,
    comment_id: CommentId,
    input: CommentInput,
) -> ServiceResult<PostComment> {
    let comment = repo.get_comment(comment_id).await?;
    ensure_owner(user, comment.user_id)?;
    let text = input.into_text()?;
    Ok(repo.update_comment(comment_id, &text).await?)
}

pub async fn delete_comment<R: FullRepository + ?Sized>(
    repo: &R,
    user: &User,
    comment_id: CommentId,
) -> ServiceResult<()> {
    let comment = repo.get_comment(comment_id).await?;
    ensure_owner(user, comment.user_id)?;
    Ok(repo.delete_comment(comment_id).await?)
}
