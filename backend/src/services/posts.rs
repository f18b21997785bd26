//! Post operations, likes and commenting.

use log::info;
use std::time::Duration;

use super::delayed::{DelayedPost, PostQueue, ScheduledPost};
use super::ensure_owner;
use super::error::ServiceResult;
use super::media::{MediaCategory, MediaStore};
use crate::db::repository::FullRepository;
use crate::models::{
    CommentInput, Post, PostDraft, PostFilter, PostId, PostInput, PostPatch, PostThread, User,
};

/// Result of a create request.
#[derive(Debug, Clone)]
pub enum CreatedPost {
    /// Stored right away.
    Now(PostThread),
    /// Handed to the delayed queue.
    Scheduled {
        draft: PostDraft,
        seconds: i64,
        receipt: ScheduledPost,
    },
}

pub async fn list_posts<R: FullRepository + ?Sized>(
    repo: &R,
    filter: &PostFilter,
) -> ServiceResult<Vec<Post>> {
    Ok(repo.list_posts(filter).await?)
}

/// Posts written by the caller.
pub async fn my_posts<R: FullRepository + ?Sized>(repo: &R, user: &User) -> ServiceResult<Vec<Post>> {
    Ok(repo.posts_by_users(&[user.id]).await?)
}

/// Create a post now, or after `seconds` when the input asks for it.
pub async fn create_post<R: FullRepository + ?Sized>(
    repo: &R,
    queue: &dyn PostQueue,
    user: &User,
    input: PostInput,
) -> ServiceResult<CreatedPost> {
    let seconds = input.seconds;
    let draft = input.into_draft()?;

    match seconds {
        Some(seconds) => {
            // Validation keeps `seconds` within 0..=MAX_DELAY_SECONDS.
            let receipt = queue.submit(DelayedPost {
                author: user.id,
                draft: draft.clone(),
                delay: Duration::from_secs(seconds.unsigned_abs()),
            });
            Ok(CreatedPost::Scheduled {
                draft,
                seconds,
                receipt,
            })
        }
        None => {
            let post = repo.create_post(user.id, &draft).await?;
            info!("User {} created post {}", user.id, post.id);
            Ok(CreatedPost::Now(PostThread {
                post,
                likes: Vec::new(),
                comments: Vec::new(),
            }))
        }
    }
}

/// A post with its likes and comments.
pub async fn post_thread<R: FullRepository + ?Sized>(
    repo: &R,
    post_id: PostId,
) -> ServiceResult<PostThread> {
    let post = repo.get_post(post_id).await?;
    thread_for(repo, post).await
}

async fn thread_for<R: FullRepository + ?Sized>(repo: &R, post: Post) -> ServiceResult<PostThread> {
    let likes = repo.likes_for_post(post.id).await?;
    let comments = repo.list_comments(Some(post.id)).await?;
    Ok(PostThread {
        post,
        likes,
        comments,
    })
}

/// Replace (`partial = false`) or patch a post the caller owns.
pub async fn update_post<R: FullRepository + ?Sized>(
    repo: &R,
    user: &User,
    post_id: PostId,
    input: PostInput,
    partial: bool,
) -> ServiceResult<PostThread> {
    let post = repo.get_post(post_id).await?;
    ensure_owner(user, post.user_id)?;

    let patch = if partial {
        input.into_patch()?
    } else {
        PostPatch::from(input.into_draft()?)
    };
    let updated = repo.update_post(post_id, &patch).await?;
    thread_for(repo, updated).await
}

/// Delete a post the caller owns, with its likes and comments.
pub async fn delete_post<R: FullRepository + ?Sized>(
    repo: &R,
    media: &MediaStore,
    user: &User,
    post_id: PostId,
) -> ServiceResult<()> {
    let post = repo.get_post(post_id).await?;
    ensure_owner(user, post.user_id)?;
    repo.delete_post(post_id).await?;
    if let Some(image) = &post.image {
        media.remove(image).await;
    }
    info!("User {} deleted post {}", user.id, post_id);
    Ok(())
}

pub async fn upload_post_image<R: FullRepository + ?Sized>(
    repo: &R,
    media: &MediaStore,
    user: &User,
    post_id: PostId,
    bytes: &[u8],
) -> ServiceResult<Post> {
    let post = repo.get_post(post_id).await?;
    ensure_owner(user, post.user_id)?;

    let path = media
        .save_image(MediaCategory::Posts, &post.title, bytes)
        .await?;
    let updated = match repo.set_post_image(post_id, Some(&path)).await {
        Ok(updated) => updated,
        Err(e) => {
            media.remove(&path).await;
            return Err(e.into());
        }
    };
    if let Some(previous) = &post.image {
        media.remove(previous).await;
    }
    Ok(updated)
}

/// Like a post. Any earlier like by the caller is replaced, so there is
/// always exactly one.
pub async fn like_post<R: FullRepository + ?Sized>(
    repo: &R,
    user: &User,
    post_id: PostId,
) -> ServiceResult<PostThread> {
    let post = repo.get_post(post_id).await?;
    repo.replace_like(user.id, post_id).await?;
    thread_for(repo, post).await
}

pub async fn unlike_post<R: FullRepository + ?Sized>(
    repo: &R,
    user: &User,
    post_id: PostId,
) -> ServiceResult<PostThread> {
    let post = repo.get_post(post_id).await?;
    repo.delete_likes(user.id, post_id).await?;
    thread_for(repo, post).await
}

/// Every post the caller likes, with likes and comments.
pub async fn liked_posts<R: FullRepository + ?Sized>(
    repo: &R,
    user: &User,
) -> ServiceResult<Vec<PostThread>> {
    let ids = repo.liked_post_ids(user.id).await?;
    let posts = repo.posts_by_ids(&ids).await?;
    let mut threads = Vec::with_capacity(posts.len());
    for post in posts {
        threads.push(thread_for(repo, post).await?);
    }
    Ok(threads)
}

/// Add a comment by the caller and return the updated post.
pub async fn comment_on_post<R: FullRepository + ?Sized>(
    repo: &R,
    user: &User,
    post_id: PostId,
    input: CommentInput,
) -> ServiceResult<PostThread> {
    let post = repo.get_post(post_id).await?;
    let text = input.into_text()?;
    repo.create_comment(user.id, post_id, &text).await?;
    thread_for(repo, post).await
}
