//! Posts and the engagement records attached to them.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::profile::contains_ci;
use super::user::UserId;
use super::validation::FieldErrors;
use crate::define_id_type;

define_id_type!(i64, PostId);
define_id_type!(i64, LikeId);
define_id_type!(i64, CommentId);

pub const TITLE_MAX_LEN: usize = 255;
/// Longest accepted countdown for delayed creation (30 days).
pub const MAX_DELAY_SECONDS: i64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub title: String,
    pub text: String,
    /// Path relative to the media root.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostLike {
    pub id: LikeId,
    pub user_id: UserId,
    pub post_id: PostId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostComment {
    pub id: CommentId,
    pub user_id: UserId,
    pub post_id: PostId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A post together with its likes and comments, oldest first.
#[derive(Debug, Clone)]
pub struct PostThread {
    pub post: Post,
    pub likes: Vec<PostLike>,
    pub comments: Vec<PostComment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostPatch {
    pub title: Option<String>,
    pub text: Option<String>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.text.is_none()
    }
}

impl From<PostDraft> for PostPatch {
    fn from(draft: PostDraft) -> Self {
        Self {
            title: Some(draft.title),
            text: Some(draft.text),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostFilter {
    pub title: Option<String>,
    pub text: Option<String>,
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        contains_ci(&post.title, self.title.as_deref()) && contains_ci(&post.text, self.text.as_deref())
    }
}

/// Raw post payload. `seconds` asks for delayed creation and is only read on create.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostInput {
    pub title: Option<String>,
    pub text: Option<String>,
    pub seconds: Option<i64>,
}

impl PostInput {
    pub fn into_draft(self) -> Result<PostDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = errors.require_text("title", self.title.as_deref(), Some(TITLE_MAX_LEN));
        let text = errors.require_text("text", self.text.as_deref(), None);
        if let Some(seconds) = self.seconds {
            if seconds < 0 {
                errors.add("seconds", "Ensure this value is greater than or equal to 0.");
            } else if seconds > MAX_DELAY_SECONDS {
                errors.add(
                    "seconds",
                    format!(
                        "Ensure this value is less than or equal to {}.",
                        MAX_DELAY_SECONDS
                    ),
                );
            }
        }
        errors.into_result()?;
        match (title, text) {
            (Some(title), Some(text)) => Ok(PostDraft { title, text }),
            _ => Err(FieldErrors::single("non_field_errors", "Invalid post.")),
        }
    }

    pub fn into_patch(self) -> Result<PostPatch, FieldErrors> {
        let mut errors = FieldErrors::new();
        let patch = PostPatch {
            title: errors.optional_text("title", self.title.as_deref(), Some(TITLE_MAX_LEN)),
            text: errors.optional_text("text", self.text.as_deref(), None),
        };
        errors.into_result()?;
        Ok(patch)
    }
}

/// Raw comment payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentInput {
    pub text: Option<String>,
}

impl CommentInput {
    pub fn into_text(self) -> Result<String, FieldErrors> {
        let mut errors = FieldErrors::new();
        let text = errors.require_text("text", self.text.as_deref(), None);
        errors.into_result()?;
        text.ok_or_else(|| FieldErrors::single("text", super::validation::REQUIRED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_countdown_rejected() {
        let input = PostInput {
            title: Some("Title".to_string()),
            text: Some("Body".to_string()),
            seconds: Some(-1),
        };
        let errors = input.into_draft().unwrap_err();
        assert!(errors.get("seconds").is_some());
    }

    #[test]
    fn test_title_too_long() {
        let input = PostInput {
            title: Some("t".repeat(TITLE_MAX_LEN + 1)),
            text: Some("Body".to_string()),
            seconds: None,
        };
        assert!(input.into_draft().unwrap_err().get("title").is_some());
    }

    #[test]
    fn test_filter_on_title_and_text() {
        let post = Post {
            id: PostId::new(1),
            user_id: UserId::new(1),
            title: "War and Peace".to_string(),
            text: "Published in the USA".to_string(),
            image: None,
            created_at: Utc::now(),
        };
        let filter = PostFilter {
            title: Some("war".to_string()),
            text: Some("usa".to_string()),
        };
        assert!(filter.matches(&post));
        assert!(!PostFilter {
            title: Some("peaceful".to_string()),
            text: None
        }
        .matches(&post));
    }

    #[test]
    fn test_comment_text_required() {
        assert!(CommentInput { text: None }.into_text().is_err());
        assert_eq!(
            CommentInput {
                text: Some("Nice".to_string())
            }
            .into_text()
            .unwrap(),
            "Nice"
        );
    }
}
