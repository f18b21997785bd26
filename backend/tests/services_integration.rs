//! Service-layer behaviour against the in-memory repository.

mod support;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use social_media::db::{FullRepository, PostRepository, ProfileRepository};
use social_media::models::validation::NON_FIELD_ERRORS;
use social_media::models::{
    CommentInput, CredentialsInput, PostFilter, PostInput, ProfileFilter, ProfileInput, UserId,
};
use social_media::services::posts::CreatedPost;
use social_media::services::{
    auth, comments, follows, posts, profiles, DelayedPost, MediaStore, PostQueue, ScheduledPost,
    ServiceError, TokioPostQueue,
};

/// Records submissions instead of running them.
#[derive(Default)]
struct RecordingQueue {
    jobs: Mutex<Vec<DelayedPost>>,
}

impl PostQueue for RecordingQueue {
    fn submit(&self, job: DelayedPost) -> ScheduledPost {
        let run_at = Utc::now() + chrono::Duration::seconds(job.delay.as_secs() as i64);
        self.jobs.lock().unwrap().push(job);
        ScheduledPost {
            job_id: "recorded".to_string(),
            run_at,
        }
    }
}

fn credentials(email: &str, password: &str) -> CredentialsInput {
    CredentialsInput {
        email: Some(email.to_string()),
        password: Some(password.to_string()),
    }
}

fn profile_input(username: &str, bio: &str, address: &str) -> ProfileInput {
    ProfileInput {
        bio: Some(bio.to_string()),
        address: Some(address.to_string()),
        username: Some(username.to_string()),
    }
}

fn post_input(title: &str, text: &str, seconds: Option<i64>) -> PostInput {
    PostInput {
        title: Some(title.to_string()),
        text: Some(text.to_string()),
        seconds,
    }
}

fn field_messages(err: &ServiceError, field: &str) -> Vec<String> {
    match err {
        ServiceError::Validation(errors) => errors.get(field).map(<[String]>::to_vec).unwrap_or_default(),
        other => panic!("expected a validation error, got {:?}", other),
    }
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn test_register_login_logout_cycle() {
    let repo = support::local_repo();

    let user = auth::register(repo.as_ref(), credentials("Alice@Example.com", "secret1"))
        .await
        .unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert!(!user.is_staff);
    assert_ne!(user.password_hash, "secret1");

    let token = auth::login(repo.as_ref(), credentials("alice@example.com", "secret1"))
        .await
        .unwrap();
    let me = auth::authenticate(repo.as_ref(), &token).await.unwrap();
    assert_eq!(me.id, user.id);

    auth::logout(repo.as_ref(), &token).await.unwrap();
    assert!(matches!(
        auth::authenticate(repo.as_ref(), &token).await,
        Err(ServiceError::Unauthenticated)
    ));
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let repo = support::local_repo();
    auth::register(repo.as_ref(), credentials("bob@example.com", "hunter2"))
        .await
        .unwrap();

    let err = auth::register(repo.as_ref(), credentials("BOB@example.com", "hunter2"))
        .await
        .unwrap_err();
    assert_eq!(
        field_messages(&err, "email"),
        vec!["user with this email already exists.".to_string()]
    );

    let err = auth::register(repo.as_ref(), credentials("not-an-email", "abc"))
        .await
        .unwrap_err();
    assert!(!field_messages(&err, "email").is_empty());
    assert!(!field_messages(&err, "password").is_empty());
}

#[tokio::test]
async fn test_login_with_wrong_password_is_a_non_field_error() {
    let repo = support::local_repo();
    auth::register(repo.as_ref(), credentials("carol@example.com", "right-pass"))
        .await
        .unwrap();

    let err = auth::login(repo.as_ref(), credentials("carol@example.com", "wrong-pass"))
        .await
        .unwrap_err();
    assert_eq!(
        field_messages(&err, NON_FIELD_ERRORS),
        vec!["Unable to log in with provided credentials.".to_string()]
    );

    let err = auth::login(repo.as_ref(), credentials("nobody@example.com", "whatever"))
        .await
        .unwrap_err();
    assert!(!field_messages(&err, NON_FIELD_ERRORS).is_empty());
}

#[tokio::test]
async fn test_update_account_rehashes_password() {
    let repo = support::local_repo();
    let user = auth::register(repo.as_ref(), credentials("dave@example.com", "first-pass"))
        .await
        .unwrap();

    let updated = auth::update_account(
        repo.as_ref(),
        &user,
        CredentialsInput {
            email: None,
            password: Some("second-pass".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.email, "dave@example.com");
    assert_ne!(updated.password_hash, user.password_hash);

    assert!(auth::login(repo.as_ref(), credentials("dave@example.com", "first-pass"))
        .await
        .is_err());
    assert!(auth::login(repo.as_ref(), credentials("dave@example.com", "second-pass"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_delete_account_cascades_but_keeps_follow_edges() {
    let repo = support::local_repo();
    let (alice, _) = support::seed_user(&repo, "alice@example.com").await;
    let (bob, _) = support::seed_user(&repo, "bob@example.com").await;

    let post = repo
        .create_post(alice.id, &post_input("Hi", "there", None).into_draft().unwrap())
        .await
        .unwrap();
    posts::like_post(repo.as_ref(), &bob, post.id).await.unwrap();
    follows::follow(repo.as_ref(), &bob, alice.id).await.unwrap();

    auth::delete_account(repo.as_ref(), alice.id).await.unwrap();

    assert_eq!(repo.user_count(), 1);
    assert_eq!(repo.post_count(), 0);
    assert_eq!(repo.like_count(), 0);
    assert_eq!(repo.following_count(), 1);
}

// =============================================================================
// Profiles
// =============================================================================

#[tokio::test]
async fn test_profile_filters_and_follower_details() {
    let repo = support::local_repo();
    let (alice, _) = support::seed_user(&repo, "alice@example.com").await;
    let (bob, _) = support::seed_user(&repo, "bob@example.com").await;
    let (carol, _) = support::seed_user(&repo, "carol@example.com").await;

    let alice_profile = profiles::create_profile(
        repo.as_ref(),
        &alice,
        profile_input("alice", "Rust and coffee", "Kyiv"),
    )
    .await
    .unwrap();
    profiles::create_profile(repo.as_ref(), &bob, profile_input("bob", "Gardening", "Lviv"))
        .await
        .unwrap();
    profiles::create_profile(repo.as_ref(), &carol, profile_input("carol", "RUST", "Lviv"))
        .await
        .unwrap();

    let filter = ProfileFilter {
        bio: Some("rust".to_string()),
        address: Some("lviv".to_string()),
        username: None,
    };
    let found = profiles::list_profiles(repo.as_ref(), &filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].username, "carol");

    follows::follow(repo.as_ref(), &bob, alice.id).await.unwrap();
    follows::follow(repo.as_ref(), &carol, alice.id).await.unwrap();

    let details = profiles::profile_details(repo.as_ref(), alice_profile.id)
        .await
        .unwrap();
    let mut names: Vec<_> = details.followers.iter().map(|p| p.username.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["bob", "carol"]);
}

#[tokio::test]
async fn test_profile_updates_are_owner_only() {
    let repo = support::local_repo();
    let (alice, _) = support::seed_user(&repo, "alice@example.com").await;
    let (mallory, _) = support::seed_user(&repo, "mallory@example.com").await;

    let profile = profiles::create_profile(repo.as_ref(), &alice, profile_input("alice", "bio", "here"))
        .await
        .unwrap();

    let err = profiles::update_profile(
        repo.as_ref(),
        &mallory,
        profile.id,
        profile_input("hacked", "x", "y"),
        false,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied));

    let patched = profiles::update_profile(
        repo.as_ref(),
        &alice,
        profile.id,
        ProfileInput {
            bio: Some("new bio".to_string()),
            ..ProfileInput::default()
        },
        true,
    )
    .await
    .unwrap();
    assert_eq!(patched.bio, "new bio");
    assert_eq!(patched.username, "alice");

    let err = profiles::update_profile(
        repo.as_ref(),
        &alice,
        profile.id,
        ProfileInput {
            bio: Some("only bio".to_string()),
            ..ProfileInput::default()
        },
        false,
    )
    .await
    .unwrap_err();
    assert!(!field_messages(&err, "username").is_empty());
}

#[tokio::test]
async fn test_profile_image_upload_replaces_previous_file() {
    let repo = support::local_repo();
    let media_dir = tempfile::tempdir().unwrap();
    let media = MediaStore::new(media_dir.path(), "/media", 1024);
    let (alice, _) = support::seed_user(&repo, "alice@example.com").await;
    let (bob, _) = support::seed_user(&repo, "bob@example.com").await;
    let profile = profiles::create_profile(repo.as_ref(), &alice, profile_input("Alice Smith", "b", "a"))
        .await
        .unwrap();

    let png = b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR\x00\x00\x00\x01\x00\x00\x00\x01\x08\x06\x00\x00\x00";

    let first = profiles::upload_profile_image(repo.as_ref(), &media, &alice, profile.id, png)
        .await
        .unwrap();
    let first_path = first.image.clone().unwrap();
    assert!(first_path.starts_with("uploads/profiles/alice-smith-"));
    assert!(media_dir.path().join(&first_path).exists());

    let second = profiles::upload_profile_image(repo.as_ref(), &media, &alice, profile.id, png)
        .await
        .unwrap();
    let second_path = second.image.unwrap();
    assert_ne!(first_path, second_path);
    assert!(!media_dir.path().join(&first_path).exists());
    assert!(media_dir.path().join(&second_path).exists());

    let err = profiles::upload_profile_image(repo.as_ref(), &media, &bob, profile.id, png)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied));
}

fn stored_files(root: &std::path::Path, category: &str) -> usize {
    std::fs::read_dir(root.join("uploads").join(category))
        .map(|entries| entries.count())
        .unwrap_or(0)
}

#[tokio::test]
async fn test_failed_image_update_leaves_no_file_behind() {
    let repo = support::local_repo();
    let media_dir = tempfile::tempdir().unwrap();
    let media = MediaStore::new(media_dir.path(), "/media", 1024);
    let queue = RecordingQueue::default();
    let (alice, _) = support::seed_user(&repo, "alice@example.com").await;
    let profile = profiles::create_profile(repo.as_ref(), &alice, profile_input("alice", "b", "a"))
        .await
        .unwrap();
    let post = match posts::create_post(repo.as_ref(), &queue, &alice, post_input("Pic", "x", None))
        .await
        .unwrap()
    {
        CreatedPost::Now(thread) => thread.post,
        CreatedPost::Scheduled { .. } => panic!("post without seconds was queued"),
    };

    let png = b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR\x00\x00\x00\x01\x00\x00\x00\x01\x08\x06\x00\x00\x00";
    repo.set_read_only(true);

    let err = profiles::upload_profile_image(repo.as_ref(), &media, &alice, profile.id, png)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Repository(_)));
    assert_eq!(stored_files(media_dir.path(), "profiles"), 0);

    let err = posts::upload_post_image(repo.as_ref(), &media, &alice, post.id, png)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Repository(_)));
    assert_eq!(stored_files(media_dir.path(), "posts"), 0);

    repo.set_read_only(false);
    let stored = posts::upload_post_image(repo.as_ref(), &media, &alice, post.id, png)
        .await
        .unwrap();
    assert!(stored.image.is_some());
    assert_eq!(stored_files(media_dir.path(), "posts"), 1);
}

// =============================================================================
// Posts, likes and comments
// =============================================================================

#[tokio::test]
async fn test_create_post_immediately_or_through_queue() {
    let repo = support::local_repo();
    let queue = RecordingQueue::default();
    let (alice, _) = support::seed_user(&repo, "alice@example.com").await;

    let created = posts::create_post(repo.as_ref(), &queue, &alice, post_input("Now", "body", None))
        .await
        .unwrap();
    match created {
        CreatedPost::Now(thread) => {
            assert_eq!(thread.post.user_id, alice.id);
            assert!(thread.likes.is_empty());
        }
        other => panic!("expected an immediate post, got {:?}", other),
    }

    let created = posts::create_post(
        repo.as_ref(),
        &queue,
        &alice,
        post_input("Later", "body", Some(60)),
    )
    .await
    .unwrap();
    match created {
        CreatedPost::Scheduled { draft, seconds, .. } => {
            assert_eq!(draft.title, "Later");
            assert_eq!(seconds, 60);
        }
        other => panic!("expected a scheduled post, got {:?}", other),
    }

    assert_eq!(repo.post_count(), 1);
    let jobs = queue.jobs.lock().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].author, alice.id);
    assert_eq!(jobs[0].delay, Duration::from_secs(60));
}

#[tokio::test]
async fn test_create_post_rejects_negative_countdown() {
    let repo = support::local_repo();
    let queue = RecordingQueue::default();
    let (alice, _) = support::seed_user(&repo, "alice@example.com").await;

    let err = posts::create_post(repo.as_ref(), &queue, &alice, post_input("T", "x", Some(-5)))
        .await
        .unwrap_err();
    assert!(!field_messages(&err, "seconds").is_empty());
    assert!(queue.jobs.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_delayed_post_appears_after_countdown() {
    let repo = support::local_repo();
    let queue = TokioPostQueue::new(repo.clone() as Arc<dyn FullRepository>);
    let (alice, _) = support::seed_user(&repo, "alice@example.com").await;

    posts::create_post(
        repo.as_ref(),
        &queue,
        &alice,
        post_input("Scheduled", "hello later", Some(30)),
    )
    .await
    .unwrap();
    assert_eq!(repo.post_count(), 0);

    tokio::time::sleep(Duration::from_secs(29)).await;
    assert_eq!(repo.post_count(), 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    let mine = posts::my_posts(repo.as_ref(), &alice).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].title, "Scheduled");
}

#[tokio::test]
async fn test_like_is_unique_per_user_and_post() {
    let repo = support::local_repo();
    let (alice, _) = support::seed_user(&repo, "alice@example.com").await;
    let (bob, _) = support::seed_user(&repo, "bob@example.com").await;
    let post = repo
        .create_post(alice.id, &post_input("P", "t", None).into_draft().unwrap())
        .await
        .unwrap();

    posts::like_post(repo.as_ref(), &bob, post.id).await.unwrap();
    let thread = posts::like_post(repo.as_ref(), &bob, post.id).await.unwrap();
    assert_eq!(thread.likes.len(), 1);
    assert_eq!(thread.likes[0].user_id, bob.id);

    let liked = posts::liked_posts(repo.as_ref(), &bob).await.unwrap();
    assert_eq!(liked.len(), 1);
    assert_eq!(liked[0].post.id, post.id);

    let thread = posts::unlike_post(repo.as_ref(), &bob, post.id).await.unwrap();
    assert!(thread.likes.is_empty());
    // Unliking again is harmless.
    posts::unlike_post(repo.as_ref(), &bob, post.id).await.unwrap();
    assert!(posts::liked_posts(repo.as_ref(), &bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_post_filters_and_owner_checks() {
    let repo = support::local_repo();
    let media = MediaStore::new(std::env::temp_dir(), "/media", 1024);
    let (alice, _) = support::seed_user(&repo, "alice@example.com").await;
    let (bob, _) = support::seed_user(&repo, "bob@example.com").await;

    for (title, text) in [("Morning run", "5k by the river"), ("Dinner", "Pasta night")] {
        repo.create_post(alice.id, &post_input(title, text, None).into_draft().unwrap())
            .await
            .unwrap();
    }

    let filter = PostFilter {
        title: None,
        text: Some("RIVER".to_string()),
    };
    let found = posts::list_posts(repo.as_ref(), &filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Morning run");
    let post_id = found[0].id;

    let err = posts::update_post(repo.as_ref(), &bob, post_id, post_input("x", "y", None), false)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied));
    let err = posts::delete_post(repo.as_ref(), &media, &bob, post_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied));

    let thread = posts::update_post(
        repo.as_ref(),
        &alice,
        post_id,
        PostInput {
            title: Some("Evening run".to_string()),
            ..PostInput::default()
        },
        true,
    )
    .await
    .unwrap();
    assert_eq!(thread.post.title, "Evening run");
    assert_eq!(thread.post.text, "5k by the river");
}

#[tokio::test]
async fn test_comments_flow_and_post_cascade() {
    let repo = support::local_repo();
    let media = MediaStore::new(std::env::temp_dir(), "/media", 1024);
    let (alice, _) = support::seed_user(&repo, "alice@example.com").await;
    let (bob, _) = support::seed_user(&repo, "bob@example.com").await;
    let post = repo
        .create_post(alice.id, &post_input("P", "t", None).into_draft().unwrap())
        .await
        .unwrap();

    let thread = posts::comment_on_post(
        repo.as_ref(),
        &bob,
        post.id,
        CommentInput {
            text: Some("Nice!".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(thread.comments.len(), 1);
    let comment_id = thread.comments[0].id;

    let err = comments::update_comment(
        repo.as_ref(),
        &alice,
        comment_id,
        CommentInput {
            text: Some("edited by someone else".to_string()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied));

    let edited = comments::update_comment(
        repo.as_ref(),
        &bob,
        comment_id,
        CommentInput {
            text: Some("Very nice!".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(edited.text, "Very nice!");
    assert_eq!(edited.post_id, post.id);

    let on_post = comments::list_comments(repo.as_ref(), Some(post.id)).await.unwrap();
    assert_eq!(on_post.len(), 1);

    posts::like_post(repo.as_ref(), &bob, post.id).await.unwrap();
    posts::delete_post(repo.as_ref(), &media, &alice, post.id)
        .await
        .unwrap();
    assert_eq!(repo.comment_count(), 0);
    assert_eq!(repo.like_count(), 0);
    assert!(matches!(
        comments::get_comment(repo.as_ref(), comment_id).await,
        Err(ServiceError::NotFound(_))
    ));
}

// =============================================================================
// Follow graph
// =============================================================================

#[tokio::test]
async fn test_follow_rules() {
    let repo = support::local_repo();
    let (alice, _) = support::seed_user(&repo, "alice@example.com").await;
    let (bob, _) = support::seed_user(&repo, "bob@example.com").await;

    let err = follows::follow(repo.as_ref(), &alice, alice.id).await.unwrap_err();
    assert!(!field_messages(&err, NON_FIELD_ERRORS).is_empty());

    let err = follows::follow(repo.as_ref(), &alice, UserId::new(999)).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let first = follows::follow(repo.as_ref(), &alice, bob.id).await.unwrap();
    let second = follows::follow(repo.as_ref(), &alice, bob.id).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.user_id, bob.id);
    assert_eq!(first.following_user_id, alice.id);
    assert_eq!(repo.following_count(), 1);

    follows::unfollow(repo.as_ref(), &alice, bob.id).await.unwrap();
    let err = follows::unfollow(repo.as_ref(), &alice, bob.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_followers_following_and_feed() {
    let repo = support::local_repo();
    let (alice, _) = support::seed_user(&repo, "alice@example.com").await;
    let (bob, _) = support::seed_user(&repo, "bob@example.com").await;
    let (carol, _) = support::seed_user(&repo, "carol@example.com").await;
    for (user, name) in [(&alice, "alice"), (&bob, "bob"), (&carol, "carol")] {
        repo.create_profile(
            user.id,
            &profile_input(name, "bio", "addr").into_draft().unwrap(),
        )
        .await
        .unwrap();
    }

    // alice follows bob; carol follows alice
    follows::follow(repo.as_ref(), &alice, bob.id).await.unwrap();
    follows::follow(repo.as_ref(), &carol, alice.id).await.unwrap();

    let following = follows::my_following(repo.as_ref(), &alice).await.unwrap();
    assert_eq!(following.len(), 1);
    assert_eq!(following[0].username, "bob");

    let followers = follows::my_followers(repo.as_ref(), &alice).await.unwrap();
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0].username, "carol");

    repo.create_post(bob.id, &post_input("Bob's post", "b", None).into_draft().unwrap())
        .await
        .unwrap();
    repo.create_post(carol.id, &post_input("Carol's post", "c", None).into_draft().unwrap())
        .await
        .unwrap();

    let feed = follows::following_posts(repo.as_ref(), &alice).await.unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].title, "Bob's post");
}
