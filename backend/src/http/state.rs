//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::services::{MediaStore, PostQueue, TokioPostQueue};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// Upload storage and public URL rendering
    pub media: Arc<MediaStore>,
    /// Where posts with a countdown are submitted
    pub post_queue: Arc<dyn PostQueue>,
}

impl AppState {
    /// Create a state whose delayed posts run on the tokio runtime.
    pub fn new(repository: Arc<dyn FullRepository>, media: MediaStore) -> Self {
        let post_queue = Arc::new(TokioPostQueue::new(Arc::clone(&repository)));
        Self {
            repository,
            media: Arc::new(media),
            post_queue,
        }
    }

    /// Replace the delayed-post queue.
    pub fn with_post_queue(mut self, post_queue: Arc<dyn PostQueue>) -> Self {
        self.post_queue = post_queue;
        self
    }
}
