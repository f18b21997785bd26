//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::services::MediaStore;

/// 5 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Listener and media settings for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory uploads are written to and served from
    pub media_root: PathBuf,
    /// Public path the media root is mounted at
    pub media_url_prefix: String,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            media_root: PathBuf::from("./media"),
            media_url_prefix: "/media".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `HOST`: Server host (default: 0.0.0.0)
    /// - `PORT`: Server port (default: 8080)
    /// - `MEDIA_ROOT`: Upload directory (default: ./media)
    /// - `MEDIA_URL_PREFIX`: Public media path (default: /media)
    /// - `MAX_UPLOAD_BYTES`: Largest accepted image (default: 5 MiB)
    ///
    /// Unparseable numbers fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = std::env::var("HOST").unwrap_or(defaults.host);

        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let media_root = std::env::var("MEDIA_ROOT")
            .map(PathBuf::from)
            .unwrap_or(defaults.media_root);

        let media_url_prefix = std::env::var("MEDIA_URL_PREFIX")
            .map(|v| normalize_prefix(&v))
            .unwrap_or(defaults.media_url_prefix);

        let max_upload_bytes = std::env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.max_upload_bytes);

        Self {
            host,
            port,
            media_root,
            media_url_prefix,
            max_upload_bytes,
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn media_store(&self) -> MediaStore {
        MediaStore::new(
            self.media_root.clone(),
            self.media_url_prefix.clone(),
            self.max_upload_bytes,
        )
    }
}

/// Leading slash, no trailing slash.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/media".to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("media/"), "/media");
        assert_eq!(normalize_prefix("/static/uploads/"), "/static/uploads");
        assert_eq!(normalize_prefix("/"), "/media");
    }

    #[test]
    fn test_default_bind_addr() {
        let addr = ServerConfig::default().bind_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }
}
