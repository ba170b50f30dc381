use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub media_root: PathBuf,
    /// Longest side of stored images, in pixels
    pub image_max_dimension: u32,
    pub max_upload_bytes: usize,
    pub session_idle_hours: u64,
    pub site_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://artfolio.db?mode=rwc".to_string(),
            port: 8000,
            cors_allowed_origins: Vec::new(),
            media_root: PathBuf::from("media"),
            image_max_dimension: 1920,
            max_upload_bytes: 20 * 1024 * 1024,
            session_idle_hours: 24,
            site_name: "IrenFantasyArt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            port: parse_var("PORT").unwrap_or(defaults.port),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            media_root: env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.media_root),
            image_max_dimension: parse_var("IMAGE_MAX_DIMENSION")
                .filter(|d| *d > 0)
                .unwrap_or(defaults.image_max_dimension),
            max_upload_bytes: parse_var::<usize>("MAX_UPLOAD_MB")
                .map(|mb| mb * 1024 * 1024)
                .unwrap_or(defaults.max_upload_bytes),
            session_idle_hours: parse_var("SESSION_IDLE_HOURS")
                .unwrap_or(defaults.session_idle_hours),
            site_name: env::var("SITE_NAME").unwrap_or(defaults.site_name),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
