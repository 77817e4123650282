use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Contributors offered in the "Uploaded By" picker when `CONTRIBUTORS` is unset.
pub const DEFAULT_CONTRIBUTORS: [&str; 8] = [
    "Vamsi Krishna Yevvari",
    "Rayna",
    "Vijayashree",
    "Saakshi",
    "Sneha",
    "Sachin",
    "Manjunath",
    "Shamanth",
];

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_file: PathBuf,
    pub host: String,
    pub port: u16,
    pub cache_ttl_secs: u64,
    /// Persist header migrations detected while reading.
    pub heal_schema_on_read: bool,
    pub frontend_url: String,
    pub contributors: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("ai_tools_database.csv"),
            host: "0.0.0.0".to_string(),
            port: 3000,
            cache_ttl_secs: 600,
            heal_schema_on_read: true,
            frontend_url: "http://localhost:5173".to_string(),
            contributors: DEFAULT_CONTRIBUTORS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl AppConfig {
    /// Read configuration, falling back to defaults for unset or malformed values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_file: env::var("CSV_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_file),
            host: env::var("BACKEND_HOST").unwrap_or(defaults.host),
            port: env::var("BACKEND_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            cache_ttl_secs: env::var("CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_ttl_secs),
            heal_schema_on_read: env::var("HEAL_SCHEMA_ON_READ")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.heal_schema_on_read),
            frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            contributors: env::var("CONTRIBUTORS")
                .ok()
                .map(|v| parse_list(&v))
                .filter(|list| !list.is_empty())
                .unwrap_or(defaults.contributors),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
