//! Filter configuration.
//!
//! The allow-set, placeholder sentinel and venue denylist are plain data handed
//! to [`crate::filter::FilterEngine`]. Defaults match the shipped catalog; the
//! environment or a JSON file can override any list.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::environment::{get_env_var, get_env_var_as_vec};
use crate::record::{GENRE_MOVIE, GENRE_TRAVEL};
use crate::TARGET_PIPELINE;

pub const ENV_ALLOWED_REGIONS: &str = "MARQUEE_ALLOWED_REGIONS";
pub const ENV_VENUE_BLOCKLIST: &str = "MARQUEE_VENUE_BLOCKLIST";
pub const ENV_TICKET_PLACEHOLDER: &str = "MARQUEE_TICKET_PLACEHOLDER";

/// Venue text one ticketing source emits when its scraper could not find a venue.
pub const DEFAULT_TICKET_PLACEHOLDER: &str = "예매하러 가기";

const DEFAULT_ALLOWED_REGIONS: &[&str] = &["seoul", "gyeonggi", "incheon"];

/// Venues outside the metro area that sources have tagged with a metro region.
const DEFAULT_VENUE_BLOCKLIST: &[&str] = &[
    "부산",
    "대구",
    "광주",
    "대전",
    "울산",
    "제주",
    "창원",
    "전주",
    "춘천",
    "강릉",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Regions a ticketed listing must belong to.
    pub allowed_regions: Vec<String>,
    /// Exact venue value meaning "no venue was extracted".
    pub ticket_placeholder: String,
    /// Substrings that disqualify a venue.
    pub venue_blocklist: Vec<String>,
    /// Genres kept regardless of date, region or venue.
    pub exempt_genres: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            allowed_regions: to_owned(DEFAULT_ALLOWED_REGIONS),
            ticket_placeholder: DEFAULT_TICKET_PLACEHOLDER.to_string(),
            venue_blocklist: to_owned(DEFAULT_VENUE_BLOCKLIST),
            exempt_genres: vec![GENRE_MOVIE.to_string(), GENRE_TRAVEL.to_string()],
        }
    }
}

impl FilterConfig {
    /// Defaults, with any list overridden by its environment variable.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(regions) = get_env_var_as_vec(ENV_ALLOWED_REGIONS, ';') {
            info!(target: TARGET_PIPELINE, "Allowed regions overridden from {}: {:?}", ENV_ALLOWED_REGIONS, regions);
            self.allowed_regions = regions;
        }
        if let Some(blocklist) = get_env_var_as_vec(ENV_VENUE_BLOCKLIST, ';') {
            info!(target: TARGET_PIPELINE, "Venue blocklist overridden from {} ({} entries)", ENV_VENUE_BLOCKLIST, blocklist.len());
            self.venue_blocklist = blocklist;
        }
        if let Some(placeholder) = get_env_var(ENV_TICKET_PLACEHOLDER) {
            self.ticket_placeholder = placeholder;
        }
        self
    }

    /// Load a JSON config file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json_data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read filter config {}", path.display()))?;
        let config: FilterConfig = serde_json::from_str(&json_data)
            .with_context(|| format!("Failed to parse filter config {}", path.display()))?;
        Ok(config)
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_defaults() {
        let config = FilterConfig::default();
        assert_eq!(config.allowed_regions, vec!["seoul", "gyeonggi", "incheon"]);
        assert_eq!(config.ticket_placeholder, DEFAULT_TICKET_PLACEHOLDER);
        assert!(config.exempt_genres.contains(&"movie".to_string()));
        assert!(config.exempt_genres.contains(&"travel".to_string()));
    }

    #[test]
    fn test_json_file_falls_back_to_defaults() {
        let dir = env::temp_dir().join(format!("marquee-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("filter.json");
        fs::write(&path, r#"{"allowed_regions": ["busan"]}"#).unwrap();

        let config = FilterConfig::from_json_file(&path).unwrap();
        assert_eq!(config.allowed_regions, vec!["busan"]);
        assert_eq!(config.ticket_placeholder, DEFAULT_TICKET_PLACEHOLDER);
        assert_eq!(config.venue_blocklist, FilterConfig::default().venue_blocklist);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let err = FilterConfig::from_json_file(Path::new("/nonexistent/marquee.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/marquee.json"));
    }
}
