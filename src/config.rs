use log::LevelFilter;
use std::str::FromStr;

pub const CATALOG_PATH: &str = "./data/breads.json";

#[derive(Clone, Debug, PartialEq)]
pub struct SiteConfig {
    pub catalog_path: String,
    /// How many breads the home page lists under "latest".
    pub latest_count: usize,
    /// Restrict the home page to categories flagged `featured`.
    pub featured_only: bool,
    /// Upper bound on recipe fetches done to find card covers.
    pub cover_fetch_limit: usize,
    pub log_level: LevelFilter,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            catalog_path: CATALOG_PATH.to_string(),
            latest_count: 8,
            featured_only: true,
            cover_fetch_limit: 8,
            log_level: LevelFilter::Info,
        }
    }
}

impl SiteConfig {
    /// Applies overrides from a location query string such as `?log=debug`.
    /// Unknown keys and unparseable values are ignored.
    pub fn with_query(mut self, search: &str) -> Self {
        let query = search.trim_start_matches('?');
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if key == "log" {
                if let Ok(level) = LevelFilter::from_str(value) {
                    self.log_level = level;
                }
            }
        }
        self
    }
}
