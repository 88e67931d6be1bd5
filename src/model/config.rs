use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration from zignav.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavConfig {
    #[serde(default)]
    pub links: LinkConfig,
    #[serde(default)]
    pub menu: MenuConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Custom URL scheme registered by the native app (e.g. "zigzag").
    /// When set, `zigzag://event/<id>` is accepted alongside https links.
    #[serde(default)]
    pub app_scheme: Option<String>,
    /// Delay between accepting a link and navigating, so the shell is ready
    #[serde(default = "default_navigate_delay_ms")]
    pub navigate_delay_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            app_scheme: None,
            navigate_delay_ms: default_navigate_delay_ms(),
        }
    }
}

impl LinkConfig {
    pub fn navigate_delay(&self) -> Duration {
        Duration::from_millis(self.navigate_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuConfig {
    /// Length of the button transition animation
    #[serde(default = "default_animation_ms")]
    pub animation_ms: u64,
    /// Extra wait before the fallback resolves a lost animation signal
    #[serde(default = "default_fallback_margin_ms")]
    pub fallback_margin_ms: u64,
}

impl Default for MenuConfig {
    fn default() -> Self {
        MenuConfig {
            animation_ms: default_animation_ms(),
            fallback_margin_ms: default_fallback_margin_ms(),
        }
    }
}

impl MenuConfig {
    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.animation_ms + self.fallback_margin_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Queries shorter than this (in chars) return no results
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            debounce_ms: default_debounce_ms(),
            min_query_len: default_min_query_len(),
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// File backing the process-durable store (`activeMenuButton`)
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            state_file: default_state_file(),
        }
    }
}

fn default_navigate_delay_ms() -> u64 {
    100
}

fn default_animation_ms() -> u64 {
    500
}

fn default_fallback_margin_ms() -> u64 {
    50
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_min_query_len() -> usize {
    2
}

fn default_state_file() -> PathBuf {
    PathBuf::from(".zignav-state.json")
}
