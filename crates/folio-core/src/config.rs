use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolioConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub book: BookConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log files live here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Shape of the flipbook artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookConfig {
    /// Number of pages between the cover and the contact panel
    #[serde(default = "default_page_count")]
    pub page_count: usize,
    /// Share of each page window spent revealing content
    #[serde(default = "default_content_ratio")]
    pub content_ratio: f64,
    /// Share of each page window spent turning the page
    #[serde(default = "default_flip_ratio")]
    pub flip_ratio: f64,
    /// Artifact width in layout units
    #[serde(default = "default_book_width")]
    pub width: f64,
    /// Artifact height in layout units
    #[serde(default = "default_book_height")]
    pub height: f64,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            page_count: default_page_count(),
            content_ratio: default_content_ratio(),
            flip_ratio: default_flip_ratio(),
            width: default_book_width(),
            height: default_book_height(),
        }
    }
}

impl BookConfig {
    pub fn ratios(&self) -> crate::phase::PhaseRatios {
        crate::phase::PhaseRatios {
            content: self.content_ratio,
            flip: self.flip_ratio,
        }
    }

    pub fn layout(&self) -> crate::phase::BookLayout {
        crate::phase::BookLayout {
            width: self.width,
            height: self.height,
        }
    }
}

/// Durations and easings for programmatic navigation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Direct jump to a page slot
    #[serde(default = "default_page_ms")]
    pub page_ms: u64,
    /// Single natural flip to a neighbouring page
    #[serde(default = "default_natural_flip_ms")]
    pub natural_flip_ms: u64,
    /// Each overlapping turn of a multi-page flip
    #[serde(default = "default_flip_step_ms")]
    pub flip_step_ms: u64,
    /// Delay between overlapping turns
    #[serde(default = "default_flip_stagger_ms")]
    pub flip_stagger_ms: u64,
    /// Direct scroll to the contact boundary
    #[serde(default = "default_contact_ms")]
    pub contact_ms: u64,
    /// Smart navigation: flip to the last page
    #[serde(default = "default_smart_flip_ms")]
    pub smart_flip_ms: u64,
    /// Smart navigation: contact scroll after a flip
    #[serde(default = "default_smart_contact_ms")]
    pub smart_contact_ms: u64,
    /// Pause after a flip that still needs settling
    #[serde(default = "default_settle_gap_ms")]
    pub settle_gap_ms: u64,
    /// Pause after a flip that was nearly complete
    #[serde(default = "default_short_gap_ms")]
    pub short_gap_ms: u64,
    #[serde(default = "default_page_easing")]
    pub page_easing: EasingType,
    #[serde(default = "default_natural_easing")]
    pub natural_easing: EasingType,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            page_ms: default_page_ms(),
            natural_flip_ms: default_natural_flip_ms(),
            flip_step_ms: default_flip_step_ms(),
            flip_stagger_ms: default_flip_stagger_ms(),
            contact_ms: default_contact_ms(),
            smart_flip_ms: default_smart_flip_ms(),
            smart_contact_ms: default_smart_contact_ms(),
            settle_gap_ms: default_settle_gap_ms(),
            short_gap_ms: default_short_gap_ms(),
            page_easing: default_page_easing(),
            natural_easing: default_natural_easing(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds while idle
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Smooth scrolling of raw user input
    #[serde(default)]
    pub scroll: ScrollConfig,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            scroll: ScrollConfig::default(),
        }
    }
}

/// Easing curve applied to a normalized time or progress value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    /// Jump to the end value once the span completes
    None,
    Linear,
    /// Cubic ease-out
    #[default]
    Cubic,
    /// Quintic ease-out
    Quintic,
    /// Exponential ease-out
    EaseOut,
    /// Quadratic ease-in
    EaseIn,
    /// Quadratic ease-in-out
    EaseInOut,
    /// Sine ease-in-out
    Sine,
    /// Smootherstep: gentle start and end around a fast middle (page turns)
    Natural,
}

/// Smooth scrolling settings for raw user input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    #[serde(default = "default_true")]
    pub smooth_enabled: bool,
    #[serde(default = "default_scroll_duration")]
    pub animation_duration_ms: u64,
    #[serde(default)]
    pub easing: EasingType,
    /// Offset units moved per scroll step
    #[serde(default = "default_scroll_lines")]
    pub scroll_lines: u16,
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            smooth_enabled: default_true(),
            animation_duration_ms: default_scroll_duration(),
            easing: EasingType::default(),
            scroll_lines: default_scroll_lines(),
            animation_fps: default_animation_fps(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("folio")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_page_count() -> usize {
    9
}

fn default_content_ratio() -> f64 {
    0.6
}

fn default_flip_ratio() -> f64 {
    0.4
}

fn default_book_width() -> f64 {
    48.0
}

fn default_book_height() -> f64 {
    20.0
}

fn default_page_ms() -> u64 {
    1500
}

fn default_natural_flip_ms() -> u64 {
    2500
}

fn default_flip_step_ms() -> u64 {
    1200
}

fn default_flip_stagger_ms() -> u64 {
    300
}

fn default_contact_ms() -> u64 {
    2000
}

fn default_smart_flip_ms() -> u64 {
    1500
}

fn default_smart_contact_ms() -> u64 {
    1500
}

fn default_settle_gap_ms() -> u64 {
    300
}

fn default_short_gap_ms() -> u64 {
    100
}

fn default_page_easing() -> EasingType {
    EasingType::EaseInOut
}

fn default_natural_easing() -> EasingType {
    EasingType::Natural
}

fn default_tick_rate() -> u64 {
    100
}

fn default_scroll_duration() -> u64 {
    150
}

fn default_scroll_lines() -> u16 {
    1
}

fn default_animation_fps() -> u32 {
    60
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl FolioConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path, defaults when it does not exist
    pub fn load_from(config_path: &std::path::Path) -> crate::Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/folio/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("folio")
            .join("config.toml")
    }

    /// Get the log file path used while the terminal UI owns stdout
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("folio.log")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FolioConfig::default();
        assert_eq!(config.book.page_count, 9);
        assert!((config.book.content_ratio - 0.6).abs() < 1e-12);
        assert!((config.book.flip_ratio - 0.4).abs() < 1e-12);
        assert_eq!(config.navigation.page_ms, 1500);
        assert_eq!(config.navigation.natural_easing, EasingType::Natural);
        assert_eq!(config.ui.scroll.animation_fps, 60);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = FolioConfig::from_toml(
            r#"
            [book]
            page_count = 4

            [navigation]
            contact_ms = 900
            page_easing = "sine"
            "#,
        )
        .unwrap();

        assert_eq!(config.book.page_count, 4);
        assert!((config.book.flip_ratio - 0.4).abs() < 1e-12);
        assert_eq!(config.navigation.contact_ms, 900);
        assert_eq!(config.navigation.page_easing, EasingType::Sine);
        assert_eq!(config.navigation.smart_flip_ms, 1500);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = FolioConfig::from_toml("[book]\npage_count = \"many\"").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_nan_ratio_from_toml_fails_slot_build() {
        let config = FolioConfig::from_toml("[book]\ncontent_ratio = nan").unwrap();
        assert!(config.book.content_ratio.is_nan());
        let err =
            crate::PageSlots::new(config.book.page_count, config.book.ratios()).unwrap_err();
        assert!(matches!(err, crate::Error::PhaseRatio { .. }));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("folio-config-that-does-not-exist.toml");
        let config = FolioConfig::load_from(&path).unwrap();
        assert_eq!(config.book.page_count, 9);
    }

    #[test]
    fn test_tilde_expansion() {
        let plain = PathBuf::from("/var/lib/folio");
        assert_eq!(expand_tilde(&plain), plain);
    }
}
