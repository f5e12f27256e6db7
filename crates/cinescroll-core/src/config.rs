use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub cinematic: CinematicConfig,
    #[serde(default)]
    pub paged: PagedConfig,
    #[serde(default)]
    pub frame: FrameConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Tuning for the broadcast-only engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CinematicConfig {
    /// Fraction of the remaining distance covered each frame
    #[serde(default = "default_ease")]
    pub ease: f64,
    /// Multiplier applied to raw wheel deltas
    #[serde(default = "default_cinematic_sensitivity")]
    pub sensitivity: f64,
    /// Momentum below which the frame loop stops
    #[serde(default = "default_stop_threshold")]
    pub stop_threshold: f64,
}

impl Default for CinematicConfig {
    fn default() -> Self {
        Self {
            ease: default_ease(),
            sensitivity: default_cinematic_sensitivity(),
            stop_threshold: default_stop_threshold(),
        }
    }
}

/// Tuning for the engine that owns the native scroll position and
/// redirects wheel input into a horizontal gallery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedConfig {
    #[serde(default = "default_ease")]
    pub ease: f64,
    #[serde(default = "default_paged_sensitivity")]
    pub sensitivity: f64,
    #[serde(default = "default_stop_threshold")]
    pub stop_threshold: f64,
    /// Vertical progress (0.0-1.0) at which horizontal mode engages
    #[serde(default = "default_enter_threshold")]
    pub enter_threshold: f64,
    /// Progress below `enter_threshold - exit_hysteresis` leaves horizontal mode
    #[serde(default = "default_exit_hysteresis")]
    pub exit_hysteresis: f64,
    /// Horizontal travel, in viewport widths
    #[serde(default = "default_gallery_span")]
    pub gallery_span: f64,
    /// Log every frame at debug level
    #[serde(default)]
    pub debug: bool,
}

impl Default for PagedConfig {
    fn default() -> Self {
        Self {
            ease: default_ease(),
            sensitivity: default_paged_sensitivity(),
            stop_threshold: default_stop_threshold(),
            enter_threshold: default_enter_threshold(),
            exit_hysteresis: default_exit_hysteresis(),
            gallery_span: default_gallery_span(),
            debug: false,
        }
    }
}

const MAX_FPS: u32 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameConfig {
    /// Target frame rate for the tick loop (0 falls back to 60)
    #[serde(default = "default_fps")]
    pub fps: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { fps: default_fps() }
    }
}

impl FrameConfig {
    pub fn tick_duration(&self) -> Duration {
        if self.fps == 0 {
            Duration::from_millis(16) // ~60fps fallback
        } else {
            // tokio intervals reject a zero period
            Duration::from_secs_f64(1.0 / self.fps as f64).max(Duration::from_millis(1))
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.fps > MAX_FPS {
            return Err(crate::Error::Config(format!(
                "frame.fps must be at most {}, got {}",
                MAX_FPS, self.fps
            )));
        }
        Ok(())
    }
}

/// Public site identity used when rendering Open Graph pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_site_name")]
    pub site_name: String,
    /// Image used for items without media
    #[serde(default = "default_image")]
    pub default_image: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            site_name: default_site_name(),
            default_image: default_image(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ease() -> f64 {
    0.08
}

fn default_cinematic_sensitivity() -> f64 {
    1.2
}

fn default_paged_sensitivity() -> f64 {
    0.3
}

fn default_stop_threshold() -> f64 {
    0.1
}

fn default_enter_threshold() -> f64 {
    0.7
}

fn default_exit_hysteresis() -> f64 {
    0.05
}

fn default_gallery_span() -> f64 {
    3.0
}

fn default_fps() -> u32 {
    60
}

fn default_base_url() -> String {
    "https://example.com/".to_string()
}

fn default_site_name() -> String {
    "Portfolio".to_string()
}

fn default_image() -> String {
    "https://example.com/og-default.png".to_string()
}

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}

fn check_unit(name: &str, value: f64) -> crate::Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(crate::Error::Config(format!("{name} must be in [0, 1], got {value}")))
    }
}

fn check_positive(name: &str, value: f64) -> crate::Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(crate::Error::Config(format!("{name} must be positive, got {value}")))
    }
}

impl CinematicConfig {
    pub fn validate(&self) -> crate::Result<()> {
        check_positive("cinematic.ease", self.ease)?;
        check_unit("cinematic.ease", self.ease)?;
        check_positive("cinematic.sensitivity", self.sensitivity)?;
        check_positive("cinematic.stop_threshold", self.stop_threshold)
    }
}

impl PagedConfig {
    pub fn validate(&self) -> crate::Result<()> {
        check_positive("paged.ease", self.ease)?;
        check_unit("paged.ease", self.ease)?;
        check_positive("paged.sensitivity", self.sensitivity)?;
        check_positive("paged.stop_threshold", self.stop_threshold)?;
        check_unit("paged.enter_threshold", self.enter_threshold)?;
        check_unit("paged.exit_hysteresis", self.exit_hysteresis)?;
        check_positive("paged.gallery_span", self.gallery_span)
    }
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path, falling back to defaults
    /// when the file does not exist
    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        let config: Self = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
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

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        self.cinematic.validate()?;
        self.paged.validate()?;
        self.frame.validate()?;
        url::Url::parse(&self.site.base_url)?;
        Ok(())
    }

    /// Always uses ~/.config/cinescroll/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("cinescroll")
            .join("config.toml")
    }
}
