use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, TelemetryError};
use crate::pipeline::queue::DEFAULT_QUEUE_CAPACITY;
use crate::pipeline::window::{
    DEFAULT_EVICTION_TARGET_FRACTION, DEFAULT_MIN_VISIBLE_RANGE_SECS, DEFAULT_WINDOW_CAPACITY,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub queue: QueueConfig,
    pub window: WindowConfig,
    pub generator: GeneratorConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub capacity: usize,
    pub min_visible_range_secs: f64,
    pub eviction_target_fraction: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub interval_ms: u64,
    pub seed: u64,
    pub initial_a: f64,
    pub initial_b: f64,
    pub upper_limit: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// How often the consumer drains the queue and redraws.
    pub poll_interval_ms: u64,
    /// Number of most recent rows printed per refresh.
    pub rows: usize,
    /// Print nothing until the window holds at least this many samples.
    pub min_rows: usize,
    /// Seconds between pipeline stats log lines. 0 disables them.
    pub stats_interval_secs: u64,
}

// --- Default implementations ---

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_WINDOW_CAPACITY,
            min_visible_range_secs: DEFAULT_MIN_VISIBLE_RANGE_SECS,
            eviction_target_fraction: DEFAULT_EVICTION_TARGET_FRACTION,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            seed: 999,
            initial_a: 32.0,
            initial_b: 63.0,
            upper_limit: 94.0,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            rows: 5,
            min_rows: 5,
            stats_interval_secs: 10,
        }
    }
}

// --- Config loading ---

impl Config {
    /// Load config and return the resolved file path (if any).
    pub fn load_with_path(path: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        // 1. Check explicit path
        if let Some(p) = path {
            let config = Self::read_file(p)?;
            return Ok((config, Some(p.to_path_buf())));
        }

        // 2. Check beside the executable
        if let Ok(exe_path) = std::env::current_exe() {
            let beside_exe = exe_path.parent().map(|p| p.join("teleview.toml"));
            if let Some(p) = beside_exe {
                if p.exists() {
                    let config = Self::read_file(&p)?;
                    return Ok((config, Some(p)));
                }
            }
        }

        // 3. Check platform config directory (e.g. ~/.config/teleview/config.toml)
        if let Some(platform_config) = Self::platform_path() {
            if platform_config.exists() {
                let config = Self::read_file(&platform_config)?;
                return Ok((config, Some(platform_config)));
            }
        }

        // 4. Fall back to defaults
        tracing::info!("No config file found, using defaults");
        Ok((Config::default(), None))
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_path(path).map(|(config, _)| config)
    }

    /// Default location for a user config file.
    pub fn platform_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("teleview").join("config.toml"))
    }

    fn read_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| TelemetryError::ConfigParse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Reject settings the pipeline cannot be built with.
    pub fn validate(&self) -> Result<()> {
        if self.queue.capacity == 0 {
            return Err(TelemetryError::invalid(
                "queue.capacity",
                "capacity must be greater than zero",
            ));
        }
        if self.window.capacity == 0 {
            return Err(TelemetryError::invalid(
                "window.capacity",
                "capacity must be greater than zero",
            ));
        }
        let range = self.window.min_visible_range_secs;
        if !range.is_finite() || range <= 0.0 {
            return Err(TelemetryError::invalid(
                "window.min_visible_range_secs",
                format!("expected a positive number of seconds, got {range}"),
            ));
        }
        let fraction = self.window.eviction_target_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(TelemetryError::invalid(
                "window.eviction_target_fraction",
                format!("expected a fraction in (0, 1], got {fraction}"),
            ));
        }
        if self.generator.interval_ms == 0 {
            return Err(TelemetryError::invalid(
                "generator.interval_ms",
                "interval must be at least 1 ms",
            ));
        }
        if !self.generator.upper_limit.is_finite() || self.generator.upper_limit <= 0.0 {
            return Err(TelemetryError::invalid(
                "generator.upper_limit",
                "upper limit must be a positive number",
            ));
        }
        if self.display.poll_interval_ms == 0 {
            return Err(TelemetryError::invalid(
                "display.poll_interval_ms",
                "poll interval must be at least 1 ms",
            ));
        }
        Ok(())
    }

    /// Generate a default config file with all fields and inline documentation.
    pub fn generate_default_commented() -> String {
        format!(
r#"# teleview configuration

[queue]
# Samples each of the two queue buffers can hold between drains.
# Samples produced while the active buffer is full are dropped.
capacity = {queue_capacity}

[window]
# Samples kept in the rolling display window.
capacity = {window_capacity}
# Shortest time span (seconds) the display covers, even with little data.
min_visible_range_secs = {min_range:.1}
# When the window overflows it is compacted to this fraction of capacity,
# leaving headroom so eviction does not run on every refresh.
eviction_target_fraction = {fraction}

[generator]
# Milliseconds between synthetic samples.
interval_ms = 100
# Random walk seed. The same seed always produces the same series.
seed = 999
# Starting values for series A and B.
initial_a = 32.0
initial_b = 63.0
# Values are reflected back below this limit.
upper_limit = 94.0

[display]
# Milliseconds between drain-and-redraw cycles.
poll_interval_ms = 1000
# Number of most recent rows printed per refresh.
rows = 5
# Print nothing until at least this many samples are in the window.
min_rows = 5
# Seconds between pipeline stats log lines (0 disables).
stats_interval_secs = 10
"#,
            queue_capacity = DEFAULT_QUEUE_CAPACITY,
            window_capacity = DEFAULT_WINDOW_CAPACITY,
            min_range = DEFAULT_MIN_VISIBLE_RANGE_SECS,
            fraction = DEFAULT_EVICTION_TARGET_FRACTION,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.queue.capacity, 10_000);
        assert_eq!(config.window.capacity, 10_000);
        assert_eq!(config.window.min_visible_range_secs, 60.0);
        assert_eq!(config.window.eviction_target_fraction, 0.95);
        assert_eq!(config.generator.interval_ms, 100);
        assert_eq!(config.generator.seed, 999);
        assert_eq!(config.display.poll_interval_ms, 1000);
        assert_eq!(config.display.rows, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml_config() {
        let toml_str = r#"
            [queue]
            capacity = 500

            [display]
            rows = 10
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.queue.capacity, 500);
        assert_eq!(config.display.rows, 10);
        // Defaults still applied for unspecified fields
        assert_eq!(config.display.min_rows, 5);
        assert_eq!(config.window.capacity, 10_000);
        assert_eq!(config.generator.upper_limit, 94.0);
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut config = Config::default();
        config.queue.capacity = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("queue.capacity"));

        let mut config = Config::default();
        config.window.capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_window_settings() {
        let mut config = Config::default();
        config.window.min_visible_range_secs = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.window.eviction_target_fraction = 1.2;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.generator.interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_roundtrip_serialize() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.queue.capacity, config.queue.capacity);
        assert_eq!(
            parsed.window.eviction_target_fraction,
            config.window.eviction_target_fraction
        );
    }

    #[test]
    fn test_load_nonexistent_path_errors() {
        let result = Config::load(Some(Path::new("/nonexistent/config.toml")));
        assert!(matches!(result, Err(TelemetryError::Io(_))));
    }

    #[test]
    fn test_load_malformed_file_reports_path() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config_file = tmp.path().join("teleview.toml");
        std::fs::write(&config_file, "[queue]\ncapacity = \"lots\"\n").unwrap();

        let err = Config::load(Some(config_file.as_path())).unwrap_err();
        assert!(matches!(err, TelemetryError::ConfigParse { .. }));
        assert!(err.to_string().contains("teleview.toml"));
    }

    #[test]
    fn test_load_with_path_returns_resolved_path() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config_file = tmp.path().join("teleview.toml");
        std::fs::write(&config_file, "[window]\ncapacity = 2000\n").unwrap();

        let (config, resolved) = Config::load_with_path(Some(config_file.as_path())).unwrap();
        assert_eq!(config.window.capacity, 2000);
        assert_eq!(resolved, Some(config_file));
    }

    #[test]
    fn test_generate_default_commented_is_valid_toml() {
        let content = Config::generate_default_commented();
        let config: Config = toml::from_str(&content).unwrap();
        assert_eq!(config.queue.capacity, 10_000);
        assert_eq!(config.window.min_visible_range_secs, 60.0);
        assert_eq!(config.window.eviction_target_fraction, 0.95);
        assert_eq!(config.generator.seed, 999);
        assert_eq!(config.display.stats_interval_secs, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generate_default_commented_has_all_sections() {
        let content = Config::generate_default_commented();
        assert!(content.contains("[queue]"));
        assert!(content.contains("[window]"));
        assert!(content.contains("[generator]"));
        assert!(content.contains("[display]"));
    }
}
