use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::config::Config;
use crate::session::{run_session, SessionOptions};

/// Run a live session on stdout until Ctrl+C or `duration_secs` elapses.
pub fn run(config: &Config, duration_secs: Option<f64>, json: bool) -> Result<()> {
    let duration = duration_secs.map(parse_duration).transpose()?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_ctrlc = shutdown.clone();
    ctrlc::set_handler(move || {
        tracing::info!("Shutdown signal received");
        shutdown_ctrlc.store(true, Ordering::Relaxed);
    })?;

    let options = SessionOptions { duration, json };
    let mut stdout = std::io::stdout().lock();
    let summary = run_session(config, &options, shutdown, &mut stdout)?;

    eprintln!("teleview session:");
    eprintln!("  Cycles:          {}", summary.cycles);
    eprintln!("  Samples:         {}", summary.ingested);
    eprintln!("  Dropped (queue): {}", summary.rejected);
    eprintln!("  Truncated:       {}", summary.truncated);
    eprintln!("  Evicted:         {}", summary.evicted);
    eprintln!("  Window:          {}", summary.window_len);
    Ok(())
}

fn parse_duration(secs: f64) -> Result<Duration> {
    if !secs.is_finite() || secs <= 0.0 {
        anyhow::bail!("Duration must be a positive number of seconds, got {}", secs);
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| anyhow::anyhow!("Duration of {} seconds is out of range: {}", secs, e))
}

/// Write the commented default config to `path`.
pub fn init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = path.ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, Config::generate_default_commented())?;

    println!("Wrote config: {}", path.display());
    Ok(())
}

/// Print the effective configuration.
pub fn show_config(config: &Config) -> Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_config_writes_loadable_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("teleview.toml");

        init_config(Some(path.clone()), false).unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.queue.capacity, 10_000);
    }

    #[test]
    fn test_init_config_refuses_to_overwrite() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("teleview.toml");
        std::fs::write(&path, "[queue]\ncapacity = 5\n").unwrap();

        let result = init_config(Some(path.clone()), false);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("--force"));

        init_config(Some(path.clone()), true).unwrap();
        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.queue.capacity, 10_000);
    }

    #[test]
    fn test_init_config_without_path_errors() {
        assert!(init_config(None, false).is_err());
    }

    #[test]
    fn test_show_config_default() {
        show_config(&Config::default()).unwrap();
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration(1.5).unwrap(), Duration::from_millis(1500));
        assert!(parse_duration(0.0).is_err());
        assert!(parse_duration(f64::NAN).is_err());
    }

    #[test]
    fn test_parse_duration_out_of_range_errors() {
        let result = parse_duration(1e20);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("out of range"));
        // Representable, even if no Instant can be that far ahead.
        assert!(parse_duration(1e19).is_ok());
    }
}
