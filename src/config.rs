//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::{
    mapper::{MapperConfig, MapperConfigError},
    services::NotificationMode,
};

const DEFAULT_SNOOZE_MINUTES: u32 = 5;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "flux-timer")]
#[command(about = "A floating countdown timer daemon with snoozable notifications")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Snooze choices offered on a finished timer, in minutes
    #[arg(long, value_delimiter = ',', default_value = "1,5,30")]
    pub snooze_options: Vec<u32>,

    /// How finished timers are announced
    #[arg(long, value_enum, default_value = "floating")]
    pub notification: NotificationMode,

    /// Program used for system notifications, called as `<program> <title> <subtitle>`
    #[arg(long)]
    pub notify_command: Option<String>,

    /// Seconds before an unanswered completion is dismissed (0 keeps it)
    #[arg(long, default_value = "30")]
    pub banner_timeout: u64,

    /// Preset file (defaults to the user data directory)
    #[arg(long)]
    pub presets_file: Option<PathBuf>,

    /// Half-width of each snap plateau, in minutes
    #[arg(long, default_value = "0.8")]
    pub snap_tolerance: f64,

    /// Durations the capsule snaps to while dragging, in minutes
    #[arg(long, value_delimiter = ',', default_value = "5,10,15,30,45,60")]
    pub snap_targets: Vec<u32>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn mapper_config(&self) -> Result<MapperConfig, MapperConfigError> {
        let config = MapperConfig::default()
            .with_snap_targets(self.snap_targets.clone())
            .with_snap_tolerance(self.snap_tolerance);
        config.validate()?;
        Ok(config)
    }

    pub fn timer_settings(&self) -> Result<TimerSettings, MapperConfigError> {
        Ok(TimerSettings {
            snooze_options: self.snooze_options.clone(),
            banner_timeout: (self.banner_timeout > 0)
                .then(|| Duration::from_secs(self.banner_timeout)),
            notification: self.notification,
            notify_command: self.notify_command.clone(),
            mapper: self.mapper_config()?,
        })
    }

    /// Preset file location, `None` when no data directory is known
    pub fn presets_path(&self) -> Option<PathBuf> {
        self.presets_file.clone().or_else(|| {
            dirs::data_dir().map(|dir| dir.join("flux-timer").join("presets.json"))
        })
    }
}

/// Runtime knobs passed explicitly into the state and tasks
#[derive(Debug, Clone, PartialEq)]
pub struct TimerSettings {
    pub snooze_options: Vec<u32>,
    pub banner_timeout: Option<Duration>,
    pub notification: NotificationMode,
    pub notify_command: Option<String>,
    pub mapper: MapperConfig,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            snooze_options: vec![1, 5, 30],
            banner_timeout: Some(Duration::from_secs(30)),
            notification: NotificationMode::Floating,
            notify_command: None,
            mapper: MapperConfig::default(),
        }
    }
}

impl TimerSettings {
    /// Snooze length used when a reply does not name one
    pub fn default_snooze_minutes(&self) -> u32 {
        self.snooze_options
            .first()
            .copied()
            .unwrap_or(DEFAULT_SNOOZE_MINUTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_capsule() {
        let config = Config::try_parse_from(["flux-timer"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.snooze_options, vec![1, 5, 30]);
        assert_eq!(config.log_level(), "info");

        let settings = config.timer_settings().unwrap();
        assert_eq!(settings, TimerSettings::default());
    }

    #[test]
    fn lists_and_timeout_parse() {
        let config = Config::try_parse_from([
            "flux-timer",
            "--snooze-options",
            "2,10",
            "--banner-timeout",
            "0",
            "--snap-targets",
            "25,5",
            "--notification",
            "system",
            "-v",
        ])
        .unwrap();

        let settings = config.timer_settings().unwrap();
        assert_eq!(settings.default_snooze_minutes(), 2);
        assert_eq!(settings.banner_timeout, None);
        assert_eq!(settings.mapper.snap_targets, vec![5, 25]);
        assert_eq!(settings.notification, NotificationMode::System);
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn bad_tolerance_is_rejected() {
        let config =
            Config::try_parse_from(["flux-timer", "--snap-tolerance", "3"]).unwrap();
        assert!(config.timer_settings().is_err());
    }

    #[test]
    fn explicit_presets_file_wins() {
        let config =
            Config::try_parse_from(["flux-timer", "--presets-file", "/tmp/p.json"]).unwrap();
        assert_eq!(config.presets_path(), Some(PathBuf::from("/tmp/p.json")));
    }

    #[test]
    fn empty_snooze_options_fall_back() {
        let settings = TimerSettings {
            snooze_options: Vec::new(),
            ..TimerSettings::default()
        };
        assert_eq!(settings.default_snooze_minutes(), DEFAULT_SNOOZE_MINUTES);
    }
}
