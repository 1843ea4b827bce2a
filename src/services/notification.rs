//! Desktop notification delivery

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::{process::Command, time::timeout};
use tracing::{debug, info};

/// Shown when a finished timer has no title
pub const DEFAULT_NOTIFICATION_TITLE: &str = "Time's up";
pub const NOTIFICATION_SUBTITLE: &str = "Timer finished";
/// A notification program still running after this is killed
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// How a finished timer is announced
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationMode {
    /// Front-ends listening on `/events` show their own banner
    Floating,
    /// Post a desktop notification as well
    System,
}

pub fn notification_title(title: &str) -> &str {
    if title.trim().is_empty() {
        DEFAULT_NOTIFICATION_TITLE
    } else {
        title
    }
}

/// Program and arguments that post a notification on this platform
pub fn notification_command(
    program: Option<&str>,
    title: &str,
    subtitle: &str,
) -> (String, Vec<String>) {
    if let Some(program) = program {
        return (
            program.to_string(),
            vec![title.to_string(), subtitle.to_string()],
        );
    }

    if cfg!(target_os = "macos") {
        let script = format!(
            "display notification \"{}\" with title \"{}\" sound name \"default\"",
            escape_applescript(subtitle),
            escape_applescript(title),
        );
        ("osascript".to_string(), vec!["-e".to_string(), script])
    } else {
        (
            "notify-send".to_string(),
            vec![title.to_string(), subtitle.to_string()],
        )
    }
}

fn escape_applescript(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Post a desktop notification for a finished timer
pub async fn send_system_notification(
    program: Option<&str>,
    title: &str,
    subtitle: &str,
) -> Result<(), String> {
    let title = notification_title(title);
    let (program, args) = notification_command(program, title, subtitle);
    debug!("Posting notification via {}", program);

    let mut command = Command::new(&program);
    command.args(&args).kill_on_drop(true);
    let output = timeout(NOTIFY_TIMEOUT, command.output())
        .await
        .map_err(|_| format!("{} did not finish within {:?}", program, NOTIFY_TIMEOUT))?
        .map_err(|e| format!("Failed to execute {}: {}", program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{} failed: {}", program, stderr.trim()));
    }

    info!("Notification posted: {}", title);
    Ok(())
}

/// Check that the notification program can be spawned at all
pub async fn check_notifier_available(program: Option<&str>) -> Result<(), String> {
    let (program, _) = notification_command(program, "", "");

    // only spawning matters; the exit status of the probe is ignored
    let mut probe = Command::new(&program);
    probe.arg("--version").kill_on_drop(true);
    timeout(NOTIFY_TIMEOUT, probe.output())
        .await
        .map_err(|_| format!("{} did not answer --version", program))?
        .map_err(|_| format!("{} is not available, system notifications will not be delivered", program))?;

    info!("{} is available", program);
    Ok(())
}
