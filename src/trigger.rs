//! Daily trigger installation.
//!
//! The pipeline itself runs under an external scheduler. This maintenance
//! command installs a crontab line invoking the `run` subcommand at a fixed
//! local hour. Installation is idempotent: any line previously installed for
//! this binary's run command is removed before the new one is added.

use std::error::Error;
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::info;

/// Replace this binary's crontab entry with a daily run at `hour`:00.
pub fn install_trigger(config_path: &str, hour: u8) -> Result<(), Box<dyn Error>> {
    if hour > 23 {
        return Err(format!("hour out of range: {hour}").into());
    }
    let exe = std::env::current_exe()?;
    let marker = format!("{} run", exe.display());

    // A missing crontab ("no crontab for user") starts from an empty table.
    let current = Command::new("crontab").arg("-l").output();
    let mut lines: Vec<String> = match current {
        Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    let before = lines.len();
    lines.retain(|line| !line.contains(&marker));
    let removed = before - lines.len();

    lines.push(cron_line(hour, &marker, config_path));

    let mut child = Command::new("crontab")
        .arg("-")
        .stdin(Stdio::piped())
        .spawn()?;
    child
        .stdin
        .take()
        .ok_or("failed to open crontab stdin")?
        .write_all(format!("{}\n", lines.join("\n")).as_bytes())?;
    let status = child.wait()?;
    if !status.success() {
        return Err(format!("crontab install failed with {status}").into());
    }

    info!(hour, removed, "Installed daily trigger");
    Ok(())
}

fn cron_line(hour: u8, run_command: &str, config_path: &str) -> String {
    format!("0 {hour} * * * {run_command} --config {config_path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cron_line_fires_daily_at_hour() {
        assert_eq!(
            cron_line(9, "/usr/local/bin/radio_episode_log run", "/etc/radio/config.yaml"),
            "0 9 * * * /usr/local/bin/radio_episode_log run --config /etc/radio/config.yaml"
        );
    }

    #[test]
    fn test_out_of_range_hour_rejected() {
        assert!(install_trigger("config.yaml", 24).is_err());
    }
}
