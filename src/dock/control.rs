// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Dock process control.
//!
//! The dock keeps its preference store cached in memory, and writes it back
//! whenever it feels like it. Thus, replacing the store on disk is not
//! enough. The dock agent has to be stopped so that it lets go of the store,
//! the new store has to be imported through the preference system, and the
//! agent has to be brought back up so it picks up the new state.
//!
//! All three steps are external commands. They block until the command
//! exits, and are never retried.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::Command,
};
use tracing::{debug, instrument};

/// Label of the launch agent that owns the dock process.
pub const DOCK_AGENT_LABEL: &str = "com.apple.Dock.agent";

/// Launch agent definition of the dock process.
pub const DOCK_AGENT_PLIST: &str = "/System/Library/LaunchAgents/com.apple.Dock.agent.plist";

/// Preference domain of the dock.
pub const DOCK_DOMAIN: &str = "com.apple.dock";

/// Layer of indirection for dock process control.
pub trait DockControl {
    /// Stop dock process so it releases its preference store.
    fn stop(&self) -> Result<()>;

    /// Import preference store at `plist` into the live dock domain.
    fn import(&self, plist: &Path) -> Result<()>;

    /// Bring dock process back up.
    fn restart(&self) -> Result<()>;
}

/// Dock process control through `launchctl` and `defaults`.
#[derive(Debug, Default, Clone)]
pub struct Launchctl;

impl Launchctl {
    /// Construct new launchctl dock controller.
    pub fn new() -> Self {
        Self
    }
}

impl DockControl for Launchctl {
    #[instrument(skip(self), level = "debug")]
    fn stop(&self) -> Result<()> {
        debug!("unload dock launch agent");
        syscall("/bin/launchctl", ["unload", DOCK_AGENT_PLIST]).map_err(ControlError::Stop)?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    fn import(&self, plist: &Path) -> Result<()> {
        debug!("import dock plist {:?}", plist.display());
        syscall(
            "/usr/bin/defaults",
            [OsStr::new("import"), OsStr::new(DOCK_DOMAIN), plist.as_os_str()],
        )
        .map_err(|source| ControlError::Import {
            source,
            plist: plist.into(),
        })?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    fn restart(&self) -> Result<()> {
        debug!("load dock launch agent");
        syscall("/bin/launchctl", ["load", DOCK_AGENT_PLIST]).map_err(ControlError::Restart)?;
        debug!("start dock launch agent");
        syscall("/bin/launchctl", ["start", DOCK_AGENT_LABEL]).map_err(ControlError::Restart)?;
        Ok(())
    }
}

/// Run external command to completion.
///
/// Returns captured stdout and stderr together as one message.
pub(crate) fn syscall(
    cmd: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
) -> std::io::Result<String> {
    let output = Command::new(cmd.as_ref()).args(args).output()?;
    let stdout = String::from_utf8_lossy(output.stdout.as_slice()).into_owned();
    let stderr = String::from_utf8_lossy(output.stderr.as_slice()).into_owned();
    let mut message = String::new();

    if !stdout.is_empty() {
        message.push_str(format!("stdout: {stdout}").as_str());
    }

    if !stderr.is_empty() {
        message.push_str(format!("stderr: {stderr}").as_str());
    }

    // INVARIANT: Chomp trailing newlines.
    let message = message
        .strip_suffix("\r\n")
        .or(message.strip_suffix('\n'))
        .map(ToString::to_string)
        .unwrap_or(message);

    if !output.status.success() {
        return Err(std::io::Error::other(format!(
            "command {:?} failed with {}:\n{message}",
            cmd.as_ref(),
            output.status
        )));
    }

    debug!("{message}");

    Ok(message)
}

/// Dock process control error types.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// Dock agent could not be stopped.
    #[error("failed to stop dock launch agent")]
    Stop(#[source] std::io::Error),

    /// Preference store could not be imported.
    #[error("failed to import dock plist at {:?}", plist.display())]
    Import {
        #[source]
        source: std::io::Error,
        plist: PathBuf,
    },

    /// Dock agent could not be started again.
    #[error("failed to restart dock launch agent")]
    Restart(#[source] std::io::Error),
}

/// Friendly result alias :3
pub type Result<T, E = ControlError> = std::result::Result<T, E>;
