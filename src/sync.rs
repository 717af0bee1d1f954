// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Synchronization between dock file and native dock store.
//!
//! Three one-shot operations are offered:
//!
//! - __save__: capture the native store into the dock file.
//! - __load__: apply the dock file onto the native store, then reload the
//!   dock.
//! - __check__: compare both sides without touching either.

use crate::{
    config::{Config, DockItems},
    dock::{
        control::{DockControl, Launchctl},
        DockPlist,
    },
    path::{dock_plist_path, home_dir},
    style::{Presenter, Terminal},
};

use serde::Serialize;
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

/// Outcome of comparing dock file against native store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Both sides describe the same dock.
    UpToDate,

    /// Sections that differ between both sides.
    Drifted(Vec<&'static str>),
}

impl CheckOutcome {
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, Self::UpToDate)
    }
}

impl Display for CheckOutcome {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::UpToDate => fmt.write_str("dock items are up-to-date"),
            Self::Drifted(sections) => {
                write!(fmt, "dock items are out-of-date: {}", sections.join(", "))
            }
        }
    }
}

/// Synchronize dock file with native dock store of one home directory.
#[derive(Debug)]
pub struct Syncer<C = Launchctl, P = Terminal>
where
    C: DockControl,
    P: Presenter,
{
    home: PathBuf,
    control: C,
    presenter: P,
}

impl Syncer {
    /// Construct syncer for current user that drives the real dock.
    ///
    /// # Errors
    ///
    /// - Return [`SyncError::NoWayHome`] if home directory cannot be
    ///   determined.
    pub fn try_default() -> Result<Self> {
        Ok(Self::new(home_dir()?, Launchctl::new(), Terminal))
    }
}

impl<C, P> Syncer<C, P>
where
    C: DockControl,
    P: Presenter,
{
    /// Construct new syncer.
    pub fn new(home: impl Into<PathBuf>, control: C, presenter: P) -> Self {
        Self {
            home: home.into(),
            control,
            presenter,
        }
    }

    /// Path to native dock store being synchronized.
    pub fn plist_path(&self) -> PathBuf {
        dock_plist_path(&self.home)
    }

    /// Capture native store into dock file at `file`.
    ///
    /// Missing parent directories of `file` are created.
    ///
    /// # Errors
    ///
    /// - Return [`SyncError::Dock`] if native store cannot be read.
    /// - Return [`SyncError::Config`] if configuration cannot be serialized.
    /// - Return [`SyncError::CreateDir`] or [`SyncError::WriteConfig`] if
    ///   dock file cannot be written.
    #[instrument(skip(self, file), level = "debug")]
    pub fn save(&mut self, file: impl AsRef<Path>) -> Result<()> {
        let file = file.as_ref();
        self.presenter.heading("💾 Save Dock settings");

        let config = DockPlist::open(self.plist_path())?.to_config(&self.home);
        self.present_items(&config.dock);

        if let Some(parent) = file.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SyncError::CreateDir {
                source,
                path: parent.into(),
            })?;
        }
        fs::write(file, config.to_yaml()?).map_err(|source| SyncError::WriteConfig {
            source,
            path: file.into(),
        })?;

        info!("wrote dock settings to {:?}", file.display());
        self.presenter.success("✅ Dock settings saved successfully");

        Ok(())
    }

    /// Apply dock file at `file` onto native store, then reload the dock.
    ///
    /// Pinned applications and folders of the native store are replaced
    /// entirely. Settings are only patched when the dock file has a settings
    /// block. Nothing is written when the dock file is empty.
    ///
    /// # Errors
    ///
    /// - Return [`SyncError::ReadConfig`] or [`SyncError::Config`] if dock
    ///   file cannot be read or decoded.
    /// - Return [`SyncError::EmptyConfig`] if dock file has no sections.
    /// - Return [`SyncError::Dock`] if native store cannot be read, rebuilt,
    ///   or handed over to the dock.
    #[instrument(skip(self, file), level = "debug")]
    pub fn load(&mut self, file: impl AsRef<Path>) -> Result<()> {
        let file = file.as_ref();
        self.presenter.heading("📁 Load Dock settings");

        let config = read_config(file)?;
        if config.is_empty() {
            return Err(SyncError::EmptyConfig { path: file.into() });
        }

        let mut plist = DockPlist::open(self.plist_path())?;
        plist.apply_config(&config.dock, &self.home)?;
        plist.save(&self.control)?;

        self.presenter.success("✅ Dock settings loaded successfully");

        Ok(())
    }

    /// Compare dock file at `file` against native store.
    ///
    /// Both sides are reduced to their canonical form and compared byte for
    /// byte. Neither side is modified.
    ///
    /// # Errors
    ///
    /// - Return [`SyncError::ReadConfig`] or [`SyncError::Config`] if dock
    ///   file cannot be read or decoded.
    /// - Return [`SyncError::Dock`] if native store cannot be read.
    #[instrument(skip(self, file), level = "debug")]
    pub fn check(&mut self, file: impl AsRef<Path>) -> Result<CheckOutcome> {
        let file = file.as_ref();
        self.presenter.heading("🔍 Check Dock items");

        let wanted = read_config(file)?;
        let live = DockPlist::open(self.plist_path())?.to_config(&self.home);

        if wanted.to_canonical()? == live.to_canonical()? {
            self.presenter.success("✅ Dock items are up-to-date!");
            return Ok(CheckOutcome::UpToDate);
        }

        Ok(CheckOutcome::Drifted(drifted_sections(
            &wanted.dock,
            &live.dock,
        )?))
    }

    fn present_items(&mut self, items: &DockItems) {
        self.presenter.heading("Apps");
        for app in &items.apps {
            self.presenter.item(app);
        }

        self.presenter.heading("Folders");
        for other in &items.others {
            self.presenter.item(&other.path);
        }
    }
}

fn read_config(file: &Path) -> Result<Config> {
    let data = fs::read_to_string(file).map_err(|source| SyncError::ReadConfig {
        source,
        path: file.into(),
    })?;

    Ok(data.parse()?)
}

fn drifted_sections(wanted: &DockItems, live: &DockItems) -> Result<Vec<&'static str>> {
    let mut sections = Vec::new();
    if differs(&wanted.apps, &live.apps)? {
        sections.push("apps");
    }
    if differs(&wanted.others, &live.others)? {
        sections.push("others");
    }
    if differs(&wanted.settings, &live.settings)? {
        sections.push("settings");
    }

    Ok(sections)
}

fn differs<T>(lhs: &T, rhs: &T) -> Result<bool>
where
    T: Serialize,
{
    Ok(serde_json::to_vec(lhs).map_err(crate::config::ConfigError::Canonical)?
        != serde_json::to_vec(rhs).map_err(crate::config::ConfigError::Canonical)?)
}

/// Synchronization error types.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Home directory cannot be determined.
    #[error(transparent)]
    NoWayHome(#[from] crate::path::NoWayHome),

    /// Dock file cannot be read.
    #[error("failed to read dock file at {:?}", path.display())]
    ReadConfig {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Parent directory of dock file cannot be created.
    #[error("failed to create directory {:?}", path.display())]
    CreateDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Dock file cannot be written.
    #[error("failed to write dock file at {:?}", path.display())]
    WriteConfig {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Dock file has no dock sections.
    #[error("no dock configuration found in {:?}", path.display())]
    EmptyConfig { path: PathBuf },

    /// Dock file cannot be decoded or encoded.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Native store interaction fails.
    #[error(transparent)]
    Dock(#[from] crate::dock::DockError),
}

/// Friendly result alias :3
pub type Result<T, E = SyncError> = std::result::Result<T, E>;
