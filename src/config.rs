// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the declarative dock file that dorg reads and
//! writes. The file describes pinned applications, pinned folders, and dock
//! chrome settings under a single top-level `dock_items` key. File I/O is
//! left to the caller to figure out.
//!
//! # General Layout
//!
//! ```yaml
//! dock_items:
//!   apps:
//!   - /Applications/Safari.app
//!   - ''
//!   others:
//!   - path: ~/Downloads
//!     sort: 1
//!     display: 1
//!     view: 2
//!   settings:
//!     tilesize: 48
//!     largesize: 64
//!     magnification: true
//! ```
//!
//! An empty string in `apps` is a small spacer, and a single space is a full
//! spacer. Every section is optional.

use serde::{Deserialize, Serialize, Serializer};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    str::FromStr,
};

/// Declarative dock configuration.
#[derive(Default, Debug, PartialEq, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Everything dorg manages lives under `dock_items`.
    #[serde(rename = "dock_items", default)]
    pub dock: DockItems,
}

impl Config {
    /// Check if no dock section was given at all.
    ///
    /// A config is empty when it has no apps, no others, and no settings
    /// block.
    pub fn is_empty(&self) -> bool {
        self.dock.apps.is_empty() && self.dock.others.is_empty() && self.dock.settings.is_none()
    }

    /// Serialize configuration into its YAML file form.
    ///
    /// Empty collections and an absent settings block are omitted.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Serialize`] if YAML serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(ConfigError::Serialize)
    }

    /// Serialize configuration into its canonical comparison form.
    ///
    /// Two configurations describe the same dock if and only if their
    /// canonical forms are byte-equal.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Canonical`] if JSON serialization fails.
    pub fn to_canonical(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(ConfigError::Canonical)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        // INVARIANT: An empty document is an empty configuration, not an error.
        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(data).map_err(ConfigError::Deserialize)
    }
}

impl Display for Config {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.to_yaml()?.as_str())
    }
}

/// Dock items section.
#[derive(Default, Debug, PartialEq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DockItems {
    /// Pinned applications in dock order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub apps: Vec<String>,

    /// Pinned folders and files shown as directory tiles.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub others: Vec<Folder>,

    /// Dock chrome settings. Native settings are left alone when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<DockSettings>,
}

/// Pinned folder entry.
///
/// The `sort`, `display`, and `view` fields are native enumerations that
/// dorg passes through without interpretation.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Folder {
    /// Home-relative path of the folder, e.g., `~/Downloads`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,

    /// Native arrangement.
    #[serde(skip_serializing_if = "is_zero")]
    pub sort: i64,

    /// Native display-as.
    #[serde(skip_serializing_if = "is_zero")]
    pub display: i64,

    /// Native show-as.
    #[serde(skip_serializing_if = "is_zero")]
    pub view: i64,
}

/// Dock chrome settings.
#[derive(Default, Debug, PartialEq, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DockSettings {
    #[serde(rename = "tilesize", skip_serializing_if = "Option::is_none")]
    pub tile_size: Option<SizeValue>,

    #[serde(rename = "largesize", skip_serializing_if = "Option::is_none")]
    pub large_size: Option<SizeValue>,

    pub magnification: bool,

    pub minimize_to_application: bool,

    #[serde(rename = "autohide")]
    pub auto_hide: bool,

    pub show_recents: bool,

    pub size_immutable: bool,
}

/// Numeric dock size that may arrive as an integer or a float.
///
/// Integral floats serialize as integers, so `32` and `32.0` share the same
/// file and canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SizeValue {
    Integer(i64),
    Float(f64),
}

impl SizeValue {
    /// Normalize into one numeric representation.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Integer(value) => value as f64,
            Self::Float(value) => value,
        }
    }
}

impl Serialize for SizeValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match *self {
            Self::Integer(value) => serializer.serialize_i64(value),
            Self::Float(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
                serializer.serialize_i64(value as i64)
            }
            Self::Float(value) => serializer.serialize_f64(value),
        }
    }
}

impl Display for SizeValue {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Integer(value) => write!(fmt, "{value}"),
            Self::Float(value) => write!(fmt, "{value}"),
        }
    }
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(serde_yaml::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(serde_yaml::Error),

    /// Failed to produce canonical comparison form.
    #[error(transparent)]
    Canonical(serde_json::Error),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
