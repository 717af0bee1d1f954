// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Organize the macOS dock through a declarative YAML file.
//!
//! Dorg keeps a dock file in sync with the dock's native preference store.
//! The current dock can be saved into the file, the file can be loaded back
//! into the dock, and both can be checked against each other for drift.

pub mod config;
pub mod dock;
pub mod path;
pub mod style;
pub mod sync;

pub use config::{Config, DockItems, DockSettings, Folder, SizeValue};
pub use dock::{
    control::{DockControl, Launchctl},
    DockPlist,
};
pub use sync::{CheckOutcome, Syncer};
