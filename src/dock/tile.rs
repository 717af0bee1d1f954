// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Native dock tile records.
//!
//! A __tile__ is one entry of the dock's `persistent-apps` or
//! `persistent-others` arrays. Application tiles either point at a bundle
//! through a file reference, or act as spacers without any reference at all.
//! Directory tiles always point at a folder or file, and carry a label plus
//! the arrangement, display-as, and show-as enumerations the dock uses to
//! present the folder's contents.
//!
//! Only the keys dorg needs are modeled. Anything else the dock stores in a
//! tile is dropped when the tile is read, since tiles are always rebuilt
//! from scratch on load.

use crate::{
    config::Folder,
    path::{file_label, url_to_path},
};

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, path::Path};

/// Tile type of a pinned application.
pub const FILE_TILE: &str = "file-tile";

/// Tile type of a pinned folder or file.
pub const DIRECTORY_TILE: &str = "directory-tile";

/// Tile type of a full width spacer.
pub const SPACER_TILE: &str = "spacer-tile";

/// Tile type of a half width spacer.
pub const SMALL_SPACER_TILE: &str = "small-spacer-tile";

/// File type discriminant of application references.
pub const APP_FILE_TYPE: i64 = 41;

/// File type discriminant of directory references.
pub const DIRECTORY_FILE_TYPE: i64 = 2;

/// URL string type of a plain absolute path.
pub const PLAIN_PATH_URL_TYPE: i64 = 0;

/// Exclusive upper bound of generated tile identifiers.
pub const MAX_GUID: i64 = 9_999_999_999;

/// File reference of a tile.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileData {
    #[serde(rename = "_CFURLString", default)]
    pub url_string: String,

    #[serde(rename = "_CFURLStringType", default)]
    pub url_string_type: i64,
}

impl FileData {
    /// Reference a plain absolute path.
    pub fn plain(path: impl Into<String>) -> Self {
        Self {
            url_string: path.into(),
            url_string_type: PLAIN_PATH_URL_TYPE,
        }
    }
}

/// Entry of `persistent-apps`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AppTile {
    #[serde(rename = "GUID", default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<i64>,

    #[serde(default)]
    pub tile_type: String,

    #[serde(default)]
    pub tile_data: AppTileData,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AppTileData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_data: Option<FileData>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<i64>,
}

impl AppTile {
    /// Build tile for one `apps` entry of the dock file.
    ///
    /// An empty entry becomes a small spacer, a single space becomes a full
    /// spacer, and anything else becomes a file tile carrying the entry
    /// verbatim. Spacers never receive an identifier.
    pub fn from_entry(entry: &str, guid: i64) -> Self {
        match entry {
            "" => Self::spacer(SMALL_SPACER_TILE),
            " " => Self::spacer(SPACER_TILE),
            path => Self {
                guid: Some(guid),
                tile_type: FILE_TILE.into(),
                tile_data: AppTileData {
                    file_data: Some(FileData::plain(path)),
                    file_type: Some(APP_FILE_TYPE),
                },
            },
        }
    }

    fn spacer(tile_type: &str) -> Self {
        Self {
            guid: None,
            tile_type: tile_type.into(),
            tile_data: AppTileData::default(),
        }
    }

    /// Check if tile is a placeholder without a file reference.
    pub fn is_spacer(&self) -> bool {
        matches!(self.tile_type.as_str(), SPACER_TILE | SMALL_SPACER_TILE)
    }

    /// Logical path of tile as written in the dock file.
    ///
    /// Spacers map back to the entries that produce them.
    pub fn path(&self) -> String {
        match self.tile_type.as_str() {
            SMALL_SPACER_TILE => String::new(),
            SPACER_TILE => " ".into(),
            _ => self
                .tile_data
                .file_data
                .as_ref()
                .map(|data| url_to_path(&data.url_string))
                .unwrap_or_default(),
        }
    }
}

/// Entry of `persistent-others`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct OtherTile {
    #[serde(rename = "GUID", default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<i64>,

    #[serde(default)]
    pub tile_type: String,

    #[serde(default)]
    pub tile_data: OtherTileData,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct OtherTileData {
    #[serde(default)]
    pub arrangement: i64,

    #[serde(rename = "displayas", default)]
    pub display_as: i64,

    #[serde(rename = "showas", default)]
    pub show_as: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_data: Option<FileData>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<i64>,
}

impl OtherTile {
    /// Build directory tile for an already resolved folder path.
    ///
    /// The label comes from the last segment of `resolved`, and the folder's
    /// sort, display, and view enumerations are copied verbatim.
    pub fn directory(resolved: impl AsRef<Path>, folder: &Folder, guid: i64) -> Self {
        let resolved = resolved.as_ref();
        Self {
            guid: Some(guid),
            tile_type: DIRECTORY_TILE.into(),
            tile_data: OtherTileData {
                arrangement: folder.sort,
                display_as: folder.display,
                show_as: folder.view,
                file_data: Some(FileData::plain(resolved.to_string_lossy())),
                file_label: Some(file_label(resolved)),
                file_type: Some(DIRECTORY_FILE_TYPE),
                directory: Some(1),
            },
        }
    }

    /// Absolute path of tile with URL quirks removed.
    pub fn path(&self) -> String {
        self.tile_data
            .file_data
            .as_ref()
            .map(|data| url_to_path(&data.url_string))
            .unwrap_or_default()
    }
}

/// Allocator of random tile identifiers.
///
/// # Invariant
///
/// - Never hands out an identifier it already knows about.
#[derive(Debug, Default, Clone)]
pub struct GuidPool {
    taken: HashSet<i64>,
}

impl GuidPool {
    /// Construct new pool that avoids `taken` identifiers.
    pub fn new(taken: impl IntoIterator<Item = i64>) -> Self {
        Self {
            taken: taken.into_iter().collect(),
        }
    }

    /// Allocate a fresh identifier in `0..MAX_GUID`.
    pub fn allocate(&mut self) -> i64 {
        let mut rng = rand::thread_rng();
        loop {
            let guid = rng.gen_range(0..MAX_GUID);
            if self.taken.insert(guid) {
                return guid;
            }
        }
    }
}
