// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Native dock preference store.
//!
//! The dock persists its state as a binary property list under
//! `~/Library/Preferences/com.apple.dock.plist`. Pinned applications live in
//! the `persistent-apps` array, pinned folders live in the
//! `persistent-others` array, and dock chrome settings are plain top-level
//! keys next to them.
//!
//! # Mapping
//!
//! [`DockPlist::to_config`] captures native state into a [`Config`], and
//! [`DockPlist::apply_config`] rebuilds native state from one. Both pinned
//! arrays are always rebuilt in full from the configuration, while settings
//! are patched key by key. Top-level keys dorg does not model are kept as
//! they are, so unrelated dock preferences survive a load.
//!
//! Tile identifiers are regenerated whenever a tile is rebuilt. They carry
//! no meaning for dorg.
//!
//! # Writing
//!
//! The live store cannot simply be overwritten, because the dock process
//! holds it in memory. See [`control`] for how [`DockPlist::save`] hands a
//! staged copy over to the dock.

pub mod control;
pub mod tile;

use crate::{
    config::{Config, DockItems, DockSettings, Folder, SizeValue},
    dock::{
        control::DockControl,
        tile::{AppTile, GuidPool, OtherTile},
    },
    path::{contract_home, expand_home},
};

use plist::{Dictionary, Value};
use serde::de::DeserializeOwned;
use std::{
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

pub const PERSISTENT_APPS_KEY: &str = "persistent-apps";
pub const PERSISTENT_OTHERS_KEY: &str = "persistent-others";
pub const TILE_SIZE_KEY: &str = "tilesize";
pub const LARGE_SIZE_KEY: &str = "largesize";
pub const MAGNIFICATION_KEY: &str = "magnification";
pub const MINIMIZE_TO_APPLICATION_KEY: &str = "minimize-to-application";
pub const AUTO_HIDE_KEY: &str = "autohide";
pub const SHOW_RECENTS_KEY: &str = "show-recents";
pub const SIZE_IMMUTABLE_KEY: &str = "size-immutable";

/// Smallest accepted tile size.
pub const MIN_SIZE: f64 = 16.0;

/// Largest accepted tile size.
pub const MAX_SIZE: f64 = 128.0;

/// Decoded dock preference store.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DockPlist {
    pub persistent_apps: Vec<AppTile>,
    pub persistent_others: Vec<OtherTile>,
    pub tile_size: Option<SizeValue>,
    pub large_size: Option<SizeValue>,
    pub magnification: bool,
    pub minimize_to_application: bool,
    pub auto_hide: bool,
    pub show_recents: bool,
    pub size_immutable: bool,
    rest: Dictionary,
}

impl DockPlist {
    /// Read dock preference store at `path`.
    ///
    /// # Errors
    ///
    /// - Return [`DockError::StoreUnavailable`] if store cannot be read.
    /// - Return [`DockError::StoreCorrupt`] if store is not a valid plist.
    /// - Return [`DockError::NotADictionary`] if store root is not a
    ///   dictionary.
    /// - Return [`DockError::MalformedKey`] or [`DockError::UnexpectedType`]
    ///   if a known key has the wrong shape.
    #[instrument(skip(path), level = "debug")]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("read dock plist {:?}", path.display());
        let data = fs::read(path).map_err(|source| DockError::StoreUnavailable {
            source,
            path: path.into(),
        })?;
        let dictionary = Value::from_reader(Cursor::new(data))
            .map_err(|source| DockError::StoreCorrupt {
                source,
                path: path.into(),
            })?
            .into_dictionary()
            .ok_or_else(|| DockError::NotADictionary { path: path.into() })?;

        Self::from_dictionary(dictionary)
    }

    /// Decode dock state from root dictionary of a dock plist.
    ///
    /// # Errors
    ///
    /// - Return [`DockError::MalformedKey`] if a pinned item array cannot be
    ///   decoded into tiles.
    /// - Return [`DockError::UnexpectedType`] if a setting holds a value of
    ///   the wrong type.
    pub fn from_dictionary(mut rest: Dictionary) -> Result<Self> {
        Ok(Self {
            persistent_apps: take_tiles(&mut rest, PERSISTENT_APPS_KEY)?,
            persistent_others: take_tiles(&mut rest, PERSISTENT_OTHERS_KEY)?,
            tile_size: take_size(&mut rest, TILE_SIZE_KEY)?,
            large_size: take_size(&mut rest, LARGE_SIZE_KEY)?,
            magnification: take_flag(&mut rest, MAGNIFICATION_KEY)?,
            minimize_to_application: take_flag(&mut rest, MINIMIZE_TO_APPLICATION_KEY)?,
            auto_hide: take_flag(&mut rest, AUTO_HIDE_KEY)?,
            show_recents: take_flag(&mut rest, SHOW_RECENTS_KEY)?,
            size_immutable: take_flag(&mut rest, SIZE_IMMUTABLE_KEY)?,
            rest,
        })
    }

    /// Encode dock state back into a root dictionary.
    ///
    /// # Errors
    ///
    /// - Return [`DockError::Encode`] if tiles cannot be encoded.
    pub fn into_dictionary(self) -> Result<Dictionary> {
        let mut dictionary = self.rest;
        dictionary.insert(
            PERSISTENT_APPS_KEY.into(),
            plist::to_value(&self.persistent_apps).map_err(DockError::Encode)?,
        );
        dictionary.insert(
            PERSISTENT_OTHERS_KEY.into(),
            plist::to_value(&self.persistent_others).map_err(DockError::Encode)?,
        );

        // INVARIANT: Sizes that were never set stay unset.
        if let Some(size) = self.tile_size {
            dictionary.insert(TILE_SIZE_KEY.into(), size_to_value(size));
        }
        if let Some(size) = self.large_size {
            dictionary.insert(LARGE_SIZE_KEY.into(), size_to_value(size));
        }

        for (key, flag) in [
            (MAGNIFICATION_KEY, self.magnification),
            (MINIMIZE_TO_APPLICATION_KEY, self.minimize_to_application),
            (AUTO_HIDE_KEY, self.auto_hide),
            (SHOW_RECENTS_KEY, self.show_recents),
            (SIZE_IMMUTABLE_KEY, self.size_immutable),
        ] {
            dictionary.insert(key.into(), Value::Boolean(flag));
        }

        Ok(dictionary)
    }

    /// Native keys that dorg does not model.
    pub fn unmanaged(&self) -> &Dictionary {
        &self.rest
    }

    /// Capture dock state as configuration.
    ///
    /// Folder paths that lie under `home` are rewritten relative to it.
    /// Settings are always captured.
    pub fn to_config(&self, home: impl AsRef<Path>) -> Config {
        let home = home.as_ref();
        let apps = self.persistent_apps.iter().map(AppTile::path).collect();
        let others = self
            .persistent_others
            .iter()
            .map(|tile| Folder {
                path: contract_home(&tile.path(), home),
                sort: tile.tile_data.arrangement,
                display: tile.tile_data.display_as,
                view: tile.tile_data.show_as,
            })
            .collect();
        let settings = DockSettings {
            tile_size: self.tile_size,
            large_size: self.large_size,
            magnification: self.magnification,
            minimize_to_application: self.minimize_to_application,
            auto_hide: self.auto_hide,
            show_recents: self.show_recents,
            size_immutable: self.size_immutable,
        };

        Config {
            dock: DockItems {
                apps,
                others,
                settings: Some(settings),
            },
        }
    }

    /// Rebuild dock state from configuration.
    ///
    /// Discards every existing application and directory tile, then rebuilds
    /// both arrays in the order the configuration lists them. Settings are
    /// only touched when the configuration has a settings block. Nothing
    /// changes if any entry is rejected.
    ///
    /// # Errors
    ///
    /// - Return [`DockError::Path`] if a folder path is not home-relative.
    /// - Return [`DockError::SizeOutOfRange`] if a size falls outside of
    ///   16 to 128.
    #[instrument(skip(self, items, home), level = "debug")]
    pub fn apply_config(&mut self, items: &DockItems, home: impl AsRef<Path>) -> Result<()> {
        let mut staged = self.clone();
        staged.persistent_apps.clear();
        staged.persistent_others.clear();

        for app in &items.apps {
            info!("adding app to dock: {app:?}");
            staged.add_app(app);
        }

        for other in &items.others {
            info!("adding other to dock: {:?}", other.path);
            staged.add_other(other, home.as_ref())?;
        }

        if let Some(settings) = &items.settings {
            staged.apply_settings(settings)?;
        }

        *self = staged;

        Ok(())
    }

    /// Append application tile for one `apps` entry.
    pub fn add_app(&mut self, entry: &str) {
        let guid = self.guid_pool().allocate();
        self.persistent_apps.push(AppTile::from_entry(entry, guid));
    }

    /// Append directory tile for one `others` entry.
    ///
    /// # Errors
    ///
    /// - Return [`DockError::Path`] if folder path is not home-relative.
    pub fn add_other(&mut self, folder: &Folder, home: impl AsRef<Path>) -> Result<()> {
        let resolved = expand_home(&folder.path, home)?;
        let guid = self.guid_pool().allocate();
        self.persistent_others
            .push(OtherTile::directory(resolved, folder, guid));

        Ok(())
    }

    /// Patch dock settings.
    ///
    /// Flags are copied verbatim. Sizes are only written when given.
    ///
    /// # Errors
    ///
    /// - Return [`DockError::SizeOutOfRange`] if a size falls outside of
    ///   16 to 128.
    pub fn apply_settings(&mut self, settings: &DockSettings) -> Result<()> {
        let tile_size = settings
            .tile_size
            .map(|size| check_size(TILE_SIZE_KEY, size))
            .transpose()?;
        let large_size = settings
            .large_size
            .map(|size| check_size(LARGE_SIZE_KEY, size))
            .transpose()?;

        self.tile_size = tile_size.or(self.tile_size);
        self.large_size = large_size.or(self.large_size);
        self.magnification = settings.magnification;
        self.minimize_to_application = settings.minimize_to_application;
        self.auto_hide = settings.auto_hide;
        self.show_recents = settings.show_recents;
        self.size_immutable = settings.size_immutable;

        Ok(())
    }

    /// Hand dock state over to the live dock.
    ///
    /// Encodes state into a staged binary plist, then stops the dock, imports
    /// the staged plist, and restarts the dock in that order. The first
    /// failing step aborts the rest. The staged plist is removed no matter
    /// what.
    ///
    /// # Errors
    ///
    /// - Return [`DockError::Staging`] if staged plist cannot be created.
    /// - Return [`DockError::Encode`] if state cannot be encoded.
    /// - Return [`DockError::Control`] if any process control step fails.
    #[instrument(skip(self, control), level = "debug")]
    pub fn save(self, control: &impl DockControl) -> Result<()> {
        let mut staged = tempfile::Builder::new()
            .prefix("dock")
            .suffix(".plist")
            .tempfile()
            .map_err(DockError::Staging)?;

        debug!("write staged dock plist {:?}", staged.path().display());
        let root = Value::Dictionary(self.into_dictionary()?);
        plist::to_writer_binary(staged.as_file_mut(), &root).map_err(DockError::Encode)?;

        control.stop()?;
        control.import(staged.path())?;
        control.restart()?;

        let staged_path = staged.path().to_path_buf();
        if let Err(error) = staged.close() {
            warn!(
                "failed to remove staged dock plist {:?}: {error}",
                staged_path.display()
            );
        }

        Ok(())
    }

    fn guid_pool(&self) -> GuidPool {
        GuidPool::new(
            self.persistent_apps
                .iter()
                .filter_map(|tile| tile.guid)
                .chain(self.persistent_others.iter().filter_map(|tile| tile.guid)),
        )
    }
}

fn take_tiles<T>(dictionary: &mut Dictionary, key: &'static str) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    match dictionary.remove(key) {
        Some(value) => {
            plist::from_value(&value).map_err(|source| DockError::MalformedKey { source, key })
        }
        None => Ok(Vec::new()),
    }
}

fn take_size(dictionary: &mut Dictionary, key: &'static str) -> Result<Option<SizeValue>> {
    match dictionary.remove(key) {
        Some(Value::Real(value)) => Ok(Some(SizeValue::Float(value))),
        Some(Value::Integer(value)) => value
            .as_signed()
            .map(|value| Some(SizeValue::Integer(value)))
            .ok_or(DockError::UnexpectedType { key }),
        Some(_) => Err(DockError::UnexpectedType { key }),
        None => Ok(None),
    }
}

// INVARIANT: Older stores may keep flags as integers.
fn take_flag(dictionary: &mut Dictionary, key: &'static str) -> Result<bool> {
    match dictionary.remove(key) {
        Some(Value::Boolean(flag)) => Ok(flag),
        Some(Value::Integer(value)) => Ok(value.as_signed() != Some(0)),
        Some(_) => Err(DockError::UnexpectedType { key }),
        None => Ok(false),
    }
}

fn size_to_value(size: SizeValue) -> Value {
    match size {
        SizeValue::Integer(value) => Value::Integer(value.into()),
        SizeValue::Float(value) => Value::Real(value),
    }
}

fn check_size(key: &'static str, size: SizeValue) -> Result<SizeValue> {
    let value = size.as_f64();
    if value < MIN_SIZE || value > MAX_SIZE {
        return Err(DockError::SizeOutOfRange { key, size });
    }

    Ok(size)
}

/// Dock preference store error types.
#[derive(Debug, thiserror::Error)]
pub enum DockError {
    /// Store is missing or unreadable.
    #[error("failed to read dock plist at {:?}", path.display())]
    StoreUnavailable {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Store is not a valid property list.
    #[error("failed to decode dock plist at {:?}", path.display())]
    StoreCorrupt {
        #[source]
        source: plist::Error,
        path: PathBuf,
    },

    /// Store root is not a dictionary.
    #[error("dock plist at {:?} is not a dictionary", path.display())]
    NotADictionary { path: PathBuf },

    /// Known key cannot be decoded.
    #[error("failed to decode {key:?} of dock plist")]
    MalformedKey {
        #[source]
        source: plist::Error,
        key: &'static str,
    },

    /// Known key holds a value of the wrong type.
    #[error("unexpected value type for {key:?} of dock plist")]
    UnexpectedType { key: &'static str },

    /// Size setting is outside of accepted range.
    #[error("{key} must be between 16 and 128: {size}")]
    SizeOutOfRange { key: &'static str, size: SizeValue },

    /// Folder path cannot be resolved.
    #[error(transparent)]
    Path(#[from] crate::path::PathError),

    /// Dock state cannot be encoded.
    #[error("failed to encode dock plist")]
    Encode(#[source] plist::Error),

    /// Staged plist cannot be created.
    #[error("failed to create staged dock plist")]
    Staging(#[source] std::io::Error),

    /// Dock process control fails.
    #[error(transparent)]
    Control(#[from] crate::dock::control::ControlError),
}

/// Friendly result alias :3
pub type Result<T, E = DockError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dock::{
            control::ControlError,
            tile::{FileData, DIRECTORY_TILE, FILE_TILE, SMALL_SPACER_TILE, SPACER_TILE},
        },
        path::PathError,
    };
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;
    use std::{cell::RefCell, collections::HashSet};

    const HOME: &str = "/home/blah";

    fn app_url(url: &str) -> AppTile {
        AppTile {
            guid: Some(1),
            tile_type: FILE_TILE.into(),
            tile_data: tile::AppTileData {
                file_data: Some(FileData {
                    url_string: url.into(),
                    url_string_type: 15,
                }),
                file_type: Some(41),
            },
        }
    }

    fn other_url(url: &str, arrangement: i64, display_as: i64, show_as: i64) -> OtherTile {
        OtherTile {
            guid: Some(2),
            tile_type: DIRECTORY_TILE.into(),
            tile_data: tile::OtherTileData {
                arrangement,
                display_as,
                show_as,
                file_data: Some(FileData {
                    url_string: url.into(),
                    url_string_type: 15,
                }),
                file_label: Some("whatever".into()),
                file_type: Some(2),
                directory: Some(1),
            },
        }
    }

    fn spacer(tile_type: &str) -> AppTile {
        AppTile {
            tile_type: tile_type.into(),
            ..Default::default()
        }
    }

    fn captured() -> DockPlist {
        DockPlist {
            persistent_apps: vec![
                app_url("file:///Applications/Calculator.app/"),
                spacer(SMALL_SPACER_TILE),
                app_url("file:///Applications/Visual%20Studio%20Code.app/"),
                spacer(SPACER_TILE),
            ],
            persistent_others: vec![
                other_url("file:///home/blah/Documents/", 1, 2, 3),
                other_url("file:///home/blah/", 0, 1, 0),
                other_url("file:///Applications/", 2, 0, 1),
            ],
            tile_size: Some(SizeValue::Float(32.0)),
            large_size: Some(SizeValue::Integer(64)),
            magnification: true,
            minimize_to_application: true,
            auto_hide: true,
            show_recents: false,
            size_immutable: true,
            ..Default::default()
        }
    }

    #[test]
    fn to_config_captures_state() {
        let result = captured().to_config(HOME);
        let expect = Config {
            dock: DockItems {
                apps: vec![
                    "/Applications/Calculator.app".into(),
                    "".into(),
                    "/Applications/Visual Studio Code.app".into(),
                    " ".into(),
                ],
                others: vec![
                    Folder {
                        path: "~/Documents".into(),
                        sort: 1,
                        display: 2,
                        view: 3,
                    },
                    Folder {
                        path: "~".into(),
                        sort: 0,
                        display: 1,
                        view: 0,
                    },
                    Folder {
                        path: "/Applications".into(),
                        sort: 2,
                        display: 0,
                        view: 1,
                    },
                ],
                settings: Some(DockSettings {
                    tile_size: Some(SizeValue::Float(32.0)),
                    large_size: Some(SizeValue::Integer(64)),
                    magnification: true,
                    minimize_to_application: true,
                    auto_hide: true,
                    show_recents: false,
                    size_immutable: true,
                }),
            },
        };
        assert_eq!(result, expect);
    }

    #[test_case("", SMALL_SPACER_TILE; "empty spacer")]
    #[test_case(" ", SPACER_TILE; "spacer")]
    #[test_case("/Applications/Calculator.app", FILE_TILE; "normal")]
    #[test]
    fn add_app_picks_tile_kind(entry: &str, expect: &str) {
        let mut plist = DockPlist::default();
        plist.add_app(entry);
        pretty_assertions::assert_eq!(plist.persistent_apps.len(), 1);
        pretty_assertions::assert_eq!(plist.persistent_apps[0].tile_type, expect);
        pretty_assertions::assert_eq!(plist.persistent_apps[0].path(), entry);
    }

    #[test_case("~", "/home/blah", "blah"; "tilde")]
    #[test_case("~/Documents", "/home/blah/Documents", "Documents"; "tilde sub")]
    #[test_case("~/Archive/backup.tar.gz", "/home/blah/Archive/backup.tar.gz", "backup.tar"; "file")]
    #[test]
    fn add_other_resolves_home(path: &str, expect_path: &str, expect_label: &str) {
        let mut plist = DockPlist::default();
        let folder = Folder {
            path: path.into(),
            ..Default::default()
        };
        plist.add_other(&folder, HOME).unwrap();
        let tile = &plist.persistent_others[0];
        pretty_assertions::assert_eq!(
            tile.tile_data.file_data.as_ref().map(|data| data.url_string.as_str()),
            Some(expect_path)
        );
        pretty_assertions::assert_eq!(tile.tile_data.file_label.as_deref(), Some(expect_label));
        pretty_assertions::assert_eq!(tile.tile_data.directory, Some(1));
    }

    #[test]
    fn add_other_rejects_relative_path() {
        let mut plist = DockPlist::default();
        let folder = Folder {
            path: "relative/path".into(),
            ..Default::default()
        };
        let result = plist.add_other(&folder, HOME);
        assert!(matches!(
            result,
            Err(DockError::Path(PathError::NotHomeRelative { .. }))
        ));
        assert!(plist.persistent_others.is_empty());
    }

    #[test]
    fn apply_config_replaces_tiles_in_order() -> anyhow::Result<()> {
        let mut plist = captured();
        let items = DockItems {
            apps: vec!["/Applications/Mail.app".into(), "".into()],
            others: vec![Folder {
                path: "~/Downloads".into(),
                sort: 1,
                display: 1,
                view: 2,
            }],
            settings: None,
        };
        plist.apply_config(&items, HOME)?;

        let apps = plist
            .persistent_apps
            .iter()
            .map(AppTile::path)
            .collect::<Vec<_>>();
        assert_eq!(apps, vec!["/Applications/Mail.app", ""]);
        let others = plist
            .persistent_others
            .iter()
            .map(OtherTile::path)
            .collect::<Vec<_>>();
        assert_eq!(others, vec!["/home/blah/Downloads"]);

        // No settings block, so settings stay put.
        assert_eq!(plist.tile_size, Some(SizeValue::Float(32.0)));
        assert!(plist.magnification);

        Ok(())
    }

    #[test]
    fn apply_config_is_all_or_nothing() {
        let mut plist = captured();
        let items = DockItems {
            apps: vec!["/Applications/Mail.app".into()],
            others: vec![Folder {
                path: "Downloads".into(),
                ..Default::default()
            }],
            settings: None,
        };
        assert!(plist.apply_config(&items, HOME).is_err());
        assert_eq!(plist, captured());
    }

    #[test]
    fn capture_then_rebuild_round_trips_items() -> anyhow::Result<()> {
        let mut original = captured();
        // Folders outside of home cannot be loaded back.
        original.persistent_others.pop();
        let config = original.to_config(HOME);

        let mut rebuilt = original.clone();
        rebuilt.persistent_apps.clear();
        rebuilt.persistent_others.clear();
        rebuilt.apply_config(&config.dock, HOME)?;

        assert_eq!(rebuilt.to_config(HOME), config);
        let labels = rebuilt
            .persistent_others
            .iter()
            .map(|tile| tile.tile_data.file_label.clone().unwrap_or_default())
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["Documents", "blah"]);

        Ok(())
    }

    #[test]
    fn rebuilt_tiles_have_unique_identifiers() -> anyhow::Result<()> {
        let mut plist = DockPlist::default();
        let items = DockItems {
            apps: (0..64).map(|n| format!("/Applications/App{n}.app")).collect(),
            others: (0..64)
                .map(|n| Folder {
                    path: format!("~/Folder{n}"),
                    ..Default::default()
                })
                .collect(),
            settings: None,
        };
        plist.apply_config(&items, HOME)?;

        let guids = plist
            .persistent_apps
            .iter()
            .filter_map(|tile| tile.guid)
            .chain(plist.persistent_others.iter().filter_map(|tile| tile.guid))
            .collect::<HashSet<_>>();
        assert_eq!(guids.len(), 128);

        Ok(())
    }

    #[test_case(Some(SizeValue::Integer(32)), Some(SizeValue::Integer(64)); "integers")]
    #[test_case(Some(SizeValue::Float(32.0)), Some(SizeValue::Float(64.5)); "floats")]
    #[test_case(Some(SizeValue::Integer(16)), Some(SizeValue::Float(128.0)); "bounds")]
    #[test]
    fn apply_settings_accepts_sizes(tile_size: Option<SizeValue>, large_size: Option<SizeValue>) {
        let mut plist = DockPlist::default();
        let settings = DockSettings {
            tile_size,
            large_size,
            magnification: true,
            show_recents: true,
            ..Default::default()
        };
        plist.apply_settings(&settings).unwrap();
        pretty_assertions::assert_eq!(plist.tile_size, tile_size);
        pretty_assertions::assert_eq!(plist.large_size, large_size);
        assert!(plist.magnification);
        assert!(plist.show_recents);
        assert!(!plist.auto_hide);
    }

    #[test_case(SizeValue::Integer(15); "too small")]
    #[test_case(SizeValue::Float(128.5); "too large")]
    #[test]
    fn apply_settings_rejects_out_of_range(size: SizeValue) {
        let mut plist = DockPlist::default();
        let settings = DockSettings {
            large_size: Some(size),
            ..Default::default()
        };
        assert!(matches!(
            plist.apply_settings(&settings),
            Err(DockError::SizeOutOfRange {
                key: LARGE_SIZE_KEY,
                ..
            })
        ));
    }

    #[test]
    fn apply_settings_keeps_absent_sizes() -> anyhow::Result<()> {
        let mut plist = captured();
        plist.apply_settings(&DockSettings::default())?;
        assert_eq!(plist.tile_size, Some(SizeValue::Float(32.0)));
        assert_eq!(plist.large_size, Some(SizeValue::Integer(64)));
        assert!(!plist.magnification);
        Ok(())
    }

    #[test]
    fn dictionary_round_trip_keeps_unmanaged_keys() -> anyhow::Result<()> {
        let mut root = Dictionary::new();
        root.insert("mod-count".into(), Value::Integer(12_i64.into()));
        root.insert("orientation".into(), Value::String("left".into()));
        root.insert(TILE_SIZE_KEY.into(), Value::Real(48.0));
        root.insert(AUTO_HIDE_KEY.into(), Value::Integer(1_i64.into()));

        let plist = DockPlist::from_dictionary(root)?;
        assert_eq!(plist.tile_size, Some(SizeValue::Float(48.0)));
        assert_eq!(plist.large_size, None);
        assert!(plist.auto_hide);
        assert_eq!(plist.unmanaged().len(), 2);

        let root = plist.into_dictionary()?;
        assert_eq!(
            root.get("orientation"),
            Some(&Value::String("left".into()))
        );
        assert_eq!(root.get("mod-count"), Some(&Value::Integer(12_i64.into())));
        assert_eq!(root.get(TILE_SIZE_KEY), Some(&Value::Real(48.0)));
        assert_eq!(root.get(LARGE_SIZE_KEY), None);
        assert_eq!(root.get(AUTO_HIDE_KEY), Some(&Value::Boolean(true)));
        assert_eq!(root.get(PERSISTENT_APPS_KEY), Some(&Value::Array(Vec::new())));

        Ok(())
    }

    #[test]
    fn from_dictionary_rejects_wrong_types() {
        let mut root = Dictionary::new();
        root.insert(TILE_SIZE_KEY.into(), Value::String("big".into()));
        assert!(matches!(
            DockPlist::from_dictionary(root),
            Err(DockError::UnexpectedType { key: TILE_SIZE_KEY })
        ));

        let mut root = Dictionary::new();
        root.insert(PERSISTENT_APPS_KEY.into(), Value::String("nope".into()));
        assert!(matches!(
            DockPlist::from_dictionary(root),
            Err(DockError::MalformedKey {
                key: PERSISTENT_APPS_KEY,
                ..
            })
        ));
    }

    #[test]
    fn open_reports_missing_store() {
        let home = tempfile::tempdir().unwrap();
        let result = DockPlist::open(home.path().join("missing.plist"));
        assert!(matches!(result, Err(DockError::StoreUnavailable { .. })));
    }

    #[test]
    fn open_reports_corrupt_store() -> anyhow::Result<()> {
        let home = tempfile::tempdir()?;
        let path = home.path().join("dock.plist");
        fs::write(&path, b"definitely not a plist")?;
        let result = DockPlist::open(&path);
        assert!(matches!(result, Err(DockError::StoreCorrupt { .. })));
        Ok(())
    }

    #[test]
    fn open_decodes_binary_store() -> anyhow::Result<()> {
        let home = tempfile::tempdir()?;
        let path = home.path().join("dock.plist");
        let root = Value::Dictionary(captured().into_dictionary()?);
        plist::to_file_binary(&path, &root)?;

        let result = DockPlist::open(&path)?;
        assert_eq!(result, captured());

        Ok(())
    }

    #[derive(Default)]
    struct Recorder {
        fail_on: Option<&'static str>,
        calls: RefCell<Vec<&'static str>>,
        staged: RefCell<Option<PathBuf>>,
        imported: RefCell<Option<Value>>,
    }

    impl Recorder {
        fn failing(step: &'static str) -> Self {
            Self {
                fail_on: Some(step),
                ..Default::default()
            }
        }

        fn step(&self, step: &'static str) -> std::io::Result<()> {
            self.calls.borrow_mut().push(step);
            if self.fail_on == Some(step) {
                return Err(std::io::Error::other("boom"));
            }
            Ok(())
        }
    }

    impl DockControl for Recorder {
        fn stop(&self) -> control::Result<()> {
            self.step("stop").map_err(ControlError::Stop)
        }

        fn import(&self, plist: &Path) -> control::Result<()> {
            *self.staged.borrow_mut() = Some(plist.into());
            *self.imported.borrow_mut() = Value::from_file(plist).ok();
            self.step("import").map_err(|source| ControlError::Import {
                source,
                plist: plist.into(),
            })
        }

        fn restart(&self) -> control::Result<()> {
            self.step("restart").map_err(ControlError::Restart)
        }
    }

    #[test]
    fn save_stops_imports_and_restarts() -> anyhow::Result<()> {
        let control = Recorder::default();
        let expect = captured().into_dictionary()?;
        captured().save(&control)?;

        assert_eq!(*control.calls.borrow(), vec!["stop", "import", "restart"]);
        assert_eq!(
            control.imported.borrow().clone(),
            Some(Value::Dictionary(expect))
        );
        let staged = control.staged.borrow().clone().unwrap();
        assert!(!staged.exists());

        Ok(())
    }

    #[test_case("stop", &["stop"]; "stop fails")]
    #[test_case("import", &["stop", "import"]; "import fails")]
    #[test_case("restart", &["stop", "import", "restart"]; "restart fails")]
    #[test]
    fn save_aborts_on_first_failure(step: &'static str, expect: &[&str]) {
        let control = Recorder::failing(step);
        let result = captured().save(&control);
        assert!(matches!(result, Err(DockError::Control(_))));
        pretty_assertions::assert_eq!(*control.calls.borrow(), expect);
        if let Some(staged) = control.staged.borrow().as_ref() {
            assert!(!staged.exists());
        };
    }
}
