// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for the native dock store, and
//! translate paths between their native URL form, their absolute form, and
//! the home-relative form used by the dock file.

use std::path::{Component, Path, PathBuf};

/// Location of the dock preference store relative to the home directory.
pub const DOCK_PLIST_PATH: &str = "Library/Preferences/com.apple.dock.plist";

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(NoWayHome)
}

/// Determine absolute path to the dock preference store under `home`.
pub fn dock_plist_path(home: impl AsRef<Path>) -> PathBuf {
    home.as_ref().join(DOCK_PLIST_PATH)
}

/// Turn a native tile URL into a logical path.
///
/// Strips the `file://` scheme and one trailing separator, then turns `%20`
/// into a literal space. No other percent sequence is decoded.
pub fn url_to_path(url: &str) -> String {
    let path = url.strip_prefix("file://").unwrap_or(url);
    let path = path.strip_suffix('/').unwrap_or(path);
    path.replace("%20", " ")
}

/// Rewrite `path` relative to `home` when it lies under it.
///
/// Paths outside of `home` are returned untouched.
pub fn contract_home(path: &str, home: impl AsRef<Path>) -> String {
    match Path::new(path).strip_prefix(home.as_ref()) {
        Ok(relative) if relative.as_os_str().is_empty() => "~".into(),
        Ok(relative) => format!("~/{}", relative.display()),
        Err(_) => path.into(),
    }
}

/// Resolve a home-relative path into a clean absolute path.
///
/// Only `~` and paths beginning with `~/` are accepted.
///
/// # Errors
///
/// - Return [`PathError::NotHomeRelative`] if `path` does not start with the
///   home directory shorthand.
pub fn expand_home(path: &str, home: impl AsRef<Path>) -> Result<PathBuf, PathError> {
    if path != "~" && !path.starts_with("~/") {
        return Err(PathError::NotHomeRelative { path: path.into() });
    }

    let expanded = shellexpand::tilde_with_context(path, || Some(home.as_ref().to_string_lossy()));
    Ok(clean(Path::new(expanded.as_ref())))
}

/// Lexically clean a path.
///
/// Drops `.` components, folds `..` into their parent, and collapses
/// repeated separators. Never touches the file system.
pub fn clean(path: impl AsRef<Path>) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.as_ref().components() {
        match component {
            Component::CurDir => continue,
            Component::ParentDir => match cleaned.components().next_back() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                // INVARIANT: Cannot climb above the root.
                Some(Component::RootDir | Component::Prefix(_)) => continue,
                _ => cleaned.push(".."),
            },
            other => cleaned.push(other),
        }
    }

    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }

    cleaned
}

/// Derive a tile label from the last path segment minus its final extension.
pub fn file_label(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// No way to determine user's home directory.
///
/// # See Also
///
/// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's home directory")]
pub struct NoWayHome;

/// Path translation error types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Folder path is not relative to the home directory.
    #[error("invalid path {path:?}: must be '~' or start with '~/'")]
    NotHomeRelative { path: String },
}

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;
