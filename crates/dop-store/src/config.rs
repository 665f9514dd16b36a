//! Locating the directory datasets live under.

use std::{
    collections::HashMap,
    env,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::StoreError;

pub const DATA_DIR_ENV: &str = "DOP_DATA_DIR";

#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    #[must_use]
    pub fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    #[must_use]
    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { vars }
    }
}

/// The directory holding one subdirectory per dataset, and where that
/// choice came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataRoot {
    pub path: PathBuf,
    pub source: &'static str,
}

impl DataRoot {
    /// Wraps an explicitly requested directory, e.g. from `--data-dir`.
    ///
    /// # Errors
    /// Fails when a relative path cannot be made absolute.
    pub fn explicit(path: &Path, source: &'static str) -> Result<Self, StoreError> {
        Ok(Self {
            path: absolutize(path.to_path_buf())?,
            source,
        })
    }
}

/// Resolves the data root from the process environment.
///
/// # Errors
/// Fails when no platform data directory is known and `DOP_DATA_DIR` is
/// unset.
pub fn resolve_data_root() -> Result<DataRoot, StoreError> {
    resolve_data_root_with(&EnvSnapshot::capture())
}

/// `DOP_DATA_DIR` wins; otherwise `$XDG_DATA_HOME/dop`, otherwise the
/// platform data directory joined with `dop`.
///
/// # Errors
/// See [`resolve_data_root`].
pub fn resolve_data_root_with(snapshot: &EnvSnapshot) -> Result<DataRoot, StoreError> {
    if let Some(override_path) = snapshot.var(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(DataRoot {
            path: absolutize(PathBuf::from(override_path))?,
            source: DATA_DIR_ENV,
        });
    }

    let (base, source) = resolve_platform_base(snapshot)?;
    Ok(DataRoot {
        path: base.join("dop"),
        source,
    })
}

fn resolve_platform_base(snapshot: &EnvSnapshot) -> Result<(PathBuf, &'static str), StoreError> {
    if let Some(xdg) = snapshot.var("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return Ok((absolutize(PathBuf::from(xdg))?, "XDG_DATA_HOME"));
    }
    dirs_next::data_dir()
        .map(|dir| (dir, "platform data dir"))
        .ok_or(StoreError::DataRootUnavailable)
}

fn absolutize(path: PathBuf) -> Result<PathBuf, StoreError> {
    if path.is_absolute() {
        Ok(path)
    } else {
        let cwd = env::current_dir().map_err(|err| StoreError::io(".", err))?;
        Ok(cwd.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_override_wins() {
        let snapshot = EnvSnapshot::testing(&[
            (DATA_DIR_ENV, "/srv/operators"),
            ("XDG_DATA_HOME", "/home/me/.local/share"),
        ]);
        let root = resolve_data_root_with(&snapshot).unwrap();
        assert_eq!(root.path, PathBuf::from("/srv/operators"));
        assert_eq!(root.source, DATA_DIR_ENV);
    }

    #[test]
    fn relative_override_is_made_absolute() {
        let snapshot = EnvSnapshot::testing(&[(DATA_DIR_ENV, "data")]);
        let root = resolve_data_root_with(&snapshot).unwrap();
        assert!(root.path.is_absolute());
        assert!(root.path.ends_with("data"));
    }

    #[test]
    fn falls_back_to_xdg_data_home() {
        let snapshot = EnvSnapshot::testing(&[
            (DATA_DIR_ENV, ""),
            ("XDG_DATA_HOME", "/home/me/.local/share"),
        ]);
        let root = resolve_data_root_with(&snapshot).unwrap();
        assert_eq!(root.path, PathBuf::from("/home/me/.local/share/dop"));
        assert_eq!(root.source, "XDG_DATA_HOME");
    }
}
