use std::{
    collections::BTreeSet,
    fmt,
    path::{Component, Path, PathBuf},
};

use dop_algebra::{Coefficient, OreAlgebra, OreOperator};
use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::{
    resolver::COMPRESSED_SUFFIX, ArtifactState, ExpressionLoader, Key, NameTemplate,
    PathResolver, StoreError,
};

/// Recovers a key from an artifact name relative to the data directory,
/// with any `.xz` suffix already removed.
#[derive(Clone, Copy)]
pub struct KeyFromName(pub fn(&str) -> Option<Key>);

impl KeyFromName {
    #[must_use]
    pub fn apply(&self, name: &str) -> Option<Key> {
        (self.0)(name)
    }
}

impl fmt::Debug for KeyFromName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyFromName(..)")
    }
}

#[derive(Debug, Clone)]
pub struct RepositoryConfig<C> {
    pub algebra: OreAlgebra<C>,
    pub data_dir: PathBuf,
    pub name_template: NameTemplate,
    pub key_from_name: Option<KeyFromName>,
}

/// A read-only collection of operators stored one per file.
///
/// Every lookup re-reads its artifact; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct KeyedOperatorRepository<C> {
    algebra: OreAlgebra<C>,
    resolver: PathResolver,
    loader: ExpressionLoader<C>,
    key_from_name: Option<KeyFromName>,
}

impl<C: Coefficient> KeyedOperatorRepository<C> {
    #[must_use]
    pub fn new(config: RepositoryConfig<C>) -> Self {
        Self {
            loader: ExpressionLoader::new(&config.algebra),
            resolver: PathResolver::new(config.data_dir, config.name_template),
            algebra: config.algebra,
            key_from_name: config.key_from_name,
        }
    }

    #[must_use]
    pub fn algebra(&self) -> &OreAlgebra<C> {
        &self.algebra
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        self.resolver.data_dir()
    }

    #[must_use]
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Loads the operator stored under `key`.
    ///
    /// # Errors
    /// [`StoreError::UnknownKey`], [`StoreError::Unavailable`] for
    /// placeholders, [`StoreError::MalformedExpression`] for corrupt data and
    /// I/O errors.
    pub fn lookup(&self, key: &Key) -> Result<OreOperator<C>, StoreError> {
        let reader = self.resolver.resolve(key)?;
        let path = reader.path().to_path_buf();
        match self.loader.load(reader) {
            Ok(op) => {
                debug!(%key, path = %path.display(), order = ?op.order(), "loaded operator");
                Ok(op)
            }
            Err(err) => {
                warn!(%key, path = %path.display(), error = %err, "failed to load operator");
                Err(err)
            }
        }
    }

    #[must_use]
    pub fn locate(&self, key: &Key) -> ArtifactState {
        self.resolver.locate(key)
    }

    /// Every key with an artifact or a placeholder, sorted.
    ///
    /// # Errors
    /// [`StoreError::EnumerationUnsupported`] without a `key_from_name`, I/O
    /// errors while walking the data directory.
    pub fn keys(&self) -> Result<Vec<Key>, StoreError> {
        self.collect_keys(false)
    }

    /// Keys whose artifact is physically present, sorted.
    ///
    /// # Errors
    /// See [`KeyedOperatorRepository::keys`].
    pub fn available_keys(&self) -> Result<Vec<Key>, StoreError> {
        self.collect_keys(true)
    }

    /// Parses every available operator and collects the failures.
    ///
    /// # Errors
    /// Enumeration errors; per-key failures are part of the report.
    pub fn check(&self) -> Result<CheckReport, StoreError> {
        let mut report = CheckReport::default();
        for key in self.available_keys()? {
            report.checked += 1;
            if let Err(err) = self.lookup(&key) {
                report.failures.push(CheckFailure {
                    code: err.code(),
                    error: err.to_string(),
                    key,
                });
            }
        }
        Ok(report)
    }

    fn collect_keys(&self, available_only: bool) -> Result<Vec<Key>, StoreError> {
        let Some(key_from_name) = self.key_from_name else {
            return Err(StoreError::EnumerationUnsupported);
        };
        let data_dir = self.resolver.data_dir();
        let mut keys = BTreeSet::new();
        for entry in WalkDir::new(data_dir)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|err| {
                let path = err.path().unwrap_or(data_dir).to_path_buf();
                StoreError::io(path, err.into())
            })?;
            if entry.file_type().is_dir() {
                continue;
            }
            if available_only && !entry.path().is_file() {
                continue;
            }
            let Some(name) = entry
                .path()
                .strip_prefix(data_dir)
                .ok()
                .and_then(relative_name)
            else {
                debug!(path = %entry.path().display(), "skipping entry with a non UTF-8 name");
                continue;
            };
            let name = name.strip_suffix(COMPRESSED_SUFFIX).unwrap_or(&name);
            match key_from_name.apply(name) {
                Some(key) => {
                    keys.insert(key);
                }
                None => debug!(name, "skipping entry that does not name an operator"),
            }
        }
        Ok(keys.into_iter().collect())
    }
}

fn relative_name(path: &Path) -> Option<String> {
    let parts = path
        .components()
        .map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckFailure {
    pub key: Key,
    pub code: &'static str,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub checked: usize,
    pub failures: Vec<CheckFailure>,
}

impl CheckReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use dop_algebra::{Poly, PolyAlgebra};

    use super::*;

    fn dotted_pair(name: &str) -> Option<Key> {
        let rest = name.strip_prefix("dop.")?;
        let (a, b) = rest.split_once('.')?;
        Some(Key::from((a, b)))
    }

    fn repository(dir: &Path, key_from_name: Option<KeyFromName>) -> KeyedOperatorRepository<Poly> {
        KeyedOperatorRepository::new(RepositoryConfig {
            algebra: PolyAlgebra::new("t", "D").unwrap(),
            data_dir: dir.to_path_buf(),
            name_template: NameTemplate::parse("dop.{0}.{1}").unwrap(),
            key_from_name,
        })
    }

    #[test]
    fn repository_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<KeyedOperatorRepository<Poly>>();
    }

    #[test]
    fn enumeration_requires_a_key_parser() {
        let temp = tempfile::tempdir().unwrap();
        let repo = repository(temp.path(), None);
        assert!(matches!(repo.keys(), Err(StoreError::EnumerationUnsupported)));
        assert!(matches!(
            repo.available_keys(),
            Err(StoreError::EnumerationUnsupported)
        ));
    }

    #[test]
    fn keys_are_deduplicated_sorted_and_skip_foreign_files() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("dop.2.9"), "D").unwrap();
        fs::write(temp.path().join("dop.2.9.xz"), "").unwrap();
        fs::write(temp.path().join("dop.10.1"), "t").unwrap();
        fs::write(temp.path().join("README"), "notes").unwrap();
        fs::create_dir(temp.path().join("dop.3.3")).unwrap();

        let repo = repository(temp.path(), Some(KeyFromName(dotted_pair)));
        let keys: Vec<String> = repo.keys().unwrap().iter().map(ToString::to_string).collect();
        assert_eq!(keys, ["10.1", "2.9"]);
    }

    #[test]
    fn missing_data_dir_is_an_io_error() {
        let temp = tempfile::tempdir().unwrap();
        let repo = repository(&temp.path().join("absent"), Some(KeyFromName(dotted_pair)));
        let err = repo.keys().unwrap_err();
        assert_eq!(err.code(), "DOP300");
    }

    #[test]
    fn check_reports_corrupt_artifacts() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("dop.1.1"), "t*D + 1").unwrap();
        fs::write(temp.path().join("dop.1.2"), "t*D +* 1").unwrap();

        let report = repository(temp.path(), Some(KeyFromName(dotted_pair)))
            .check()
            .unwrap();
        assert_eq!(report.checked, 2);
        assert!(!report.is_clean());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].key, Key::from((1, 2)));
        assert_eq!(report.failures[0].code, "DOP200");
    }
}
