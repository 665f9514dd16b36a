//! The operator collections shipped as data directories under a common root.

use std::{fmt, path::Path, str::FromStr};

use dop_algebra::{Poly, PolyAlgebra, RationalAlgebra, RationalFunction};
use serde::Serialize;

use crate::{
    ArtifactState, CheckReport, Key, KeyFromName, KeyedOperatorRepository, NameTemplate,
    RepositoryConfig, StoreError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Bkp,
    Btp,
    Hks,
}

impl Dataset {
    pub const ALL: [Dataset; 3] = [Dataset::Bkp, Dataset::Btp, Dataset::Hks];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bkp => bkp::NAME,
            Self::Btp => btp::NAME,
            Self::Hks => hks::NAME,
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Bkp => "Batyrev-Kreuzer periods, keyed by 'A.B'",
            Self::Btp => "Batyrev-Kreuzer periods, keyed by two integers",
            Self::Hks => "Picard-Fuchs equations of quartic surface pencils, keyed by 'family/dop.N'",
        }
    }

    /// Reads a key as users type it on the command line.
    #[must_use]
    pub fn parse_key(self, raw: &str) -> Option<Key> {
        match self {
            Self::Bkp => bkp::parse_key(raw),
            Self::Btp => btp::parse_key(raw),
            Self::Hks => hks::parse_key(raw),
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dataset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|dataset| dataset.name() == s)
            .ok_or_else(|| format!("unknown dataset '{s}' (expected bkp, btp or hks)"))
    }
}

/// A repository of either coefficient kind, for callers that pick the
/// dataset at run time.
#[derive(Debug, Clone)]
pub enum AnyRepository {
    Polynomial(KeyedOperatorRepository<Poly>),
    Rational(KeyedOperatorRepository<RationalFunction>),
}

macro_rules! each_repository {
    ($any:expr, $repo:ident => $body:expr) => {
        match $any {
            AnyRepository::Polynomial($repo) => $body,
            AnyRepository::Rational($repo) => $body,
        }
    };
}

/// An operator rendered in its algebra's canonical text form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedOperator {
    pub text: String,
    pub order: Option<usize>,
}

impl AnyRepository {
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        each_repository!(self, repo => repo.data_dir())
    }

    /// Looks `key` up and renders the result.
    ///
    /// # Errors
    /// See [`KeyedOperatorRepository::lookup`].
    pub fn lookup_rendered(&self, key: &Key) -> Result<RenderedOperator, StoreError> {
        each_repository!(self, repo => {
            let op = repo.lookup(key)?;
            Ok(RenderedOperator {
                text: repo.algebra().display(&op).to_string(),
                order: op.order(),
            })
        })
    }

    #[must_use]
    pub fn locate(&self, key: &Key) -> ArtifactState {
        each_repository!(self, repo => repo.locate(key))
    }

    /// # Errors
    /// See [`KeyedOperatorRepository::keys`].
    pub fn keys(&self) -> Result<Vec<Key>, StoreError> {
        each_repository!(self, repo => repo.keys())
    }

    /// # Errors
    /// See [`KeyedOperatorRepository::keys`].
    pub fn available_keys(&self) -> Result<Vec<Key>, StoreError> {
        each_repository!(self, repo => repo.available_keys())
    }

    /// # Errors
    /// See [`KeyedOperatorRepository::check`].
    pub fn check(&self) -> Result<CheckReport, StoreError> {
        each_repository!(self, repo => repo.check())
    }
}

/// Opens `dataset` below `root`.
///
/// # Errors
/// Only if the built-in template or generator names were invalid.
pub fn open(dataset: Dataset, root: &Path) -> Result<AnyRepository, StoreError> {
    Ok(match dataset {
        Dataset::Bkp => {
            AnyRepository::Polynomial(KeyedOperatorRepository::new(bkp::config(root)?))
        }
        Dataset::Btp => {
            AnyRepository::Polynomial(KeyedOperatorRepository::new(btp::config(root)?))
        }
        Dataset::Hks => {
            AnyRepository::Rational(KeyedOperatorRepository::new(hks::config(root)?))
        }
    })
}

/// Batyrev-Kreuzer periods stored as `dop.A.B` with single-field keys
/// `"A.B"`.
pub mod bkp {
    use super::{
        Key, KeyFromName, NameTemplate, Path, Poly, PolyAlgebra, RepositoryConfig, StoreError,
    };

    pub const NAME: &str = "bkp";

    /// A representative subset, sorted roughly by total size. Operators in
    /// one group have roughly the same size.
    pub const SELECTION: [&[&str]; 10] = [
        &["9.35", "7.6", "9.635"],
        &["11.3822", "11.3799", "14.3460"],
        &["25.86", "24.147", "23.1347"],
        &["20.1295", "21.2054", "21.2052"],
        &["22.986", "21.87", "21.6"],
        &["24.1344", "23.168", "24.85"],
        &["22.1484", "22.590", "21.2200"],
        &["24.94", "24.481", "25.51"],
        &["23.697", "23.674"],
        &["21.1908"],
    ];

    /// # Errors
    /// Only if the built-in template or generator names were invalid.
    pub fn config(root: &Path) -> Result<RepositoryConfig<Poly>, StoreError> {
        Ok(RepositoryConfig {
            algebra: PolyAlgebra::new("t", "D")?,
            data_dir: root.join(NAME),
            name_template: NameTemplate::parse("dop.{0}")?,
            key_from_name: Some(KeyFromName(key_from_name)),
        })
    }

    /// `dop.13.3754` and `dop.13.3754.extra` both name key `13.3754`.
    #[must_use]
    pub fn key_from_name(name: &str) -> Option<Key> {
        let mut parts = name.split('.');
        if parts.next() != Some("dop") {
            return None;
        }
        let (a, b) = (parts.next()?, parts.next()?);
        Some(Key::from(format!("{a}.{b}")))
    }

    pub(super) fn parse_key(raw: &str) -> Option<Key> {
        let (a, b) = raw.split_once('.')?;
        (!a.is_empty() && !b.is_empty() && !b.contains('.')).then(|| Key::from(raw))
    }

    /// Every key in [`SELECTION`], in order.
    #[must_use]
    pub fn selection() -> Vec<Key> {
        SELECTION
            .iter()
            .flat_map(|group| group.iter().map(|key| Key::from(*key)))
            .collect()
    }
}

/// The same periods keyed by integer pairs, stored as `dop.A.B`.
pub mod btp {
    use super::{
        Key, KeyFromName, NameTemplate, Path, Poly, PolyAlgebra, RepositoryConfig, StoreError,
    };

    pub const NAME: &str = "btp";

    /// # Errors
    /// Only if the built-in template or generator names were invalid.
    pub fn config(root: &Path) -> Result<RepositoryConfig<Poly>, StoreError> {
        Ok(RepositoryConfig {
            algebra: PolyAlgebra::new("t", "D")?,
            data_dir: root.join(NAME),
            name_template: NameTemplate::parse("dop.{0}.{1}")?,
            key_from_name: Some(KeyFromName(key_from_name)),
        })
    }

    #[must_use]
    pub fn key_from_name(name: &str) -> Option<Key> {
        let mut parts = name.split('.');
        if parts.next() != Some("dop") {
            return None;
        }
        pair(parts.next()?, parts.next()?)
    }

    pub(super) fn parse_key(raw: &str) -> Option<Key> {
        let (a, b) = raw.split_once('.')?;
        pair(a, b)
    }

    fn pair(a: &str, b: &str) -> Option<Key> {
        let a: u64 = a.parse().ok()?;
        let b: u64 = b.parse().ok()?;
        Some(Key::from((a, b)))
    }
}

/// Picard-Fuchs equations with rational-function coefficients, one
/// directory per pencil: `edge-ivp__<family>/dop.N`.
pub mod hks {
    use super::{
        Key, KeyFromName, NameTemplate, Path, RationalAlgebra, RationalFunction,
        RepositoryConfig, StoreError,
    };

    pub const NAME: &str = "hks";
    const PREFIX: &str = "edge-ivp__";

    /// # Errors
    /// Only if the built-in template or generator names were invalid.
    pub fn config(root: &Path) -> Result<RepositoryConfig<RationalFunction>, StoreError> {
        Ok(RepositoryConfig {
            algebra: RationalAlgebra::new("t", "D")?,
            data_dir: root.join(NAME),
            name_template: NameTemplate::parse(&format!("{PREFIX}{{0}}"))?,
            key_from_name: Some(KeyFromName(key_from_name)),
        })
    }

    #[must_use]
    pub fn key_from_name(name: &str) -> Option<Key> {
        let rest = name.strip_prefix(PREFIX)?;
        parse_key(rest)
    }

    pub(super) fn parse_key(raw: &str) -> Option<Key> {
        let (family, file) = raw.split_once('/')?;
        let index = file.strip_prefix("dop.")?;
        let valid = !family.is_empty()
            && !index.is_empty()
            && index.bytes().all(|b| b.is_ascii_digit());
        valid.then(|| Key::from(raw))
    }
}
