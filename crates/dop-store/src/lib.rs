//! File-backed repositories of linear differential operators.
//!
//! Each operator lives in its own text file under a data directory, named
//! by formatting its key into a template. Files may be stored plain or
//! `xz`-compressed, and a dangling symlink marks an operator that exists
//! but was not fetched. Lookups re-read and re-parse on every call.

pub mod catalog;
pub mod config;
mod error;
pub mod eval;
pub mod expr;
mod key;
pub mod loader;
mod repository;
pub mod resolver;

pub use catalog::{AnyRepository, Dataset, RenderedOperator};
pub use config::{resolve_data_root, DataRoot};
pub use error::StoreError;
pub use key::{Key, NameTemplate};
pub use loader::ExpressionLoader;
pub use repository::{
    CheckFailure, CheckReport, KeyFromName, KeyedOperatorRepository, RepositoryConfig,
};
pub use resolver::{ArtifactReader, ArtifactState, PathResolver};
