use std::{io, path::PathBuf};

use dop_algebra::AlgebraError;

use crate::Key;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("[DOP100] unknown operator key '{key}'")]
    UnknownKey { key: Key },
    #[error("[DOP101] operator '{key}' is known but its data is not available locally ({})", path.display())]
    Unavailable { key: Key, path: PathBuf },
    #[error("[DOP110] repository cannot derive keys from file names")]
    EnumerationUnsupported,
    #[error("[DOP120] invalid name template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },
    #[error("[DOP130] unable to determine a data directory; set DOP_DATA_DIR")]
    DataRootUnavailable,
    #[error("[DOP200] malformed expression at offset {offset} near '{excerpt}': {reason}")]
    MalformedExpression {
        offset: usize,
        excerpt: String,
        reason: String,
    },
    #[error("[DOP300] failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("[DOP301] failed to read artifact stream: {source}")]
    Read {
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Algebra(#[from] AlgebraError),
}

impl StoreError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownKey { .. } => "DOP100",
            Self::Unavailable { .. } => "DOP101",
            Self::EnumerationUnsupported => "DOP110",
            Self::InvalidTemplate { .. } => "DOP120",
            Self::DataRootUnavailable => "DOP130",
            Self::MalformedExpression { .. } => "DOP200",
            Self::Io { .. } => "DOP300",
            Self::Read { .. } => "DOP301",
            Self::Algebra(err) => err.code(),
        }
    }

    /// The key is valid but its payload was never fetched; callers may
    /// retrieve it out of band and retry.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// Errors caused by what the caller asked for rather than by the data
    /// on disk.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownKey { .. }
                | Self::Unavailable { .. }
                | Self::EnumerationUnsupported
                | Self::DataRootUnavailable
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_codes() {
        let err = StoreError::UnknownKey {
            key: Key::from((13, 3754)),
        };
        assert_eq!(err.code(), "DOP100");
        assert_eq!(err.to_string(), "[DOP100] unknown operator key '13.3754'");
        assert!(!err.is_unavailable());
        assert!(err.is_user_error());

        let err = StoreError::Unavailable {
            key: Key::from("5.12"),
            path: PathBuf::from("/data/dop.5.12"),
        };
        assert!(err.is_unavailable());
        assert!(err.to_string().starts_with("[DOP101]"));
    }

    #[test]
    fn malformed_expression_is_not_a_user_error() {
        let err = StoreError::MalformedExpression {
            offset: 3,
            excerpt: "t^^2".into(),
            reason: "unexpected '^'".into(),
        };
        assert!(!err.is_user_error());
        assert_eq!(
            err.to_string(),
            "[DOP200] malformed expression at offset 3 near 't^^2': unexpected '^'"
        );
    }

    #[test]
    fn algebra_errors_keep_their_code() {
        let err = StoreError::from(AlgebraError::GeneratorNameClash { name: "t".into() });
        assert_eq!(err.code(), "DOP002");
        assert!(err.to_string().starts_with("[DOP002] "));
    }
}
