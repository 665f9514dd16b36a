//! Mapping keys to artifacts on disk.

use std::{
    fs::{self, File},
    io::{self, BufRead, BufReader, Read},
    path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::{debug, warn};
use xz2::read::XzDecoder;

use crate::{Key, NameTemplate, StoreError};

pub const COMPRESSED_SUFFIX: &str = ".xz";

/// Where the artifact for a key stands, checked in precedence order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum ArtifactState {
    /// A regular file at the plain path. `shadowed` names a compressed copy
    /// that also exists and is ignored.
    Plain {
        path: PathBuf,
        shadowed: Option<PathBuf>,
    },
    Compressed { path: PathBuf },
    /// A dangling link at the plain path: the key is valid but the data was
    /// not fetched.
    Placeholder { path: PathBuf },
    /// Nothing on disk. `path` is absent when the key does not fit the
    /// template.
    Unknown { path: Option<PathBuf> },
}

impl ArtifactState {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Plain { .. } => "plain",
            Self::Compressed { .. } => "compressed",
            Self::Placeholder { .. } => "placeholder",
            Self::Unknown { .. } => "unknown",
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Plain { path, .. } | Self::Compressed { path } | Self::Placeholder { path } => {
                Some(path)
            }
            Self::Unknown { path } => path.as_deref(),
        }
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Plain { .. } | Self::Compressed { .. })
    }
}

#[derive(Debug, Clone)]
pub struct PathResolver {
    data_dir: PathBuf,
    template: NameTemplate,
}

impl PathResolver {
    pub fn new(data_dir: impl Into<PathBuf>, template: NameTemplate) -> Self {
        Self {
            data_dir: data_dir.into(),
            template,
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub fn template(&self) -> &NameTemplate {
        &self.template
    }

    /// Uncompressed artifact path for `key`, whether or not it exists.
    #[must_use]
    pub fn artifact_path(&self, key: &Key) -> Option<PathBuf> {
        self.template
            .render(key)
            .map(|name| self.data_dir.join(name))
    }

    /// Inspects the filesystem without opening anything.
    #[must_use]
    pub fn locate(&self, key: &Key) -> ArtifactState {
        let Some(path) = self.artifact_path(key) else {
            return ArtifactState::Unknown { path: None };
        };
        let compressed = compressed_path(&path);
        if path.is_file() {
            let shadowed = compressed.exists().then_some(compressed);
            return ArtifactState::Plain { path, shadowed };
        }
        if compressed.is_file() {
            return ArtifactState::Compressed { path: compressed };
        }
        if is_placeholder(&path) {
            return ArtifactState::Placeholder { path };
        }
        if is_placeholder(&compressed) {
            return ArtifactState::Placeholder { path: compressed };
        }
        ArtifactState::Unknown { path: Some(path) }
    }

    /// Opens the artifact for `key`, decompressing `.xz` transparently.
    ///
    /// # Errors
    /// [`StoreError::Unavailable`] for placeholders, [`StoreError::UnknownKey`]
    /// when nothing exists, [`StoreError::Io`] when opening fails.
    pub fn resolve(&self, key: &Key) -> Result<ArtifactReader, StoreError> {
        match self.locate(key) {
            ArtifactState::Plain { path, shadowed } => {
                if let Some(compressed) = shadowed {
                    warn!(
                        %key,
                        plain = %path.display(),
                        compressed = %compressed.display(),
                        "ambiguous artifact, using the uncompressed file"
                    );
                }
                debug!(%key, path = %path.display(), "resolved artifact");
                ArtifactReader::plain(path)
            }
            ArtifactState::Compressed { path } => {
                debug!(%key, path = %path.display(), "resolved compressed artifact");
                ArtifactReader::compressed(path)
            }
            ArtifactState::Placeholder { path } => {
                debug!(%key, path = %path.display(), "artifact is a placeholder");
                Err(StoreError::Unavailable {
                    key: key.clone(),
                    path,
                })
            }
            ArtifactState::Unknown { .. } => Err(StoreError::UnknownKey { key: key.clone() }),
        }
    }
}

/// Something other than a directory exists at `path` but does not resolve to
/// a regular file, typically a dangling link.
fn is_placeholder(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|meta| !meta.is_dir())
}

fn compressed_path(path: &Path) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(COMPRESSED_SUFFIX);
    PathBuf::from(raw)
}

enum Stream {
    Plain(BufReader<File>),
    Xz(BufReader<XzDecoder<File>>),
}

/// A text stream over one artifact. The file is closed when the reader is
/// dropped.
pub struct ArtifactReader {
    path: PathBuf,
    stream: Stream,
}

impl ArtifactReader {
    fn plain(path: PathBuf) -> Result<Self, StoreError> {
        let file = File::open(&path).map_err(|err| StoreError::io(&path, err))?;
        Ok(Self {
            path,
            stream: Stream::Plain(BufReader::new(file)),
        })
    }

    fn compressed(path: PathBuf) -> Result<Self, StoreError> {
        let file = File::open(&path).map_err(|err| StoreError::io(&path, err))?;
        Ok(Self {
            path,
            stream: Stream::Xz(BufReader::new(XzDecoder::new(file))),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn is_compressed(&self) -> bool {
        matches!(self.stream, Stream::Xz(_))
    }
}

impl Read for ArtifactReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.stream {
            Stream::Plain(reader) => reader.read(buf),
            Stream::Xz(reader) => reader.read(buf),
        }
    }
}

impl BufRead for ArtifactReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match &mut self.stream {
            Stream::Plain(reader) => reader.fill_buf(),
            Stream::Xz(reader) => reader.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match &mut self.stream {
            Stream::Plain(reader) => reader.consume(amt),
            Stream::Xz(reader) => reader.consume(amt),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use xz2::write::XzEncoder;

    use super::*;

    fn resolver(dir: &Path) -> PathResolver {
        PathResolver::new(dir, NameTemplate::parse("dop.{0}.{1}").unwrap())
    }

    fn read_all(mut reader: ArtifactReader) -> String {
        let mut text = String::new();
        reader.read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn prefers_plain_over_compressed() {
        let temp = tempfile::tempdir().unwrap();
        let plain = temp.path().join("dop.13.3754");
        fs::write(&plain, "t*D").unwrap();
        let compressed = temp.path().join("dop.13.3754.xz");
        let mut encoder = XzEncoder::new(File::create(&compressed).unwrap(), 6);
        encoder.write_all(b"D").unwrap();
        encoder.finish().unwrap();

        let key = Key::from((13, 3754));
        let resolver = resolver(temp.path());
        assert_eq!(
            resolver.locate(&key),
            ArtifactState::Plain {
                path: plain,
                shadowed: Some(compressed),
            }
        );
        let reader = resolver.resolve(&key).unwrap();
        assert!(!reader.is_compressed());
        assert_eq!(read_all(reader), "t*D");
    }

    #[test]
    fn decompresses_xz_artifacts() {
        let temp = tempfile::tempdir().unwrap();
        let compressed = temp.path().join("dop.1.2.xz");
        let mut encoder = XzEncoder::new(File::create(&compressed).unwrap(), 6);
        encoder.write_all(b"t^2*D + 3\n").unwrap();
        encoder.finish().unwrap();

        let reader = resolver(temp.path()).resolve(&Key::from((1, 2))).unwrap();
        assert!(reader.is_compressed());
        assert_eq!(reader.path(), compressed.as_path());
        assert_eq!(read_all(reader), "t^2*D + 3\n");
    }

    #[test]
    fn missing_artifacts_are_unknown() {
        let temp = tempfile::tempdir().unwrap();
        let resolver = resolver(temp.path());
        let err = resolver.resolve(&Key::from((1, 2))).err().unwrap();
        assert!(matches!(err, StoreError::UnknownKey { .. }));

        assert_eq!(
            resolver.locate(&Key::from("1")),
            ArtifactState::Unknown { path: None }
        );
    }

    #[test]
    fn directories_are_not_placeholders() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("dop.1.2")).unwrap();
        let state = resolver(temp.path()).locate(&Key::from((1, 2)));
        assert_eq!(state.label(), "unknown");
    }

    #[cfg(unix)]
    #[test]
    fn dangling_links_are_placeholders() {
        let temp = tempfile::tempdir().unwrap();
        let link = temp.path().join("dop.7.7");
        std::os::unix::fs::symlink(temp.path().join("missing-blob"), &link).unwrap();

        let resolver = resolver(temp.path());
        let key = Key::from((7, 7));
        assert_eq!(
            resolver.locate(&key),
            ArtifactState::Placeholder { path: link }
        );
        let err = resolver.resolve(&key).err().unwrap();
        assert!(err.is_unavailable());
    }
}
