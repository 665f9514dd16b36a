#![allow(dead_code)]

use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};

use dop_algebra::{Poly, PolyAlgebra};
use dop_store::{Key, KeyFromName, KeyedOperatorRepository, NameTemplate, RepositoryConfig};
use xz2::write::XzEncoder;

pub fn write_plain(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, contents).expect("write artifact");
}

pub fn write_xz(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(format!("{name}.xz"));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    let mut encoder = XzEncoder::new(File::create(path).expect("create artifact"), 6);
    encoder.write_all(contents.as_bytes()).expect("compress");
    encoder.finish().expect("finish xz stream");
}

#[cfg(unix)]
pub fn write_placeholder(dir: &Path, name: &str) {
    let target = dir.join(".blobs").join(name);
    std::os::unix::fs::symlink(target, dir.join(name)).expect("symlink");
}

pub fn integer_pair(name: &str) -> Option<Key> {
    let mut parts = name.split('.');
    if parts.next() != Some("dop") {
        return None;
    }
    let a: u32 = parts.next()?.parse().ok()?;
    let b: u32 = parts.next()?.parse().ok()?;
    Some(Key::from((a, b)))
}

pub fn pair_repository(dir: &Path) -> KeyedOperatorRepository<Poly> {
    KeyedOperatorRepository::new(RepositoryConfig {
        algebra: PolyAlgebra::new("t", "D").expect("algebra"),
        data_dir: dir.to_path_buf(),
        name_template: NameTemplate::parse("dop.{0}.{1}").expect("template"),
        key_from_name: Some(KeyFromName(integer_pair)),
    })
}
