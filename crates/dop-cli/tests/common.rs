#![allow(dead_code)]

use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};

use assert_cmd::assert::Assert;
use serde_json::Value;
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
    fs::create_dir_all(dir).expect("create dir");
    let target = dir.join(".blobs").join(name);
    std::os::unix::fs::symlink(target, dir.join(name)).expect("symlink");
}

pub fn parse_json(assert: &Assert) -> Value {
    serde_json::from_slice(&assert.get_output().stdout).expect("valid json")
}

pub fn stdout(assert: &Assert) -> String {
    String::from_utf8(assert.get_output().stdout.clone()).expect("utf-8 stdout")
}

pub fn stderr(assert: &Assert) -> String {
    String::from_utf8(assert.get_output().stderr.clone()).expect("utf-8 stderr")
}
