use std::collections::HashMap;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use anyhow::Context as _;

pub const READ_CHUNK_SIZE: usize = 4096;
pub const DEFAULT_SHADER_DIR: &str = "shaders";

/// where shader text comes from, keyed by logical name.
pub trait SourceStore {
    /// returns the full source text, or an empty string if it cannot be found or read.
    ///
    /// NOTE: an empty source is not an error here; the compiler rejects it later and that is where
    /// it gets reported.
    fn load(&self, name: &str) -> String;
}

/// reads `<root>/<name>` from the filesystem.
#[derive(Debug, Clone)]
pub struct FsSource {
    pub root: PathBuf,
}

impl Default for FsSource {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_SHADER_DIR),
        }
    }
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

fn read_chunked(path: &Path) -> anyhow::Result<String> {
    let mut file = File::open(path).with_context(|| format!("could not open {path:?}"))?;

    let mut out = Vec::new();
    let mut chunk = [0_u8; READ_CHUNK_SIZE];
    loop {
        match file.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => out.extend_from_slice(&chunk[..n]),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err).with_context(|| format!("could not read {path:?}")),
        }
    }

    Ok(match String::from_utf8(out) {
        Ok(text) => text,
        Err(err) => {
            log::warn!("{path:?} is not valid utf-8, invalid sequences are replaced");
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    })
}

impl SourceStore for FsSource {
    fn load(&self, name: &str) -> String {
        let path = self.path_of(name);
        match read_chunked(&path) {
            Ok(text) => {
                log::debug!("loaded shader {name:?} ({} bytes)", text.len());
                text
            }
            Err(err) => {
                log::warn!("could not load shader {name:?}: {err:#}");
                String::new()
            }
        }
    }
}

/// in-memory sources, e.g. from `include_str!`.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    sources: HashMap<String, String>,
}

impl MemorySource {
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.sources.insert(name.into(), text.into());
    }

    pub fn and_insert(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }
}

impl SourceStore for MemorySource {
    fn load(&self, name: &str) -> String {
        match self.sources.get(name) {
            Some(text) => text.clone(),
            None => {
                log::warn!("no shader named {name:?}");
                String::new()
            }
        }
    }
}

impl<S: SourceStore + ?Sized> SourceStore for &S {
    fn load(&self, name: &str) -> String {
        (**self).load(name)
    }
}
