use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

pub mod core;
pub mod keys;
pub mod nodes;

pub use crate::error::ProcessingError;
pub use core::{PipeNode, Pipeline};
pub use keys::TypedKey;

/// A file moving through a pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Output path, relative to the collection root
    pub path: PathBuf,
    /// Absolute origin on disk
    pub source: PathBuf,
    pub contents: Vec<u8>,
}

impl Asset {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<PathBuf>, contents: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
            contents,
        }
    }
}

pub struct PipeMap {
    data: HashMap<&'static str, Box<dyn Send + Sync + Any>>,
}

impl PipeMap {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    pub fn insert<T: Send + Sync + Any>(&mut self, key: TypedKey<T>, value: T) {
        self.data.insert(key.name(), Box::new(value));
    }

    pub fn get<T: Send + Sync + Any>(&self, key: TypedKey<T>) -> Option<&T> {
        self.data.get(key.name())?.downcast_ref::<T>()
    }

    /// Remove a value, handing ownership to the caller
    pub fn take<T: Send + Sync + Any>(&mut self, key: TypedKey<T>) -> Option<T> {
        let value = self.data.remove(key.name())?;
        match value.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(value) => {
                // wrong type: leave it where it was
                self.data.insert(key.name(), value);
                None
            }
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    // Get all keys for debugging
    pub fn keys(&self) -> Vec<&'static str> {
        self.data.keys().copied().collect()
    }
}

impl fmt::Debug for PipeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipeMap").field("keys", &self.keys()).finish()
    }
}

impl Default for PipeMap {
    fn default() -> Self {
        Self::new()
    }
}
