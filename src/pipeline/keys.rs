//! Type-safe keys for PipeMap
use super::Asset;
use std::collections::HashSet;
use std::marker::PhantomData;
use std::path::PathBuf;

/// A type-safe key for PipeMap that enforces compile-time type checking
pub struct TypedKey<T> {
    name: &'static str,
    _phantom: PhantomData<T>,
}

impl<T> TypedKey<T> {
    /// Create a new typed key with a static name
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _phantom: PhantomData,
        }
    }

    /// Get the key name
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for TypedKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedKey<T> {}

/// In-flight files, in collection order
pub const ASSETS: TypedKey<Vec<Asset>> = TypedKey::new("assets");

/// Directory the write node places assets under
pub const OUTPUT_DIR: TypedKey<PathBuf> = TypedKey::new("output_dir");

/// Tokens found in purge content files
pub const PURGE_TOKENS: TypedKey<HashSet<String>> = TypedKey::new("purge_tokens");

/// Files written to disk
pub const WRITTEN: TypedKey<Vec<PathBuf>> = TypedKey::new("written");
