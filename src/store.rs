//! File existence checks.
//!
//! The planner only ever asks one question of the filesystem: does this
//! path exist? [`FileStore`] captures that so the caching policy can be
//! tested against an in-memory set of paths.

use std::path::Path;

pub trait FileStore {
    fn exists(&self, path: &Path) -> bool;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskStore;

impl FileStore for DiskStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
