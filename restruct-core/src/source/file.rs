use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{ReadingSource, SourceKind};

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReadingSource for FileSource {
    fn kind(&self) -> SourceKind {
        SourceKind::File
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn read_document(&self) -> Result<String> {
        debug!(path = %self.path.display(), "reading weather document");

        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read input file: {}", self.path.display()))
    }
}
