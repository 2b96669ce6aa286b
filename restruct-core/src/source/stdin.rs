use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tracing::debug;

use super::{ReadingSource, SourceKind};

/// Reads the whole of standard input as one document.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinSource;

#[async_trait]
impl ReadingSource for StdinSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Stdin
    }

    async fn read_document(&self) -> Result<String> {
        debug!("reading weather document from stdin");

        let mut body = String::new();
        tokio::io::stdin()
            .read_to_string(&mut body)
            .await
            .context("Failed to read readings from stdin")?;

        Ok(body)
    }
}
