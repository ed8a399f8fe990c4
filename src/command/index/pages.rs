use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

use crate::elastic::WikiPage;
use crate::Result;

/// Reads parsed pages from a file holding one JSON object per line.
///
/// Blank lines are ignored.
#[derive(Debug)]
pub struct PageReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_number: usize,
}

impl PageReader {
    pub async fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .await
            .with_context(|| format!("failed to open pages file {}", path.display()))?;

        Ok(Self { path: path.into(), lines: BufReader::new(file).lines(), line_number: 0 })
    }

    /// Reads up to `size` pages. An empty batch means the file has been read completely.
    pub async fn next_batch(&mut self, size: usize) -> Result<Vec<WikiPage>> {
        let mut pages = Vec::new();

        while pages.len() < size {
            let line = self.lines.next_line().await.with_context(|| {
                format!("failed to read line {} of {}", self.line_number + 1, self.path.display())
            })?;
            let Some(line) = line else {
                break;
            };
            self.line_number += 1;

            if line.trim().is_empty() {
                continue;
            }
            let page = serde_json::from_str(&line).with_context(|| {
                format!("failed to parse page at line {} of {}", self.line_number, self.path.display())
            })?;
            pages.push(page);
        }

        Ok(pages)
    }
}
