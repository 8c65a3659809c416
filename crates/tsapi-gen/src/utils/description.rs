use std::path::Path;

use anyhow::Context;
use fmmap::tokio::{AsyncMmapFile, AsyncMmapFileExt};

/// Memory-maps an interface description for reading.
pub struct DescriptionLoader {
  file: AsyncMmapFile,
}

impl DescriptionLoader {
  pub async fn open(path: &Path) -> anyhow::Result<Self> {
    let file = AsyncMmapFile::open(path)
      .await
      .with_context(|| format!("cannot open interface description {}", path.display()))?;
    Ok(Self { file })
  }

  pub fn text(&self) -> anyhow::Result<&str> {
    std::str::from_utf8(self.file.as_slice()).context("interface description is not valid UTF-8")
  }
}

/// Reads a whole description into an owned string.
pub async fn read_description(path: &Path) -> anyhow::Result<String> {
  let loader = DescriptionLoader::open(path).await?;
  Ok(loader.text()?.to_string())
}
