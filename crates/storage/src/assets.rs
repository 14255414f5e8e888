use anyhow::{Context, Result};
use image::{ImageFormat, Rgb, RgbImage};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::info;

use shared::domain::Outcome;

const SWATCH_SIZE: u32 = 250;

/// Placeholder result images, one flat-colored PNG per outcome.
#[derive(Debug, Clone)]
pub struct ResultAssets {
    dir: PathBuf,
}

impl ResultAssets {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, outcome: Outcome) -> PathBuf {
        self.dir.join(outcome.asset_file())
    }

    /// Generates the swatch for `outcome` unless a file is already there.
    pub fn ensure(&self, outcome: Outcome) -> Result<PathBuf> {
        let path = self.path_for(outcome);
        if path.exists() {
            return Ok(path);
        }

        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create asset directory '{}'", self.dir.display()))?;
        // Readers only ever see a complete file: encode beside it, then rename.
        let mut staged = NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("failed to stage swatch in '{}'", self.dir.display()))?;
        RgbImage::from_pixel(SWATCH_SIZE, SWATCH_SIZE, Rgb(outcome.swatch()))
            .write_to(staged.as_file_mut(), ImageFormat::Png)
            .with_context(|| format!("failed to encode swatch '{}'", path.display()))?;
        staged
            .persist(&path)
            .with_context(|| format!("failed to write swatch '{}'", path.display()))?;
        info!(path = %path.display(), "generated result swatch");
        Ok(path)
    }

    pub fn ensure_all(&self) -> Result<()> {
        for outcome in Outcome::ALL {
            self.ensure(outcome)?;
        }
        Ok(())
    }

    pub async fn load(&self, outcome: Outcome) -> Result<Vec<u8>> {
        let assets = self.clone();
        let path = tokio::task::spawn_blocking(move || assets.ensure(outcome))
            .await
            .context("swatch generation task failed")??;
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed to read swatch '{}'", path.display()))
    }
}

#[cfg(test)]
#[path = "tests/assets_tests.rs"]
mod tests;
