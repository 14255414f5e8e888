use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, warn};

use shared::protocol::Submission;

pub mod assets;

pub use assets::ResultAssets;

/// Submitted learner logs, kept as a single JSON array on disk.
///
/// Every write rewrites the whole file. Callers that can race each other must
/// serialize their `append`/`clear_all` calls.
#[derive(Debug, Clone)]
pub struct SubmissionStore {
    path: PathBuf,
}

impl SubmissionStore {
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        ensure_parent_dir_exists(&path).await?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn health_check(&self) -> Result<()> {
        let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };
        let metadata = fs::metadata(parent)
            .await
            .with_context(|| format!("submission directory '{}' unavailable", parent.display()))?;
        anyhow::ensure!(
            metadata.is_dir(),
            "submission directory '{}' is not a directory",
            parent.display()
        );
        Ok(())
    }

    /// Reads every stored submission. A missing or undecodable file reads as
    /// an empty collection.
    pub async fn load_all(&self) -> Vec<Submission> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(error) => {
                warn!(
                    path = %self.path.display(),
                    %error,
                    "failed to read submissions; treating as empty"
                );
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Vec<Submission>>(&raw) {
            Ok(submissions) => submissions,
            Err(error) => {
                warn!(
                    path = %self.path.display(),
                    %error,
                    "submission file is not valid; treating as empty"
                );
                Vec::new()
            }
        }
    }

    /// Appends one submission and returns the stored count afterwards.
    pub async fn append(&self, submission: Submission) -> Result<usize> {
        let mut submissions = self.load_all().await;
        submissions.push(submission);
        self.save_all(&submissions).await?;
        debug!(
            path = %self.path.display(),
            count = submissions.len(),
            "submission appended"
        );
        Ok(submissions.len())
    }

    pub async fn clear_all(&self) -> Result<()> {
        self.save_all(&[]).await
    }

    /// Sibling file each write goes through before replacing `path`.
    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Replaces the file in one rename, so a crash mid-write leaves the
    /// previous contents in place.
    async fn save_all(&self, submissions: &[Submission]) -> Result<()> {
        let encoded = encode_pretty(submissions)?;
        let staging = self.staging_path();

        let mut file = fs::File::create(&staging)
            .await
            .with_context(|| format!("failed to create '{}'", staging.display()))?;
        file.write_all(&encoded)
            .await
            .with_context(|| format!("failed to write submissions to '{}'", staging.display()))?;
        file.sync_all()
            .await
            .with_context(|| format!("failed to flush '{}'", staging.display()))?;
        drop(file);

        fs::rename(&staging, &self.path).await.with_context(|| {
            format!(
                "failed to replace '{}' with '{}'",
                self.path.display(),
                staging.display()
            )
        })?;
        Ok(())
    }
}

fn encode_pretty(submissions: &[Submission]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    submissions
        .serialize(&mut serializer)
        .context("failed to encode submissions")?;
    Ok(buf)
}

async fn ensure_parent_dir_exists(path: &Path) -> Result<()> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    fs::create_dir_all(parent).await.with_context(|| {
        format!(
            "failed to create parent directory '{}' for submission file '{}'",
            parent.display(),
            path.display()
        )
    })?;

    Ok(())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
