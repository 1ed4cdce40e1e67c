//! Filesystem persistence for generated artifacts.
//!
//! Transcripts and card images are written under a static-served directory;
//! callers get back the deterministic public URL derived from the filename.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use tokio::fs;

/// Kind of artifact, selecting the subdirectory it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Transcript,
    Card,
}

impl ArtifactKind {
    pub fn dir(self) -> &'static str {
        match self {
            Self::Transcript => "transcripts",
            Self::Card => "cards",
        }
    }
}

/// Writes artifacts below one root directory and derives their public URLs.
///
/// Cheap to clone. The root and the public base URL come from configuration;
/// the directory layout is created once at startup.
#[derive(Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    public_url: String,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        let public_url = public_url.into().trim_end_matches('/').to_string();
        Self {
            root: root.into(),
            public_url,
        }
    }

    /// Directory artifacts of a kind are stored in (and served from).
    pub fn dir_path(&self, kind: ArtifactKind) -> PathBuf {
        self.root.join(kind.dir())
    }

    /// Creates the artifact directory layout.
    pub async fn ensure_layout(&self) -> std::io::Result<()> {
        fs::create_dir_all(self.dir_path(ArtifactKind::Transcript)).await?;
        fs::create_dir_all(self.dir_path(ArtifactKind::Card)).await?;
        Ok(())
    }

    /// Persists an artifact and returns its public retrieval URL.
    pub async fn store(
        &self,
        kind: ArtifactKind,
        filename: &str,
        bytes: &[u8],
    ) -> std::io::Result<String> {
        let path = self.dir_path(kind).join(filename);
        fs::write(&path, bytes).await?;

        tracing::debug!("Stored artifact {}", path.display());
        Ok(format!("{}/{}/{}", self.public_url, kind.dir(), filename))
    }

    /// Builds a timestamp-addressed filename with a short random suffix so
    /// two artifacts created in the same millisecond cannot collide.
    pub fn timestamped_name(prefix: &str, extension: &str) -> String {
        const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
        let mut rng = rand::rng();
        let suffix: String = (0..4)
            .map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect();

        format!(
            "{}-{}-{}.{}",
            prefix,
            Utc::now().timestamp_millis(),
            suffix,
            extension
        )
    }

    /// Deletes artifacts of a kind whose files are older than `max_age`.
    /// Returns how many files were removed. Unreadable entries are skipped.
    pub async fn sweep_older_than(
        &self,
        kind: ArtifactKind,
        max_age: Duration,
    ) -> std::io::Result<usize> {
        let mut removed = 0;
        let mut entries = fs::read_dir(self.dir_path(kind)).await?;

        while let Some(entry) = entries.next_entry().await? {
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let expired = metadata
                .modified()
                .ok()
                .and_then(|modified| modified.elapsed().ok())
                .map(|age| age >= max_age)
                .unwrap_or(false);
            if !expired {
                continue;
            }

            match fs::remove_file(entry.path()).await {
                Ok(()) => {
                    tracing::info!("Deleted expired artifact {}", entry.path().display());
                    removed += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        "Failed to delete expired artifact {}: {}",
                        entry.path().display(),
                        err
                    );
                }
            }
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> ArtifactStore {
        let root = std::env::temp_dir().join(format!(
            "botbridge-artifacts-{}",
            ArtifactStore::timestamped_name("test", "d")
        ));
        ArtifactStore::new(root, "http://localhost:3000/")
    }

    /// Tests that storing an artifact writes the file and derives the URL
    /// from the base URL, kind directory and filename.
    ///
    /// Expected: Ok with file on disk and matching URL
    #[tokio::test]
    async fn stores_artifact_and_derives_url() {
        let store = temp_store();
        store.ensure_layout().await.unwrap();

        let url = store
            .store(ArtifactKind::Transcript, "transcript-1.html", b"<html></html>")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:3000/transcripts/transcript-1.html");
        let on_disk = fs::read(store.dir_path(ArtifactKind::Transcript).join("transcript-1.html"))
            .await
            .unwrap();
        assert_eq!(on_disk, b"<html></html>");
    }

    /// Tests that the sweep only removes files past the age bound.
    ///
    /// Expected: zero removals for a long bound, all files gone for a zero bound
    #[tokio::test]
    async fn sweep_respects_age_bound() {
        let store = temp_store();
        store.ensure_layout().await.unwrap();
        store
            .store(ArtifactKind::Transcript, "transcript-2.html", b"x")
            .await
            .unwrap();

        let removed = store
            .sweep_older_than(ArtifactKind::Transcript, Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(removed, 0);

        let removed = store
            .sweep_older_than(ArtifactKind::Transcript, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(removed, 1);
    }

    /// Tests the timestamp-addressed filename shape.
    ///
    /// Expected: prefix, millisecond timestamp, random suffix, extension
    #[test]
    fn timestamped_names_are_unique() {
        let a = ArtifactStore::timestamped_name("profile", "png");
        let b = ArtifactStore::timestamped_name("profile", "png");

        assert!(a.starts_with("profile-"));
        assert!(a.ends_with(".png"));
        assert_ne!(a, b);
    }
}
