use std::io;
use std::path::{Path, PathBuf};

/// Sentinel file whose existence and modification time signal a pending
/// cluster reset to an out-of-band process watching the path.
#[derive(Debug, Clone)]
pub struct ResetSentinel {
    path: PathBuf,
}

impl ResetSentinel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the file if missing, otherwise rewrites it to refresh the
    /// modification time.
    pub async fn touch(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, b"reset requested\n").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn touch_creates_the_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let sentinel = ResetSentinel::new(dir.path().join("reset"));

        assert!(!sentinel.path().exists());
        sentinel.touch().await.unwrap();
        assert!(sentinel.path().is_file());
    }

    #[tokio::test]
    async fn touch_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let sentinel = ResetSentinel::new(dir.path().join("nested").join("reset"));

        sentinel.touch().await.unwrap();
        sentinel.touch().await.unwrap();
        assert!(sentinel.path().is_file());
    }

    #[tokio::test]
    async fn touch_fails_when_the_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let sentinel = ResetSentinel::new(blocker.join("reset"));

        assert!(sentinel.touch().await.is_err());
    }
}
