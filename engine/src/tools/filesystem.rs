//! File Tool
//!
//! Lists directories and reads files inside the workspace. Every path passes
//! through [`FileSystemGuard`] before any I/O.

use async_trait::async_trait;
use sdk::{EngineError, Parameters, Tool};
use serde_json::{json, Value};
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use crate::fs_guard::FileSystemGuard;

/// Upper bound on bytes returned by `read`
pub const MAX_READ_BYTES: usize = 10_000;

#[derive(Debug)]
pub struct FileTool {
    guard: FileSystemGuard,
}

impl FileTool {
    pub fn new(workspace: PathBuf) -> Result<Self, EngineError> {
        Ok(Self {
            guard: FileSystemGuard::new(workspace)?,
        })
    }

    /// Directory entries one per line, sorted, directories suffixed with `/`
    pub async fn list_dir(&self, path: &str) -> Result<String, EngineError> {
        let path = self.resolve_path(path)?;
        info!("Listing directory: {}", path.display());

        let mut entries = fs::read_dir(&path).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let mut name = entry.file_name().to_string_lossy().to_string();
            if entry.file_type().await?.is_dir() {
                name.push('/');
            }
            names.push(name);
        }

        if names.is_empty() {
            return Ok("(empty directory)".to_string());
        }

        names.sort();
        Ok(names.join("\n"))
    }

    /// At most [`MAX_READ_BYTES`] of a file, decoded lossily
    pub async fn read_file(&self, path: &str) -> Result<String, EngineError> {
        let path = self.resolve_path(path)?;
        info!("Reading file: {}", path.display());

        let file = fs::File::open(&path).await?;
        let size = file.metadata().await?.len();

        let mut bytes = Vec::with_capacity(MAX_READ_BYTES.min(size as usize));
        file.take(MAX_READ_BYTES as u64)
            .read_to_end(&mut bytes)
            .await?;

        if size > MAX_READ_BYTES as u64 {
            debug!(
                "Truncated {} to {} of {} bytes",
                path.display(),
                bytes.len(),
                size
            );
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn resolve_path(&self, path: &str) -> Result<PathBuf, EngineError> {
        self.guard.resolve(path).inspect_err(|e| {
            warn!("Path validation failed for {}: {}", path, e);
        })
    }
}

#[async_trait]
impl Tool for FileTool {
    fn name(&self) -> &str {
        "file"
    }

    fn description(&self) -> &str {
        "List directories and read files inside the workspace"
    }

    async fn execute(&self, params: &Parameters) -> Result<Value, EngineError> {
        let operation = params.str("operation")?;
        let path = params.str_opt("path").unwrap_or(".");

        match operation {
            "list" => Ok(json!(self.list_dir(path).await?)),
            "read" => Ok(json!(self.read_file(path).await?)),
            other => Err(EngineError::UnknownOperation(format!(
                "file operation '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FileTool) {
        let temp = TempDir::new().unwrap();
        let tool = FileTool::new(temp.path().to_path_buf()).unwrap();
        (temp, tool)
    }

    #[tokio::test]
    async fn test_list_dir() {
        let (temp, tool) = setup();
        std::fs::write(temp.path().join("b.txt"), "b").unwrap();
        std::fs::write(temp.path().join("a.txt"), "a").unwrap();
        std::fs::create_dir(temp.path().join("subdir")).unwrap();

        let listing = tool.list_dir(".").await.unwrap();
        assert_eq!(listing, "a.txt\nb.txt\nsubdir/");
    }

    #[tokio::test]
    async fn test_list_empty_dir() {
        let (temp, tool) = setup();
        std::fs::create_dir(temp.path().join("empty")).unwrap();
        assert_eq!(tool.list_dir("empty").await.unwrap(), "(empty directory)");
    }

    #[tokio::test]
    async fn test_read_truncates() {
        let (temp, tool) = setup();
        std::fs::write(temp.path().join("big.txt"), "x".repeat(MAX_READ_BYTES + 50)).unwrap();

        let content = tool.read_file("big.txt").await.unwrap();
        assert_eq!(content.len(), MAX_READ_BYTES);
    }

    #[tokio::test]
    async fn test_read_large_file_returns_prefix() {
        let (temp, tool) = setup();
        let mut body = "a".repeat(MAX_READ_BYTES);
        body.push_str(&"b".repeat(4 * 1024 * 1024));
        std::fs::write(temp.path().join("huge.log"), &body).unwrap();

        let content = tool.read_file("huge.log").await.unwrap();
        assert_eq!(content.len(), MAX_READ_BYTES);
        assert!(content.chars().all(|c| c == 'a'));

        let small = "short file";
        std::fs::write(temp.path().join("small.txt"), small).unwrap();
        assert_eq!(tool.read_file("small.txt").await.unwrap(), small);
    }

    #[tokio::test]
    async fn test_read_nonexistent_file() {
        let (_temp, tool) = setup();
        assert!(tool.read_file("nope.txt").await.is_err());
    }

    #[tokio::test]
    async fn test_execute_dispatch() {
        let (temp, tool) = setup();
        std::fs::write(temp.path().join("notes.txt"), "hello").unwrap();

        let params = Parameters::new()
            .with("operation", "read")
            .with("path", "notes.txt");
        assert_eq!(tool.execute(&params).await.unwrap(), json!("hello"));

        let params = Parameters::new().with("operation", "delete");
        assert!(matches!(
            tool.execute(&params).await.unwrap_err(),
            EngineError::UnknownOperation(_)
        ));
    }

    #[tokio::test]
    async fn test_path_traversal_blocked() {
        let (_temp, tool) = setup();
        let params = Parameters::new()
            .with("operation", "read")
            .with("path", "../../etc/passwd");
        assert!(tool.execute(&params).await.is_err());
    }

    #[tokio::test]
    async fn test_denied_path_blocked() {
        let (temp, tool) = setup();
        let ssh_dir = temp.path().join(".ssh");
        std::fs::create_dir(&ssh_dir).unwrap();
        std::fs::write(ssh_dir.join("id_rsa"), "private key").unwrap();

        let result = tool.read_file(".ssh/id_rsa").await;
        assert!(matches!(result.unwrap_err(), EngineError::PathDenied(_)));
    }
}
