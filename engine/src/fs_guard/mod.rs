use sdk::errors::EngineError;
use std::path::{Path, PathBuf};

/// FileSystemGuard confines file tool access to the configured workspace.
///
/// It keeps a deny list of sensitive names and checks paths both before and
/// after canonicalization so symlinks cannot be used to reach denied or
/// out-of-workspace locations.
///
/// # Validation
///
/// 1. Check deny list before canonicalization
/// 2. Canonicalize path to resolve symlinks and .. patterns
/// 3. Check deny list after canonicalization
/// 4. Verify path is within workspace
#[derive(Debug)]
pub struct FileSystemGuard {
    workspace: PathBuf,
    deny_list: Vec<PathBuf>,
}

impl FileSystemGuard {
    /// Creates a guard rooted at `workspace`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::PathCanonicalization` if the workspace does not
    /// exist or cannot be resolved.
    pub fn new(workspace: PathBuf) -> Result<Self, EngineError> {
        // Canonicalize workspace to handle symlinks (e.g., /var -> /private/var on macOS)
        let workspace = workspace
            .canonicalize()
            .map_err(|e| EngineError::PathCanonicalization(workspace.clone(), e.to_string()))?;

        let deny_list = vec![
            PathBuf::from(".ssh"),
            PathBuf::from(".env"),
            PathBuf::from(".aws/credentials"),
            PathBuf::from(".config/gcloud"),
            PathBuf::from("id_rsa"),
            PathBuf::from("id_ed25519"),
            PathBuf::from(".gnupg"),
            PathBuf::from(".kube/config"),
            PathBuf::from(".nexus"),
        ];

        Ok(Self {
            workspace,
            deny_list,
        })
    }

    /// Resolve a user-supplied path against the workspace and validate it.
    ///
    /// Relative paths are joined onto the workspace; absolute paths are
    /// checked as given.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, EngineError> {
        let target = Path::new(path);
        let abs = if target.is_absolute() {
            target.to_path_buf()
        } else {
            self.workspace.join(target)
        };
        self.validate_path(&abs)
    }

    /// Validates a path through the four checks above.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::PathDenied` if the path matches the deny list.
    /// Returns `EngineError::PathCanonicalization` if canonicalization fails.
    /// Returns `EngineError::PathOutsideWorkspace` if the path is outside workspace.
    pub fn validate_path(&self, path: &Path) -> Result<PathBuf, EngineError> {
        if self.is_denied(path) {
            return Err(EngineError::PathDenied(path.to_path_buf()));
        }

        let canonical = path
            .canonicalize()
            .map_err(|e| EngineError::PathCanonicalization(path.to_path_buf(), e.to_string()))?;

        // Catches symlink bypasses
        if self.is_denied(&canonical) {
            return Err(EngineError::PathDenied(canonical));
        }

        if !canonical.starts_with(&self.workspace) {
            return Err(EngineError::PathOutsideWorkspace(canonical));
        }

        Ok(canonical)
    }

    /// True when the path ends with, or contains a component equal to, a
    /// deny list entry.
    fn is_denied(&self, path: &Path) -> bool {
        self.deny_list.iter().any(|denied| {
            path.ends_with(denied)
                || path.components().any(|c| {
                    c.as_os_str()
                        .to_str()
                        .is_some_and(|name| denied.as_os_str().to_str() == Some(name))
                })
        })
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_workspace_is_an_error() {
        let temp = TempDir::new().unwrap();
        let result = FileSystemGuard::new(temp.path().join("absent"));
        assert!(matches!(
            result.unwrap_err(),
            EngineError::PathCanonicalization(_, _)
        ));
    }

    #[test]
    fn test_deny_list_before_canonicalization() {
        let temp = TempDir::new().unwrap();
        let guard = FileSystemGuard::new(temp.path().to_path_buf()).unwrap();

        let result = guard.resolve(".ssh");
        assert!(matches!(result.unwrap_err(), EngineError::PathDenied(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_deny_list_after_canonicalization() {
        let temp = TempDir::new().unwrap();
        let ssh_dir = temp.path().join(".ssh");
        fs::create_dir(&ssh_dir).unwrap();
        let guard = FileSystemGuard::new(temp.path().to_path_buf()).unwrap();

        let link = temp.path().join("safe_link");
        std::os::unix::fs::symlink(&ssh_dir, &link).unwrap();

        let result = guard.validate_path(&link);
        assert!(matches!(result.unwrap_err(), EngineError::PathDenied(_)));
    }

    #[test]
    fn test_path_traversal_attempt() {
        let temp = TempDir::new().unwrap();
        let workspace = temp.path().join("workspace");
        fs::create_dir(&workspace).unwrap();
        fs::write(temp.path().join("secret.txt"), "secret").unwrap();
        let guard = FileSystemGuard::new(workspace).unwrap();

        let result = guard.resolve("../secret.txt");
        assert!(matches!(
            result.unwrap_err(),
            EngineError::PathOutsideWorkspace(_)
        ));
    }

    #[test]
    fn test_relative_path_resolves_in_workspace() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("tools")).unwrap();
        let guard = FileSystemGuard::new(temp.path().to_path_buf()).unwrap();

        let resolved = guard.resolve("tools").unwrap();
        assert_eq!(resolved, temp.path().join("tools").canonicalize().unwrap());
        assert_eq!(guard.resolve(".").unwrap(), guard.workspace());
    }
}
