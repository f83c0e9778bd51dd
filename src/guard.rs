//! Protects an existing snapshot from being overwritten without confirmation.

use crate::config::TargetPath;
use crate::error::DeleteError;
use std::io;
use std::path::Path;

/// Filesystem seam used by the lifecycle controller.
pub trait Workspace: Send + Sync {
    /// True iff an entry exists at `path`. Never cached.
    fn needs_confirmation(&self, path: &TargetPath) -> bool;

    /// Recursively remove `path`. A path that is already gone counts as removed.
    fn delete(&self, path: &TargetPath) -> Result<(), DeleteError>;
}

pub struct FsWorkspace;

impl Workspace for FsWorkspace {
    fn needs_confirmation(&self, path: &TargetPath) -> bool {
        // symlink_metadata so a dangling symlink still counts as present
        std::fs::symlink_metadata(path.as_path()).is_ok()
    }

    fn delete(&self, path: &TargetPath) -> Result<(), DeleteError> {
        tracing::info!(path = %path, "removing existing snapshot");
        remove_entry(path.as_path()).map_err(|source| DeleteError {
            path: path.as_path().to_path_buf(),
            source,
        })
    }
}

fn remove_entry(path: &Path) -> io::Result<()> {
    let removed = match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(path),
        Ok(_) => std::fs::remove_file(path),
        Err(e) => Err(e),
    };
    match removed {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "snapshot already gone");
            Ok(())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_presence_without_caching() {
        let dir = tempfile::tempdir().unwrap();
        let target = TargetPath::new(dir.path().join("stage")).unwrap();
        let ws = FsWorkspace;

        assert!(!ws.needs_confirmation(&target));
        std::fs::create_dir(target.as_path()).unwrap();
        assert!(ws.needs_confirmation(&target));
        std::fs::remove_dir(target.as_path()).unwrap();
        assert!(!ws.needs_confirmation(&target));
    }

    #[test]
    fn delete_removes_tree_and_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let tree = dir.path().join("stage");
        std::fs::create_dir_all(tree.join("nested")).unwrap();
        std::fs::write(tree.join("nested/toc.dat"), b"data").unwrap();
        let target = TargetPath::new(&tree).unwrap();

        FsWorkspace.delete(&target).unwrap();
        assert!(!tree.exists());

        let file = dir.path().join("stage.dump");
        std::fs::write(&file, b"x").unwrap();
        let target = TargetPath::new(&file).unwrap();
        FsWorkspace.delete(&target).unwrap();
        assert!(!file.exists());
    }

    #[test]
    fn delete_of_missing_path_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let target = TargetPath::new(dir.path().join("absent")).unwrap();
        FsWorkspace.delete(&target).unwrap();
        FsWorkspace.delete(&target).unwrap();
        assert!(!FsWorkspace.needs_confirmation(&target));
    }

    #[cfg(unix)]
    #[test]
    fn delete_reports_unremovable_path() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("locked");
        std::fs::create_dir(&parent).unwrap();
        let file = parent.join("stage.dump");
        std::fs::write(&file, b"x").unwrap();
        std::fs::set_permissions(&parent, std::fs::Permissions::from_mode(0o500)).unwrap();

        let target = TargetPath::new(&file).unwrap();
        let result = FsWorkspace.delete(&target);
        std::fs::set_permissions(&parent, std::fs::Permissions::from_mode(0o700)).unwrap();

        // root ignores directory permissions
        if let Err(err) = result {
            assert_eq!(err.path, file);
            assert_eq!(err.source.kind(), io::ErrorKind::PermissionDenied);
        }
    }
}
