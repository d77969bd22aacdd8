use std::path::{Path, PathBuf};

use crate::error::WorkflowError;

pub const DATA_DIR: &str = "data";
pub const TARGET_FILENAME: &str = "personalbest.ini";

/// Both configured paths must exist before anything else runs.
pub fn ensure_paths(source_file: &Path, repo_root: &Path) -> Result<(), WorkflowError> {
    if !source_file.is_file() {
        return Err(WorkflowError::MissingSource {
            path: source_file.to_path_buf(),
        });
    }
    if !repo_root.is_dir() {
        return Err(WorkflowError::MissingRepo {
            path: repo_root.to_path_buf(),
        });
    }
    Ok(())
}

pub fn target_path(repo_root: &Path) -> PathBuf {
    repo_root.join(DATA_DIR).join(TARGET_FILENAME)
}

/// Copies the lap-time file over `<repo>/data/personalbest.ini`.
pub fn copy_source_into_repo(source_file: &Path, repo_root: &Path) -> Result<PathBuf, WorkflowError> {
    let target = target_path(repo_root);
    let copy_error = |source| WorkflowError::Copy {
        from: source_file.to_path_buf(),
        to: target.clone(),
        source,
    };

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(copy_error)?;
    }
    std::fs::copy(source_file, &target).map_err(copy_error)?;

    log::debug!("copied {} to {}", source_file.display(), target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_paths_accepts_file_and_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("personalbest.ini");
        std::fs::write(&source, "x").unwrap();
        assert!(ensure_paths(&source, tmp.path()).is_ok());
    }

    #[test]
    fn ensure_paths_rejects_missing_source() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ensure_paths(&tmp.path().join("nope.ini"), tmp.path()).unwrap_err();
        assert!(matches!(err, WorkflowError::MissingSource { .. }));
    }

    #[test]
    fn ensure_paths_rejects_directory_as_source() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ensure_paths(tmp.path(), tmp.path()).unwrap_err();
        assert!(matches!(err, WorkflowError::MissingSource { .. }));
    }

    #[test]
    fn ensure_paths_rejects_missing_repo() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("personalbest.ini");
        std::fs::write(&source, "x").unwrap();
        let err = ensure_paths(&source, &tmp.path().join("site")).unwrap_err();
        assert!(matches!(err, WorkflowError::MissingRepo { .. }));
        assert!(err.to_string().contains("site"));
    }

    #[test]
    fn copy_creates_data_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("source.ini");
        std::fs::write(&source, "[best]\nlap=1:30.000\n").unwrap();
        let repo = tmp.path().join("site");
        std::fs::create_dir_all(&repo).unwrap();

        let target = copy_source_into_repo(&source, &repo).unwrap();

        assert_eq!(target, repo.join("data").join("personalbest.ini"));
        assert_eq!(
            std::fs::read_to_string(&target).unwrap(),
            "[best]\nlap=1:30.000\n"
        );
    }

    #[test]
    fn copy_overwrites_existing_target() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("source.ini");
        std::fs::write(&source, "new").unwrap();
        let repo = tmp.path().join("site");
        std::fs::create_dir_all(repo.join("data")).unwrap();
        std::fs::write(repo.join("data/personalbest.ini"), "old").unwrap();

        let target = copy_source_into_repo(&source, &repo).unwrap();
        assert_eq!(std::fs::read_to_string(target).unwrap(), "new");
    }

    #[test]
    fn copy_failure_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = tmp.path().join("site");
        std::fs::create_dir_all(&repo).unwrap();

        let err = copy_source_into_repo(&tmp.path().join("gone.ini"), &repo).unwrap_err();
        assert!(matches!(err, WorkflowError::Copy { .. }));
    }
}
