use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::WorkflowError;

pub const LOCK_FILENAME: &str = "workflow.lock";

/// Held for the duration of one check or publish cycle. The lock file holds
/// the owner's pid and is removed on drop.
#[derive(Debug)]
pub struct BusyGuard {
    path: PathBuf,
}

impl BusyGuard {
    pub fn acquire(path: &Path) -> Result<Self, WorkflowError> {
        let lock_error = |source| WorkflowError::Lock {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(lock_error)?;
        }

        match create_lock(path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if !lock_is_stale(path) {
                    return Err(WorkflowError::Busy {
                        lock: path.to_path_buf(),
                    });
                }
                log::warn!("removing stale workflow lock {}", path.display());
                std::fs::remove_file(path).map_err(lock_error)?;
                create_lock(path).map_err(|e| {
                    if e.kind() == ErrorKind::AlreadyExists {
                        WorkflowError::Busy {
                            lock: path.to_path_buf(),
                        }
                    } else {
                        lock_error(e)
                    }
                })?;
            }
            Err(e) => return Err(lock_error(e)),
        }

        log::debug!("acquired workflow lock {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            log::warn!(
                "failed to release workflow lock {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

fn create_lock(path: &Path) -> std::io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    writeln!(file, "{}", std::process::id())
}

/// A lock is stale when it names a process that no longer exists. A lock
/// whose pid cannot be read is treated as held.
fn lock_is_stale(path: &Path) -> bool {
    let pid = std::fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse::<u32>().ok());
    match pid {
        Some(pid) => !process_alive(pid),
        None => false,
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    // SAFETY: signal 0 performs permission and existence checks only.
    let rc = unsafe { libc::kill(pid, 0) };
    rc == 0 || std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}
