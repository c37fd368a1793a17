//! Scoped temp workspaces for per-unit mapping attempts.
//!
//! Every mapping attempt gets its own uniquely named directory holding the
//! fixed artifact triad: `input.box` (boundary description), `input.xaig` +
//! `input.sym` (exported fragment and port-symbol map), and `output.aig`
//! (engine result). Workspaces for different units never share a name, so
//! callers could in principle run units in parallel; this pass does not.

use crate::error::{MapError, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What to do with a workspace once its mapping attempt is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retention {
    /// Remove the whole subtree on release.
    Remove,
    /// Leave the directory in place for inspection.
    Keep,
}

/// Workspace name template. The trailing `XXXXXX` is replaced with random
/// alphanumerics. When the workspace is to be kept, bytes 0 and 4 are
/// pre-filled with `_` first, turning the name into a relative path in the
/// working directory (`_tmp_lutmap-XXXXXX`) that stands out when listing
/// retained directories. A debugging aid, not a security property.
const NAME_TEMPLATE: &str = "/tmp/lutmap-XXXXXX";

const CREATE_ATTEMPTS: usize = 8;

/// A directory scoped to exactly one module's one mapping attempt.
///
/// There is no `Drop` cleanup: dropping a workspace without calling
/// [`Workspace::release`] leaves the directory behind, which is exactly
/// what the fatal-abort path wants.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    retention: Retention,
}

impl Workspace {
    /// Create a fresh, empty workspace under the configured policy.
    pub fn create(retention: Retention) -> Result<Self> {
        Self::create_from_template(NAME_TEMPLATE, retention)
    }

    fn create_from_template(template: &str, retention: Retention) -> Result<Self> {
        for _ in 0..CREATE_ATTEMPTS {
            let name = unique_name(template, retention == Retention::Keep);
            match fs::create_dir(&name) {
                Ok(()) => {
                    debug!(path = %name, "created temp workspace");
                    return Ok(Self {
                        path: PathBuf::from(name),
                        retention,
                    });
                }
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Err(MapError::WorkspaceCollision {
            template: template.to_string(),
        })
    }

    /// The workspace directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Retention policy this workspace was created under.
    pub fn retention(&self) -> Retention {
        self.retention
    }

    /// Boundary/box description file.
    pub fn box_file(&self) -> PathBuf {
        self.path.join("input.box")
    }

    /// Exported logic fragment.
    pub fn fragment_file(&self) -> PathBuf {
        self.path.join("input.xaig")
    }

    /// Port-symbol map for wide-port round-tripping.
    pub fn symbol_file(&self) -> PathBuf {
        self.path.join("input.sym")
    }

    /// Result file produced by the engine.
    pub fn result_file(&self) -> PathBuf {
        self.path.join("output.aig")
    }

    /// Release the workspace: remove the whole subtree under
    /// [`Retention::Remove`], leave it in place under [`Retention::Keep`].
    pub fn release(self) -> Result<()> {
        match self.retention {
            Retention::Remove => {
                info!("removing temp workspace");
                debug!(path = %self.path.display(), "removing");
                fs::remove_dir_all(&self.path)?;
            }
            Retention::Keep => {
                debug!(path = %self.path.display(), "keeping temp workspace");
            }
        }
        Ok(())
    }
}

/// Instantiate the name template: mark the kept variant, then substitute
/// the trailing `X` run with random alphanumerics.
fn unique_name(template: &str, mark_kept: bool) -> String {
    let mut name = template.as_bytes().to_vec();
    if mark_kept {
        name[0] = b'_';
        name[4] = b'_';
    }
    let mut rng = rand::thread_rng();
    for byte in name.iter_mut().rev() {
        if *byte != b'X' {
            break;
        }
        *byte = rng.sample(Alphanumeric);
    }
    String::from_utf8(name).expect("template is ASCII")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_the_template() {
        let name = unique_name(NAME_TEMPLATE, false);
        assert!(name.starts_with("/tmp/lutmap-"));
        let suffix = name.strip_prefix("/tmp/lutmap-").unwrap();
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn kept_names_are_marked() {
        let name = unique_name(NAME_TEMPLATE, true);
        assert!(name.starts_with("_tmp_lutmap-"));
    }

    #[test]
    fn names_are_unique() {
        assert_ne!(
            unique_name(NAME_TEMPLATE, false),
            unique_name(NAME_TEMPLATE, false)
        );
    }

    #[test]
    fn release_removes_the_subtree() {
        let ws = Workspace::create(Retention::Remove).unwrap();
        let path = ws.path().to_path_buf();
        assert!(path.is_dir());
        fs::write(ws.box_file(), "boxes").unwrap();

        ws.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn release_keeps_marked_workspaces() {
        let ws = Workspace::create(Retention::Keep).unwrap();
        let path = ws.path().to_path_buf();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("_tmp_lutmap-"));

        ws.release().unwrap();
        assert!(path.is_dir());
        fs::remove_dir_all(path).unwrap();
    }

    #[test]
    fn artifact_triad_lives_inside_the_workspace() {
        let ws = Workspace::create(Retention::Remove).unwrap();
        for file in [ws.box_file(), ws.fragment_file(), ws.symbol_file(), ws.result_file()] {
            assert_eq!(file.parent(), Some(ws.path()));
        }
        ws.release().unwrap();
    }
}
