//! Runtime configuration for specloom.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::Role;

/// How long an `ai-working` phase may sit before `recover` treats it
/// as stale. The engine never enforces this on its own; recovery is
/// always caller-invoked.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(30 * 60);

/// Settle window before reacting to a filesystem change, so we never
/// classify a file mid-write.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Runtime configuration: where projects live and the engine's timing
/// knobs.
#[derive(Debug, Clone)]
pub struct Config {
    pub projects_root: PathBuf,
    pub stale_after: Duration,
    pub debounce: Duration,
}

impl Config {
    /// Create a config rooted at `projects_root`, resolving the path.
    pub fn new(projects_root: PathBuf) -> Result<Self> {
        let projects_root = projects_root
            .canonicalize()
            .context("Failed to resolve projects root directory")?;
        Ok(Self {
            projects_root,
            stale_after: DEFAULT_STALE_AFTER,
            debounce: DEFAULT_DEBOUNCE,
        })
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn project_dir(&self, project_id: &str) -> PathBuf {
        self.projects_root.join(project_id)
    }

    /// Create a project's directory skeleton: one output directory per
    /// role plus the `.specloom/` metadata directory.
    pub fn ensure_project_dirs(&self, project_id: &str) -> Result<()> {
        let dir = self.project_dir(project_id);
        std::fs::create_dir_all(dir.join(".specloom"))
            .context("Failed to create project metadata directory")?;
        for role in Role::ALL {
            std::fs::create_dir_all(dir.join(role.as_str()))
                .with_context(|| format!("Failed to create {} output directory", role))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_canonicalizes_root() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.projects_root, dir.path().canonicalize().unwrap());
        assert_eq!(config.stale_after, DEFAULT_STALE_AFTER);
    }

    #[test]
    fn test_config_missing_root_errors() {
        let result = Config::new(PathBuf::from("/nonexistent/specloom-root"));
        assert!(result.is_err());
    }

    #[test]
    fn test_ensure_project_dirs_creates_skeleton() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path().to_path_buf()).unwrap();
        config.ensure_project_dirs("demo").unwrap();

        let project = config.project_dir("demo");
        assert!(project.join(".specloom").exists());
        assert!(project.join("product").exists());
        assert!(project.join("design").exists());
        assert!(project.join("engineering").exists());
    }

    #[test]
    fn test_with_stale_after_overrides_default() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path().to_path_buf())
            .unwrap()
            .with_stale_after(Duration::from_secs(5));
        assert_eq!(config.stale_after, Duration::from_secs(5));
    }
}
