//! The phase-progression engine.
//!
//! `Engine` ties the status store, the reconciliation rules, and the
//! transition logic together behind one facade. It is the only thing
//! allowed to move a project between phases and roles; every other
//! surface (CLI, watcher) calls through it.

pub mod dispatch;
pub mod progress;
pub mod reconcile;

pub use reconcile::{DriftEntry, ReconcileOutcome, ReconciliationRule};

use std::path::PathBuf;

use crate::config::Config;
use crate::status::StatusStore;

pub struct Engine {
    pub(crate) store: StatusStore,
    pub(crate) config: Config,
    pub(crate) rules: Vec<ReconciliationRule>,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        let store = StatusStore::new(config.projects_root.clone());
        let rules = reconcile::build_rules();
        Self {
            store,
            config,
            rules,
        }
    }

    pub fn store(&self) -> &StatusStore {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn rules(&self) -> &[ReconciliationRule] {
        &self.rules
    }

    pub fn project_dir(&self, project_id: &str) -> PathBuf {
        self.config.project_dir(project_id)
    }
}
