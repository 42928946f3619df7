//! Per-project status record and its flat-file store.
//!
//! The record is the fast-path cache of workflow progress; the
//! filesystem remains ground truth, and reconciliation repairs any
//! disagreement on load. The store reads and writes the record as an
//! atomic whole: callers mutate a full in-memory copy and write it
//! back. There is no locking; the last writer wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::catalog::{self, Role};
use crate::errors::StoreError;

/// Lifecycle of a single phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseStatus {
    NotStarted,
    AiWorking,
    AwaitingUser,
    UserReviewing,
    Complete,
}

/// Lifecycle of a role as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoleState {
    NotStarted,
    InProgress,
    Complete,
}

/// The role a project is currently working through, or the terminal
/// marker once engineering has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrentRole {
    Product,
    Design,
    Engineering,
    Complete,
}

impl CurrentRole {
    /// The active role, or `None` when the workflow is finished.
    pub fn role(self) -> Option<Role> {
        match self {
            CurrentRole::Product => Some(Role::Product),
            CurrentRole::Design => Some(Role::Design),
            CurrentRole::Engineering => Some(Role::Engineering),
            CurrentRole::Complete => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == CurrentRole::Complete
    }
}

impl From<Role> for CurrentRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Product => CurrentRole::Product,
            Role::Design => CurrentRole::Design,
            Role::Engineering => CurrentRole::Engineering,
        }
    }
}

/// Progress of one phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub status: PhaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Default for PhaseRecord {
    fn default() -> Self {
        Self {
            status: PhaseStatus::NotStarted,
            started_at: None,
            completed_at: None,
        }
    }
}

/// Progress of one role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleStatus {
    pub status: RoleState,
    pub current_phase: String,
    pub phases: BTreeMap<String, PhaseRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl RoleStatus {
    fn fresh(role: Role) -> Self {
        let phases = catalog::phases_for(role)
            .iter()
            .map(|p| (p.to_string(), PhaseRecord::default()))
            .collect();
        Self {
            status: RoleState::NotStarted,
            current_phase: catalog::first_phase(role).to_string(),
            phases,
            completed_at: None,
        }
    }
}

/// The whole persisted progress record for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub current_role: CurrentRole,
    pub current_phase_key: String,
    pub roles: BTreeMap<Role, RoleStatus>,
    pub last_updated_at: DateTime<Utc>,
}

impl StatusRecord {
    /// A fresh record positioned at the first phase of product.
    pub fn new() -> Self {
        let roles = Role::ALL.iter().map(|r| (*r, RoleStatus::fresh(*r))).collect();
        Self {
            current_role: CurrentRole::Product,
            current_phase_key: catalog::phase_key(Role::Product, catalog::first_phase(Role::Product)),
            roles,
            last_updated_at: Utc::now(),
        }
    }

    /// The current (role, phase) position, or `None` once terminal.
    pub fn current(&self) -> Option<(Role, String)> {
        let role = self.current_role.role()?;
        let phase = self.roles.get(&role)?.current_phase.clone();
        Some((role, phase))
    }

    /// Record for a phase, creating a default entry if the role's map
    /// predates it (implicit backward compatibility).
    pub fn phase_record_mut(&mut self, role: Role, phase: &str) -> &mut PhaseRecord {
        self.roles
            .entry(role)
            .or_insert_with(|| RoleStatus::fresh(role))
            .phases
            .entry(phase.to_string())
            .or_default()
    }

    pub fn phase_record(&self, role: Role, phase: &str) -> Option<&PhaseRecord> {
        self.roles.get(&role)?.phases.get(phase)
    }

    /// Move the current position to (role, phase), keeping
    /// `current_phase_key` and the role's `current_phase` in lockstep.
    pub fn set_current(&mut self, role: Role, phase: &str) {
        self.current_role = role.into();
        self.current_phase_key = catalog::phase_key(role, phase);
        self.roles
            .entry(role)
            .or_insert_with(|| RoleStatus::fresh(role))
            .current_phase = phase.to_string();
    }

    /// Mark the whole workflow finished.
    pub fn set_terminal(&mut self) {
        self.current_role = CurrentRole::Complete;
        self.current_phase_key = "complete".to_string();
    }

    /// Global catalog position of the current phase. Terminal records
    /// sort after every real position.
    pub fn current_position(&self) -> (usize, usize) {
        match self.current() {
            Some((role, phase)) => {
                catalog::catalog_position(role, &phase).unwrap_or((role.index(), usize::MAX))
            }
            None => (usize::MAX, usize::MAX),
        }
    }
}

impl Default for StatusRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Flat-file JSON store, one record per project folder.
pub struct StatusStore {
    projects_root: PathBuf,
}

impl StatusStore {
    pub fn new(projects_root: PathBuf) -> Self {
        Self { projects_root }
    }

    pub fn project_dir(&self, project_id: &str) -> PathBuf {
        self.projects_root.join(project_id)
    }

    pub fn status_path(&self, project_id: &str) -> PathBuf {
        self.project_dir(project_id)
            .join(".specloom")
            .join("status.json")
    }

    /// Read a project's record. A missing file is not an error.
    pub fn read(&self, project_id: &str) -> Result<Option<StatusRecord>, StoreError> {
        let path = self.status_path(project_id);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::ReadFailed { path, source: e }),
        };
        let record = serde_json::from_str(&content)
            .map_err(|e| StoreError::ParseFailed { path, source: e })?;
        Ok(Some(record))
    }

    /// Overwrite a project's record, stamping `last_updated_at`.
    pub fn write(&self, project_id: &str, record: &mut StatusRecord) -> Result<(), StoreError> {
        record.last_updated_at = Utc::now();

        let path = self.status_path(project_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::WriteFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let content =
            serde_json::to_string_pretty(record).map_err(StoreError::SerializeFailed)?;
        std::fs::write(&path, content).map_err(|e| StoreError::WriteFailed { path, source: e })?;
        Ok(())
    }
}
