//! Drift detection and repair.
//!
//! A phase recorded as complete is only trusted once its rule
//! predicate has actually been checked against the filesystem; the
//! check is lazy, run on every project load rather than enforced at
//! write time. When the record and the files disagree, the record
//! loses: the phase is downgraded and the current position rewound so
//! the work gets redone.

use std::path::Path;

use crate::artifacts::{self, ArtifactSpec};
use crate::catalog::{self, PhaseKind, Role};
use crate::errors::EngineError;
use crate::status::{PhaseStatus, RoleState, StatusRecord};

use super::Engine;

/// One drift rule: a (role, phase) pair and the artifacts that must
/// back a recorded completion. Built once at startup from the
/// artifact map; never persisted.
#[derive(Debug, Clone)]
pub struct ReconciliationRule {
    pub id: String,
    pub role: Role,
    pub phase: &'static str,
    pub artifacts: Vec<&'static ArtifactSpec>,
}

impl ReconciliationRule {
    /// Whether the filesystem supports this phase being complete.
    pub fn predicate(&self, project_dir: &Path) -> bool {
        self.artifacts.iter().all(|s| s.is_satisfied(project_dir))
    }
}

/// One repaired disagreement between the record and the filesystem.
#[derive(Debug, Clone)]
pub struct DriftEntry {
    pub rule_id: String,
    pub description: String,
    pub from: PhaseStatus,
    pub to: PhaseStatus,
}

/// Result of reconciling one project.
#[derive(Debug)]
pub struct ReconcileOutcome {
    pub had_drift: bool,
    pub status: Option<StatusRecord>,
    pub drift: Vec<DriftEntry>,
}

/// Build the rule set from the artifact map, in catalog declaration
/// order. `-review` phases carry no artifacts of their own; a review
/// can only be genuine if the reviewed document still checks out, so
/// those rules borrow the matching `-generate` artifacts.
pub fn build_rules() -> Vec<ReconciliationRule> {
    let mut rules = Vec::new();
    for role in Role::ALL {
        for &phase in catalog::phases_for(role) {
            let artifacts = match catalog::phase_kind(phase) {
                PhaseKind::Review => {
                    artifacts::phase_artifacts(role, &format!("{}-generate", role.document_stem()))
                }
                _ => artifacts::phase_artifacts(role, phase),
            };
            if artifacts.is_empty() {
                continue;
            }
            rules.push(ReconciliationRule {
                id: catalog::phase_key(role, phase),
                role,
                phase,
                artifacts,
            });
        }
    }
    rules
}

impl Engine {
    /// Detect and repair drift for one project, persisting the record
    /// only if something changed. A missing record is nothing to do.
    ///
    /// Rules apply independently in declaration order; a later rule
    /// may rewind a position already rewound by an earlier one, so the
    /// earliest surviving phase wins. Running this twice without an
    /// intervening filesystem change reports no drift the second time.
    pub fn reconcile(&self, project_id: &str) -> Result<ReconcileOutcome, EngineError> {
        let Some(mut record) = self.store.read(project_id)? else {
            return Ok(ReconcileOutcome {
                had_drift: false,
                status: None,
                drift: Vec::new(),
            });
        };

        let project_dir = self.project_dir(project_id);
        let mut drift = Vec::new();

        for rule in &self.rules {
            if !Self::rule_trips(&record, rule, &project_dir) {
                continue;
            }

            tracing::warn!(
                rule = %rule.id,
                "recorded complete but artifacts are missing or placeholder; downgrading"
            );

            let pr = record.phase_record_mut(rule.role, rule.phase);
            pr.status = PhaseStatus::NotStarted;
            pr.completed_at = None;

            if let Some(rs) = record.roles.get_mut(&rule.role) {
                if rs.status == RoleState::Complete {
                    rs.status = RoleState::InProgress;
                    rs.completed_at = None;
                }
            }

            if let Some(rule_pos) = catalog::catalog_position(rule.role, rule.phase) {
                if record.current_position() >= rule_pos {
                    record.set_current(rule.role, rule.phase);
                }
            }

            drift.push(DriftEntry {
                rule_id: rule.id.clone(),
                description: format!(
                    "{} recorded complete but its artifacts do not check out",
                    rule.id
                ),
                from: PhaseStatus::Complete,
                to: PhaseStatus::NotStarted,
            });
        }

        let had_drift = !drift.is_empty();
        if had_drift {
            self.store.write(project_id, &mut record)?;
        }

        Ok(ReconcileOutcome {
            had_drift,
            status: Some(record),
            drift,
        })
    }

    /// Read-only diagnostic: which rules would fire, without repairing
    /// anything.
    pub fn check_for_drift(&self, project_id: &str) -> Result<Vec<DriftEntry>, EngineError> {
        let Some(record) = self.store.read(project_id)? else {
            return Ok(Vec::new());
        };
        let project_dir = self.project_dir(project_id);
        Ok(self
            .rules
            .iter()
            .filter(|rule| Self::rule_trips(&record, rule, &project_dir))
            .map(|rule| DriftEntry {
                rule_id: rule.id.clone(),
                description: format!(
                    "{} recorded complete but its artifacts do not check out",
                    rule.id
                ),
                from: PhaseStatus::Complete,
                to: PhaseStatus::NotStarted,
            })
            .collect())
    }

    /// The safe load path: repair drift, then give completions that
    /// happened while nothing was watching a chance to land before the
    /// caller sees the record.
    pub fn get_reconciled(&self, project_id: &str) -> Result<Option<StatusRecord>, EngineError> {
        let outcome = self.reconcile(project_id)?;
        let Some(record) = outcome.status else {
            return Ok(None);
        };
        match self.retroactive_check(project_id, &record)? {
            Some(updated) => Ok(Some(updated)),
            None => Ok(Some(record)),
        }
    }

    fn rule_trips(record: &StatusRecord, rule: &ReconciliationRule, project_dir: &Path) -> bool {
        let complete = record
            .phase_record(rule.role, rule.phase)
            .is_some_and(|pr| pr.status == PhaseStatus::Complete);
        complete && !rule.predicate(project_dir)
    }
}
