//! Phase and role transitions.
//!
//! Per-phase state machine:
//! not-started → ai-working → user-reviewing → complete for document
//! phases, with answer phases completing directly. Complete is
//! terminal except for the one reserved exception: reconciliation may
//! force a phase back to not-started.
//!
//! Completion is optimistic: nothing here re-runs the reconciliation
//! predicates before marking a phase complete. Validation happens on
//! the next load.

use chrono::Utc;

use crate::artifacts;
use crate::catalog::{self, PhaseKind, Role};
use crate::errors::EngineError;
use crate::status::{PhaseRecord, PhaseStatus, RoleState, StatusRecord};

use super::Engine;

impl Engine {
    /// Put the current phase to work. `-generate` phases go to
    /// ai-working; user-driven `-answer` and `-review` phases park at
    /// awaiting-user. Idempotent if already in the target state; a
    /// no-op when the workflow is terminal or the phase is already
    /// complete.
    pub fn start_work(&self, project_id: &str) -> Result<Option<StatusRecord>, EngineError> {
        let Some(mut record) = self.store.read(project_id)? else {
            return Ok(None);
        };
        let Some((role, phase)) = record.current() else {
            return Ok(Some(record));
        };

        let target = match catalog::phase_kind(&phase) {
            PhaseKind::Generate => PhaseStatus::AiWorking,
            PhaseKind::Answer | PhaseKind::Review => PhaseStatus::AwaitingUser,
        };

        let pr = record.phase_record_mut(role, &phase);
        if pr.status == target || pr.status == PhaseStatus::Complete {
            return Ok(Some(record));
        }
        pr.status = target;
        pr.started_at = Some(Utc::now());

        if let Some(rs) = record.roles.get_mut(&role) {
            if rs.status == RoleState::NotStarted {
                rs.status = RoleState::InProgress;
            }
        }

        tracing::debug!(project = project_id, role = %role, phase = %phase, "phase started");
        self.store.write(project_id, &mut record)?;
        Ok(Some(record))
    }

    /// Mark the named phase complete and advance. Requests whose
    /// (role, phase) does not match the recorded current position are
    /// stale and return the record unchanged.
    ///
    /// Completing a role's last catalog phase completes the role and
    /// moves to the next role's first phase (reset to not-started), or
    /// to the terminal position after engineering.
    pub fn complete_and_advance(
        &self,
        project_id: &str,
        role: Role,
        phase: &str,
    ) -> Result<Option<StatusRecord>, EngineError> {
        let Some(mut record) = self.store.read(project_id)? else {
            return Ok(None);
        };
        let current = record.current();
        if current.as_ref().map(|(r, p)| (*r, p.as_str())) != Some((role, phase)) {
            tracing::debug!(
                project = project_id,
                requested = %catalog::phase_key(role, phase),
                recorded = %record.current_phase_key,
                "dropping stale transition request"
            );
            return Ok(Some(record));
        }
        // The recorded position always names a catalog phase; anything
        // else means a hand-edited record, which we refuse to advance.
        if catalog::phase_index(role, phase).is_none() {
            return Ok(Some(record));
        }

        let now = Utc::now();
        let pr = record.phase_record_mut(role, phase);
        pr.status = PhaseStatus::Complete;
        pr.completed_at = Some(now);

        if catalog::is_last_phase(role, phase) {
            if let Some(rs) = record.roles.get_mut(&role) {
                rs.status = RoleState::Complete;
                rs.completed_at = Some(now);
            }
            match role.next() {
                Some(next) => {
                    let first = catalog::first_phase(next);
                    record.set_current(next, first);
                    *record.phase_record_mut(next, first) = PhaseRecord::default();
                }
                None => record.set_terminal(),
            }
        } else if let Some(next) = catalog::next_phase(role, phase) {
            if let Some(rs) = record.roles.get_mut(&role) {
                if rs.status == RoleState::NotStarted {
                    rs.status = RoleState::InProgress;
                }
            }
            record.set_current(role, next);
        }

        tracing::info!(
            project = project_id,
            completed = %catalog::phase_key(role, phase),
            now_at = %record.current_phase_key,
            "phase complete"
        );
        self.store.write(project_id, &mut record)?;
        Ok(Some(record))
    }

    /// React to the assistant finishing its work on the current phase.
    /// The mapping is static, keyed by the phase-name suffix:
    /// `-generate` hands the document to the user for review,
    /// `-answer` completes and advances directly. `-review` phases are
    /// user-driven and ignore this signal.
    pub fn mark_ai_work_complete(
        &self,
        project_id: &str,
    ) -> Result<Option<StatusRecord>, EngineError> {
        let Some(mut record) = self.store.read(project_id)? else {
            return Ok(None);
        };
        let Some((role, phase)) = record.current() else {
            return Ok(Some(record));
        };

        match catalog::phase_kind(&phase) {
            PhaseKind::Generate => {
                let pr = record.phase_record_mut(role, &phase);
                if pr.status != PhaseStatus::AiWorking {
                    return Ok(Some(record));
                }
                pr.status = PhaseStatus::UserReviewing;
                tracing::info!(
                    project = project_id,
                    phase = %catalog::phase_key(role, &phase),
                    "artifact ready for user review"
                );
                self.store.write(project_id, &mut record)?;
                Ok(Some(record))
            }
            PhaseKind::Answer => self.complete_and_advance(project_id, role, &phase),
            PhaseKind::Review => Ok(Some(record)),
        }
    }

    /// Reset a phase stuck in ai-working so it can be retried. Fires
    /// only when the phase has been working longer than the configured
    /// staleness window and its artifacts still classify incomplete;
    /// earlier completed phases are never touched.
    pub fn recover_stale_phase(
        &self,
        project_id: &str,
    ) -> Result<Option<StatusRecord>, EngineError> {
        let Some(mut record) = self.store.read(project_id)? else {
            return Ok(None);
        };
        let Some((role, phase)) = record.current() else {
            return Ok(Some(record));
        };

        let stale_after = self.config.stale_after;
        let pr = record.phase_record_mut(role, &phase);
        if pr.status != PhaseStatus::AiWorking {
            return Ok(Some(record));
        }

        let stale = match pr.started_at {
            Some(started) => {
                let elapsed = Utc::now()
                    .signed_duration_since(started)
                    .to_std()
                    .unwrap_or_default();
                elapsed >= stale_after
            }
            // No start stamp to measure from: treat as stale.
            None => true,
        };
        if !stale {
            return Ok(Some(record));
        }

        let project_dir = self.project_dir(project_id);
        if artifacts::phase_artifacts_satisfied(role, &phase, &project_dir) {
            // Work actually landed; leave it for the retroactive check.
            return Ok(Some(record));
        }

        let pr = record.phase_record_mut(role, &phase);
        pr.status = PhaseStatus::NotStarted;
        pr.started_at = None;

        tracing::warn!(
            project = project_id,
            phase = %catalog::phase_key(role, &phase),
            "stale ai-working phase reset for retry"
        );
        self.store.write(project_id, &mut record)?;
        Ok(Some(record))
    }
}
