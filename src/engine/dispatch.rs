//! Completion-signal dispatch.
//!
//! Turns debounced file-change notifications into phase completions.
//! The artifact map decides what a changed file means; the current
//! position decides whether it means anything right now. Out-of-turn
//! writes are not signals, and content that fails its byte floor or
//! classifier leaves state untouched until the next event.

use std::path::Path;

use crate::artifacts;
use crate::catalog::{self, PhaseKind};
use crate::errors::EngineError;
use crate::status::{PhaseStatus, StatusRecord};

use super::Engine;

impl Engine {
    /// Handle one changed-file notification. Returns the updated
    /// record when the event completed a phase, `None` when the event
    /// was ignored for any reason.
    pub fn handle_file_event(&self, path: &Path) -> Result<Option<StatusRecord>, EngineError> {
        let Some((project_id, role_dir, file_name)) = self.split_artifact_path(path) else {
            return Ok(None);
        };
        let Some(record) = self.store.read(&project_id)? else {
            return Ok(None);
        };
        let Some((role, phase)) = record.current() else {
            return Ok(None);
        };

        let rows = artifacts::lookup(&file_name, &role_dir);
        if rows.is_empty() {
            return Ok(None);
        }
        if !rows.iter().any(|s| s.role == role && s.phase == phase) {
            tracing::debug!(
                project = %project_id,
                file = %file_name,
                current = %record.current_phase_key,
                "ignoring out-of-turn artifact write"
            );
            return Ok(None);
        }

        // Byte floors and classifiers, including any co-located
        // artifact the phase also requires.
        let project_dir = self.project_dir(&project_id);
        if !artifacts::phase_artifacts_satisfied(role, &phase, &project_dir) {
            tracing::debug!(
                project = %project_id,
                file = %file_name,
                "artifact not yet complete; waiting for the next event"
            );
            return Ok(None);
        }

        tracing::info!(
            project = %project_id,
            phase = %catalog::phase_key(role, &phase),
            "accepted completion signal"
        );
        self.mark_ai_work_complete(&project_id)
    }

    /// Opportunistic completion check, run before status is handed to
    /// a caller: if a `-generate` phase is still ai-working but its
    /// artifacts already classify complete, land the completion now
    /// instead of waiting for a filesystem event nobody may be
    /// watching for.
    pub(crate) fn retroactive_check(
        &self,
        project_id: &str,
        record: &StatusRecord,
    ) -> Result<Option<StatusRecord>, EngineError> {
        let Some((role, phase)) = record.current() else {
            return Ok(None);
        };
        if catalog::phase_kind(&phase) != PhaseKind::Generate {
            return Ok(None);
        }
        let working = record
            .phase_record(role, &phase)
            .is_some_and(|pr| pr.status == PhaseStatus::AiWorking);
        if !working {
            return Ok(None);
        }
        if !artifacts::phase_artifacts_satisfied(role, &phase, &self.project_dir(project_id)) {
            return Ok(None);
        }
        tracing::info!(
            project = %project_id,
            phase = %catalog::phase_key(role, &phase),
            "retroactive check found completed artifacts"
        );
        self.mark_ai_work_complete(project_id)
    }

    /// Split an event path into (project id, role directory, file
    /// name). Only paths exactly two levels below a project folder
    /// inside the projects root qualify; everything else is outside
    /// the output tree.
    fn split_artifact_path(&self, path: &Path) -> Option<(String, String, String)> {
        let rel = path.strip_prefix(&self.config.projects_root).ok()?;
        let mut parts = rel.components().map(|c| c.as_os_str().to_str());
        let project_id = parts.next()??.to_string();
        let role_dir = parts.next()??.to_string();
        let file_name = parts.next()??.to_string();
        if parts.next().is_some() {
            return None;
        }
        Some((project_id, role_dir, file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Role;
    use crate::config::Config;
    use crate::status::StatusRecord;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn make_engine() -> (Engine, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path().to_path_buf()).unwrap();
        (Engine::new(config), dir)
    }

    fn seed_working(engine: &Engine, project: &str, role: Role, phase: &str) {
        let mut record = StatusRecord::new();
        record.set_current(role, phase);
        engine.store.write(project, &mut record).unwrap();
        engine.start_work(project).unwrap();
    }

    fn questions_path(engine: &Engine, project: &str, role: Role) -> PathBuf {
        let dir = engine.project_dir(project).join(role.as_str());
        fs::create_dir_all(&dir).unwrap();
        dir.join("questions.json")
    }

    const TWO_REAL_QUESTIONS: &str = r#"[
        {"question": "Waiting for the reviewer to generate questions…", "answer": ""},
        {"question": "What does success look like at launch?", "answer": ""}
    ]"#;

    #[test]
    fn test_scenario_c_questions_event_accepted() {
        let (engine, _dir) = make_engine();
        seed_working(&engine, "proj", Role::Product, "questions-generate");

        let path = questions_path(&engine, "proj", Role::Product);
        fs::write(&path, TWO_REAL_QUESTIONS).unwrap();

        let updated = engine.handle_file_event(&path).unwrap().unwrap();
        assert_eq!(
            updated
                .phase_record(Role::Product, "questions-generate")
                .unwrap()
                .status,
            PhaseStatus::UserReviewing
        );
    }

    #[test]
    fn test_event_outside_output_tree_ignored() {
        let (engine, _dir) = make_engine();
        seed_working(&engine, "proj", Role::Product, "questions-generate");

        // Too shallow, too deep, and outside the root entirely.
        assert!(engine
            .handle_file_event(&engine.project_dir("proj").join("readme.md"))
            .unwrap()
            .is_none());
        assert!(engine
            .handle_file_event(
                &engine.project_dir("proj").join("product/drafts/questions.json")
            )
            .unwrap()
            .is_none());
        assert!(engine
            .handle_file_event(Path::new("/tmp/elsewhere/questions.json"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_event_for_unknown_project_ignored() {
        let (engine, _dir) = make_engine();
        let path = engine.project_dir("ghost").join("product/questions.json");
        assert!(engine.handle_file_event(&path).unwrap().is_none());
    }

    #[test]
    fn test_event_for_unmapped_file_ignored() {
        let (engine, _dir) = make_engine();
        seed_working(&engine, "proj", Role::Product, "questions-generate");
        let dir = engine.project_dir("proj").join("product");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("scratch.txt");
        fs::write(&path, "notes").unwrap();
        assert!(engine.handle_file_event(&path).unwrap().is_none());
    }

    #[test]
    fn test_out_of_turn_write_is_not_a_signal() {
        let (engine, _dir) = make_engine();
        // Current phase is the product questions; a design questions
        // write must not advance anything.
        seed_working(&engine, "proj", Role::Product, "questions-generate");

        let path = questions_path(&engine, "proj", Role::Design);
        fs::write(&path, TWO_REAL_QUESTIONS).unwrap();
        assert!(engine.handle_file_event(&path).unwrap().is_none());
    }

    #[test]
    fn test_incomplete_content_leaves_state_unchanged() {
        let (engine, _dir) = make_engine();
        seed_working(&engine, "proj", Role::Product, "questions-generate");

        let path = questions_path(&engine, "proj", Role::Product);
        fs::write(
            &path,
            r#"[{"question": "Waiting for the reviewer to generate questions…", "answer": ""}]"#,
        )
        .unwrap();

        assert!(engine.handle_file_event(&path).unwrap().is_none());
        let record = engine.store.read("proj").unwrap().unwrap();
        assert_eq!(
            record
                .phase_record(Role::Product, "questions-generate")
                .unwrap()
                .status,
            PhaseStatus::AiWorking
        );
    }

    #[test]
    fn test_undersized_content_rejected() {
        let (engine, _dir) = make_engine();
        seed_working(&engine, "proj", Role::Product, "questions-generate");
        let path = questions_path(&engine, "proj", Role::Product);
        // Valid but under the byte floor: a partial write guard.
        fs::write(&path, "[]").unwrap();
        assert!(engine.handle_file_event(&path).unwrap().is_none());
    }

    #[test]
    fn test_document_event_requires_companion() {
        let (engine, _dir) = make_engine();
        seed_working(&engine, "proj", Role::Product, "prd-generate");

        let dir = engine.project_dir("proj").join("product");
        fs::create_dir_all(&dir).unwrap();
        let md = dir.join("prd.md");
        fs::write(
            &md,
            format!("# PRD\n\n{}\n", "Everything is written down. ".repeat(10)),
        )
        .unwrap();

        // Markdown alone is not enough.
        assert!(engine.handle_file_event(&md).unwrap().is_none());

        fs::write(
            dir.join("prd.json"),
            r#"{"title": "Checkout revamp", "sections": ["goals"]}"#,
        )
        .unwrap();
        let updated = engine.handle_file_event(&md).unwrap().unwrap();
        assert_eq!(
            updated
                .phase_record(Role::Product, "prd-generate")
                .unwrap()
                .status,
            PhaseStatus::UserReviewing
        );
    }

    #[test]
    fn test_terminal_project_ignores_events() {
        let (engine, _dir) = make_engine();
        let mut record = StatusRecord::new();
        record.set_terminal();
        engine.store.write("proj", &mut record).unwrap();

        let path = questions_path(&engine, "proj", Role::Product);
        fs::write(&path, TWO_REAL_QUESTIONS).unwrap();
        assert!(engine.handle_file_event(&path).unwrap().is_none());
    }

    #[test]
    fn test_retroactive_check_lands_missed_completion() {
        let (engine, _dir) = make_engine();
        seed_working(&engine, "proj", Role::Product, "questions-generate");

        // The artifact appeared while nothing was watching.
        let path = questions_path(&engine, "proj", Role::Product);
        fs::write(&path, TWO_REAL_QUESTIONS).unwrap();

        let record = engine.get_reconciled("proj").unwrap().unwrap();
        assert_eq!(
            record
                .phase_record(Role::Product, "questions-generate")
                .unwrap()
                .status,
            PhaseStatus::UserReviewing
        );
    }

    #[test]
    fn test_retroactive_check_skips_user_phases() {
        let (engine, _dir) = make_engine();
        let mut record = StatusRecord::new();
        record.set_current(Role::Product, "prd-review");
        engine.store.write("proj", &mut record).unwrap();

        let record = engine.get_reconciled("proj").unwrap().unwrap();
        assert_eq!(record.current_phase_key, "product:prd-review");
    }
}
