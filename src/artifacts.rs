//! Declarative artifact map.
//!
//! One table maps every artifact file the assistant produces to the
//! (role, phase) it satisfies, the classifier that judges it, and its
//! minimum byte floor. Both the completion-signal dispatcher and the
//! reconciliation rules consult this table, so the knowledge of "this
//! filename in this directory means this phase" lives in exactly one
//! place.

use std::path::{Path, PathBuf};

use crate::catalog::Role;
use crate::validators::{
    Classification, classify_json_artifact, classify_markdown, classify_question_answers,
    classify_question_set, meets_minimum_size,
};

/// Which classifier judges an artifact's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    Markdown,
    QuestionSet,
    QuestionAnswers,
    Json,
}

impl ClassifierKind {
    pub fn classify(self, content: &str) -> Classification {
        match self {
            ClassifierKind::Markdown => classify_markdown(content),
            ClassifierKind::QuestionSet => classify_question_set(content),
            ClassifierKind::QuestionAnswers => classify_question_answers(content),
            ClassifierKind::Json => classify_json_artifact(content),
        }
    }
}

/// One expected artifact: a file in a role's output directory that,
/// once complete, satisfies (part of) a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub file_name: &'static str,
    pub role: Role,
    pub phase: &'static str,
    pub kind: ClassifierKind,
    pub min_bytes: u64,
}

/// Byte floor for markdown documents.
pub const MARKDOWN_MIN_BYTES: u64 = 100;
/// Byte floor for JSON artifacts (question sets and document exports).
pub const JSON_MIN_BYTES: u64 = 20;

/// The full artifact table, in catalog order.
///
/// Each `-generate` document phase requires two co-located artifacts
/// (the markdown document and its structured JSON export); both must
/// independently classify as complete. The questions file appears
/// twice per role: once as a question set for `questions-generate`,
/// once as an answered set for `questions-answer`.
pub static ARTIFACT_MAP: &[ArtifactSpec] = &[
    // product
    ArtifactSpec {
        file_name: "questions.json",
        role: Role::Product,
        phase: "questions-generate",
        kind: ClassifierKind::QuestionSet,
        min_bytes: JSON_MIN_BYTES,
    },
    ArtifactSpec {
        file_name: "questions.json",
        role: Role::Product,
        phase: "questions-answer",
        kind: ClassifierKind::QuestionAnswers,
        min_bytes: JSON_MIN_BYTES,
    },
    ArtifactSpec {
        file_name: "prd.md",
        role: Role::Product,
        phase: "prd-generate",
        kind: ClassifierKind::Markdown,
        min_bytes: MARKDOWN_MIN_BYTES,
    },
    ArtifactSpec {
        file_name: "prd.json",
        role: Role::Product,
        phase: "prd-generate",
        kind: ClassifierKind::Json,
        min_bytes: JSON_MIN_BYTES,
    },
    // design
    ArtifactSpec {
        file_name: "questions.json",
        role: Role::Design,
        phase: "questions-generate",
        kind: ClassifierKind::QuestionSet,
        min_bytes: JSON_MIN_BYTES,
    },
    ArtifactSpec {
        file_name: "questions.json",
        role: Role::Design,
        phase: "questions-answer",
        kind: ClassifierKind::QuestionAnswers,
        min_bytes: JSON_MIN_BYTES,
    },
    ArtifactSpec {
        file_name: "design.md",
        role: Role::Design,
        phase: "design-generate",
        kind: ClassifierKind::Markdown,
        min_bytes: MARKDOWN_MIN_BYTES,
    },
    ArtifactSpec {
        file_name: "design.json",
        role: Role::Design,
        phase: "design-generate",
        kind: ClassifierKind::Json,
        min_bytes: JSON_MIN_BYTES,
    },
    // engineering
    ArtifactSpec {
        file_name: "questions.json",
        role: Role::Engineering,
        phase: "questions-generate",
        kind: ClassifierKind::QuestionSet,
        min_bytes: JSON_MIN_BYTES,
    },
    ArtifactSpec {
        file_name: "questions.json",
        role: Role::Engineering,
        phase: "questions-answer",
        kind: ClassifierKind::QuestionAnswers,
        min_bytes: JSON_MIN_BYTES,
    },
    ArtifactSpec {
        file_name: "plan.md",
        role: Role::Engineering,
        phase: "plan-generate",
        kind: ClassifierKind::Markdown,
        min_bytes: MARKDOWN_MIN_BYTES,
    },
    ArtifactSpec {
        file_name: "plan.json",
        role: Role::Engineering,
        phase: "plan-generate",
        kind: ClassifierKind::Json,
        min_bytes: JSON_MIN_BYTES,
    },
];

impl ArtifactSpec {
    /// Absolute path of this artifact inside a project directory.
    pub fn path_in(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(self.role.as_str()).join(self.file_name)
    }

    /// Whether the artifact on disk exists, meets its byte floor, and
    /// classifies as complete. Any read failure counts as incomplete.
    pub fn is_satisfied(&self, project_dir: &Path) -> bool {
        let path = self.path_in(project_dir);
        if !meets_minimum_size(&path, self.min_bytes) {
            return false;
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => self.kind.classify(&content).is_complete(),
            Err(_) => false,
        }
    }
}

/// All table rows matching a file name in a role output directory.
/// `parent_dir` is the immediate directory name (`product`, `design`,
/// `engineering`); files elsewhere match nothing.
pub fn lookup(file_name: &str, parent_dir: &str) -> Vec<&'static ArtifactSpec> {
    ARTIFACT_MAP
        .iter()
        .filter(|s| s.file_name == file_name && s.role.as_str() == parent_dir)
        .collect()
}

/// All artifacts a phase requires. Empty for user-driven phases
/// (`-review`) that produce nothing.
pub fn phase_artifacts(role: Role, phase: &str) -> Vec<&'static ArtifactSpec> {
    ARTIFACT_MAP
        .iter()
        .filter(|s| s.role == role && s.phase == phase)
        .collect()
}

/// Whether every artifact the phase requires is satisfied on disk.
/// A phase with no mapped artifacts reports `false`; nothing on disk
/// can prove it done.
pub fn phase_artifacts_satisfied(role: Role, phase: &str, project_dir: &Path) -> bool {
    let specs = phase_artifacts(role, phase);
    !specs.is_empty() && specs.iter().all(|s| s.is_satisfied(project_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_lookup_by_name_and_directory() {
        let rows = lookup("prd.md", "product");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].phase, "prd-generate");
        assert_eq!(rows[0].kind, ClassifierKind::Markdown);

        // Same file name outside a role directory matches nothing.
        assert!(lookup("prd.md", "design").is_empty());
        assert!(lookup("prd.md", "notes").is_empty());
    }

    #[test]
    fn test_questions_file_maps_to_two_phases() {
        let rows = lookup("questions.json", "design");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].phase, "questions-generate");
        assert_eq!(rows[1].phase, "questions-answer");
    }

    #[test]
    fn test_document_phase_requires_both_artifacts() {
        let specs = phase_artifacts(Role::Engineering, "plan-generate");
        let names: Vec<&str> = specs.iter().map(|s| s.file_name).collect();
        assert_eq!(names, vec!["plan.md", "plan.json"]);
    }

    #[test]
    fn test_review_phases_have_no_artifacts() {
        assert!(phase_artifacts(Role::Product, "prd-review").is_empty());
    }

    #[test]
    fn test_every_mapped_phase_exists_in_catalog() {
        use crate::catalog::phase_index;
        for spec in ARTIFACT_MAP {
            assert!(
                phase_index(spec.role, spec.phase).is_some(),
                "{}:{} not in catalog",
                spec.role,
                spec.phase
            );
        }
    }

    #[test]
    fn test_is_satisfied_checks_floor_and_content() {
        let dir = tempdir().unwrap();
        let spec = lookup("prd.md", "product")[0];
        let path = spec.path_in(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();

        // Missing file.
        assert!(!spec.is_satisfied(dir.path()));

        // Clean but under the floor.
        fs::write(&path, "# PRD\nshort\n").unwrap();
        assert!(!spec.is_satisfied(dir.path()));

        // Over the floor but still placeholder.
        fs::write(
            &path,
            format!("# PRD for [PRODUCT NAME]\n\n{}\n", "filler ".repeat(30)),
        )
        .unwrap();
        assert!(!spec.is_satisfied(dir.path()));

        // Real content over the floor.
        fs::write(
            &path,
            format!("# PRD\n\n{}\n", "The checkout flow gets a redesign. ".repeat(10)),
        )
        .unwrap();
        assert!(spec.is_satisfied(dir.path()));
    }

    #[test]
    fn test_phase_artifacts_satisfied_needs_all() {
        let dir = tempdir().unwrap();
        let role_dir = dir.path().join("product");
        fs::create_dir_all(&role_dir).unwrap();

        let body = format!("# PRD\n\n{}\n", "Real requirements prose here. ".repeat(10));
        fs::write(role_dir.join("prd.md"), &body).unwrap();
        assert!(!phase_artifacts_satisfied(
            Role::Product,
            "prd-generate",
            dir.path()
        ));

        fs::write(
            role_dir.join("prd.json"),
            r#"{"title": "Checkout revamp", "sections": ["goals"]}"#,
        )
        .unwrap();
        assert!(phase_artifacts_satisfied(
            Role::Product,
            "prd-generate",
            dir.path()
        ));
    }

    #[test]
    fn test_phase_without_artifacts_is_never_satisfied() {
        let dir = tempdir().unwrap();
        assert!(!phase_artifacts_satisfied(
            Role::Product,
            "prd-review",
            dir.path()
        ));
    }
}
