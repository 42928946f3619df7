//! Role and phase catalog for the specloom workflow.
//!
//! This module provides:
//! - `Role` enum for the three sequential specification-writing roles
//! - Static ordered phase lists per role
//! - Order math used by the progression controller and reconciliation

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three sequential specification-writing roles.
///
/// Roles always complete in declaration order: product, then design,
/// then engineering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Product,
    Design,
    Engineering,
}

impl Role {
    /// All roles in workflow order.
    pub const ALL: [Role; 3] = [Role::Product, Role::Design, Role::Engineering];

    /// Zero-based position in the role sequence.
    pub fn index(self) -> usize {
        match self {
            Role::Product => 0,
            Role::Design => 1,
            Role::Engineering => 2,
        }
    }

    /// The role that follows this one, or `None` for the last role.
    pub fn next(self) -> Option<Role> {
        match self {
            Role::Product => Some(Role::Design),
            Role::Design => Some(Role::Engineering),
            Role::Engineering => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Product => "product",
            Role::Design => "design",
            Role::Engineering => "engineering",
        }
    }

    /// The document stem this role produces (`prd`, `design`, `plan`).
    pub fn document_stem(self) -> &'static str {
        match self {
            Role::Product => "prd",
            Role::Design => "design",
            Role::Engineering => "plan",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "product" => Some(Role::Product),
            "design" => Some(Role::Design),
            "engineering" => Some(Role::Engineering),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a phase is driven, derived from the phase-name suffix convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    /// `-generate`: the assistant writes an artifact, then the user reviews.
    Generate,
    /// `-answer`: the user supplies answers; completion advances directly.
    Answer,
    /// `-review`: the user signs off; no artifact event can complete it.
    Review,
}

/// Classify a phase name by its suffix.
pub fn phase_kind(phase: &str) -> PhaseKind {
    if phase.ends_with("-answer") {
        PhaseKind::Answer
    } else if phase.ends_with("-review") {
        PhaseKind::Review
    } else {
        PhaseKind::Generate
    }
}

/// The fixed ordered phase list for a role.
pub fn phases_for(role: Role) -> &'static [&'static str] {
    match role {
        Role::Product => &[
            "questions-generate",
            "questions-answer",
            "prd-generate",
            "prd-review",
        ],
        Role::Design => &[
            "questions-generate",
            "questions-answer",
            "design-generate",
            "design-review",
        ],
        Role::Engineering => &[
            "questions-generate",
            "questions-answer",
            "plan-generate",
            "plan-review",
        ],
    }
}

/// First phase of a role.
pub fn first_phase(role: Role) -> &'static str {
    phases_for(role)[0]
}

/// Zero-based position of a phase within its role's catalog.
pub fn phase_index(role: Role, phase: &str) -> Option<usize> {
    phases_for(role).iter().position(|p| *p == phase)
}

/// The phase after `phase` within the same role, or `None` if it is last
/// (or unknown).
pub fn next_phase(role: Role, phase: &str) -> Option<&'static str> {
    let idx = phase_index(role, phase)?;
    phases_for(role).get(idx + 1).copied()
}

pub fn is_last_phase(role: Role, phase: &str) -> bool {
    phase_index(role, phase) == Some(phases_for(role).len() - 1)
}

/// Global catalog position of (role, phase), comparable across roles.
pub fn catalog_position(role: Role, phase: &str) -> Option<(usize, usize)> {
    Some((role.index(), phase_index(role, phase)?))
}

/// The `role:phase` key recorded in a status record.
pub fn phase_key(role: Role, phase: &str) -> String {
    format!("{}:{}", role.as_str(), phase)
}
