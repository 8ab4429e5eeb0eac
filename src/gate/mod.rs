//! Pre-execution policy gate.
//!
//! The server reports governance findings (lint-rule violations with a
//! severity, unauthorized resource access, mandatory approvals) alongside
//! every submission. This module reduces those findings to a tri-state
//! decision: allow, require approval, or block.

mod reducer;

pub use reducer::decide;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a governance-rule violation.
///
/// The numeric values match the wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Severity {
    /// Purely informational; never affects the decision on its own.
    Informational = 0,
    /// Advisory; execution may proceed after an approval workflow.
    Advisory = 1,
    /// Mandatory rule; execution is blocked outright.
    Mandatory = 2,
}

impl TryFrom<u8> for Severity {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Informational),
            1 => Ok(Self::Advisory),
            2 => Ok(Self::Mandatory),
            other => Err(format!("unknown violation severity: {other}")),
        }
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> u8 {
        severity as u8
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Informational => write!(f, "Informational"),
            Self::Advisory => write!(f, "Advisory"),
            Self::Mandatory => write!(f, "Mandatory"),
        }
    }
}

/// A single governance-rule breach reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Name of the violated rule.
    pub rule: String,
    /// How severe the breach is.
    pub severity: Severity,
    /// Human-readable description of the breach.
    #[serde(default)]
    pub text: String,
    /// Character offset of the breach within the statement.
    #[serde(default)]
    pub offset: u32,
}

impl Violation {
    /// Creates a violation for the given rule and severity with no text.
    pub fn new(rule: impl Into<String>, severity: Severity) -> Self {
        Self {
            rule: rule.into(),
            severity,
            text: String::new(),
            offset: 0,
        }
    }
}

/// A database resource the current principal is not authorized to touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    /// Database the resource belongs to.
    pub database: String,
    /// Object within the database, when the finding is object-scoped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
}

/// The violations attached to one submitted statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintResult {
    /// The statement text the violations refer to.
    pub sql: String,
    /// All violations reported for that statement.
    pub violations: Vec<Violation>,
}

/// Tri-state outcome of the policy gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateStatus {
    /// Execution may proceed immediately.
    Allowed,
    /// Execution requires an out-of-band approval workflow first.
    ApprovalRequired,
    /// Execution must not proceed, even partially.
    Blocked,
}

impl GateStatus {
    /// Returns true if execution may start without further interaction.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Returns true if execution must not proceed.
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked)
    }
}

impl fmt::Display for GateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allowed => write!(f, "Allowed"),
            Self::ApprovalRequired => write!(f, "Approval Required"),
            Self::Blocked => write!(f, "Blocked"),
        }
    }
}

/// The gate's decision for one submission.
///
/// Derived deterministically from an [`crate::submit::ExecutionTicket`] by
/// [`decide`]; never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDecision {
    /// The computed tri-state outcome.
    pub status: GateStatus,
    /// One entry per statement group that had at least one violation.
    pub lint_results: Vec<LintResult>,
    /// Resources the principal may not access, when that caused a block.
    pub unauthorized_resources: Vec<ResourceRef>,
    /// Server-side refusal message, when the submission was never queued.
    pub error_message: Option<String>,
}
