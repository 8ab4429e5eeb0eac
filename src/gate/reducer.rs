//! The severity-reduction rule behind the policy gate.

use super::{GateStatus, LintResult, PolicyDecision, Severity};
use crate::submit::ExecutionTicket;

/// Reduces a ticket's governance findings to a tri-state decision.
///
/// The reduction is a strict function of the ticket: calling it twice with
/// an identical ticket yields identical decisions, so it can be re-derived
/// at any time.
///
/// Rules, in order:
/// 1. An absent request id (the server refused to queue) blocks, carrying
///    the server's error message.
/// 2. Unauthorized resources block unless the caller opted into resolving
///    unauthorized access interactively.
/// 3. Any mandatory violation blocks.
/// 4. A non-empty violation set that is purely informational allows; a mix
///    of informational and advisory requires approval.
/// 5. An empty violation set allows, unless the server flagged the
///    submission as requiring approval.
pub fn decide(ticket: &ExecutionTicket, resolve_unauthorized: bool) -> PolicyDecision {
    let lint_results = collect_lint_results(ticket);

    if ticket.request_id.is_none() {
        return PolicyDecision {
            status: GateStatus::Blocked,
            lint_results,
            unauthorized_resources: ticket.unauthorized_resources.clone(),
            error_message: ticket.error_message.clone(),
        };
    }

    if !ticket.unauthorized_resources.is_empty() && !resolve_unauthorized {
        return PolicyDecision {
            status: GateStatus::Blocked,
            lint_results,
            unauthorized_resources: ticket.unauthorized_resources.clone(),
            error_message: ticket.error_message.clone(),
        };
    }

    let status = match max_severity(&lint_results) {
        Some(Severity::Mandatory) => GateStatus::Blocked,
        Some(Severity::Advisory) => GateStatus::ApprovalRequired,
        Some(Severity::Informational) | None => {
            if ticket.approval_required {
                GateStatus::ApprovalRequired
            } else {
                GateStatus::Allowed
            }
        }
    };

    PolicyDecision {
        status,
        lint_results,
        unauthorized_resources: Vec::new(),
        error_message: ticket.error_message.clone(),
    }
}

/// Flattens root violations and per-statement violations into one ordered
/// list of violation groups, keeping only groups that have violations.
///
/// Root violations are not tied to a specific queued statement and form the
/// first group, keyed to an empty statement text.
fn collect_lint_results(ticket: &ExecutionTicket) -> Vec<LintResult> {
    let mut lint_results = Vec::new();

    if !ticket.root_violations.is_empty() {
        lint_results.push(LintResult {
            sql: String::new(),
            violations: ticket.root_violations.clone(),
        });
    }

    for statement in &ticket.statements {
        if !statement.violated_rules.is_empty() {
            lint_results.push(LintResult {
                sql: statement.original_sql.clone(),
                violations: statement.violated_rules.clone(),
            });
        }
    }

    lint_results
}

fn max_severity(lint_results: &[LintResult]) -> Option<Severity> {
    lint_results
        .iter()
        .flat_map(|group| group.violations.iter())
        .map(|violation| violation.severity)
        .max()
}
