//! Policy gate decision tests over generated violation sets.

use courier::gate::{self, GateStatus, ResourceRef, Severity, Violation};
use courier::remote::StatementDecomposition;
use courier::submit::ExecutionTicket;
use pretty_assertions::assert_eq;

fn ticket_from_severities(groups: &[&[Severity]]) -> ExecutionTicket {
    let statements = groups
        .iter()
        .enumerate()
        .map(|(i, severities)| StatementDecomposition {
            sql_id: format!("q{}", i + 1),
            original_sql: format!("SELECT {}", i + 1),
            executed_sql: format!("SELECT {}", i + 1),
            violated_rules: severities
                .iter()
                .map(|&severity| Violation::new("rule", severity))
                .collect(),
        })
        .collect();
    ExecutionTicket {
        request_id: Some("r1".to_string()),
        statements,
        root_violations: vec![],
        unauthorized_resources: vec![],
        error_message: None,
        approval_required: false,
    }
}

#[test]
fn any_mandatory_violation_blocks_regardless_of_the_rest() {
    let sets: &[&[&[Severity]]] = &[
        &[&[Severity::Mandatory]],
        &[&[Severity::Informational, Severity::Mandatory]],
        &[&[Severity::Advisory], &[Severity::Mandatory]],
        &[
            &[Severity::Informational],
            &[Severity::Advisory, Severity::Informational],
            &[Severity::Mandatory],
        ],
    ];
    for groups in sets {
        let decision = gate::decide(&ticket_from_severities(groups), false);
        assert_eq!(decision.status, GateStatus::Blocked, "groups: {groups:?}");
    }
}

#[test]
fn purely_informational_sets_are_allowed() {
    let sets: &[&[&[Severity]]] = &[
        &[&[Severity::Informational]],
        &[&[Severity::Informational, Severity::Informational]],
        &[&[Severity::Informational], &[Severity::Informational]],
    ];
    for groups in sets {
        let decision = gate::decide(&ticket_from_severities(groups), false);
        assert_eq!(decision.status, GateStatus::Allowed, "groups: {groups:?}");
    }
}

#[test]
fn mixed_sets_without_mandatory_require_approval() {
    let sets: &[&[&[Severity]]] = &[
        &[&[Severity::Advisory]],
        &[&[Severity::Informational, Severity::Advisory]],
        &[&[Severity::Informational], &[Severity::Advisory]],
    ];
    for groups in sets {
        let decision = gate::decide(&ticket_from_severities(groups), false);
        assert_eq!(
            decision.status,
            GateStatus::ApprovalRequired,
            "groups: {groups:?}"
        );
    }
}

#[test]
fn empty_violation_set_is_allowed() {
    let decision = gate::decide(&ticket_from_severities(&[&[]]), false);
    assert_eq!(decision.status, GateStatus::Allowed);
    assert!(decision.lint_results.is_empty());
}

#[test]
fn decisions_are_rederivable_from_the_same_ticket() {
    let ticket = ticket_from_severities(&[
        &[Severity::Informational],
        &[Severity::Advisory, Severity::Informational],
    ]);
    let decisions: Vec<_> = (0..5).map(|_| gate::decide(&ticket, false)).collect();
    for decision in &decisions[1..] {
        assert_eq!(decision, &decisions[0]);
    }
}

#[test]
fn unauthorized_resources_block_with_the_list_attached() {
    let mut ticket = ticket_from_severities(&[&[Severity::Informational]]);
    ticket.unauthorized_resources = vec![
        ResourceRef {
            database: "x".to_string(),
            object: None,
        },
        ResourceRef {
            database: "y".to_string(),
            object: Some("secrets".to_string()),
        },
    ];

    let decision = gate::decide(&ticket, false);
    assert_eq!(decision.status, GateStatus::Blocked);
    assert_eq!(decision.unauthorized_resources.len(), 2);
    assert_eq!(decision.unauthorized_resources[0].database, "x");
}
