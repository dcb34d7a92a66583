// crates/resource-gate-catalog/tests/proptest_operators.rs
// ============================================================================
// Module: Operator Allow-List Property Tests
// Description: Property tests for per-family operator sets.
// Purpose: Ensure each alert family accepts exactly its own operators.
// ============================================================================

//! Property-based tests for alert operator allow-lists.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use proptest::prelude::*;
use resource_gate_catalog::AlertFamily;
use resource_gate_catalog::alert::CHANGE_OPERATORS;
use resource_gate_catalog::alert::THRESHOLD_OPERATORS;
use resource_gate_core::ViolationKind;
use serde_json::json;

fn operator_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(THRESHOLD_OPERATORS.to_vec()).prop_map(str::to_string),
        prop::sample::select(CHANGE_OPERATORS.to_vec()).prop_map(str::to_string),
        "[a-z_]{1,24}",
    ]
}

proptest! {
    #[test]
    fn each_family_accepts_only_its_operators(operator in operator_strategy()) {
        for family in [AlertFamily::Threshold, AlertFamily::Change] {
            let mut alert = common::threshold_alert();
            alert["conditional"]["expressions"][0]["operator"] = json!(operator);
            let report = common::create(family.resource_name(), alert).unwrap();
            let allowed = family.operators().contains(&operator.as_str());
            prop_assert_eq!(report.is_valid(), allowed);
            if !allowed {
                prop_assert_eq!(report.diagnostics.len(), 1);
                let violation = &report.diagnostics.as_slice()[0];
                prop_assert_eq!(violation.kind, ViolationKind::EnumValueInvalid);
                for name in family.operators() {
                    prop_assert!(violation.message.contains(name));
                }
            }
        }
    }

    #[test]
    fn every_violation_of_a_broken_alert_is_reported_once(
        drop_name in any::<bool>(),
        bad_window in any::<bool>(),
        slack_auth in any::<bool>(),
    ) {
        let mut alert = common::threshold_alert();
        if drop_name {
            alert.as_object_mut().unwrap().remove("name");
        }
        if bad_window {
            alert["window_duration_minutes"] = json!(0);
        }
        if slack_auth {
            alert["alert_payload"]["service"]["auth"] = json!({"strategy": "none"});
        }
        let report = common::create("threshold_alert", alert).unwrap();
        let expected = usize::from(drop_name) + usize::from(bad_window) + usize::from(slack_auth);
        prop_assert_eq!(report.diagnostics.len(), expected);
    }
}
