//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::validate::*;
use chrono::{DateTime, FixedOffset, TimeZone};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_choices() -> Choices {
    Choices::new(
        vec!["Food".to_string(), "Rent".to_string(), "Fun".to_string()],
        vec!["Cash".to_string(), "Card".to_string()],
    )
}

fn started() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(7200)
        .unwrap()
        .with_ymd_and_hms(2024, 6, 1, 8, 30, 0)
        .unwrap()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

/// Letters and spaces without 'e'/'E', so scientific notation can't sneak in
fn arb_non_numeric() -> impl Strategy<Value = String> {
    "[a-df-zA-DF-Z ]{0,16}"
}

fn arb_amount_text() -> impl Strategy<Value = String> {
    (-1_000_000i64..1_000_000, 0i64..4).prop_map(|(units, scale)| {
        bigdecimal::BigDecimal::new(units.into(), scale).to_string()
    })
}

fn arb_label() -> impl Strategy<Value = String> {
    "[A-Za-z]{1,8}"
}

fn arb_draft() -> impl Strategy<Value = Draft> {
    let stage = prop_oneof![
        Just(Stage::AwaitingAmount),
        arb_amount_text().prop_map(|a| Stage::AwaitingDescription {
            amount: a.parse().unwrap()
        }),
        (arb_amount_text(), "[a-z]{1,10}").prop_map(|(a, description)| {
            Stage::AwaitingCategory {
                amount: a.parse().unwrap(),
                description,
            }
        }),
        (arb_amount_text(), "[a-z]{1,10}").prop_map(|(a, description)| {
            Stage::AwaitingSource {
                amount: a.parse().unwrap(),
                description,
                category: "Food".to_string(),
            }
        }),
    ];
    (1i64..1000, stage).prop_map(|(id, stage)| Draft {
        user_id: UserId(id),
        started_at: started(),
        stage,
    })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Non-numeric text never parses and never leaves the amount stage
    #[test]
    fn prop_non_numeric_amount_reprompts(text in arb_non_numeric()) {
        prop_assert!(validate_amount(&text).is_err());

        let (draft, _) = start(UserId(1), started());
        let result = transition(&draft, &test_choices(), &text);
        prop_assert!(
            matches!(
                result,
                Transition::Reprompt { error: ValidationError::MalformedAmount { .. }, .. }
            ),
            "unexpected {:?}", result
        );
    }

    // Any rendered decimal is accepted and stored unchanged
    #[test]
    fn prop_decimal_amount_advances(text in arb_amount_text()) {
        let (draft, _) = start(UserId(1), started());
        match transition(&draft, &test_choices(), &text) {
            Transition::Advance { draft, .. } => {
                let expected: bigdecimal::BigDecimal = text.parse().unwrap();
                prop_assert_eq!(draft.amount(), Some(&expected));
            }
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }

    // A label outside the configured categories never sets a category
    #[test]
    fn prop_unknown_category_leaves_stage(label in arb_label()) {
        let choices = test_choices();
        prop_assume!(!choices.categories.contains(&label));

        let draft = Draft::new(UserId(3), started()).advance(Stage::AwaitingCategory {
            amount: bigdecimal::BigDecimal::from(10),
            description: "d".to_string(),
        });
        match transition(&draft, &choices, &label) {
            Transition::Reprompt { error, reply } => {
                prop_assert_eq!(error, ValidationError::InvalidChoice { input: label });
                prop_assert_eq!(reply.choices(), choices.categories.as_slice());
            }
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }

    // Transitions never change who owns the draft or when it started
    #[test]
    fn prop_identity_is_preserved(draft in arb_draft(), input in "[A-Za-z0-9 .]{0,12}") {
        match transition(&draft, &test_choices(), &input) {
            Transition::Advance { draft: next, .. } => {
                prop_assert_eq!(next.user_id, draft.user_id);
                prop_assert_eq!(next.started_at, draft.started_at);
            }
            Transition::Complete(tx) => {
                prop_assert_eq!(tx.user_id, draft.user_id);
                prop_assert_eq!(tx.started_at, draft.started_at);
            }
            Transition::Reprompt { .. } => {}
        }
    }

    // Only the source stage can complete, and only with a configured source
    #[test]
    fn prop_complete_only_from_source(draft in arb_draft(), input in "[A-Za-z0-9 .]{0,12}") {
        let choices = test_choices();
        if let Transition::Complete(tx) = transition(&draft, &choices, &input) {
            prop_assert!(
                matches!(draft.stage, Stage::AwaitingSource { .. }),
                "completed from {:?}", draft.stage
            );
            prop_assert!(choices.sources.contains(&tx.source));
        }
    }

    // Choice validation is exact membership
    #[test]
    fn prop_choice_iff_member(
        text in arb_label(),
        allowed in proptest::collection::vec(arb_label(), 0..5)
    ) {
        let ok = validate_choice(&text, &allowed).is_ok();
        prop_assert_eq!(ok, allowed.contains(&text));
    }
}
