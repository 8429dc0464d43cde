//! Property-based tests for the state machine
//!
//! Drives the pure transition function the same way the runtime does and
//! checks the fixed-iteration guarantees for arbitrary bounds and replies.

use super::*;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_record(max_refinements: u32, initial: Transcript) -> SessionRecord {
    SessionRecord::new(
        ValidatedInputs {
            topic: "topic".to_string(),
            methodology: "method".to_string(),
            journal_requirements: "journal".to_string(),
            max_refinements,
            model_selector: "test-model".to_string(),
            provider_selector: "mock".to_string(),
        },
        initial,
    )
}

/// Run the machine to completion feeding `replies` in order, recording the
/// visited stages and the refinement count seen after each step.
fn drive(mut record: SessionRecord, replies: &[String]) -> (SessionRecord, Vec<Stage>, Vec<u32>) {
    let mut stages = Vec::new();
    let mut counts = Vec::new();
    let mut next = Some(Stage::Generate);
    let mut replies = replies.iter().cycle();

    while let Some(stage) = next {
        stages.push(stage);
        let completion = replies.next().cloned().unwrap_or_default();
        let result = transition(
            record,
            StageOutcome {
                stage,
                summary: format!("{stage}"),
                completion,
            },
        );
        record = result.record;
        counts.push(record.refinement_count());
        next = result.next;
        assert!(stages.len() <= 64, "state machine did not terminate");
    }

    (record, stages, counts)
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_stage() -> impl Strategy<Value = Stage> {
    prop_oneof![
        Just(Stage::Generate),
        Just(Stage::Refine),
        Just(Stage::Validate),
    ]
}

fn arb_replies() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-zA-Z ]{1,40}", 1..8)
}

fn arb_initial_transcript() -> impl Strategy<Value = Transcript> {
    proptest::collection::vec(
        ("[a-z ]{0,20}", any::<bool>()).prop_map(|(text, human)| {
            if human {
                Turn::human(text)
            } else {
                Turn::assistant(text)
            }
        }),
        0..4,
    )
    .prop_map(Transcript::from)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Generate once, Refine exactly N times, Validate once
    #[test]
    fn prop_fixed_iteration(n in 0u32..12, replies in arb_replies()) {
        let (record, stages, _) = drive(test_record(n, Transcript::new()), &replies);

        let generates = stages.iter().filter(|s| **s == Stage::Generate).count();
        let refines = stages.iter().filter(|s| **s == Stage::Refine).count();
        let validates = stages.iter().filter(|s| **s == Stage::Validate).count();

        prop_assert_eq!(generates, 1);
        prop_assert_eq!(refines, n as usize);
        prop_assert_eq!(validates, 1);
        prop_assert_eq!(stages.first(), Some(&Stage::Generate));
        prop_assert_eq!(stages.last(), Some(&Stage::Validate));
        prop_assert_eq!(record.refinement_count(), n);
    }

    // Transcript grows by two per stage and keeps (human, assistant) order
    #[test]
    fn prop_transcript_shape(
        n in 0u32..8,
        replies in arb_replies(),
        initial in arb_initial_transcript(),
    ) {
        let seeded = initial.len();
        let (record, _, _) = drive(test_record(n, initial.clone()), &replies);
        let turns = record.transcript().turns();

        prop_assert_eq!(turns.len(), seeded + 2 * (n as usize + 2));
        prop_assert_eq!(&turns[..seeded], initial.turns());
        for pair in turns[seeded..].chunks(2) {
            prop_assert_eq!(pair[0].role, Role::Human);
            prop_assert_eq!(pair[1].role, Role::Assistant);
        }
    }

    // final_framework is the output of the last framework-producing stage
    #[test]
    fn prop_final_equals_last_framework(n in 0u32..8, replies in arb_replies()) {
        let (record, stages, _) = drive(test_record(n, Transcript::new()), &replies);

        // The reply consumed by the stage right before Validate
        let producing = stages.len() - 2;
        let expected = &replies[producing % replies.len()];
        prop_assert_eq!(record.final_framework(), Some(expected.as_str()));
        prop_assert_eq!(record.current_framework(), expected.as_str());
    }

    // refinement_count never exceeds the bound and never decreases after Generate
    #[test]
    fn prop_count_monotonic_and_bounded(n in 0u32..10, replies in arb_replies()) {
        let (_, _, counts) = drive(test_record(n, Transcript::new()), &replies);

        prop_assert_eq!(counts[0], 0);
        for window in counts.windows(2) {
            prop_assert!(window[1] >= window[0]);
            prop_assert!(window[1] - window[0] <= 1);
        }
        prop_assert!(counts.iter().all(|c| *c <= n));
    }

    // The routing rule only ever points at Refine while budget remains
    #[test]
    fn prop_routing_rule(stage in arb_stage(), count in 0u32..20, max in 0u32..20) {
        match next_stage(stage, count, max) {
            None => prop_assert_eq!(stage, Stage::Validate),
            Some(Stage::Refine) => prop_assert!(count < max),
            Some(Stage::Validate) => prop_assert!(count >= max),
            Some(Stage::Generate) => prop_assert!(false, "Generate is never re-entered"),
        }
    }

    // Arbitrary out-of-order outcomes never push the count past the bound
    #[test]
    fn prop_bound_holds_for_any_outcome_sequence(
        n in 0u32..5,
        sequence in proptest::collection::vec(arb_stage(), 0..30),
    ) {
        let mut record = test_record(n, Transcript::new());
        for stage in sequence {
            let before = record.transcript().len();
            record = apply(record, StageOutcome {
                stage,
                summary: "s".to_string(),
                completion: "c".to_string(),
            });
            prop_assert!(record.refinement_count() <= n);
            prop_assert!(record.transcript().len() >= before);
        }
    }
}
