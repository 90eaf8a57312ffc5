//! Linker E2E Tests

use linkrank_core::{Linker, LinkerConfig, LinkerError};

use approx::assert_relative_eq;
use serde_json::json;

/// The infected/clean walkthrough: three labeled hosts, one suspicious
/// target touched only by samples, one popular benign target, one
/// control-only target.
fn infected_clean_linker() -> Linker {
    let mut linker = Linker::with_labels("infected", "clean");

    linker.label("10.0.0.1");
    linker.label("10.0.0.2");
    linker.label("10.0.0.3");

    linker.link("10.0.0.1", "6.6.6.6");
    linker.link("10.0.0.2", "6.6.6.6");

    linker.link("10.0.0.1", "8.8.8.8");
    linker.link("10.0.0.2", "8.8.8.8");
    linker.link("10.0.0.3", "8.8.8.8");
    linker.link("10.0.0.4", "8.8.8.8");
    linker.link("10.0.0.5", "8.8.8.8");
    linker.link("10.0.0.6", "8.8.8.8");

    linker.link("10.0.0.6", "9.9.9.9");

    linker
}

// ============================================================================
// Labeling Tests
// ============================================================================

#[test]
fn test_label_and_is_sample() {
    let mut linker = Linker::default();

    linker.label("10.0.0.1");
    linker.label("10.0.0.1"); // idempotent

    assert!(linker.is_sample("10.0.0.1"));
    assert!(!linker.is_sample("10.0.0.2"));
    assert!(!linker.is_sample("never-seen"));
}

#[test]
fn test_late_labeling_does_not_reclassify() {
    let mut linker = Linker::default();

    // First observed unlabeled: classified control, frozen.
    linker.link("host-a", "target-1");
    linker.label("host-a");
    linker.link("host-a", "target-2");

    assert!(linker.is_sample("host-a"));
    assert_eq!(linker.observed_sample_count(), 0);
    assert_eq!(linker.observed_control_count(), 1);
    assert_eq!(linker.controls(), vec!["host-a".to_string()]);
}

// ============================================================================
// Accumulation Tests
// ============================================================================

#[test]
fn test_link_is_idempotent() {
    let mut linker = Linker::default();
    linker.label("s1");

    linker.link("s1", "t");
    linker.link("s1", "t");
    linker.link("s1", "t");
    linker.link("c1", "t");
    linker.link("c1", "t");

    linker.analyze().expect("analyze");
    let analysis = linker.target_analysis("t").expect("target analyzed");
    assert_eq!(analysis.sample_count, 1);
    assert_eq!(analysis.control_count, 1);
}

#[test]
fn test_self_links_are_legal() {
    let mut linker = Linker::default();
    linker.label("node");

    linker.link("node", "node");

    assert_eq!(linker.observed_target_count(), 1);
    assert_eq!(linker.observed_sample_count(), 1);
    linker.analyze().expect("analyze");
    let analysis = linker.target_analysis("node").expect("target analyzed");
    assert_eq!(analysis.sample_count, 1);
    assert_eq!(analysis.control_count, 0);
}

#[test]
fn test_observed_counts_and_member_lists() {
    let linker = infected_clean_linker();

    assert_eq!(linker.observed_target_count(), 3);
    assert_eq!(linker.observed_sample_count(), 3);
    assert_eq!(linker.observed_control_count(), 3);

    assert_eq!(
        linker.samples(),
        vec![
            "10.0.0.1".to_string(),
            "10.0.0.2".to_string(),
            "10.0.0.3".to_string()
        ]
    );
    assert_eq!(
        linker.controls(),
        vec![
            "10.0.0.4".to_string(),
            "10.0.0.5".to_string(),
            "10.0.0.6".to_string()
        ]
    );
}

// ============================================================================
// Analysis Tests
// ============================================================================

#[test]
fn test_infected_clean_scenario() {
    let mut linker = infected_clean_linker();
    linker.analyze().expect("analyze");

    // 6.6.6.6: two samples, zero controls. Fallback branch with a minimum
    // of 1 against 3 observed controls: (2/3) / (1/3) = 2.
    let evil = linker.target_analysis("6.6.6.6").expect("6.6.6.6 analyzed");
    assert_eq!(evil.sample_count, 2);
    assert_eq!(evil.control_count, 0);
    assert_relative_eq!(evil.sample_percent, 2.0 / 3.0);
    assert_relative_eq!(evil.control_percent, 0.0);
    assert_relative_eq!(evil.ratio, 2.0);

    // 8.8.8.8: the whole observed population touched it.
    let benign = linker.target_analysis("8.8.8.8").expect("8.8.8.8 analyzed");
    assert_eq!(benign.sample_count, 3);
    assert_eq!(benign.control_count, 3);
    assert_relative_eq!(benign.sample_percent, 1.0);
    assert_relative_eq!(benign.control_percent, 1.0);
    assert_relative_eq!(benign.ratio, 1.0);

    // 9.9.9.9: control-only, so zero sample share and ratio 0.
    let quiet = linker.target_analysis("9.9.9.9").expect("9.9.9.9 analyzed");
    assert_eq!(quiet.sample_count, 0);
    assert_eq!(quiet.control_count, 1);
    assert_relative_eq!(quiet.ratio, 0.0);

    // statistics over ratios [2, 1, 0]
    assert_relative_eq!(linker.ratio_mean().expect("mean"), 1.0);
    assert_relative_eq!(linker.ratio_stdev().expect("stdev"), 0.816_496_580_927_726);
}

#[test]
fn test_analyze_on_empty_accumulator_fails() {
    let mut linker = Linker::default();
    linker.label("only-labels-no-links");

    assert_eq!(linker.analyze(), Err(LinkerError::EmptyDataset));
}

#[test]
fn test_analyze_is_idempotent() {
    let mut linker = infected_clean_linker();

    linker.analyze().expect("first analyze");
    let first = linker.results().expect("first results");

    linker.analyze().expect("second analyze");
    let second = linker.results().expect("second results");

    assert_eq!(first, second);
}

#[test]
fn test_explicit_control_size_changes_only_control_side() {
    let build = |control_size: u64| {
        let mut linker = Linker::new(LinkerConfig {
            control_size,
            ..LinkerConfig::default()
        })
        .expect("valid config");
        linker.label("s1");
        linker.link("s1", "t");
        linker.link("c1", "t");
        linker.link("c2", "t");
        linker.analyze().expect("analyze");
        *linker.target_analysis("t").expect("t analyzed")
    };

    let observed = build(0);
    let explicit = build(10);

    // Counts and the sample side are control_size-agnostic.
    assert_eq!(observed.sample_count, explicit.sample_count);
    assert_eq!(observed.control_count, explicit.control_count);
    assert_relative_eq!(observed.sample_percent, explicit.sample_percent);

    // The control share shrinks against the larger population, the ratio grows.
    assert_relative_eq!(observed.control_percent, 1.0);
    assert_relative_eq!(explicit.control_percent, 0.2);
    assert_relative_eq!(observed.ratio, 1.0);
    assert_relative_eq!(explicit.ratio, 5.0);
}

#[test]
fn test_zero_control_population_yields_zero_ratios() {
    let mut linker = Linker::default();
    linker.label("s1");
    linker.label("s2");
    linker.link("s1", "t1");
    linker.link("s2", "t1");
    linker.link("s1", "t2");

    linker.analyze().expect("analyze");

    // No control was ever observed and no explicit size was configured:
    // every ratio takes the total_control == 0 branch.
    for score in linker.results().expect("results") {
        assert_relative_eq!(score.ratio, 0.0);
    }
}

#[test]
fn test_zero_minimum_control_observations_keeps_ratios_finite() {
    let mut linker = Linker::new(LinkerConfig {
        minimum_control_observations: 0.0,
        ..LinkerConfig::default()
    })
    .expect("valid config");
    linker.label("s1");
    linker.link("s1", "lonely-target");
    linker.link("c1", "busy-target");

    linker.analyze().expect("analyze");

    let lonely = linker.target_analysis("lonely-target").expect("analyzed");
    assert!(lonely.ratio.is_finite());
    assert_relative_eq!(lonely.ratio, 0.0);
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_invalid_minimum_control_observations_rejected() {
    for bad in [-1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let result = Linker::new(LinkerConfig {
            minimum_control_observations: bad,
            ..LinkerConfig::default()
        });
        assert!(
            matches!(result, Err(LinkerError::InvalidConfiguration(_))),
            "expected rejection for {bad}"
        );
    }
}

// ============================================================================
// Result Sequence Tests
// ============================================================================

#[test]
fn test_results_before_analyze_fails() {
    let mut linker = Linker::default();
    linker.link("a", "b");

    assert_eq!(linker.results(), Err(LinkerError::UninitializedState));
}

#[test]
fn test_results_ordered_by_descending_ratio() {
    let mut linker = infected_clean_linker();
    linker.analyze().expect("analyze");

    let results = linker.results().expect("results");
    let targets: Vec<&str> = results.iter().map(|r| r.target.as_str()).collect();
    assert_eq!(targets, vec!["6.6.6.6", "8.8.8.8", "9.9.9.9"]);

    for pair in results.windows(2) {
        assert!(pair[0].ratio >= pair[1].ratio);
    }
}

#[test]
fn test_equal_ratios_break_ties_by_target_identifier() {
    let mut linker = Linker::default();
    linker.label("s1");
    // Both targets get the same single sample source, hence equal ratios.
    linker.link("s1", "zz-target");
    linker.link("s1", "aa-target");
    linker.link("c1", "zz-target");
    linker.link("c1", "aa-target");

    linker.analyze().expect("analyze");
    let results = linker.results().expect("results");

    assert_eq!(results[0].target, "aa-target");
    assert_eq!(results[1].target, "zz-target");
}

#[test]
fn test_deviations_from_mean_values() {
    let mut linker = infected_clean_linker();
    linker.analyze().expect("analyze");

    let results = linker.results().expect("results");
    // Ratios are [2, 1, 0]: mean 1, pstdev sqrt(2/3).
    let stdev = 0.816_496_580_927_726_f64;
    assert_relative_eq!(
        results[0].deviations_from_mean.expect("defined"),
        1.0 / stdev
    );
    assert_relative_eq!(results[1].deviations_from_mean.expect("defined"), 0.0);
    assert_relative_eq!(
        results[2].deviations_from_mean.expect("defined"),
        -1.0 / stdev
    );
}

#[test]
fn test_zero_spread_yields_undefined_deviations() {
    let mut linker = Linker::default();
    linker.label("s1");
    linker.link("s1", "t1");
    linker.link("s1", "t2");
    linker.link("c1", "t1");
    linker.link("c1", "t2");

    linker.analyze().expect("analyze");
    let results = linker.results().expect("results");

    assert_eq!(results.len(), 2);
    for score in &results {
        assert_eq!(score.deviations_from_mean, None);
    }
}

#[test]
fn test_never_linked_targets_do_not_appear() {
    let mut linker = infected_clean_linker();
    linker.label("10.0.0.99"); // labeled but never linked, in either role

    linker.analyze().expect("analyze");
    let results = linker.results().expect("results");

    assert_eq!(results.len(), 3);
    assert!(!results.iter().any(|r| r.target == "10.0.0.99"));
}

// ============================================================================
// Serialization Tests
// ============================================================================

#[test]
fn test_result_json_schema_composes_label_fields() {
    let mut linker = infected_clean_linker();
    linker.analyze().expect("analyze");

    let results = linker.results().expect("results");
    let top = serde_json::to_value(&results[0]).expect("serialize");

    assert_eq!(top["target"], json!("6.6.6.6"));
    assert_eq!(top["ratio"], json!(2.0));
    assert_eq!(top["infected_count"], json!(2));
    assert_eq!(top["infected_percent"], json!(2.0 / 3.0));
    assert_eq!(top["clean_count"], json!(0));
    assert_eq!(top["clean_percent"], json!(0.0));
    assert_relative_eq!(
        top["deviations_from_mean"].as_f64().expect("z-score"),
        1.224_744_871_391_589,
        max_relative = 1e-12
    );

    // No stray fields: the schema is exactly the seven label-composed keys.
    // serde_json::Value maps iterate in sorted key order.
    let keys: Vec<&str> = top
        .as_object()
        .expect("map")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(
        keys,
        vec![
            "clean_count",
            "clean_percent",
            "deviations_from_mean",
            "infected_count",
            "infected_percent",
            "ratio",
            "target"
        ]
    );
}

#[test]
fn test_undefined_deviation_serializes_as_null() {
    let mut linker = Linker::default();
    linker.link("c1", "only-target");
    linker.analyze().expect("analyze");

    let results = linker.results().expect("results");
    let value = serde_json::to_value(&results[0]).expect("serialize");

    assert!(value["deviations_from_mean"].is_null());
    assert_eq!(value["sample_count"], json!(0));
    assert_eq!(value["control_count"], json!(1));
}
