// tests/unit_cluster.rs
//! Clustering behavior through the public rule API.

use specfold::{AggregateExamples, ParsedSource, RuleConfig, MSG, MSG_WITH_SIDE_EFFECTS};

fn rule() -> AggregateExamples {
    AggregateExamples::new(&RuleConfig::default())
}

fn offenses(code: &str) -> Vec<(usize, &'static str)> {
    let src = ParsedSource::parse(code).unwrap();
    rule()
        .find_offenses(&src)
        .into_iter()
        .map(|d| (d.anchor.line, d.message))
        .collect()
}

#[test]
fn two_plain_examples_cluster() {
    let code = "describe 'number' do\n  it { expect(number).to be_positive }\n  it { expect(number).to be_odd }\nend\n";
    assert_eq!(offenses(code), vec![(3, MSG)]);
}

#[test]
fn every_member_beyond_the_first_is_reported() {
    let code = "describe 'number' do\n  it { is_expected.to be_positive }\n  it { is_expected.to be_odd }\n  it { is_expected.to be_prime }\nend\n";
    assert_eq!(offenses(code), vec![(3, MSG), (4, MSG)]);
}

#[test]
fn flag_order_does_not_split_a_cluster() {
    let code = "describe 'number' do\n  it(:slow, :db) { is_expected.to be_positive }\n  it(:db, :slow) { is_expected.to be_odd }\nend\n";
    assert_eq!(offenses(code).len(), 1);
}

#[test]
fn explicit_aggregate_failures_true_merges_with_absent() {
    let code = "describe 'number' do\n  it(aggregate_failures: true) { is_expected.to be_positive }\n  it { is_expected.to be_odd }\nend\n";
    assert_eq!(offenses(code).len(), 1);
}

#[test]
fn disabled_aggregate_failures_never_clusters() {
    let code = "describe 'number' do\n  it(aggregate_failures: false) { is_expected.to be_positive }\n  it { is_expected.to be_odd }\nend\n";
    assert!(offenses(code).is_empty());

    // Not even with another disabled example.
    let code = "describe 'number' do\n  it(aggregate_failures: false) { is_expected.to be_positive }\n  it(aggregate_failures: false) { is_expected.to be_odd }\nend\n";
    assert!(offenses(code).is_empty());
}

#[test]
fn differing_metadata_splits_clusters() {
    let code = "describe 'number' do\n  it(:slow) { is_expected.to be_positive }\n  it { is_expected.to be_odd }\nend\n";
    assert!(offenses(code).is_empty());
}

#[test]
fn intervening_statement_breaks_adjacency() {
    let code = "describe 'number' do\n  it { is_expected.to be_positive }\n  let(:other) { 2 }\n  it { is_expected.to be_odd }\nend\n";
    assert!(offenses(code).is_empty());
}

#[test]
fn intervening_unqualified_example_breaks_adjacency() {
    let code = "describe 'number' do\n  it { is_expected.to be_positive }\n  it { value = compute\n    expect(value).to be_odd }\n  it { is_expected.to be_prime }\nend\n";
    assert!(offenses(code).is_empty());
}

#[test]
fn separated_runs_cluster_independently() {
    let code = concat!(
        "describe 'number' do\n",
        "  it { is_expected.to be_positive }\n",
        "  it { is_expected.to be_odd }\n",
        "  before { reset }\n",
        "  it { is_expected.to be_prime }\n",
        "  it { is_expected.to be_deficient }\n",
        "end\n",
    );
    assert_eq!(offenses(code), vec![(3, MSG), (6, MSG)]);
}

#[test]
fn comments_between_examples_do_not_break_the_run() {
    let code = "describe 'number' do\n  it { is_expected.to be_positive }\n  # parity\n  it { is_expected.to be_odd }\nend\n";
    assert_eq!(offenses(code).len(), 1);
}

#[test]
fn non_assertion_example_is_excluded_even_between_equals() {
    // Scenario D: an assignment voids the middle example; the outer two
    // are no longer adjacent.
    let code = concat!(
        "describe 'number' do\n",
        "  it { is_expected.to be_positive }\n",
        "  it do\n",
        "    copy = number\n",
        "    expect(copy).to be_odd\n",
        "  end\n",
        "  it { is_expected.to be_prime }\n",
        "end\n",
    );
    assert!(offenses(code).is_empty());
}

#[test]
fn nested_groups_are_analyzed_separately() {
    let code = concat!(
        "RSpec.describe 'outer' do\n",
        "  it { is_expected.to be_positive }\n",
        "  context 'inner' do\n",
        "    it { is_expected.to be_odd }\n",
        "    it { is_expected.to be_prime }\n",
        "  end\n",
        "end\n",
    );
    assert_eq!(offenses(code), vec![(5, MSG)]);
}

#[test]
fn single_statement_groups_are_skipped() {
    let code = "describe 'number' do\n  it { is_expected.to be_positive }\nend\n";
    assert!(offenses(code).is_empty());
}

#[test]
fn unrelated_blocks_are_not_groups() {
    let code = "items.each do |i|\n  process(i)\n  record(i)\nend\n";
    assert!(offenses(code).is_empty());
}

#[test]
fn side_effect_matcher_switches_the_message() {
    // Scenario C: one member uses a configured side-effect matcher.
    let config = RuleConfig {
        matchers_with_side_effects: vec!["validate_presence_of".to_string()],
    };
    let rule = AggregateExamples::new(&config);
    let code = "describe 'model' do\n  it { is_expected.to validate_presence_of(:comment) }\n  it { is_expected.to be_valid }\nend\n";
    let src = ParsedSource::parse(code).unwrap();

    let diagnostics = rule.find_offenses(&src);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, MSG_WITH_SIDE_EFFECTS);
    assert!(rule.plan_fixes(&src).is_empty());
}

#[test]
fn diagnostics_are_ordered_by_anchor() {
    let code = concat!(
        "describe 'a' do\n",
        "  it { is_expected.to be_positive }\n",
        "  it { is_expected.to be_odd }\n",
        "end\n",
        "describe 'b' do\n",
        "  it { is_expected.to be_prime }\n",
        "  it { is_expected.to be_happy }\n",
        "end\n",
    );
    let lines: Vec<usize> = offenses(code).iter().map(|(line, _)| *line).collect();
    assert_eq!(lines, vec![3, 7]);
}
