// tests/integration_fixes.rs
//! End-to-end fix planning: offenses, guards, and applied rewrites.

use specfold::{AggregateExamples, Edit, ParsedSource, RuleConfig};

fn rule() -> AggregateExamples {
    AggregateExamples::new(&RuleConfig::default())
}

fn apply(source: &str, edits: &[Edit]) -> String {
    let mut text = source.to_string();
    let mut sorted: Vec<&Edit> = edits.iter().collect();
    sorted.sort_by_key(|e| e.range.start);
    for edit in sorted.iter().rev() {
        text.replace_range(edit.range.clone(), &edit.replacement);
    }
    text
}

fn count_examples(code: &str) -> usize {
    // Good enough for these fixtures: examples open with "it ... {"
    // or "specify" at statement position.
    code.lines()
        .map(str::trim_start)
        .filter(|l| {
            l.starts_with("it {")
                || l.starts_with("it(")
                || l.starts_with("its(")
                || l.starts_with("specify")
        })
        .count()
}

#[test]
fn property_shorthand_cluster_merges_into_explicit_expectations() {
    // Scenario A.
    let code = concat!(
        "describe 'thing' do\n",
        "  its(:x) { is_expected.to be_a }\n",
        "  its(:y) { is_expected.to be_b }\n",
        "end\n",
    );
    let src = ParsedSource::parse(code).unwrap();
    let fixes = rule().plan_fixes(&src);
    assert_eq!(fixes.len(), 1);

    let edits = fixes.values().next().unwrap();
    assert_eq!(
        apply(code, edits),
        concat!(
            "describe 'thing' do\n",
            "  specify do\n",
            "    expect(subject.x).to be_a\n",
            "    expect(subject.y).to be_b\n",
            "  end\n",
            "end\n",
        )
    );
}

#[test]
fn titled_example_reports_but_offers_no_fix() {
    // Scenario B.
    let code = concat!(
        "describe 'thing' do\n",
        "  it { is_expected.to be_valid }\n",
        "  it('is valid') { is_expected.to be_persisted }\n",
        "end\n",
    );
    let src = ParsedSource::parse(code).unwrap();
    let diagnostics = rule().find_offenses(&src);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].anchor.line, 3);
    assert!(rule().plan_fixes(&src).is_empty());
}

#[test]
fn growing_the_side_effect_list_only_removes_fixes() {
    // Guard monotonicity: configuration can only downgrade fixable
    // clusters to diagnostic-only, never the reverse.
    let code = concat!(
        "describe 'model' do\n",
        "  it { is_expected.to allow_value('x') }\n",
        "  it { is_expected.to be_valid }\n",
        "end\n",
    );
    let src = ParsedSource::parse(code).unwrap();

    let permissive = AggregateExamples::new(&RuleConfig::default());
    let strict = AggregateExamples::new(&RuleConfig {
        matchers_with_side_effects: vec!["allow_value".to_string()],
    });

    let before = permissive.plan_fixes(&src);
    let after = strict.plan_fixes(&src);
    assert_eq!(before.len(), 1);
    assert!(after.is_empty());
    assert!(after.keys().all(|anchor| before.contains_key(anchor)));

    // Offenses remain either way.
    assert_eq!(permissive.find_offenses(&src).len(), 1);
    assert_eq!(strict.find_offenses(&src).len(), 1);
}

#[test]
fn merging_k_members_leaves_one_example() {
    let code = concat!(
        "describe 'number' do\n",
        "  it { is_expected.to be_positive }\n",
        "  it { is_expected.to be_odd }\n",
        "  it { is_expected.to be_prime }\n",
        "\n",
        "  specify { expect(number + 1).to be_even }\n",
        "end\n",
    );
    let src = ParsedSource::parse(code).unwrap();
    let fixes = rule().plan_fixes(&src);
    assert_eq!(fixes.len(), 1);

    let edits = fixes.values().next().unwrap();
    // One replacement plus k - 1 deletions.
    assert_eq!(edits.len(), 3);

    let merged = apply(code, edits);
    // 4 examples before, k = 3 merged: 4 - (3 - 1) = 2 remain.
    assert_eq!(count_examples(code), 4);
    assert_eq!(count_examples(&merged), 2);

    let reparsed = ParsedSource::parse(merged.clone()).unwrap();
    assert!(rule().find_offenses(&reparsed).is_empty(), "merged: {merged}");
}

#[test]
fn edits_within_a_cluster_never_overlap() {
    let code = concat!(
        "describe 'number' do\n",
        "  it { is_expected.to be_positive }\n",
        "\n",
        "  it { is_expected.to be_odd }\n",
        "\n",
        "  it { is_expected.to be_prime }\n",
        "end\n",
    );
    let src = ParsedSource::parse(code).unwrap();
    let fixes = rule().plan_fixes(&src);

    for edits in fixes.values() {
        let mut sorted: Vec<&Edit> = edits.iter().collect();
        sorted.sort_by_key(|e| e.range.start);
        for pair in sorted.windows(2) {
            assert!(pair[0].range.end <= pair[1].range.start, "overlap: {pair:?}");
        }
    }
}

#[test]
fn clusters_in_distinct_groups_fix_independently() {
    let code = concat!(
        "describe 'a' do\n",
        "  it { is_expected.to be_positive }\n",
        "  it { is_expected.to be_odd }\n",
        "end\n",
        "\n",
        "describe 'b' do\n",
        "  it { is_expected.to be_prime }\n",
        "  it { is_expected.to be_happy }\n",
        "end\n",
    );
    let src = ParsedSource::parse(code).unwrap();
    let fixes = rule().plan_fixes(&src);
    assert_eq!(fixes.len(), 2);

    let all_edits: Vec<Edit> = fixes.values().flatten().cloned().collect();
    let merged = apply(code, &all_edits);
    assert_eq!(merged.matches("specify do").count(), 2);

    let reparsed = ParsedSource::parse(merged).unwrap();
    assert!(rule().find_offenses(&reparsed).is_empty());
}

#[test]
fn unfixable_cluster_keeps_its_diagnostics() {
    let code = concat!(
        "describe 'thing' do\n",
        "  it { is_expected.to be_valid }\n",
        "  it { is_expected.to eq(marker) }\n",
        "  it('labelled') { is_expected.to be_odd }\n",
        "end\n",
    );
    let src = ParsedSource::parse(code).unwrap();
    let diagnostics = rule().find_offenses(&src);
    assert_eq!(diagnostics.len(), 2);
    // The titled third member poisons the whole cluster's fix.
    assert!(rule().plan_fixes(&src).is_empty());
}

#[test]
fn diagnostics_serialize_for_host_reporters() {
    let code = "describe 'n' do\n  it { is_expected.to be_positive }\n  it { is_expected.to be_odd }\nend\n";
    let src = ParsedSource::parse(code).unwrap();
    let diagnostics = rule().find_offenses(&src);

    let json = serde_json::to_value(&diagnostics).unwrap();
    assert_eq!(json[0]["anchor"]["line"], 3);
    assert_eq!(json[0]["message"], "Aggregate with the example above.");
}
