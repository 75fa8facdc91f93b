//! The aggregate-examples rule: walks example groups, clusters adjacent
//! assertion-only examples, and reports merge candidates.
//!
//! Analysis is a pure pass over one parsed file. Recoverable oddities
//! (unexpected shapes, metadata the rule cannot interpret, unsafe merges)
//! narrow the scope of the pass; they never surface as errors.

pub mod cluster;
pub mod example;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, trace};
use tree_sitter::Node;

use crate::ast::{ParsedSource, Span};
use crate::config::RuleConfig;
use crate::rewrite::{self, Edit};

use self::cluster::{Cluster, ClusterKey};
use self::example::Patterns;

/// Offense message for an aggregateable example.
pub const MSG: &str = "Aggregate with the example above.";

/// Offense message when a matcher in the cluster has side effects.
pub const MSG_WITH_SIDE_EFFECTS: &str = "Aggregate with the example above. \
    IMPORTANT! Pay attention to the expectation order, some of the matchers \
    have side effects.";

/// A single offense, anchored at the example that should move up.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub anchor: Span,
    pub message: &'static str,
}

/// The aggregate-examples rule. Patterns compile once per instance; the
/// instance is reusable across files.
pub struct AggregateExamples {
    patterns: Patterns,
}

impl AggregateExamples {
    #[must_use]
    pub fn new(config: &RuleConfig) -> Self {
        Self {
            patterns: Patterns::new(&config.matchers_with_side_effects),
        }
    }

    /// All offenses in the file, ordered by anchor position. Every cluster
    /// member beyond the first is reported, pointing at the example above.
    #[must_use]
    pub fn find_offenses(&self, source: &ParsedSource) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for cluster in self.clusters(source) {
            let message = if cluster.members().iter().any(|m| m.has_side_effect) {
                MSG_WITH_SIDE_EFFECTS
            } else {
                MSG
            };
            for member in cluster.rest() {
                diagnostics.push(Diagnostic { anchor: member.span(), message });
            }
        }
        diagnostics.sort_by_key(|d| d.anchor);
        debug!(count = diagnostics.len(), "aggregate-examples offenses");
        diagnostics
    }

    /// Edit plans for clusters that are safe to merge, keyed by the
    /// cluster's primary anchor (its second member). Anchors of further
    /// members carry no plan of their own, so applying every planned fix
    /// rewrites each cluster exactly once. A cluster with any unfixable
    /// member stays diagnostic-only; the absent fix is the signal that
    /// manual review is required.
    #[must_use]
    pub fn plan_fixes(&self, source: &ParsedSource) -> BTreeMap<Span, Vec<Edit>> {
        let mut fixes = BTreeMap::new();
        for cluster in self.clusters(source) {
            if !cluster.members().iter().all(|m| m.fixable) {
                trace!(anchor = ?cluster.primary_anchor(), "cluster is diagnostic-only");
                continue;
            }
            fixes.insert(cluster.primary_anchor(), rewrite::plan(&cluster, source.text()));
        }
        fixes
    }

    fn clusters<'t>(&self, source: &'t ParsedSource) -> Vec<Cluster<'t>> {
        let text = source.text();
        let mut groups = Vec::new();
        self.collect_groups(source.root(), text, &mut groups);

        let mut clusters = Vec::new();
        for statements in groups {
            trace!(statements = statements.len(), "analyzing example group");
            let slots = statements
                .iter()
                .map(|stmt| {
                    self.patterns
                        .recognize(*stmt, text)
                        .map(|ex| (ClusterKey::of(&ex.metadata), ex))
                })
                .collect();
            clusters.extend(cluster::adjacent_runs(slots));
        }
        clusters
    }

    /// Visits every node once, collecting the statement lists of example
    /// groups. A group with fewer than two statements cannot contain a
    /// cluster and is skipped.
    fn collect_groups<'t>(&self, node: Node<'t>, source: &'t str, out: &mut Vec<Vec<Node<'t>>>) {
        if let Some(statements) = self.patterns.group_statements(node, source) {
            if statements.len() >= 2 {
                out.push(statements);
            }
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.collect_groups(child, source, out);
        }
    }
}
