//! Cluster keys and adjacency clustering.

use std::collections::BTreeSet;
use std::mem;

use crate::ast::Span;

use super::example::{Example, Metadata};

/// Comparison key deciding whether two examples may merge.
///
/// Symbol flags compare as a set, pairs by source text. An example that
/// explicitly disables aggregated failures carries its own node id as a
/// sentinel, so its key equals no other key — not even another disabled
/// example's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterKey {
    symbols: BTreeSet<String>,
    pairs: BTreeSet<(String, String)>,
    sentinel: Option<usize>,
}

impl ClusterKey {
    #[must_use]
    pub fn of(metadata: &Metadata) -> Self {
        Self {
            symbols: metadata.symbols.iter().cloned().collect(),
            pairs: metadata.pairs.iter().cloned().collect(),
            sentinel: metadata.disabled_sentinel,
        }
    }
}

/// A maximal run of two or more adjacent, key-equivalent examples.
#[derive(Debug, Clone)]
pub struct Cluster<'t> {
    members: Vec<Example<'t>>,
}

impl<'t> Cluster<'t> {
    /// # Panics
    /// Panics when built with fewer than two members; `adjacent_runs`
    /// never does that.
    fn new(members: Vec<Example<'t>>) -> Self {
        assert!(members.len() >= 2, "a cluster needs at least two examples");
        Self { members }
    }

    #[must_use]
    pub fn members(&self) -> &[Example<'t>] {
        &self.members
    }

    #[must_use]
    pub fn first(&self) -> &Example<'t> {
        &self.members[0]
    }

    /// Members beyond the first: the ones reported and, on fix, deleted.
    #[must_use]
    pub fn rest(&self) -> &[Example<'t>] {
        &self.members[1..]
    }

    /// Anchor of the offense that carries the fix: the second member.
    #[must_use]
    pub fn primary_anchor(&self) -> Span {
        self.members[1].span()
    }
}

/// Folds per-statement slots into clusters. A slot is `Some` for a
/// qualifying example and `None` for any other statement; a `None`, and
/// any key change, ends the current run.
#[must_use]
pub fn adjacent_runs(slots: Vec<Option<(ClusterKey, Example<'_>)>>) -> Vec<Cluster<'_>> {
    let mut clusters = Vec::new();
    let mut run: Vec<Example<'_>> = Vec::new();
    let mut run_key: Option<ClusterKey> = None;

    for slot in slots {
        match slot {
            Some((key, example)) if run_key.as_ref() == Some(&key) => run.push(example),
            Some((key, example)) => {
                flush(&mut clusters, &mut run);
                run_key = Some(key);
                run.push(example);
            }
            None => {
                flush(&mut clusters, &mut run);
                run_key = None;
            }
        }
    }
    flush(&mut clusters, &mut run);
    clusters
}

fn flush<'t>(clusters: &mut Vec<Cluster<'t>>, run: &mut Vec<Example<'t>>) {
    if run.len() >= 2 {
        clusters.push(Cluster::new(mem::take(run)));
    } else {
        run.clear();
    }
}
