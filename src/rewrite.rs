//! Merge-edit synthesis for clusters that passed every auto-fix guard.
//!
//! All edits for one cluster are computed against the same pre-edit source
//! snapshot: one whole-line replacement covering the first member, then one
//! whole-line deletion per remaining member. The ranges never overlap, so a
//! host may apply them in any back-to-front order.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::analysis::cluster::Cluster;
use crate::analysis::example::{Example, Metadata};
use crate::ast;

static IMPLICIT_SUBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("is_expected|are_expected").unwrap());

/// A single text edit: replace `range` with `replacement`. An empty
/// replacement deletes the range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    pub range: Range<usize>,
    pub replacement: String,
}

/// Plans the merge for one cluster.
#[must_use]
pub fn plan(cluster: &Cluster<'_>, source: &str) -> Vec<Edit> {
    let members = cluster.members();
    let mut edits = Vec::with_capacity(members.len());
    edits.push(Edit {
        range: replace_range(members, source),
        replacement: merged_example(cluster, source),
    });
    for member in cluster.rest() {
        edits.push(Edit {
            range: ast::whole_lines(source, member.span()),
            replacement: String::new(),
        });
    }
    edits
}

/// Whole lines of the first member. When exactly one blank line separates
/// it from the second member, the blank line's newline is consumed too, so
/// the rewrite leaves no stray blank line behind. A comment line between
/// the members makes the gap wider than one character and nothing extra is
/// consumed.
fn replace_range(members: &[Example<'_>], source: &str) -> Range<usize> {
    let first = ast::whole_lines(source, members[0].span());
    let second = ast::whole_lines(source, members[1].span());
    if first.end + 1 == second.start {
        first.start..first.end + 1
    } else {
        first
    }
}

fn merged_example(cluster: &Cluster<'_>, source: &str) -> String {
    let first = cluster.first();
    let indent = " ".repeat(first.span().column);
    let mut out = format!("{indent}specify{} do\n", metadata_list(&first.metadata));
    for member in cluster.members() {
        out.push_str(&format!("{indent}  {}\n", transformed_body(member, source)));
    }
    out.push_str(&format!("{indent}end\n"));
    out
}

/// The merged example's metadata, recomputed from the first member only:
/// kept symbols then kept pairs, in their original call order.
fn metadata_list(metadata: &Metadata) -> String {
    let items: Vec<&str> = metadata
        .symbols
        .iter()
        .map(String::as_str)
        .chain(metadata.pairs.iter().map(|(_, source)| source.as_str()))
        .collect();
    if items.is_empty() {
        String::new()
    } else {
        format!("({})", items.join(", "))
    }
}

/// A member's body text for the merged block. Ordinary bodies splice in
/// verbatim; `its` bodies substitute the implicit-subject phrase with an
/// explicit `expect(subject.<property>)`.
fn transformed_body(member: &Example<'_>, source: &str) -> String {
    let body = &source[member.body_range()];
    match &member.its_property {
        Some(property) => IMPLICIT_SUBJECT_RE
            .replace_all(body, format!("expect(subject.{property})"))
            .into_owned(),
        None => body.to_string(),
    }
}
