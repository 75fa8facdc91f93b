//! Recognition of aggregation candidates among a group's children.
//!
//! An example qualifies when its head call is an example opener and every
//! body statement is an assertion: an expectation subject (`is_expected`,
//! or `expect(...)` over a no-argument subject) followed by a runner call
//! with exactly one matcher argument. Anything else in the body voids the
//! whole example.

use std::ops::Range;
use std::rc::Rc;
use std::sync::LazyLock;

use tree_sitter::Node;

use crate::ast::{self, CallView, Kind, Span};
use crate::language::{self, SelectorSet};
use crate::matcher::{Args, Body, Capture, NamePred, Pattern, Recv};

/// Openers whose arguments carry example metadata. `its` and the
/// focused/skipped variants never contribute metadata to the key.
static METADATA_OPENERS: LazyLock<SelectorSet> =
    LazyLock::new(|| SelectorSet::new(&["it", "specify", "example", "scenario"]));

/// The implicit-subject assertion openers, singular and plural.
static IMPLICIT_SUBJECTS: LazyLock<SelectorSet> =
    LazyLock::new(|| SelectorSet::new(&["is_expected", "are_expected"]));

/// Metadata of an example head call, with the aggregated-failures flag
/// already stripped from its "enabled" forms.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    /// Source texts of the kept symbol flags, in call order.
    pub symbols: Vec<String>,
    /// Kept `key: value` pairs, in call order, as (key text, pair source).
    pub pairs: Vec<(String, String)>,
    /// Set when `aggregate_failures` is given a non-`true` value; holds
    /// the example node's id so the key matches no other key.
    pub disabled_sentinel: Option<usize>,
}

/// One aggregation candidate: an assertion-only example block.
#[derive(Debug, Clone)]
pub struct Example<'t> {
    pub node: Node<'t>,
    pub opener: &'t str,
    pub statements: Vec<Node<'t>>,
    pub metadata: Metadata,
    /// The property named by an `its(...)` opener, when convertible.
    pub its_property: Option<String>,
    /// Some assertion in the body uses a configured side-effect matcher.
    pub has_side_effect: bool,
    /// Passes every auto-fix guard.
    pub fixable: bool,
}

impl Example<'_> {
    #[must_use]
    pub fn span(&self) -> Span {
        Span::of(self.node)
    }

    /// Byte range of the body text, first statement through last.
    ///
    /// # Panics
    /// Panics on an empty body; recognition never produces one.
    #[must_use]
    pub fn body_range(&self) -> Range<usize> {
        let (Some(first), Some(last)) = (self.statements.first(), self.statements.last()) else {
            panic!("assertion-only example with an empty body");
        };
        first.start_byte()..last.end_byte()
    }
}

/// The rule's compiled patterns, built once per rule instance.
pub struct Patterns {
    group: Pattern,
    example: Pattern,
    assertion_only: Pattern,
    side_effects: Pattern,
    fixable: Pattern,
}

impl Patterns {
    #[must_use]
    pub fn new(side_effect_matchers: &[String]) -> Self {
        let configured = side_effect_matchers.to_vec();
        let side_effect_name = NamePred::By(Rc::new(move |name: &str| {
            configured.iter().any(|m| m.as_str() == name)
        }));

        // `is_expected`, or `expect(<subject>)` where the subject is a
        // no-argument call. Subjects with arguments may recompute per
        // invocation, so they never qualify.
        let expectation = Pattern::AnyOf(vec![
            Pattern::call(Recv::Bare, IMPLICIT_SUBJECTS.name_pred(), Args::Exactly(vec![])),
            Pattern::call(
                Recv::Bare,
                NamePred::Eq("expect"),
                Args::Exactly(vec![Pattern::call(
                    Recv::Any,
                    NamePred::Any,
                    Args::Exactly(vec![]),
                )]),
            ),
        ]);

        let assertion = Pattern::call(
            Recv::Is(Box::new(expectation.clone())),
            language::runners::ALL.name_pred(),
            Args::Exactly(vec![Pattern::Wildcard]),
        );

        let side_effect_assertion = Pattern::call(
            Recv::Is(Box::new(expectation)),
            language::runners::ALL.name_pred(),
            Args::Exactly(vec![Pattern::call(Recv::Bare, side_effect_name, Args::Any)]),
        );

        let example_head =
            |args| Pattern::call(Recv::Bare, language::examples::ALL.name_pred(), args);

        let assertion_only =
            Pattern::block(example_head(Args::Any), Body::Each(Box::new(assertion)));

        let side_effects = Pattern::block(
            example_head(Args::Any),
            Body::AnyStmt(Box::new(side_effect_assertion)),
        );

        // A leading string argument is a title; merging would drop it.
        let titled = Pattern::block(
            Pattern::call(
                Recv::Bare,
                METADATA_OPENERS.name_pred(),
                Args::First(Box::new(Pattern::Kind(Kind::Str))),
            ),
            Body::Any,
        );

        // `its` converts to `expect(subject.<property>)` only for a single
        // symbol or string argument; an array argument is ambiguous between
        // property access and indexable lookup, and anything else has no
        // conversion at all.
        let its_block = Pattern::block(
            Pattern::call(Recv::Bare, NamePred::Eq(language::PROPERTY_SHORTHAND), Args::Any),
            Body::Any,
        );
        let its_with_property = Pattern::block(
            Pattern::call(
                Recv::Bare,
                NamePred::Eq(language::PROPERTY_SHORTHAND),
                Args::Exactly(vec![Pattern::AnyOf(vec![
                    Pattern::Kind(Kind::Symbol),
                    Pattern::Kind(Kind::Str),
                ])]),
            ),
            Body::Any,
        );
        let its_unsafe = Pattern::AllOf(vec![its_block, Pattern::not(its_with_property)]);

        // Heredocs interleave with parentheses and braces in ways a textual
        // splice cannot preserve.
        let heredoc = Pattern::test(|node, _| {
            ast::subtree_has_kind(node, |kind| kind.starts_with("heredoc"))
        });

        let fixable = Pattern::AllOf(vec![
            assertion_only.clone(),
            Pattern::not(titled),
            Pattern::not(its_unsafe),
            Pattern::not(heredoc),
            Pattern::not(side_effects.clone()),
        ]);

        let example = Pattern::block(example_head(Args::CaptureAll), Body::CaptureStmts);

        let group = Pattern::block(
            Pattern::call(
                Recv::BareOrRSpec,
                language::example_groups::ALL.name_pred(),
                Args::Any,
            ),
            Body::CaptureStmts,
        );

        Self { group, example, assertion_only, side_effects, fixable }
    }

    /// Statements of an example-group block, or `None` when `node` is not
    /// a group.
    ///
    /// # Panics
    /// Panics if the group pattern's capture arity changes; that is a
    /// defect in this module, not in the analyzed source.
    #[must_use]
    pub fn group_statements<'t>(&self, node: Node<'t>, source: &'t str) -> Option<Vec<Node<'t>>> {
        let caps = self.group.find(node, source)?;
        let [Capture::Seq(statements)] = caps.as_slice() else {
            panic!("group pattern must capture its statements");
        };
        Some(statements.clone())
    }

    /// Classifies `node` as an aggregation candidate. `None` when it is
    /// not an assertion-only example, or when its metadata is malformed —
    /// an argument this rule cannot interpret excludes the example rather
    /// than risking a wrong merge.
    ///
    /// # Panics
    /// Panics if the example pattern's capture arity changes.
    #[must_use]
    pub fn recognize<'t>(&self, node: Node<'t>, source: &'t str) -> Option<Example<'t>> {
        let caps = self.example.find(node, source)?;
        let [Capture::Seq(args), Capture::Seq(statements)] = caps.as_slice() else {
            panic!("example pattern must capture arguments and statements");
        };
        if !self.assertion_only.is_match(node, source) {
            return None;
        }

        let opener = CallView::of(node, source)?.name;
        let metadata = if METADATA_OPENERS.contains(opener) {
            metadata_of(args, node.id(), source)?
        } else {
            Metadata::default()
        };

        let its_property = (opener == language::PROPERTY_SHORTHAND)
            .then(|| property_name(args.first().copied(), source))
            .flatten();
        let fixable = self.fixable.is_match(node, source)
            && (opener != language::PROPERTY_SHORTHAND || its_property.is_some());

        Some(Example {
            node,
            opener,
            statements: statements.clone(),
            metadata,
            its_property,
            has_side_effect: self.side_effects.is_match(node, source),
            fixable,
        })
    }
}

fn metadata_of(args: &[Node<'_>], node_id: usize, source: &str) -> Option<Metadata> {
    let mut meta = Metadata::default();
    let mut disabled = false;
    for arg in args {
        match Kind::of(*arg) {
            Kind::Symbol => {
                let text = ast::text_of(*arg, source);
                if text != ":aggregate_failures" {
                    meta.symbols.push(text.to_string());
                }
            }
            // A title; the auto-fix guard deals with it.
            Kind::Str => {}
            Kind::Pair => collect_pair(*arg, source, &mut meta, &mut disabled)?,
            Kind::Hash => {
                for entry in ast::named_children(*arg) {
                    if Kind::of(entry) != Kind::Pair {
                        return None;
                    }
                    collect_pair(entry, source, &mut meta, &mut disabled)?;
                }
            }
            _ => return None,
        }
    }
    meta.disabled_sentinel = disabled.then_some(node_id);
    Some(meta)
}

fn collect_pair(
    pair: Node<'_>,
    source: &str,
    meta: &mut Metadata,
    disabled: &mut bool,
) -> Option<()> {
    let key = pair.child_by_field_name("key")?;
    let value = pair.child_by_field_name("value")?;
    let key_text = ast::text_of(key, source).trim_start_matches(':');
    if key_text == "aggregate_failures" {
        if Kind::of(value) == Kind::True {
            // The default; stripped so explicit and implicit forms merge.
            return Some(());
        }
        *disabled = true;
    }
    meta.pairs
        .push((key_text.to_string(), ast::text_of(pair, source).to_string()));
    Some(())
}

fn property_name(arg: Option<Node<'_>>, source: &str) -> Option<String> {
    let arg = arg?;
    match Kind::of(arg) {
        Kind::Symbol => Some(ast::text_of(arg, source).trim_start_matches(':').to_string()),
        Kind::Str => string_content(arg, source),
        _ => None,
    }
}

/// Plain content of a string literal; `None` once interpolation or escape
/// sequences are involved.
fn string_content(node: Node<'_>, source: &str) -> Option<String> {
    let children = ast::named_children(node);
    match children.as_slice() {
        [] => Some(trim_quotes(ast::text_of(node, source))),
        [only] if only.kind() == "string_content" => Some(ast::text_of(*only, source).to_string()),
        _ => None,
    }
}

fn trim_quotes(text: &str) -> String {
    let text = text.strip_prefix(['"', '\'']).unwrap_or(text);
    let text = text.strip_suffix(['"', '\'']).unwrap_or(text);
    text.to_string()
}
