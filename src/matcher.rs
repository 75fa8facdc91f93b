//! Declarative tree patterns over the Ruby AST facade.
//!
//! A pattern is a small tree of tagged variants evaluated by one recursive
//! interpreter. Rules build their patterns once, at construction, and run
//! them against many nodes. Evaluation never faults: a pattern asked about
//! a node of the wrong shape reports no match, since the tree legitimately
//! contains shapes the rule does not know.

use std::rc::Rc;

use tree_sitter::Node;

use crate::ast::{self, CallView, Kind};
use crate::language::SelectorSet;

/// Predicate over a call's method name.
#[derive(Clone)]
pub enum NamePred {
    /// Any name.
    Any,
    /// Exactly this name.
    Eq(&'static str),
    /// A member of the selector set.
    In(&'static SelectorSet),
    /// Runtime predicate, for vocabulary supplied via configuration.
    By(Rc<dyn Fn(&str) -> bool>),
}

impl NamePred {
    fn test(&self, name: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Eq(expected) => *expected == name,
            Self::In(set) => set.contains(name),
            Self::By(pred) => pred(name),
        }
    }
}

/// Receiver constraint of a call pattern.
#[derive(Clone)]
pub enum Recv {
    Any,
    /// No explicit receiver: a bare call.
    Bare,
    /// No receiver, or the `RSpec` constant.
    BareOrRSpec,
    /// The receiver matches the sub-pattern.
    Is(Box<Pattern>),
}

impl Recv {
    fn eval<'t>(
        &self,
        receiver: Option<Node<'t>>,
        source: &'t str,
        caps: &mut Vec<Capture<'t>>,
    ) -> bool {
        match (self, receiver) {
            (Self::Any, _) | (Self::Bare | Self::BareOrRSpec, None) => true,
            (Self::Bare, Some(_)) | (Self::Is(_), None) => false,
            (Self::BareOrRSpec, Some(recv)) => {
                Kind::of(recv) == Kind::Constant && ast::text_of(recv, source) == "RSpec"
            }
            (Self::Is(pattern), Some(recv)) => pattern.eval(recv, source, caps),
        }
    }
}

/// Argument-list constraint of a call pattern.
#[derive(Clone)]
pub enum Args {
    /// Any arguments, including none.
    Any,
    /// Exactly these positional patterns.
    Exactly(Vec<Pattern>),
    /// At least one argument, and the first matches.
    First(Box<Pattern>),
    /// Any arguments, captured as an ordered sequence.
    CaptureAll,
}

impl Args {
    fn eval<'t>(&self, args: &[Node<'t>], source: &'t str, caps: &mut Vec<Capture<'t>>) -> bool {
        match self {
            Self::Any => true,
            Self::Exactly(parts) => {
                args.len() == parts.len()
                    && parts.iter().zip(args).all(|(p, a)| p.eval(*a, source, caps))
            }
            Self::First(part) => args.first().is_some_and(|a| part.eval(*a, source, caps)),
            Self::CaptureAll => {
                caps.push(Capture::Seq(args.to_vec()));
                true
            }
        }
    }
}

/// Body constraint of a block pattern, evaluated over the block's
/// statement list.
#[derive(Clone)]
pub enum Body {
    Any,
    /// At least one statement, and every statement matches.
    Each(Box<Pattern>),
    /// Some statement matches.
    AnyStmt(Box<Pattern>),
    /// Statements captured as an ordered sequence.
    CaptureStmts,
}

impl Body {
    fn eval<'t>(&self, block: Node<'t>, source: &'t str, caps: &mut Vec<Capture<'t>>) -> bool {
        let stmts = ast::block_statements(block);
        match self {
            Self::Any => true,
            Self::Each(part) => {
                !stmts.is_empty() && stmts.iter().all(|s| part.eval(*s, source, caps))
            }
            Self::AnyStmt(part) => stmts.iter().any(|s| part.eval(*s, source, caps)),
            Self::CaptureStmts => {
                caps.push(Capture::Seq(stmts));
                true
            }
        }
    }
}

/// A value captured during a match, in pattern order.
#[derive(Debug, Clone)]
pub enum Capture<'t> {
    Node(Node<'t>),
    Seq(Vec<Node<'t>>),
}

/// A compiled tree pattern.
#[derive(Clone)]
pub enum Pattern {
    /// Matches any node.
    Wildcard,
    /// Matches a node of the given kind.
    Kind(Kind),
    /// Matches a method call, including bare-identifier implicit calls.
    Call { recv: Recv, name: NamePred, args: Args },
    /// Matches a call with an attached `{ ... }` or `do ... end` block.
    Block { head: Box<Pattern>, body: Body },
    /// Matches the inner pattern and captures the node.
    Capture(Box<Pattern>),
    /// Every sub-pattern matches; captures concatenate in order.
    AllOf(Vec<Pattern>),
    /// The first matching alternative wins.
    AnyOf(Vec<Pattern>),
    /// The inner pattern does not match. Contributes no captures.
    Not(Box<Pattern>),
    /// Arbitrary predicate over the node and source.
    Test(Rc<dyn Fn(Node<'_>, &str) -> bool>),
}

impl Pattern {
    #[must_use]
    pub fn call(recv: Recv, name: NamePred, args: Args) -> Self {
        Self::Call { recv, name, args }
    }

    #[must_use]
    pub fn block(head: Pattern, body: Body) -> Self {
        Self::Block { head: Box::new(head), body }
    }

    #[must_use]
    pub fn capture(inner: Pattern) -> Self {
        Self::Capture(Box::new(inner))
    }

    #[must_use]
    pub fn not(inner: Pattern) -> Self {
        Self::Not(Box::new(inner))
    }

    pub fn test(pred: impl Fn(Node<'_>, &str) -> bool + 'static) -> Self {
        Self::Test(Rc::new(pred))
    }

    /// Matches `node`, returning captures in pattern order.
    #[must_use]
    pub fn find<'t>(&self, node: Node<'t>, source: &'t str) -> Option<Vec<Capture<'t>>> {
        let mut caps = Vec::new();
        self.eval(node, source, &mut caps).then_some(caps)
    }

    /// Whether the pattern matches at all.
    #[must_use]
    pub fn is_match<'t>(&self, node: Node<'t>, source: &'t str) -> bool {
        self.find(node, source).is_some()
    }

    fn eval<'t>(&self, node: Node<'t>, source: &'t str, caps: &mut Vec<Capture<'t>>) -> bool {
        let mark = caps.len();
        let hit = self.eval_inner(node, source, caps);
        if !hit {
            caps.truncate(mark);
        }
        hit
    }

    fn eval_inner<'t>(&self, node: Node<'t>, source: &'t str, caps: &mut Vec<Capture<'t>>) -> bool {
        match self {
            Self::Wildcard => true,
            Self::Kind(kind) => Kind::of(node) == *kind,
            Self::Call { recv, name, args } => match CallView::of(node, source) {
                Some(call) => {
                    name.test(call.name)
                        && recv.eval(call.receiver, source, caps)
                        && args.eval(&call.args, source, caps)
                }
                None => false,
            },
            Self::Block { head, body } => match CallView::of(node, source) {
                Some(call) => match call.block {
                    Some(block) => head.eval(node, source, caps) && body.eval(block, source, caps),
                    None => false,
                },
                None => false,
            },
            Self::Capture(inner) => {
                let mark = caps.len();
                if inner.eval(node, source, caps) {
                    caps.insert(mark, Capture::Node(node));
                    true
                } else {
                    false
                }
            }
            Self::AllOf(parts) => parts.iter().all(|p| p.eval(node, source, caps)),
            Self::AnyOf(parts) => parts.iter().any(|p| p.eval(node, source, caps)),
            Self::Not(inner) => !inner.eval(node, source, caps),
            Self::Test(pred) => pred(node, source),
        }
    }
}
