//! Read-only facade over the tree-sitter Ruby grammar.
//!
//! The rule never mutates the tree; everything here is lookup. The facade
//! also papers over grammar details the rest of the crate should not care
//! about: bare identifiers acting as receiver-less calls, `do`/brace blocks
//! wrapping their statements in `body_statement`/`block_body`, and comment
//! nodes interleaved with statements.

use std::ops::Range;

use serde::Serialize;
use tree_sitter::{Node, Parser, Tree};

use crate::error::{Result, SpecfoldError};

/// Closed taxonomy of the Ruby node kinds the rule relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Call,
    Identifier,
    Constant,
    DoBlock,
    BraceBlock,
    StatementList,
    ArgumentList,
    Symbol,
    HashKeySymbol,
    Pair,
    Hash,
    Array,
    Str,
    True,
    False,
    Comment,
    Other,
}

impl Kind {
    #[must_use]
    pub fn of(node: Node<'_>) -> Self {
        match node.kind() {
            "call" => Self::Call,
            "identifier" => Self::Identifier,
            "constant" => Self::Constant,
            "do_block" => Self::DoBlock,
            "block" => Self::BraceBlock,
            "body_statement" | "block_body" => Self::StatementList,
            "argument_list" => Self::ArgumentList,
            "simple_symbol" => Self::Symbol,
            "hash_key_symbol" => Self::HashKeySymbol,
            "pair" => Self::Pair,
            "hash" => Self::Hash,
            "array" => Self::Array,
            "string" => Self::Str,
            "true" => Self::True,
            "false" => Self::False,
            "comment" => Self::Comment,
            _ => Self::Other,
        }
    }
}

/// Byte span of a node plus the 1-based line and 0-based column it starts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    #[must_use]
    pub fn of(node: Node<'_>) -> Self {
        Self {
            start: node.start_byte(),
            end: node.end_byte(),
            line: node.start_position().row + 1,
            column: node.start_position().column,
        }
    }
}

/// A Ruby source file parsed once and analyzed read-only.
pub struct ParsedSource {
    text: String,
    tree: Tree,
}

impl ParsedSource {
    /// Parses `text` with the bundled Ruby grammar.
    ///
    /// # Errors
    /// Returns an error if the grammar fails to load or the parser yields
    /// no tree.
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let mut parser = Parser::new();
        parser.set_language(tree_sitter_ruby::language())?;
        let tree = parser.parse(&text, None).ok_or(SpecfoldError::Parse)?;
        Ok(Self { text, tree })
    }

    #[must_use]
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// UTF-8 text of a node.
#[must_use]
pub fn text_of<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Named children of a node, comments excluded.
#[must_use]
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|c| c.is_named() && Kind::of(*c) != Kind::Comment)
        .collect()
}

/// A method call normalized across the grammar's `call` node and Ruby's
/// bare-identifier implicit call (`is_expected` parses as a lone
/// identifier but behaves as a receiver-less zero-argument call).
#[derive(Debug, Clone)]
pub struct CallView<'t> {
    pub node: Node<'t>,
    pub receiver: Option<Node<'t>>,
    pub name: &'t str,
    pub args: Vec<Node<'t>>,
    pub block: Option<Node<'t>>,
}

impl<'t> CallView<'t> {
    /// Interprets `node` as a method call, or `None` for any other shape.
    #[must_use]
    pub fn of(node: Node<'t>, source: &'t str) -> Option<Self> {
        match Kind::of(node) {
            Kind::Call => {
                let method = node.child_by_field_name("method")?;
                Some(Self {
                    node,
                    receiver: node.child_by_field_name("receiver"),
                    name: text_of(method, source),
                    args: node
                        .child_by_field_name("arguments")
                        .map(named_children)
                        .unwrap_or_default(),
                    block: node
                        .child_by_field_name("block")
                        .or_else(|| attached_block(node)),
                })
            }
            Kind::Identifier => Some(Self {
                node,
                receiver: None,
                name: text_of(node, source),
                args: Vec::new(),
                block: None,
            }),
            _ => None,
        }
    }
}

fn attached_block(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let result = node
        .children(&mut cursor)
        .find(|c| matches!(Kind::of(*c), Kind::DoBlock | Kind::BraceBlock));
    result
}

/// The statements of a block node in source order, comments excluded.
///
/// `do ... end` bodies arrive wrapped in `body_statement` and brace bodies
/// in `block_body`; both unwrap here. A block with no body yields an empty
/// list.
#[must_use]
pub fn block_statements(block: Node<'_>) -> Vec<Node<'_>> {
    let children = named_children(block);
    if let Some(list) = children
        .iter()
        .copied()
        .find(|c| Kind::of(*c) == Kind::StatementList)
    {
        return named_children(list);
    }
    children
        .into_iter()
        .filter(|c| c.kind() != "block_parameters")
        .collect()
}

/// Depth-first search for a node kind satisfying `pred`, `node` included.
#[must_use]
pub fn subtree_has_kind(node: Node<'_>, pred: fn(&str) -> bool) -> bool {
    if pred(node.kind()) {
        return true;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if subtree_has_kind(child, pred) {
            return true;
        }
    }
    false
}

/// Start byte of the line containing `byte`.
#[must_use]
pub fn line_start(source: &str, byte: usize) -> usize {
    source[..byte].rfind('\n').map_or(0, |i| i + 1)
}

/// Byte just past the newline ending the line containing `byte`; the end
/// of the source when the line is unterminated.
#[must_use]
pub fn line_end(source: &str, byte: usize) -> usize {
    source[byte..].find('\n').map_or(source.len(), |i| byte + i + 1)
}

/// Whole-line byte range of `span`, trailing newline included.
#[must_use]
pub fn whole_lines(source: &str, span: Span) -> Range<usize> {
    let last = span.end.saturating_sub(1).max(span.start);
    line_start(source, span.start)..line_end(source, last)
}
