//! A small path-expression language for selecting nodes out of a
//! [`crate::Document`]: `^/servers/*/name`, `/servers/**$`, `*anchor`,
//! `*</servers/0/>`, `/a, /b`.
//!
//! Lexing, parsing, and evaluation are kept as three separate passes (the
//! usual shape for a small expression language) rather than folded
//! together, so a caller can parse once and evaluate the same expression
//! against many documents.

use crate::document::{Document, NodeData};
use crate::error::PathExprError;

/// One lexical token, carrying the byte offset it started at for error
/// messages.
#[derive(Clone, Debug, PartialEq)]
enum PathToken {
    Slash,
    Caret,
    DotDot,
    Dot,
    Colon,
    Dollar,
    Percent,
    SeqFilter,
    MapFilter,
    Star,
    StarStar,
    Comma,
    PipePipe,
    AmpAmp,
    LParen,
    RParen,
    LAngle,
    RAngle,
    Ident(String),
    QuotedString(String),
    Number(i64),
    End,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Lexer {
            chars: src.char_indices().peekable(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<(PathToken, usize)>, PathExprError> {
        let mut tokens = Vec::new();
        while let Some(&(offset, ch)) = self.chars.peek() {
            match ch {
                '/' => {
                    self.chars.next();
                    tokens.push((PathToken::Slash, offset));
                }
                '^' => {
                    self.chars.next();
                    tokens.push((PathToken::Caret, offset));
                }
                '.' => {
                    self.chars.next();
                    if self.chars.peek().map(|&(_, c)| c) == Some('.') {
                        self.chars.next();
                        tokens.push((PathToken::DotDot, offset));
                    } else {
                        tokens.push((PathToken::Dot, offset));
                    }
                }
                ':' => {
                    self.chars.next();
                    tokens.push((PathToken::Colon, offset));
                }
                '$' => {
                    self.chars.next();
                    tokens.push((PathToken::Dollar, offset));
                }
                '%' => {
                    self.chars.next();
                    tokens.push((PathToken::Percent, offset));
                }
                '[' => {
                    self.chars.next();
                    if self.chars.peek().map(|&(_, c)| c) != Some(']') {
                        return Err(PathExprError::UnexpectedChar('[', offset));
                    }
                    self.chars.next();
                    tokens.push((PathToken::SeqFilter, offset));
                }
                '{' => {
                    self.chars.next();
                    if self.chars.peek().map(|&(_, c)| c) != Some('}') {
                        return Err(PathExprError::UnexpectedChar('{', offset));
                    }
                    self.chars.next();
                    tokens.push((PathToken::MapFilter, offset));
                }
                '*' => {
                    self.chars.next();
                    if self.chars.peek().map(|&(_, c)| c) == Some('*') {
                        self.chars.next();
                        tokens.push((PathToken::StarStar, offset));
                    } else {
                        tokens.push((PathToken::Star, offset));
                    }
                }
                ',' => {
                    self.chars.next();
                    tokens.push((PathToken::Comma, offset));
                }
                '|' => {
                    self.chars.next();
                    if self.chars.peek().map(|&(_, c)| c) != Some('|') {
                        return Err(PathExprError::UnexpectedChar('|', offset));
                    }
                    self.chars.next();
                    tokens.push((PathToken::PipePipe, offset));
                }
                '&' => {
                    self.chars.next();
                    if self.chars.peek().map(|&(_, c)| c) != Some('&') {
                        return Err(PathExprError::UnexpectedChar('&', offset));
                    }
                    self.chars.next();
                    tokens.push((PathToken::AmpAmp, offset));
                }
                '(' => {
                    self.chars.next();
                    tokens.push((PathToken::LParen, offset));
                }
                ')' => {
                    self.chars.next();
                    tokens.push((PathToken::RParen, offset));
                }
                '<' => {
                    self.chars.next();
                    tokens.push((PathToken::LAngle, offset));
                }
                '>' => {
                    self.chars.next();
                    tokens.push((PathToken::RAngle, offset));
                }
                '\'' | '"' => {
                    let quote = ch;
                    self.chars.next();
                    let mut text = String::new();
                    loop {
                        match self.chars.next() {
                            Some((_, c)) if c == quote => break,
                            Some((_, c)) => text.push(c),
                            None => return Err(PathExprError::UnterminatedFlowKey(offset)),
                        }
                    }
                    tokens.push((PathToken::QuotedString(text), offset));
                }
                c if c.is_ascii_digit() => {
                    let text = self.scan_number();
                    let n = text
                        .parse::<i64>()
                        .map_err(|_| PathExprError::InvalidInteger(text))?;
                    tokens.push((PathToken::Number(n), offset));
                }
                c if is_ident_start(c) => {
                    let name = self.scan_ident();
                    tokens.push((PathToken::Ident(name), offset));
                }
                c if c.is_whitespace() => {
                    self.chars.next();
                }
                c => return Err(PathExprError::UnexpectedChar(c, offset)),
            }
        }
        tokens.push((PathToken::End, usize::MAX));
        Ok(tokens)
    }

    fn scan_ident(&mut self) -> String {
        let mut out = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if is_ident_char(c) {
                out.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        out
    }

    fn scan_number(&mut self) -> String {
        let mut out = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_digit() {
                out.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        out
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// A parsed path expression.
#[derive(Clone, Debug)]
pub enum PathExpr {
    /// `^`, or a leading `/` with nothing to its left.
    Root,
    /// `.`
    This,
    /// `..`
    Parent,
    /// A bare identifier or a quoted flow-style key.
    Key(String),
    /// An integer literal used as a sequence index.
    Index(i64),
    /// `a:b`, clamped to the sequence length; no negative bounds.
    Slice(i64, i64),
    /// `*` not followed by an identifier or a `/`.
    EveryChild,
    /// `**`
    EveryChildRecursive,
    /// `*name`: registered-anchor lookup.
    Alias(String),
    /// `*</path/.../>`: inline path lookup from the document root.
    AliasPath(Box<PathExpr>),
    /// `:key` reached from a non-mapping leaf folds into a
    /// parent-then-key lookup instead of failing outright.
    Sibling(String),
    /// Suffix `$`: keep only scalar results.
    ScalarFilter(Box<PathExpr>),
    /// Suffix `%`: keep only collection (sequence or mapping) results.
    CollectionFilter(Box<PathExpr>),
    /// Suffix `[]`: keep only sequence results.
    SeqFilter(Box<PathExpr>),
    /// Suffix `{}`: keep only mapping results.
    MapFilter(Box<PathExpr>),
    /// `/`-joined steps.
    Chain(Vec<PathExpr>),
    /// `,`-joined union of independently evaluated sub-expressions.
    Multi(Vec<PathExpr>),
    /// `||`: the first non-empty operand's result.
    LogicalOr(Box<PathExpr>, Box<PathExpr>),
    /// `&&`: the second operand's result, but only if both are non-empty.
    LogicalAnd(Box<PathExpr>, Box<PathExpr>),
}

struct Parser {
    tokens: Vec<(PathToken, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &PathToken {
        &self.tokens[self.pos].0
    }

    fn offset(&self) -> usize {
        self.tokens[self.pos].1
    }

    fn advance(&mut self) -> PathToken {
        let tok = self.tokens[self.pos].0.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    // multi (precedence 5) := logical (',' logical)*
    fn parse_multi(&mut self) -> Result<PathExpr, PathExprError> {
        let mut items = vec![self.parse_logical()?];
        while matches!(self.peek(), PathToken::Comma) {
            self.advance();
            items.push(self.parse_logical()?);
        }
        Ok(if items.len() == 1 {
            items.pop().unwrap()
        } else {
            PathExpr::Multi(items)
        })
    }

    // logical (precedence 4) := chain (('||' | '&&') chain)*
    fn parse_logical(&mut self) -> Result<PathExpr, PathExprError> {
        let mut left = self.parse_chain()?;
        loop {
            match self.peek() {
                PathToken::PipePipe => {
                    self.advance();
                    let right = self.parse_chain()?;
                    left = PathExpr::LogicalOr(Box::new(left), Box::new(right));
                }
                PathToken::AmpAmp => {
                    self.advance();
                    let right = self.parse_chain()?;
                    left = PathExpr::LogicalAnd(Box::new(left), Box::new(right));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // chain (precedence 30) := ['/'] step ('/' step)*; a leading slash
    // with nothing to its left is a root prefix rather than a chain
    // operator, per the slash-disambiguation rule.
    fn parse_chain(&mut self) -> Result<PathExpr, PathExprError> {
        let mut steps = Vec::new();
        if matches!(self.peek(), PathToken::Slash) {
            self.advance();
            steps.push(PathExpr::Root);
        }
        steps.push(self.parse_step()?);
        while matches!(self.peek(), PathToken::Slash) {
            self.advance();
            steps.push(self.parse_step()?);
        }
        Ok(if steps.len() == 1 {
            steps.pop().unwrap()
        } else {
            PathExpr::Chain(steps)
        })
    }

    fn parse_step(&mut self) -> Result<PathExpr, PathExprError> {
        let base = match self.advance() {
            PathToken::Caret => PathExpr::Root,
            PathToken::Dot => PathExpr::This,
            PathToken::DotDot => PathExpr::Parent,
            PathToken::StarStar => PathExpr::EveryChildRecursive,
            PathToken::Star => {
                if let PathToken::Ident(_) = self.peek() {
                    let PathToken::Ident(name) = self.advance() else {
                        unreachable!()
                    };
                    PathExpr::Alias(name)
                } else if matches!(self.peek(), PathToken::LAngle) {
                    // `*</path/.../>`: an inline path lookup from the
                    // document root, delimited so it can't be confused with
                    // `*` followed by a `/`-chained next step.
                    self.advance();
                    let inner = self.parse_chain()?;
                    if !matches!(self.advance(), PathToken::RAngle) {
                        return Err(PathExprError::UnexpectedChar('>', self.offset()));
                    }
                    PathExpr::AliasPath(Box::new(inner))
                } else {
                    PathExpr::EveryChild
                }
            }
            PathToken::Colon => {
                let PathToken::Ident(name) = self.advance() else {
                    return Err(PathExprError::UnexpectedChar(':', self.offset()));
                };
                PathExpr::Sibling(name)
            }
            PathToken::Ident(name) => PathExpr::Key(name),
            PathToken::QuotedString(name) => PathExpr::Key(name),
            PathToken::Number(n) => {
                if matches!(self.peek(), PathToken::Colon) {
                    self.advance();
                    let PathToken::Number(end) = self.advance() else {
                        return Err(PathExprError::UnexpectedChar(':', self.offset()));
                    };
                    PathExpr::Slice(n, end)
                } else {
                    PathExpr::Index(n)
                }
            }
            PathToken::LParen => {
                let inner = self.parse_multi()?;
                if !matches!(self.advance(), PathToken::RParen) {
                    return Err(PathExprError::MismatchedParen(self.offset()));
                }
                inner
            }
            other => {
                return Err(PathExprError::UnexpectedChar(
                    token_char(&other),
                    self.offset(),
                ))
            }
        };
        self.parse_filter_suffixes(base)
    }

    // filter suffixes (precedence 20/15/10) bind tighter than chaining,
    // so `/servers/**$` filters the recursive-descent step, not the whole
    // chain to its left.
    fn parse_filter_suffixes(&mut self, mut base: PathExpr) -> Result<PathExpr, PathExprError> {
        loop {
            base = match self.peek() {
                PathToken::Dollar => {
                    self.advance();
                    PathExpr::ScalarFilter(Box::new(base))
                }
                PathToken::Percent => {
                    self.advance();
                    PathExpr::CollectionFilter(Box::new(base))
                }
                PathToken::SeqFilter => {
                    self.advance();
                    PathExpr::SeqFilter(Box::new(base))
                }
                PathToken::MapFilter => {
                    self.advance();
                    PathExpr::MapFilter(Box::new(base))
                }
                _ => return Ok(base),
            };
        }
    }
}

fn token_char(tok: &PathToken) -> char {
    match tok {
        PathToken::Slash => '/',
        PathToken::LParen => '(',
        PathToken::RParen => ')',
        PathToken::Colon => ':',
        _ => '?',
    }
}

/// Parses a path expression string.
pub fn parse(input: &str) -> Result<PathExpr, PathExprError> {
    if input.trim().is_empty() {
        return Err(PathExprError::Empty);
    }
    let tokens = Lexer::new(input).tokenize()?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_multi()?;
    if !matches!(parser.peek(), PathToken::End) {
        return Err(PathExprError::UnexpectedChar(
            token_char(parser.peek()),
            parser.offset(),
        ));
    }
    Ok(expr)
}

const DEFAULT_MAX_ALIAS_DEPTH: usize = 16;

/// Evaluates `expr` starting from `start`, returning matching node indices
/// in encounter order with no duplicates.
pub fn evaluate(
    document: &Document,
    start: usize,
    expr: &PathExpr,
) -> Result<Vec<usize>, PathExprError> {
    let mut stack = Vec::new();
    let result = eval_step(document, &[start], expr, &mut stack)?;
    Ok(dedup_preserve_order(result))
}

fn dedup_preserve_order(items: Vec<usize>) -> Vec<usize> {
    let mut seen = std::collections::HashSet::new();
    items.into_iter().filter(|i| seen.insert(*i)).collect()
}

fn eval_step(
    document: &Document,
    current: &[usize],
    expr: &PathExpr,
    alias_stack: &mut Vec<String>,
) -> Result<Vec<usize>, PathExprError> {
    match expr {
        PathExpr::Root => Ok(if document.root().is_some() {
            vec![0]
        } else {
            Vec::new()
        }),
        PathExpr::This => Ok(current.to_vec()),
        PathExpr::Parent => Ok(current
            .iter()
            .filter_map(|&i| document.get_node(i).and_then(|n| n.parent))
            .collect()),
        PathExpr::Key(key) => Ok(current
            .iter()
            .filter_map(|&i| match &document.get_node(i)?.data {
                NodeData::Mapping { pairs, .. } => pairs
                    .iter()
                    .find(|p| scalar_text(document, p.key) == Some(key.as_str()))
                    .map(|p| p.value),
                _ => None,
            })
            .collect()),
        PathExpr::Index(n) => Ok(current
            .iter()
            .filter_map(|&i| match &document.get_node(i)?.data {
                NodeData::Sequence { items, .. } => index_into(items, *n),
                _ => None,
            })
            .collect()),
        PathExpr::Slice(start, end) => Ok(current
            .iter()
            .flat_map(|&i| match document.get_node(i).map(|n| &n.data) {
                Some(NodeData::Sequence { items, .. }) => slice_indices(items, *start, *end),
                _ => Vec::new(),
            })
            .collect()),
        PathExpr::EveryChild => Ok(current
            .iter()
            .flat_map(|&i| direct_children(document, i))
            .collect()),
        PathExpr::EveryChildRecursive => {
            let mut out = Vec::new();
            for &i in current {
                out.push(i);
                collect_descendants(document, i, &mut out);
            }
            Ok(out)
        }
        PathExpr::Alias(name) => {
            if alias_stack.contains(name) {
                return Err(PathExprError::CyclicReference(name.clone()));
            }
            if alias_stack.len() >= DEFAULT_MAX_ALIAS_DEPTH {
                return Err(PathExprError::MaxDepthExceeded);
            }
            let Some(target) = document.find_anchor(name) else {
                return Err(PathExprError::UndefinedAlias(name.clone()));
            };
            Ok(vec![target])
        }
        PathExpr::AliasPath(inner) => {
            if alias_stack.len() >= DEFAULT_MAX_ALIAS_DEPTH {
                return Err(PathExprError::MaxDepthExceeded);
            }
            eval_step(document, &[0], inner, alias_stack)
        }
        PathExpr::Sibling(key) => {
            log::warn!(
                "path expression used `:{key}` on a non-mapping step, folding into parent lookup"
            );
            let parents: Vec<usize> = current
                .iter()
                .filter_map(|&i| document.get_node(i).and_then(|n| n.parent))
                .collect();
            eval_step(document, &parents, &PathExpr::Key(key.clone()), alias_stack)
        }
        PathExpr::ScalarFilter(inner) => {
            let candidates = eval_step(document, current, inner, alias_stack)?;
            Ok(filter_by(document, candidates, |data| {
                matches!(data, NodeData::Scalar { .. })
            }))
        }
        PathExpr::CollectionFilter(inner) => {
            let candidates = eval_step(document, current, inner, alias_stack)?;
            Ok(filter_by(document, candidates, |data| {
                matches!(data, NodeData::Sequence { .. } | NodeData::Mapping { .. })
            }))
        }
        PathExpr::SeqFilter(inner) => {
            let candidates = eval_step(document, current, inner, alias_stack)?;
            Ok(filter_by(document, candidates, |data| {
                matches!(data, NodeData::Sequence { .. })
            }))
        }
        PathExpr::MapFilter(inner) => {
            let candidates = eval_step(document, current, inner, alias_stack)?;
            Ok(filter_by(document, candidates, |data| {
                matches!(data, NodeData::Mapping { .. })
            }))
        }
        PathExpr::Chain(steps) => {
            let mut frontier = current.to_vec();
            for step in steps {
                frontier = eval_step(document, &frontier, step, alias_stack)?;
            }
            Ok(frontier)
        }
        PathExpr::Multi(items) => {
            let mut out = Vec::new();
            for item in items {
                out.extend(eval_step(document, current, item, alias_stack)?);
            }
            Ok(out)
        }
        PathExpr::LogicalOr(a, b) => {
            let left = eval_step(document, current, a, alias_stack)?;
            if !left.is_empty() {
                return Ok(left);
            }
            eval_step(document, current, b, alias_stack)
        }
        PathExpr::LogicalAnd(a, b) => {
            let left = eval_step(document, current, a, alias_stack)?;
            if left.is_empty() {
                return Ok(Vec::new());
            }
            let right = eval_step(document, current, b, alias_stack)?;
            if right.is_empty() {
                return Ok(Vec::new());
            }
            Ok(right)
        }
    }
}

fn filter_by(
    document: &Document,
    candidates: Vec<usize>,
    predicate: impl Fn(&NodeData) -> bool,
) -> Vec<usize> {
    candidates
        .into_iter()
        .filter(|&i| {
            document
                .get_node(i)
                .map(|n| predicate(&n.data))
                .unwrap_or(false)
        })
        .collect()
}

fn scalar_text(document: &Document, index: usize) -> Option<&str> {
    match &document.get_node(index)?.data {
        NodeData::Scalar { value, .. } => Some(value.as_str()),
        _ => None,
    }
}

fn index_into(items: &[usize], n: i64) -> Option<usize> {
    if n < 0 || n as usize >= items.len() {
        None
    } else {
        Some(items[n as usize])
    }
}

/// `start:end`, clamped to the sequence's length; negative bounds are not
/// supported.
fn slice_indices(items: &[usize], start: i64, end: i64) -> Vec<usize> {
    let len = items.len() as i64;
    let start = start.clamp(0, len);
    let end = end.clamp(0, len);
    if start >= end {
        return Vec::new();
    }
    items[start as usize..end as usize].to_vec()
}

fn direct_children(document: &Document, index: usize) -> Vec<usize> {
    match document.get_node(index).map(|n| &n.data) {
        Some(NodeData::Sequence { items, .. }) => items.clone(),
        Some(NodeData::Mapping { pairs, .. }) => {
            pairs.iter().flat_map(|p| [p.key, p.value]).collect()
        }
        _ => Vec::new(),
    }
}

fn collect_descendants(document: &Document, index: usize, out: &mut Vec<usize>) {
    for child in direct_children(document, index) {
        out.push(child);
        collect_descendants(document, child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, NodeData, NodePair};
    use crate::{MappingStyle, Mark, ScalarStyle, SequenceStyle};

    fn scalar(doc: &mut Document, text: &str) -> usize {
        doc.push_node(Document::new_node(
            NodeData::Scalar {
                value: text.to_string(),
                style: ScalarStyle::Plain,
            },
            Some(crate::STR_TAG.to_string()),
            Mark::default(),
            Mark::default(),
        ))
    }

    fn build_sample() -> Document {
        let mut doc = Document::empty();
        let name = scalar(&mut doc, "web-1");
        let port = scalar(&mut doc, "8080");
        let name_key = scalar(&mut doc, "name");
        let port_key = scalar(&mut doc, "port");
        let server = doc.push_node(Document::new_node(
            NodeData::Mapping {
                pairs: vec![
                    NodePair {
                        key: name_key,
                        value: name,
                    },
                    NodePair {
                        key: port_key,
                        value: port,
                    },
                ],
                style: MappingStyle::Block,
            },
            Some(crate::MAP_TAG.to_string()),
            Mark::default(),
            Mark::default(),
        ));
        let servers_key = scalar(&mut doc, "servers");
        let servers = doc.push_node(Document::new_node(
            NodeData::Sequence {
                items: vec![server],
                style: SequenceStyle::Block,
            },
            Some(crate::SEQ_TAG.to_string()),
            Mark::default(),
            Mark::default(),
        ));
        doc.push_node(Document::new_node(
            NodeData::Mapping {
                pairs: vec![NodePair {
                    key: servers_key,
                    value: servers,
                }],
                style: MappingStyle::Block,
            },
            Some(crate::MAP_TAG.to_string()),
            Mark::default(),
            Mark::default(),
        ));
        doc.link_parents();
        doc
    }

    #[test]
    fn evaluates_key_and_index_chain() {
        let doc = build_sample();
        let expr = parse("/servers/0/name").unwrap();
        let result = evaluate(&doc, 0, &expr).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(scalar_text(&doc, result[0]), Some("web-1"));
    }

    #[test]
    fn explicit_root_caret_matches_leading_slash() {
        let doc = build_sample();
        let by_caret = evaluate(&doc, 0, &parse("^/servers/0/name").unwrap()).unwrap();
        let by_slash = evaluate(&doc, 0, &parse("/servers/0/name").unwrap()).unwrap();
        assert_eq!(by_caret, by_slash);
    }

    #[test]
    fn every_child_recursive_reaches_nested_scalars() {
        let doc = build_sample();
        let expr = parse("/servers/**$").unwrap();
        let result = evaluate(&doc, 0, &expr).unwrap();
        let texts: Vec<&str> = result.iter().filter_map(|&i| scalar_text(&doc, i)).collect();
        assert!(texts.contains(&"web-1"));
        assert!(texts.contains(&"8080"));
    }

    #[test]
    fn multi_combines_two_chains_without_duplicates() {
        let doc = build_sample();
        let expr = parse("/servers/0/name, /servers/0/port").unwrap();
        let result = evaluate(&doc, 0, &expr).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn inline_alias_path_looks_up_from_document_root() {
        let doc = build_sample();
        let expr = parse("*</servers/0/name>").unwrap();
        let result = evaluate(&doc, 0, &expr).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(scalar_text(&doc, result[0]), Some("web-1"));
    }

    #[test]
    fn every_child_in_the_middle_of_a_chain_is_not_mistaken_for_an_alias_path() {
        let doc = build_sample();
        let expr = parse("/servers/*/name").unwrap();
        let result = evaluate(&doc, 0, &expr).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(scalar_text(&doc, result[0]), Some("web-1"));
    }

    #[test]
    fn seq_filter_keeps_only_sequences() {
        let doc = build_sample();
        let expr = parse("/servers[]").unwrap();
        let result = evaluate(&doc, 0, &expr).unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn undefined_alias_is_an_error() {
        let doc = build_sample();
        let expr = parse("*missing").unwrap();
        let err = evaluate(&doc, 0, &expr).unwrap_err();
        assert!(matches!(err, PathExprError::UndefinedAlias(name) if name == "missing"));
    }
}
