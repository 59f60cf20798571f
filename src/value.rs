//! A generic tagged value, independent of the parse tree: the result of
//! walking a resolved [`crate::Document`] (or of evaluating a path
//! expression) into something a caller can match on without touching node
//! indices.

use smallvec::SmallVec;

use crate::document::{Document, NodeData};
use crate::ScalarStyle;

/// A short string stored inline up to 22 bytes, falling back to a heap
/// allocation past that. Most YAML scalars (keys, short values) fit inline;
/// this avoids an allocation for the common case the way `smallvec` avoids
/// one for short sequences.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompactString(SmallVec<[u8; 22]>);

impl CompactString {
    pub fn as_str(&self) -> &str {
        // SAFETY-equivalent invariant upheld by construction: every
        // constructor below only ever stores bytes taken from a `&str`.
        std::str::from_utf8(&self.0).expect("CompactString only ever stores valid UTF-8")
    }
}

impl From<&str> for CompactString {
    fn from(s: &str) -> Self {
        CompactString(SmallVec::from_slice(s.as_bytes()))
    }
}

impl From<String> for CompactString {
    fn from(s: String) -> Self {
        CompactString(SmallVec::from_vec(s.into_bytes()))
    }
}

impl std::fmt::Display for CompactString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::ops::Deref for CompactString {
    type Target = str;
    fn deref(&self) -> &str {
        self.as_str()
    }
}

/// A value detached from any particular [`crate::Document`]'s node arena.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(CompactString),
    Seq(Vec<Value>),
    Map(Vec<(Value, Value)>),
    /// An alias that the resolver left unresolved, or that a caller chose
    /// not to resolve before converting to `Value`.
    Alias(CompactString),
}

impl Value {
    /// Converts the subtree rooted at `index` into an owned `Value`,
    /// parsing plain scalars against the YAML 1.1 core schema's
    /// implicit-typing rules (`true`/`false`, integers, floats,
    /// `null`/`~`/empty). Quoted and block scalars are never implicitly
    /// typed, matching the core-schema rule that resolution only applies
    /// to the plain style: `"true"`, `'42'`, and `|` block text all come
    /// through as `Value::Str` regardless of their content.
    ///
    /// Tags are not consulted beyond gating on style: a node explicitly
    /// tagged `!!str` still comes through as `Value::Str` if that's what
    /// its content and style resolve to, since this conversion exists for
    /// callers who want YAML's *data model*, not its type-annotation
    /// surface.
    pub fn from_node(document: &Document, index: usize) -> Value {
        let Some(node) = document.get_node(index) else {
            return Value::Null;
        };
        match &node.data {
            NodeData::Null => Value::Null,
            NodeData::Scalar { value, style } => {
                if *style == ScalarStyle::Plain {
                    parse_scalar(value)
                } else {
                    Value::Str(CompactString::from(value.as_str()))
                }
            }
            NodeData::Sequence { items, .. } => {
                Value::Seq(items.iter().map(|&i| Value::from_node(document, i)).collect())
            }
            NodeData::Mapping { pairs, .. } => Value::Map(
                pairs
                    .iter()
                    .map(|pair| {
                        (
                            Value::from_node(document, pair.key),
                            Value::from_node(document, pair.value),
                        )
                    })
                    .collect(),
            ),
            NodeData::Alias { name } => Value::Alias(CompactString::from(name.as_str())),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

fn parse_scalar(text: &str) -> Value {
    match text {
        "" | "~" | "null" | "Null" | "NULL" => return Value::Null,
        "true" | "True" | "TRUE" => return Value::Bool(true),
        "false" | "False" | "FALSE" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = text.parse::<i64>() {
        return Value::Int(n);
    }
    if let Some(hex) = text.strip_prefix("0x") {
        if let Ok(n) = i64::from_str_radix(hex, 16) {
            return Value::Int(n);
        }
    }
    if let Some(oct) = text.strip_prefix("0o") {
        if let Ok(n) = i64::from_str_radix(oct, 8) {
            return Value::Int(n);
        }
    }
    if let Ok(f) = text.parse::<f64>() {
        return Value::Float(f);
    }
    Value::Str(CompactString::from(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_string_round_trips_short_and_long() {
        let short = CompactString::from("hi");
        assert_eq!(short.as_str(), "hi");
        let long = CompactString::from("a".repeat(100).as_str());
        assert_eq!(long.as_str().len(), 100);
    }

    #[test]
    fn parse_scalar_recognizes_core_schema_literals() {
        assert_eq!(parse_scalar("true"), Value::Bool(true));
        assert_eq!(parse_scalar("~"), Value::Null);
        assert_eq!(parse_scalar("42"), Value::Int(42));
        assert_eq!(parse_scalar("3.5"), Value::Float(3.5));
        assert_eq!(
            parse_scalar("hello"),
            Value::Str(CompactString::from("hello"))
        );
    }

    #[test]
    fn from_node_only_implicitly_types_plain_scalars() {
        let mut document = Document::empty();
        let plain = document.push_node(Document::new_node(
            NodeData::Scalar {
                value: "true".to_string(),
                style: ScalarStyle::Plain,
            },
            None,
            crate::Mark::default(),
            crate::Mark::default(),
        ));
        let quoted = document.push_node(Document::new_node(
            NodeData::Scalar {
                value: "true".to_string(),
                style: ScalarStyle::DoubleQuoted,
            },
            None,
            crate::Mark::default(),
            crate::Mark::default(),
        ));
        assert_eq!(Value::from_node(&document, plain), Value::Bool(true));
        assert_eq!(
            Value::from_node(&document, quoted),
            Value::Str(CompactString::from("true"))
        );
    }
}
