#![doc = include_str!("../README.md")]
#![doc(html_root_url = "https://docs.rs/libyaml-safer/0.1.0")]
#![allow(non_snake_case)]
#![warn(clippy::pedantic)]
#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::fn_params_excessive_bools,
    clippy::manual_range_contains,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::struct_excessive_bools,
    clippy::too_many_arguments,
    clippy::too_many_lines,
    clippy::unnecessary_wraps,
    clippy::match_wildcard_for_single_variants
)]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod macros;

mod builder;
mod composer;
mod document;
mod error;
mod event;
mod input;
mod loader;
mod parser;
mod path;
mod pathexpr;
mod reader;
mod resolver;
mod scanner;
mod token;
mod value;

pub use crate::builder::{build_document, build_document_collecting};
pub use crate::composer::{drive, ComposerSink};
pub use crate::document::{Document, Node, NodeData, NodePair};
pub use crate::error::*;
pub use crate::event::*;
pub use crate::input::{ComposerOptions, InputOrigin, JsonMode, ParserOptions, ResolverOptions, TabPolicy};
pub use crate::loader::{load, load_all, load_all_collecting, LoadError};
pub use crate::parser::{Parser, ParserState};
pub use crate::path::PathContext;
pub use crate::pathexpr::{evaluate as evaluate_path, parse as parse_path, PathExpr};
pub use crate::resolver::resolve;
pub use crate::token::*;
pub use crate::value::{CompactString, Value};

pub(crate) const INPUT_RAW_BUFFER_SIZE: usize = 16384;
pub(crate) const INPUT_BUFFER_SIZE: usize = INPUT_RAW_BUFFER_SIZE;

/// The tag `!!null` with the only possible value: `null`.
pub const NULL_TAG: &str = "tag:yaml.org,2002:null";
/// The tag `!!bool` with the values: `true` and `false`.
pub const BOOL_TAG: &str = "tag:yaml.org,2002:bool";
/// The tag `!!str` for string values.
pub const STR_TAG: &str = "tag:yaml.org,2002:str";
/// The tag `!!int` for integer values.
pub const INT_TAG: &str = "tag:yaml.org,2002:int";
/// The tag `!!float` for float values.
pub const FLOAT_TAG: &str = "tag:yaml.org,2002:float";
/// The tag `!!timestamp` for date and time values.
pub const TIMESTAMP_TAG: &str = "tag:yaml.org,2002:timestamp";

/// The tag `!!seq` is used to denote sequences.
pub const SEQ_TAG: &str = "tag:yaml.org,2002:seq";
/// The tag `!!map` is used to denote mapping.
pub const MAP_TAG: &str = "tag:yaml.org,2002:map";

/// The default scalar tag is `!!str`.
pub const DEFAULT_SCALAR_TAG: &str = STR_TAG;
/// The default sequence tag is `!!seq`.
pub const DEFAULT_SEQUENCE_TAG: &str = SEQ_TAG;
/// The default mapping tag is `!!map`.
pub const DEFAULT_MAPPING_TAG: &str = MAP_TAG;

/// The version directive data.
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct VersionDirective {
    /// The major version number.
    pub major: i32,
    /// The minor version number.
    pub minor: i32,
}

/// The tag directive data.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct TagDirective {
    /// The tag handle.
    pub handle: String,
    /// The tag prefix.
    pub prefix: String,
}

/// The stream encoding.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[non_exhaustive]
pub enum Encoding {
    /// Let the scanner choose the encoding.
    #[default]
    Any = 0,
    /// The default UTF-8 encoding.
    Utf8 = 1,
    /// The UTF-16-LE encoding with BOM.
    Utf16Le = 2,
    /// The UTF-16-BE encoding with BOM.
    Utf16Be = 3,
}

/// Line break type.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[non_exhaustive]
pub enum Break {
    /// Let the scanner choose the break type.
    #[default]
    Any = 0,
    /// Use CR for line breaks (Mac style).
    Cr = 1,
    /// Use LN for line breaks (Unix style).
    Ln = 2,
    /// Use CR LN for line breaks (DOS style).
    CrLn = 3,
}

/// Scalar styles.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[non_exhaustive]
pub enum ScalarStyle {
    /// The scanner picked whichever style the source text used.
    #[default]
    Any = 0,
    /// The plain scalar style.
    Plain = 1,
    /// The single-quoted scalar style.
    SingleQuoted = 2,
    /// The double-quoted scalar style.
    DoubleQuoted = 3,
    /// The literal scalar style (`|`).
    Literal = 4,
    /// The folded scalar style (`>`).
    Folded = 5,
}

/// Sequence styles.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[non_exhaustive]
pub enum SequenceStyle {
    /// Unspecified; only ever produced transiently before a real style is
    /// known.
    Any = 0,
    /// The block sequence style.
    Block = 1,
    /// The flow sequence style.
    Flow = 2,
}

/// Mapping styles.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[non_exhaustive]
pub enum MappingStyle {
    /// Unspecified; only ever produced transiently before a real style is
    /// known.
    Any = 0,
    /// The block mapping style.
    Block = 1,
    /// The flow mapping style.
    Flow = 2,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_and_resolves_a_nested_document() {
        const INPUT: &str = r#"
defaults: &defaults
  retries: 3
servers:
  - name: web-1
    <<: *defaults
    port: 8080
  - name: web-2
    <<: *defaults
    port: 8081
"#;
        let document = load(
            InputOrigin::Borrowed(INPUT.as_bytes()),
            ParserOptions::default(),
            ComposerOptions::default(),
            ResolverOptions::default(),
        )
        .unwrap()
        .expect("one document");

        let expr = parse_path("/servers/*/name").unwrap();
        let names = evaluate_path(&document, 0, &expr).unwrap();
        assert_eq!(names.len(), 2);

        let expr = parse_path("/servers/0/retries").unwrap();
        let retries = evaluate_path(&document, 0, &expr).unwrap();
        assert_eq!(retries.len(), 1);
        assert_eq!(Value::from_node(&document, retries[0]), Value::Int(3));
    }

    #[test]
    fn composer_sink_sees_every_event_with_a_path() {
        struct Collector {
            scalars: Vec<(String, String)>,
        }
        impl ComposerSink for Collector {
            fn scalar(&mut self, path: &str, value: &str, _style: ScalarStyle, _anchor: Option<&str>) {
                self.scalars.push((path.to_string(), value.to_string()));
            }
        }

        let mut input: &[u8] = b"name: web-1\nport: 8080\n";
        let mut parser = Parser::new();
        parser.set_input_string(&mut input);
        let mut sink = Collector { scalars: Vec::new() };
        let mut path = PathContext::new();
        drive(&mut parser, &mut sink, &mut path).unwrap();

        assert_eq!(
            sink.scalars,
            vec![
                ("/name".to_string(), "web-1".to_string()),
                ("/port".to_string(), "8080".to_string()),
            ]
        );
    }
}
