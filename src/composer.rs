//! Streams a parser's events to a [`ComposerSink`] while maintaining a
//! [`PathContext`], without necessarily materializing a [`crate::Document`].
//!
//! Complex (non-scalar) mapping keys still need their own subtree to hand
//! to the sink, so those are composed through [`crate::builder::compose_value`]
//! into a small standalone document instead of being streamed.

use crate::builder;
use crate::document::Document;
use crate::error::ComposerError;
use crate::input::ComposerOptions;
use crate::parser::Parser;
use crate::path::PathContext;
use crate::{Event, EventData, MappingStyle, ScalarStyle, SequenceStyle};

/// Callbacks driven by [`drive`]. Every method defaults to a no-op, so a
/// sink only implements the events it cares about.
pub trait ComposerSink {
    fn stream_start(&mut self) {}
    fn stream_end(&mut self) {}
    fn document_start(&mut self) {}
    fn document_end(&mut self) {}
    fn scalar(&mut self, path: &str, value: &str, style: ScalarStyle, anchor: Option<&str>) {
        let _ = (path, value, style, anchor);
    }
    fn alias(&mut self, path: &str, anchor: &str) {
        let _ = (path, anchor);
    }
    fn sequence_start(&mut self, path: &str, style: SequenceStyle) {
        let _ = (path, style);
    }
    fn sequence_end(&mut self, path: &str) {
        let _ = path;
    }
    fn mapping_start(&mut self, path: &str, style: MappingStyle) {
        let _ = (path, style);
    }
    fn mapping_end(&mut self, path: &str) {
        let _ = path;
    }
    /// Called in place of the usual scalar/alias/collection callbacks when
    /// a mapping key is itself a sequence or mapping.
    fn complex_key(&mut self, path: &str, key: &Document) {
        let _ = (path, key);
    }
}

/// Drives `parser` through one complete document, calling `sink` for each
/// event and keeping `path` in sync. Leaves `path` empty on return.
pub fn drive<S: ComposerSink>(
    parser: &mut Parser,
    sink: &mut S,
    path: &mut PathContext,
) -> Result<(), ComposerError> {
    let event = loop {
        let event = parser.parse()?;
        match event.data {
            EventData::StreamStart { .. } => {
                sink.stream_start();
                continue;
            }
            EventData::StreamEnd => {
                sink.stream_end();
                return Ok(());
            }
            _ => break event,
        }
    };
    let EventData::DocumentStart { .. } = event.data else {
        return Err(ComposerError::Problem {
            problem: "expected document start",
            mark: event.start_mark,
        });
    };
    sink.document_start();

    let root_event = parser.parse()?;
    let end_event = if matches!(root_event.data, EventData::DocumentEnd { .. }) {
        root_event
    } else {
        drive_value(parser, sink, path, root_event)?;
        parser.parse()?
    };
    let EventData::DocumentEnd { .. } = end_event.data else {
        return Err(ComposerError::Problem {
            problem: "expected document end",
            mark: end_event.start_mark,
        });
    };
    sink.document_end();
    Ok(())
}

/// Reports the value `event` starts to `sink`, recursing into nested
/// collections. `path` must already reflect this value's location.
fn drive_value<S: ComposerSink>(
    parser: &mut Parser,
    sink: &mut S,
    path: &mut PathContext,
    event: Event,
) -> Result<(), ComposerError> {
    match event.data {
        EventData::Scalar {
            anchor,
            value,
            style,
            ..
        } => {
            sink.scalar(&path.render(), &value, style, anchor.as_deref());
            Ok(())
        }
        EventData::Alias { anchor } => {
            sink.alias(&path.render(), &anchor);
            Ok(())
        }
        EventData::SequenceStart { style, .. } => {
            path.enter_sequence();
            sink.sequence_start(&path.render(), style);
            loop {
                let next = parser.parse()?;
                if matches!(next.data, EventData::SequenceEnd) {
                    break;
                }
                path.before_scalar_or_collection_start(None);
                drive_value(parser, sink, path, next)?;
                path.after_scalar_value();
            }
            sink.sequence_end(&path.render());
            path.exit_sequence();
            Ok(())
        }
        EventData::MappingStart { style, .. } => {
            path.enter_mapping();
            sink.mapping_start(&path.render(), style);
            loop {
                let key_event = parser.parse()?;
                if matches!(key_event.data, EventData::MappingEnd) {
                    break;
                }
                drive_pair(parser, sink, path, key_event)?;
            }
            sink.mapping_end(&path.render());
            path.exit_mapping();
            Ok(())
        }
        _ => Err(ComposerError::Problem {
            problem: "unexpected event while composing a node",
            mark: event.start_mark,
        }),
    }
}

fn drive_pair<S: ComposerSink>(
    parser: &mut Parser,
    sink: &mut S,
    path: &mut PathContext,
    key_event: Event,
) -> Result<(), ComposerError> {
    match key_event.data {
        EventData::Scalar { ref value, .. } => {
            path.before_scalar_or_collection_start(Some(value));
            let value_event = parser.parse()?;
            drive_value(parser, sink, path, value_event)?;
            path.after_scalar_value();
            Ok(())
        }
        _ => {
            let mut key_document = Document::empty();
            let options = ComposerOptions::default();
            builder::compose_value(parser, &mut key_document, options, key_event)?;
            sink.complex_key(&path.render(), &key_document);
            let key_text = key_document.serialize_flow_oneline(0);
            let value_event = parser.parse()?;
            path.before_scalar_or_collection_start(Some(&key_text));
            drive_value(parser, sink, path, value_event)?;
            path.after_scalar_value();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Collector {
        scalars: Vec<(String, String)>,
    }
    impl ComposerSink for Collector {
        fn scalar(&mut self, path: &str, value: &str, _style: ScalarStyle, _anchor: Option<&str>) {
            self.scalars.push((path.to_string(), value.to_string()));
        }
    }

    #[test]
    fn complex_mapping_key_path_text_is_its_flow_oneline_serialization() {
        let mut input: &[u8] = b"? [a, b]\n: 1\n";
        let mut parser = Parser::new();
        parser.set_input_string(&mut input);
        let mut sink = Collector { scalars: Vec::new() };
        let mut path = PathContext::new();
        drive(&mut parser, &mut sink, &mut path).unwrap();

        assert_eq!(sink.scalars, vec![("/[a, b]".to_string(), "1".to_string())]);
    }
}
