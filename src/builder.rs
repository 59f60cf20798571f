//! Assembles [`Document`] node trees from a parser's event stream.
//!
//! Structurally this mirrors a `Document::load`/`load_document`/
//! `load_nodes` chain, generalized: nodes are addressed by `usize` index
//! instead of nonzero `i32`, aliases are left as [`NodeData::Alias`]
//! placeholders for [`crate::resolver::resolve`] to chase, and the final
//! pass fills in `Node::parent` back-references the path-expression engine
//! needs.

use crate::document::{Document, NodeData, NodePair};
use crate::error::{ComposerError, DiagLevel, DiagModule, Diagnostic};
use crate::input::ComposerOptions;
use crate::parser::Parser;
use crate::EventData;

/// Parses one complete document (including its `DOCUMENT-START`/`-END`
/// events) out of `parser` and returns the resulting tree.
///
/// Returns an empty [`Document`] (no root node) once the stream is
/// exhausted, signaling end of stream.
pub fn build_document(
    parser: &mut Parser,
    options: ComposerOptions,
) -> Result<Document, ComposerError> {
    build_document_collecting(parser, options, None)
}

/// As [`build_document`], but also appends a [`Diagnostic`] for every
/// non-fatal oddity (so far: anchor redefinition) when `diagnostics` is
/// `Some` and `options.collect_diag` is set.
pub fn build_document_collecting(
    parser: &mut Parser,
    options: ComposerOptions,
    diagnostics: Option<&mut Vec<Diagnostic>>,
) -> Result<Document, ComposerError> {
    let mut document = Document::empty();

    // The first call against a fresh parser sees STREAM-START; later calls
    // for subsequent documents in the same stream resume mid-state-machine
    // and see DOCUMENT-START directly, or STREAM-END once exhausted.
    let event = loop {
        let event = parser.parse()?;
        match event.data {
            EventData::StreamStart { .. } => continue,
            EventData::StreamEnd => return Ok(document),
            _ => break event,
        }
    };

    let EventData::DocumentStart {
        version_directive,
        tag_directives,
        implicit,
    } = event.data
    else {
        return Err(ComposerError::Problem {
            problem: "expected document start",
            mark: event.start_mark,
        });
    };
    document.version_directive = version_directive;
    document.tag_directives = tag_directives;
    document.start_implicit = implicit;
    document.start_mark = event.start_mark;

    let root_event = parser.parse()?;
    let end_event = if matches!(root_event.data, EventData::DocumentEnd { .. }) {
        root_event
    } else {
        compose_value(parser, &mut document, options, root_event)?;
        parser.parse()?
    };
    let EventData::DocumentEnd { implicit } = end_event.data else {
        return Err(ComposerError::Problem {
            problem: "expected document end",
            mark: end_event.start_mark,
        });
    };
    document.end_implicit = implicit;
    document.end_mark = end_event.end_mark;

    document.link_parents();
    if options.collect_diag {
        if let Some(sink) = diagnostics {
            collect_anchor_diagnostics(&document, sink);
        }
    }
    Ok(document)
}

/// Reports every anchor name that was redefined while composing, mirroring
/// the `log::debug!` already emitted at the point of redefinition in
/// [`register_anchor`].
fn collect_anchor_diagnostics(document: &Document, sink: &mut Vec<Diagnostic>) {
    for (position, (name, index)) in document.anchors.iter().enumerate() {
        let shadowed_earlier = document.anchors[..position]
            .iter()
            .any(|(earlier, _)| earlier == name);
        if shadowed_earlier {
            sink.push(Diagnostic {
                level: DiagLevel::Debug,
                module: DiagModule::Builder,
                start_mark: document.nodes[*index].start_mark,
                end_mark: document.nodes[*index].end_mark,
                message: format!("anchor `{name}` redefined, shadowing the earlier one"),
            });
        }
    }
}

fn normalize_tag(tag: Option<String>, default: &str) -> String {
    match tag.as_deref() {
        None | Some("!") => default.to_string(),
        _ => tag.unwrap(),
    }
}

fn register_anchor(
    document: &mut Document,
    index: usize,
    anchor: Option<String>,
    mark: crate::Mark,
) -> Result<(), ComposerError> {
    let Some(anchor) = anchor else {
        return Ok(());
    };
    if document.find_anchor(&anchor).is_some() {
        log::debug!("anchor `{anchor}` redefined at {mark}, shadowing the earlier one");
    }
    document.anchors.push((anchor, index));
    Ok(())
}

/// Flags scalar-keyed duplicates within one mapping. Complex (non-scalar)
/// keys are left for the resolver, which compares post-merge-expansion
/// values rather than raw node contents.
fn check_duplicate_scalar_keys(document: &Document, mapping: usize) -> Result<(), ComposerError> {
    let NodeData::Mapping { pairs, .. } = &document.nodes[mapping].data else {
        unreachable!("caller passes a mapping index")
    };
    for (i, a) in pairs.iter().enumerate() {
        let NodeData::Scalar { value: a_value, .. } = &document.nodes[a.key].data else {
            continue;
        };
        for b in &pairs[..i] {
            if let NodeData::Scalar { value: b_value, .. } = &document.nodes[b.key].data {
                if a_value == b_value {
                    return Err(ComposerError::Problem {
                        problem: "found duplicate mapping key",
                        mark: document.nodes[a.key].start_mark,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Recursively composes the value `event` starts (a scalar, alias, or
/// whole nested collection) into `document`, reading further events from
/// `parser` as needed, and returns its node index.
///
/// Used by [`crate::composer::drive`] to materialize a non-scalar mapping
/// key into a standalone node tree, since a streaming sink has nowhere to
/// attach a key's own children.
pub(crate) fn compose_value(
    parser: &mut Parser,
    document: &mut Document,
    options: ComposerOptions,
    event: crate::Event,
) -> Result<usize, ComposerError> {
    match event.data {
        EventData::Scalar {
            anchor,
            tag,
            value,
            style,
            ..
        } => {
            let tag = normalize_tag(tag, crate::STR_TAG);
            let mut node = Document::new_node(
                NodeData::Scalar { value, style },
                Some(tag),
                event.start_mark,
                event.end_mark,
            );
            node.anchor = anchor.clone();
            let index = document.push_node(node);
            register_anchor(document, index, anchor, event.start_mark)?;
            Ok(index)
        }
        EventData::Alias { anchor } => Ok(document.push_node(Document::new_node(
            NodeData::Alias { name: anchor },
            None,
            event.start_mark,
            event.end_mark,
        ))),
        EventData::SequenceStart {
            anchor, tag, style, ..
        } => {
            let tag = normalize_tag(tag, crate::SEQ_TAG);
            let mut node = Document::new_node(
                NodeData::Sequence {
                    items: Vec::new(),
                    style,
                },
                Some(tag),
                event.start_mark,
                event.end_mark,
            );
            node.anchor = anchor.clone();
            let index = document.push_node(node);
            register_anchor(document, index, anchor, event.start_mark)?;
            loop {
                let next = parser.parse()?;
                if matches!(next.data, EventData::SequenceEnd) {
                    document.nodes[index].end_mark = next.end_mark;
                    break;
                }
                let item = compose_value(parser, document, options, next)?;
                let NodeData::Sequence { items, .. } = &mut document.nodes[index].data else {
                    unreachable!("just constructed as a sequence")
                };
                items.push(item);
            }
            Ok(index)
        }
        EventData::MappingStart {
            anchor, tag, style, ..
        } => {
            let tag = normalize_tag(tag, crate::MAP_TAG);
            let mut node = Document::new_node(
                NodeData::Mapping {
                    pairs: Vec::new(),
                    style,
                },
                Some(tag),
                event.start_mark,
                event.end_mark,
            );
            node.anchor = anchor.clone();
            let index = document.push_node(node);
            register_anchor(document, index, anchor, event.start_mark)?;
            loop {
                let key_event = parser.parse()?;
                if matches!(key_event.data, EventData::MappingEnd) {
                    document.nodes[index].end_mark = key_event.end_mark;
                    break;
                }
                let key = compose_value(parser, document, options, key_event)?;
                let value_event = parser.parse()?;
                let value = compose_value(parser, document, options, value_event)?;
                let NodeData::Mapping { pairs, .. } = &mut document.nodes[index].data else {
                    unreachable!("just constructed as a mapping")
                };
                pairs.push(NodePair { key, value });
            }
            if options.reject_duplicate_keys {
                check_duplicate_scalar_keys(document, index)?;
            }
            Ok(index)
        }
        _ => Err(ComposerError::Problem {
            problem: "unexpected event while composing a node",
            mark: event.start_mark,
        }),
    }
}
