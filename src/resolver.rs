//! Chases `*alias` references and `<<` merge keys left in a freshly built
//! [`Document`], producing a tree with no remaining [`NodeData::Alias`]
//! nodes.
//!
//! Kept separate from [`crate::builder`] because alias/merge semantics are
//! a YAML-specific overlay on an otherwise generic tree: a consumer who
//! wants the raw parse tree (to, say, report anchor redefinitions as part
//! of a linter) can skip this step entirely.

use crate::document::{Document, NodeData, NodePair};
use crate::error::ResolverError;
use crate::input::ResolverOptions;
use crate::Mark;

/// Resolves every alias and, if requested, expands every `<<` merge key in
/// `document`, in place.
pub fn resolve(document: &mut Document, options: ResolverOptions) -> Result<(), ResolverError> {
    let root = match document.root() {
        Some(_) => 0,
        None => return Ok(()),
    };
    let mut stack = Vec::new();
    resolve_node(document, root, options, 0, &mut stack)?;
    if options.expand_merge_keys {
        for index in 0..document.nodes.len() {
            if matches!(document.nodes[index].data, NodeData::Mapping { .. }) {
                expand_merge_keys(document, index)?;
            }
        }
    }
    if options.reject_duplicate_keys {
        for index in 0..document.nodes.len() {
            if matches!(document.nodes[index].data, NodeData::Mapping { .. }) {
                check_duplicate_keys(document, index)?;
            }
        }
    }
    Ok(())
}

/// Walks the tree rooted at `index`, replacing every `Alias` node in place
/// with a deep copy of its target. `stack` holds the chain of anchor names
/// currently being dereferenced, for cycle detection.
fn resolve_node(
    document: &mut Document,
    index: usize,
    options: ResolverOptions,
    depth: usize,
    stack: &mut Vec<String>,
) -> Result<(), ResolverError> {
    if depth > options.max_alias_depth {
        return Err(ResolverError::MaxDepthExceeded {
            mark: document.nodes[index].start_mark,
        });
    }
    let children: Vec<usize> = match &document.nodes[index].data {
        NodeData::Sequence { items, .. } => items.clone(),
        NodeData::Mapping { pairs, .. } => {
            pairs.iter().flat_map(|p| [p.key, p.value]).collect()
        }
        _ => Vec::new(),
    };
    for child in children {
        resolve_alias_in_place(document, child, options, depth, stack)?;
        resolve_node(document, child, options, depth, stack)?;
    }
    Ok(())
}

fn resolve_alias_in_place(
    document: &mut Document,
    index: usize,
    options: ResolverOptions,
    depth: usize,
    stack: &mut Vec<String>,
) -> Result<(), ResolverError> {
    let NodeData::Alias { name } = &document.nodes[index].data else {
        return Ok(());
    };
    let name = name.clone();
    let mark = document.nodes[index].start_mark;
    if stack.contains(&name) {
        return Err(ResolverError::CyclicReference { name, mark });
    }
    let Some(target) = document.find_anchor(&name) else {
        return Err(ResolverError::UndefinedAlias { name, mark });
    };
    stack.push(name);
    let copy = deep_copy(document, target, mark);
    document.nodes[index].data = copy;
    // The copy may itself contain aliases (an anchor defined on a node that
    // references another anchor); resolve those too before popping.
    resolve_node(document, index, options, depth + 1, stack)?;
    let children: Vec<usize> = match &document.nodes[index].data {
        NodeData::Sequence { items, .. } => items.clone(),
        NodeData::Mapping { pairs, .. } => pairs.iter().flat_map(|p| [p.key, p.value]).collect(),
        _ => Vec::new(),
    };
    for child in children {
        resolve_alias_in_place(document, child, options, depth + 1, stack)?;
    }
    stack.pop();
    Ok(())
}

/// Clones the subtree at `source` into fresh nodes appended to the
/// document, returning the data for a new node at `mark` standing in for
/// the alias. Aliases inside the copy are left as `NodeData::Alias` and
/// resolved by the caller afterward, since the anchor registry still names
/// the original nodes.
fn deep_copy(document: &mut Document, source: usize, mark: Mark) -> NodeData {
    match document.nodes[source].data.clone() {
        NodeData::Null => NodeData::Null,
        NodeData::Scalar { value, style } => NodeData::Scalar { value, style },
        NodeData::Alias { name } => NodeData::Alias { name },
        NodeData::Sequence { items, style } => {
            let copied: Vec<usize> = items
                .iter()
                .map(|&item| {
                    let data = deep_copy(document, item, mark);
                    let tag = document.nodes[item].tag.clone();
                    let node = Document::new_node(data, tag, mark, mark);
                    document.push_node(node)
                })
                .collect();
            NodeData::Sequence {
                items: copied,
                style,
            }
        }
        NodeData::Mapping { pairs, style } => {
            let copied: Vec<NodePair> = pairs
                .iter()
                .map(|pair| {
                    let key_data = deep_copy(document, pair.key, mark);
                    let key_tag = document.nodes[pair.key].tag.clone();
                    let key = document.push_node(Document::new_node(key_data, key_tag, mark, mark));
                    let value_data = deep_copy(document, pair.value, mark);
                    let value_tag = document.nodes[pair.value].tag.clone();
                    let value =
                        document.push_node(Document::new_node(value_data, value_tag, mark, mark));
                    NodePair { key, value }
                })
                .collect();
            NodeData::Mapping {
                pairs: copied,
                style,
            }
        }
    }
}

/// Expands `<<: *anchor` and `<<: [*a, *b]` merge keys: pairs from the
/// merged-in mapping(s) are appended for every key not already present.
fn expand_merge_keys(document: &mut Document, mapping: usize) -> Result<(), ResolverError> {
    let NodeData::Mapping { pairs, .. } = &document.nodes[mapping].data else {
        return Ok(());
    };
    let merge_positions: Vec<usize> = pairs
        .iter()
        .enumerate()
        .filter(|(_, pair)| is_merge_key(document, pair.key))
        .map(|(position, _)| position)
        .collect();
    if merge_positions.is_empty() {
        return Ok(());
    }

    let mut own_keys: Vec<String> = pairs
        .iter()
        .enumerate()
        .filter(|(position, _)| !merge_positions.contains(position))
        .filter_map(|(_, pair)| scalar_key_text(document, pair.key))
        .collect();

    let mut merged_in = Vec::new();
    for &position in &merge_positions {
        let value = pairs[position].value;
        let sources = match &document.nodes[value].data {
            NodeData::Mapping { .. } => vec![value],
            NodeData::Sequence { items, .. } => items.clone(),
            _ => {
                return Err(ResolverError::MergeKeyNotAMapping {
                    mark: document.nodes[value].start_mark,
                })
            }
        };
        for source in sources {
            let NodeData::Mapping { pairs: source_pairs, .. } = document.nodes[source].data.clone()
            else {
                return Err(ResolverError::MergeKeyNotAMapping {
                    mark: document.nodes[source].start_mark,
                });
            };
            for pair in source_pairs {
                if let Some(text) = scalar_key_text(document, pair.key) {
                    if own_keys.contains(&text) {
                        continue;
                    }
                    own_keys.push(text);
                }
                merged_in.push(pair);
            }
        }
    }

    let NodeData::Mapping { pairs, .. } = &mut document.nodes[mapping].data else {
        unreachable!("checked above")
    };
    // Splice the merged-in pairs in at the first merge key's own position,
    // rather than appending them at the tail, so keys that follow a merge
    // key in the source keep coming after it in the result (spec example:
    // `{k1: 1, k2: 2}` merged then `k3: 3` stays last, not `k3` before
    // `k1, k2`). `merge_positions` is built by scanning `pairs` in order, so
    // its first element is always the lowest index and removing the (higher
    // or equal) rest doesn't shift it.
    let insert_at = merge_positions[0];
    for &position in merge_positions.iter().rev() {
        pairs.remove(position);
    }
    let mut rest = pairs.split_off(insert_at);
    pairs.append(&mut merged_in);
    pairs.append(&mut rest);
    Ok(())
}

fn is_merge_key(document: &Document, key: usize) -> bool {
    matches!(&document.nodes[key].data, NodeData::Scalar { value, .. } if value == "<<")
}

fn scalar_key_text(document: &Document, key: usize) -> Option<String> {
    match &document.nodes[key].data {
        NodeData::Scalar { value, .. } => Some(value.clone()),
        _ => None,
    }
}

fn check_duplicate_keys(document: &Document, mapping: usize) -> Result<(), ResolverError> {
    let NodeData::Mapping { pairs, .. } = &document.nodes[mapping].data else {
        return Ok(());
    };
    for (i, a) in pairs.iter().enumerate() {
        let Some(a_text) = scalar_key_text(document, a.key) else {
            continue;
        };
        for b in &pairs[..i] {
            if scalar_key_text(document, b.key).as_deref() == Some(a_text.as_str()) {
                return Err(ResolverError::DuplicateKey {
                    mark: document.nodes[a.key].start_mark,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::input::{ComposerOptions, InputOrigin, ParserOptions};
    use crate::value::Value;

    #[test]
    fn merge_key_expands_in_place_keeping_later_keys_last() {
        let input = InputOrigin::Borrowed(b"a: &a\n  k1: 1\n  k2: 2\nb:\n  <<: *a\n  k3: 3\n");
        let document = crate::loader::load(
            input,
            ParserOptions::default(),
            ComposerOptions::default(),
            crate::input::ResolverOptions::default(),
        )
        .unwrap()
        .expect("one document");
        let Value::Map(pairs) = Value::from_node(&document, 0) else {
            panic!("expected a mapping");
        };
        let b = pairs
            .iter()
            .find(|(k, _)| k.as_str() == Some("b"))
            .map(|(_, v)| v)
            .expect("`b` key present");
        let Value::Map(b_pairs) = b else {
            panic!("expected `b` to be a mapping");
        };
        let keys: Vec<&str> = b_pairs.iter().filter_map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["k1", "k2", "k3"]);
    }
}
