//! Top-level entry points gluing [`crate::reader::Reader`] through
//! [`crate::parser::Parser`], [`crate::builder::build_document`], and
//! [`crate::resolver::resolve`] into one call.

use crate::builder;
use crate::document::Document;
use crate::error::{ComposerError, Diagnostic, InputError, ResolverError};
use crate::input::{ComposerOptions, InputOrigin, ParserOptions, ResolverOptions};
use crate::parser::Parser;

/// Everything that can go wrong loading a document end to end.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Compose(#[from] ComposerError),
    #[error(transparent)]
    Resolve(#[from] ResolverError),
}

/// Parses and composes every document in `input`, without resolving
/// aliases or merge keys. Use this when you want [`NodeData::Alias`]
/// placeholders left in place, e.g. to stream them yourself.
///
/// [`NodeData::Alias`]: crate::document::NodeData::Alias
pub fn load_all(
    input: InputOrigin<'_>,
    parser_options: ParserOptions,
    composer_options: ComposerOptions,
) -> Result<Vec<Document>, LoadError> {
    let (documents, _diagnostics) = load_all_collecting(input, parser_options, composer_options)?;
    Ok(documents)
}

/// As [`load_all`], also returning any [`Diagnostic`]s collected along the
/// way when `composer_options.collect_diag` is set (otherwise the second
/// element is always empty).
pub fn load_all_collecting(
    input: InputOrigin<'_>,
    parser_options: ParserOptions,
    composer_options: ComposerOptions,
) -> Result<(Vec<Document>, Vec<Diagnostic>), LoadError> {
    let mut reader = input.into_reader()?;
    let mut bytes = Vec::new();
    std::io::Read::read_to_end(&mut reader, &mut bytes)
        .map_err(|source| LoadError::Input(InputError::Stream(source)))?;
    let mut slice: &[u8] = &bytes;
    let mut parser = Parser::new();
    parser.set_options(parser_options);
    parser.set_input_string(&mut slice);

    let mut documents = Vec::new();
    let mut diagnostics = Vec::new();
    loop {
        let document = builder::build_document_collecting(
            &mut parser,
            composer_options,
            Some(&mut diagnostics),
        )?;
        if document.root().is_none() && documents_is_stream_end(&document) {
            break;
        }
        if composer_options.bare_document_only {
            let is_bare = document.version_directive.is_none()
                && document.tag_directives.is_empty()
                && document.start_implicit
                && document.end_implicit;
            if !is_bare || !documents.is_empty() {
                return Err(LoadError::Compose(ComposerError::Problem {
                    problem: "bare_document_only forbids directives, explicit markers, \
                              and additional documents",
                    mark: document.start_mark,
                }));
            }
        }
        documents.push(document);
    }
    if composer_options.resolve_document {
        for document in &mut documents {
            crate::resolver::resolve(document, ResolverOptions::default())?;
        }
    }
    Ok((documents, diagnostics))
}

/// An empty [`Document`] returned by [`builder::build_document`] at end of
/// stream has no directives set either; real empty documents (`---\n`)
/// still carry their `start_mark`/directives, so this tells the two apart.
fn documents_is_stream_end(document: &Document) -> bool {
    document.version_directive.is_none()
        && document.tag_directives.is_empty()
        && document.start_mark == crate::Mark::default()
}

/// Parses, composes, and resolves the first document in `input`. This is
/// the usual entry point for "I have one YAML document, give me its tree".
pub fn load(
    input: InputOrigin<'_>,
    parser_options: ParserOptions,
    composer_options: ComposerOptions,
    resolver_options: ResolverOptions,
) -> Result<Option<Document>, LoadError> {
    let mut documents = load_all(input, parser_options, composer_options)?;
    if documents.is_empty() {
        return Ok(None);
    }
    let mut document = documents.remove(0);
    crate::resolver::resolve(&mut document, resolver_options)?;
    Ok(Some(document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::JsonMode;

    #[test]
    fn json_auto_mode_forces_json_rules_only_when_the_stream_opens_with_brace_or_bracket() {
        let forced_options = ParserOptions {
            json: JsonMode::Auto,
            ..ParserOptions::default()
        };
        let rejected = load_all(
            InputOrigin::Borrowed(b"{'a': 1}"),
            forced_options,
            ComposerOptions::default(),
        );
        assert!(rejected.is_err(), "single quotes are not valid JSON");

        let accepted = load_all(
            InputOrigin::Borrowed(b"a: 'b'\n"),
            forced_options,
            ComposerOptions::default(),
        );
        assert!(
            accepted.is_ok(),
            "a plain YAML document shouldn't be forced into JSON rules"
        );
    }

    #[test]
    fn loads_a_simple_mapping() {
        let input = InputOrigin::Borrowed(b"name: web-1\nport: 8080\n");
        let document = load(
            input,
            ParserOptions::default(),
            ComposerOptions::default(),
            ResolverOptions::default(),
        )
        .unwrap()
        .expect("one document");
        let root = document.root().unwrap();
        assert!(matches!(
            root.data,
            crate::document::NodeData::Mapping { .. }
        ));
    }

    #[test]
    fn default_options_reject_a_duplicate_mapping_key() {
        let input = InputOrigin::Borrowed(b"name: web-1\nname: web-2\n");
        let err = load(
            input,
            ParserOptions::default(),
            ComposerOptions::default(),
            ResolverOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Compose(ComposerError::Problem { .. })
        ));
    }

    #[test]
    fn resolver_duplicate_key_check_runs_independently_of_the_composer_one() {
        // Disable the composer's (earlier, pre-merge) check so only the
        // resolver's post-merge check is exercised.
        let input = InputOrigin::Borrowed(b"name: web-1\nname: web-2\n");
        let composer_options = ComposerOptions {
            reject_duplicate_keys: false,
            ..ComposerOptions::default()
        };
        let err = load(
            input,
            ParserOptions::default(),
            composer_options,
            ResolverOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Resolve(ResolverError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn empty_input_yields_no_documents() {
        let input = InputOrigin::Borrowed(b"");
        let documents = load_all(input, ParserOptions::default(), ComposerOptions::default())
            .unwrap();
        assert!(documents.is_empty());
    }

    #[test]
    fn resolves_an_alias_to_its_anchor() {
        let input = InputOrigin::Borrowed(b"base: &b\n  x: 1\nderived:\n  <<: *b\n  y: 2\n");
        let document = load(
            input,
            ParserOptions::default(),
            ComposerOptions::default(),
            ResolverOptions::default(),
        )
        .unwrap()
        .expect("one document");
        let value = crate::value::Value::from_node(&document, 0);
        let crate::value::Value::Map(pairs) = value else {
            panic!("expected a mapping");
        };
        let derived = pairs
            .iter()
            .find(|(k, _)| k.as_str() == Some("derived"))
            .map(|(_, v)| v)
            .expect("derived key present");
        let crate::value::Value::Map(derived_pairs) = derived else {
            panic!("expected derived to be a mapping");
        };
        assert!(derived_pairs.iter().any(|(k, _)| k.as_str() == Some("x")));
        assert!(derived_pairs.iter().any(|(k, _)| k.as_str() == Some("y")));
    }

    #[test]
    fn bare_document_only_rejects_a_second_document() {
        let input = InputOrigin::Borrowed(b"a: 1\n---\nb: 2\n");
        let options = ComposerOptions {
            bare_document_only: true,
            ..ComposerOptions::default()
        };
        let err = load_all(input, ParserOptions::default(), options).unwrap_err();
        assert!(matches!(err, LoadError::Compose(ComposerError::Problem { .. })));
    }

    #[test]
    fn collect_diag_reports_anchor_redefinition() {
        let input = InputOrigin::Borrowed(b"a: &x 1\nb: &x 2\n");
        let options = ComposerOptions {
            collect_diag: true,
            ..ComposerOptions::default()
        };
        let (documents, diagnostics) =
            load_all_collecting(input, ParserOptions::default(), options).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("redefined"));
    }
}
