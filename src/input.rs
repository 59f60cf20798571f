//! Knobs that steer the reader, scanner, and composer: where bytes come
//! from, and how liberally they get interpreted.

use std::path::PathBuf;

use crate::error::InputError;

/// Where the byte stream for a parse run originates.
///
/// Kept separate from [`std::io::Read`] so a caller can describe *what*
/// they're parsing (for diagnostics) without the crate having opened
/// anything yet.
#[non_exhaustive]
pub enum InputOrigin<'r> {
    /// A file on disk, opened lazily when the parser starts.
    File(PathBuf),
    /// The process's standard input.
    Stdin,
    /// An in-memory byte slice.
    Borrowed(&'r [u8]),
    /// An owned byte buffer.
    Owned(Vec<u8>),
    /// Any other byte stream.
    Stream(Box<dyn std::io::Read + 'r>),
}

impl<'r> InputOrigin<'r> {
    /// Resolves this origin to a boxed reader, opening files and reading
    /// stdin to completion as needed.
    pub(crate) fn into_reader(self) -> Result<Box<dyn std::io::Read + 'r>, InputError> {
        match self {
            InputOrigin::File(path) => {
                let file = std::fs::File::open(&path).map_err(|source| InputError::File {
                    path,
                    source,
                })?;
                Ok(Box::new(std::io::BufReader::new(file)))
            }
            InputOrigin::Stdin => {
                let mut buf = Vec::new();
                std::io::Read::read_to_end(&mut std::io::stdin(), &mut buf)
                    .map_err(InputError::Stdin)?;
                Ok(Box::new(std::io::Cursor::new(buf)))
            }
            InputOrigin::Borrowed(bytes) => Ok(Box::new(bytes)),
            InputOrigin::Owned(bytes) => Ok(Box::new(std::io::Cursor::new(bytes))),
            InputOrigin::Stream(read) => Ok(read),
        }
    }
}

/// How strictly JSON's grammar (a strict subset of YAML 1.2) is enforced.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum JsonMode {
    /// Scan plain YAML; JSON documents still parse, just not exclusively.
    #[default]
    Off,
    /// Sniff the first non-space byte; switch to [`JsonMode::Force`]
    /// semantics when it is `{` or `[`.
    Auto,
    /// Reject every YAML-only construct (anchors, tags, block scalars,
    /// directives, single-quoted scalars, comments, trailing commas, bare
    /// document content) and require plain scalars to be `true`, `false`,
    /// `null`, or a JSON number.
    Force,
}

/// How literal tab characters are treated in indentation-sensitive
/// positions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TabPolicy {
    /// Reject a tab wherever the YAML spec forbids it (the default, and
    /// the only spec-compliant setting).
    #[default]
    Off,
    /// Allow tabs anywhere blanks are allowed, treating each as one column
    /// of indentation. Matches what many YAML documents in the wild
    /// actually contain, at the cost of strict conformance.
    Auto,
    /// Allow tabs and expand each to `n` columns for indent-stack
    /// comparisons.
    Fixed(u8),
}

/// Configuration for [`crate::parser::Parser`] construction.
#[derive(Copy, Clone, Debug, Default)]
#[non_exhaustive]
pub struct ParserOptions {
    pub json: JsonMode,
    pub tab: TabPolicy,
    /// Retain `#`-comments as [`crate::TokenData::Comment`] tokens instead
    /// of discarding them during scanning.
    pub parse_comments: bool,
}

/// Configuration for composing a [`crate::Document`] from a parser.
#[derive(Copy, Clone, Debug)]
#[non_exhaustive]
pub struct ComposerOptions {
    /// Reject a mapping with two equal keys instead of keeping the last one.
    /// Defaults to `true`: a duplicate mapping key is a YAML grammar error,
    /// not an opt-in check.
    pub reject_duplicate_keys: bool,
    /// Run [`crate::resolver::resolve`] on every document [`crate::load_all`]
    /// returns, not only the first one [`crate::load`] hands back.
    pub resolve_document: bool,
    /// Documented no-op: this crate allocates a fresh `Document` per call and
    /// has no node pool to recycle, so there is nothing for this flag to
    /// disable. Kept so callers migrating options structs from a recycling
    /// implementation have somewhere to put the flag.
    pub disable_recycling: bool,
    /// Accumulate [`crate::Diagnostic`]s (anchor redefinitions and similar
    /// non-fatal oddities) instead of only logging them.
    pub collect_diag: bool,
    /// Reject a stream that carries a `%YAML`/`%TAG` directive or an
    /// explicit `---`/`...` marker; only a single bare document is allowed.
    pub bare_document_only: bool,
}

impl Default for ComposerOptions {
    fn default() -> Self {
        ComposerOptions {
            reject_duplicate_keys: true,
            resolve_document: false,
            disable_recycling: false,
            collect_diag: false,
            bare_document_only: false,
        }
    }
}

/// Configuration for [`crate::resolver::resolve`].
#[derive(Copy, Clone, Debug)]
#[non_exhaustive]
pub struct ResolverOptions {
    /// Maximum alias-dereference chain length before giving up.
    ///
    /// Guards against both self-referential cycles and merely very deep
    /// alias chains that would otherwise blow the call stack.
    pub max_alias_depth: usize,
    /// Expand `<<` merge keys in mappings into their target's pairs.
    pub expand_merge_keys: bool,
    /// Reject a mapping with two equal keys after merge-key expansion.
    /// Defaults to `true`, matching [`ComposerOptions::reject_duplicate_keys`]:
    /// a duplicate key is a grammar error, not an opt-in lint. A merge key
    /// can introduce a duplicate that the composer's own pre-merge check
    /// couldn't see, so this check runs again here after expansion.
    pub reject_duplicate_keys: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        ResolverOptions {
            max_alias_depth: 16,
            expand_merge_keys: true,
            reject_duplicate_keys: true,
        }
    }
}
