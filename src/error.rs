/// The pointer position.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Mark {
    /// The position index.
    pub index: u64,
    /// The position line.
    pub line: u64,
    /// The position column.
    pub column: u64,
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {} column {}", self.line, self.column)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    #[error("{problem}")]
    Problem {
        problem: &'static str,
        offset: usize,
        value: i32,
    },
    #[error("input stream produced an invalid byte order marker")]
    InvalidBom,
    #[error("invalid UTF-8 byte at offset: {value:x}")]
    InvalidUtf8 { value: u8 },
    #[error("invalid UTF-16 unpaired surrogate: {value:x}")]
    InvalidUtf16 { value: u16 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    #[error("{}:{}: {} {} ({}:{})", problem_mark.line, problem_mark.column, problem, context, context_mark.line, context_mark.column)]
    Problem {
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        problem_mark: Mark,
    },
    #[error(transparent)]
    Reader(#[from] ReaderError),
}

#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("no more tokens")]
    UnexpectedEof,
    #[error("{}:{}: {}", mark.line, mark.column, problem)]
    Problem { problem: &'static str, mark: Mark },
    #[error("{}:{}: {} {} ({}:{})", mark.line, mark.column, problem, context, context_mark.line, context_mark.column)]
    ProblemWithContext {
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        mark: Mark,
    },
    #[error(transparent)]
    Scanner(#[from] ScannerError),
}

#[derive(Debug, thiserror::Error)]
pub enum ComposerError {
    #[error("{}:{}: {}", mark.line, mark.column, problem)]
    Problem { problem: &'static str, mark: Mark },
    #[error("{}:{}: {} {} ({}:{})", mark.line, mark.column, problem, context, context_mark.line, context_mark.column)]
    ProblemWithContext {
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        mark: Mark,
    },
    #[error(transparent)]
    Parser(#[from] ParserError),
}

/// Errors raised while resolving aliases and merge keys against a built document.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error("{}:{}: found undefined alias", mark.line, mark.column)]
    UndefinedAlias { name: String, mark: Mark },
    #[error("{}:{}: cyclic reference involving anchor `{name}`", mark.line, mark.column)]
    CyclicReference { name: String, mark: Mark },
    #[error("{}:{}: max depth exceeded while resolving aliases", mark.line, mark.column)]
    MaxDepthExceeded { mark: Mark },
    #[error("{}:{}: merge key value must be a mapping or a sequence of mappings", mark.line, mark.column)]
    MergeKeyNotAMapping { mark: Mark },
    #[error("{}:{}: duplicate mapping key after merge-key expansion", mark.line, mark.column)]
    DuplicateKey { mark: Mark },
}

/// Errors raised while lexing, parsing, or evaluating a path expression.
#[derive(Debug, thiserror::Error)]
pub enum PathExprError {
    #[error("unexpected character `{0}` at offset {1} in path expression")]
    UnexpectedChar(char, usize),
    #[error("unterminated flow-style key starting at offset {0}")]
    UnterminatedFlowKey(usize),
    #[error("mismatched parenthesis at offset {0}")]
    MismatchedParen(usize),
    #[error("empty path expression")]
    Empty,
    #[error("max depth exceeded while following alias references")]
    MaxDepthExceeded,
    #[error("cyclic reference while following alias `{0}`")]
    CyclicReference(String),
    #[error("unknown anchor `{0}` referenced by alias")]
    UndefinedAlias(String),
    #[error("invalid integer literal `{0}` in path expression")]
    InvalidInteger(String),
}

/// Errors raised while resolving an [`crate::input::InputOrigin`] to bytes.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to read input file `{path}`: {source}")]
    File {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read from stdin: {0}")]
    Stdin(#[source] std::io::Error),
    #[error("failed to read input stream: {0}")]
    Stream(#[source] std::io::Error),
    #[error(transparent)]
    Reader(#[from] ReaderError),
}

/// Severity of a [`Diagnostic`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[non_exhaustive]
pub enum DiagLevel {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
}

/// Which layer raised a [`Diagnostic`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum DiagModule {
    Atom,
    Scanner,
    Parser,
    Tree,
    Builder,
    Internal,
    System,
}

/// A structured diagnostic report, as handed to a `COLLECT_DIAG` sink.
///
/// Formatting this for a terminal or log file is outside this crate's scope;
/// callers who want that get it from `log`'s own target/module metadata at
/// the call site that emits the underlying `log::warn!`/`log::debug!` line.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Diagnostic {
    pub level: DiagLevel,
    pub module: DiagModule,
    pub start_mark: Mark,
    pub end_mark: Mark,
    pub message: String,
}
