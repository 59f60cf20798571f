//! Turns a character stream into a queue of [`Token`]s.
//!
//! Ported from the libyaml scanning algorithm: an indent stack drives block
//! structure, a per-flow-level list of simple-key candidates lets `:`
//! retroactively turn an already-scanned scalar into a mapping key, and a
//! flow-level counter switches whitespace/indent handling on and off.

use std::collections::VecDeque;

use crate::error::{Mark, ScannerError};
use crate::input::{JsonMode, TabPolicy};
use crate::macros::{is_blank, is_blankz, is_break, is_breakz, is_flow_indicator, is_printable};
use crate::parser::SimpleKey;
use crate::reader::Reader;
use crate::{Encoding, ScalarStyle, Token, TokenData};

#[derive(Copy, Clone, PartialEq, Eq)]
enum FlowKind {
    Sequence,
    Mapping,
}

/// Scanner-facing configuration. A small `Copy` struct constructed via
/// [`Default`], with plain setter-driven options.
#[derive(Copy, Clone, Debug, Default)]
#[non_exhaustive]
pub struct ScannerOptions {
    pub json: JsonMode,
    pub tab: TabPolicy,
    pub parse_comments: bool,
}

pub(crate) struct Scanner<'r> {
    reader: Reader<'r>,
    options: ScannerOptions,

    stream_start_produced: bool,
    pub(crate) stream_end_produced: bool,
    stream_error: bool,

    pub(crate) token_available: bool,
    pub(crate) tokens: VecDeque<Token>,
    pub(crate) tokens_parsed: usize,

    indent: i64,
    indents: Vec<i64>,
    simple_key_allowed: bool,
    simple_keys: Vec<SimpleKey>,
    flow_level: usize,
    flow_kinds: Vec<FlowKind>,
    last_comma_mark: Option<Mark>,
    last_char: Option<char>,
    /// Set once at stream start when `options.json` is [`JsonMode::Auto`]
    /// and the first non-blank byte sniffed is `{` or `[`. Consulted
    /// instead of `options.json` everywhere a [`JsonMode::Force`] check
    /// would otherwise gate JSON-only validation.
    json_sniffed_force: bool,
}

impl<'r> Scanner<'r> {
    pub(crate) fn new() -> Self {
        Scanner {
            reader: Reader::new(),
            options: ScannerOptions::default(),
            stream_start_produced: false,
            stream_end_produced: false,
            stream_error: false,
            token_available: false,
            tokens: VecDeque::new(),
            tokens_parsed: 0,
            indent: -1,
            indents: Vec::new(),
            simple_key_allowed: true,
            simple_keys: vec![SimpleKey {
                possible: false,
                required: false,
                token_number: 0,
                mark: Mark::default(),
            }],
            flow_level: 0,
            flow_kinds: Vec::new(),
            last_comma_mark: None,
            last_char: None,
            json_sniffed_force: false,
        }
    }

    pub(crate) fn set_input_string(&mut self, input: &'r mut &[u8]) {
        self.reader.set_input_string(input);
    }

    pub(crate) fn set_input(&mut self, input: &'r mut dyn std::io::BufRead) {
        self.reader.set_input(input);
    }

    pub(crate) fn set_encoding(&mut self, encoding: Encoding) {
        self.reader.set_encoding(encoding);
    }

    pub(crate) fn set_options(&mut self, options: ScannerOptions) {
        self.options = options;
    }

    fn mark(&self) -> Mark {
        self.reader.mark()
    }

    fn peek(&mut self) -> Option<char> {
        self.reader.peek()
    }

    fn peek_at(&mut self, n: usize) -> Option<char> {
        self.reader.peek_at(n)
    }

    fn skip(&mut self) {
        self.last_char = self.reader.peek();
        self.reader.skip();
    }

    /// Ensures at least one token is queued, scanning as many characters as
    /// needed. Called by the parser's `PEEK_TOKEN`.
    pub(crate) fn fetch_more_tokens(&mut self) -> Result<(), ScannerError> {
        if self.stream_error {
            self.push_synthetic_stream_end();
            self.token_available = true;
            return Ok(());
        }
        loop {
            let need_more_tokens = if self.tokens.is_empty() {
                true
            } else {
                self.stale_simple_keys()?;
                self.simple_keys
                    .iter()
                    .any(|k| k.possible && k.token_number == self.tokens_parsed + self.tokens.len())
            };
            if !need_more_tokens {
                break;
            }
            match self.fetch_next_token() {
                Ok(()) => {}
                Err(err) => {
                    self.stream_error = true;
                    return Err(err);
                }
            }
            if !self.tokens.is_empty() {
                break;
            }
        }
        self.token_available = !self.tokens.is_empty();
        Ok(())
    }

    fn push_synthetic_stream_end(&mut self) {
        let mark = self.mark();
        self.tokens.push_back(Token {
            data: TokenData::StreamEnd,
            start_mark: mark,
            end_mark: mark,
        });
    }

    fn fetch_next_token(&mut self) -> Result<(), ScannerError> {
        if !self.stream_start_produced {
            self.fetch_stream_start();
            return Ok(());
        }
        self.scan_to_next_token()?;
        self.stale_simple_keys()?;
        self.unroll_indent(self.current_column() as i64);

        let Some(ch) = self.peek() else {
            self.fetch_stream_end();
            return Ok(());
        };

        let at_line_start = self.current_column() == 0;

        if at_line_start && ch == '%' {
            return self.fetch_directive();
        }
        if at_line_start && self.check_document_indicator("---") {
            return self.fetch_document_indicator(true);
        }
        if at_line_start && self.check_document_indicator("...") {
            return self.fetch_document_indicator(false);
        }
        match ch {
            '[' => self.fetch_flow_collection_start(FlowKind::Sequence, TokenData::FlowSequenceStart),
            '{' => self.fetch_flow_collection_start(FlowKind::Mapping, TokenData::FlowMappingStart),
            ']' => self.fetch_flow_collection_end(FlowKind::Sequence, TokenData::FlowSequenceEnd),
            '}' => self.fetch_flow_collection_end(FlowKind::Mapping, TokenData::FlowMappingEnd),
            ',' => self.fetch_flow_entry(),
            '-' if is_blankz(self.peek_at(1)) => self.fetch_block_entry(),
            '?' if self.flow_level > 0 || is_blankz(self.peek_at(1)) => self.fetch_key(),
            ':' if self.flow_level > 0 || is_blankz(self.peek_at(1)) => self.fetch_value(),
            '&' => self.fetch_anchor_or_alias(false),
            '*' => self.fetch_anchor_or_alias(true),
            '!' => self.fetch_tag(),
            '|' if self.flow_level == 0 => self.fetch_block_scalar(false),
            '>' if self.flow_level == 0 => self.fetch_block_scalar(true),
            '\'' => self.fetch_flow_scalar(false),
            '"' => self.fetch_flow_scalar(true),
            _ => self.fetch_plain_scalar(),
        }
    }

    fn current_column(&self) -> u64 {
        self.mark().column
    }

    // ---- whitespace / comments -------------------------------------------------

    fn scan_to_next_token(&mut self) -> Result<(), ScannerError> {
        loop {
            if self.current_column() == 0 {
                if let Some(bom) = self.peek() {
                    if crate::macros::is_bom(bom) {
                        self.skip();
                    }
                }
            }
            let mut found_blank = false;
            while self.tab_is_allowed_here() && is_blank(self.peek())
                || (!self.tab_is_allowed_here() && self.peek() == Some(' '))
            {
                self.skip();
                found_blank = true;
            }
            if self.peek() == Some('\t') && !self.tab_is_allowed_here() {
                if self.current_column() as i64 <= self.indent {
                    return Err(ScannerError::Problem {
                        context: "while scanning for the next token",
                        context_mark: self.mark(),
                        problem: "tab characters are not allowed in indentation",
                        problem_mark: self.mark(),
                    });
                }
            }
            if self.peek() == Some('#') {
                let start = self.mark();
                let mut text = String::new();
                self.skip();
                while !is_breakz(self.peek()) {
                    if let Some(c) = self.peek() {
                        text.push(c);
                    }
                    self.skip();
                }
                if self.options.parse_comments {
                    let end = self.mark();
                    self.tokens.push_back(Token {
                        data: TokenData::Comment { value: text },
                        start_mark: start,
                        end_mark: end,
                    });
                }
            }
            if is_break(self.peek()) {
                self.skip();
                if self.flow_level == 0 {
                    self.simple_key_allowed = true;
                }
                continue;
            }
            let _ = found_blank;
            break;
        }
        Ok(())
    }

    fn tab_is_allowed_here(&self) -> bool {
        match self.options.tab {
            TabPolicy::Off => false,
            TabPolicy::Fixed(_) => true,
            TabPolicy::Auto => self.flow_level > 0 || !self.simple_key_allowed,
        }
    }

    fn check_document_indicator(&mut self, marker: &str) -> bool {
        let chars: Vec<char> = marker.chars().collect();
        (0..chars.len()).all(|i| self.peek_at(i) == Some(chars[i]))
            && is_blankz(self.peek_at(chars.len()))
    }

    // ---- simple keys ------------------------------------------------------------

    fn save_simple_key(&mut self) -> Result<(), ScannerError> {
        let required = self.flow_level == 0 && self.indent as u64 == self.current_column();
        if self.simple_key_allowed {
            self.remove_simple_key()?;
            let mark = self.mark();
            *self.simple_keys.last_mut().unwrap() = SimpleKey {
                possible: true,
                required,
                token_number: self.tokens_parsed + self.tokens.len(),
                mark,
            };
        }
        Ok(())
    }

    fn remove_simple_key(&mut self) -> Result<(), ScannerError> {
        let key = self.simple_keys.last_mut().unwrap();
        if key.possible && key.required {
            let mark = key.mark;
            return Err(ScannerError::Problem {
                context: "while scanning a simple key",
                context_mark: mark,
                problem: "could not find expected ':'",
                problem_mark: mark,
            });
        }
        key.possible = false;
        Ok(())
    }

    fn stale_simple_keys(&mut self) -> Result<(), ScannerError> {
        let mark = self.mark();
        for key in &mut self.simple_keys {
            if key.possible
                && (key.mark.line < mark.line
                    || mark.index.saturating_sub(key.mark.index) > 1024)
            {
                if key.required {
                    return Err(ScannerError::Problem {
                        context: "while scanning a simple key",
                        context_mark: key.mark,
                        problem: "could not find expected ':'",
                        problem_mark: mark,
                    });
                }
                key.possible = false;
            }
        }
        Ok(())
    }

    fn increase_flow_level(&mut self, kind: FlowKind) {
        self.simple_keys.push(SimpleKey {
            possible: false,
            required: false,
            token_number: 0,
            mark: Mark::default(),
        });
        self.flow_kinds.push(kind);
        self.flow_level += 1;
    }

    fn decrease_flow_level(&mut self) {
        if self.flow_level > 0 {
            self.flow_level -= 1;
            self.flow_kinds.pop();
            self.simple_keys.pop();
        }
    }

    // ---- indent stack -------------------------------------------------------

    fn roll_indent(&mut self, column: i64, map_start_token_number: Option<usize>, mark: Mark) {
        if self.flow_level > 0 {
            return;
        }
        if self.indent < column {
            self.indents.push(self.indent);
            self.indent = column;
            if let Some(number) = map_start_token_number {
                let insert_at = number - self.tokens_parsed;
                self.tokens.insert(
                    insert_at,
                    Token {
                        data: TokenData::BlockMappingStart,
                        start_mark: mark,
                        end_mark: mark,
                    },
                );
            } else {
                self.tokens.push_back(Token {
                    data: TokenData::BlockSequenceStart,
                    start_mark: mark,
                    end_mark: mark,
                });
            }
        }
    }

    fn unroll_indent(&mut self, column: i64) {
        if self.flow_level > 0 {
            return;
        }
        let mark = self.mark();
        while self.indent > column {
            self.indent = self.indents.pop().unwrap_or(-1);
            self.tokens.push_back(Token {
                data: TokenData::BlockEnd,
                start_mark: mark,
                end_mark: mark,
            });
        }
    }

    // ---- stream / document boundaries ---------------------------------------

    /// Whether JSON-only validation is currently in force: either
    /// `options.json` is [`JsonMode::Force`] outright, or it is
    /// [`JsonMode::Auto`] and [`Scanner::sniff_json_mode`] already decided
    /// the stream opens with `{` or `[`.
    fn json_force_active(&self) -> bool {
        matches!(self.options.json, JsonMode::Force) || self.json_sniffed_force
    }

    /// Looks ahead past leading blanks/breaks (without consuming them) for
    /// the first real byte, the way a `.json`-suffix caller would sniff a
    /// buffer before picking a mode. Bounded so a pathological run of blank
    /// lines can't turn this into an unbounded scan.
    fn sniff_json_mode(&mut self) -> bool {
        const MAX_LOOKAHEAD: usize = 4096;
        for n in 0..MAX_LOOKAHEAD {
            match self.peek_at(n) {
                Some(c) if c == ' ' || c == '\t' || c == '\n' || c == '\r' => continue,
                Some(c) => return c == '{' || c == '[',
                None => return false,
            }
        }
        false
    }

    fn fetch_stream_start(&mut self) {
        let mark = self.mark();
        self.indent = -1;
        self.simple_key_allowed = true;
        self.stream_start_produced = true;
        if matches!(self.options.json, JsonMode::Auto) {
            self.json_sniffed_force = self.sniff_json_mode();
        }
        self.tokens.push_back(Token {
            data: TokenData::StreamStart {
                encoding: Encoding::Utf8,
            },
            start_mark: mark,
            end_mark: mark,
        });
    }

    fn fetch_stream_end(&mut self) {
        self.unroll_indent(-1);
        self.simple_key_allowed = false;
        let mark = self.mark();
        self.tokens.push_back(Token {
            data: TokenData::StreamEnd,
            start_mark: mark,
            end_mark: mark,
        });
    }

    fn fetch_directive(&mut self) -> Result<(), ScannerError> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let start = self.mark();
        self.skip();
        let name = self.scan_word();
        let token = match name.as_str() {
            "YAML" => {
                self.skip_blanks();
                let major = self.scan_number_digit()?;
                if self.peek() != Some('.') {
                    return Err(ScannerError::Problem {
                        context: "while scanning a %YAML directive",
                        context_mark: start,
                        problem: "did not find expected digit or '.' character",
                        problem_mark: self.mark(),
                    });
                }
                self.skip();
                let minor = self.scan_number_digit()?;
                TokenData::VersionDirective { major, minor }
            }
            "TAG" => {
                self.skip_blanks();
                let handle = self.scan_tag_handle()?;
                self.skip_blanks();
                let prefix = self.scan_tag_uri()?;
                TokenData::TagDirective { handle, prefix }
            }
            other => {
                let text = other.to_string();
                while !is_breakz(self.peek()) {
                    self.skip();
                }
                log::warn!("ignoring unknown directive %{text}");
                let end = self.mark();
                self.tokens.push_back(Token {
                    data: TokenData::Comment {
                        value: format!("%{text}"),
                    },
                    start_mark: start,
                    end_mark: end,
                });
                return Ok(());
            }
        };
        while is_blank(self.peek()) {
            self.skip();
        }
        if self.peek() == Some('#') {
            while !is_breakz(self.peek()) {
                self.skip();
            }
        }
        let end = self.mark();
        self.tokens.push_back(Token {
            data: token,
            start_mark: start,
            end_mark: end,
        });
        Ok(())
    }

    fn scan_number_digit(&mut self) -> Result<i32, ScannerError> {
        let mut value = 0i32;
        let mut len = 0;
        while let Some(ch) = self.peek() {
            if !ch.is_ascii_digit() {
                break;
            }
            value = value * 10 + ch.to_digit(10).unwrap() as i32;
            len += 1;
            self.skip();
            if len > 9 {
                return Err(ScannerError::Problem {
                    context: "while scanning a directive",
                    context_mark: self.mark(),
                    problem: "found extremely long version number",
                    problem_mark: self.mark(),
                });
            }
        }
        if len == 0 {
            return Err(ScannerError::Problem {
                context: "while scanning a directive",
                context_mark: self.mark(),
                problem: "did not find expected version number",
                problem_mark: self.mark(),
            });
        }
        Ok(value)
    }

    fn scan_tag_handle(&mut self) -> Result<String, ScannerError> {
        let mut handle = String::new();
        if self.peek() != Some('!') {
            return Err(ScannerError::Problem {
                context: "while scanning a tag",
                context_mark: self.mark(),
                problem: "did not find expected '!'",
                problem_mark: self.mark(),
            });
        }
        handle.push('!');
        self.skip();
        while let Some(ch) = self.peek() {
            if !(ch.is_ascii_alphanumeric() || ch == '-') {
                break;
            }
            handle.push(ch);
            self.skip();
        }
        if self.peek() == Some('!') {
            handle.push('!');
            self.skip();
        }
        Ok(handle)
    }

    fn scan_tag_uri(&mut self) -> Result<String, ScannerError> {
        let mut uri = String::new();
        while let Some(ch) = self.peek() {
            if is_blankz(Some(ch)) {
                break;
            }
            if ch == '%' {
                let hi = self.peek_at(1);
                let lo = self.peek_at(2);
                let (Some(hi), Some(lo)) = (hi, lo) else {
                    return Err(ScannerError::Problem {
                        context: "while parsing a tag",
                        context_mark: self.mark(),
                        problem: "did not find URI escape sequence",
                        problem_mark: self.mark(),
                    });
                };
                let byte = (hi.to_digit(16).zip(lo.to_digit(16)))
                    .map(|(h, l)| (h * 16 + l) as u8)
                    .ok_or(ScannerError::Problem {
                        context: "while parsing a tag",
                        context_mark: self.mark(),
                        problem: "did not find URI escape sequence",
                        problem_mark: self.mark(),
                    })?;
                uri.push(byte as char);
                self.skip();
                self.skip();
                self.skip();
            } else {
                uri.push(ch);
                self.skip();
            }
        }
        if uri.is_empty() {
            return Err(ScannerError::Problem {
                context: "while parsing a tag",
                context_mark: self.mark(),
                problem: "did not find expected tag URI",
                problem_mark: self.mark(),
            });
        }
        Ok(uri)
    }

    fn scan_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(ch) = self.peek() {
            if is_blankz(Some(ch)) {
                break;
            }
            word.push(ch);
            self.skip();
        }
        word
    }

    fn skip_blanks(&mut self) {
        while is_blank(self.peek()) {
            self.skip();
        }
    }

    fn fetch_document_indicator(&mut self, start: bool) -> Result<(), ScannerError> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let mark_start = self.mark();
        self.skip();
        self.skip();
        self.skip();
        let mark_end = self.mark();
        self.tokens.push_back(Token {
            data: if start {
                TokenData::DocumentStart
            } else {
                TokenData::DocumentEnd
            },
            start_mark: mark_start,
            end_mark: mark_end,
        });
        Ok(())
    }

    // ---- flow collections -----------------------------------------------------

    fn fetch_flow_collection_start(
        &mut self,
        kind: FlowKind,
        data: TokenData,
    ) -> Result<(), ScannerError> {
        self.save_simple_key()?;
        self.increase_flow_level(kind);
        self.simple_key_allowed = true;
        let start = self.mark();
        self.skip();
        let end = self.mark();
        self.tokens.push_back(Token {
            data,
            start_mark: start,
            end_mark: end,
        });
        Ok(())
    }

    fn fetch_flow_collection_end(
        &mut self,
        kind: FlowKind,
        data: TokenData,
    ) -> Result<(), ScannerError> {
        if self.json_force_active() && self.last_comma_mark.is_some() {
            return Err(ScannerError::Problem {
                context: "while scanning a flow collection",
                context_mark: self.mark(),
                problem: "JSON does not allow a trailing comma",
                problem_mark: self.mark(),
            });
        }
        let _ = kind;
        self.remove_simple_key()?;
        self.decrease_flow_level();
        self.simple_key_allowed = false;
        self.last_comma_mark = None;
        let start = self.mark();
        self.skip();
        let end = self.mark();
        self.tokens.push_back(Token {
            data,
            start_mark: start,
            end_mark: end,
        });
        Ok(())
    }

    fn fetch_flow_entry(&mut self) -> Result<(), ScannerError> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let start = self.mark();
        self.last_comma_mark = Some(start);
        self.skip();
        let end = self.mark();
        self.tokens.push_back(Token {
            data: TokenData::FlowEntry,
            start_mark: start,
            end_mark: end,
        });
        Ok(())
    }

    fn fetch_block_entry(&mut self) -> Result<(), ScannerError> {
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return Err(ScannerError::Problem {
                    context: "while scanning a block entry",
                    context_mark: self.mark(),
                    problem: "block sequence entries are not allowed here",
                    problem_mark: self.mark(),
                });
            }
            let column = self.current_column() as i64;
            self.roll_indent(column, None, self.mark());
        }
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let start = self.mark();
        self.skip();
        let end = self.mark();
        self.tokens.push_back(Token {
            data: TokenData::BlockEntry,
            start_mark: start,
            end_mark: end,
        });
        Ok(())
    }

    fn fetch_key(&mut self) -> Result<(), ScannerError> {
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return Err(ScannerError::Problem {
                    context: "while scanning a key",
                    context_mark: self.mark(),
                    problem: "mapping keys are not allowed here",
                    problem_mark: self.mark(),
                });
            }
            let column = self.current_column() as i64;
            let number = self.tokens_parsed + self.tokens.len();
            self.roll_indent(column, Some(number), self.mark());
        }
        self.remove_simple_key()?;
        self.simple_key_allowed = self.flow_level == 0;
        let start = self.mark();
        self.skip();
        let end = self.mark();
        self.tokens.push_back(Token {
            data: TokenData::Key,
            start_mark: start,
            end_mark: end,
        });
        Ok(())
    }

    fn fetch_value(&mut self) -> Result<(), ScannerError> {
        let flow_level = self.flow_level;
        let key = self.simple_keys.last().copied();
        if let Some(key) = key {
            if key.possible {
                let key_mark = key.mark;
                let insert_at = key.token_number - self.tokens_parsed;
                self.simple_keys.last_mut().unwrap().possible = false;
                self.simple_key_allowed = false;
                if flow_level == 0 {
                    let number = key.token_number;
                    self.roll_indent(key_mark.column as i64, Some(number), key_mark);
                }
                let start = self.mark();
                self.skip();
                let end = self.mark();
                self.tokens.insert(
                    insert_at,
                    Token {
                        data: TokenData::Key,
                        start_mark: key_mark,
                        end_mark: key_mark,
                    },
                );
                self.tokens.push_back(Token {
                    data: TokenData::Value,
                    start_mark: start,
                    end_mark: end,
                });
                return Ok(());
            }
        }
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return Err(ScannerError::Problem {
                    context: "while scanning a value",
                    context_mark: self.mark(),
                    problem: "mapping values are not allowed here",
                    problem_mark: self.mark(),
                });
            }
            let column = self.current_column() as i64;
            self.roll_indent(column, None, self.mark());
        }
        self.simple_key_allowed = self.flow_level == 0;
        let start = self.mark();
        self.skip();
        let end = self.mark();
        self.tokens.push_back(Token {
            data: TokenData::Value,
            start_mark: start,
            end_mark: end,
        });
        Ok(())
    }

    // ---- anchors, aliases, tags -------------------------------------------------

    fn fetch_anchor_or_alias(&mut self, is_alias: bool) -> Result<(), ScannerError> {
        if self.json_force_active() {
            return Err(ScannerError::Problem {
                context: "while scanning an anchor or alias",
                context_mark: self.mark(),
                problem: "JSON does not allow anchors or aliases",
                problem_mark: self.mark(),
            });
        }
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let start = self.mark();
        self.skip();
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if is_blankz(Some(ch)) || is_flow_indicator(Some(ch)) || matches!(ch, ',' | '[' | ']' | '{' | '}') {
                break;
            }
            name.push(ch);
            self.skip();
        }
        if name.is_empty() {
            return Err(ScannerError::Problem {
                context: "while scanning an anchor or alias",
                context_mark: start,
                problem: "did not find expected alphabetic or numeric character",
                problem_mark: self.mark(),
            });
        }
        let end = self.mark();
        self.tokens.push_back(Token {
            data: if is_alias {
                TokenData::Alias { value: name }
            } else {
                TokenData::Anchor { value: name }
            },
            start_mark: start,
            end_mark: end,
        });
        Ok(())
    }

    fn fetch_tag(&mut self) -> Result<(), ScannerError> {
        if self.json_force_active() {
            return Err(ScannerError::Problem {
                context: "while scanning a tag",
                context_mark: self.mark(),
                problem: "JSON does not allow tags",
                problem_mark: self.mark(),
            });
        }
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let start = self.mark();
        self.skip();
        let (handle, suffix) = if self.peek() == Some('<') {
            self.skip();
            let uri = self.scan_tag_uri()?;
            if self.peek() != Some('>') {
                return Err(ScannerError::Problem {
                    context: "while scanning a tag",
                    context_mark: start,
                    problem: "did not find the expected '>'",
                    problem_mark: self.mark(),
                });
            }
            self.skip();
            (String::new(), uri)
        } else if self.peek() == Some('!') {
            let handle = self.scan_tag_handle()?;
            let suffix = self.scan_tag_uri().unwrap_or_default();
            (handle, suffix)
        } else {
            let mut handle = String::from("!");
            let mut scanned_bang = false;
            let mut buf = String::new();
            while let Some(ch) = self.peek() {
                if is_blankz(Some(ch)) || is_flow_indicator(Some(ch)) {
                    break;
                }
                if ch == '!' && !scanned_bang {
                    handle = format!("!{buf}!");
                    buf.clear();
                    scanned_bang = true;
                    self.skip();
                    continue;
                }
                buf.push(ch);
                self.skip();
            }
            if !scanned_bang {
                handle = String::from("!");
                (handle, buf)
            } else {
                (handle, buf)
            }
        };
        let end = self.mark();
        self.tokens.push_back(Token {
            data: TokenData::Tag { handle, suffix },
            start_mark: start,
            end_mark: end,
        });
        Ok(())
    }

    // ---- block scalars ----------------------------------------------------------

    fn fetch_block_scalar(&mut self, folded: bool) -> Result<(), ScannerError> {
        if self.json_force_active() {
            return Err(ScannerError::Problem {
                context: "while scanning a block scalar",
                context_mark: self.mark(),
                problem: "JSON does not allow block scalars",
                problem_mark: self.mark(),
            });
        }
        self.save_simple_key()?;
        self.simple_key_allowed = true;
        let start = self.mark();
        self.skip();

        let mut chomping: i8 = 0; // -1 strip, 0 clip, 1 keep
        let mut increment: Option<i64> = None;
        for _ in 0..2 {
            match self.peek() {
                Some('+') => {
                    chomping = 1;
                    self.skip();
                }
                Some('-') => {
                    chomping = -1;
                    self.skip();
                }
                Some(ch) if ch.is_ascii_digit() && ch != '0' => {
                    increment = Some(ch.to_digit(10).unwrap() as i64);
                    self.skip();
                }
                _ => break,
            }
        }
        while is_blank(self.peek()) {
            self.skip();
        }
        if self.peek() == Some('#') {
            while !is_breakz(self.peek()) {
                self.skip();
            }
        }
        if !is_breakz(self.peek()) {
            return Err(ScannerError::Problem {
                context: "while scanning a block scalar",
                context_mark: start,
                problem: "did not find expected comment or line break",
                problem_mark: self.mark(),
            });
        }
        if is_break(self.peek()) {
            self.skip();
        }

        let parent_indent = if self.indent < 0 { 0 } else { self.indent };
        let mut block_indent: Option<i64> = increment.map(|n| parent_indent + n);
        let mut value = String::new();
        let mut trailing_breaks = String::new();
        let mut leading_blank = true;
        let mut end_mark = self.mark();

        loop {
            while is_break(self.peek()) {
                end_mark = self.mark();
                self.skip();
                trailing_breaks.push('\n');
            }
            let column = self.current_column() as i64;
            if block_indent.is_none() {
                if column > parent_indent || (self.peek().is_some() && is_blank(self.peek())) {
                    block_indent = Some(column.max(parent_indent + 1));
                } else {
                    break;
                }
            }
            let indent = block_indent.unwrap();
            if self.peek().is_none() {
                break;
            }
            if column < indent {
                break;
            }
            for _ in 0..(indent - column).max(0) {
                if self.peek() == Some(' ') {
                    self.skip();
                }
            }
            leading_blank = self.peek() == Some(' ') || self.peek() == Some('\t');
            if !trailing_breaks.is_empty() {
                if folded && !leading_blank && !value.is_empty() {
                    if trailing_breaks == "\n" {
                        value.push(' ');
                    } else {
                        value.push_str(&trailing_breaks[1..]);
                        value.push('\n');
                    }
                } else {
                    value.push_str(&trailing_breaks);
                }
                trailing_breaks.clear();
            }
            while !is_breakz(self.peek()) {
                if let Some(c) = self.peek() {
                    value.push(c);
                }
                end_mark = self.mark();
                self.skip();
            }
            let _ = leading_blank;
        }

        match chomping {
            -1 => {}
            0 => {
                if !value.is_empty() {
                    value.push('\n');
                }
            }
            1 => {
                value.push_str(&trailing_breaks);
                if !value.ends_with('\n') && !value.is_empty() {
                    value.push('\n');
                }
            }
            _ => unreachable!(),
        }

        self.tokens.push_back(Token {
            data: TokenData::Scalar {
                value,
                style: if folded {
                    ScalarStyle::Folded
                } else {
                    ScalarStyle::Literal
                },
            },
            start_mark: start,
            end_mark,
        });
        Ok(())
    }

    // ---- flow scalars -------------------------------------------------------------

    fn fetch_flow_scalar(&mut self, double: bool) -> Result<(), ScannerError> {
        if !double && self.json_force_active() {
            return Err(ScannerError::Problem {
                context: "while scanning a flow scalar",
                context_mark: self.mark(),
                problem: "JSON does not allow single-quoted scalars",
                problem_mark: self.mark(),
            });
        }
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let start = self.mark();
        let quote = if double { '"' } else { '\'' };
        self.skip();
        let mut value = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(ScannerError::Problem {
                        context: "while scanning a quoted scalar",
                        context_mark: start,
                        problem: "found unexpected end of stream",
                        problem_mark: self.mark(),
                    })
                }
                Some(ch) if ch == quote => {
                    if !double && self.peek_at(1) == Some('\'') {
                        value.push('\'');
                        self.skip();
                        self.skip();
                        continue;
                    }
                    self.skip();
                    break;
                }
                Some('\\') if double => {
                    self.skip();
                    self.scan_escape(&mut value)?;
                }
                Some(ch) if is_break(Some(ch)) => {
                    self.skip();
                    self.skip_blanks();
                    value.push(' ');
                }
                Some(ch) => {
                    value.push(ch);
                    self.skip();
                }
            }
        }
        let end = self.mark();
        self.tokens.push_back(Token {
            data: TokenData::Scalar {
                value,
                style: if double {
                    ScalarStyle::DoubleQuoted
                } else {
                    ScalarStyle::SingleQuoted
                },
            },
            start_mark: start,
            end_mark: end,
        });
        Ok(())
    }

    fn scan_escape(&mut self, out: &mut String) -> Result<(), ScannerError> {
        let escape_mark = self.mark();
        let Some(ch) = self.peek() else {
            return Err(ScannerError::Problem {
                context: "while parsing a quoted scalar",
                context_mark: escape_mark,
                problem: "found unexpected end of stream",
                problem_mark: escape_mark,
            });
        };
        let simple = match ch {
            '0' => Some('\0'),
            'a' => Some('\u{7}'),
            'b' => Some('\u{8}'),
            't' | '\t' => Some('\t'),
            'n' => Some('\n'),
            'v' => Some('\u{b}'),
            'f' => Some('\u{c}'),
            'r' => Some('\r'),
            'e' => Some('\u{1b}'),
            ' ' => Some(' '),
            '"' => Some('"'),
            '\'' => Some('\''),
            '\\' => Some('\\'),
            'N' => Some('\u{85}'),
            '_' => Some('\u{a0}'),
            'L' => Some('\u{2028}'),
            'P' => Some('\u{2029}'),
            _ => None,
        };
        if let Some(ch) = simple {
            out.push(ch);
            self.skip();
            return Ok(());
        }
        let width = match ch {
            'x' => 2,
            'u' => 4,
            'U' => 8,
            _ => {
                return Err(ScannerError::Problem {
                    context: "while parsing a quoted scalar",
                    context_mark: escape_mark,
                    problem: "found unknown escape character",
                    problem_mark: escape_mark,
                })
            }
        };
        self.skip();
        let mut value: u32 = 0;
        for _ in 0..width {
            let Some(digit) = self.peek().and_then(|c| c.to_digit(16)) else {
                return Err(ScannerError::Problem {
                    context: "while parsing a quoted scalar",
                    context_mark: escape_mark,
                    problem: "did not find expected hexadecimal number",
                    problem_mark: self.mark(),
                });
            };
            value = value * 16 + digit;
            self.skip();
        }
        if (0xD800..=0xDBFF).contains(&value) && self.peek() == Some('\\') && self.peek_at(1) == Some('u') {
            self.skip();
            self.skip();
            let mut low: u32 = 0;
            for _ in 0..4 {
                let Some(digit) = self.peek().and_then(|c| c.to_digit(16)) else {
                    return Err(ScannerError::Problem {
                        context: "while parsing a quoted scalar",
                        context_mark: escape_mark,
                        problem: "did not find expected hexadecimal number",
                        problem_mark: self.mark(),
                    });
                };
                low = low * 16 + digit;
                self.skip();
            }
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(ScannerError::Problem {
                    context: "while parsing a quoted scalar",
                    context_mark: escape_mark,
                    problem: "found an invalid low surrogate in escape sequence",
                    problem_mark: escape_mark,
                });
            }
            let codepoint = 0x10000 + ((value - 0xD800) << 10) + (low - 0xDC00);
            out.push(char::from_u32(codepoint).unwrap_or('\u{FFFD}'));
            return Ok(());
        }
        match char::from_u32(value) {
            Some(c) => out.push(c),
            None => {
                return Err(ScannerError::Problem {
                    context: "while parsing a quoted scalar",
                    context_mark: escape_mark,
                    problem: "found invalid Unicode character escape code",
                    problem_mark: escape_mark,
                })
            }
        }
        Ok(())
    }

    // ---- plain scalars --------------------------------------------------------------

    fn fetch_plain_scalar(&mut self) -> Result<(), ScannerError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let start = self.mark();
        let indent = self.indent + 1;
        let mut value = String::new();
        let mut trailing_breaks = String::new();
        let mut end_mark = start;
        loop {
            if self.peek() == Some('#') && matches!(self.prev_char(), Some(c) if is_blank(Some(c)) || is_break(Some(c))) {
                break;
            }
            loop {
                match self.peek() {
                    None => break,
                    Some(ch) if is_blankz(Some(ch)) => break,
                    Some(':') if self.flow_level > 0 && is_flow_indicator(self.peek_at(1)) => break,
                    Some(':') if is_blankz(self.peek_at(1)) => break,
                    Some(',') | Some('[') | Some(']') | Some('{') | Some('}') if self.flow_level > 0 => {
                        break
                    }
                    Some(ch) => {
                        if !is_printable(ch) {
                            return Err(ScannerError::Problem {
                                context: "while scanning a plain scalar",
                                context_mark: start,
                                problem: "found non-printable character",
                                problem_mark: self.mark(),
                            });
                        }
                        if !trailing_breaks.is_empty() {
                            if trailing_breaks == "\n" {
                                value.push(' ');
                            } else {
                                value.push_str(&trailing_breaks[1..]);
                                value.push('\n');
                            }
                            trailing_breaks.clear();
                        }
                        value.push(ch);
                        end_mark = self.mark();
                        self.skip();
                    }
                }
                if self.peek().is_none() || is_blankz(self.peek()) {
                    break;
                }
            }
            if self.peek().is_none() {
                break;
            }
            let mut found_break = false;
            loop {
                if is_blank(self.peek()) {
                    self.skip();
                } else if is_break(self.peek()) {
                    if !found_break {
                        trailing_breaks.clear();
                    }
                    found_break = true;
                    self.skip();
                    trailing_breaks.push('\n');
                } else {
                    break;
                }
            }
            if self.flow_level == 0 && (self.current_column() as i64) < indent {
                break;
            }
            if !found_break && value.is_empty() {
                break;
            }
            if !found_break {
                break;
            }
        }
        if self.json_force_active() {
            validate_json_plain_scalar(&value, start)?;
        }
        self.tokens.push_back(Token {
            data: TokenData::Scalar {
                value,
                style: ScalarStyle::Plain,
            },
            start_mark: start,
            end_mark,
        });
        Ok(())
    }

    fn prev_char(&mut self) -> Option<char> {
        self.last_char
    }
}

fn validate_json_plain_scalar(value: &str, mark: Mark) -> Result<(), ScannerError> {
    if matches!(value, "true" | "false" | "null") {
        return Ok(());
    }
    let mut chars = value.chars().peekable();
    if chars.peek() == Some(&'+') {
        return Err(ScannerError::Problem {
            context: "while scanning a JSON number",
            context_mark: mark,
            problem: "JSON does not allow a leading '+' in numbers",
            problem_mark: mark,
        });
    }
    if chars.peek() == Some(&'-') {
        chars.next();
    }
    let rest: String = chars.collect();
    let looks_numeric = !rest.is_empty()
        && rest
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !looks_numeric {
        return Err(ScannerError::Problem {
            context: "while scanning a JSON value",
            context_mark: mark,
            problem: "JSON requires true, false, null, or a number",
            problem_mark: mark,
        });
    }
    Ok(())
}
