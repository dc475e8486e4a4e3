//! Character-level DSV state machine
//!
//! The parser consumes one character at a time and dispatches on the active
//! [`State`]. Characters are speculatively pushed into a working buffer
//! before it is known whether they belong to a literal value or are the tail
//! of a special sequence; once a sequence is confirmed the buffer is rewound
//! by exactly the matched characters, so markers never leak into emitted
//! fields. All resumable context lives in the parser itself (buffer, cursor,
//! marks, state, diagnostics), which is what makes chunked feeding work
//! without any lookahead buffer.

use std::collections::VecDeque;

use log::{debug, trace};

use crate::dsv::options::{DsvConfig, DsvOptions};
use crate::dsv::sequence::Sequence;
use crate::dsv::state::State;
use crate::error::{DsvError, Result};
use crate::types::{Diagnostic, DiagnosticKind, Row};

/// Streaming DSV parser
///
/// Feed characters (or chunks) in input order, then signal end-of-input.
/// Completed rows queue up in arrival order and are drained with
/// [`next_row`](DsvParser::next_row).
///
/// # Examples
///
/// ```
/// use dsvstream::{DsvOptions, DsvParser};
///
/// let mut parser = DsvParser::new(DsvOptions::default()).unwrap();
/// parser.feed_str("a,\"b,c\"\n").unwrap();
/// parser.end().unwrap();
///
/// let row = parser.next_row().unwrap();
/// assert_eq!(row.fields, vec!["a", "b,c"]);
/// ```
#[derive(Debug)]
pub struct DsvParser {
    config: DsvConfig,
    state: State,

    // Working buffer for the current field. `mark` is the buffer index just
    // past a candidate escape marker or closing quote; `pending` counts the
    // characters examined since that candidate began.
    buf: Vec<char>,
    mark: usize,
    pending: usize,

    // Characters consumed since stream start
    cursor: u64,

    row: Vec<String>,
    ready: VecDeque<Row>,
    skipped: VecDeque<Row>,
    collect_skipped: bool,
    rows_emitted: u64,
    skipped_emitted: u64,

    warnings: Vec<Diagnostic>,
    error: Option<Diagnostic>,
}

impl DsvParser {
    /// Create a parser from validated options
    pub fn new(options: DsvOptions) -> Result<Self> {
        let config = options.compile()?;
        Ok(DsvParser {
            config,
            state: State::Init,
            buf: Vec::new(),
            mark: 0,
            pending: 0,
            cursor: 0,
            row: Vec::new(),
            ready: VecDeque::new(),
            skipped: VecDeque::new(),
            collect_skipped: false,
            rows_emitted: 0,
            skipped_emitted: 0,
            warnings: Vec::new(),
            error: None,
        })
    }

    /// Process one character
    ///
    /// May complete any number of fields and rows. In strict mode the first
    /// ambiguous construct is fatal: the call returns the diagnostic as an
    /// error and the parser stays in its terminal error state.
    pub fn feed(&mut self, ch: char) -> Result<()> {
        if let Some(diagnostic) = self.error {
            return Err(DsvError::ParseError(diagnostic));
        }
        if self.state == State::Closed {
            return Err(DsvError::Closed);
        }
        self.cursor += 1;
        self.dispatch(ch)
    }

    /// Drain a chunk character-by-character
    ///
    /// Chunk boundaries are invisible to the machine: feeding a stream one
    /// character, one line or one megabyte at a time yields identical rows
    /// and diagnostics.
    pub fn feed_str(&mut self, chunk: &str) -> Result<()> {
        for ch in chunk.chars() {
            self.feed(ch)?;
        }
        Ok(())
    }

    /// Signal end-of-input, flushing any pending partial field or row
    ///
    /// Idempotent once the parser is closed.
    pub fn end(&mut self) -> Result<()> {
        if let Some(diagnostic) = self.error {
            return Err(DsvError::ParseError(diagnostic));
        }
        if self.state == State::Closed {
            return Ok(());
        }
        self.finish()
    }

    /// Pop the oldest completed row, if any
    pub fn next_row(&mut self) -> Option<Row> {
        self.ready.pop_front()
    }

    /// Drain all completed rows in input order
    pub fn drain_rows(&mut self) -> impl Iterator<Item = Row> + '_ {
        self.ready.drain(..)
    }

    /// Retain rows discarded by the skip marker so they can be read back
    /// with [`next_skipped_row`](DsvParser::next_skipped_row)
    pub fn collect_skipped_rows(&mut self, collect: bool) {
        self.collect_skipped = collect;
    }

    /// Pop the oldest skip-marked row, if retention is enabled
    pub fn next_skipped_row(&mut self) -> Option<Row> {
        self.skipped.pop_front()
    }

    /// Non-fatal diagnostics accumulated so far, in detection order
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Take ownership of the accumulated diagnostics
    pub fn take_warnings(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.warnings)
    }

    /// The terminal diagnostic, when the parser is in its error state
    pub fn error_state(&self) -> Option<&Diagnostic> {
        self.error.as_ref()
    }

    /// The active machine state
    pub fn state(&self) -> State {
        self.state
    }

    /// Characters consumed since stream start
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Whether end-of-input has been signalled
    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    // ---- dispatch ----------------------------------------------------

    fn dispatch(&mut self, ch: char) -> Result<()> {
        match self.state {
            State::Init => {
                self.change_state(State::Field);
                self.on_field(ch, false)
            }
            State::Skip => {
                self.change_state(State::SkippedField);
                self.on_field(ch, true)
            }
            State::Field => self.on_field(ch, false),
            State::SkippedField => self.on_field(ch, true),
            State::QuotedField => self.on_quoted_field(ch, false),
            State::SkippedQuotedField => self.on_quoted_field(ch, true),
            State::QuoteEnd => self.on_quote_end(ch, false),
            State::SkippedQuoteEnd => self.on_quote_end(ch, true),
            State::InvalidQuoteEnd => self.on_invalid_quote_end(ch, false),
            State::SkippedInvalidQuoteEnd => self.on_invalid_quote_end(ch, true),
            State::Escape => self.on_escape(ch, false),
            State::SkippedEscape => self.on_escape(ch, true),
            State::QuotedEscape => self.on_quoted_escape(ch, false),
            State::SkippedQuotedEscape => self.on_quoted_escape(ch, true),
            State::Comment | State::SkippedComment => {
                self.on_comment(ch);
                Ok(())
            }
            State::Error | State::Closed => unreachable!("terminal states are guarded in feed"),
        }
    }

    // ---- state handlers ----------------------------------------------

    /// Unquoted field content. Also hosts row-start concerns (comment and
    /// skip markers) and the quoting eligibility check, since `Init`
    /// delegates here after noting the row boundary.
    fn on_field(&mut self, ch: char, skipped: bool) -> Result<()> {
        self.push(ch);

        // comment and skip markers only carry meaning as the very first
        // characters of a row
        if self.row.is_empty() {
            if let Some(comment) = &self.config.comment {
                if self.buf.len() == comment.len() && comment.is_suffix_of(&self.buf) {
                    self.buf.clear();
                    self.change_state(State::Comment.for_row(skipped));
                    return Ok(());
                }
            }
            if !skipped {
                if let Some(skip) = &self.config.skip {
                    if self.buf.len() == skip.len() && skip.is_suffix_of(&self.buf) {
                        self.buf.clear();
                        self.change_state(State::Skip);
                        return Ok(());
                    }
                }
            }
        }

        // a quote sequence only opens a quoted field when it leads the
        // field; in permissive mode leading whitespace is tolerated but
        // flagged, anywhere else the quote is ordinary text
        if self.config.quoting && self.ends_with(&self.config.quote) {
            let lead = self.buf.len() - self.config.quote.len();
            if lead == 0 {
                self.rewind(self.config.quote.len());
                self.change_state(State::QuotedField.for_row(skipped));
                return Ok(());
            }
            if !self.config.strict && self.is_whitespace(0, lead) {
                self.warn(DiagnosticKind::InvalidOpeningQuote);
                self.buf.clear();
                self.change_state(State::QuotedField.for_row(skipped));
                return Ok(());
            }
        }

        if self.ends_with_escape() {
            self.mark = self.buf.len();
            self.pending = 0;
            self.change_state(State::Escape.for_row(skipped));
            return Ok(());
        }

        if self.ends_with(&self.config.delimiter) {
            self.rewind(self.config.delimiter.len());
            self.emit_field();
            self.change_state(State::Field.for_row(skipped));
            return Ok(());
        }

        if self.ends_with(&self.config.newline) {
            self.rewind(self.config.newline.len());
            self.finish_row(skipped);
        }

        Ok(())
    }

    /// Quoted field content: delimiters and row terminators lose their
    /// meaning here
    fn on_quoted_field(&mut self, ch: char, skipped: bool) -> Result<()> {
        self.push(ch);

        if self.ends_with(&self.config.quote) {
            // candidate closing quote: strip it and wait for confirmation
            self.rewind(self.config.quote.len());
            self.mark = self.buf.len();
            self.pending = 0;
            self.change_state(State::QuoteEnd.for_row(skipped));
            return Ok(());
        }

        if !self.config.doublequote && self.ends_with_escape() {
            self.mark = self.buf.len();
            self.pending = 0;
            self.change_state(State::QuotedEscape.for_row(skipped));
        }

        Ok(())
    }

    /// Candidate end of a quoted field: resolved by a doubled quote, a
    /// delimiter, a row terminator, or exhaustion
    fn on_quote_end(&mut self, ch: char, skipped: bool) -> Result<()> {
        self.push(ch);
        self.pending += 1;

        if self.config.doublequote
            && self.pending == self.config.quote.len()
            && self.ends_with(&self.config.quote)
        {
            // doubled quote: the freshly buffered sequence is the literal
            self.change_state(State::QuotedField.for_row(skipped));
            return Ok(());
        }

        if self.pending == self.config.delimiter.len() && self.ends_with(&self.config.delimiter) {
            self.rewind(self.config.delimiter.len());
            self.emit_field();
            self.change_state(State::Field.for_row(skipped));
            return Ok(());
        }

        if self.pending == self.config.newline.len() && self.ends_with(&self.config.newline) {
            self.rewind(self.config.newline.len());
            self.emit_field();
            self.emit_row(skipped);
            self.change_state(State::Init);
            return Ok(());
        }

        if self.pending >= self.config.quote_end_window {
            if self.config.strict && !skipped {
                return Err(self.fail(DiagnosticKind::InvalidClosingQuote));
            }
            self.change_state(State::InvalidQuoteEnd.for_row(skipped));
        }

        Ok(())
    }

    /// Trailing characters after a closing quote that did not resolve
    /// cleanly; scans forward for the next delimiter or row terminator
    fn on_invalid_quote_end(&mut self, ch: char, skipped: bool) -> Result<()> {
        self.push(ch);

        if self.ends_with(&self.config.delimiter) {
            self.resolve_trailing(self.config.delimiter.len());
            self.emit_field();
            self.change_state(State::Field.for_row(skipped));
            return Ok(());
        }

        if self.ends_with(&self.config.newline) {
            self.resolve_trailing(self.config.newline.len());
            self.emit_field();
            self.emit_row(skipped);
            self.change_state(State::Init);
        }

        Ok(())
    }

    /// Escape marker in unquoted content: the next confirmed delimiter,
    /// row terminator or escape sequence becomes literal text
    fn on_escape(&mut self, ch: char, skipped: bool) -> Result<()> {
        self.push(ch);
        self.pending += 1;

        let escape_len = self.escape_len();

        if self.pending == escape_len && self.ends_with_escape() {
            self.strip_marker(escape_len);
            self.change_state(State::Field.for_row(skipped));
            return Ok(());
        }

        if self.pending == self.config.delimiter.len() && self.ends_with(&self.config.delimiter) {
            self.strip_marker(escape_len);
            self.change_state(State::Field.for_row(skipped));
            return Ok(());
        }

        if self.pending == self.config.newline.len() && self.ends_with(&self.config.newline) {
            self.strip_marker(escape_len);
            self.change_state(State::Field.for_row(skipped));
            return Ok(());
        }

        if self.pending >= self.config.escape_window {
            self.exhaust(DiagnosticKind::InvalidEscape, skipped)?;
            // the marker and everything after it stay as literal text
            self.change_state(State::Field.for_row(skipped));
        }

        Ok(())
    }

    /// Escape marker inside a quoted field: only a quote sequence may
    /// follow
    fn on_quoted_escape(&mut self, ch: char, skipped: bool) -> Result<()> {
        self.push(ch);
        self.pending += 1;

        if self.pending == self.config.quote.len() && self.ends_with(&self.config.quote) {
            self.strip_marker(self.escape_len());
            self.change_state(State::QuotedField.for_row(skipped));
            return Ok(());
        }

        if self.pending >= self.config.quoted_escape_window {
            self.exhaust(DiagnosticKind::InvalidQuotedEscape, skipped)?;
            self.change_state(State::QuotedField.for_row(skipped));
        }

        Ok(())
    }

    /// Comment row: buffered and thrown away at the row terminator
    fn on_comment(&mut self, ch: char) {
        self.push(ch);
        if self.ends_with(&self.config.newline) {
            self.buf.clear();
            self.change_state(State::Init);
        }
    }

    // ---- end-of-input ------------------------------------------------

    fn finish(&mut self) -> Result<()> {
        let skipped = self.state.in_skipped_row();
        match self.state {
            State::Init | State::Skip => {}
            State::Comment | State::SkippedComment => self.buf.clear(),
            State::Field | State::SkippedField => {
                if !(self.row.is_empty() && self.buf.is_empty()) {
                    self.emit_field();
                    self.emit_row(skipped);
                }
            }
            // an unterminated quoted field is emitted as accumulated
            State::QuotedField | State::SkippedQuotedField => {
                self.emit_field();
                self.emit_row(skipped);
            }
            State::Escape | State::SkippedEscape => {
                self.exhaust(DiagnosticKind::InvalidEscape, skipped)?;
                self.emit_field();
                self.emit_row(skipped);
            }
            State::QuotedEscape | State::SkippedQuotedEscape => {
                self.exhaust(DiagnosticKind::InvalidQuotedEscape, skipped)?;
                self.emit_field();
                self.emit_row(skipped);
            }
            State::QuoteEnd | State::SkippedQuoteEnd => {
                if self.pending > 0 {
                    self.exhaust(DiagnosticKind::InvalidClosingQuote, skipped)?;
                    self.drop_inert_trailing();
                }
                self.emit_field();
                self.emit_row(skipped);
            }
            State::InvalidQuoteEnd | State::SkippedInvalidQuoteEnd => {
                self.warn(DiagnosticKind::InvalidClosingQuote);
                self.drop_inert_trailing();
                self.emit_field();
                self.emit_row(skipped);
            }
            State::Error | State::Closed => unreachable!("terminal states are guarded in end"),
        }
        self.change_state(State::Closed);
        Ok(())
    }

    // ---- cursor/buffer engine ----------------------------------------

    #[inline]
    fn push(&mut self, ch: char) {
        self.buf.push(ch);
    }

    /// Delete the last `n` buffered characters. Only ever called with the
    /// length of a sequence just confirmed against the buffer tail.
    #[inline]
    fn rewind(&mut self, n: usize) {
        let len = self.buf.len();
        self.buf.truncate(len - n);
    }

    /// Strip a confirmed escape marker of `width` characters ending at
    /// `mark`, shifting the escaped literal down over it
    fn strip_marker(&mut self, width: usize) {
        let start = self.mark;
        self.buf.copy_within(start.., start - width);
        let len = self.buf.len();
        self.buf.truncate(len - width);
    }

    fn change_state(&mut self, next: State) {
        trace!("{} -> {} (char {})", self.state, next, self.cursor);
        self.state = next;
    }

    fn is_whitespace(&self, start: usize, end: usize) -> bool {
        self.buf[start..end].iter().all(|c| c.is_whitespace())
    }

    #[inline]
    fn ends_with(&self, seq: &Sequence) -> bool {
        seq.is_suffix_of(&self.buf)
    }

    #[inline]
    fn ends_with_escape(&self) -> bool {
        match &self.config.escape {
            Some(escape) => escape.is_suffix_of(&self.buf),
            None => false,
        }
    }

    #[inline]
    fn escape_len(&self) -> usize {
        self.config.escape.as_ref().map(Sequence::len).unwrap_or(0)
    }

    // ---- emission ----------------------------------------------------

    fn emit_field(&mut self) {
        let field: String = self.buf.iter().collect();
        self.buf.clear();
        self.row.push(field);
    }

    fn emit_row(&mut self, skipped: bool) {
        let fields = std::mem::take(&mut self.row);
        if skipped {
            if self.collect_skipped {
                self.skipped.push_back(Row::new(self.skipped_emitted, fields));
                self.skipped_emitted += 1;
            }
        } else {
            self.ready.push_back(Row::new(self.rows_emitted, fields));
            self.rows_emitted += 1;
        }
    }

    /// Row terminator recognized in unquoted content. Rows with no fields
    /// and no buffered text are blank and consumed without emission.
    fn finish_row(&mut self, skipped: bool) {
        if self.row.is_empty() && self.buf.is_empty() {
            self.change_state(State::Init);
            return;
        }
        self.emit_field();
        self.emit_row(skipped);
        self.change_state(State::Init);
    }

    /// Trailing characters between a closing quote and the next structural
    /// token: inert whitespace is dropped, anything else stays literal
    fn resolve_trailing(&mut self, token_len: usize) {
        self.warn(DiagnosticKind::InvalidClosingQuote);
        let trailing_end = self.buf.len() - token_len;
        if self.is_whitespace(self.mark, trailing_end) {
            self.rewind(token_len + (trailing_end - self.mark));
        } else {
            self.rewind(token_len);
        }
    }

    /// End-of-input variant of [`resolve_trailing`](Self::resolve_trailing)
    /// with no structural token to account for
    fn drop_inert_trailing(&mut self) {
        let end = self.buf.len();
        if self.is_whitespace(self.mark, end) {
            self.rewind(end - self.mark);
        }
    }

    // ---- diagnostics -------------------------------------------------

    fn warn(&mut self, kind: DiagnosticKind) {
        debug!("{} at char {}", kind, self.cursor);
        self.warnings.push(Diagnostic {
            kind,
            position: self.cursor,
        });
    }

    fn fail(&mut self, kind: DiagnosticKind) -> DsvError {
        let diagnostic = Diagnostic {
            kind,
            position: self.cursor,
        };
        debug!("fatal: {}", diagnostic);
        self.error = Some(diagnostic);
        self.change_state(State::Error);
        DsvError::ParseError(diagnostic)
    }

    /// The uniform exhaustion rule: fatal in strict mode, a warning
    /// otherwise. Skip-marked rows never raise hard errors.
    fn exhaust(&mut self, kind: DiagnosticKind, skipped: bool) -> Result<()> {
        if self.config.strict && !skipped {
            Err(self.fail(kind))
        } else {
            self.warn(kind);
            Ok(())
        }
    }
}
