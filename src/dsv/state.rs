//! Parser state tags

use std::fmt;

/// The active state of the character-level machine.
///
/// `Init` is the state at every row boundary. `Error` and `Closed` are
/// terminal: `Error` is only reachable in strict mode, `Closed` only by
/// signalling end-of-input. The `Skipped*` family mirrors the regular
/// states for rows marked by the skip sequence; mirrored rows follow the
/// same transitions but never raise hard errors and are routed away from
/// the regular output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Start of a row
    Init,
    /// Accumulating unquoted field text
    Field,
    /// Accumulating quoted field text
    QuotedField,
    /// Candidate end of a quoted field
    QuoteEnd,
    /// Trailing characters after a quote that did not resolve
    InvalidQuoteEnd,
    /// Escape marker seen in an unquoted field
    Escape,
    /// Escape marker seen inside a quoted field
    QuotedEscape,
    /// Discarding a comment row
    Comment,
    /// Start of a row marked by the skip sequence
    Skip,
    /// `Field`, within a skipped row
    SkippedField,
    /// `QuotedField`, within a skipped row
    SkippedQuotedField,
    /// `QuoteEnd`, within a skipped row
    SkippedQuoteEnd,
    /// `InvalidQuoteEnd`, within a skipped row
    SkippedInvalidQuoteEnd,
    /// `Escape`, within a skipped row
    SkippedEscape,
    /// `QuotedEscape`, within a skipped row
    SkippedQuotedEscape,
    /// `Comment`, within a skipped row
    SkippedComment,
    /// Terminal: a fatal diagnostic was raised in strict mode
    Error,
    /// Terminal: end-of-input was signalled
    Closed,
}

impl State {
    /// Map a regular state to its skipped-row mirror when `skipped` is set
    pub(crate) fn for_row(self, skipped: bool) -> State {
        if !skipped {
            return self;
        }
        match self {
            State::Field => State::SkippedField,
            State::QuotedField => State::SkippedQuotedField,
            State::QuoteEnd => State::SkippedQuoteEnd,
            State::InvalidQuoteEnd => State::SkippedInvalidQuoteEnd,
            State::Escape => State::SkippedEscape,
            State::QuotedEscape => State::SkippedQuotedEscape,
            State::Comment => State::SkippedComment,
            other => other,
        }
    }

    /// Whether the machine is currently inside a skip-marked row
    pub(crate) fn in_skipped_row(self) -> bool {
        matches!(
            self,
            State::Skip
                | State::SkippedField
                | State::SkippedQuotedField
                | State::SkippedQuoteEnd
                | State::SkippedInvalidQuoteEnd
                | State::SkippedEscape
                | State::SkippedQuotedEscape
                | State::SkippedComment
        )
    }

    /// Whether no further input will be accepted
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Error | State::Closed)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Init => "init",
            State::Field => "field",
            State::QuotedField => "quoted_field",
            State::QuoteEnd => "quote_end",
            State::InvalidQuoteEnd => "invalid_quote_end",
            State::Escape => "escape",
            State::QuotedEscape => "quoted_escape",
            State::Comment => "comment",
            State::Skip => "skip",
            State::SkippedField => "skipped_field",
            State::SkippedQuotedField => "skipped_quoted_field",
            State::SkippedQuoteEnd => "skipped_quote_end",
            State::SkippedInvalidQuoteEnd => "skipped_invalid_quote_end",
            State::SkippedEscape => "skipped_escape",
            State::SkippedQuotedEscape => "skipped_quoted_escape",
            State::SkippedComment => "skipped_comment",
            State::Error => "error",
            State::Closed => "closed",
        };
        write!(f, "{}", name)
    }
}
