//! Parser configuration and validation

use crate::dsv::sequence::Sequence;
use crate::error::{DsvError, Result};

/// Parser configuration (builder pattern)
///
/// All tokens are character sequences and may be longer than one character.
/// Defaults parse RFC 4180-like CSV: comma delimiter, LF row terminator,
/// double-quote quoting with doubled-quote escaping, no escape sequence and
/// permissive error handling.
///
/// # Examples
///
/// ```
/// use dsvstream::DsvOptions;
///
/// let options = DsvOptions::default()
///     .delimiter(";")
///     .newline("\r\n")
///     .comment("#")
///     .strict(true);
/// ```
#[derive(Debug, Clone)]
pub struct DsvOptions {
    delimiter: String,
    newline: String,
    quote: String,
    escape: Option<String>,
    comment: Option<String>,
    skip: Option<String>,
    quoting: bool,
    doublequote: bool,
    strict: bool,
}

impl Default for DsvOptions {
    fn default() -> Self {
        DsvOptions {
            delimiter: ",".to_string(),
            newline: "\n".to_string(),
            quote: "\"".to_string(),
            escape: None,
            comment: None,
            skip: None,
            quoting: true,
            doublequote: true,
            strict: false,
        }
    }
}

impl DsvOptions {
    /// Create options with the defaults described above
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field delimiter sequence (builder pattern)
    pub fn delimiter<S: Into<String>>(mut self, delimiter: S) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Set the row terminator sequence (builder pattern)
    pub fn newline<S: Into<String>>(mut self, newline: S) -> Self {
        self.newline = newline.into();
        self
    }

    /// Set the quote sequence (builder pattern)
    pub fn quote<S: Into<String>>(mut self, quote: S) -> Self {
        self.quote = quote.into();
        self
    }

    /// Enable escaping with the given escape sequence (builder pattern)
    ///
    /// Escaping is off by default; doubled quotes are then the only way to
    /// embed a literal quote in a quoted field.
    pub fn escape<S: Into<String>>(mut self, escape: S) -> Self {
        self.escape = Some(escape.into());
        self
    }

    /// Discard rows starting with this marker (builder pattern)
    pub fn comment<S: Into<String>>(mut self, marker: S) -> Self {
        self.comment = Some(marker.into());
        self
    }

    /// Route rows starting with this marker away from the regular output
    /// (builder pattern)
    pub fn skip<S: Into<String>>(mut self, marker: S) -> Self {
        self.skip = Some(marker.into());
        self
    }

    /// Whether quote sequences are interpreted at all (builder pattern)
    pub fn quoting(mut self, quoting: bool) -> Self {
        self.quoting = quoting;
        self
    }

    /// Whether a doubled quote inside a quoted field is a literal quote
    /// (`true`) or the escape sequence is required instead (`false`)
    pub fn doublequote(mut self, doublequote: bool) -> Self {
        self.doublequote = doublequote;
        self
    }

    /// Select the fatal-error policy (`true`) or the warn-and-recover
    /// policy (`false`)
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Validate the options and derive the sequence tables and exhaustion
    /// windows consumed by the state machine
    pub(crate) fn compile(&self) -> Result<DsvConfig> {
        let delimiter = required(&self.delimiter, "delimiter")?;
        let newline = required(&self.newline, "newline")?;
        let quote = required(&self.quote, "quote")?;

        if self.delimiter == self.newline {
            return Err(DsvError::ConfigError(
                "delimiter and newline must differ".to_string(),
            ));
        }
        if self.quoting && (self.quote == self.delimiter || self.quote == self.newline) {
            return Err(DsvError::ConfigError(
                "quote must differ from delimiter and newline".to_string(),
            ));
        }

        let escape = match &self.escape {
            Some(marker) => {
                if *marker == self.delimiter || *marker == self.newline {
                    return Err(DsvError::ConfigError(
                        "escape must differ from delimiter and newline".to_string(),
                    ));
                }
                if self.quoting && *marker == self.quote {
                    return Err(DsvError::ConfigError(
                        "escape must differ from quote".to_string(),
                    ));
                }
                Some(required(marker, "escape")?)
            }
            None => None,
        };
        if self.quoting && !self.doublequote && escape.is_none() {
            return Err(DsvError::ConfigError(
                "an escape sequence is required when doublequote is disabled".to_string(),
            ));
        }

        let comment = match &self.comment {
            Some(marker) => Some(required(marker, "comment")?),
            None => None,
        };
        let skip = match &self.skip {
            Some(marker) => Some(required(marker, "skip")?),
            None => None,
        };
        if let (Some(c), Some(s)) = (&self.comment, &self.skip) {
            if c == s {
                return Err(DsvError::ConfigError(
                    "comment and skip markers must differ".to_string(),
                ));
            }
        }

        // Exhaustion windows: a candidate escape or closing quote is
        // abandoned only once more characters have been examined than the
        // longest sequence that could still resolve it. The single max()
        // bound is conservative for sequences of very different lengths.
        let escape_len = escape.as_ref().map(|e| e.len()).unwrap_or(0);
        let escape_window = delimiter.len().max(newline.len()).max(escape_len);
        let quoted_escape_window = escape_len.max(quote.len());
        let quote_end_window = delimiter.len().max(newline.len()).max(quote.len());

        Ok(DsvConfig {
            delimiter,
            newline,
            quote,
            escape,
            comment,
            skip,
            quoting: self.quoting,
            doublequote: self.doublequote,
            strict: self.strict,
            escape_window,
            quoted_escape_window,
            quote_end_window,
        })
    }
}

fn required(token: &str, name: &str) -> Result<Sequence> {
    Sequence::new(token)
        .ok_or_else(|| DsvError::ConfigError(format!("{} must not be empty", name)))
}

/// Compiled configuration: sequence tables, flags and derived windows
#[derive(Debug, Clone)]
pub(crate) struct DsvConfig {
    pub(crate) delimiter: Sequence,
    pub(crate) newline: Sequence,
    pub(crate) quote: Sequence,
    pub(crate) escape: Option<Sequence>,
    pub(crate) comment: Option<Sequence>,
    pub(crate) skip: Option<Sequence>,
    pub(crate) quoting: bool,
    pub(crate) doublequote: bool,
    pub(crate) strict: bool,
    pub(crate) escape_window: usize,
    pub(crate) quoted_escape_window: usize,
    pub(crate) quote_end_window: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_compile() {
        let config = DsvOptions::default().compile().unwrap();
        assert_eq!(config.delimiter.len(), 1);
        assert!(config.escape.is_none());
        assert!(config.quoting);
        assert!(config.doublequote);
        assert!(!config.strict);
        assert_eq!(config.quote_end_window, 1);
    }

    #[test]
    fn test_windows_take_longest_sequence() {
        let config = DsvOptions::default()
            .delimiter("||")
            .newline("\r\n")
            .escape("\\")
            .compile()
            .unwrap();
        assert_eq!(config.escape_window, 2);
        assert_eq!(config.quote_end_window, 2);
        assert_eq!(config.quoted_escape_window, 1);
    }

    #[test]
    fn test_rejects_empty_sequences() {
        assert!(DsvOptions::default().delimiter("").compile().is_err());
        assert!(DsvOptions::default().newline("").compile().is_err());
        assert!(DsvOptions::default().escape("").compile().is_err());
        assert!(DsvOptions::default().comment("").compile().is_err());
    }

    #[test]
    fn test_rejects_conflicting_sequences() {
        assert!(DsvOptions::default().delimiter("\n").compile().is_err());
        assert!(DsvOptions::default().quote(",").compile().is_err());
        assert!(DsvOptions::default().escape(",").compile().is_err());
        assert!(DsvOptions::default()
            .comment("#")
            .skip("#")
            .compile()
            .is_err());
    }

    #[test]
    fn test_doublequote_off_requires_escape() {
        assert!(DsvOptions::default().doublequote(false).compile().is_err());
        assert!(DsvOptions::default()
            .doublequote(false)
            .escape("\\")
            .compile()
            .is_ok());
    }

    #[test]
    fn test_quote_conflict_ignored_without_quoting() {
        // with quoting off the quote sequence is inert and may collide
        let options = DsvOptions::default().quote(",").quoting(false);
        assert!(options.compile().is_ok());
    }
}
