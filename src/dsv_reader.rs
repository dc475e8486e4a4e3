//! DSV stream reading over any byte source
//!
//! Wraps a [`DsvParser`] around an [`std::io::Read`], pulling bytes in
//! chunks, decoding UTF-8 incrementally and handing back completed rows.

use crate::dsv::{DsvOptions, DsvParser};
use crate::error::{DsvError, Result};
use crate::types::{Diagnostic, Row};
use indexmap::IndexMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const CHUNK_SIZE: usize = 8 * 1024;

/// Streaming DSV reader with constant memory usage
///
/// Reads rows one at a time using an iterator pattern. Any `Read`
/// implementor works as a source; chunk boundaries (including ones that
/// split a UTF-8 code point) are handled internally.
///
/// # Examples
///
/// ```no_run
/// use dsvstream::DsvReader;
///
/// let mut reader = DsvReader::open("data.csv").unwrap();
///
/// for row_result in reader.rows() {
///     let row = row_result.unwrap();
///     println!("{:?}", row.fields);
/// }
/// ```
///
/// # With Headers
///
/// ```no_run
/// use dsvstream::DsvReader;
///
/// let mut reader = DsvReader::open("data.csv")
///     .unwrap()
///     .has_header(true);
///
/// while let Some(row) = reader.read_row().unwrap() {
///     // header row already consumed
///     let name = reader.column_index("name").and_then(|i| row.get(i));
///     println!("{:?}", name);
/// }
/// ```
pub struct DsvReader<R: Read> {
    source: R,

    // Parser is built from the options on first read so the builder
    // methods stay chainable
    options: DsvOptions,
    parser: Option<DsvParser>,

    chunk: Vec<u8>,
    carry: Vec<u8>,
    eof: bool,

    has_header: bool,
    headers: Vec<String>,
    header_index: IndexMap<String, usize>,
    row_count: u64,
}

impl DsvReader<File> {
    /// Open a DSV file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .map_err(|e| DsvError::ReadError(format!("Failed to open DSV file: {}", e)))?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> DsvReader<R> {
    /// Wrap any byte source
    pub fn from_reader(source: R) -> Self {
        DsvReader {
            source,
            options: DsvOptions::default(),
            parser: None,
            chunk: vec![0; CHUNK_SIZE],
            carry: Vec::new(),
            eof: false,
            has_header: false,
            headers: Vec::new(),
            header_index: IndexMap::new(),
            row_count: 0,
        }
    }

    /// Replace the parser configuration (builder pattern)
    pub fn options(mut self, options: DsvOptions) -> Self {
        self.options = options;
        self
    }

    /// Indicate that the first row contains headers (builder pattern)
    ///
    /// The header row is stored and accessible via `headers()`; it is not
    /// yielded as a data row.
    pub fn has_header(mut self, has: bool) -> Self {
        self.has_header = has;
        self
    }

    /// Get the header row if it has been read
    pub fn headers(&self) -> Option<&[String]> {
        if self.headers.is_empty() {
            None
        } else {
            Some(&self.headers)
        }
    }

    /// Look up a column position by header name
    ///
    /// Duplicate header names resolve to the first occurrence.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header_index.get(name).copied()
    }

    /// Non-fatal diagnostics accumulated so far
    pub fn warnings(&self) -> &[Diagnostic] {
        self.parser.as_ref().map(|p| p.warnings()).unwrap_or(&[])
    }

    /// Number of data rows returned so far
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    /// Read a single row
    ///
    /// Returns `Ok(None)` when the source is exhausted.
    pub fn read_row(&mut self) -> Result<Option<Row>> {
        if self.parser.is_none() {
            self.parser = Some(DsvParser::new(self.options.clone())?);
        }
        loop {
            if let Some(parser) = self.parser.as_mut() {
                if let Some(row) = parser.next_row() {
                    if self.has_header && self.headers.is_empty() {
                        for (i, name) in row.fields.iter().enumerate() {
                            self.header_index.entry(name.clone()).or_insert(i);
                        }
                        self.headers = row.into_fields();
                        continue;
                    }
                    self.row_count += 1;
                    return Ok(Some(row));
                }
            }
            if self.eof {
                return Ok(None);
            }
            self.fill()?;
        }
    }

    /// Get an iterator over rows
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dsvstream::DsvReader;
    ///
    /// let mut reader = DsvReader::open("data.csv").unwrap();
    ///
    /// for row_result in reader.rows() {
    ///     let row = row_result.unwrap();
    ///     println!("{:?}", row.fields);
    /// }
    /// ```
    pub fn rows(&mut self) -> DsvRowIterator<'_, R> {
        DsvRowIterator { reader: self }
    }

    /// Pull one chunk from the source and run it through the parser
    fn fill(&mut self) -> Result<()> {
        let parser = match self.parser.as_mut() {
            Some(parser) => parser,
            None => return Ok(()),
        };

        let n = self
            .source
            .read(&mut self.chunk)
            .map_err(|e| DsvError::ReadError(format!("Failed to read DSV stream: {}", e)))?;

        if n == 0 {
            if !self.carry.is_empty() {
                return Err(DsvError::ReadError(
                    "stream ends with an incomplete UTF-8 sequence".to_string(),
                ));
            }
            parser.end()?;
            self.eof = true;
            return Ok(());
        }

        self.carry.extend_from_slice(&self.chunk[..n]);

        // decode as much as possible; an incomplete code point at the tail
        // is carried into the next read
        let valid = match std::str::from_utf8(&self.carry) {
            Ok(_) => self.carry.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => {
                return Err(DsvError::ReadError(format!(
                    "invalid UTF-8 in DSV stream: {}",
                    e
                )))
            }
        };
        if valid > 0 {
            let text = std::str::from_utf8(&self.carry[..valid])
                .map_err(|e| DsvError::ReadError(e.to_string()))?;
            parser.feed_str(text)?;
            self.carry.drain(..valid);
        }
        Ok(())
    }
}

/// Iterator over DSV rows
pub struct DsvRowIterator<'a, R: Read> {
    reader: &'a mut DsvReader<R>,
}

impl<'a, R: Read> Iterator for DsvRowIterator<'a, R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
