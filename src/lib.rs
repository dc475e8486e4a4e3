//! # dsvstream
//!
//! Streaming delimiter-separated-value (DSV) parsing built around an
//! explicit character-level state machine.
//!
//! Delimiter, row terminator, quote, escape, comment and skip tokens are
//! all configurable and may be longer than one character. Ambiguous input
//! is handled by a single uniform policy: fatal in strict mode, recorded
//! as a warning and reinterpreted as literal text in permissive mode.
//!
//! ## Parsing in-memory text
//!
//! ```
//! use dsvstream::{DsvOptions, DsvParser};
//!
//! let mut parser = DsvParser::new(DsvOptions::default()).unwrap();
//! parser.feed_str("name,city\nAlice,\"NYC, NY\"\n").unwrap();
//! parser.end().unwrap();
//!
//! assert_eq!(parser.next_row().unwrap().fields, vec!["name", "city"]);
//! assert_eq!(parser.next_row().unwrap().fields, vec!["Alice", "NYC, NY"]);
//! ```
//!
//! ## Streaming from a file
//!
//! ```no_run
//! use dsvstream::{DsvOptions, DsvReader};
//!
//! let mut reader = DsvReader::open("data.tsv")
//!     .unwrap()
//!     .options(DsvOptions::default().delimiter("\t"))
//!     .has_header(true);
//!
//! for row_result in reader.rows() {
//!     let row = row_result.unwrap();
//!     println!("{:?}", row.fields);
//! }
//! ```
//!
//! ## Chunked input
//!
//! The parser is the entire resumable context: feed chunk N, hand control
//! back to your event loop, resume with chunk N+1. Rows and diagnostics
//! come out identical no matter where the chunk boundaries fall.
//!
//! ```
//! use dsvstream::{DsvOptions, DsvParser};
//!
//! let mut parser = DsvParser::new(DsvOptions::default()).unwrap();
//! parser.feed_str("a,\"b").unwrap();
//! parser.feed_str(",c\"\n").unwrap();
//! parser.end().unwrap();
//! assert_eq!(parser.next_row().unwrap().fields, vec!["a", "b,c"]);
//! ```

pub mod dsv;
pub mod dsv_reader;
pub mod error;
pub mod types;

pub use dsv::{DsvOptions, DsvParser, State};
pub use dsv_reader::{DsvReader, DsvRowIterator};
pub use error::{DsvError, Result};
pub use types::{Diagnostic, DiagnosticKind, Row};
