//! Integration tests for dsvstream

use dsvstream::{DiagnosticKind, DsvError, DsvOptions, DsvParser, DsvReader};
use std::io::Write;
use tempfile::NamedTempFile;

fn parse_all(options: DsvOptions, input: &str) -> Vec<Vec<String>> {
    let mut parser = DsvParser::new(options).unwrap();
    parser.feed_str(input).unwrap();
    parser.end().unwrap();
    parser.drain_rows().map(|r| r.fields).collect()
}

/// Minimal quoting encoder used to exercise round-trips; the crate itself
/// only parses.
fn encode_row(fields: &[&str], delimiter: char, quote: char) -> String {
    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        let needs_quoting = field
            .chars()
            .any(|c| c == delimiter || c == quote || c == '\n' || c == '\r');
        if needs_quoting {
            out.push(quote);
            for c in field.chars() {
                if c == quote {
                    out.push(quote);
                    out.push(quote);
                } else {
                    out.push(c);
                }
            }
            out.push(quote);
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
    out
}

#[test]
fn test_basic_delimited_row() {
    assert_eq!(
        parse_all(DsvOptions::default(), "a,b,c\n"),
        vec![vec!["a", "b", "c"]]
    );
}

#[test]
fn test_quoted_field_keeps_delimiter() {
    assert_eq!(
        parse_all(DsvOptions::default(), "\"a,b\",c\n"),
        vec![vec!["a,b", "c"]]
    );
}

#[test]
fn test_escaped_delimiter() {
    let options = DsvOptions::default().escape("\\");
    assert_eq!(
        parse_all(options, "a\\,b,c\n"),
        vec![vec!["a,b", "c"]]
    );
}

#[test]
fn test_doubled_quote_literal() {
    assert_eq!(
        parse_all(DsvOptions::default(), "\"a\"\"b\",c\n"),
        vec![vec!["a\"b", "c"]]
    );
}

#[test]
fn test_comment_row_fully_discarded() {
    let options = DsvOptions::default().comment("#");
    let mut parser = DsvParser::new(options).unwrap();
    parser.feed_str("#skip this\na,b\n").unwrap();
    parser.end().unwrap();
    let rows: Vec<_> = parser.drain_rows().map(|r| r.fields).collect();
    assert_eq!(rows, vec![vec!["a", "b"]]);
    assert!(parser.warnings().is_empty());
}

#[test]
fn test_ambiguous_quote_strict_vs_permissive() {
    let strict = DsvOptions::default().strict(true);
    let mut parser = DsvParser::new(strict).unwrap();
    let err = parser.feed_str("\"a\"x,b\n").unwrap_err();
    match err {
        DsvError::ParseError(diagnostic) => {
            assert_eq!(diagnostic.kind, DiagnosticKind::InvalidClosingQuote);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(parser.error_state().is_some());

    let mut parser = DsvParser::new(DsvOptions::default()).unwrap();
    parser.feed_str("\"a\"x,b\n").unwrap();
    parser.end().unwrap();
    let rows: Vec<_> = parser.drain_rows().map(|r| r.fields).collect();
    assert_eq!(rows, vec![vec!["ax", "b"]]);
    assert_eq!(parser.warnings().len(), 1);
    assert_eq!(
        parser.warnings()[0].kind,
        DiagnosticKind::InvalidClosingQuote
    );
}

#[test]
fn test_quoting_roundtrip() {
    let fields = ["plain", "with,comma", "with\"quote", "with\nnewline", ""];
    let encoded = encode_row(&fields, ',', '"');
    let rows = parse_all(DsvOptions::default(), &encoded);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0], fields);
}

#[test]
fn test_escaping_roundtrip() {
    // escape-based encoding instead of quoting
    let options = DsvOptions::default().quoting(false).escape("\\");
    let rows = parse_all(options, "with\\,comma,plain\n");
    assert_eq!(rows, vec![vec!["with,comma", "plain"]]);
}

#[test]
fn test_warnings_accumulate_in_order() {
    let options = DsvOptions::default().escape("\\");
    let mut parser = DsvParser::new(options).unwrap();
    parser.feed_str("a\\x,\"b\"y\n \"c\",d\n").unwrap();
    parser.end().unwrap();

    let kinds: Vec<_> = parser.warnings().iter().map(|w| w.kind).collect();
    assert_eq!(
        kinds,
        vec![
            DiagnosticKind::InvalidEscape,
            DiagnosticKind::InvalidClosingQuote,
            DiagnosticKind::InvalidOpeningQuote,
        ]
    );
    let positions: Vec<_> = parser.warnings().iter().map(|w| w.position).collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
}

#[test]
fn test_every_chunk_split_is_equivalent() {
    let options = DsvOptions::default().comment("#").escape("\\");
    let input = "#header comment\na,\"b,c\",d\\,e\n\"f\"\"g\",h\n";

    let expected = {
        let mut parser = DsvParser::new(options.clone()).unwrap();
        parser.feed_str(input).unwrap();
        parser.end().unwrap();
        let rows: Vec<_> = parser.drain_rows().map(|r| r.fields).collect();
        (rows, parser.take_warnings())
    };

    for split in 0..=input.len() {
        if !input.is_char_boundary(split) {
            continue;
        }
        let mut parser = DsvParser::new(options.clone()).unwrap();
        parser.feed_str(&input[..split]).unwrap();
        parser.feed_str(&input[split..]).unwrap();
        parser.end().unwrap();
        let rows: Vec<_> = parser.drain_rows().map(|r| r.fields).collect();
        assert_eq!((rows, parser.take_warnings()), expected, "split at {split}");
    }
}

#[test]
fn test_read_file_end_to_end() {
    let mut temp = NamedTempFile::new().unwrap();
    temp.write_all(b"id,name\n1,Alice\n2,\"Bob, Jr.\"\n").unwrap();
    temp.flush().unwrap();

    let mut reader = DsvReader::open(temp.path()).unwrap().has_header(true);
    let mut rows = vec![];
    for row_result in reader.rows() {
        rows.push(row_result.unwrap().into_fields());
    }

    assert_eq!(rows, vec![vec!["1", "Alice"], vec!["2", "Bob, Jr."]]);
    assert_eq!(
        reader.headers(),
        Some(&["id".to_string(), "name".to_string()][..])
    );
    assert_eq!(reader.column_index("id"), Some(0));
    assert_eq!(reader.row_count(), 2);
}

#[test]
fn test_tsv_with_crlf_file() {
    let mut temp = NamedTempFile::new().unwrap();
    temp.write_all(b"a\tb\r\nc\td\r\n").unwrap();
    temp.flush().unwrap();

    let options = DsvOptions::default().delimiter("\t").newline("\r\n");
    let mut reader = DsvReader::open(temp.path()).unwrap().options(options);
    let mut rows = vec![];
    while let Some(row) = reader.read_row().unwrap() {
        rows.push(row.into_fields());
    }
    assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
}

#[test]
fn test_skip_rows_with_sink() {
    let options = DsvOptions::default().skip("~");
    let mut parser = DsvParser::new(options).unwrap();
    parser.collect_skipped_rows(true);
    parser.feed_str("~one,two\nkept,row\n~three\n").unwrap();
    parser.end().unwrap();

    let rows: Vec<_> = parser.drain_rows().map(|r| r.fields).collect();
    assert_eq!(rows, vec![vec!["kept", "row"]]);

    let mut skipped = vec![];
    while let Some(row) = parser.next_skipped_row() {
        skipped.push(row.into_fields());
    }
    assert_eq!(skipped, vec![vec!["one", "two"], vec!["three"]]);
}
