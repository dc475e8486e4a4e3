//! Show permissive-mode recovery: malformed input still parses, with
//! diagnostics describing every ambiguity encountered

use dsvstream::{DsvOptions, DsvParser};

fn main() {
    // an unresolved closing quote and an opening quote after whitespace
    let input = "\"a\"x,b\n \"c\",d\n";

    let mut parser = DsvParser::new(DsvOptions::default()).unwrap();
    parser.feed_str(input).unwrap();
    parser.end().unwrap();

    while let Some(row) = parser.next_row() {
        println!("row {}: {:?}", row.index, row.fields);
    }

    for warning in parser.warnings() {
        println!("warning: {warning}");
    }
}
