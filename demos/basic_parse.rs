//! Parse a small in-memory document and print the rows

use dsvstream::{DsvOptions, DsvParser};

fn main() {
    let input = "name,city\nAlice,\"NYC, NY\"\nBob,SF\n";

    let mut parser = DsvParser::new(DsvOptions::default()).unwrap();
    parser.feed_str(input).unwrap();
    parser.end().unwrap();

    while let Some(row) = parser.next_row() {
        println!("row {}: {:?}", row.index, row.fields);
    }
}
