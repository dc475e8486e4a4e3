//! Stream a DSV file given on the command line
//!
//! Usage: cargo run --example file_read -- data.csv

use dsvstream::DsvReader;

fn main() {
    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: file_read <path>");
            std::process::exit(1);
        }
    };

    let mut reader = DsvReader::open(&path).unwrap().has_header(true);

    for row_result in reader.rows() {
        let row = row_result.unwrap();
        println!("{:?}", row.fields);
    }

    if let Some(headers) = reader.headers() {
        println!("columns: {headers:?}");
    }
    println!("{} rows", reader.row_count());
    for warning in reader.warnings() {
        println!("warning: {warning}");
    }
}
