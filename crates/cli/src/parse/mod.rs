//! Turning pasted text and CSV files into an item pool.
//!
//! Every parser keeps going past bad entries: the good amounts become items
//! and each rejected entry becomes one message in `errors`.

mod csv_column;

pub use csv_column::parse_csv_column;

use combimatch_recon::{Cents, Item, Position};

#[derive(Debug, Default)]
pub struct Parsed {
    pub items: Vec<Item>,
    pub errors: Vec<String>,
}

impl Parsed {
    fn push(&mut self, value: Cents, position: Position) {
        self.items.push(Item::new(value, position));
    }
}

/// One amount per line. Blank lines are skipped; `,` thousands separators
/// and spaces are ignored.
pub fn parse_line_separated(text: &str) -> Parsed {
    let mut parsed = Parsed::default();

    for (i, line) in text.trim().split('\n').enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let cleaned: String = line.chars().filter(|c| *c != ',' && *c != ' ').collect();
        match Cents::parse(&cleaned) {
            Ok(value) => {
                let index = parsed.items.len();
                parsed.push(value, Position::line(index));
            }
            Err(_) => parsed
                .errors
                .push(format!("Line {}: '{}' is not a valid number", i + 1, line)),
        }
    }

    parsed
}

/// Amounts separated by commas. Spaces inside an amount are ignored.
pub fn parse_comma_separated(text: &str) -> Parsed {
    let mut parsed = Parsed::default();

    for (i, part) in text.trim().split(',').enumerate() {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let cleaned: String = part.chars().filter(|c| !c.is_whitespace()).collect();
        match Cents::parse(&cleaned) {
            Ok(value) => {
                let index = parsed.items.len();
                parsed.push(value, Position::line(index));
            }
            Err(_) => parsed
                .errors
                .push(format!("Item {}: '{}' is not a valid number", i + 1, part)),
        }
    }

    parsed
}
