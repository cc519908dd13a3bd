use combimatch_recon::{Cents, Position, ReconError};

use super::Parsed;

/// Read one column of a CSV file. `column` is a header name (when the file
/// has headers) or a spreadsheet letter; `None` picks the first column.
///
/// Rows are numbered the way a spreadsheet shows them, so with headers the
/// first data row is row 2.
pub fn parse_csv_column(
    data: &str,
    column: Option<&str>,
    has_headers: bool,
) -> Result<Parsed, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .from_reader(data.as_bytes());

    let headers: Vec<String> = if has_headers {
        reader
            .headers()
            .map_err(|e| ReconError::Io(e.to_string()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect()
    } else {
        Vec::new()
    };

    // With a header row, a letter must still address one of its columns.
    let idx = match column {
        None => 0,
        Some(name) => headers
            .iter()
            .position(|h| h == name.trim())
            .or_else(|| column_index(name.trim()).filter(|i| !has_headers || *i < headers.len()))
            .ok_or_else(|| ReconError::MissingColumn { column: name.to_string() })?,
    };
    let letter = column_letter(idx);
    let first_row = if has_headers { 2 } else { 1 };

    let mut parsed = Parsed::default();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ReconError::Io(e.to_string()))?;
        let row = (first_row + i) as u32;

        let cell = record.get(idx).unwrap_or("").trim();
        if cell.is_empty() {
            continue;
        }
        let cleaned: String = cell.chars().filter(|c| *c != ',').collect();
        match Cents::parse(&cleaned) {
            Ok(value) => parsed.push(value, Position::cell(row, letter.as_str())),
            Err(_) => parsed
                .errors
                .push(format!("Cell {letter}{row}: '{cell}' is not a valid number")),
        }
    }

    log::debug!(
        "read {} amounts from column {} ({} rejected)",
        parsed.items.len(),
        letter,
        parsed.errors.len()
    );
    Ok(parsed)
}

/// 0-based column index to `A`, `B`, ..., `Z`, `AA`, ...
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// `A` / `b` / `AA` to a 0-based column index. `None` for anything that is
/// not a short run of letters.
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || letters.len() > 3 || !letters.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let n = letters
        .bytes()
        .fold(0usize, |acc, b| acc * 26 + usize::from(b.to_ascii_uppercase() - b'A' + 1));
    Some(n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEDGER_CSV: &str = "\
Date,Memo,Amount
2024-01-02,rent,\"1,200.00\"
2024-01-03,,
2024-01-04,coffee,4.50
2024-01-05,refund,n/a
";

    #[test]
    fn by_header_name() {
        let parsed = parse_csv_column(LEDGER_CSV, Some("Amount"), true).unwrap();
        let values: Vec<i64> = parsed.items.iter().map(|i| i.value.0).collect();
        assert_eq!(values, vec![120000, 450]);
        assert_eq!(parsed.items[0].position, Position::cell(2, "C"));
        assert_eq!(parsed.items[1].position, Position::cell(4, "C"));
        assert_eq!(parsed.errors, vec!["Cell C5: 'n/a' is not a valid number"]);
    }

    #[test]
    fn by_letter_without_headers() {
        let parsed = parse_csv_column("1,2\n3,4\n", Some("b"), false).unwrap();
        let values: Vec<i64> = parsed.items.iter().map(|i| i.value.0).collect();
        assert_eq!(values, vec![200, 400]);
        assert_eq!(parsed.items[0].position.to_string(), "B1");
    }

    #[test]
    fn first_column_by_default() {
        let parsed = parse_csv_column("5\n6\n", None, false).unwrap();
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[1].position, Position::cell(2, "A"));
    }

    #[test]
    fn unknown_column_is_an_error() {
        let err = parse_csv_column(LEDGER_CSV, Some("Total"), true).unwrap_err();
        assert!(matches!(err, ReconError::MissingColumn { .. }));
    }

    #[test]
    fn letter_must_exist_in_header_row() {
        let err = parse_csv_column(LEDGER_CSV, Some("Sum"), true).unwrap_err();
        assert!(matches!(err, ReconError::MissingColumn { ref column } if column == "Sum"));

        let parsed = parse_csv_column(LEDGER_CSV, Some("c"), true).unwrap();
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[0].position, Position::cell(2, "C"));
    }

    #[test]
    fn letters_round_trip() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_index("A"), Some(0));
        assert_eq!(column_index("aa"), Some(26));
        assert_eq!(column_index("Amount"), None);
        assert_eq!(column_index("A1"), None);
    }
}
