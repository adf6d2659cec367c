//! A1-style address codec.
//!
//! Converts between spreadsheet addresses ("B12", "AA") and zero-based
//! coordinates. Every decoder returns `None` on malformed input; callers treat
//! that as a zero contribution rather than an error.

/// Zero-based cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    pub row: usize,
    pub col: usize,
}

impl CellAddress {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for CellAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", column_letters(self.col), self.row + 1)
    }
}

/// Decode "B12" into row 11, col 1.
///
/// The address must be one or more letters followed by one or more digits,
/// nothing else. Row "0" has no zero-based equivalent and is rejected.
pub fn decode_cell(address: &str) -> Option<CellAddress> {
    let split = address.find(|c: char| !c.is_ascii_alphabetic())?;
    let (letters, digits) = address.split_at(split);

    let col = decode_column(letters)?;
    let row = decode_row(digits)?;
    Some(CellAddress { row, col })
}

/// Decode column letters, base-26: A=0 .. Z=25, AA=26, AB=27, ...
pub fn decode_column(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }

    let mut col = 0usize;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
    }
    Some(col - 1)
}

/// Decode a 1-based row number ("12") into a zero-based index (11).
pub fn decode_row(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<usize>().ok()?.checked_sub(1)
}

/// Convert a 0-based column index to letters (0 = A, 25 = Z, 26 = AA).
pub fn column_letters(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}
