use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    static ref A1_RANGE_REGEX: Regex = Regex::new(
        r"^(?:'((?:[^']|'')+)'|([^!']+))(?:!([A-Za-z]{1,3})([0-9]+)?(?::([A-Za-z]{1,3})([0-9]+)?)?)?$"
    )
    .unwrap();
}

/// A parsed A1-notation range such as `Leaderboard!A2:G`
///
/// Rows and columns are 1-based. A missing bound means the range is open in
/// that direction, the way `Participants!A:H` covers every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRange {
    pub sheet: String,
    pub start_col: u32,
    pub start_row: Option<u32>,
    pub end_col: Option<u32>,
    pub end_row: Option<u32>,
}

pub fn col_to_letter(col: u32) -> String {
    let mut col = col;
    let mut result = String::new();
    while col > 0 {
        col -= 1;
        result.push(((col % 26) as u8 + b'A') as char);
        col /= 26;
    }
    result.chars().rev().collect()
}

pub fn letter_to_col(letters: &str) -> u32 {
    letters
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .fold(0, |acc, c| acc * 26 + (c as u32 - 'A' as u32 + 1))
}

impl SheetRange {
    /// Parse an A1 range; `None` when the text is not a range or names row 0
    pub fn parse(text: &str) -> Option<Self> {
        let caps = A1_RANGE_REGEX.captures(text.trim())?;
        let sheet = match (caps.get(1), caps.get(2)) {
            (Some(quoted), _) => quoted.as_str().replace("''", "'"),
            (None, Some(plain)) => plain.as_str().to_string(),
            _ => return None,
        };
        let row = |index: usize| -> Option<Option<u32>> {
            match caps.get(index) {
                None => Some(None),
                Some(m) => match m.as_str().parse::<u32>() {
                    Ok(0) | Err(_) => None,
                    Ok(r) => Some(Some(r)),
                },
            }
        };

        let Some(start) = caps.get(3) else {
            // Bare sheet name covers the whole sheet
            return Some(SheetRange {
                sheet,
                start_col: 1,
                start_row: None,
                end_col: None,
                end_row: None,
            });
        };
        let start_col = letter_to_col(start.as_str());
        let start_row = row(4)?;

        let (end_col, end_row) = match caps.get(5) {
            Some(end) => (Some(letter_to_col(end.as_str())), row(6)?),
            // A single cell reference is a one-by-one range
            None => (Some(start_col), start_row),
        };

        if let Some(end_col) = end_col {
            if end_col < start_col {
                return None;
            }
        }
        if let (Some(s), Some(e)) = (start_row, end_row) {
            if e < s {
                return None;
            }
        }

        Some(SheetRange {
            sheet,
            start_col,
            start_row,
            end_col,
            end_row,
        })
    }

    pub fn first_row(&self) -> u32 {
        self.start_row.unwrap_or(1)
    }

    /// Number of columns covered, `None` when open-ended
    pub fn width(&self) -> Option<usize> {
        self.end_col.map(|end| (end - self.start_col + 1) as usize)
    }

    pub fn contains_row(&self, row: u32) -> bool {
        row >= self.first_row() && self.end_row.map_or(true, |end| row <= end)
    }
}

impl fmt::Display for SheetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sheet.contains(|c: char| !c.is_ascii_alphanumeric() && c != '_') {
            write!(f, "'{}'", self.sheet.replace('\'', "''"))?;
        } else {
            write!(f, "{}", self.sheet)?;
        }
        if self.start_col == 1 && self.start_row.is_none() && self.end_col.is_none() {
            return Ok(());
        }
        write!(f, "!{}", col_to_letter(self.start_col))?;
        if let Some(row) = self.start_row {
            write!(f, "{}", row)?;
        }
        if let Some(end_col) = self.end_col {
            write!(f, ":{}", col_to_letter(end_col))?;
            if let Some(row) = self.end_row {
                write!(f, "{}", row)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters() {
        assert_eq!(col_to_letter(1), "A");
        assert_eq!(col_to_letter(7), "G");
        assert_eq!(col_to_letter(27), "AA");
        assert_eq!(col_to_letter(703), "AAA");
        assert_eq!(letter_to_col("M"), 13);
        assert_eq!(letter_to_col("az"), 52);
    }

    #[test]
    fn read_range_with_open_end_row() {
        let range = SheetRange::parse("Leaderboard!A2:G").unwrap();
        assert_eq!(range.sheet, "Leaderboard");
        assert_eq!(range.start_col, 1);
        assert_eq!(range.first_row(), 2);
        assert_eq!(range.width(), Some(7));
        assert_eq!(range.end_row, None);
        assert!(range.contains_row(5000));
        assert!(!range.contains_row(1));
    }

    #[test]
    fn column_only_and_single_cell() {
        let range = SheetRange::parse("Participants!A:H").unwrap();
        assert_eq!(range.first_row(), 1);
        assert_eq!(range.width(), Some(8));

        let cell = SheetRange::parse("Bazaar!A1").unwrap();
        assert_eq!(cell.end_col, Some(1));
        assert_eq!(cell.end_row, Some(1));
        assert!(!cell.contains_row(2));
    }

    #[test]
    fn quoted_and_bare_sheet_names() {
        let range = SheetRange::parse("'Hasil Lomba'!B2:C10").unwrap();
        assert_eq!(range.sheet, "Hasil Lomba");
        assert_eq!(range.to_string(), "'Hasil Lomba'!B2:C10");

        let whole = SheetRange::parse("Leaderboard").unwrap();
        assert_eq!(whole.width(), None);
        assert_eq!(whole.to_string(), "Leaderboard");
    }

    #[test]
    fn rejects_malformed_ranges() {
        assert!(SheetRange::parse("").is_none());
        assert!(SheetRange::parse("Leaderboard!A0:G").is_none());
        assert!(SheetRange::parse("Leaderboard!G2:A").is_none());
        assert!(SheetRange::parse("Leaderboard!A5:G2").is_none());
        assert!(SheetRange::parse("Leaderboard!2A").is_none());
    }
}
