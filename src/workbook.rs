use bincode::{deserialize_from, serialize_into};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[cfg(feature = "web")]
use async_trait::async_trait;

use crate::range::SheetRange;
use crate::records::{BAZAAR_HEADERS, LEADERBOARD_HEADERS, PARTICIPANTS_HEADERS};
#[cfg(feature = "web")]
use crate::sheets::{SheetStore, ValueInput};
use crate::sheets::{SheetValues, SheetsError, SpreadsheetInfo};

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
struct WorkbookSnapshot {
    title: String,
    sheets: BTreeMap<String, Vec<Vec<String>>>,
}

/// A spreadsheet kept in process memory, optionally mirrored to a gzip file
///
/// Behaves like the remote spreadsheet for reads and appends, which makes the
/// service usable without Google credentials. When opened from a path every
/// append is written back to disk.
pub struct LocalWorkbook {
    snapshot: RwLock<WorkbookSnapshot>,
    path: Option<PathBuf>,
}

fn save_snapshot(snapshot: &WorkbookSnapshot, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = path.with_extension("tmp");
    let file = File::create(&tmp)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut writer = BufWriter::new(encoder);

    serialize_into(&mut writer, snapshot)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    writer.flush()?;
    let encoder = writer.into_inner().map_err(|e| e.into_error())?;
    encoder.finish()?;
    fs::rename(&tmp, path)
}

fn load_snapshot(path: &Path) -> std::io::Result<WorkbookSnapshot> {
    let file = File::open(path)?;
    let decoder = GzDecoder::new(file);
    let mut reader = BufReader::new(decoder);

    let snapshot: WorkbookSnapshot = deserialize_from(&mut reader)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    Ok(snapshot)
}

fn header_row(headers: &[&str]) -> Vec<String> {
    headers.iter().map(|h| h.to_string()).collect()
}

fn trim_row(mut row: Vec<String>) -> Vec<String> {
    while row.last().is_some_and(|c| c.is_empty()) {
        row.pop();
    }
    row
}

impl LocalWorkbook {
    /// Workbook with no tabs
    pub fn empty(title: &str) -> Self {
        LocalWorkbook {
            snapshot: RwLock::new(WorkbookSnapshot {
                title: title.to_string(),
                sheets: BTreeMap::new(),
            }),
            path: None,
        }
    }

    /// In-memory workbook with the Leaderboard, Participants and Bazaar tabs and their header rows
    pub fn in_memory(title: &str) -> Self {
        let workbook = Self::empty(title);
        workbook.add_sheet("Leaderboard", &LEADERBOARD_HEADERS);
        workbook.add_sheet("Participants", &PARTICIPANTS_HEADERS);
        workbook.add_sheet("Bazaar", &BAZAAR_HEADERS);
        workbook
    }

    /// Open a workbook file, creating it with the event tabs when it does not exist yet
    ///
    /// # Arguments
    /// * `path` - Location of the `.bin.gz` file
    ///
    /// # Returns
    /// * `Result<LocalWorkbook, SheetsError>` - The workbook or an I/O error
    ///
    /// # Errors
    /// * Returns an error if the file exists but cannot be read or decoded
    /// * Returns an error if a new file cannot be written
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SheetsError> {
        let path = path.as_ref();
        if path.exists() {
            let snapshot = load_snapshot(path)?;
            log::info!(
                "Loaded workbook '{}' with {} tabs from {}",
                snapshot.title,
                snapshot.sheets.len(),
                path.display()
            );
            return Ok(LocalWorkbook {
                snapshot: RwLock::new(snapshot),
                path: Some(path.to_path_buf()),
            });
        }

        let mut workbook = Self::in_memory("Alifia Gumbira");
        workbook.path = Some(path.to_path_buf());
        workbook.save()?;
        log::info!("Created workbook at {}", path.display());
        Ok(workbook)
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, WorkbookSnapshot> {
        self.snapshot.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, WorkbookSnapshot> {
        self.snapshot.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Add a tab with a header row; an existing tab of that name is left alone
    pub fn add_sheet(&self, name: &str, headers: &[&str]) {
        let mut snapshot = self.write_guard();
        snapshot.sheets.entry(name.to_string()).or_insert_with(|| {
            if headers.is_empty() {
                Vec::new()
            } else {
                vec![header_row(headers)]
            }
        });
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the current contents to the backing file, if there is one
    pub fn save(&self) -> Result<(), SheetsError> {
        if let Some(path) = &self.path {
            let snapshot = self.read_guard();
            save_snapshot(&snapshot, path)?;
        }
        Ok(())
    }

    /// Read the cells covered by an A1 range
    ///
    /// Like the Sheets API, trailing empty cells of each row and trailing empty
    /// rows are left out.
    pub fn read(&self, range: &str) -> Result<SheetValues, SheetsError> {
        let parsed = SheetRange::parse(range)
            .ok_or_else(|| SheetsError::InvalidRange(format!("Unable to parse range: {}", range)))?;
        let snapshot = self.read_guard();
        let sheet = snapshot
            .sheets
            .get(&parsed.sheet)
            .ok_or_else(|| SheetsError::NotFound(format!("Unable to parse range: {}", range)))?;

        let first_col = (parsed.start_col - 1) as usize;
        let mut rows: Vec<Vec<String>> = sheet
            .iter()
            .enumerate()
            .filter(|(index, _)| parsed.contains_row(*index as u32 + 1))
            .map(|(_, row)| {
                let cells = row.iter().skip(first_col);
                let cells: Vec<String> = match parsed.width() {
                    Some(width) => cells.take(width).cloned().collect(),
                    None => cells.cloned().collect(),
                };
                trim_row(cells)
            })
            .collect();
        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }

        Ok(SheetValues {
            range: parsed.to_string(),
            rows,
        })
    }

    /// Append rows below the last non-empty row of the tab named by `range`
    pub fn append(&self, range: &str, rows: Vec<Vec<String>>) -> Result<u64, SheetsError> {
        let parsed = SheetRange::parse(range)
            .ok_or_else(|| SheetsError::InvalidRange(format!("Unable to parse range: {}", range)))?;
        let count = rows.len() as u64;
        {
            let mut snapshot = self.write_guard();
            let sheet = snapshot
                .sheets
                .get_mut(&parsed.sheet)
                .ok_or_else(|| SheetsError::NotFound(format!("Unable to parse range: {}", range)))?;

            while sheet.last().is_some_and(|r| r.iter().all(String::is_empty)) {
                sheet.pop();
            }
            let offset = (parsed.start_col - 1) as usize;
            for row in rows {
                let mut padded = vec![String::new(); offset];
                padded.extend(row);
                sheet.push(padded);
            }
        }
        self.save()?;
        Ok(count)
    }

    pub fn info(&self) -> SpreadsheetInfo {
        let snapshot = self.read_guard();
        SpreadsheetInfo {
            title: snapshot.title.clone(),
            sheets: snapshot.sheets.keys().cloned().collect(),
        }
    }
}

#[cfg(feature = "web")]
#[async_trait]
impl SheetStore for LocalWorkbook {
    async fn read_range(&self, range: &str) -> Result<SheetValues, SheetsError> {
        self.read(range)
    }

    async fn append_rows(
        &self,
        range: &str,
        rows: Vec<Vec<String>>,
        _input: ValueInput,
    ) -> Result<u64, SheetsError> {
        self.append(range, rows)
    }

    async fn info(&self) -> Result<SpreadsheetInfo, SheetsError> {
        Ok(LocalWorkbook::info(self))
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(path) => format!("workbook:{}", path.display()),
            None => "workbook:memory".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn read_skips_header_and_trims() {
        let workbook = LocalWorkbook::in_memory("test");
        workbook
            .append("Leaderboard!A:G", vec![row(&["1", "Gaple", "A", "1", "5", "", ""])])
            .unwrap();

        let values = workbook.read("Leaderboard!A2:G").unwrap();
        assert_eq!(values.range, "Leaderboard!A2:G");
        assert_eq!(values.rows, vec![row(&["1", "Gaple", "A", "1", "5"])]);

        let header = workbook.read("Participants!A1:A1").unwrap();
        assert_eq!(header.rows, vec![row(&["Name"])]);
    }

    #[test]
    fn narrow_and_offset_ranges() {
        let workbook = LocalWorkbook::empty("test");
        workbook.add_sheet("Data", &[]);
        workbook
            .append("Data!A:C", vec![row(&["a", "b", "c"]), row(&["d", "e", "f"]), row(&["g", "h", "i"])])
            .unwrap();

        let values = workbook.read("Data!B2:C3").unwrap();
        assert_eq!(values.rows, vec![row(&["e", "f"]), row(&["h", "i"])]);

        workbook.append("Data!B:C", vec![row(&["x"])]).unwrap();
        let values = workbook.read("Data!A4:B4").unwrap();
        assert_eq!(values.rows, vec![row(&["", "x"])]);
    }

    #[test]
    fn unknown_tab_and_bad_range() {
        let workbook = LocalWorkbook::in_memory("test");
        assert!(matches!(workbook.read("Nope!A1:B2"), Err(SheetsError::NotFound(_))));
        assert!(matches!(workbook.read("Leaderboard!A0"), Err(SheetsError::InvalidRange(_))));
        assert!(matches!(
            workbook.append("Nope!A:B", vec![row(&["x"])]),
            Err(SheetsError::NotFound(_))
        ));
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database").join("workbook.bin.gz");

        let workbook = LocalWorkbook::open(&path).unwrap();
        assert!(path.exists());
        workbook
            .append("Leaderboard!A:G", vec![row(&["9", "Gaple", "Cendana (Pattimura)", "2", "3", "", "t"])])
            .unwrap();
        drop(workbook);

        let reopened = LocalWorkbook::open(&path).unwrap();
        let values = reopened.read("Leaderboard!A2:G").unwrap();
        assert_eq!(values.rows.len(), 1);
        assert_eq!(values.rows[0][2], "Cendana (Pattimura)");
        assert_eq!(
            reopened.info().sheets,
            vec!["Bazaar".to_string(), "Leaderboard".to_string(), "Participants".to_string()]
        );
    }
}
