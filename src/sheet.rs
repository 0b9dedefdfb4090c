//! Per-program tracking sheets.
//!
//! Each configured feed owns one CSV file at `{sheets_dir}/{sheet_name}.csv`.
//! The column layout is positional and fixed: column 2 holds the episode
//! title, column 4 the broadcast year, column 5 the category label (the sheet
//! name), and column 7 a `YYYY-MM-DD` date comment. Row 1 is a header; data
//! rows start at row 2. Other columns belong to the sheet's owner — new rows
//! clone the previous last row so whatever is kept there propagates.
//!
//! The sheet is append-only from this tool's perspective. The only read path
//! is the existing-title snapshot used for deduplication.

use crate::dates::format_date;
use crate::models::ResolvedEntry;
use chrono::Datelike;
use std::collections::HashSet;
use std::error::Error;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::info;

// 0-based indexes of the owned columns.
const TITLE_COL: usize = 1;
const YEAR_COL: usize = 3;
const CATEGORY_COL: usize = 4;
const DATE_COL: usize = 6;
const MIN_COLUMNS: usize = 7;

/// Handle to one program's tracking sheet.
pub struct Sheet {
    name: String,
    path: PathBuf,
}

impl Sheet {
    /// Open the sheet for `name` under `sheets_dir`.
    ///
    /// Errors when the file does not exist; the caller treats that as
    /// "sheet not found" and skips the feed.
    pub fn open(sheets_dir: &Path, name: &str) -> Result<Self, Box<dyn Error>> {
        let path = sheets_dir.join(format!("{name}.csv"));
        if !path.is_file() {
            return Err(format!("sheet \"{name}\" not found at {}", path.display()).into());
        }
        Ok(Self {
            name: name.to_string(),
            path,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn read_rows(&self) -> Result<Vec<Vec<String>>, Box<dyn Error>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }

    /// Snapshot of every title currently recorded in the title column,
    /// trimmed of surrounding whitespace, blanks excluded.
    ///
    /// Taken once per feed before any rows are added and not updated as the
    /// run appends, so duplicate titles within one run's candidate list are
    /// not filtered against each other.
    pub fn existing_titles(&self) -> Result<HashSet<String>, Box<dyn Error>> {
        let rows = self.read_rows()?;
        Ok(rows
            .iter()
            .skip(1) // header row
            .filter_map(|row| row.get(TITLE_COL))
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
            .collect())
    }

    /// Append entries below the current last row, in the order given.
    ///
    /// Each new row starts as a clone of the row above it (initially the
    /// current last row, which may be the header on a sheet with no data
    /// rows), padded to at least seven columns, with the owned columns then
    /// overwritten. Rows are flushed one at a time: a failure at entry N
    /// leaves entries 1..N-1 committed, and nothing is rolled back.
    pub fn append_entries(&self, entries: &[ResolvedEntry]) -> Result<usize, Box<dyn Error>> {
        let rows = self.read_rows()?;
        let mut template = rows.last().cloned().ok_or_else(|| {
            format!("sheet \"{}\" is empty, no template row to clone", self.name)
        })?;
        let mut last_row = rows.len();

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)?;
        ensure_trailing_newline(&mut file)?;

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(&mut file);

        for (idx, entry) in entries.iter().enumerate() {
            let mut row = template.clone();
            if row.len() < MIN_COLUMNS {
                row.resize(MIN_COLUMNS, String::new());
            }
            row[TITLE_COL] = entry.title.clone();
            row[YEAR_COL] = entry.date.year().to_string();
            row[CATEGORY_COL] = self.name.clone();
            row[DATE_COL] = format_date(entry.date);

            writer.write_record(&row)?;
            writer.flush()?;

            last_row += 1;
            info!(
                sheet = %self.name,
                row = last_row,
                progress = %format!("{}/{}", idx + 1, entries.len()),
                title = %entry.title,
                date = %format_date(entry.date),
                "Appended entry"
            );
            template = row;
        }

        Ok(entries.len())
    }
}

/// Appending a CSV record to a file whose last line is unterminated would
/// glue the new record onto it; terminate the last line first.
fn ensure_trailing_newline(file: &mut File) -> Result<(), Box<dyn Error>> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(());
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    if last[0] != b'\n' {
        file.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    const HEADER: &str = "No.,タイトル,メモ,年,カテゴリ,評価,放送日\n";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(title: &str, y: i32, m: u32, d: u32) -> ResolvedEntry {
        ResolvedEntry {
            title: title.to_string(),
            date: date(y, m, d),
        }
    }

    fn make_sheet(dir: &TempDir, name: &str, contents: &str) -> Sheet {
        std::fs::write(dir.path().join(format!("{name}.csv")), contents).unwrap();
        Sheet::open(dir.path(), name).unwrap()
    }

    #[test]
    fn test_open_missing_sheet_fails() {
        let dir = TempDir::new().unwrap();
        assert!(Sheet::open(dir.path(), "FMシアター").is_err());
    }

    #[test]
    fn test_existing_titles_skips_header_and_blanks() {
        let dir = TempDir::new().unwrap();
        let sheet = make_sheet(
            &dir,
            "FMシアター",
            &format!("{HEADER}1, 砂の城 ,memo,2024,FMシアター,5,2024-03-05\n2,,memo,,,,\n"),
        );
        let titles = sheet.existing_titles().unwrap();
        assert_eq!(titles.len(), 1);
        assert!(titles.contains("砂の城"));
    }

    #[test]
    fn test_append_clones_template_and_overwrites_owned_columns() {
        let dir = TempDir::new().unwrap();
        let sheet = make_sheet(
            &dir,
            "FMシアター",
            &format!("{HEADER}1,砂の城,既読,2024,FMシアター,5,2024-03-05\n"),
        );

        sheet
            .append_entries(&[entry("遠い声", 2025, 1, 2), entry("春の嵐", 2025, 1, 10)])
            .unwrap();

        let rows = sheet.read_rows().unwrap();
        assert_eq!(rows.len(), 4);

        assert_eq!(rows[2][0], "1"); // cloned from the template row
        assert_eq!(rows[2][1], "遠い声");
        assert_eq!(rows[2][2], "既読"); // unowned column preserved
        assert_eq!(rows[2][3], "2025");
        assert_eq!(rows[2][4], "FMシアター");
        assert_eq!(rows[2][6], "2025-01-02");

        // Second entry clones the row just written, not the original template.
        assert_eq!(rows[3][1], "春の嵐");
        assert_eq!(rows[3][2], "既読");
        assert_eq!(rows[3][6], "2025-01-10");
    }

    #[test]
    fn test_append_pads_short_template_rows() {
        let dir = TempDir::new().unwrap();
        let sheet = make_sheet(&dir, "FMシアター", "No.,タイトル\n1,砂の城\n");

        sheet.append_entries(&[entry("遠い声", 2025, 1, 2)]).unwrap();

        let rows = sheet.read_rows().unwrap();
        let added = &rows[2];
        assert_eq!(added.len(), MIN_COLUMNS);
        assert_eq!(added[TITLE_COL], "遠い声");
        assert_eq!(added[DATE_COL], "2025-01-02");
    }

    #[test]
    fn test_append_to_header_only_sheet_clones_header() {
        // A sheet with no data rows uses the header as the clone template,
        // matching the recorded last-row-clone behavior.
        let dir = TempDir::new().unwrap();
        let sheet = make_sheet(&dir, "FMシアター", HEADER);

        sheet.append_entries(&[entry("遠い声", 2025, 1, 2)]).unwrap();

        let rows = sheet.read_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], "No.");
        assert_eq!(rows[1][1], "遠い声");
    }

    #[test]
    fn test_append_after_unterminated_last_line() {
        let dir = TempDir::new().unwrap();
        let sheet = make_sheet(
            &dir,
            "FMシアター",
            &format!("{HEADER}1,砂の城,,2024,FMシアター,,2024-03-05"),
        );

        sheet.append_entries(&[entry("遠い声", 2025, 1, 2)]).unwrap();

        let rows = sheet.read_rows().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][1], "砂の城");
        assert_eq!(rows[2][1], "遠い声");
    }

    #[test]
    fn test_append_to_empty_sheet_errors() {
        let dir = TempDir::new().unwrap();
        let sheet = make_sheet(&dir, "FMシアター", "");
        assert!(sheet.append_entries(&[entry("遠い声", 2025, 1, 2)]).is_err());
    }
}
