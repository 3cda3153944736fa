//! CSV output for the index entries.
//!
//! Each run writes one file named after the fetch mode and replaces any file
//! of the same name. Every row carries the same `writetime`, the moment the
//! file was written.

use chrono::{DateTime, Local};
use csv::WriterBuilder;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::error::Result;
use crate::models::{FetchMode, IndexColumns};
use crate::utils::writetime;

/// Column names, in file order.
pub const HEADER: [&str; 6] = ["title", "url", "summary", "date", "pic", "writetime"];

#[derive(Serialize)]
struct Row<'a> {
    title: &'a str,
    url: &'a str,
    summary: &'a str,
    date: &'a str,
    pic: &'a str,
    writetime: &'a str,
}

/// Write the index columns to `<output_dir>/<mode file name>`, stamped with
/// the current local time.
///
/// # Returns
///
/// The path of the written file.
pub fn write_index_csv(
    output_dir: &Path,
    mode: FetchMode,
    columns: &IndexColumns,
) -> Result<PathBuf> {
    write_index_csv_at(output_dir, mode, columns, &Local::now())
}

/// Same as [`write_index_csv`] with an explicit timestamp.
#[instrument(level = "info", skip(columns, now), fields(rows = columns.len()))]
pub fn write_index_csv_at(
    output_dir: &Path,
    mode: FetchMode,
    columns: &IndexColumns,
    now: &DateTime<Local>,
) -> Result<PathBuf> {
    let path = output_dir.join(mode.csv_file_name());
    let stamp = writetime(now);

    let mut wtr = WriterBuilder::new().has_headers(false).from_path(&path)?;
    wtr.write_record(HEADER)?;
    for record in columns.records() {
        wtr.serialize(Row {
            title: &record.title,
            url: &record.url,
            summary: &record.summary,
            date: &record.date,
            pic: &record.pic,
            writetime: &stamp,
        })?;
    }
    wtr.flush()?;

    info!(path = %path.display(), "Wrote index CSV");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IndexRecord;
    use chrono::TimeZone;
    use regex::Regex;

    fn columns(n: usize) -> IndexColumns {
        (1..=n)
            .map(|i| IndexRecord {
                title: format!("标题, 第{i}篇"),
                url: format!("http://news.tsinghua.edu.cn/a{i}.html"),
                summary: format!("摘要\"{i}\""),
                date: format!("2016.11.{i}"),
                pic: format!("http://news.tsinghua.edu.cn/p{i}.jpg"),
            })
            .collect()
    }

    #[test]
    fn test_three_records_four_lines() {
        let dir = tempfile::tempdir().unwrap();
        let now = Local.with_ymd_and_hms(2016, 11, 29, 9, 30, 0).unwrap();
        let path = write_index_csv_at(dir.path(), FetchMode::Requests, &columns(3), &now).unwrap();

        assert_eq!(path.file_name().unwrap(), "thNewsRequests.csv");
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "title,url,summary,date,pic,writetime");

        let stamp = Regex::new(r",\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$").unwrap();
        for line in &lines[1..] {
            assert!(stamp.is_match(line), "row without timestamp: {line}");
            assert!(line.ends_with(",2016-11-29 09:30:00"));
        }
    }

    #[test]
    fn test_fields_round_trip_through_csv_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_index_csv(dir.path(), FetchMode::Browser, &columns(2)).unwrap();
        assert_eq!(path.file_name().unwrap(), "thNewsSelenium.csv");

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "标题, 第1篇");
        assert_eq!(&rows[1][2], "摘要\"2\"");
        assert_eq!(rows[0][5], rows[1][5]);
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        write_index_csv(dir.path(), FetchMode::Requests, &columns(3)).unwrap();
        let path = write_index_csv(dir.path(), FetchMode::Requests, &columns(1)).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn test_header_only_for_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        let path =
            write_index_csv(dir.path(), FetchMode::Requests, &IndexColumns::default()).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents, "title,url,summary,date,pic,writetime\n");
    }
}
