//! Writers for run results.
//!
//! - Similarity records: JSON lines, one [`SimilarityRecord`] per line.
//! - Skip list: plain text, a header line followed by one
//!   `entity<TAB>reason` line per skipped entity, sorted by name.
//! - Timings: JSON lines tagged with `kind` (`entity` or `combo`).

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use engine::{ComboTiming, EntityTiming, SimilarityRecord, SkippedEntity, TimingReport};
use serde::Serialize;
use thiserror::Error;

pub const SKIP_LIST_HEADER: &str =
    "The following entities were skipped because no reference version could be resolved:";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("i/o failure: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Open `path` for writing, creating missing parent directories.
pub fn create_output(path: &Path) -> Result<BufWriter<File>, OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

/// Write records as JSON lines. Returns the number of lines written.
pub fn write_records<'a, W, I>(mut writer: W, records: I) -> Result<usize, OutputError>
where
    W: Write,
    I: IntoIterator<Item = &'a SimilarityRecord>,
{
    let mut lines = 0;
    for record in records {
        write_json_line(&mut writer, record)?;
        lines += 1;
    }
    writer.flush()?;
    Ok(lines)
}

/// Write the skip list.
pub fn write_skip_list<W: Write>(mut writer: W, skipped: &[SkippedEntity]) -> Result<(), OutputError> {
    let mut sorted: Vec<&SkippedEntity> = skipped.iter().collect();
    sorted.sort_by(|a, b| a.entity.cmp(&b.entity));

    writeln!(writer, "{SKIP_LIST_HEADER}")?;
    for skip in sorted {
        writeln!(writer, "{}\t{}", skip.entity, skip.reason)?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TimingRow<'a> {
    Entity(&'a EntityTiming),
    Combo(&'a ComboTiming),
}

/// Write per-entity then per-combination timings as JSON lines.
pub fn write_timings<W: Write>(mut writer: W, report: &TimingReport) -> Result<usize, OutputError> {
    let rows = report
        .entities
        .iter()
        .map(TimingRow::Entity)
        .chain(report.combos.iter().map(TimingRow::Combo));

    let mut lines = 0;
    for row in rows {
        write_json_line(&mut writer, &row)?;
        lines += 1;
    }
    writer.flush()?;
    Ok(lines)
}

fn write_json_line<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<(), OutputError> {
    serde_json::to_writer(&mut *writer, value)?;
    writer.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpus::VersionLabel;
    use engine::SkipReason;
    use shingle::SketchSize;
    use tempfile::TempDir;

    fn record(entity: &str, offset: u32, size: SketchSize, value: f64) -> SimilarityRecord {
        SimilarityRecord {
            entity: entity.into(),
            shingle_width: 25,
            sketch_size: size,
            other_version: VersionLabel::with_offset("C", offset),
            jaccard_value: value,
            reference_version: VersionLabel::current("C"),
        }
    }

    #[test]
    fn records_are_json_lines() {
        let records = vec![
            record("Austin_TX", 1, SketchSize::Bounded(8), 0.25),
            record("Austin_TX", 2, SketchSize::Unbounded, 1.0),
        ];
        let mut buf = Vec::new();
        assert_eq!(write_records(&mut buf, &records).unwrap(), 2);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            r#"{"entity":"Austin_TX","shingleWidth":25,"sketchSize":8,"otherVersion":"C-1","jaccardValue":0.25,"referenceVersion":"C"}"#
        );
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["sketchSize"], "unbounded");
    }

    #[test]
    fn skip_list_is_sorted_with_header() {
        let skipped = vec![
            SkippedEntity {
                entity: "Cary_NC".into(),
                reason: SkipReason::NoVersions,
            },
            SkippedEntity {
                entity: "Boise_ID".into(),
                reason: SkipReason::NoReferenceVersion,
            },
        ];
        let mut buf = Vec::new();
        write_skip_list(&mut buf, &skipped).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            format!(
                "{SKIP_LIST_HEADER}\nBoise_ID\tno_reference_version\nCary_NC\tno_versions\n"
            )
        );
    }

    #[test]
    fn timings_are_tagged() {
        let report = TimingReport {
            entities: vec![EntityTiming {
                entity: "E".into(),
                comparisons: 4,
                total_secs: 0.5,
                similarity_secs: 0.25,
            }],
            combos: vec![ComboTiming {
                entity: "E".into(),
                shingle_width: 25,
                sketch_size: SketchSize::Unbounded,
                runs: 5,
                mean_total_secs: 0.1,
                std_total_secs: 0.0,
                mean_similarity_secs: 0.05,
                std_similarity_secs: 0.0,
            }],
            ..TimingReport::default()
        };
        let mut buf = Vec::new();
        assert_eq!(write_timings(&mut buf, &report).unwrap(), 2);

        let text = String::from_utf8(buf).unwrap();
        let rows: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(rows[0]["kind"], "entity");
        assert_eq!(rows[0]["comparisons"], 4);
        assert_eq!(rows[1]["kind"], "combo");
        assert_eq!(rows[1]["sketchSize"], "unbounded");
    }

    #[test]
    fn create_output_makes_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/records.jsonl");
        let writer = create_output(&path).unwrap();
        write_records(writer, std::iter::empty()).unwrap();
        assert!(path.is_file());
    }
}
