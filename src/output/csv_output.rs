//! CSV export of the dataset

use crate::output::dataset::Dataset;
use crate::output::{ensure_parent_dir, OutputResult};
use std::path::Path;

/// Writes `dataset` to `path` with a `rating,date,body` header
///
/// Parent directories are created as needed and an existing file is
/// replaced.
pub fn write_csv(dataset: &Dataset, path: &Path) -> OutputResult<()> {
    ensure_parent_dir(path)?;

    let mut writer = csv::Writer::from_path(path)?;
    if dataset.is_empty() {
        // serde only emits the header alongside the first row
        writer.write_record(["rating", "date", "body"])?;
    }
    for record in dataset.records() {
        writer.serialize(record)?;
    }
    writer.flush()?;

    tracing::info!("Wrote {} rows to {}", dataset.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Record;
    use tempfile::TempDir;

    #[test]
    fn test_write_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("Crunchy Kibble.csv");
        let dataset = Dataset::from_results(vec![vec![
            Record {
                rating: 5,
                date: "24.01.02".to_string(),
                body: "Great, my dog loves it".to_string(),
            },
            Record {
                rating: 2,
                date: "24.01.01".to_string(),
                body: "Bag arrived \"torn\"".to_string(),
            },
        ]]);

        write_csv(&dataset, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.headers().unwrap(), vec!["rating", "date", "body"]);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "5");
        assert_eq!(&rows[0][2], "Great, my dog loves it");
        assert_eq!(&rows[1][2], "Bag arrived \"torn\"");
    }

    #[test]
    fn test_empty_dataset_writes_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");

        write_csv(&Dataset::default(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim(), "rating,date,body");
    }
}
