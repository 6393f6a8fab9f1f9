use std::fs::File;
use std::path::Path;
use log::{info, warn, debug};

use crate::error::WriteError;
use crate::extractor::CompanyRecord;

/// Writes the batch to `path`, replacing any existing file.
///
/// The header row comes from the first record's keys. An empty batch is an
/// error and leaves the destination untouched.
pub fn write_records<P: AsRef<Path>>(records: &[CompanyRecord], path: P) -> Result<(), WriteError> {
    if records.is_empty() {
        return Err(WriteError::EmptyBatch);
    }
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(file);

    for record in records {
        debug!("Writing row for '{}'", record.input_company_name);
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;

    info!("Wrote {} records to {:?}", records.len(), path);
    Ok(())
}

/// Reads a file produced by [`write_records`]. Empty cells come back as `None`.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<CompanyRecord>, WriteError> {
    let path = path.as_ref();
    let mut rdr = csv::Reader::from_path(path)?;
    if rdr.headers()?.iter().ne(CompanyRecord::HEADERS) {
        warn!("{:?} does not have the expected columns; reading by header name", path);
    }
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        records.push(result?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn sample() -> Vec<CompanyRecord> {
        vec![
            CompanyRecord {
                company_name: Some("Kroger".to_string()),
                company_type: Some("Retail company".to_string()),
                headquarters: Some("Cincinnati, OH".to_string()),
                founder: Some("Bernard Kroger, \"Barney\"".to_string()),
                founded: Some(String::new()),
                input_company_name: "Kroger".to_string(),
                ..CompanyRecord::default()
            },
            CompanyRecord {
                input_company_name: "Rockstar".to_string(),
                ..CompanyRecord::default()
            },
        ]
    }

    #[test]
    fn empty_batch_is_an_error_and_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        assert!(matches!(write_records(&[], &path), Err(WriteError::EmptyBatch)));
        assert!(!path.exists());
    }

    #[test]
    fn header_is_canonical_key_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        write_records(&sample(), &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let header = contents.lines().next().unwrap();
        assert_eq!(header, CompanyRecord::HEADERS.join(","));
        assert_eq!(contents.lines().count(), 3);
        assert!(contents.lines().nth(2).unwrap().ends_with(",,,,,,,,,,Rockstar"));
    }

    #[test]
    fn round_trips_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let records = sample();
        write_records(&records, &path).unwrap();

        let mut expected = records.clone();
        // An empty string is indistinguishable from an absent value once written.
        expected[0].founded = None;
        assert_eq!(read_records(&path).unwrap(), expected);
    }

    #[test]
    fn reads_columns_by_name_in_any_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shuffled.csv");
        let mut headers = CompanyRecord::HEADERS.to_vec();
        headers.reverse();
        fs::write(&path, format!("{}\nEbay,,,,,,,,,,eBay Inc.\n", headers.join(","))).unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].input_company_name, "Ebay");
        assert_eq!(records[0].company_name.as_deref(), Some("eBay Inc."));
        assert_eq!(records[0].website, None);
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "stale\nstale\nstale\nstale\n").unwrap();

        write_records(&sample()[1..], &path).unwrap();
        assert_eq!(read_records(&path).unwrap().len(), 1);
    }
}
