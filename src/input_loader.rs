use std::path::Path;
use log::{info, warn};
use serde::Deserialize;
use calamine::{open_workbook_auto, Reader};

use crate::error::InputError;

#[derive(Debug, Deserialize, Clone)]
pub struct InputRecord {
    #[serde(rename = "Company", alias = "company", alias = "Company Name", alias = "company name", alias = "company_name", alias = "Business Name")]
    pub company: String,
}

/// Loads company names from a CSV file, or the first sheet of an Excel workbook.
/// Blank names are dropped; order is preserved and duplicates are kept.
pub fn load_company_names<P: AsRef<Path>>(filename: P) -> Result<Vec<String>, InputError> {
    let path = filename.as_ref();
    if !path.exists() {
        return Err(InputError::Missing(path.to_path_buf()));
    }

    let is_excel = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xls"));

    let names = if is_excel { load_excel(path)? } else { load_csv(path)? };
    info!("Loaded {} company names from {:?}", names.len(), path);
    Ok(names)
}

fn load_csv(path: &Path) -> Result<Vec<String>, InputError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut names = Vec::new();
    for (line, result) in rdr.deserialize::<InputRecord>().enumerate() {
        match result {
            Ok(record) if !record.company.is_empty() => names.push(record.company),
            Ok(_) => {}
            Err(e) if line == 0 && names.is_empty() => {
                // A broken first row usually means the header has no company column.
                warn!("Error parsing first CSV record: {}", e);
                return Err(InputError::NoCompanyColumn(path.to_path_buf()));
            }
            Err(e) => warn!("Skipping CSV record {}: {}", line + 2, e),
        }
    }
    Ok(names)
}

fn load_excel(path: &Path) -> Result<Vec<String>, InputError> {
    let mut workbook = open_workbook_auto(path)?;
    let worksheets = workbook.worksheets();
    let Some((_name, range)) = worksheets.first() else {
        return Ok(Vec::new());
    };

    let mut rows = range.rows();
    let company_idx = rows
        .next()
        .and_then(|header| {
            header.iter().position(|cell| {
                let h = cell.to_string().to_lowercase();
                h.contains("company") || h.contains("business")
            })
        })
        .ok_or_else(|| InputError::NoCompanyColumn(path.to_path_buf()))?;

    Ok(rows
        .filter_map(|row| row.get(company_idx))
        .map(|cell| cell.to_string().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}
