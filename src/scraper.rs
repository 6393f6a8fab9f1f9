use std::path::Path;
use log::{info, warn, error};

use crate::error::{FetchError, WriteError};
use crate::extractor::{self, CompanyRecord};
use crate::search_engine::Fetch;
use crate::writer;

#[derive(Debug, PartialEq)]
pub enum ScrapeStatus {
    /// Page fetched; the record may still have every panel field absent
    Success { fields_found: usize },
    Skipped,
}

/// Outcome of one batch run, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub records: Vec<CompanyRecord>,
    pub statuses: Vec<(String, ScrapeStatus)>,
}

impl BatchReport {
    pub fn skipped(&self) -> impl Iterator<Item = &str> {
        self.statuses
            .iter()
            .filter(|(_, status)| *status == ScrapeStatus::Skipped)
            .map(|(query, _)| query.as_str())
    }
}

pub struct Scraper<F> {
    fetcher: F,
}

impl<F: Fetch> Scraper<F> {
    pub fn new(fetcher: F) -> Self {
        Scraper { fetcher }
    }

    /// Fetch and extract a single company.
    pub fn scrape_company(&self, company: &str) -> Result<CompanyRecord, FetchError> {
        let page = self.fetcher.fetch(company)?;
        Ok(extractor::extract_panel(&page.body).into_record(company))
    }

    /// Processes every name in order. Fetch failures are logged and skipped;
    /// nothing here aborts the batch.
    pub fn scrape_all<S: AsRef<str>>(&self, companies: &[S]) -> BatchReport {
        let mut report = BatchReport::default();
        let total = companies.len();

        for (i, company) in companies.iter().enumerate() {
            let company = company.as_ref();
            info!("Processing {} / {} : {}", i + 1, total, company);

            match self.scrape_company(company) {
                Ok(record) => {
                    let fields_found = Self::fields_found(&record);
                    if fields_found == 0 {
                        warn!("No knowledge panel fields found for '{}'", company);
                    }
                    report.records.push(record);
                    report
                        .statuses
                        .push((company.to_string(), ScrapeStatus::Success { fields_found }));
                }
                Err(e) => {
                    error!("Invalid response for company name {}: {}", company, e);
                    if e.is_rate_limited() {
                        warn!("Search engine is rate limiting; later companies may fail too");
                    }
                    report.statuses.push((company.to_string(), ScrapeStatus::Skipped));
                }
            }
        }

        info!(
            "Scraping completed: {} of {} companies produced a page",
            report.records.len(),
            total
        );
        report
    }

    /// Scrape the batch, then write it once. Only the write can fail the run.
    pub fn run<S: AsRef<str>, P: AsRef<Path>>(
        &self,
        companies: &[S],
        output: P,
    ) -> Result<BatchReport, WriteError> {
        let report = self.scrape_all(companies);
        writer::write_records(&report.records, output)?;
        Ok(report)
    }

    fn fields_found(record: &CompanyRecord) -> usize {
        extractor::Field::ALL
            .iter()
            .filter(|field| record.get(**field).is_some())
            .count()
    }
}
