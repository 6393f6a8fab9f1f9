pub mod config;
pub mod delay_manager;
pub mod document;
pub mod error;
pub mod extractor;
pub mod input_loader;
pub mod logger;
pub mod scraper;
pub mod search_engine;
pub mod writer;

// Exporting types for convenience
pub use crate::config::ScraperConfig;
pub use crate::document::{DocumentQuery, PanelDocument};
pub use crate::error::{ConfigError, FetchError, InputError, WriteError};
pub use crate::extractor::{extract_panel, CompanyRecord, Field, PanelFields};
pub use crate::scraper::{BatchReport, ScrapeStatus, Scraper};
pub use crate::search_engine::{Fetch, PageResponse, SearchEngine};
pub use crate::writer::{read_records, write_records};
