//! Knowledge-panel field extraction.
//!
//! Every field is described by one [`FieldRule`] in [`PANEL_RULES`]: where to
//! look, what to read and how to clean it. Adding or dropping a field is an
//! edit to that table plus the matching [`CompanyRecord`] column.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::document::{DocumentQuery, PanelDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    CompanyName,
    CompanyType,
    Website,
    Description,
    StockPrice,
    Ceo,
    Founder,
    Founded,
    Headquarters,
    NumberOfEmployees,
}

impl Field {
    pub const COUNT: usize = 10;

    pub const ALL: [Field; Field::COUNT] = [
        Field::CompanyName,
        Field::CompanyType,
        Field::Website,
        Field::Description,
        Field::StockPrice,
        Field::Ceo,
        Field::Founder,
        Field::Founded,
        Field::Headquarters,
        Field::NumberOfEmployees,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Field::CompanyName => "company_name",
            Field::CompanyType => "company_type",
            Field::Website => "website",
            Field::Description => "description",
            Field::StockPrice => "stock_price",
            Field::Ceo => "ceo",
            Field::Founder => "founder",
            Field::Founded => "founded",
            Field::Headquarters => "headquarters",
            Field::NumberOfEmployees => "number_of_employees",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// What to read from the matched elements.
#[derive(Debug, Clone, Copy)]
pub enum Source {
    /// All descendant text nodes
    Text,
    /// Only text nodes directly under the match
    OwnText,
    Attribute(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub enum Normalize {
    /// First fragment, untouched
    First,
    /// Concatenate all fragments, remove every listed label in order, trim
    Join { strip: &'static [&'static str] },
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    pub selector: &'static str,
    pub source: Source,
    pub normalize: Normalize,
}

pub const PANEL_RULES: [FieldRule; Field::COUNT] = [
    FieldRule {
        field: Field::CompanyName,
        selector: r#"div[class*="kp-wholepage"] [data-attrid="title"]"#,
        source: Source::Text,
        normalize: Normalize::First,
    },
    FieldRule {
        field: Field::CompanyType,
        selector: r#"div[class*="kp-wholepage"] div[data-attrid="subtitle"]"#,
        source: Source::Text,
        normalize: Normalize::First,
    },
    FieldRule {
        field: Field::Website,
        selector: r#"div[class*="kp-wholepage"] a[data-attrid="visit_official_site"]"#,
        source: Source::Attribute("href"),
        normalize: Normalize::First,
    },
    FieldRule {
        field: Field::Description,
        selector: r#"div[class="kno-rdesc"] span"#,
        source: Source::OwnText,
        normalize: Normalize::First,
    },
    FieldRule {
        field: Field::StockPrice,
        selector: r#"div[data-attrid="kc:/business/issuer:stock quote"]"#,
        source: Source::Text,
        normalize: Normalize::Join {
            strip: &["Stock price:", "\u{202f}"],
        },
    },
    FieldRule {
        field: Field::Ceo,
        selector: r#"div[data-attrid="kc:/organization/organization:ceo"] a[class="fl"]"#,
        source: Source::Text,
        normalize: Normalize::Join { strip: &["CEO"] },
    },
    FieldRule {
        field: Field::Founder,
        selector: r#"div[data-attrid="kc:/business/business_operation:founder"]"#,
        source: Source::Text,
        // "Founders:" must go first or "Founder:" would leave a stray "s"
        normalize: Normalize::Join {
            strip: &["Founders:", "Founder:"],
        },
    },
    FieldRule {
        field: Field::Founded,
        selector: r#"div[data-attrid="kc:/organization/organization:founded"]"#,
        source: Source::Text,
        normalize: Normalize::Join { strip: &["Founded:"] },
    },
    FieldRule {
        field: Field::Headquarters,
        selector: r#"div[data-attrid="kc:/organization/organization:headquarters"]"#,
        source: Source::Text,
        normalize: Normalize::Join {
            strip: &["Headquarters:"],
        },
    },
    FieldRule {
        field: Field::NumberOfEmployees,
        selector: r#"div[data-attrid="ss:/webfacts:number_of_employe"]"#,
        source: Source::Text,
        normalize: Normalize::Join {
            strip: &["Number of employees:"],
        },
    },
];

impl Normalize {
    /// `None` when nothing matched; otherwise the cleaned value, possibly empty.
    pub fn apply(&self, fragments: Vec<String>) -> Option<String> {
        match self {
            Normalize::First => fragments.into_iter().next(),
            Normalize::Join { strip } => {
                if fragments.is_empty() {
                    return None;
                }
                let mut joined = fragments.concat();
                for label in strip.iter() {
                    joined = joined.replace(label, "");
                }
                Some(joined.trim().to_string())
            }
        }
    }
}

impl FieldRule {
    pub fn fragments<D: DocumentQuery>(&self, doc: &D) -> Vec<String> {
        match self.source {
            Source::Text => doc.select_text(self.selector),
            Source::OwnText => doc.select_own_text(self.selector),
            Source::Attribute(attr) => doc.select_attribute(self.selector, attr),
        }
    }

    pub fn extract<D: DocumentQuery>(&self, doc: &D) -> Option<String> {
        self.normalize.apply(self.fragments(doc))
    }
}

/// The ten panel fields of one page, before the query is attached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelFields([Option<String>; Field::COUNT]);

impl PanelFields {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0[field.index()].as_deref()
    }

    pub fn found(&self) -> usize {
        self.0.iter().filter(|v| v.is_some()).count()
    }

    pub fn into_record(self, input_company_name: impl Into<String>) -> CompanyRecord {
        let [company_name, company_type, website, description, stock_price, ceo, founder, founded, headquarters, number_of_employees] =
            self.0;
        CompanyRecord {
            company_name,
            company_type,
            website,
            description,
            stock_price,
            ceo,
            founder,
            founded,
            headquarters,
            number_of_employees,
            input_company_name: input_company_name.into(),
        }
    }
}

/// One output row. Field order is the CSV column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub company_name: Option<String>,
    pub company_type: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub stock_price: Option<String>,
    pub ceo: Option<String>,
    pub founder: Option<String>,
    pub founded: Option<String>,
    pub headquarters: Option<String>,
    pub number_of_employees: Option<String>,
    pub input_company_name: String,
}

impl CompanyRecord {
    pub const HEADERS: [&'static str; Field::COUNT + 1] = [
        "company_name",
        "company_type",
        "website",
        "description",
        "stock_price",
        "ceo",
        "founder",
        "founded",
        "headquarters",
        "number_of_employees",
        "input_company_name",
    ];

    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::CompanyName => self.company_name.as_deref(),
            Field::CompanyType => self.company_type.as_deref(),
            Field::Website => self.website.as_deref(),
            Field::Description => self.description.as_deref(),
            Field::StockPrice => self.stock_price.as_deref(),
            Field::Ceo => self.ceo.as_deref(),
            Field::Founder => self.founder.as_deref(),
            Field::Founded => self.founded.as_deref(),
            Field::Headquarters => self.headquarters.as_deref(),
            Field::NumberOfEmployees => self.number_of_employees.as_deref(),
        }
    }
}

/// Runs every rule against an already parsed document.
pub fn extract_fields<D: DocumentQuery>(doc: &D) -> PanelFields {
    let mut fields = PanelFields::default();
    for rule in PANEL_RULES.iter() {
        let value = rule.extract(doc);
        debug!("{} -> {:?}", rule.field.key(), value);
        fields.0[rule.field.index()] = value;
    }
    fields
}

/// Parses a page body and extracts the panel. Never fails.
pub fn extract_panel(body: &str) -> PanelFields {
    extract_fields(&PanelDocument::parse(body))
}
