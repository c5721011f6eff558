//! Normalization of Locust HTML reports into flat statistics records.
//!
//! A report is read once, its table rows are flattened into a header-label
//! sequence and a data-cell sequence, and the two are zipped into a
//! [`StatisticsRecord`] keyed by canonical metric names (`p50`, `Requests`, ...).

mod error;
mod parser;
mod record;
mod rules;
mod table;

pub use error::{Error, ReportErrorKind, Result};
pub use parser::{
    LOCUST_AGGREGATED_ROWS, MismatchPolicy, ParseOptions, ReportLayout, ReportParser, build_record,
    parse_report,
};
pub use record::{EXCLUDED_KEYS, MetricValue, REPORT_HTML_KEY, StatisticsRecord};
pub use rules::{NORMALIZATION_RULES, NormalizationRule, normalize_label};
pub use table::{RowKind, TableRow, extract_rows};
