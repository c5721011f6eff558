use std::path::Path;

use crate::error::{Error, ReportErrorKind, Result};
use crate::record::{MetricValue, StatisticsRecord};
use crate::rules::normalize_label;
use crate::table::{RowKind, TableRow, extract_rows};

/// Row positions of the "Aggregated" summaries in a Locust HTML report.
///
/// Locust renders two tables (request statistics, then response time
/// percentiles), each as a header row, one row per endpoint, and a totals row.
/// For a single-endpoint run the totals land at rows 2 and 5. This is a
/// property of the upstream report template, not something detected from the
/// content: if the template changes, update this list.
pub const LOCUST_AGGREGATED_ROWS: [usize; 2] = [2, 5];

/// Fixed row layout of the report: which rows to skip entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLayout {
    aggregated_rows: Vec<usize>,
}

impl ReportLayout {
    #[must_use]
    pub fn new(aggregated_rows: impl IntoIterator<Item = usize>) -> Self {
        let mut aggregated_rows = aggregated_rows.into_iter().collect::<Vec<_>>();
        aggregated_rows.sort_unstable();
        aggregated_rows.dedup();
        Self { aggregated_rows }
    }

    #[must_use]
    pub fn locust() -> Self {
        Self::new(LOCUST_AGGREGATED_ROWS)
    }

    #[must_use]
    pub fn aggregated_rows(&self) -> &[usize] {
        &self.aggregated_rows
    }

    #[must_use]
    pub fn is_aggregated(&self, index: usize) -> bool {
        self.aggregated_rows.binary_search(&index).is_ok()
    }
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self::locust()
    }
}

/// What to do when header and data cell counts disagree.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum MismatchPolicy {
    /// Zip up to the shorter sequence and log a warning.
    #[default]
    Truncate,
    /// Fail with [`Error::KeyValueMismatch`].
    Reject,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Embed the raw report under `report_html`.
    pub include_report: bool,
    pub layout: ReportLayout,
    pub mismatch: MismatchPolicy,
}

#[derive(Debug, Clone, Default)]
pub struct ReportParser {
    options: ParseOptions,
}

impl ReportParser {
    #[must_use]
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Reads the report at `path` and normalizes it.
    pub fn parse_file(&self, path: &Path) -> Result<StatisticsRecord> {
        let html = std::fs::read_to_string(path).map_err(|source| Error::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = html.len(), "read report");
        self.parse_str(&html)
    }

    pub fn parse_str(&self, html: &str) -> Result<StatisticsRecord> {
        let rows = extract_rows(html)?;
        let record = build_record(&rows, &self.options)?;
        if self.options.include_report {
            return Ok(record.with_report_html(html));
        }
        Ok(record)
    }
}

/// Reads and normalizes a report with the default Locust layout.
pub fn parse_report(path: &Path, include_report: bool) -> Result<StatisticsRecord> {
    ReportParser::new(ParseOptions {
        include_report,
        ..ParseOptions::default()
    })
    .parse_file(path)
}

/// Flattens rows into key and value sequences and zips them into a record.
///
/// `options.include_report` is ignored here; there is no raw document.
pub fn build_record(rows: &[TableRow], options: &ParseOptions) -> Result<StatisticsRecord> {
    let mut keys: Vec<String> = Vec::new();
    let mut values: Vec<MetricValue> = Vec::new();

    for row in rows {
        if options.layout.is_aggregated(row.index) {
            tracing::debug!(row = row.index, kind = %row.kind(), "skipping aggregated row");
            continue;
        }
        if row.kind() == RowKind::Empty {
            return Err(Error::UnclassifiedRow { index: row.index });
        }

        keys.extend(row.labels.iter().map(|label| normalize_label(label)));
        values.extend(row.cells.iter().map(|cell| MetricValue::from_cell(cell)));
    }

    if keys.len() != values.len() {
        match options.mismatch {
            MismatchPolicy::Reject => {
                return Err(Error::KeyValueMismatch {
                    keys: keys.len(),
                    values: values.len(),
                });
            }
            MismatchPolicy::Truncate => tracing::warn!(
                kind = %ReportErrorKind::KeyValueMismatch,
                keys = keys.len(),
                values = values.len(),
                "report header and data cell counts differ; truncating to the shorter"
            ),
        }
    }

    let mut record = StatisticsRecord::new();
    for (key, value) in keys.into_iter().zip(values) {
        if !record.insert(key.as_str(), value) {
            tracing::debug!(key = %key, "dropping excluded metric");
        }
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportErrorKind;
    use crate::record::REPORT_HTML_KEY;
    use std::sync::{Arc, Mutex};

    const LOCUST_REPORT: &str = include_str!("../tests/fixtures/locust_report.html");

    fn row(index: usize, labels: &[&str], cells: &[&str]) -> TableRow {
        TableRow {
            index,
            labels: labels.iter().map(|s| s.to_string()).collect(),
            cells: cells.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn parse(html: &str, options: ParseOptions) -> StatisticsRecord {
        match ReportParser::new(options).parse_str(html) {
            Ok(v) => v,
            Err(err) => panic!("parse failed: {err}"),
        }
    }

    #[test]
    fn single_header_and_data_row() {
        let html = "<table>\
            <tr><th>50%ile (ms)</th><th># Requests</th></tr>\
            <tr><td>120</td><td>500</td></tr>\
            </table>";

        let record = parse(html, ParseOptions::default());

        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["p50", "Requests"]);
        assert_eq!(record.get("p50"), Some(&MetricValue::Number(120.0)));
        assert_eq!(record.get("Requests"), Some(&MetricValue::Number(500.0)));
        assert_eq!(record.report_html(), None);
    }

    #[test]
    fn aggregated_rows_never_contribute() {
        let rows = [
            row(0, &["# Requests"], &[]),
            row(1, &[], &["10"]),
            row(2, &["Bogus"], &["999", "998"]),
            row(3, &["50%ile (ms)"], &[]),
            row(4, &[], &["7"]),
            row(5, &[], &[]),
        ];

        let record = match build_record(&rows, &ParseOptions::default()) {
            Ok(v) => v,
            Err(err) => panic!("build_record failed: {err}"),
        };

        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["Requests", "p50"]);
        assert_eq!(record.get("Requests").and_then(MetricValue::as_f64), Some(10.0));
        assert_eq!(record.get("p50").and_then(MetricValue::as_f64), Some(7.0));
        assert!(!record.contains_key("Bogus"));
    }

    #[test]
    fn custom_layout_moves_the_skipped_rows() {
        let rows = [
            row(0, &["RPS"], &[]),
            row(1, &[], &["1"]),
            row(2, &["Min (ms)"], &[]),
            row(3, &[], &["2"]),
        ];
        let options = ParseOptions {
            layout: ReportLayout::new([1, 2]),
            ..ParseOptions::default()
        };

        let record = match build_record(&rows, &options) {
            Ok(v) => v,
            Err(err) => panic!("build_record failed: {err}"),
        };

        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["RPS"]);
        assert_eq!(record.get("RPS").and_then(MetricValue::as_f64), Some(2.0));
    }

    #[test]
    fn excluded_metrics_are_dropped_even_with_values() {
        let rows = [
            row(0, &["Average size (bytes)", "100%ile (ms)", "99%ile (ms)"], &[]),
            row(1, &[], &["27", "390", "120"]),
        ];

        let record = match build_record(&rows, &ParseOptions::default()) {
            Ok(v) => v,
            Err(err) => panic!("build_record failed: {err}"),
        };

        assert_eq!(record.len(), 1);
        assert!(!record.contains_key("AverageSize"));
        assert!(!record.contains_key("p100"));
        assert_eq!(record.get("p99").and_then(MetricValue::as_f64), Some(120.0));
    }

    #[test]
    fn non_numeric_cells_keep_raw_text() {
        let rows = [row(0, &["Method", "Max (ms)"], &[]), row(1, &[], &["GET", "N/A"])];

        let record = match build_record(&rows, &ParseOptions::default()) {
            Ok(v) => v,
            Err(err) => panic!("build_record failed: {err}"),
        };

        assert_eq!(record.get("Method").and_then(MetricValue::as_text), Some("GET"));
        assert_eq!(record.get("Max").and_then(MetricValue::as_text), Some("N/A"));
    }

    #[test]
    fn mismatch_truncates_by_default() {
        // Extra header cells, e.g. a failures table with no rows.
        let rows = [
            row(0, &["# Requests", "# Fails"], &[]),
            row(1, &[], &["10", "0"]),
            row(3, &["# occurrences", "Method"], &[]),
        ];

        let record = match build_record(&rows, &ParseOptions::default()) {
            Ok(v) => v,
            Err(err) => panic!("build_record failed: {err}"),
        };
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["Requests", "Fails"]);

        let rows = [row(0, &["RPS"], &[]), row(1, &[], &["3.5", "extra"])];
        let record = match build_record(&rows, &ParseOptions::default()) {
            Ok(v) => v,
            Err(err) => panic!("build_record failed: {err}"),
        };
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("RPS").and_then(MetricValue::as_f64), Some(3.5));
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl CapturedLog {
        fn contents(&self) -> String {
            let buf = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            String::from_utf8_lossy(&buf).into_owned()
        }
    }

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn truncation_warning_carries_error_kind() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();

        let rows = [row(0, &["RPS", "# Fails"], &[]), row(1, &[], &["3.5"])];
        let result = tracing::subscriber::with_default(subscriber, || {
            build_record(&rows, &ParseOptions::default())
        });
        if let Err(err) = result {
            panic!("build_record failed: {err}");
        }

        let out = log.contents();
        assert!(out.contains("kind=key_value_mismatch"), "log: {out}");
        assert!(out.contains("keys=2") && out.contains("values=1"), "log: {out}");
    }

    #[test]
    fn mismatch_is_an_error_when_rejected() {
        let rows = [row(0, &["RPS", "Min (ms)"], &[]), row(1, &[], &["3.5"])];
        let options = ParseOptions {
            mismatch: MismatchPolicy::Reject,
            ..ParseOptions::default()
        };

        match build_record(&rows, &options) {
            Ok(record) => panic!("expected mismatch error, got {record:?}"),
            Err(Error::KeyValueMismatch { keys, values }) => {
                assert_eq!((keys, values), (2, 1));
            }
            Err(err) => panic!("unexpected error: {err}"),
        }
    }

    #[test]
    fn empty_row_outside_aggregated_positions_is_malformed() {
        let html = "<table><tr><th>RPS</th></tr><tr></tr><tr><td>1</td></tr></table>";
        match ReportParser::default().parse_str(html) {
            Ok(record) => panic!("expected error, got {record:?}"),
            Err(err) => {
                assert_eq!(err.kind(), ReportErrorKind::ReportMalformed);
                assert!(matches!(err, Error::UnclassifiedRow { index: 1 }));
            }
        }
    }

    #[test]
    fn report_is_embedded_only_on_request() {
        let html = "<table><tr><th>RPS</th></tr><tr><td>1.5</td></tr></table>";

        let without = parse(html, ParseOptions::default());
        assert_eq!(without.report_html(), None);

        let with = parse(
            html,
            ParseOptions {
                include_report: true,
                ..ParseOptions::default()
            },
        );
        assert_eq!(with.report_html(), Some(html));
        assert!(!with.contains_key(REPORT_HTML_KEY));
        assert_eq!(with.len(), without.len());
    }

    #[test]
    fn locust_report_fixture() {
        let record = parse(LOCUST_REPORT, ParseOptions::default());

        let expected: &[(&str, MetricValue)] = &[
            ("Type", MetricValue::from("POST")),
            ("Name", MetricValue::from("/invoke")),
            ("Requests", MetricValue::Number(1520.0)),
            ("Fails", MetricValue::Number(0.0)),
            ("Average", MetricValue::Number(41.0)),
            ("Min", MetricValue::Number(12.0)),
            ("Max", MetricValue::Number(388.0)),
            ("RPS", MetricValue::Number(50.7)),
            ("Failures/s", MetricValue::Number(0.0)),
            ("p50", MetricValue::Number(35.0)),
            ("p60", MetricValue::Number(38.0)),
            ("p70", MetricValue::Number(42.0)),
            ("p90", MetricValue::Number(56.0)),
            ("p95", MetricValue::Number(70.0)),
            ("p99", MetricValue::Number(120.0)),
        ];

        let actual = record
            .iter()
            .map(|(k, v)| (k, v.clone()))
            .collect::<Vec<_>>();
        let expected = expected
            .iter()
            .map(|(k, v)| (*k, v.clone()))
            .collect::<Vec<_>>();
        assert_eq!(actual, expected);
    }

    #[test]
    fn locust_report_skips_aggregated_values() {
        let record = parse(LOCUST_REPORT, ParseOptions::default());
        // The aggregated rows carry an empty method cell and "Aggregated" as name.
        assert_ne!(record.get("Name").and_then(MetricValue::as_text), Some("Aggregated"));
        assert_ne!(record.get("Type").and_then(MetricValue::as_text), Some(""));
    }

    #[test]
    fn missing_file_is_unreadable() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("report.html");

        match parse_report(&path, false) {
            Ok(record) => panic!("expected error, got {record:?}"),
            Err(err) => assert_eq!(err.kind(), ReportErrorKind::ReportUnreadable),
        }
        Ok(())
    }

    #[test]
    fn non_utf8_file_is_unreadable() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("report.html");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x3c])?;

        match parse_report(&path, false) {
            Ok(record) => panic!("expected error, got {record:?}"),
            Err(err) => assert_eq!(err.kind(), ReportErrorKind::ReportUnreadable),
        }
        Ok(())
    }

    #[test]
    fn parse_file_embeds_file_contents() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("report.html");
        std::fs::write(&path, LOCUST_REPORT)?;

        let record = parse_report(&path, true)?;
        assert_eq!(record.report_html(), Some(LOCUST_REPORT));
        assert_eq!(record.get("p95").and_then(MetricValue::as_f64), Some(70.0));
        Ok(())
    }

    #[test]
    fn layout_dedups_and_sorts() {
        let layout = ReportLayout::new([5, 2, 5]);
        assert_eq!(layout.aggregated_rows(), &[2, 5]);
        assert_eq!(layout, ReportLayout::locust());
        assert!(layout.is_aggregated(2));
        assert!(!layout.is_aggregated(3));
    }

    #[test]
    fn mismatch_policy_parses_from_snake_case() {
        assert_eq!("reject".parse::<MismatchPolicy>(), Ok(MismatchPolicy::Reject));
        assert_eq!(MismatchPolicy::default().to_string(), "truncate");
    }
}
