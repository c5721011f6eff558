use serde::Serialize;
use std::io::Write as _;
use std::path::Path;

use stressr_report::StatisticsRecord;

use super::{OutputFormatter, RunSpinner};
use crate::config::RunSettings;

/// Machine-readable output: the record is the only thing written to stdout.
pub(crate) struct JsonOutput;

impl OutputFormatter for JsonOutput {
    fn print_header(&self, _settings: &RunSettings) {}

    fn progress(&self, _settings: &RunSettings) -> Option<RunSpinner> {
        None
    }

    fn print_record(&self, record: &StatisticsRecord) -> anyhow::Result<()> {
        emit_json_line(record)
    }

    // stdout carries only the record.
    fn print_archived(&self, path: &Path) {
        eprintln!("report archived: {}", path.display());
    }
}

fn emit_json_line<T: Serialize>(line: &T) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer(&mut out, line)?;
    writeln!(out)?;
    Ok(())
}
