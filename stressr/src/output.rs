use crate::cli::OutputFormat;
use crate::config::RunSettings;
use std::path::Path;
use stressr_report::StatisticsRecord;

mod human;
mod json;

pub(crate) use human::progress::RunSpinner;

pub(crate) trait OutputFormatter: Send + Sync {
    fn print_header(&self, settings: &RunSettings);
    fn progress(&self, settings: &RunSettings) -> Option<RunSpinner>;
    fn print_record(&self, record: &StatisticsRecord) -> anyhow::Result<()>;
    fn print_archived(&self, path: &Path);
}

pub(crate) fn formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::HumanReadable => Box::new(human::HumanReadableOutput),
        OutputFormat::Json => Box::new(json::JsonOutput),
    }
}
