use std::path::Path;

pub(crate) mod progress;

use progress::RunSpinner;
use stressr_report::{MetricValue, StatisticsRecord};

use super::OutputFormatter;
use crate::config::RunSettings;
use crate::target::Target;

pub(crate) struct HumanReadableOutput;

impl OutputFormatter for HumanReadableOutput {
    fn print_header(&self, settings: &RunSettings) {
        let stress = &settings.stress;
        match &settings.target {
            Target::Event {
                service_name,
                function_name,
                qualifier,
                ..
            } => println!(
                "target: {} {service_name}.{qualifier}/{function_name} host={} invocation={}",
                settings.target.function_type(),
                settings.target.host(),
                stress.invocation_type
            ),
            Target::Http { url, method, .. } => println!(
                "target: {} {method} {url}",
                settings.target.function_type()
            ),
        }
        println!(
            "load: users={} spawn_rate={}/s run_time={}",
            stress.num_users,
            stress.spawn_rate,
            humantime::format_duration(stress.run_time)
        );
        println!();
    }

    fn progress(&self, settings: &RunSettings) -> Option<RunSpinner> {
        Some(RunSpinner::start(settings.stress.run_time))
    }

    fn print_record(&self, record: &StatisticsRecord) -> anyhow::Result<()> {
        print!("{}", render(record));
        Ok(())
    }

    fn print_archived(&self, path: &Path) {
        println!();
        println!("report archived: {}", path.display());
    }
}

fn render(record: &StatisticsRecord) -> String {
    let key = stressr_report::REPORT_HTML_KEY;
    let width = record
        .keys()
        .chain(record.report_html().map(|_| key))
        .map(str::len)
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    if record.is_empty() {
        out.push_str("no metrics found in report\n");
    }
    for (key, value) in record.iter() {
        out.push_str(&format!("{key:<width$}  {}\n", format_value(value)));
    }
    if let Some(html) = record.report_html() {
        out.push_str(&format!("{key:<width$}  (embedded, {} bytes)\n", html.len()));
    }
    out
}

fn format_value(value: &MetricValue) -> String {
    match value {
        MetricValue::Number(v) if !v.is_finite() => "-".to_string(),
        other => other.to_string(),
    }
}
