use stressr_report::{ParseOptions, ReportParser};

use crate::cli::RunArgs;
use crate::config::{self, Profile};
use crate::exit_codes::ExitCode;
use crate::run_error::RunError;
use crate::{history, locust, output};

pub(crate) fn run(args: RunArgs) -> Result<ExitCode, RunError> {
    let out = output::formatter(args.report.output);

    let profile = match &args.config {
        Some(path) => Profile::load(path).map_err(RunError::InvalidInput)?,
        None => Profile::default(),
    };
    let settings = config::resolve(&args, profile).map_err(RunError::InvalidInput)?;
    let cmd = locust::build_command(&settings).map_err(RunError::InvalidInput)?;

    locust::remove_stale_report(&settings.report_path).map_err(RunError::RuntimeError)?;

    out.print_header(&settings);
    let spinner = out.progress(&settings);
    let result = locust::run(cmd);
    if let Some(spinner) = &spinner {
        spinner.set_message("reading report");
    }
    let locust_run = result.map_err(RunError::RuntimeError)?;

    if !locust_run.status.success() {
        // Locust exits non-zero whenever a request failed; the report is still valid.
        tracing::warn!(status = %locust_run.status, "locust exited with a failure status");
        tracing::debug!("{}", locust_run.diag());
    }

    // Always read with the raw HTML attached so it can be archived.
    let parser = ReportParser::new(ParseOptions {
        include_report: true,
        ..settings.parse.clone()
    });
    let parsed = parser.parse_file(&settings.report_path);
    if let Some(spinner) = spinner {
        spinner.finish();
    }
    let mut record = parsed.map_err(|err| {
        if !locust_run.status.success() {
            tracing::warn!("{}", locust_run.diag());
        }
        RunError::produced_report(err)
    })?;

    let html = record.take_report_html().unwrap_or_default();
    let archived =
        history::archive(&settings.history_dir, &settings.target, &html).map_err(RunError::RuntimeError)?;

    if settings.parse.include_report {
        record = record.with_report_html(html);
    }

    out.print_record(&record).map_err(RunError::RuntimeError)?;
    out.print_archived(&archived);
    Ok(ExitCode::Success)
}
