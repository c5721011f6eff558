use stressr_report::ReportParser;

use crate::cli::ParseArgs;
use crate::config;
use crate::exit_codes::ExitCode;
use crate::output;
use crate::run_error::RunError;

pub(crate) fn parse(args: ParseArgs) -> Result<ExitCode, RunError> {
    let out = output::formatter(args.report_args.output);
    let options = config::parse_options(&args.report_args, None, None);

    let record = ReportParser::new(options)
        .parse_file(&args.report)
        .map_err(RunError::report)?;

    out.print_record(&record).map_err(RunError::RuntimeError)?;
    Ok(ExitCode::Success)
}
