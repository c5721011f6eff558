use std::io::{BufRead as _, IsTerminal as _, Write as _};
use std::path::Path;

use anyhow::Context as _;

use crate::cli::CleanArgs;
use crate::exit_codes::ExitCode;
use crate::history;
use crate::run_error::RunError;

pub(crate) fn clean(args: CleanArgs) -> Result<ExitCode, RunError> {
    let dir = args.history_dir.unwrap_or_else(history::default_dir);

    if !args.assume_yes {
        if !std::io::stdin().is_terminal() {
            return Err(RunError::InvalidInput(anyhow::anyhow!(
                "refusing to remove {} without confirmation (pass -y)",
                dir.display()
            )));
        }
        if !confirm(&dir).map_err(RunError::RuntimeError)? {
            eprintln!("aborted");
            return Ok(ExitCode::Success);
        }
    }

    if history::clean(&dir).map_err(RunError::RuntimeError)? {
        println!("removed {}", dir.display());
    } else {
        println!("nothing to remove at {}", dir.display());
    }
    Ok(ExitCode::Success)
}

fn confirm(dir: &Path) -> anyhow::Result<bool> {
    let mut err = std::io::stderr().lock();
    write!(err, "remove all archived reports in {}? [y/N] ", dir.display())?;
    err.flush()?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("read confirmation")?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
