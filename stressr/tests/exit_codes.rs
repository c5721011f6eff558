use std::process::{Command, Stdio};

use anyhow::Context as _;

fn status_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

fn stressr(args: &[&str]) -> anyhow::Result<std::process::Output> {
    Command::new(env!("CARGO_BIN_EXE_stressr"))
        .args(args)
        .env_remove("STRESSR_CONFIG")
        .env_remove("STRESSR_HOST")
        .stdin(Stdio::null())
        .output()
        .context("run stressr binary")
}

fn ensure_code(out: &std::process::Output, expected: i32) -> anyhow::Result<()> {
    anyhow::ensure!(
        status_code(out.status) == expected,
        "expected exit code {expected}, got {}\nstdout:\n{}\nstderr:\n{}",
        status_code(out.status),
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    Ok(())
}

#[test]
fn help_exits_0() -> anyhow::Result<()> {
    ensure_code(&stressr(&["--help"])?, 0)
}

#[test]
fn invalid_flags_exit_30() -> anyhow::Result<()> {
    ensure_code(&stressr(&["run", "--run-time", "10x"])?, 30)?;
    ensure_code(&stressr(&["run", "--function-type", "grpc"])?, 30)
}

#[test]
fn missing_target_fields_exit_30() -> anyhow::Result<()> {
    let out = stressr(&[
        "run",
        "--function-type",
        "event",
        "--service-name",
        "svc",
        "--function-name",
        "fn",
    ])?;
    ensure_code(&out, 30)?;
    anyhow::ensure!(
        String::from_utf8_lossy(&out.stderr).contains("--host"),
        "stderr should name the missing flag"
    );
    Ok(())
}

#[test]
fn unreadable_report_exit_20() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("missing.html");
    let missing = missing.to_string_lossy();

    let out = stressr(&["parse", &missing])?;
    ensure_code(&out, 20)?;
    anyhow::ensure!(
        String::from_utf8_lossy(&out.stderr).contains("report_unreadable"),
        "stderr should carry the error kind"
    );
    Ok(())
}

#[test]
fn clean_without_confirmation_exit_30() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let history = dir.path().to_string_lossy();
    ensure_code(&stressr(&["clean", "--history-dir", &history])?, 30)
}
