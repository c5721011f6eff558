use std::io::Read;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

use anyhow::Context as _;

use crate::config::RunSettings;

#[derive(Debug)]
pub(crate) struct LocustRun {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl LocustRun {
    /// Last lines of both streams, for diagnostics.
    pub(crate) fn diag(&self) -> String {
        let out = truncate(&tail_lines(&self.stdout, 12), 1200);
        let err = truncate(&tail_lines(&self.stderr, 12), 1200);
        format!("--- locust stdout (tail) ---\n{out}\n--- locust stderr (tail) ---\n{err}")
    }
}

/// Builds the headless locust invocation for `settings`.
pub(crate) fn build_command(settings: &RunSettings) -> anyhow::Result<Command> {
    let stress = &settings.stress;

    let mut cmd = Command::new(&settings.locust);
    cmd.arg("-f")
        .arg(&settings.locustfile)
        .arg("-H")
        .arg(format!("http://{}", settings.target.host()))
        .arg("-u")
        .arg(stress.num_users.to_string())
        .arg("-r")
        .arg(stress.spawn_rate.to_string())
        .arg("-t")
        .arg(format!("{}s", stress.run_time.as_secs()))
        .arg("--headless")
        .arg("--html")
        .arg(&settings.report_path)
        .stdin(Stdio::null());

    for (k, v) in settings.target.locust_env(stress)? {
        cmd.env(k, v);
    }
    Ok(cmd)
}

/// Deletes a report left over from an earlier run so it is never parsed twice.
pub(crate) fn remove_stale_report(path: &Path) -> anyhow::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed stale report");
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(anyhow::Error::new(err)
            .context(format!("failed to remove stale report: {}", path.display()))),
    }
}

/// Runs locust to completion, capturing both output streams.
pub(crate) fn run(mut cmd: Command) -> anyhow::Result<LocustRun> {
    tracing::info!(command = %command_to_string(&cmd), env = %env_to_string(&cmd), "starting locust");

    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    let mut child = cmd
        .spawn()
        .with_context(|| format!("failed to spawn {}", cmd.get_program().to_string_lossy()))?;

    let stdout = child.stdout.take().context("take locust stdout")?;
    let stderr = child.stderr.take().context("take locust stderr")?;

    let out_handle = thread::spawn(move || read_to_string(stdout));
    let err_handle = thread::spawn(move || read_to_string(stderr));

    let status = child.wait().context("wait for locust")?;

    let stdout = out_handle
        .join()
        .ok()
        .unwrap_or_else(|| Ok(String::new()))?;
    let stderr = err_handle
        .join()
        .ok()
        .unwrap_or_else(|| Ok(String::new()))?;

    Ok(LocustRun {
        status,
        stdout,
        stderr,
    })
}

pub(crate) fn command_to_string(cmd: &Command) -> String {
    let prog = cmd.get_program().to_string_lossy();
    let mut out = String::new();
    out.push_str(&quote_for_display(&prog));
    for arg in cmd.get_args() {
        out.push(' ');
        out.push_str(&quote_for_display(&arg.to_string_lossy()));
    }
    out
}

fn env_to_string(cmd: &Command) -> String {
    cmd.get_envs()
        .filter_map(|(k, v)| Some((k, v?)))
        .map(|(k, v)| {
            format!(
                "{}={}",
                k.to_string_lossy(),
                quote_for_display(&v.to_string_lossy())
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_for_display(s: &str) -> String {
    // Not a shell-accurate escaper; just makes spaces/specials unambiguous in logs.
    let needs_quotes = s.is_empty()
        || s.chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\\'));
    if !needs_quotes {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn read_to_string<R: Read>(mut r: R) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    r.read_to_end(&mut buf).context("read locust output")?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn tail_lines(s: &str, n: usize) -> String {
    let mut lines: Vec<&str> = s.lines().rev().take(n).collect();
    lines.reverse();
    lines.join("\n")
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }

    let mut out = String::with_capacity(max_chars + 3);
    out.extend(s.chars().take(max_chars));
    out.push_str("...");
    out
}
