use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{DateTime, Local};

use crate::target::Target;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// `$XDG_CACHE_HOME/stressr/html`, falling back to `~/.cache` and then the temp dir.
pub(crate) fn default_dir() -> PathBuf {
    let cache = std::env::var_os("XDG_CACHE_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME")
                .filter(|v| !v.is_empty())
                .map(|home| PathBuf::from(home).join(".cache"))
        })
        .unwrap_or_else(std::env::temp_dir);
    cache.join("stressr").join("html")
}

pub(crate) fn file_name(target: &Target, at: DateTime<Local>) -> String {
    format!("{}#{}.html", target.report_stem(), at.format(TIMESTAMP_FORMAT))
}

/// Writes `html` into `dir` under a timestamped name and returns the path.
pub(crate) fn archive(dir: &Path, target: &Target, html: &str) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create report history dir: {}", dir.display()))?;

    let path = dir.join(file_name(target, Local::now()));
    std::fs::write(&path, html)
        .with_context(|| format!("failed to archive report: {}", path.display()))?;

    tracing::debug!(path = %path.display(), "archived report");
    Ok(path)
}

/// Removes the history dir. Returns `false` when there was nothing to remove.
pub(crate) fn clean(dir: &Path) -> anyhow::Result<bool> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(anyhow::Error::new(err)
            .context(format!("failed to remove report history dir: {}", dir.display()))),
    }
}
