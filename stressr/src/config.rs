use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use serde::Deserialize;
use stressr_report::{MismatchPolicy, ParseOptions, ReportLayout};
use url::Url;

use crate::cli::{ReportArgs, RunArgs};
use crate::history;
use crate::target::{FunctionType, InvocationType, StressOptions, Target, http_host, strip_scheme};

/// Run profile loaded from `--config`. Every field is optional; CLI flags win.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct Profile {
    pub function_type: Option<FunctionType>,

    pub num_users: Option<u64>,
    pub spawn_rate: Option<u64>,
    #[serde(default)]
    pub run_time: Option<YamlDuration>,
    pub invocation_type: Option<String>,

    // event
    pub service_name: Option<String>,
    pub function_name: Option<String>,
    pub qualifier: Option<String>,

    // http
    pub url: Option<String>,
    pub method: Option<String>,

    pub host: Option<String>,
    pub payload: Option<String>,
    pub payload_file: Option<PathBuf>,

    pub locust: Option<PathBuf>,
    pub locustfile: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
    pub history_dir: Option<PathBuf>,

    pub aggregated_rows: Option<Vec<usize>>,
    pub strict: Option<bool>,
}

impl Profile {
    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("invalid config: {}", path.display()))
    }

    pub(crate) fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct YamlDuration(pub Duration);

impl<'de> Deserialize<'de> for YamlDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;

        impl serde::de::Visitor<'_> for V {
            type Value = YamlDuration;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("duration as string (e.g. 30s, 2m) or integer seconds")
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(YamlDuration(Duration::from_secs(v)))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if v <= 0 {
                    return Err(E::custom("duration must be positive"));
                }
                Ok(YamlDuration(Duration::from_secs(v as u64)))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                parse_run_time(v).map(YamlDuration).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(V)
    }
}

/// Accepts bare seconds (`30`) or a humantime duration (`30s`, `2m`).
pub(crate) fn parse_run_time(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("run time cannot be empty (expected e.g. 30, 30s, 2m)".to_string());
    }
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(s).map_err(|err| format!("invalid run time '{s}': {err}"))
}

/// Everything a `run` needs, with all layers merged.
#[derive(Debug, Clone)]
pub(crate) struct RunSettings {
    pub stress: StressOptions,
    pub target: Target,
    pub locust: PathBuf,
    pub locustfile: PathBuf,
    pub report_path: PathBuf,
    pub history_dir: PathBuf,
    pub parse: ParseOptions,
}

pub(crate) fn resolve(args: &RunArgs, profile: Profile) -> anyhow::Result<RunSettings> {
    let defaults = StressOptions::default();

    let invocation_type = match args.invocation_type.as_deref().or(profile.invocation_type.as_deref()) {
        Some(raw) => raw
            .parse::<InvocationType>()
            .map_err(|_| anyhow::anyhow!("invalid invocation type `{raw}` (expected Sync or Async)"))?,
        None => defaults.invocation_type,
    };

    let run_time = args
        .run_time
        .or(profile.run_time.map(|d| d.0))
        .unwrap_or(defaults.run_time);
    if run_time.as_secs() == 0 {
        anyhow::bail!("run time must be at least 1s");
    }

    let stress = StressOptions {
        num_users: positive("num users", args.num_users.or(profile.num_users), defaults.num_users)?,
        spawn_rate: positive("spawn rate", args.spawn_rate.or(profile.spawn_rate), defaults.spawn_rate)?,
        run_time,
        invocation_type,
    };

    let function_type = args
        .function_type
        .or(profile.function_type)
        .context("missing function type (pass --function-type event|http)")?;

    let payload = payload(
        args.payload.clone().or(profile.payload),
        args.payload_file.clone().or(profile.payload_file),
    )?;
    let host = args.host.clone().or(profile.host);

    let target = match function_type {
        FunctionType::Event => {
            let service_name = args
                .service_name
                .clone()
                .or(profile.service_name)
                .context("event targets require --service-name")?;
            let function_name = args
                .function_name
                .clone()
                .or(profile.function_name)
                .context("event targets require --function-name")?;
            let host = host
                .as_deref()
                .map(strip_scheme)
                .filter(|h| !h.is_empty())
                .context("event targets require --host (the function endpoint host)")?
                .to_string();
            Target::Event {
                service_name,
                function_name,
                qualifier: args
                    .qualifier
                    .clone()
                    .or(profile.qualifier)
                    .unwrap_or_else(|| "LATEST".to_string()),
                payload,
                host,
            }
        }
        FunctionType::Http => {
            let raw = args
                .url
                .clone()
                .or(profile.url)
                .context("http targets require --url")?;
            let url = Url::parse(&raw).with_context(|| format!("invalid --url: {raw}"))?;
            let host = http_host(&url, host.as_deref())?;
            Target::Http {
                url,
                method: args
                    .method
                    .clone()
                    .or(profile.method)
                    .unwrap_or_else(|| "GET".to_string())
                    .to_ascii_uppercase(),
                body: payload,
                host,
            }
        }
    };

    let locustfile = args
        .locustfile
        .clone()
        .or(profile.locustfile)
        .unwrap_or_else(|| PathBuf::from(target.default_locustfile()));

    Ok(RunSettings {
        stress,
        locust: args
            .locust
            .clone()
            .or(profile.locust)
            .unwrap_or_else(|| PathBuf::from("locust")),
        locustfile,
        report_path: args
            .report_path
            .clone()
            .or(profile.report_path)
            .unwrap_or_else(|| std::env::temp_dir().join("stressr-report.html")),
        history_dir: args
            .history_dir
            .clone()
            .or(profile.history_dir)
            .unwrap_or_else(history::default_dir),
        parse: parse_options(&args.report, profile.aggregated_rows, profile.strict),
        target,
    })
}

/// Parse options from CLI flags, falling back to profile values.
pub(crate) fn parse_options(
    args: &ReportArgs,
    aggregated_rows: Option<Vec<usize>>,
    strict: Option<bool>,
) -> ParseOptions {
    let layout = if !args.aggregated_rows.is_empty() {
        ReportLayout::new(args.aggregated_rows.iter().copied())
    } else if let Some(rows) = aggregated_rows {
        ReportLayout::new(rows)
    } else {
        ReportLayout::locust()
    };

    let mismatch = if args.strict || strict.unwrap_or(false) {
        MismatchPolicy::Reject
    } else {
        MismatchPolicy::Truncate
    };

    ParseOptions {
        include_report: args.include_report,
        layout,
        mismatch,
    }
}

fn positive(name: &str, value: Option<u64>, default: u64) -> anyhow::Result<u64> {
    match value {
        Some(0) => anyhow::bail!("{name} must be a positive integer"),
        Some(v) => Ok(v),
        None => Ok(default),
    }
}

/// Inline payload wins over a payload file.
fn payload(inline: Option<String>, file: Option<PathBuf>) -> anyhow::Result<Option<String>> {
    match (inline, file) {
        (Some(inline), Some(file)) => {
            tracing::warn!(file = %file.display(), "both payload and payload file given; using the inline payload");
            Ok(Some(inline))
        }
        (Some(inline), None) => Ok(Some(inline)),
        (None, Some(file)) => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read payload file: {}", file.display()))?;
            Ok(Some(raw))
        }
        (None, None) => Ok(None),
    }
}
