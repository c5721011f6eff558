use std::time::Duration;

use anyhow::Context as _;
use url::Url;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    clap::ValueEnum,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FunctionType {
    /// Invoke a function directly through the platform API.
    Event,
    /// Send HTTP requests to a function's trigger URL.
    Http,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum InvocationType {
    #[default]
    Sync,
    Async,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StressOptions {
    pub num_users: u64,
    pub spawn_rate: u64,
    pub run_time: Duration,
    pub invocation_type: InvocationType,
}

impl Default for StressOptions {
    fn default() -> Self {
        Self {
            num_users: 6,
            spawn_rate: 10,
            run_time: Duration::from_secs(30),
            invocation_type: InvocationType::Sync,
        }
    }
}

/// What the load test hits. Each mode carries only the fields it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Event {
        service_name: String,
        function_name: String,
        qualifier: String,
        payload: Option<String>,
        host: String,
    },
    Http {
        url: Url,
        method: String,
        body: Option<String>,
        host: String,
    },
}

impl Target {
    #[must_use]
    pub fn function_type(&self) -> FunctionType {
        match self {
            Self::Event { .. } => FunctionType::Event,
            Self::Http { .. } => FunctionType::Http,
        }
    }

    #[must_use]
    pub fn host(&self) -> &str {
        match self {
            Self::Event { host, .. } | Self::Http { host, .. } => host,
        }
    }

    #[must_use]
    pub fn default_locustfile(&self) -> &'static str {
        match self {
            Self::Event { .. } => "locustfile.py",
            Self::Http { .. } => "locustfile_http.py",
        }
    }

    /// Environment handed to the locustfile.
    pub fn locust_env(
        &self,
        stress: &StressOptions,
    ) -> anyhow::Result<Vec<(&'static str, String)>> {
        let env = match self {
            Self::Event {
                service_name,
                function_name,
                qualifier,
                payload,
                ..
            } => vec![
                ("FC_SER", service_name.clone()),
                ("FC_FUNC", function_name.clone()),
                ("FC_QUALIFIER", qualifier.clone()),
                ("FC_HTTP_PAYLOAD", json_string(payload.as_deref())?),
                ("INVOCATION_TYPE", stress.invocation_type.to_string()),
            ],
            Self::Http {
                url, method, body, ..
            } => vec![
                ("FC_URL", url.to_string()),
                ("FC_METHOD", method.clone()),
                ("FC_PAYLOAD", json_string(body.as_deref())?),
            ],
        };
        Ok(env)
    }

    /// File stem used when archiving this target's reports.
    #[must_use]
    pub fn report_stem(&self) -> String {
        match self {
            Self::Event {
                service_name,
                function_name,
                qualifier,
                ..
            } => format!("{service_name}.{qualifier}-{function_name}"),
            Self::Http { .. } => "url".to_string(),
        }
    }
}

fn json_string(value: Option<&str>) -> anyhow::Result<String> {
    serde_json::to_string(value.unwrap_or_default()).context("encode payload")
}

/// Drops a leading `scheme://` or `//` from a host override.
#[must_use]
pub fn strip_scheme(host: &str) -> &str {
    let host = host.trim();
    if let Some((scheme, rest)) = host.split_once("://")
        && !scheme.is_empty()
        && scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return rest;
    }
    host.strip_prefix("//").unwrap_or(host)
}

/// Host for an HTTP target: the override when the URL already points at it,
/// otherwise the URL's own `host[:port]`.
pub fn http_host(url: &Url, custom: Option<&str>) -> anyhow::Result<String> {
    if let Some(custom) = custom.map(strip_scheme)
        && !custom.is_empty()
        && url.as_str().contains(custom)
    {
        return Ok(custom.to_string());
    }

    let host = url
        .host_str()
        .with_context(|| format!("url has no host: {url}"))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
