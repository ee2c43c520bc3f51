//! 四种请求动词的 CLI 操作

use super::output::{envelope_json, headers_json, print_json};
use super::ui::{format_outcome, print_error, print_header, print_json_block, print_kv, print_section};
use super::OutputFormat;
use anyhow::Context;
use courier_core::{ApiClient, ApiResponse, RequestOptions};
use reqwest::header::{HeaderName, HeaderValue};
use serde_json::{json, Value};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        }
    }
}

/// Everything parsed from the command line for one request.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(HeaderName, HeaderValue)>,
    pub auth: bool,
}

impl RequestSpec {
    fn options(&self) -> RequestOptions {
        let mut options = RequestOptions::new().auth(self.auth);
        for (key, value) in &self.query {
            options = options.query(key.clone(), value.clone());
        }
        for (name, value) in &self.headers {
            options = options.header(name.clone(), value.clone());
        }
        options
    }
}

/// Parse `key=value`.
pub fn parse_query(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    if key.is_empty() {
        return Err(format!("empty query key in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Parse `Name: value`.
pub fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected name:value, got `{raw}`"))?;
    let name = HeaderName::from_bytes(name.trim().as_bytes())
        .map_err(|e| format!("invalid header name in `{raw}`: {e}"))?;
    let value = HeaderValue::from_str(value.trim())
        .map_err(|e| format!("invalid header value in `{raw}`: {e}"))?;
    Ok((name, value))
}

/// Request body from `--data` or `--file`; `None` when neither is given.
pub fn load_body(data: Option<&str>, file: Option<&Path>) -> anyhow::Result<Option<Value>> {
    if let Some(inline) = data {
        let body = serde_json::from_str(inline).context("--data is not valid JSON")?;
        return Ok(Some(body));
    }
    if let Some(path) = file {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let body = serde_json::from_str(&raw)
            .with_context(|| format!("{} is not valid JSON", path.display()))?;
        return Ok(Some(body));
    }
    Ok(None)
}

/// Send one request and print the normalized result. Returns whether it succeeded.
pub async fn send_request(
    client: &ApiClient,
    verb: Verb,
    spec: RequestSpec,
    body: Option<Value>,
    output: OutputFormat,
) -> anyhow::Result<bool> {
    let options = spec.options();
    let outcome = match verb {
        Verb::Get => client.get::<Value>(&spec.path, options).await,
        Verb::Delete => client.delete::<Value>(&spec.path, options).await,
        Verb::Post => client.post::<Value, _>(&spec.path, body.as_ref(), options).await,
        Verb::Put => client.put::<Value, _>(&spec.path, body.as_ref(), options).await,
    };

    let resp = match outcome {
        Ok(resp) => resp,
        Err(signal) => {
            if output == OutputFormat::Json {
                print_json(&json!({
                    "succeeded": false,
                    "session_expired": true,
                    "url": signal.url,
                }))?;
            } else {
                print_error(&signal.to_string());
            }
            return Ok(false);
        }
    };

    match output {
        OutputFormat::Json => print_json(&envelope_json(&resp))?,
        OutputFormat::Table => print_table(verb, &spec.path, &resp),
    }
    Ok(resp.succeeded())
}

fn print_table(verb: Verb, path: &str, resp: &ApiResponse<Value>) {
    print_header(&format!("{} {}", verb.as_str(), path));
    print_kv(
        "Result",
        &format_outcome(resp.succeeded(), resp.error().map(|e| e.kind())),
    );

    if let Some(headers) = resp.headers() {
        print_section("Headers");
        if let Value::Object(map) = headers_json(headers) {
            for (name, value) in map {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                print_kv(&name, &value);
            }
        }
    }

    print_section("Body");
    match resp.error() {
        Some(err) => print_json_block(err.body()),
        None => print_json_block(resp.payload().unwrap_or(&Value::Null)),
    }
    println!();
}
