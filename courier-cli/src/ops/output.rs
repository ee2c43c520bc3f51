use clap::ValueEnum;
use courier_core::{ApiResponse, AppError};
use serde_json::{json, Map, Value};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

pub fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Flatten a normalized response into plain JSON for `--output json`.
pub fn envelope_json(resp: &ApiResponse<Value>) -> Value {
    json!({
        "succeeded": resp.succeeded(),
        "payload": resp.payload().cloned().unwrap_or(Value::Null),
        "error": resp.error().map(error_json).unwrap_or(Value::Null),
        "headers": resp.headers().map(headers_json).unwrap_or(Value::Null),
    })
}

pub fn error_json(err: &AppError) -> Value {
    json!({
        "kind": err.kind(),
        "body": err.body(),
    })
}

pub fn headers_json(headers: &reqwest::header::HeaderMap) -> Value {
    let mut map = Map::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        match map.get_mut(name.as_str()) {
            Some(Value::Array(values)) => values.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
            None => {
                map.insert(name.as_str().to_string(), Value::String(value));
            }
        }
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, SET_COOKIE};

    #[test]
    fn envelope_for_failure() {
        let resp: ApiResponse<Value> =
            ApiResponse::failure(AppError::NotFound(json!({"msg": "x"})), None);
        let value = envelope_json(&resp);
        assert_eq!(value["succeeded"], json!(false));
        assert_eq!(value["payload"], Value::Null);
        assert_eq!(value["error"]["kind"], json!("NotFound"));
        assert_eq!(value["error"]["body"], json!({"msg": "x"}));
        assert_eq!(value["headers"], Value::Null);
    }

    #[test]
    fn repeated_headers_become_arrays() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(SET_COOKIE, HeaderValue::from_static("b=2"));
        let value = headers_json(&headers);
        assert_eq!(value["set-cookie"], json!(["a=1", "b=2"]));
    }
}
