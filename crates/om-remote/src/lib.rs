//! Hosted table store client.
//!
//! Talks to a PostgREST-style REST interface exposing the `urine_entries` and
//! `dressing_entries` tables:
//! - Insert: `POST /rest/v1/{table}` returning the stored representation
//! - Select: `GET /rest/v1/{table}?select=*&order=timestamp.desc`
//!
//! Each call is a single request with no retry.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use om_core::entry::{join_drainage_types, split_drainage_types};
use om_core::{
    DRESSING_LOCATION, DressingEntry, NewDressingEntry, NewOutputEntry, OutputEntry,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Default request timeout for store calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const REST_PATH: &str = "rest/v1";
const OUTPUT_TABLE: &str = "urine_entries";
const DRESSING_TABLE: &str = "dressing_entries";

/// Remote store errors.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The provided API key was invalid.
    #[error("invalid API key: {reason}")]
    InvalidApiKey { reason: &'static str },
    /// The store URL was not an http(s) URL.
    #[error("invalid store URL: {0}")]
    InvalidUrl(String),
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Store returned an error response.
    #[error("store error: {message}")]
    Api { message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Hosted table store client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new client for the store at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or whitespace-only, if the URL
    /// is not http(s), or if the HTTP client fails to build.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, RemoteError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        let api_key = api_key.into();

        if api_key.is_empty() {
            return Err(RemoteError::InvalidApiKey {
                reason: "API key cannot be empty",
            });
        }
        if api_key.trim().is_empty() {
            return Err(RemoteError::InvalidApiKey {
                reason: "API key cannot be whitespace-only",
            });
        }
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(RemoteError::InvalidUrl(base_url));
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(RemoteError::ClientBuild)?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// Inserts an output reading and returns the stored record.
    pub async fn insert_output(&self, entry: &NewOutputEntry) -> Result<OutputEntry, RemoteError> {
        let body = [OutputInsert {
            parent: &entry.entered_by,
            amount: entry.amount_ml,
            timestamp: format_timestamp(entry.timestamp),
        }];
        let row: OutputRow = self.insert(OUTPUT_TABLE, &body).await?;
        tracing::debug!(id = %row.id, "inserted output entry");
        row.into_entry().map_err(RemoteError::InvalidResponse)
    }

    /// Inserts a dressing change and returns the stored record.
    pub async fn insert_dressing(
        &self,
        entry: &NewDressingEntry,
    ) -> Result<DressingEntry, RemoteError> {
        let body = [DressingInsert {
            parent: &entry.entered_by,
            dressing_type: join_drainage_types(&entry.drainage_types),
            location: entry.location(),
            condition: entry.amount_ml.to_string(),
            timestamp: format_timestamp(entry.timestamp),
        }];
        let row: DressingRow = self.insert(DRESSING_TABLE, &body).await?;
        tracing::debug!(id = %row.id, "inserted dressing entry");
        row.into_entry().map_err(RemoteError::InvalidResponse)
    }

    /// Lists output readings, newest first.
    ///
    /// Rows that cannot be converted are skipped with a warning.
    pub async fn list_outputs(&self) -> Result<Vec<OutputEntry>, RemoteError> {
        let rows = self.select(OUTPUT_TABLE).await?;
        Ok(keep_valid(OUTPUT_TABLE, rows, OutputRow::into_entry))
    }

    /// Lists dressing changes, newest first.
    ///
    /// Rows that cannot be converted are skipped with a warning.
    pub async fn list_dressings(&self) -> Result<Vec<DressingEntry>, RemoteError> {
        let rows = self.select(DRESSING_TABLE).await?;
        Ok(keep_valid(DRESSING_TABLE, rows, DressingRow::into_entry))
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{REST_PATH}/{table}", self.base_url)
    }

    async fn insert<B, T>(&self, table: &str, body: &B) -> Result<T, RemoteError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        let body = read_body(response).await?;
        let mut rows: Vec<T> = serde_json::from_str(&body)
            .map_err(|err| RemoteError::InvalidResponse(err.to_string()))?;
        if rows.len() != 1 {
            return Err(RemoteError::InvalidResponse(format!(
                "expected 1 inserted row, got {}",
                rows.len()
            )));
        }
        Ok(rows.remove(0))
    }

    /// Fetches raw rows so one malformed row cannot fail the whole listing.
    async fn select(&self, table: &str) -> Result<Vec<serde_json::Value>, RemoteError> {
        let response = self
            .http
            .get(self.table_url(table))
            .query(&[("select", "*"), ("order", "timestamp.desc")])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let body = read_body(response).await?;
        let rows: Vec<serde_json::Value> = serde_json::from_str(&body)
            .map_err(|err| RemoteError::InvalidResponse(err.to_string()))?;
        tracing::debug!(table, rows = rows.len(), "fetched rows");
        Ok(rows)
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, RemoteError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(parse_api_error(&body).unwrap_or_else(|| RemoteError::Api {
            message: format!("status {status}: {body}"),
        }));
    }
    Ok(body)
}

fn parse_api_error(body: &str) -> Option<RemoteError> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        message: String,
        #[serde(default)]
        details: Option<String>,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| RemoteError::Api {
            message: match payload.details {
                Some(details) if !details.is_empty() => format!("{} ({details})", payload.message),
                _ => payload.message,
            },
        })
}

/// Decodes each row on its own and drops those that fail to decode or convert.
fn keep_valid<R, T>(
    table: &str,
    rows: Vec<serde_json::Value>,
    into_entry: fn(R) -> Result<T, String>,
) -> Vec<T>
where
    R: DeserializeOwned,
{
    rows.into_iter()
        .filter_map(|row| {
            match serde_json::from_value::<R>(row)
                .map_err(|err| err.to_string())
                .and_then(into_entry)
            {
                Ok(entry) => Some(entry),
                Err(message) => {
                    tracing::warn!(table, %message, "skipping row");
                    None
                }
            }
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct OutputInsert<'a> {
    parent: &'a str,
    amount: u32,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct DressingInsert<'a> {
    parent: &'a str,
    dressing_type: String,
    location: &'a str,
    condition: String,
    timestamp: String,
}

#[derive(Debug, Deserialize)]
struct OutputRow {
    #[serde(deserialize_with = "id_string")]
    id: String,
    parent: String,
    amount: u32,
    timestamp: String,
}

impl OutputRow {
    fn into_entry(self) -> Result<OutputEntry, String> {
        let timestamp = parse_timestamp(&self.timestamp)
            .ok_or_else(|| format!("row {}: invalid timestamp {}", self.id, self.timestamp))?;
        Ok(OutputEntry {
            id: self.id,
            entered_by: self.parent,
            amount_ml: self.amount,
            timestamp,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DressingRow {
    #[serde(deserialize_with = "id_string")]
    id: String,
    parent: String,
    #[serde(default)]
    dressing_type: Option<String>,
    #[serde(default)]
    location: Option<String>,
    condition: String,
    timestamp: String,
}

impl DressingRow {
    fn into_entry(self) -> Result<DressingEntry, String> {
        let timestamp = parse_timestamp(&self.timestamp)
            .ok_or_else(|| format!("row {}: invalid timestamp {}", self.id, self.timestamp))?;
        let amount_ml = self
            .condition
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("row {}: invalid volume {}", self.id, self.condition))?;
        let drainage_types = split_drainage_types(self.dressing_type.as_deref().unwrap_or(""))
            .map_err(|err| format!("row {}: {err}", self.id))?;
        let location = self
            .location
            .filter(|location| !location.is_empty())
            .unwrap_or_else(|| DRESSING_LOCATION.to_string());
        Ok(DressingEntry {
            id: self.id,
            entered_by: self.parent,
            drainage_types,
            location,
            amount_ml,
            timestamp,
        })
    }
}

/// Accepts identifiers serialized as either strings or integers.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or integer id, got {other}"
        ))),
    }
}

/// Parses store timestamps, treating zone-less values as UTC.
fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    use om_core::DrainageType;

    #[test]
    fn client_rejects_empty_api_key() {
        assert!(matches!(
            Client::new("https://example.supabase.co", ""),
            Err(RemoteError::InvalidApiKey { .. })
        ));
    }

    #[test]
    fn client_rejects_whitespace_api_key() {
        assert!(matches!(
            Client::new("https://example.supabase.co", "   "),
            Err(RemoteError::InvalidApiKey { .. })
        ));
    }

    #[test]
    fn client_rejects_non_http_url() {
        assert!(matches!(
            Client::new("example.supabase.co", "anon-key"),
            Err(RemoteError::InvalidUrl(_))
        ));
    }

    #[test]
    fn client_debug_redacts_api_key() {
        let client = Client::new("https://example.supabase.co", "secret-key").unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn table_url_trims_trailing_slash() {
        let client = Client::new("https://example.supabase.co/", "anon-key").unwrap();
        assert_eq!(
            client.table_url(OUTPUT_TABLE),
            "https://example.supabase.co/rest/v1/urine_entries"
        );
    }

    #[test]
    fn output_row_parses_store_representation() {
        let json = r#"[{"id":"3f1c","parent":"Joe","amount":120,"urine_color":"","timestamp":"2025-01-15T14:05:00+00:00","created_at":"2025-01-15T14:06:00+00:00"}]"#;
        let rows: Vec<OutputRow> = serde_json::from_str(json).unwrap();
        let entry = rows.into_iter().next().unwrap().into_entry().unwrap();
        assert_eq!(entry.id, "3f1c");
        assert_eq!(entry.entered_by, "Joe");
        assert_eq!(entry.amount_ml, 120);
        assert_eq!(entry.timestamp.to_rfc3339(), "2025-01-15T14:05:00+00:00");
    }

    #[test]
    fn dressing_row_parses_derived_columns() {
        let json = r#"{"id":7,"parent":"Tori","dressing_type":"Serous Drainage,Urine","location":"wound","condition":"4","timestamp":"2025-01-15T16:00:00"}"#;
        let row: DressingRow = serde_json::from_str(json).unwrap();
        let entry = row.into_entry().unwrap();
        assert_eq!(entry.id, "7");
        assert_eq!(
            entry.drainage_types,
            vec![DrainageType::SerousDrainage, DrainageType::Urine]
        );
        assert_eq!(entry.amount_ml, 4);
        assert_eq!(entry.timestamp.to_rfc3339(), "2025-01-15T16:00:00+00:00");
    }

    #[test]
    fn invalid_rows_are_dropped() {
        let rows: Vec<serde_json::Value> = serde_json::from_str(
            r#"[
                {"id":"good","parent":"Joe","amount":10,"timestamp":"2025-01-15T14:05:00Z"},
                {"id":"null","parent":"Joe","amount":null,"timestamp":"2025-01-15T14:05:00Z"},
                {"id":"negative","parent":"Joe","amount":-5,"timestamp":"2025-01-15T14:05:00Z"},
                {"id":"time","parent":"Joe","amount":10,"timestamp":"not a time"}
            ]"#,
        )
        .unwrap();
        let entries = keep_valid(OUTPUT_TABLE, rows, OutputRow::into_entry);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "good");
    }

    #[test]
    fn dressing_rows_accept_null_columns() {
        let rows: Vec<serde_json::Value> = serde_json::from_str(
            r#"[
                {"id":1,"parent":"Tori","dressing_type":null,"location":null,"condition":"0","timestamp":"2025-01-15T16:00:00Z"},
                {"id":2,"parent":"Tori","dressing_type":"Urine","condition":null,"timestamp":"2025-01-15T17:00:00Z"}
            ]"#,
        )
        .unwrap();
        let entries = keep_valid(DRESSING_TABLE, rows, DressingRow::into_entry);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "1");
        assert!(entries[0].drainage_types.is_empty());
        assert_eq!(entries[0].location, DRESSING_LOCATION);
    }

    #[test]
    fn insert_body_matches_table_columns() {
        let body = [DressingInsert {
            parent: "Tori",
            dressing_type: join_drainage_types(&[DrainageType::PurulentDrainage]),
            location: DRESSING_LOCATION,
            condition: "12".to_string(),
            timestamp: format_timestamp("2025-01-15T16:00:00Z".parse().unwrap()),
        }];
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "parent": "Tori",
                "dressing_type": "Purulent Drainage",
                "location": "wound",
                "condition": "12",
                "timestamp": "2025-01-15T16:00:00.000Z"
            }])
        );
    }

    #[test]
    fn parse_api_error_reads_message_and_details() {
        let err = parse_api_error(
            r#"{"code":"23502","message":"null value in column \"parent\"","details":"Failing row","hint":null}"#,
        )
        .unwrap();
        assert_eq!(
            err.to_string(),
            "store error: null value in column \"parent\" (Failing row)"
        );
        assert!(parse_api_error("<html>bad gateway</html>").is_none());
    }

    #[tokio::test]
    async fn unreachable_store_reports_request_error() {
        let client = Client::new("http://127.0.0.1:9", "anon-key").unwrap();
        let err = client.list_outputs().await.unwrap_err();
        assert!(matches!(err, RemoteError::Request(_)));
    }
}
