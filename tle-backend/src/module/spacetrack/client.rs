//! Space-Track HTTP client
//!
//! One client type covers every resource class; the class-specific part is
//! the path produced by [`ArchiveQuery::path`]. Authentication is cookie
//! based, so a logged-in client must be reused for all queries of a session.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use tle_common::TleRecord;

use super::credentials::Credentials;
use super::error::SpaceTrackError;
use super::query::ArchiveQuery;
use crate::module::tle::{is_line1, is_line2};

pub const DEFAULT_BASE_URL: &str = "https://www.space-track.org";
pub const LOGIN_PATH: &str = "/ajaxauth/login";
pub const LOGOUT_PATH: &str = "/ajaxauth/logout";

/// Body text Space-Track returns when a request is not authenticated
const NOT_LOGGED_IN_MARKER: &str = "You must be logged in";
const USER_AGENT: &str = "tle-backend/0.1";

/// One JSON object from a query response
pub type ArchiveRow = serde_json::Map<String, Value>;

#[derive(Clone)]
pub struct SpaceTrackClient {
    client: reqwest::Client,
    base_url: String,
}

impl SpaceTrackClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SpaceTrackError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Start a session; the session cookie is kept by the client
    pub async fn login(&self, credentials: &Credentials) -> Result<(), SpaceTrackError> {
        tracing::info!(
            "Logging in to {} as {}",
            self.base_url,
            credentials.username()
        );

        let response = self
            .client
            .post(self.url_for(LOGIN_PATH))
            .form(&[
                ("identity", credentials.username()),
                ("password", credentials.password()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        check_login_response(status, &body)
    }

    pub async fn logout(&self) -> Result<(), SpaceTrackError> {
        let response = self.client.get(self.url_for(LOGOUT_PATH)).send().await?;
        if !response.status().is_success() {
            return Err(SpaceTrackError::Status {
                status: response.status(),
                path: LOGOUT_PATH.to_string(),
            });
        }
        tracing::debug!("Logged out of {}", self.base_url);
        Ok(())
    }

    /// GET a query path and decode the JSON row array
    pub async fn query_path(&self, path: &str) -> Result<Vec<ArchiveRow>, SpaceTrackError> {
        tracing::debug!("Querying {}", path);

        let response = self.client.get(self.url_for(path)).send().await?;
        if !response.status().is_success() {
            return Err(SpaceTrackError::Status {
                status: response.status(),
                path: path.to_string(),
            });
        }

        let body = response.text().await?;
        let rows = parse_rows(path, &body)?;
        tracing::debug!("{} rows from {}", rows.len(), path);
        Ok(rows)
    }

    pub async fn query(&self, query: &ArchiveQuery) -> Result<Vec<ArchiveRow>, SpaceTrackError> {
        self.query_path(&query.path()).await
    }
}

/// Log in, run `work` with the session, and always log out afterwards.
///
/// Whatever `work` returns is handed back untouched, errors included; a
/// failed logout is only logged. A rejected login never runs `work`.
pub async fn with_session<F, Fut, T>(
    client: &SpaceTrackClient,
    credentials: &Credentials,
    work: F,
) -> Result<T, SpaceTrackError>
where
    F: FnOnce(SpaceTrackClient) -> Fut,
    Fut: Future<Output = T>,
{
    client.login(credentials).await?;

    let output = work(client.clone()).await;

    if let Err(e) = client.logout().await {
        tracing::warn!("Space-Track logout failed: {}", e);
    }

    Ok(output)
}

/// Login succeeds only on HTTP 200 without the not-logged-in marker
pub fn check_login_response(status: StatusCode, body: &str) -> Result<(), SpaceTrackError> {
    if status != StatusCode::OK {
        return Err(SpaceTrackError::LoginRejected(format!("HTTP {}", status)));
    }
    if body.contains(NOT_LOGGED_IN_MARKER) {
        return Err(SpaceTrackError::LoginRejected(
            "check SPACE_TRACK_USER/SPACE_TRACK_PASS".to_string(),
        ));
    }
    Ok(())
}

/// Decode a response body into rows.
///
/// Space-Track answers errors with a JSON object (`{"error": ...}`) and 200,
/// so anything but an array of objects is a decode error.
pub fn parse_rows(path: &str, body: &str) -> Result<Vec<ArchiveRow>, SpaceTrackError> {
    let decode_err = |reason: String| SpaceTrackError::Decode {
        path: path.to_string(),
        reason,
    };

    let value: Value = serde_json::from_str(body).map_err(|e| decode_err(e.to_string()))?;

    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(row) => Ok(row),
                other => Err(decode_err(format!("row {} is not an object: {}", index, other))),
            })
            .collect(),
        Value::Object(obj) if obj.contains_key("error") => {
            Err(decode_err(format!("service error: {}", obj["error"])))
        }
        _ => Err(decode_err("expected a JSON array".to_string())),
    }
}

/// Rebuild TLE records from `tle` / `tle_latest` rows.
///
/// Rows without both valid lines are skipped. The name comes from
/// `TLE_LINE0` (minus its `0 ` prefix) or `OBJECT_NAME`.
pub fn tle_records_from_rows(group: &str, rows: &[ArchiveRow]) -> Vec<TleRecord> {
    rows.iter()
        .filter_map(|row| {
            let line1 = row.get("TLE_LINE1")?.as_str()?.trim_end();
            let line2 = row.get("TLE_LINE2")?.as_str()?.trim_end();
            if !(is_line1(line1) && is_line2(line2)) {
                return None;
            }

            let name = row
                .get("TLE_LINE0")
                .and_then(Value::as_str)
                .map(|l0| l0.strip_prefix("0 ").unwrap_or(l0))
                .or_else(|| row.get("OBJECT_NAME").and_then(Value::as_str))
                .unwrap_or_default()
                .trim();

            Some(TleRecord::new(group, name, line1, line2))
        })
        .collect()
}
