use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use super::{LookupError, SystemDirectory};
use crate::coords::Coordinates;
use crate::error::{Error, Result};
use crate::system::ResolvedSystem;

/// Public EDSM API root.
pub const DEFAULT_EDSM_BASE_URL: &str = "https://www.edsm.net/api-v1";

/// Sent when neither the config file nor `EDSM_USER_AGENT` provide one.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "rare-router/",
    env!("CARGO_PKG_VERSION"),
    " (ED Rare Router route planner)"
);

/// Directory backed by the EDSM HTTP API.
#[derive(Debug, Clone)]
pub struct EdsmClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl EdsmClient {
    /// Build a client with a fixed per-request timeout.
    pub fn new(base_url: impl Into<String>, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(Error::Http)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<(StatusCode, Option<Value>), LookupError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|err| self.transient(err))?;

        let status = response.status();
        if !status.is_success() {
            return Ok((status, None));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|err| self.transient(err))?;
        Ok((status, Some(body)))
    }

    fn transient(&self, err: reqwest::Error) -> LookupError {
        if err.is_timeout() {
            LookupError::transient(format!(
                "request timed out after {}s",
                self.timeout.as_secs()
            ))
        } else {
            LookupError::transient(err.to_string())
        }
    }
}

#[async_trait]
impl SystemDirectory for EdsmClient {
    async fn lookup_exact(&self, name: &str) -> std::result::Result<ResolvedSystem, LookupError> {
        let (status, body) = self
            .get_json(
                "system",
                &[
                    ("systemName", name),
                    ("showCoordinates", "1"),
                    ("showInformation", "1"),
                ],
            )
            .await?;

        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::not_found(name));
        }
        let Some(body) = body else {
            return Err(LookupError::transient(format!("EDSM returned {status}")));
        };

        debug!(name = %name, "EDSM system response received");
        normalize_system(&body, name).ok_or_else(|| LookupError::not_found(name))
    }

    async fn search_prefix(
        &self,
        query: &str,
    ) -> std::result::Result<Vec<ResolvedSystem>, LookupError> {
        let (status, body) = self
            .get_json("systems", &[("systemName", query), ("showCoordinates", "1")])
            .await?;

        let Some(body) = body else {
            warn!(query = %query, status = %status, "EDSM search returned an error status");
            return Err(LookupError::transient(format!("EDSM returned {status}")));
        };

        Ok(normalize_search(&body, query))
    }
}

/// Convert a `/system` response into a [`ResolvedSystem`].
///
/// EDSM answers an unknown name with `[]` or `{}`, so anything without
/// coordinates is treated as not found. Faction labels are read from the
/// `information` block first and then from the top level.
pub fn normalize_system(data: &Value, fallback_name: &str) -> Option<ResolvedSystem> {
    let object = data.as_object()?;
    let coords = object
        .get("coords")
        .or_else(|| object.get("coordinates"))
        .and_then(parse_coords)?;

    let name = string_field(data, "name")
        .or_else(|| string_field(data, "systemName"))
        .unwrap_or_else(|| fallback_name.to_string());

    let information = object.get("information");
    let label = |key: &str| {
        information
            .and_then(|info| string_field(info, key))
            .or_else(|| string_field(data, key))
    };

    Some(ResolvedSystem {
        name,
        coords,
        allegiance: label("allegiance"),
        government: label("government"),
    })
}

/// Convert a `/systems` response into resolved systems, dropping entries
/// that lack coordinates.
pub fn normalize_search(data: &Value, query: &str) -> Vec<ResolvedSystem> {
    let Some(items) = data.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let coords = item.get("coords").and_then(parse_coords)?;
            let name = string_field(item, "name")
                .or_else(|| string_field(item, "systemName"))
                .unwrap_or_else(|| query.to_string());
            Some(ResolvedSystem {
                name,
                coords,
                allegiance: string_field(item, "allegiance"),
                government: string_field(item, "government"),
            })
        })
        .collect()
}

fn parse_coords(value: &Value) -> Option<Coordinates> {
    let object = value.as_object()?;
    let axis = |short: &str, long: &str| {
        object
            .get(short)
            .or_else(|| object.get(long))
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    };
    Some(Coordinates::new(
        axis("x", "xCoord"),
        axis("y", "yCoord"),
        axis("z", "zCoord"),
    ))
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
