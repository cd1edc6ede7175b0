// API client module: a small blocking HTTP client for the hh.ru public
// search API. Only two read endpoints are used (vacancies and employers),
// both returning a JSON object with an `items` array. Records are handed
// back untyped (`serde_json::Value`) because the upstream shape is loose
// and the store picks out only the fields it needs.

use anyhow::{Context, Result};
use log::{debug, error};
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;

use crate::config::Settings;
use crate::error::ApiError;

/// What any job board source must be able to do.
///
/// Both methods swallow failures: they log them and return an empty list,
/// so callers cannot tell "nothing found" from "request failed". Use
/// [`ApiClient::fetch_items`] directly when that difference matters.
pub trait JobBoard {
    fn search_vacancies(&self, query: &SearchQuery) -> Vec<Value>;
    fn search_employers(&self, query: &SearchQuery) -> Vec<Value>;
}

/// The two search endpoints the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Vacancies,
    Employers,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Vacancies => "vacancies",
            Endpoint::Employers => "employers",
        }
    }
}

/// Query string for a search request. Unset fields are left out of the URL.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employer_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl SearchQuery {
    /// Free-text search.
    pub fn text(text: impl Into<String>) -> Self {
        SearchQuery {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// All vacancies of one employer.
    pub fn employer(employer_id: i64) -> Self {
        SearchQuery {
            employer_id: Some(employer_id),
            ..Default::default()
        }
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }
}

/// Blocking client bound to one API base URL.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` sending `user_agent` on every request.
    /// The API rejects requests without a User-Agent.
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.api_url, &settings.user_agent)
    }

    /// GET `endpoint` with `query` and return the `items` array of the reply.
    /// A reply without `items` yields an empty list.
    pub fn fetch_items(&self, endpoint: Endpoint, query: &SearchQuery) -> Result<Vec<Value>, ApiError> {
        let url = format!("{}/{}", self.base_url, endpoint.path());
        debug!("GET {} {:?}", url, query);

        let res = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().unwrap_or_default();
            return Err(ApiError::Status { url, status, body });
        }

        let body: Value = res.json().map_err(|source| ApiError::Decode {
            url: url.clone(),
            source,
        })?;
        Ok(items_of(body))
    }

    fn items_or_empty(&self, endpoint: Endpoint, query: &SearchQuery) -> Vec<Value> {
        match self.fetch_items(endpoint, query) {
            Ok(items) => {
                debug!("{} returned {} items", endpoint.path(), items.len());
                items
            }
            Err(e) => {
                error!("API request failed: {}", e);
                Vec::new()
            }
        }
    }
}

impl JobBoard for ApiClient {
    fn search_vacancies(&self, query: &SearchQuery) -> Vec<Value> {
        self.items_or_empty(Endpoint::Vacancies, query)
    }

    fn search_employers(&self, query: &SearchQuery) -> Vec<Value> {
        self.items_or_empty(Endpoint::Employers, query)
    }
}

fn items_of(body: Value) -> Vec<Value> {
    match body {
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn items_are_extracted() {
        let body = json!({"items": [{"id": "1"}, {"id": "2"}], "found": 2});
        assert_eq!(items_of(body).len(), 2);
    }

    #[test]
    fn missing_or_odd_items_give_empty_list() {
        assert!(items_of(json!({"found": 0})).is_empty());
        assert!(items_of(json!({"items": null})).is_empty());
        assert!(items_of(json!([1, 2, 3])).is_empty());
    }

    #[test]
    fn query_builders_fill_expected_fields() {
        let q = SearchQuery::text("rust").per_page(100);
        assert_eq!(q.text.as_deref(), Some("rust"));
        assert_eq!(q.per_page, Some(100));
        assert_eq!(q.employer_id, None);

        let q = SearchQuery::employer(1740).page(2);
        assert_eq!(q.employer_id, Some(1740));
        assert_eq!(q.page, Some(2));
    }
}
