//! Blocking HTTP implementation of [`ForemanApi`]

use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;

use crate::api::ForemanApi;
use crate::connection::Connection;
use crate::record::{Record, RecordId, record_matches};
use crate::resource::Resource;
use crate::{Error, Result};

/// Page size used for searches. Matches are filtered client-side, so the
/// page only has to be large enough to contain the exact match.
const SEARCH_PAGE_SIZE: u32 = 100;

/// Foreman API v2 client over HTTPS with basic authentication.
pub struct HttpForeman {
    http: Client,
    base_url: String,
    username: String,
    password: String,
}

impl HttpForeman {
    /// Build a client for the given connection settings.
    ///
    /// The client has no request timeout: every call waits for the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection settings are unusable or the
    /// TLS backend cannot be initialised.
    pub fn new(connection: &Connection) -> Result<Self> {
        let base_url = connection.base_url()?;
        let http = Client::builder()
            .danger_accept_invalid_certs(!connection.validate_certs)
            .timeout(None::<Duration>)
            .build()?;

        Ok(Self {
            http,
            base_url,
            username: connection.username.clone(),
            password: connection.password.clone(),
        })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json")
    }

    /// URL of a collection. Scoped resources take their parent ids from
    /// `scope`, which must contain every field of `Resource::scope_fields`.
    fn collection_url(&self, resource: Resource, scope: &Record) -> Result<String> {
        match resource.scope_fields() {
            [] => Ok(format!("{}/{}", self.base_url, resource.path())),
            [compute_resource, compute_profile] => Ok(format!(
                "{}/compute_resources/{}/compute_profiles/{}/{}",
                self.base_url,
                scope_segment(resource, scope, compute_resource)?,
                scope_segment(resource, scope, compute_profile)?,
                resource.path()
            )),
            fields => Err(Error::MissingScope {
                resource: resource.to_string(),
                field: fields.join(", "),
            }),
        }
    }

    fn member_url(&self, resource: Resource, id: &RecordId) -> String {
        format!("{}/{}/{}", self.base_url, resource.path(), id)
    }
}

impl ForemanApi for HttpForeman {
    fn search(&self, resource: Resource, filter: &Record) -> Result<Option<Record>> {
        let url = self.collection_url(resource, filter)?;
        let query = search_query(resource, filter);
        let per_page = SEARCH_PAGE_SIZE.to_string();
        debug!(%url, %query, "GET search");

        let resp = self
            .request(Method::GET, &url)
            .query(&[("search", query.as_str()), ("per_page", per_page.as_str())])
            .send()?;
        let body = handle_response(resp)?;

        let results = match body.get("results") {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };

        Ok(results
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(record) => Some(record),
                _ => None,
            })
            .find(|record| record_matches(record, filter)))
    }

    fn get(&self, resource: Resource, id: &RecordId) -> Result<Record> {
        let url = self.member_url(resource, id);
        debug!(%url, "GET");
        let resp = self.request(Method::GET, &url).send()?;
        into_record(handle_response(resp)?)
    }

    fn create(&self, resource: Resource, data: &Record) -> Result<Record> {
        let url = self.collection_url(resource, data)?;
        let mut body = data.clone();
        for field in resource.scope_fields() {
            body.remove(*field);
        }
        debug!(%url, "POST");
        let resp = self
            .request(Method::POST, &url)
            .json(&wrap(resource, body))
            .send()?;
        into_record(handle_response(resp)?)
    }

    fn update(&self, resource: Resource, id: &RecordId, data: &Record) -> Result<Record> {
        let url = self.member_url(resource, id);
        debug!(%url, "PUT");
        let resp = self
            .request(Method::PUT, &url)
            .json(&wrap(resource, data.clone()))
            .send()?;
        into_record(handle_response(resp)?)
    }

    fn delete(&self, resource: Resource, id: &RecordId) -> Result<Record> {
        let url = self.member_url(resource, id);
        debug!(%url, "DELETE");
        let resp = self.request(Method::DELETE, &url).send()?;
        match handle_response(resp)? {
            Value::Null => Ok(Record::new()),
            other => into_record(other),
        }
    }
}

/// Build a Foreman scoped-search expression, e.g. `name="example.com"`.
///
/// Scope fields of nested resources are part of the URL and are left out.
fn search_query(resource: Resource, filter: &Record) -> String {
    filter
        .iter()
        .filter(|(key, _)| !resource.scope_fields().contains(&key.as_str()))
        .map(|(key, value)| match value {
            Value::String(s) => format!("{}=\"{}\"", key, s.replace('"', "\\\"")),
            other => format!("{}={}", key, other),
        })
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Foreman expects payloads under the element key: `{"domain": {...}}`.
fn wrap(resource: Resource, data: Record) -> Value {
    let mut body = Record::new();
    body.insert(resource.element().to_string(), Value::Object(data));
    Value::Object(body)
}

fn scope_segment(resource: Resource, scope: &Record, field: &str) -> Result<String> {
    match scope.get(field) {
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        _ => Err(Error::MissingScope {
            resource: resource.to_string(),
            field: field.to_string(),
        }),
    }
}

fn handle_response(resp: Response) -> Result<Value> {
    let status = resp.status();
    let body = resp.text()?;

    if !status.is_success() {
        return Err(Error::Remote {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    Ok(serde_json::from_str(&body)?)
}

/// Pull the human-readable message out of a Foreman error body.
fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    let Some(error) = json.get("error") else {
        return body.trim().to_string();
    };

    if let Some(messages) = error.get("full_messages").and_then(|v| v.as_array()) {
        let messages: Vec<&str> = messages.iter().filter_map(|m| m.as_str()).collect();
        if !messages.is_empty() {
            return messages.join("; ");
        }
    }

    error
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

fn into_record(value: Value) -> Result<Record> {
    match value {
        Value::Object(record) => Ok(record),
        other => Err(Error::Json(serde::de::Error::custom(format!(
            "expected a JSON object, got {}",
            other
        )))),
    }
}
