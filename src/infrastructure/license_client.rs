// License server repository implementation over HTTP
use crate::application::license_repository::{FetchResult, LicenseRepository};
use crate::domain::error::FetchError;
use crate::domain::license::{LicenseRecord, NewUser, User, UserId};
use async_trait::async_trait;
use reqwest::{header, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Duration;

const USERS_PATH: &str = "/lic/user";
const USER_COUNT_PATH: &str = "/lic/user/count";
const LICENSES_PATH: &str = "/lic/user/license";
const LICENSE_COUNT_PATH: &str = "/lic/user/license/count";
const SESSION_COUNT_PATH: &str = "/lic/user/license/session/count";
const DAILY_USAGE_PATH: &str = "/lic/user/license/session/totalUseTimeByDay";

#[derive(Debug, Clone)]
pub struct LicenseServerClient {
    base_url: String,
    client: reqwest::Client,
}

impl LicenseServerClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn user_url(&self, id: UserId) -> String {
        format!("{}{}/{}", self.base_url, USERS_PATH, id)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> FetchResult<T> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::network(e.to_string()))?;

        read_json(check_status(response).await?).await
    }

    async fn get_count(&self, path: &str) -> FetchResult<u64> {
        let body: Value = self.get_json(&self.url(path)).await?;
        body.get("count")
            .and_then(count_from_value)
            .ok_or_else(|| FetchError::parse(format!("missing numeric `count` in {}", body)))
    }
}

async fn check_status(response: Response) -> FetchResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    tracing::debug!("{} answered {}: {}", url, status, body);
    Err(FetchError::HttpError {
        status: status.as_u16(),
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> FetchResult<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| FetchError::network(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| FetchError::parse(e.to_string()))
}

/// A non-negative whole number, as a JSON number or numeric string
fn count_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// The session count endpoint answers with the scalar itself; tolerate a
/// `{ "count": n }` wrapper too
fn session_count_from_body(body: &Value) -> FetchResult<u64> {
    count_from_value(body)
        .or_else(|| body.get("count").and_then(count_from_value))
        .ok_or_else(|| FetchError::parse(format!("session count is not a number: {}", body)))
}

#[async_trait]
impl LicenseRepository for LicenseServerClient {
    async fn license_count(&self) -> FetchResult<u64> {
        self.get_count(LICENSE_COUNT_PATH).await
    }

    async fn user_count(&self) -> FetchResult<u64> {
        self.get_count(USER_COUNT_PATH).await
    }

    async fn session_count(&self) -> FetchResult<u64> {
        let body: Value = self.get_json(&self.url(SESSION_COUNT_PATH)).await?;
        session_count_from_body(&body)
    }

    async fn daily_usage(&self) -> FetchResult<Map<String, Value>> {
        self.get_json(&self.url(DAILY_USAGE_PATH)).await
    }

    async fn list_users(&self) -> FetchResult<Vec<User>> {
        self.get_json(&self.url(USERS_PATH)).await
    }

    async fn user_licenses(&self, id: UserId) -> FetchResult<Vec<LicenseRecord>> {
        self.get_json(&self.user_url(id)).await
    }

    async fn create_user(&self, user: &NewUser) -> FetchResult<User> {
        let url = self.url(USERS_PATH);
        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .json(user)
            .send()
            .await
            .map_err(|e| FetchError::network(e.to_string()))?;

        let response = check_status(response).await?;
        if response.status() != StatusCode::CREATED {
            return Err(FetchError::HttpError {
                status: response.status().as_u16(),
            });
        }

        read_json(response).await
    }

    async fn delete_user(&self, id: UserId) -> FetchResult<()> {
        let url = self.user_url(id);
        tracing::debug!("DELETE {}", url);
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| FetchError::network(e.to_string()))?;

        check_status(response).await?;
        Ok(())
    }

    async fn list_licenses(&self) -> FetchResult<Vec<LicenseRecord>> {
        self.get_json(&self.url(LICENSES_PATH)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_service::DashboardService;
    use crate::domain::metric::MetricState;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_json(server: &MockServer, route: &str, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(server)
            .await;
    }

    fn client(server: &MockServer) -> LicenseServerClient {
        LicenseServerClient::new(&server.uri(), None).unwrap()
    }

    #[test]
    fn test_count_from_value() {
        assert_eq!(count_from_value(&json!(12)), Some(12));
        assert_eq!(count_from_value(&json!(12.0)), Some(12));
        assert_eq!(count_from_value(&json!(" 7 ")), Some(7));
        assert_eq!(count_from_value(&json!(-1)), None);
        assert_eq!(count_from_value(&json!(1.5)), None);
        assert_eq!(count_from_value(&json!(null)), None);
    }

    #[tokio::test]
    async fn test_counts_read_count_field() {
        let server = MockServer::start().await;
        mount_json(&server, LICENSE_COUNT_PATH, 200, json!({ "count": 12 })).await;
        mount_json(&server, USER_COUNT_PATH, 200, json!({ "total": 3 })).await;

        let client = client(&server);
        assert_eq!(client.license_count().await, Ok(12));
        assert!(matches!(
            client.user_count().await,
            Err(FetchError::ParseFailure { .. })
        ));
    }

    #[tokio::test]
    async fn test_session_count_is_raw_body() {
        let server = MockServer::start().await;
        mount_json(&server, SESSION_COUNT_PATH, 200, json!(31)).await;

        assert_eq!(client(&server).session_count().await, Ok(31));
    }

    #[test]
    fn test_session_count_body_shapes() {
        assert_eq!(session_count_from_body(&json!(31)), Ok(31));
        assert_eq!(session_count_from_body(&json!("31")), Ok(31));
        assert_eq!(session_count_from_body(&json!({ "count": 31 })), Ok(31));
        assert_eq!(session_count_from_body(&json!({ "count": "31" })), Ok(31));
        assert!(matches!(
            session_count_from_body(&json!({ "sessions": 31 })),
            Err(FetchError::ParseFailure { .. })
        ));
        assert!(matches!(
            session_count_from_body(&json!("many")),
            Err(FetchError::ParseFailure { .. })
        ));
    }

    #[tokio::test]
    async fn test_session_count_accepts_string_and_wrapper_bodies() {
        let server = MockServer::start().await;
        mount_json(&server, SESSION_COUNT_PATH, 200, json!({ "count": 8 })).await;
        assert_eq!(client(&server).session_count().await, Ok(8));

        let server = MockServer::start().await;
        mount_json(&server, SESSION_COUNT_PATH, 200, json!("9")).await;
        assert_eq!(client(&server).session_count().await, Ok(9));
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_error() {
        let server = MockServer::start().await;
        mount_json(&server, LICENSE_COUNT_PATH, 500, json!({ "error": "boom" })).await;

        let err = client(&server).license_count().await.unwrap_err();
        assert_eq!(err, FetchError::HttpError { status: 500 });
        assert_eq!(err.to_string(), "HTTP error! status: 500");
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(USERS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        assert!(matches!(
            client(&server).list_users().await,
            Err(FetchError::ParseFailure { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_failure() {
        let client = LicenseServerClient::new("http://127.0.0.1:1", None).unwrap();
        assert!(matches!(
            client.license_count().await,
            Err(FetchError::NetworkFailure { .. })
        ));
    }

    #[tokio::test]
    async fn test_daily_usage_keeps_server_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DAILY_USAGE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"2024-01-03": 2, "2024-01-01": 5, "2024-01-02": 9}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let totals = client(&server).daily_usage().await.unwrap();
        let keys: Vec<&str> = totals.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2024-01-03", "2024-01-01", "2024-01-02"]);
    }

    #[tokio::test]
    async fn test_create_user_requires_created_status() {
        let server = MockServer::start().await;
        let new_user = NewUser {
            email: "ana@example.com".to_string(),
            register_date: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            enabled: true,
        };
        Mock::given(method("POST"))
            .and(path(USERS_PATH))
            .and(body_json(json!({
                "email": "ana@example.com",
                "registerDate": "2024-05-01T00:00:00Z",
                "enabled": true,
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 5,
                "email": "ana@example.com",
                "registerDate": "2024-05-01T00:00:00Z",
                "enabled": true,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = client(&server).create_user(&new_user).await.unwrap();
        assert_eq!(created.id, 5);
    }

    #[tokio::test]
    async fn test_create_user_with_plain_ok_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(USERS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 5 })))
            .mount(&server)
            .await;

        let new_user = NewUser {
            email: "ana@example.com".to_string(),
            register_date: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            enabled: true,
        };
        assert_eq!(
            client(&server).create_user(&new_user).await,
            Err(FetchError::HttpError { status: 200 })
        );
    }

    #[tokio::test]
    async fn test_delete_user_hits_user_path() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/lic/user/42"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(client(&server).delete_user(42).await, Ok(()));
    }

    #[tokio::test]
    async fn test_dashboard_over_http_tolerates_partial_failure() {
        let server = MockServer::start().await;
        mount_json(&server, LICENSE_COUNT_PATH, 500, json!({})).await;
        mount_json(&server, USER_COUNT_PATH, 200, json!({ "count": 8 })).await;
        mount_json(&server, SESSION_COUNT_PATH, 200, json!(120)).await;
        mount_json(&server, DAILY_USAGE_PATH, 200, json!({ "2024-01-01": 5 })).await;

        let service = DashboardService::new(Arc::new(client(&server)));
        let snapshot = service.snapshot().await;

        assert_eq!(
            snapshot.license_count,
            MetricState::Failed(FetchError::HttpError { status: 500 })
        );
        assert_eq!(snapshot.user_count, MetricState::Loaded(8));
        assert_eq!(snapshot.session_count, MetricState::Loaded(120));
        assert_eq!(snapshot.daily_usage.value().map(|s| s.len()), Some(1));
    }
}
