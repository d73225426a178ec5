use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use shared::{
    domain::{HistoryQuery, Measurement},
    error::ErrorBody,
    protocol::{
        Credentials, LoginResponse, PredictRequest, PredictResponse, PredictionRecord,
        PredictionsQuery,
    },
};
use tracing::{info, warn};

pub mod controller;
pub mod error;
pub mod history;
pub mod session;
pub mod view;

pub use controller::{Action, ViewController, ViewState};
pub use error::{ClientError, ClientResult};
pub use history::{HistoryCache, HistoryRow};
pub use session::Session;
pub use view::{AppView, HistoryPanel, LoginView, Notice, NoticeLevel, View};

const LOGIN_FALLBACK: &str = "invalid credentials";
const REGISTER_FALLBACK: &str = "registration failed";
const API_FALLBACK: &str = "API error";
const UNEXPECTED_RESPONSE: &str = "unexpected response from API";

/// The four calls the prediction service exposes. Implementations map HTTP
/// outcomes to typed results and never touch session or cache state.
#[async_trait]
pub trait PredictionService: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> ClientResult<String>;
    async fn register(&self, username: &str, password: &str) -> ClientResult<()>;
    async fn predict(&self, token: &str, measurement: &Measurement) -> ClientResult<String>;
    async fn list_predictions(
        &self,
        token: &str,
        query: HistoryQuery,
    ) -> ClientResult<Vec<PredictionRecord>>;
}

struct RawResponse {
    status: StatusCode,
    body: Vec<u8>,
}

pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(base_url, Client::new())
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http_client(base_url, http))
    }

    pub fn with_http_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: RequestBuilder) -> ClientResult<RawResponse> {
        let response = request
            .send()
            .await
            .map_err(|err| self.connection_error(err))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| self.connection_error(err))?
            .to_vec();
        Ok(RawResponse { status, body })
    }

    fn connection_error(&self, err: reqwest::Error) -> ClientError {
        warn!(url = %self.base_url, error = %err, "api: request did not complete");
        ClientError::Connection {
            url: self.base_url.clone(),
            reason: err.to_string(),
        }
    }
}

/// Server-supplied message, the fallback when the JSON body has none, or
/// `None` when the body is not JSON at all.
fn error_message(body: &[u8], fallback: &str) -> Option<String> {
    ErrorBody::parse(body).map(|parsed| parsed.message().unwrap_or(fallback).to_string())
}

fn auth_error(response: &RawResponse, fallback: &str) -> ClientError {
    let message = error_message(&response.body, fallback).unwrap_or_else(|| {
        format!(
            "{UNEXPECTED_RESPONSE} (status {})",
            response.status.as_u16()
        )
    });
    ClientError::Auth(message)
}

fn api_error(response: &RawResponse) -> ClientError {
    ClientError::Api {
        status: response.status.as_u16(),
        message: error_message(&response.body, API_FALLBACK)
            .unwrap_or_else(|| UNEXPECTED_RESPONSE.to_string()),
    }
}

fn malformed(status: StatusCode, what: &str) -> ClientError {
    ClientError::Api {
        status: status.as_u16(),
        message: format!("{UNEXPECTED_RESPONSE}: {what}"),
    }
}

#[async_trait]
impl PredictionService for ApiClient {
    async fn login(&self, username: &str, password: &str) -> ClientResult<String> {
        let response = self
            .send(
                self.http
                    .post(self.endpoint("/login"))
                    .json(&Credentials::new(username, password)),
            )
            .await?;

        if response.status != StatusCode::OK {
            warn!(
                username,
                status = response.status.as_u16(),
                "api: login rejected"
            );
            return Err(auth_error(&response, LOGIN_FALLBACK));
        }

        let body: LoginResponse = serde_json::from_slice(&response.body)
            .map_err(|_| malformed(response.status, "login body is not JSON"))?;
        let token = body
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| malformed(response.status, "missing access_token"))?;
        info!(username, "api: login succeeded");
        Ok(token)
    }

    async fn register(&self, username: &str, password: &str) -> ClientResult<()> {
        let response = self
            .send(
                self.http
                    .post(self.endpoint("/register"))
                    .json(&Credentials::new(username, password)),
            )
            .await?;

        if response.status == StatusCode::CREATED {
            info!(username, "api: registration succeeded");
            return Ok(());
        }
        warn!(
            username,
            status = response.status.as_u16(),
            "api: registration rejected"
        );
        Err(auth_error(&response, REGISTER_FALLBACK))
    }

    async fn predict(&self, token: &str, measurement: &Measurement) -> ClientResult<String> {
        let response = self
            .send(
                self.http
                    .post(self.endpoint("/predict"))
                    .bearer_auth(token)
                    .json(&PredictRequest::from(measurement)),
            )
            .await?;

        match response.status {
            StatusCode::OK => {
                let body: PredictResponse = serde_json::from_slice(&response.body)
                    .map_err(|_| malformed(response.status, "prediction body is not JSON"))?;
                let species = body
                    .predicted_specie
                    .filter(|species| !species.is_empty())
                    .ok_or_else(|| malformed(response.status, "missing predicted_specie"))?;
                info!(species = %species, "api: prediction received");
                Ok(species)
            }
            StatusCode::UNAUTHORIZED => {
                warn!("api: prediction rejected with 401");
                Err(ClientError::Unauthorized)
            }
            status => {
                warn!(status = status.as_u16(), "api: prediction failed");
                Err(api_error(&response))
            }
        }
    }

    async fn list_predictions(
        &self,
        token: &str,
        query: HistoryQuery,
    ) -> ClientResult<Vec<PredictionRecord>> {
        let response = self
            .send(
                self.http
                    .get(self.endpoint("/predictions"))
                    .bearer_auth(token)
                    .query(&PredictionsQuery::from(query)),
            )
            .await?;

        match response.status {
            StatusCode::OK => {
                if response.body.iter().all(u8::is_ascii_whitespace) {
                    return Ok(Vec::new());
                }
                let records: Option<Vec<PredictionRecord>> =
                    serde_json::from_slice(&response.body)
                        .map_err(|_| malformed(response.status, "history body is not a list"))?;
                let records = records.unwrap_or_default();
                info!(
                    limit = query.limit(),
                    offset = query.offset(),
                    count = records.len(),
                    "api: history fetched"
                );
                Ok(records)
            }
            StatusCode::UNAUTHORIZED => {
                warn!("api: history rejected with 401");
                Err(ClientError::Unauthorized)
            }
            status => {
                warn!(status = status.as_u16(), "api: history fetch failed");
                Err(api_error(&response))
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
