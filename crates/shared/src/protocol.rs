use serde::{Deserialize, Serialize};

use crate::domain::{HistoryQuery, Measurement};

/// Body of `POST /login` and `POST /register`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Body of `POST /predict`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
}

impl From<&Measurement> for PredictRequest {
    fn from(value: &Measurement) -> Self {
        Self {
            sepal_length: value.sepal_length(),
            sepal_width: value.sepal_width(),
            petal_length: value.petal_length(),
            petal_width: value.petal_width(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub predicted_specie: Option<String>,
}

/// Query string of `GET /predictions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionsQuery {
    pub limit: u32,
    pub offset: u32,
}

impl From<HistoryQuery> for PredictionsQuery {
    fn from(value: HistoryQuery) -> Self {
        Self {
            limit: value.limit(),
            offset: value.offset(),
        }
    }
}

/// One stored prediction as returned by `GET /predictions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub created_at: String,
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
    #[serde(rename = "predicted_specie")]
    pub predicted_species: String,
}
