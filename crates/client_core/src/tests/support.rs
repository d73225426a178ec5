use std::sync::Mutex;

use async_trait::async_trait;
use shared::{
    domain::{HistoryQuery, Measurement},
    protocol::PredictionRecord,
};

use crate::{ClientResult, PredictionService};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Login(String),
    Register(String),
    Predict {
        token: String,
        measurement: Measurement,
    },
    ListPredictions {
        token: String,
        query: HistoryQuery,
    },
}

/// Scripted in-memory service that records every call it receives.
pub(crate) struct FakeService {
    login: Mutex<ClientResult<String>>,
    register: Mutex<ClientResult<()>>,
    predict: Mutex<ClientResult<String>>,
    history: Mutex<ClientResult<Vec<PredictionRecord>>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeService {
    pub(crate) fn new() -> Self {
        Self {
            login: Mutex::new(Ok("T".to_string())),
            register: Mutex::new(Ok(())),
            predict: Mutex::new(Ok("setosa".to_string())),
            history: Mutex::new(Ok(vec![sample_record()])),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn set_login(&self, result: ClientResult<String>) {
        *self.login.lock().expect("lock") = result;
    }

    pub(crate) fn set_register(&self, result: ClientResult<()>) {
        *self.register.lock().expect("lock") = result;
    }

    pub(crate) fn set_predict(&self, result: ClientResult<String>) {
        *self.predict.lock().expect("lock") = result;
    }

    pub(crate) fn set_history(&self, result: ClientResult<Vec<PredictionRecord>>) {
        *self.history.lock().expect("lock") = result;
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock").clone()
    }

    pub(crate) fn history_calls(&self) -> Vec<(String, HistoryQuery)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::ListPredictions { token, query } => Some((token, query)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn predict_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Predict { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("lock").push(call);
    }
}

#[async_trait]
impl PredictionService for FakeService {
    async fn login(&self, username: &str, _password: &str) -> ClientResult<String> {
        self.record(Call::Login(username.to_string()));
        self.login.lock().expect("lock").clone()
    }

    async fn register(&self, username: &str, _password: &str) -> ClientResult<()> {
        self.record(Call::Register(username.to_string()));
        self.register.lock().expect("lock").clone()
    }

    async fn predict(&self, token: &str, measurement: &Measurement) -> ClientResult<String> {
        self.record(Call::Predict {
            token: token.to_string(),
            measurement: *measurement,
        });
        self.predict.lock().expect("lock").clone()
    }

    async fn list_predictions(
        &self,
        token: &str,
        query: HistoryQuery,
    ) -> ClientResult<Vec<PredictionRecord>> {
        self.record(Call::ListPredictions {
            token: token.to_string(),
            query,
        });
        self.history.lock().expect("lock").clone()
    }
}

pub(crate) fn sample_record() -> PredictionRecord {
    PredictionRecord {
        created_at: "2025-10-14T12:30:45.123456".to_string(),
        sepal_length: 5.4,
        sepal_width: 3.4,
        petal_length: 1.3,
        petal_width: 0.2,
        predicted_species: "setosa".to_string(),
    }
}
