//! Session state machine: maps user actions to API calls, session mutations
//! and cache invalidation, then produces the next view.

use std::sync::Arc;

use shared::domain::{capitalize_species, HistoryQuery, Measurement};
use tracing::{debug, info, warn};

use crate::{
    history::HistoryCache,
    session::Session,
    view::{AppView, HistoryPanel, LoginView, Notice, NoticeLevel, View},
    PredictionService,
};

pub const SESSION_EXPIRED_MESSAGE: &str =
    "Authentication required; your token may have expired. Please log in again.";
pub const REGISTERED_MESSAGE: &str = "Registration successful. Please log in.";
pub const LOGGED_OUT_MESSAGE: &str = "Session ended.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    LoggedOut,
    LoggedIn,
}

#[derive(Clone, PartialEq)]
pub enum Action {
    Login { username: String, password: String },
    Register { username: String, password: String },
    Logout,
    SetMeasurement(Measurement),
    Predict,
    SetHistoryQuery(HistoryQuery),
    NextPage,
    PreviousPage,
    Refresh,
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::Login { .. } => "login",
            Action::Register { .. } => "register",
            Action::Logout => "logout",
            Action::SetMeasurement(_) => "set_measurement",
            Action::Predict => "predict",
            Action::SetHistoryQuery(_) => "set_history_query",
            Action::NextPage => "next_page",
            Action::PreviousPage => "previous_page",
            Action::Refresh => "refresh",
        }
    }

    fn requires_session(&self) -> bool {
        !matches!(
            self,
            Action::Login { .. } | Action::Register { .. } | Action::Logout | Action::Refresh
        )
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Owns the single session, its history cache and the app view's inputs.
/// One controller serves exactly one user.
pub struct ViewController {
    api: Arc<dyn PredictionService>,
    api_url: String,
    session: Session,
    cache: HistoryCache,
    measurement: Measurement,
    query: HistoryQuery,
    notices: Vec<Notice>,
}

impl ViewController {
    pub fn new(api: Arc<dyn PredictionService>, api_url: impl Into<String>) -> Self {
        Self {
            api,
            api_url: api_url.into(),
            session: Session::new(),
            cache: HistoryCache::new(),
            measurement: Measurement::default(),
            query: HistoryQuery::default(),
            notices: Vec::new(),
        }
    }

    pub fn state(&self) -> ViewState {
        if self.session.is_authenticated() {
            ViewState::LoggedIn
        } else {
            ViewState::LoggedOut
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn cache(&self) -> &HistoryCache {
        &self.cache
    }

    pub fn measurement(&self) -> Measurement {
        self.measurement
    }

    pub fn history_query(&self) -> HistoryQuery {
        self.query
    }

    /// Applies one user action and renders the resulting view.
    pub async fn dispatch(&mut self, action: Action) -> View {
        self.apply(action).await;
        self.render().await
    }

    async fn apply(&mut self, action: Action) {
        debug!(action = action.name(), "controller: dispatch");
        if action.requires_session() && !self.session.is_authenticated() {
            self.notify(NoticeLevel::Error, "Please log in first.");
            return;
        }

        match action {
            Action::Login { username, password } => self.login(username, password).await,
            Action::Register { username, password } => self.register(username, password).await,
            Action::Logout => self.logout(),
            Action::SetMeasurement(measurement) => self.measurement = measurement,
            Action::Predict => self.predict().await,
            Action::SetHistoryQuery(query) => self.query = query,
            Action::NextPage => self.query = self.query.next_page(),
            Action::PreviousPage => self.query = self.query.previous_page(),
            Action::Refresh => {}
        }
    }

    async fn login(&mut self, username: String, password: String) {
        if self.session.is_authenticated() {
            let current = self.session.username().unwrap_or_default();
            let text = format!("Already logged in as {current}; log out first.");
            self.notify(NoticeLevel::Error, text);
            return;
        }

        match self.api.login(&username, &password).await {
            Ok(token) => {
                self.cache.invalidate_all();
                info!(username = %username, "controller: logged in");
                self.session.set_authenticated(token, username);
            }
            Err(err) => self.notify(NoticeLevel::Error, err.to_string()),
        }
    }

    async fn register(&mut self, username: String, password: String) {
        if self.session.is_authenticated() {
            self.notify(NoticeLevel::Error, "Log out before registering a new account.");
            return;
        }

        match self.api.register(&username, &password).await {
            Ok(()) => self.notify(NoticeLevel::Success, REGISTERED_MESSAGE),
            Err(err) => self.notify(NoticeLevel::Error, err.to_string()),
        }
    }

    fn logout(&mut self) {
        let was_authenticated = self.session.is_authenticated();
        self.end_session();
        if was_authenticated {
            info!("controller: logged out");
            self.notify(NoticeLevel::Info, LOGGED_OUT_MESSAGE);
        }
    }

    async fn predict(&mut self) {
        let Some(token) = self.session.token().map(str::to_owned) else {
            self.notify(NoticeLevel::Error, "Please log in to make a prediction.");
            return;
        };

        match self.api.predict(&token, &self.measurement).await {
            Ok(species) => {
                self.session.set_last_prediction(Some(species));
                self.cache.invalidate_all();
            }
            Err(err) if err.is_unauthorized() => self.expire_session(),
            Err(err) => {
                self.session.set_last_prediction(None);
                self.notify(NoticeLevel::Error, format!("Prediction failed: {err}"));
            }
        }
    }

    /// Produces the view for the current state. In the logged-in state this
    /// reads the history page through the cache, which may itself end the
    /// session on a 401.
    pub async fn render(&mut self) -> View {
        let Some(token) = self.session.token().map(str::to_owned) else {
            return self.login_view();
        };

        let fetched = self
            .cache
            .get(self.api.as_ref(), &token, self.query)
            .await
            .map(|rows| rows.to_vec());
        let history = match fetched {
            Ok(rows) if rows.is_empty() => HistoryPanel::Empty,
            Ok(rows) => HistoryPanel::Rows(rows),
            Err(err) if err.is_unauthorized() => {
                self.expire_session();
                return self.login_view();
            }
            Err(err) => {
                self.notify(
                    NoticeLevel::Error,
                    format!("Failed to fetch history: {err}"),
                );
                HistoryPanel::Empty
            }
        };

        View::App(AppView {
            username: self.session.username().unwrap_or_default().to_string(),
            measurement: self.measurement,
            last_prediction: self.session.last_prediction().map(capitalize_species),
            query: self.query,
            history,
            notices: std::mem::take(&mut self.notices),
        })
    }

    fn login_view(&mut self) -> View {
        View::Login(LoginView {
            api_url: self.api_url.clone(),
            notices: std::mem::take(&mut self.notices),
        })
    }

    /// Drops every trace of the current session: credentials, cached pages
    /// and the app view's inputs.
    fn end_session(&mut self) {
        self.session.clear();
        self.cache.invalidate_all();
        self.measurement = Measurement::default();
        self.query = HistoryQuery::default();
    }

    fn expire_session(&mut self) {
        warn!("controller: session rejected by API; logging out");
        self.end_session();
        self.notify(NoticeLevel::Error, SESSION_EXPIRED_MESSAGE);
    }

    fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notices.push(Notice::new(level, text));
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
