//! Render-ready snapshots produced by the view controller.

use shared::domain::{HistoryQuery, Measurement};

use crate::history::HistoryRow;

pub const EMPTY_HISTORY_MESSAGE: &str = "No history to display or failed to retrieve it.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Login(LoginView),
    App(AppView),
}

impl View {
    pub fn notices(&self) -> &[Notice] {
        match self {
            View::Login(view) => &view.notices,
            View::App(view) => &view.notices,
        }
    }

    pub fn is_login(&self) -> bool {
        matches!(self, View::Login(_))
    }
}

/// Login and registration forms.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginView {
    pub api_url: String,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppView {
    pub username: String,
    pub measurement: Measurement,
    pub last_prediction: Option<String>,
    pub query: HistoryQuery,
    pub history: HistoryPanel,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryPanel {
    Rows(Vec<HistoryRow>),
    Empty,
}

impl HistoryPanel {
    pub fn rows(&self) -> &[HistoryRow] {
        match self {
            HistoryPanel::Rows(rows) => rows,
            HistoryPanel::Empty => &[],
        }
    }
}
