use std::fmt;

/// Authentication state for one user of one running client.
///
/// `is_authenticated()` is derived from the token, so the logged-in flag and
/// the token can never disagree.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    username: Option<String>,
    last_prediction: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn last_prediction(&self) -> Option<&str> {
        self.last_prediction.as_deref()
    }

    pub fn set_authenticated(&mut self, token: impl Into<String>, username: impl Into<String>) {
        self.token = Some(token.into());
        self.username = Some(username.into());
    }

    pub fn set_last_prediction(&mut self, species: Option<String>) {
        self.last_prediction = species;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .field("username", &self.username)
            .field("last_prediction", &self.last_prediction)
            .finish()
    }
}
