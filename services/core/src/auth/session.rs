//! Session handling for a single request/response exchange.
//!
//! A client holds a [`TokenPair`] and runs every call through an [`Exchange`]. When the service
//! rejects the access token, the exchange moves to [`SessionState::Refreshing`]; the caller then
//! reports whether the refresh worked. A token is refreshed at most once per exchange: a second
//! rejection after a successful refresh logs the session out instead of looping.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Authenticated(TokenPair),
    Refreshing { refresh_token: String },
    LoggedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Unauthorized,
    Refreshed,
    RefreshFailed,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Event {event:?} is not valid in state {state}.")]
pub struct InvalidTransition {
    pub state: &'static str,
    pub event: SessionEvent,
}

#[derive(Debug, Clone)]
pub struct Exchange {
    state: SessionState,
    refreshed: bool,
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            SessionState::Authenticated(_) => "Authenticated",
            SessionState::Refreshing { .. } => "Refreshing",
            SessionState::LoggedOut => "LoggedOut",
        }
    }
}

impl Exchange {
    pub fn new(tokens: TokenPair) -> Self {
        Exchange {
            state: SessionState::Authenticated(tokens),
            refreshed: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Access token to attach to the next attempt, if the exchange is authenticated.
    pub fn access_token(&self) -> Option<&str> {
        match &self.state {
            SessionState::Authenticated(tokens) => Some(&tokens.access_token),
            _ => None,
        }
    }

    /// Refresh token to redeem, if the exchange is refreshing.
    pub fn refresh_token(&self) -> Option<&str> {
        match &self.state {
            SessionState::Refreshing { refresh_token } => Some(refresh_token),
            _ => None,
        }
    }

    /// The service rejected the access token.
    pub fn on_unauthorized(&mut self) -> Result<&SessionState, InvalidTransition> {
        let next = match &self.state {
            SessionState::Authenticated(_) if self.refreshed => SessionState::LoggedOut,
            SessionState::Authenticated(tokens) => SessionState::Refreshing {
                refresh_token: tokens.refresh_token.clone(),
            },
            other => return Err(self.invalid(other, SessionEvent::Unauthorized)),
        };

        self.state = next;
        Ok(&self.state)
    }

    /// The refresh token was redeemed for `tokens`.
    pub fn on_refreshed(&mut self, tokens: TokenPair) -> Result<&SessionState, InvalidTransition> {
        if !matches!(self.state, SessionState::Refreshing { .. }) {
            return Err(self.invalid(&self.state, SessionEvent::Refreshed));
        }

        self.refreshed = true;
        self.state = SessionState::Authenticated(tokens);
        Ok(&self.state)
    }

    /// The refresh token was rejected or the refresh call failed.
    pub fn on_refresh_failed(&mut self) -> Result<&SessionState, InvalidTransition> {
        if !matches!(self.state, SessionState::Refreshing { .. }) {
            return Err(self.invalid(&self.state, SessionEvent::RefreshFailed));
        }

        self.state = SessionState::LoggedOut;
        Ok(&self.state)
    }

    pub fn into_state(self) -> SessionState {
        self.state
    }

    fn invalid(&self, state: &SessionState, event: SessionEvent) -> InvalidTransition {
        InvalidTransition {
            state: state.name(),
            event,
        }
    }
}
