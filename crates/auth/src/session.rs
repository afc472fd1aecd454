//! Client session state as a pure reducer over request lifecycle actions.
//!
//! The signed-in user is an owned value threaded through [`AuthSession`],
//! never ambient process state.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{IdentityProvider, LoginCredentials, RegisterCredentials, User};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for AuthState {
    /// Loading, nobody signed in; the initial restore settles it.
    fn default() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            is_loading: true,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    LoginStart,
    LoginSuccess(User),
    LoginError(String),
    RegisterStart,
    RegisterSuccess(User),
    RegisterError(String),
    Logout,
    ClearError,
    SetLoading(bool),
}

pub fn reduce(state: AuthState, action: AuthAction) -> AuthState {
    match action {
        AuthAction::LoginStart | AuthAction::RegisterStart => AuthState {
            is_loading: true,
            error: None,
            ..state
        },
        AuthAction::LoginSuccess(user) | AuthAction::RegisterSuccess(user) => AuthState {
            user: Some(user),
            is_authenticated: true,
            is_loading: false,
            error: None,
        },
        AuthAction::LoginError(message) | AuthAction::RegisterError(message) => AuthState {
            user: None,
            is_authenticated: false,
            is_loading: false,
            error: Some(message),
        },
        AuthAction::Logout => AuthState {
            user: None,
            is_authenticated: false,
            is_loading: false,
            error: None,
        },
        AuthAction::ClearError => AuthState { error: None, ..state },
        AuthAction::SetLoading(is_loading) => AuthState { is_loading, ..state },
    }
}

/// Drives [`reduce`] against an identity provider.
#[derive(Debug)]
pub struct AuthSession<P> {
    provider: P,
    state: AuthState,
}

impl<P: IdentityProvider> AuthSession<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            state: AuthState::default(),
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn current_user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn dispatch(&mut self, action: AuthAction) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    /// Resume from a previously persisted user record.
    ///
    /// Unparsable input is dropped. Returns whether a user was restored.
    pub fn restore(&mut self, saved: Option<&str>) -> bool {
        let restored = match saved.map(|raw| serde_json::from_str::<User>(raw)) {
            Some(Ok(user)) => {
                self.dispatch(AuthAction::LoginSuccess(user));
                true
            }
            Some(Err(err)) => {
                tracing::warn!(error = %err, "discarding unreadable saved session");
                false
            }
            None => false,
        };
        self.dispatch(AuthAction::SetLoading(false));
        restored
    }

    /// JSON for the signed-in user, for the caller to persist.
    pub fn persisted(&self) -> Option<String> {
        self.state
            .user
            .as_ref()
            .and_then(|user| serde_json::to_string(user).ok())
    }

    pub fn login(&mut self, credentials: &LoginCredentials) -> &AuthState {
        self.dispatch(AuthAction::LoginStart);
        let action = match self.provider.authenticate(credentials, Utc::now()) {
            Ok(user) => AuthAction::LoginSuccess(user),
            Err(err) => AuthAction::LoginError(err.to_string()),
        };
        self.dispatch(action);
        &self.state
    }

    pub fn register(&mut self, credentials: &RegisterCredentials) -> &AuthState {
        self.dispatch(AuthAction::RegisterStart);
        let action = match self.provider.register(credentials, Utc::now()) {
            Ok(user) => AuthAction::RegisterSuccess(user),
            Err(err) => AuthAction::RegisterError(err.to_string()),
        };
        self.dispatch(action);
        &self.state
    }

    pub fn logout(&mut self) {
        self.dispatch(AuthAction::Logout);
    }

    pub fn clear_error(&mut self) {
        self.dispatch(AuthAction::ClearError);
    }
}
