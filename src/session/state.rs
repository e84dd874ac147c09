use std::sync::Arc;

use tokio::sync::watch;

use crate::models::User;

/// Where the session stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Initializing,
    Anonymous,
    Authenticated,
}

/// The client-side session. `current_user` is present only after the server
/// confirmed the stored or freshly issued credentials.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub current_user: Option<User>,
    pub is_loading: bool,
    initialized: bool,
}

impl Session {
    /// The state before the startup check has run.
    pub fn initializing() -> Self {
        Session {
            current_user: None,
            is_loading: true,
            initialized: false,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if !self.initialized {
            SessionPhase::Initializing
        } else if self.current_user.is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    pub(crate) fn authenticate(&mut self, user: User) {
        self.current_user = Some(user);
        self.initialized = true;
    }

    pub(crate) fn sign_out(&mut self) {
        self.current_user = None;
        self.initialized = true;
    }

    pub(crate) fn settle(&mut self) {
        self.initialized = true;
        self.is_loading = false;
    }
}

/// Session cell shared by the session manager and the API gateway. The
/// gateway only ever signs the session out, on an unrecoverable 401.
pub type SharedSession = Arc<watch::Sender<Session>>;

pub fn shared_session() -> SharedSession {
    let (tx, _rx) = watch::channel(Session::initializing());
    Arc::new(tx)
}
