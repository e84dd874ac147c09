use tokio::sync::watch;
use tracing::{info, warn};

use super::state::{Session, SessionPhase, SharedSession};
use crate::gateway::ApiError;
use crate::models::{LoginCredentials, SignupRequest, User};
use crate::services::{AuthService, ProfileUpdate};
use crate::store::TokenStore;

/// What a screen should do given the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// The startup check has not finished; show a loading state.
    Pending,
    Allowed,
    RedirectToLogin,
    RedirectHome,
}

/// Owns the session and every transition of it.
///
/// Authentication is decided by the presence of a server-confirmed user,
/// never by token presence.
#[derive(Clone)]
pub struct SessionManager {
    auth: AuthService,
    tokens: TokenStore,
    session: SharedSession,
}

/// Keeps `is_loading` raised while alive, including when the operation's
/// future is dropped half way.
struct Loading<'a>(&'a watch::Sender<Session>);

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.send_modify(|s| s.is_loading = false);
    }
}

impl SessionManager {
    pub fn new(auth: AuthService, tokens: TokenStore, session: SharedSession) -> Self {
        SessionManager {
            auth,
            tokens,
            session,
        }
    }

    fn loading(&self) -> Loading<'_> {
        self.session.send_modify(|s| s.is_loading = true);
        Loading(&self.session)
    }

    /// Validate stored credentials once at startup.
    pub async fn initialize(&self) -> SessionPhase {
        let _loading = self.loading();

        if self.tokens.access_token().is_none() {
            info!(
                event_name = "session.initialize.anonymous",
                event_domain = "session",
                "no stored credentials"
            );
            self.session.send_modify(|s| {
                s.sign_out();
                s.settle();
            });
            return SessionPhase::Anonymous;
        }

        match self.auth.current_user().await {
            Ok(user) => {
                info!(
                    event_name = "session.initialize.restored",
                    event_domain = "session",
                    user_id = user.id,
                    "session restored for '{}'",
                    user.username
                );
                self.session.send_modify(|s| {
                    s.authenticate(user);
                    s.settle();
                });
                SessionPhase::Authenticated
            }
            Err(e) => {
                warn!(
                    event_name = "session.initialize.rejected",
                    event_domain = "session",
                    "stored credentials rejected: {}",
                    e
                );
                self.tokens.clear();
                self.session.send_modify(|s| {
                    s.sign_out();
                    s.settle();
                });
                SessionPhase::Anonymous
            }
        }
    }

    /// Obtain tokens and load the user. The session becomes Authenticated
    /// only when both steps succeed.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, ApiError> {
        let _loading = self.loading();
        let credentials = LoginCredentials {
            username: username.to_string(),
            password: password.to_string(),
        };

        let outcome = match self.auth.login(&credentials).await {
            Ok(_) => self.auth.current_user().await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(user) => {
                info!(
                    event_name = "session.login.succeeded",
                    event_domain = "session",
                    user_id = user.id,
                    "logged in as '{}'",
                    user.username
                );
                self.session.send_modify(|s| s.authenticate(user.clone()));
                Ok(user)
            }
            Err(e) => {
                warn!(
                    event_name = "session.login.failed",
                    event_domain = "session",
                    "login for '{}' failed: {}",
                    username,
                    e
                );
                self.session.send_modify(Session::sign_out);
                Err(e)
            }
        }
    }

    /// Register an account. The session is left as it is.
    pub async fn signup(&self, username: &str, email: &str, password: &str) -> Result<(), ApiError> {
        let _loading = self.loading();
        let request = SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.auth.signup(&request).await?;
        info!("Account '{}' created", username);
        Ok(())
    }

    /// Always ends Anonymous with no stored tokens; a failed server-side
    /// blacklist is only logged.
    pub async fn logout(&self) {
        let _loading = self.loading();
        if let Err(e) = self.auth.logout().await {
            warn!(
                event_name = "session.logout.blacklist_failed",
                event_domain = "session",
                "could not blacklist refresh token: {}",
                e
            );
        }
        self.tokens.clear();
        self.session.send_modify(Session::sign_out);
        info!(
            event_name = "session.logout.completed",
            event_domain = "session",
            "logged out"
        );
    }

    /// Update the profile and adopt the server's copy of the user.
    pub async fn update_user(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let _loading = self.loading();
        let user = self.auth.update_profile(update).await?;
        self.session.send_modify(|s| s.authenticate(user.clone()));
        Ok(user)
    }

    pub fn snapshot(&self) -> Session {
        self.session.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.borrow().phase()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.borrow().is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.borrow().current_user.clone()
    }

    /// Access to screens that need a signed-in user.
    pub fn guard(&self) -> RouteAccess {
        match self.phase() {
            SessionPhase::Initializing => RouteAccess::Pending,
            SessionPhase::Authenticated => RouteAccess::Allowed,
            SessionPhase::Anonymous => RouteAccess::RedirectToLogin,
        }
    }

    /// Access to the login and signup screens.
    pub fn guard_guest(&self) -> RouteAccess {
        match self.phase() {
            SessionPhase::Initializing => RouteAccess::Pending,
            SessionPhase::Authenticated => RouteAccess::RedirectHome,
            SessionPhase::Anonymous => RouteAccess::Allowed,
        }
    }

    /// Whether `user_id` is the signed-in user, for ownership checks.
    pub fn is_current_user(&self, user_id: u64) -> bool {
        self.session
            .borrow()
            .current_user
            .as_ref()
            .is_some_and(|user| user.id == user_id)
    }
}
