pub mod manager;
pub mod state;

pub use manager::{RouteAccess, SessionManager};
pub use state::{shared_session, Session, SessionPhase, SharedSession};
