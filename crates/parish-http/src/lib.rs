//! # parish-http: the JSON web surface of the parish service
//!
//! An axum [`Router`](axum::Router) over the registry and auth services.
//! Every response is a [`Page`] envelope carrying the data, pending flash
//! messages and, after actions, the path the browser should open next.
//! Failures render as `{"error": {"code", "message", "hint"}}`.
//!
//! Cookie sessions are handled by [`session::session_middleware`], which also
//! remembers the last page a signed-in user opened so it can be replayed on
//! their next login.

pub mod error;
pub mod logging;
pub mod response;
pub mod routes;
pub mod session;
pub mod state;

pub use error::{HttpError, HttpResult};
pub use logging::{init_logging, log_shutdown_info, log_startup_info, LoggingConfig};
pub use response::Page;
pub use routes::router;
pub use session::{CurrentUser, MaybeUser, Session};
pub use state::AppState;
