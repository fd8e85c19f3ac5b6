//! docfreq server
//!
//! One process runs the HTTP submission API and, unless disabled, the queue
//! subscription that processes jobs. Both share the same work queue and
//! result cache backends.

pub mod app;
pub mod backend;
pub mod error;
pub mod handlers;
pub mod startup;

pub use app::{create_app, AppState};
pub use backend::Backends;
pub use error::ApiError;
pub use startup::Server;
