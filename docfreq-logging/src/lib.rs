//! Tracing subscriber setup for docfreq

mod init;

pub use init::{build_env_filter, init_logging};
