pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod record;
pub mod schema;
pub mod sources;
pub mod validator;
