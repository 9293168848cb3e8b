//! Generic HTTP request runner for API test scenarios.
//!
//! A [`RunnerFactory`] turns a protocol name into a [`RequestRunner`] bound to
//! one [`Authenticator`](auth::Authenticator). The runner validates a
//! [`RequestSpec`], optionally authenticates, encodes the body through the
//! [`CodecRegistry`](codec::CodecRegistry), dispatches it over an
//! [`HttpTransport`](transport::HttpTransport) and normalizes the reply into a
//! [`ResponseResult`]. Every failure is a [`RunnerError`].

pub mod auth;
pub mod codec;
pub mod config;
pub mod error;
pub mod factory;
pub mod output;
pub mod record;
pub mod runner;
pub mod template;
pub mod transport;

pub use error::RunnerError;
pub use factory::{Protocol, RunnerFactory};
pub use runner::{RequestRunner, RequestSpec, ResponseResult};
