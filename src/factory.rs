//! Maps a protocol identifier to a configured [`RequestRunner`].

use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::Arc;

use tracing::debug;

use crate::auth::{ApiKeyAuth, Authenticator, BearerAuth, Credentials, ExampleAuth, NoAuth};
use crate::error::RunnerError;
use crate::runner::RequestRunner;
use crate::transport::{BasicClient, HttpTransport};

/// Protocol identifiers accepted by [`RunnerFactory::create`]. Each one binds a
/// single [`Authenticator`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Base variant with no authentication capability.
    Http,
    HttpExample,
    HttpBearer,
    HttpApiKey,
}

impl Protocol {
    pub const ALL: [Protocol; 4] = [
        Protocol::Http,
        Protocol::HttpExample,
        Protocol::HttpBearer,
        Protocol::HttpApiKey,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::HttpExample => "http_example",
            Protocol::HttpBearer => "http_bearer",
            Protocol::HttpApiKey => "http_api_key",
        }
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Protocol::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| RunnerError::UnsupportedProtocol(s.to_string()))
    }
}

/// Builds runners that share one transport.
#[derive(Clone)]
pub struct RunnerFactory {
    transport: Arc<dyn HttpTransport>,
}

impl RunnerFactory {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    pub fn protocols() -> impl Iterator<Item = &'static str> {
        Protocol::ALL.into_iter().map(|p| p.as_str())
    }

    /// Creates a runner for `protocol` (case-insensitive).
    ///
    /// Credentials are passed through as given; completeness is only checked
    /// when an authenticated request is run.
    pub fn create(
        &self,
        protocol: &str,
        credentials: Credentials,
    ) -> Result<RequestRunner, RunnerError> {
        let protocol: Protocol = protocol.parse()?;
        let authenticator: Box<dyn Authenticator> = match protocol {
            Protocol::Http => Box::new(NoAuth),
            Protocol::HttpExample => Box::new(ExampleAuth),
            Protocol::HttpBearer => Box::new(BearerAuth::new(self.transport.clone())),
            Protocol::HttpApiKey => Box::new(ApiKeyAuth::default()),
        };
        debug!(%protocol, "runner created");
        Ok(RequestRunner::new(
            credentials,
            authenticator,
            self.transport.clone(),
        ))
    }
}

impl Default for RunnerFactory {
    fn default() -> Self {
        Self::new(Arc::new(BasicClient::new()))
    }
}
