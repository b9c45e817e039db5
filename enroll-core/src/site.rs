//! Sites and request context
//!
//! The site is passed to the activation templates so links point at the right
//! deployment. It comes from the configured site registry when one is set,
//! otherwise from the host of the incoming request.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub domain: String,
    pub name: String,
}

impl Site {
    pub fn new<D: Into<String>, N: Into<String>>(domain: D, name: N) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
        }
    }

    /// A site derived from the request host, used as both domain and name
    pub fn from_request(request: &RequestContext) -> Self {
        Self {
            domain: request.host.clone(),
            name: request.host.clone(),
        }
    }
}

/// What this layer knows about the originating HTTP request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub host: String,
    pub remote_addr: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn new<H: Into<String>>(host: H) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    pub fn with_remote_addr<S: Into<String>>(mut self, remote_addr: S) -> Self {
        self.remote_addr = Some(remote_addr.into());
        self
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}
