use std::time::Duration;
use ureq::Agent;

use crate::error::WorkflowError;

pub trait Reachability {
    fn check(&self) -> Result<(), WorkflowError>;
}

/// HEAD request against a well-known endpoint with a short global timeout.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    url: String,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

impl Reachability for HttpProbe {
    fn check(&self) -> Result<(), WorkflowError> {
        log::debug!(
            "connectivity: HEAD {} (timeout {:?})",
            self.url,
            self.timeout
        );

        let config = Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .http_status_as_error(false)
            .build();
        let agent: Agent = config.into();

        let resp = agent
            .head(&self.url)
            .header(
                "User-Agent",
                &format!("lap-updater/{}", env!("CARGO_PKG_VERSION")),
            )
            .call()
            .map_err(|e| WorkflowError::Connectivity {
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(WorkflowError::Connectivity {
                reason: format!("status code {}", status.as_u16()),
            });
        }

        Ok(())
    }
}
