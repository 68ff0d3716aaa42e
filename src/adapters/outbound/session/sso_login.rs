use std::time::Duration;

use tokio::process::Command;
use tracing::{info, warn};

use crate::domain::errors::{FinderError, FinderResult};

pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs `aws sso login` for a profile as a child process
#[derive(Debug, Clone)]
pub struct SsoLogin {
    program: String,
    timeout: Duration,
}

impl Default for SsoLogin {
    fn default() -> Self {
        Self {
            program: "aws".to_string(),
            timeout: DEFAULT_LOGIN_TIMEOUT,
        }
    }
}

impl SsoLogin {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }

    /// Use a different executable in place of `aws`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Succeeds iff the login process exits zero within the timeout
    pub async fn login(&self, profile: &str, region: Option<&str>) -> FinderResult<()> {
        let failed = |message: String| FinderError::LoginFailed {
            profile: profile.to_string(),
            message,
        };

        let mut command = Command::new(&self.program);
        command
            .args(["sso", "login", "--profile", profile])
            .kill_on_drop(true);
        if let Some(region) = region {
            command.args(["--region", region]);
        }

        info!(profile, region = region.unwrap_or("default"), "Starting SSO login");

        let status = tokio::time::timeout(self.timeout, command.status())
            .await
            .map_err(|_| failed(format!("timed out after {}s", self.timeout.as_secs())))?
            .map_err(|e| failed(format!("could not start '{}': {}", self.program, e)))?;

        if !status.success() {
            warn!(profile, %status, "SSO login exited unsuccessfully");
            return Err(failed(format!("login process exited with {}", status)));
        }

        info!(profile, "SSO login complete");
        Ok(())
    }
}
