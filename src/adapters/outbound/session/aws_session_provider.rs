use std::sync::Arc;

use async_trait::async_trait;
use aws_config::{
    retry::RetryConfig, sts::AssumeRoleProvider, BehaviorVersion, Region, SdkConfig,
};
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_sdk_s3::error::DisplayErrorContext;
use tracing::{debug, info};

use crate::{
    adapters::outbound::storage::AwsS3Client,
    domain::errors::{FinderError, FinderResult},
    ports::session::{AwsAccount, Session, SessionProvider},
};

/// Attempts per SDK call, first try included
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Longest role session name STS accepts
const MAX_ROLE_SESSION_NAME: usize = 64;

/// Resolves sessions from the local AWS profile chain
#[derive(Debug, Clone)]
pub struct AwsSessionProvider {
    max_attempts: u32,
    endpoint_url: Option<String>,
}

impl Default for AwsSessionProvider {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, None)
    }
}

impl AwsSessionProvider {
    pub fn new(max_attempts: u32, endpoint_url: Option<String>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            endpoint_url,
        }
    }

    async fn load_config(&self, profile: &str, region: Option<&str>) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .profile_name(profile)
            .retry_config(RetryConfig::standard().with_max_attempts(self.max_attempts));

        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }

        if let Some(endpoint) = &self.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        loader.load().await
    }
}

/// STS allows only `[\w+=,.@-]` in a role session name
fn role_session_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || "_+=,.@-".contains(c) {
                c
            } else {
                '-'
            }
        })
        .take(MAX_ROLE_SESSION_NAME)
        .collect()
}

#[async_trait]
impl SessionProvider for AwsSessionProvider {
    async fn acquire(
        &self,
        profile: &str,
        region: Option<&str>,
        role: Option<&str>,
    ) -> FinderResult<Session> {
        let failed = |message: String| FinderError::AcquisitionFailed {
            profile: profile.to_string(),
            region: region.map(str::to_string),
            role: role.map(str::to_string),
            message,
        };

        let name = AwsAccount::session_name(profile, region, role);
        let base = self.load_config(profile, region).await;

        let config = match role {
            None => base,
            Some(role_arn) => {
                debug!(profile, role = role_arn, "Assuming role");
                let provider = AssumeRoleProvider::builder(role_arn)
                    .session_name(role_session_name(&name))
                    .configure(&base)
                    .build()
                    .await;
                base.into_builder()
                    .credentials_provider(SharedCredentialsProvider::new(provider))
                    .build()
            }
        };

        let session_region = config
            .region()
            .map(|r| r.to_string())
            .ok_or_else(|| failed("no region configured".to_string()))?;

        let identity = aws_sdk_sts::Client::new(&config)
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| failed(DisplayErrorContext(e).to_string()))?;
        let account_id = identity.account().unwrap_or_default().to_string();

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(self.endpoint_url.is_some())
            .build();
        let client = AwsS3Client::new(aws_sdk_s3::Client::from_conf(s3_config), &session_region);

        info!(account = %name, account_id = %account_id, region = %session_region, "Session acquired");

        Ok(Session {
            account: AwsAccount {
                name,
                region: session_region,
                id: account_id,
            },
            client: Arc::new(client),
        })
    }

    async fn default_region(&self, profile: &str) -> FinderResult<String> {
        let config = self.load_config(profile, None).await;
        config
            .region()
            .map(|r| r.to_string())
            .ok_or_else(|| FinderError::AcquisitionFailed {
                profile: profile.to_string(),
                region: None,
                role: None,
                message: "no default region configured for profile".to_string(),
            })
    }
}
