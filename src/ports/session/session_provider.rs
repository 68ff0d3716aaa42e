use std::sync::Arc;

use async_trait::async_trait;

use crate::{domain::errors::FinderResult, ports::storage::ObjectStoreClient};

/// Account identity a session is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsAccount {
    pub name: String,
    pub region: String,
    pub id: String,
}

impl AwsAccount {
    /// `profile`, `profile.region`, `profile.role` or `profile.region.role`,
    /// where `role` is the last `:` segment of the role ARN
    pub fn session_name(profile: &str, region: Option<&str>, role: Option<&str>) -> String {
        let mut name = profile.to_string();
        if let Some(region) = region {
            name.push('.');
            name.push_str(region);
        }
        if let Some(role) = role {
            name.push('.');
            name.push_str(role.rsplit(':').next().unwrap_or(role));
        }
        name
    }
}

/// An authenticated client bound to one account and region
#[derive(Clone)]
pub struct Session {
    pub account: AwsAccount,
    pub client: Arc<dyn ObjectStoreClient>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

/// Port for acquiring sessions for a named profile
#[async_trait]
pub trait SessionProvider: Send + Sync + 'static {
    /// Authenticate `profile`, optionally pinned to a region and/or assuming a role
    async fn acquire(
        &self,
        profile: &str,
        region: Option<&str>,
        role: Option<&str>,
    ) -> FinderResult<Session>;

    /// Region configured for `profile`
    async fn default_region(&self, profile: &str) -> FinderResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_name_forms() {
        let role = "arn:aws:iam::123456789012:role/reader";

        assert_eq!(AwsAccount::session_name("dev", None, None), "dev");
        assert_eq!(
            AwsAccount::session_name("dev", Some("us-east-1"), None),
            "dev.us-east-1"
        );
        assert_eq!(
            AwsAccount::session_name("dev", None, Some(role)),
            "dev.role/reader"
        );
        assert_eq!(
            AwsAccount::session_name("dev", Some("eu-west-1"), Some(role)),
            "dev.eu-west-1.role/reader"
        );
    }
}
