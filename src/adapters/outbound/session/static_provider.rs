use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    domain::errors::{FinderError, FinderResult},
    ports::{
        session::{AwsAccount, Session, SessionProvider},
        storage::ObjectStoreClient,
    },
};

/// Hands out pre-built clients keyed by region, for testing and development
#[derive(Clone, Default)]
pub struct StaticSessionProvider {
    account_id: String,
    clients: HashMap<String, Arc<dyn ObjectStoreClient>>,
    default_regions: HashMap<String, String>,
    failing_regions: HashSet<String>,
    acquired: Arc<RwLock<Vec<String>>>,
}

impl StaticSessionProvider {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            ..Default::default()
        }
    }

    /// Serve `client` for sessions in `region`
    pub fn with_region(mut self, region: &str, client: Arc<dyn ObjectStoreClient>) -> Self {
        self.clients.insert(region.to_string(), client);
        self
    }

    pub fn with_default_region(mut self, profile: &str, region: &str) -> Self {
        self.default_regions
            .insert(profile.to_string(), region.to_string());
        self
    }

    /// Make acquisition fail for `region`
    pub fn with_failing_region(mut self, region: &str) -> Self {
        self.failing_regions.insert(region.to_string());
        self
    }

    /// Regions acquired so far, in order
    pub async fn acquired_regions(&self) -> Vec<String> {
        self.acquired.read().await.clone()
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn acquire(
        &self,
        profile: &str,
        region: Option<&str>,
        role: Option<&str>,
    ) -> FinderResult<Session> {
        let failed = |message: &str| FinderError::AcquisitionFailed {
            profile: profile.to_string(),
            region: region.map(str::to_string),
            role: role.map(str::to_string),
            message: message.to_string(),
        };

        let resolved = match region {
            Some(region) => region.to_string(),
            None => self.default_region(profile).await?,
        };
        self.acquired.write().await.push(resolved.clone());

        if self.failing_regions.contains(&resolved) {
            return Err(failed("credentials rejected"));
        }
        let client = self
            .clients
            .get(&resolved)
            .cloned()
            .ok_or_else(|| failed("no client registered for region"))?;

        Ok(Session {
            account: AwsAccount {
                name: AwsAccount::session_name(profile, region, role),
                region: resolved,
                id: self.account_id.clone(),
            },
            client,
        })
    }

    async fn default_region(&self, profile: &str) -> FinderResult<String> {
        self.default_regions
            .get(profile)
            .cloned()
            .ok_or_else(|| FinderError::AcquisitionFailed {
                profile: profile.to_string(),
                region: None,
                role: None,
                message: "no default region configured for profile".to_string(),
            })
    }
}
