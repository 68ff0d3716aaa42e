use std::sync::Arc;

use crate::{
    adapters::outbound::session::{AwsSessionProvider, DEFAULT_MAX_ATTEMPTS},
    domain::errors::{FinderError, FinderResult, ValidationError},
    ports::session::{Session, SessionProvider},
    services::{FanoutPolicy, FanoutReport, RegionCollector, RegionFanout},
};

/// Where sessions come from
#[derive(Clone)]
pub enum SessionBackend {
    /// Local AWS profile chain
    Aws {
        max_attempts: u32,
        endpoint_url: Option<String>,
    },
    /// A caller-supplied provider, e.g. an in-memory one for tests
    Custom(Arc<dyn SessionProvider>),
}

impl Default for SessionBackend {
    fn default() -> Self {
        SessionBackend::Aws {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            endpoint_url: None,
        }
    }
}

impl std::fmt::Debug for SessionBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionBackend::Aws {
                max_attempts,
                endpoint_url,
            } => f
                .debug_struct("Aws")
                .field("max_attempts", max_attempts)
                .field("endpoint_url", endpoint_url)
                .finish(),
            SessionBackend::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct FinderConfig {
    pub profile: String,
    /// Requested regions; empty means the profile's default region
    pub regions: Vec<String>,
    pub role: Option<String>,
    pub session_backend: SessionBackend,
    pub fanout_policy: FanoutPolicy,
}

impl FinderConfig {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            regions: Vec::new(),
            role: None,
            session_backend: SessionBackend::default(),
            fanout_policy: FanoutPolicy::default(),
        }
    }
}

/// Wired application: a session provider plus the fan-out over it
pub struct FinderApp {
    config: FinderConfig,
    fanout: RegionFanout,
}

impl FinderApp {
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    pub fn fanout(&self) -> &RegionFanout {
        &self.fanout
    }

    /// The configured regions, or the profile's default region
    pub async fn regions(&self) -> FinderResult<Vec<String>> {
        self.fanout
            .resolve_regions(&self.config.profile, &self.config.regions)
            .await
    }

    /// A single session, in `region` or the profile's default region
    pub async fn session(&self, region: Option<&str>) -> FinderResult<Session> {
        self.fanout
            .provider()
            .acquire(&self.config.profile, region, self.config.role.as_deref())
            .await
    }

    /// Run `collector` across every configured region
    pub async fn collect<C: RegionCollector>(&self, collector: &C) -> FinderResult<FanoutReport<C::Item>> {
        let regions = self.regions().await?;
        self.fanout
            .for_each_region(
                &regions,
                &self.config.profile,
                self.config.role.as_deref(),
                collector,
            )
            .await
    }
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: FinderConfig,
}

impl AppBuilder {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            config: FinderConfig::new(profile),
        }
    }

    pub fn with_config(mut self, config: FinderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_regions(mut self, regions: Vec<String>) -> Self {
        self.config.regions = regions;
        self
    }

    pub fn with_role(mut self, role: Option<String>) -> Self {
        self.config.role = role;
        self
    }

    pub fn with_session_backend(mut self, backend: SessionBackend) -> Self {
        self.config.session_backend = backend;
        self
    }

    pub fn with_fanout_policy(mut self, policy: FanoutPolicy) -> Self {
        self.config.fanout_policy = policy;
        self
    }

    pub fn build(self) -> FinderResult<FinderApp> {
        if self.config.profile.trim().is_empty() {
            return Err(FinderError::Validation(ValidationError::InvalidField {
                field: "profile".to_string(),
                value: self.config.profile,
                expected: "a non-empty AWS profile name".to_string(),
            }));
        }

        let provider: Arc<dyn SessionProvider> = match &self.config.session_backend {
            SessionBackend::Aws {
                max_attempts,
                endpoint_url,
            } => Arc::new(AwsSessionProvider::new(*max_attempts, endpoint_url.clone())),
            SessionBackend::Custom(provider) => provider.clone(),
        };

        let fanout = RegionFanout::new(provider).with_policy(self.config.fanout_policy);
        Ok(FinderApp {
            config: self.config,
            fanout,
        })
    }
}

/// Build an application backed by the local AWS profile chain
pub fn create_aws_app(
    profile: &str,
    regions: Vec<String>,
    role: Option<String>,
) -> FinderResult<FinderApp> {
    AppBuilder::new(profile)
        .with_regions(regions)
        .with_role(role)
        .build()
}
