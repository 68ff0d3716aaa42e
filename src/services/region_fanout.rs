//! Sequential per-region orchestration.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, info_span, warn, Instrument, Span};

use crate::{
    domain::errors::{FinderError, FinderResult},
    ports::session::{Session, SessionProvider},
};

/// Work performed once per region against that region's session
#[async_trait]
pub trait RegionCollector: Send + Sync {
    type Item: Send;

    async fn collect(&self, session: &Session) -> FinderResult<Vec<Self::Item>>;
}

/// What the fan-out does when a region cannot be processed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FanoutPolicy {
    /// Stop at the first failed region and return its error
    #[default]
    AbortOnError,
    /// Record the failed region and move on to the next one
    ContinueOnError,
}

#[derive(Debug)]
pub struct RegionFailure {
    pub region: String,
    pub error: FinderError,
}

/// Merged results, in region order, plus any regions skipped under
/// [`FanoutPolicy::ContinueOnError`]
#[derive(Debug)]
pub struct FanoutReport<T> {
    pub items: Vec<T>,
    pub failed_regions: Vec<RegionFailure>,
}

impl<T> FanoutReport<T> {
    pub fn is_complete(&self) -> bool {
        self.failed_regions.is_empty()
    }
}

/// Split repeated and/or comma-separated region arguments, dropping blanks
pub fn split_regions<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| value.as_ref().split(','))
        .map(str::trim)
        .filter(|region| !region.is_empty())
        .map(str::to_string)
        .collect()
}

/// Visits regions one at a time, acquiring a session for each and handing
/// it to a [`RegionCollector`].
pub struct RegionFanout {
    provider: Arc<dyn SessionProvider>,
    policy: FanoutPolicy,
    span: Span,
}

impl RegionFanout {
    pub fn new(provider: Arc<dyn SessionProvider>) -> Self {
        Self {
            provider,
            policy: FanoutPolicy::default(),
            span: info_span!("region_fanout"),
        }
    }

    pub fn with_policy(mut self, policy: FanoutPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn provider(&self) -> &Arc<dyn SessionProvider> {
        &self.provider
    }

    /// The requested regions, or the profile's default region when none are given
    pub async fn resolve_regions<S: AsRef<str>>(
        &self,
        profile: &str,
        requested: &[S],
    ) -> FinderResult<Vec<String>> {
        let regions = split_regions(requested);
        if !regions.is_empty() {
            return Ok(regions);
        }
        Ok(vec![self.provider.default_region(profile).await?])
    }

    /// Run `collector` in every region, in order, and merge what it returns
    pub async fn for_each_region<C: RegionCollector>(
        &self,
        regions: &[String],
        profile: &str,
        role: Option<&str>,
        collector: &C,
    ) -> FinderResult<FanoutReport<C::Item>> {
        async {
            let mut report = FanoutReport {
                items: Vec::new(),
                failed_regions: Vec::new(),
            };

            for region in regions {
                let outcome = match self.provider.acquire(profile, Some(region), role).await {
                    Ok(session) => {
                        info!(region = %region, account = %session.account.name, "Collecting");
                        collector.collect(&session).await
                    }
                    Err(e) => Err(e),
                };

                match outcome {
                    Ok(items) => {
                        info!(region = %region, found = items.len(), "Region complete");
                        report.items.extend(items);
                    }
                    Err(e) if self.policy == FanoutPolicy::ContinueOnError => {
                        warn!(region = %region, error = %e, "Region failed, continuing");
                        report.failed_regions.push(RegionFailure {
                            region: region.clone(),
                            error: e,
                        });
                    }
                    Err(e) => {
                        error!(region = %region, error = %e, "Region failed, aborting fan-out");
                        return Err(e);
                    }
                }
            }

            Ok(report)
        }
        .instrument(self.span.clone())
        .await
    }
}
