use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use s3_finder::{
    adapters::outbound::session::DEFAULT_MAX_ATTEMPTS, domain::models::parse_utc_datetime,
    AppBuilder, DateRange, FanoutPolicy, FinderApp, NameMatcher, SessionBackend,
};
use serde::Serialize;

/// Which account, regions and role to run against
#[derive(Args, Debug, Clone, Serialize)]
pub struct AccountArgs {
    /// AWS profile name
    #[arg(short = 'p', long = "aws-profile-name", env = "AWS_PROFILE")]
    pub profile: String,

    /// Regions to search; repeat or comma-separate. Defaults to the profile's region
    #[arg(short = 'r', long = "regions", num_args = 1.., env = "S3_FINDER_REGIONS")]
    pub regions: Vec<String>,

    /// Role ARN to assume
    #[arg(long = "role-arn", env = "S3_FINDER_ROLE_ARN")]
    pub role: Option<String>,

    /// Alternative S3 endpoint, e.g. LocalStack
    #[arg(long, env = "S3_FINDER_ENDPOINT_URL")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,

    /// Attempts per AWS call before giving up
    #[arg(long, env = "S3_FINDER_MAX_ATTEMPTS", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// Skip regions that fail instead of aborting
    #[arg(long)]
    pub continue_on_error: bool,
}

impl AccountArgs {
    pub fn build_app(&self) -> Result<FinderApp> {
        let policy = if self.continue_on_error {
            FanoutPolicy::ContinueOnError
        } else {
            FanoutPolicy::AbortOnError
        };

        AppBuilder::new(&self.profile)
            .with_regions(self.regions.clone())
            .with_role(self.role.clone())
            .with_session_backend(SessionBackend::Aws {
                max_attempts: self.max_attempts,
                endpoint_url: self.endpoint_url.clone(),
            })
            .with_fanout_policy(policy)
            .build()
            .context("Failed to build application")
    }
}

/// Age and date bounds for buckets or objects
#[derive(Debug, Clone, Default, Serialize)]
pub struct Bounds {
    pub min_age_days: Option<u32>,
    pub max_age_days: Option<u32>,
    pub after: Option<String>,
    pub before: Option<String>,
}

impl Bounds {
    /// Combine age limits and explicit dates; the tighter bound wins
    pub fn date_range(&self, now: DateTime<Utc>) -> Result<DateRange> {
        let after = self
            .after
            .as_deref()
            .map(parse_utc_datetime)
            .transpose()
            .context("Invalid --after date")?;
        let before = self
            .before
            .as_deref()
            .map(parse_utc_datetime)
            .transpose()
            .context("Invalid --before date")?;

        Ok(DateRange::from_age_days(self.min_age_days, self.max_age_days, now)
            .tighten_start(after)
            .tighten_end(before))
    }
}

/// Name and time filter for buckets.
///
/// Argument ids carry a `bucket_` prefix so this group can be flattened
/// next to [`ObjectFilterArgs`], whose fields share the same names.
#[derive(Args, Debug, Clone, Serialize)]
pub struct BucketFilterArgs {
    /// Pattern matched against the start of bucket names, case-insensitive
    #[arg(id = "bucket_like_name", long = "bucket-like-name", default_value = ".*")]
    pub like_name: String,

    /// Match bucket names exactly instead
    #[arg(id = "bucket_exact", long = "bucket-exact")]
    pub exact: bool,

    /// Exclude buckets created less than this many days ago
    #[arg(id = "bucket_min_age_days", long = "bucket-min-age-days")]
    pub min_age_days: Option<u32>,

    /// Exclude buckets created more than this many days ago
    #[arg(id = "bucket_max_age_days", long = "bucket-max-age-days")]
    pub max_age_days: Option<u32>,

    /// Exclude buckets created before this date
    #[arg(id = "bucket_after", long = "bucket-after")]
    pub after: Option<String>,

    /// Exclude buckets created after this date
    #[arg(id = "bucket_before", long = "bucket-before")]
    pub before: Option<String>,
}

impl BucketFilterArgs {
    pub fn matcher(&self) -> Result<NameMatcher> {
        Ok(NameMatcher::from_flag(&self.like_name, self.exact)?)
    }

    pub fn date_range(&self, now: DateTime<Utc>) -> Result<DateRange> {
        Bounds {
            min_age_days: self.min_age_days,
            max_age_days: self.max_age_days,
            after: self.after.clone(),
            before: self.before.clone(),
        }
        .date_range(now)
    }
}

/// Name and time filter for objects; the name is matched against the last key segment
#[derive(Args, Debug, Clone, Serialize)]
pub struct ObjectFilterArgs {
    /// Pattern matched against the start of object names, case-insensitive
    #[arg(long = "like-name", default_value = ".*")]
    pub like_name: String,

    /// Match object names exactly instead
    #[arg(long = "exact")]
    pub exact: bool,

    /// Exclude objects modified less than this many days ago
    #[arg(long = "min-age-days")]
    pub min_age_days: Option<u32>,

    /// Exclude objects modified more than this many days ago
    #[arg(long = "max-age-days")]
    pub max_age_days: Option<u32>,

    /// Exclude objects modified before this date
    #[arg(long = "after")]
    pub after: Option<String>,

    /// Exclude objects modified after this date
    #[arg(long = "before")]
    pub before: Option<String>,
}

impl ObjectFilterArgs {
    pub fn matcher(&self) -> Result<NameMatcher> {
        Ok(NameMatcher::from_flag(&self.like_name, self.exact)?)
    }

    pub fn date_range(&self, now: DateTime<Utc>) -> Result<DateRange> {
        Bounds {
            min_age_days: self.min_age_days,
            max_age_days: self.max_age_days,
            after: self.after.clone(),
            before: self.before.clone(),
        }
        .date_range(now)
    }
}

/// Where results go; stdout when omitted
#[derive(Args, Debug, Clone, Serialize)]
pub struct OutputArgs {
    /// File the JSON result is written to
    #[arg(short = 'o', long = "output-filepath")]
    pub output: Option<PathBuf>,
}
