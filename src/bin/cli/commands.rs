use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use s3_finder::{
    adapters::outbound::persistence::{
        downloads_path_for, load_objects, read_json, to_pretty_json, write_json,
    },
    domain::models::objects_from_value,
    services::{most_recent_first, sorted, split_regions},
    BucketCollector, DateRange, DiscoveryResult, FanoutReport, NameMatcher, ObjectCollector,
    PaginatedFilteredLister, Placeholder, ResultFile, SsoLogin, TransferService, UrlFormatter,
    UrlTemplate,
};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::args::{AccountArgs, BucketFilterArgs, ObjectFilterArgs, OutputArgs};

/// Write a result envelope to the output file, or stdout when there is none
async fn emit<R: Serialize>(output: &OutputArgs, file: &ResultFile<R>) -> Result<()> {
    match &output.output {
        Some(path) => write_json(path, file).await?,
        None => {
            let bytes = to_pretty_json(file)?;
            std::io::stdout()
                .write_all(&bytes)
                .context("Failed to write result to stdout")?;
        }
    }
    Ok(())
}

fn report_failures<T>(report: &FanoutReport<T>) {
    for failure in &report.failed_regions {
        warn!(region = %failure.region, error = %failure.error, "Region skipped");
    }
}

pub async fn list_buckets(
    account: &AccountArgs,
    filter: &BucketFilterArgs,
    output: &OutputArgs,
) -> Result<()> {
    let app = account.build_app()?;
    let collector = BucketCollector {
        name_filter: filter.matcher()?,
        date_range: filter.date_range(Utc::now())?,
    };
    info!(filter = %collector.name_filter, range = %collector.date_range, "Listing buckets");

    let report = app.collect(&collector).await?;
    report_failures(&report);
    let buckets = sorted(report.items);
    info!(count = buckets.len(), "Buckets found");

    let args = json!({ "account": account, "bucket_filter": filter });
    emit(output, &ResultFile::now(args, DiscoveryResult::buckets(buckets))).await
}

fn object_url_template(template: &str) -> Result<UrlTemplate> {
    Ok(UrlTemplate::parse(
        template,
        &[Placeholder::BucketName, Placeholder::ObjectFullPath],
    )?)
}

pub async fn list_objects(
    account: &AccountArgs,
    bucket_filter: &BucketFilterArgs,
    object_filter: &ObjectFilterArgs,
    url_template: Option<&str>,
    output: &OutputArgs,
) -> Result<()> {
    let template = url_template.map(object_url_template).transpose()?;
    let app = account.build_app()?;
    let now = Utc::now();
    let collector = ObjectCollector {
        bucket_filter: bucket_filter.matcher()?,
        bucket_range: bucket_filter.date_range(now)?,
        object_filter: object_filter.matcher()?,
        object_range: object_filter.date_range(now)?,
    };
    info!(
        buckets = %collector.bucket_filter,
        objects = %collector.object_filter,
        range = %collector.object_range,
        "Listing objects"
    );

    let report = app.collect(&collector).await?;
    report_failures(&report);
    let objects = most_recent_first(report.items);
    info!(count = objects.len(), "Objects found");

    let args = json!({
        "account": account,
        "bucket_filter": bucket_filter,
        "object_filter": object_filter,
        "url_template": url_template,
    });
    let result = match template {
        Some(template) => {
            let formatter = UrlFormatter::default().with_object_template(template);
            DiscoveryResult::urls(formatter.url_records(&objects))
        }
        None => DiscoveryResult::objects(objects),
    };
    emit(output, &ResultFile::now(args, result)).await
}

pub async fn list_bucket_objects(
    account: &AccountArgs,
    bucket: &str,
    object_filter: &ObjectFilterArgs,
    output: &OutputArgs,
) -> Result<()> {
    let app = account.build_app()?;
    let collector = ObjectCollector {
        bucket_filter: NameMatcher::exact(bucket)?,
        bucket_range: DateRange::unbounded(),
        object_filter: object_filter.matcher()?,
        object_range: object_filter.date_range(Utc::now())?,
    };

    let report = app.collect(&collector).await?;
    report_failures(&report);
    let objects = most_recent_first(report.items);
    info!(bucket, count = objects.len(), "Objects found");

    let args = json!({ "account": account, "bucket": bucket, "object_filter": object_filter });
    emit(output, &ResultFile::now(args, DiscoveryResult::objects(objects))).await
}

pub async fn objects_to_urls(input: &Path, url_template: &str, output: &OutputArgs) -> Result<()> {
    let template = object_url_template(url_template)?;
    let objects = load_objects(input)
        .await
        .with_context(|| format!("Failed to load objects from {}", input.display()))?;

    let formatter = UrlFormatter::default().with_object_template(template);
    let urls = formatter.url_records(&most_recent_first(objects));
    info!(count = urls.len(), "Rendered urls");

    let args = json!({ "input_filepath": input, "url_template": url_template });
    emit(output, &ResultFile::now(args, DiscoveryResult::urls(urls))).await
}

pub async fn download_objects(account: &AccountArgs, input: &Path, top_count: usize) -> Result<()> {
    let document = read_json(input).await?;
    let datetime = document
        .get("datetime")
        .and_then(|d| d.as_str())
        .map(str::to_string);
    let objects = objects_from_value(&document)
        .with_context(|| format!("Failed to load objects from {}", input.display()))?;

    let app = account.build_app()?;
    let region = split_regions(&account.regions).into_iter().next();
    let session = app.session(region.as_deref()).await?;

    let output_dir = input
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let result = TransferService::new(&session)
        .download_top(objects, top_count, &output_dir)
        .await;

    if result.s3_downloads.is_empty() {
        warn!(input = %input.display(), "Nothing downloaded");
        return Ok(());
    }

    let metadata_path = downloads_path_for(input);
    let file = ResultFile {
        datetime,
        args: json!({ "top_count": top_count, "input_filepath": input }),
        result,
    };
    write_json(&metadata_path, &file).await?;
    info!(path = %metadata_path.display(), "Download metadata written");
    Ok(())
}

pub async fn bucket_download(
    account: &AccountArgs,
    bucket: &str,
    key_prefix: Option<&str>,
    output_dir: &Path,
) -> Result<()> {
    let app = account.build_app()?;
    let region = split_regions(&account.regions).into_iter().next();
    let session = app.session(region.as_deref()).await?;

    let lister = PaginatedFilteredLister::new(&session);
    let bucket = Arc::new(lister.get_bucket(bucket, &DateRange::unbounded()).await?);
    let summary = TransferService::new(&session)
        .download_prefix(&lister, &bucket, key_prefix, output_dir)
        .await?;

    if summary.failed() > 0 {
        warn!(failed = summary.failed(), total = summary.attempted, "Some downloads failed");
    }
    Ok(())
}

pub async fn bucket_upload(account: &AccountArgs, bucket: &str, input_dir: &Path) -> Result<()> {
    let app = account.build_app()?;
    let region = split_regions(&account.regions).into_iter().next();
    let session = app.session(region.as_deref()).await?;

    let bucket = PaginatedFilteredLister::new(&session)
        .get_bucket(bucket, &DateRange::unbounded())
        .await?;
    let summary = TransferService::new(&session)
        .upload_directory(&bucket, input_dir)
        .await?;

    if summary.failed() > 0 {
        warn!(failed = summary.failed(), total = summary.attempted, "Some uploads failed");
    }
    Ok(())
}

pub async fn sso_login(profile: &str, region: Option<&str>, timeout_secs: u64) -> Result<()> {
    if timeout_secs == 0 {
        bail!("--timeout-secs must be greater than zero");
    }
    SsoLogin::new(Duration::from_secs(timeout_secs))
        .login(profile, region)
        .await?;
    Ok(())
}
