mod args;
mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use s3_finder::{
    adapters::outbound::session::DEFAULT_LOGIN_TIMEOUT,
    domain::value_objects::DEFAULT_OBJECT_URL_TEMPLATE, UrlTemplate,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use args::{AccountArgs, BucketFilterArgs, ObjectFilterArgs, OutputArgs};

#[derive(Parser, Debug)]
#[command(name = "s3-finder")]
#[command(about = "Find, list and transfer S3 buckets and objects", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List buckets whose name matches, across regions
    ListBuckets {
        #[command(flatten)]
        account: AccountArgs,
        #[command(flatten)]
        filter: BucketFilterArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// List objects in every matching bucket, most recent first
    #[command(after_help = UrlTemplate::help())]
    ListObjects {
        #[command(flatten)]
        account: AccountArgs,
        #[command(flatten)]
        bucket_filter: BucketFilterArgs,
        #[command(flatten)]
        object_filter: ObjectFilterArgs,
        /// Emit urls rendered with this template instead of objects,
        /// e.g. 's3://{bucket_name}/{object_full_path}'
        #[arg(long = "url-template")]
        url_template: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// List matching objects in one named bucket, most recent first
    ListBucketObjects {
        #[command(flatten)]
        account: AccountArgs,
        /// Exact bucket name
        #[arg(short = 'b', long = "bucket-name")]
        bucket: String,
        #[command(flatten)]
        object_filter: ObjectFilterArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Render the objects in a result file as urls
    #[command(after_help = UrlTemplate::help())]
    ObjectsToUrls {
        /// Result file holding objects
        #[arg(short = 'i', long = "input-filepath")]
        input: PathBuf,
        /// Template for each object url
        #[arg(short = 'u', long = "url-template", default_value = DEFAULT_OBJECT_URL_TEMPLATE)]
        url_template: String,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Download the most recent objects listed in a result file next to it
    DownloadObjects {
        #[command(flatten)]
        account: AccountArgs,
        /// Result file holding objects
        #[arg(short = 'i', long = "input-filepath")]
        input: PathBuf,
        /// How many of the most recent objects to download
        #[arg(short = 't', long = "top-count", default_value_t = 1)]
        top_count: usize,
    },

    /// Download every object under a key prefix
    BucketDownload {
        #[command(flatten)]
        account: AccountArgs,
        #[arg(short = 'b', long = "bucket")]
        bucket: String,
        #[arg(short = 'k', long = "key-prefix")]
        key_prefix: Option<String>,
        #[arg(short = 'd', long = "output-directory")]
        output_dir: PathBuf,
    },

    /// Upload every regular file in a directory, keyed by file name
    BucketUpload {
        #[command(flatten)]
        account: AccountArgs,
        #[arg(short = 'b', long = "bucket")]
        bucket: String,
        #[arg(short = 'd', long = "input-directory")]
        input_dir: PathBuf,
    },

    /// Run `aws sso login` for a profile
    SsoLogin {
        #[arg(short = 'p', long = "aws-profile-name", env = "AWS_PROFILE")]
        profile: String,
        #[arg(short = 'r', long = "region")]
        region: Option<String>,
        #[arg(long, default_value_t = DEFAULT_LOGIN_TIMEOUT.as_secs())]
        timeout_secs: u64,
    },
}

impl Cli {
    fn init_logging(&self) {
        let level = match self.log_level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "warn" | "warning" => "warn",
            "error" => "error",
            _ => "info",
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging();

    match &cli.command {
        Commands::ListBuckets {
            account,
            filter,
            output,
        } => commands::list_buckets(account, filter, output).await,
        Commands::ListObjects {
            account,
            bucket_filter,
            object_filter,
            url_template,
            output,
        } => {
            commands::list_objects(
                account,
                bucket_filter,
                object_filter,
                url_template.as_deref(),
                output,
            )
            .await
        }
        Commands::ListBucketObjects {
            account,
            bucket,
            object_filter,
            output,
        } => commands::list_bucket_objects(account, bucket, object_filter, output).await,
        Commands::ObjectsToUrls {
            input,
            url_template,
            output,
        } => commands::objects_to_urls(input, url_template, output).await,
        Commands::DownloadObjects {
            account,
            input,
            top_count,
        } => commands::download_objects(account, input, *top_count).await,
        Commands::BucketDownload {
            account,
            bucket,
            key_prefix,
            output_dir,
        } => commands::bucket_download(account, bucket, key_prefix.as_deref(), output_dir).await,
        Commands::BucketUpload {
            account,
            bucket,
            input_dir,
        } => commands::bucket_upload(account, bucket, input_dir).await,
        Commands::SsoLogin {
            profile,
            region,
            timeout_secs,
        } => commands::sso_login(profile, region.as_deref(), *timeout_secs).await,
    }
}
