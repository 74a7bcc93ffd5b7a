use std::time::Duration;

use anyhow::Context;
use dashboard_engine::{ReqwestUploader, UploadSettings, Uploader};
use dashboard_logging::{dash_error, dash_info};
use url::Url;

use crate::cli::UploadArgs;
use crate::config::DashboardConfig;

/// One-shot upload of a UPI file; the outcome is printed once.
pub fn run_upload(config: &DashboardConfig, args: UploadArgs) -> anyhow::Result<()> {
    let endpoint = args.endpoint.as_deref().unwrap_or(&config.upload_url);
    let endpoint =
        Url::parse(endpoint).with_context(|| format!("invalid upload endpoint {endpoint}"))?;

    let mut settings = UploadSettings::new(endpoint);
    settings.request_timeout = Duration::from_secs(config.upload_timeout_secs);
    let uploader = ReqwestUploader::new(settings).context("build upload client")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("start upload runtime")?;

    match runtime.block_on(uploader.upload(&args.file)) {
        Ok(receipt) => {
            dash_info!("Upload of {:?} accepted ({})", args.file, receipt.status);
            println!("File uploaded successfully");
            if let Some(body) = receipt.body {
                println!("{body}");
            }
            Ok(())
        }
        Err(err) => {
            dash_error!("Upload of {:?} failed: {}", args.file, err);
            Err(err).with_context(|| format!("upload of {} failed", args.file.display()))
        }
    }
}
