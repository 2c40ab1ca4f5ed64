use gosdk::http::Pipeline;
use gosdk::{DownloadDiscovery, Settings};
use std::sync::Arc;

pub fn url(version: Option<&str>, os: Option<&str>, arch: Option<&str>) -> anyhow::Result<()> {
    let mut settings = Settings::from_env()?;
    if let Some(version) = version {
        settings.version = version.to_string();
    }
    if let Some(os) = os {
        settings.os = os.to_string();
    }
    if let Some(arch) = arch {
        settings.arch = arch.to_string();
    }

    let download = DownloadDiscovery::from_settings(&settings, Arc::new(Pipeline::bare()))?;
    println!("{}", download.download_url());
    Ok(())
}
