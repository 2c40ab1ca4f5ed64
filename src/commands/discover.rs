use super::{SelectArgs, find_sdk};
use colored::Colorize;
use gosdk::version;

pub async fn discover(args: &SelectArgs, json: bool) -> anyhow::Result<()> {
    let sdk = find_sdk(args).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sdk)?);
        return Ok(());
    }

    println!(
        "{} go{} {}",
        "✓".green(),
        version::canonical(&sdk.version).bold(),
        format!("({}/{})", sdk.os, sdk.arch).dimmed()
    );
    println!("  root:   {}", sdk.root.display());
    println!("  binary: {}", sdk.binary.display());
    Ok(())
}
