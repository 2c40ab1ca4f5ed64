use super::{SelectArgs, find_sdk};
use anyhow::Context;
use std::process::Command;
use tracing::debug;

/// Run `command` with `GOROOT` and `PATH` pointing at the discovered SDK and
/// return its exit code.
pub async fn exec(args: &SelectArgs, command: &[String]) -> anyhow::Result<i32> {
    let (program, rest) = command
        .split_first()
        .context("No command given")?;

    let sdk = find_sdk(args).await?;
    let mut cmd = Command::new(program);
    cmd.args(rest);
    for (key, value) in sdk.env_vars(std::env::var_os("PATH"))? {
        cmd.env(key, value);
    }

    debug!("Running {} with GOROOT={}", program, sdk.root.display());
    let status = cmd
        .status()
        .with_context(|| format!("Failed to run {}", program))?;
    Ok(status.code().unwrap_or(1))
}
