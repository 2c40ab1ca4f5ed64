use super::{SelectArgs, find_sdk};
use std::path::PathBuf;

pub async fn shellenv(args: &SelectArgs, shell: Option<&str>) -> anyhow::Result<()> {
    let shell_type = match shell {
        Some(s) => s.to_string(),
        None => std::env::var("SHELL")
            .ok()
            .and_then(|s| {
                PathBuf::from(s)
                    .file_name()
                    .and_then(|f| f.to_str())
                    .map(|s| s.to_string())
            })
            .unwrap_or_else(|| "bash".to_string()),
    };

    let sdk = find_sdk(args).await?;
    let root = sdk.root.display();
    let bin = sdk.bin_dir().display();

    match shell_type.as_str() {
        "bash" | "sh" => {
            println!("export GOROOT=\"{}\";", root);
            println!("export PATH=\"{}:$PATH\";", bin);
        }
        "zsh" => {
            println!("export GOROOT=\"{}\";", root);
            println!("export PATH=\"{}${{PATH+:$PATH}}\";", bin);
        }
        "fish" => {
            println!("set -gx GOROOT \"{}\";", root);
            println!("fish_add_path -gP \"{}\";", bin);
        }
        other => {
            anyhow::bail!("Unsupported shell: {} (supported: bash, zsh, fish)", other);
        }
    }

    Ok(())
}
