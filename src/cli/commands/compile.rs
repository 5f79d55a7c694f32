//! Compile command - turn an environment file into a build definition

use crate::cli::args::CompileArgs;
use crate::compile::compile;
use crate::config::Config;
use crate::environment::Environment;
use crate::error::{EnvError, EnvResult};
use crate::layer::BuildSettings;
use crate::shell::ZshManager;
use crate::vscode::VscodeClient;
use console::style;
use tracing::info;

/// Execute the compile command
pub async fn execute(args: CompileArgs, config: &Config) -> EnvResult<()> {
    let env = Environment::from_file(&args.file).await?;

    let mut settings = BuildSettings::from_config(config)?;
    if let Some(platform) = args.platform.as_deref() {
        settings.platform = platform.parse()?;
    }

    let plugins = VscodeClient::from_config(config);
    let shell = ZshManager::from_config(config);

    let definition = compile(&env, &settings, &plugins, &shell).await?;
    let json = definition.to_json()?;

    match args.output {
        Some(path) => {
            tokio::fs::write(&path, json).await.map_err(|e| {
                EnvError::io(format!("writing definition to {}", path.display()), e)
            })?;
            info!(path = %path.display(), ops = definition.ops.len(), "Definition written");
            eprintln!(
                "{} {} ops, root {} ({})",
                style("[OK]").green(),
                definition.ops.len(),
                short_digest(&definition.root),
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn short_digest(digest: &str) -> &str {
    let hex = digest.strip_prefix("sha256:").unwrap_or(digest);
    &hex[..hex.len().min(12)]
}
