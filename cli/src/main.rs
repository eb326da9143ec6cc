mod atomic_write;
mod config;
mod logging;
mod path_utils;
mod run;
mod version;

use std::path::PathBuf;

use anyhow::Context;
use clap::CommandFactory;
use clap::FromArgMatches;
use clap::Parser;
use clap::ValueEnum;
use clap::error::ErrorKind;
use thiserror::Error;
use zog_graph::GraphmlOptions;
use zog_zotero::LibraryType;
use zog_zotero::ZoteroConfig;

use crate::config::ConfigStore;
use crate::config::FileConfig;
use crate::run::RunConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "kebab-case")]
enum CliLibraryType {
    User,
    Group,
}

impl CliLibraryType {
    fn as_library_type(self) -> LibraryType {
        match self {
            CliLibraryType::User => LibraryType::User,
            CliLibraryType::Group => LibraryType::Group,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "zog",
    version,
    about = "ZOtero knowledge Graph: export the related-item links of a Zotero collection as GraphML"
)]
struct Cli {
    /// The Zotero library ID.
    #[arg(long, env = "ZOTERO_LIBRARY_ID")]
    library_id: Option<String>,

    /// The type of Zotero library [default: user].
    #[arg(long, value_enum)]
    library_type: Option<CliLibraryType>,

    /// Zotero API key (required if not using --local).
    #[arg(long, env = "ZOTERO_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Read from the Zotero desktop app's local API instead of api.zotero.org.
    #[arg(long, overrides_with = "no_local")]
    local: bool,

    /// Use the Web API even if the config file sets `local = true`.
    #[arg(long, overrides_with = "local")]
    no_local: bool,

    /// Path to the Zotero collection, e.g. 'Projects/PRIME VFV/Datasets'.
    #[arg(long)]
    collection_path: String,

    /// Path to write the output GraphML file, e.g. './output/graph.graphml'.
    #[arg(long)]
    output_path: PathBuf,

    /// Omit the self-loop edges that keep unrelated items in the graph.
    #[arg(long)]
    drop_self_loops: bool,

    /// Override the Zotero API endpoint.
    #[arg(long, env = "ZOG_API_BASE_URL", hide = true)]
    api_base_url: Option<String>,

    /// Config file with default values [default: ~/.zog/config.toml].
    #[arg(long, env = "ZOG_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Debug, Error, PartialEq, Eq)]
enum UsageError {
    #[error("The --api-key argument is required unless --local is specified.")]
    MissingApiKey,

    #[error("The --library-id argument is required (or set `library_id` in {config_path}).")]
    MissingLibraryId { config_path: String },
}

fn parse_cli() -> Cli {
    let matches = Cli::command().version(version::ZOG_VERSION).get_matches();
    Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
}

/// Flags and env vars first, then the config file, then built-in defaults.
fn resolve_run_config(
    cli: Cli,
    file: FileConfig,
    config_path: &std::path::Path,
) -> Result<RunConfig, UsageError> {
    let local = if cli.no_local {
        false
    } else {
        cli.local || file.local.unwrap_or(false)
    };
    let api_key = cli.api_key.or(file.api_key).unwrap_or_default();
    if !local && api_key.trim().is_empty() {
        return Err(UsageError::MissingApiKey);
    }

    let library_id = cli
        .library_id
        .or(file.library_id)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| UsageError::MissingLibraryId {
            config_path: path_utils::display_with_tilde(config_path),
        })?;

    let library_type = cli
        .library_type
        .map(CliLibraryType::as_library_type)
        .or(file.library_type)
        .unwrap_or_default();

    Ok(RunConfig {
        zotero: ZoteroConfig {
            library_id,
            library_type,
            api_key,
            local,
            base_url: cli.api_base_url.or(file.api_base_url),
            user_agent: version::user_agent(),
        },
        collection_path: cli.collection_path,
        output_path: cli.output_path,
        graphml: GraphmlOptions {
            drop_self_loops: cli.drop_self_loops,
        },
    })
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = parse_cli();
    logging::init();

    let store = match cli.config.as_deref() {
        Some(path) => ConfigStore::new(path_utils::expand_tilde(path)),
        None => ConfigStore::new_default()?,
    };
    let file = store.load().context("load config")?;

    let mut config = match resolve_run_config(cli, file, store.path()) {
        Ok(config) => config,
        Err(err) => Cli::command()
            .error(ErrorKind::MissingRequiredArgument, err)
            .exit(),
    };
    config.output_path = path_utils::resolve_output_path(&config.output_path).with_context(
        || format!("resolve output path {}", config.output_path.display()),
    )?;

    run::run(&config).await?;
    Ok(())
}
