//! `kobo-export` command-line entry point.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use kobo_export::{Client, Config, ConfigOverrides, ExportParams};

/// First arguments handed to clap. Anything else is answered with "Invalid choice".
const KNOWN_FIRST_ARGS: &[&str] = &[
    "create",
    "list",
    "latest",
    "-h",
    "--help",
    "-V",
    "--version",
];

#[derive(Parser, Debug)]
#[command(
    name = "kobo-export",
    version,
    about = "Create and query KoboToolbox data exports",
    long_about = "Create and query KoboToolbox data exports.\n\n\
                  Credentials and target are read from KOBO_USER, KOBO_PASSW, \
                  KOBO_ASSET and KOBO_URL. Without a subcommand a default csv \
                  export is created.",
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Request a new export of the asset
    Create(CreateArgs),

    /// Print all exports of the asset (first page)
    List(QueryArgs),

    /// Print the download URL of the most recent export
    Latest(QueryArgs),
}

#[derive(Args, Debug, Default)]
struct CommonArgs {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Asset uid, overrides KOBO_ASSET
    #[arg(long, value_name = "ID")]
    asset: Option<String>,

    /// API root URL, overrides KOBO_URL
    #[arg(long, value_name = "URL")]
    url: Option<String>,
}

/// Optional positionals, given left to right: a later value cannot be set
/// without the ones before it.
#[derive(Args, Debug, Default)]
struct CreateArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Export type: csv or xls [default: csv]
    #[arg(value_name = "TYPE")]
    export_type: Option<String>,

    /// Label language, "xml" for XML names [default: xml]
    lang: Option<String>,

    /// Include fields from all form versions [default: true]
    fields_from_all_versions: Option<String>,

    /// Prefix labels with their group hierarchy [default: false]
    hierarchy_in_labels: Option<String>,

    /// Separator between group names [default: /]
    group_sep: Option<String>,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    extra: Vec<String>,
}

#[derive(Args, Debug)]
struct QueryArgs {
    #[command(flatten)]
    common: CommonArgs,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    extra: Vec<String>,
}

impl CreateArgs {
    fn positional(self) -> Vec<String> {
        [
            self.export_type,
            self.lang,
            self.fields_from_all_versions,
            self.hierarchy_in_labels,
            self.group_sep,
        ]
        .into_iter()
        .map_while(|v| v)
        .collect()
    }
}

fn is_known_first_arg(first: Option<&str>) -> bool {
    first.is_none_or(|arg| KNOWN_FIRST_ARGS.contains(&arg))
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(common: CommonArgs, extra: &[String]) -> Config {
    init_tracing(common.verbose);
    if !extra.is_empty() {
        debug!(?extra, "ignoring extra arguments");
    }

    let config = Config::resolve(ConfigOverrides {
        asset_id: common.asset,
        base_url: common.url,
        ..ConfigOverrides::default()
    });
    debug!(?config, "configuration resolved");
    config
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if !is_known_first_arg(args.get(1).map(String::as_str)) {
        println!("Invalid choice");
        return Ok(());
    }

    let cli = Cli::parse_from(&args);
    let command = cli
        .command
        .unwrap_or_else(|| Command::Create(CreateArgs::default()));

    match command {
        Command::Create(mut args) => {
            let config = resolve_config(
                std::mem::take(&mut args.common),
                &std::mem::take(&mut args.extra),
            );
            let params = match ExportParams::from_positional(&args.positional()) {
                Ok(p) => p,
                Err(e) => {
                    debug!(export_type = %e.0, "unsupported export type");
                    println!("{}", e);
                    return Ok(());
                }
            };
            let client = Client::new(config)?;
            let created = client.create_export(&params)?;
            println!("{}", created.status);
            println!("{}", created.body);
        }
        Command::List(args) => {
            let client = Client::new(resolve_config(args.common, &args.extra))?;
            let listing = client.list_exports()?;
            println!(
                "{}",
                serde_json::to_string_pretty(&listing).context("failed to format export list")?
            );
        }
        Command::Latest(args) => {
            let client = Client::new(resolve_config(args.common, &args.extra))?;
            println!("{}", client.latest_export_url()?);
        }
    }

    Ok(())
}
