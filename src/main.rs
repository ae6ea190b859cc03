use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use citation_finder::config::{
    find_config_file, load_config, save_config_file, Config, CONFIG_FILE_NAME,
};
use citation_finder::models::{FormKind, MergedRecord, DEFAULT_ROUTE};
use citation_finder::search::refine_results;
use citation_finder::sources::{SourceCapabilities, SourceRegistry};
use citation_finder::utils::{fields_table, is_terminal, print_section, records_table, terminal_width};
use citation_finder::{map_to_canonical, Aggregator, ApplicationState};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Citation Finder - find bibliographic records and turn them into citation metadata
#[derive(Parser, Debug)]
#[command(name = "citation-finder")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search books, articles and patents across public catalogs and produce citation metadata", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Per-provider timeout in seconds (overrides configuration)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

impl OutputFormat {
    fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto if is_terminal() => OutputFormat::Table,
            OutputFormat::Auto => OutputFormat::Json,
            other => other,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search every provider and show merged results
    #[command(alias = "s")]
    Search {
        /// Free text, a DOI, an ISBN or a web address
        query: String,

        /// Apply result number N (1-based) and show the resulting metadata
        #[arg(long, short)]
        select: Option<usize>,

        /// Citation form to apply the selected result to
        #[arg(long, short)]
        form: Option<FormKind>,

        /// Only copy these canonical fields (comma-separated)
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,

        /// Maximum number of results shown
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// List providers, their capabilities and whether they are enabled
    Sources,

    /// List citation form kinds and their routes
    Forms,

    /// Write a configuration file with default settings
    InitConfig {
        /// Destination (defaults to ./citation-finder.toml)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(find_config_file);
    let mut config = load_config(config_path.as_deref()).context("Failed to load configuration")?;
    if let Some(secs) = cli.timeout {
        config.search.provider_timeout_secs = secs;
    }

    init_tracing(&cli, &config);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let output = cli.output.resolve();

    match cli.command {
        Commands::Search {
            query,
            select,
            form,
            fields,
            limit,
        } => {
            let registry = SourceRegistry::from_config(&config)?;
            let limit = limit.unwrap_or(config.search.max_displayed_results);
            let aggregator = Aggregator::new(registry, config.search.clone());

            let mut state = ApplicationState::new();
            let generation = state.begin_query();

            let merged = aggregator.search(&query).await;
            let results = refine_results(&query, &merged, limit);

            match select {
                None => output_records(&results, output),
                Some(n) => {
                    let chosen = n
                        .checked_sub(1)
                        .and_then(|i| results.get(i))
                        .ok_or_else(|| anyhow!("No result #{} ({} results)", n, results.len()))?;

                    let canonical = map_to_canonical(chosen);
                    let keys: Option<Vec<&str>> = fields
                        .as_ref()
                        .map(|f| f.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect());
                    if let Some(keys) = &keys {
                        let known = canonical.to_fields();
                        for unknown in keys.iter().filter(|k| !known.contains_key(**k)) {
                            tracing::warn!("Unknown canonical field: {}", unknown);
                        }
                    }

                    state.apply_metadata_for(generation, &canonical, keys.as_deref(), form)?;
                    output_applied(&state, output)?;
                }
            }
        }

        Commands::Sources => {
            let registry = SourceRegistry::from_config(&config)?;
            output_sources(&registry, output)?;
        }

        Commands::Forms => output_forms(output)?,

        Commands::InitConfig { path, force } => {
            let path = path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            if path.exists() && !force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            save_config_file(&Config::default(), &path)?;
            println!("Wrote default configuration to {}", path.display());
        }
    }

    Ok(())
}

/// Initialize tracing: `RUST_LOG` wins, then -v/-q, then the configured level
fn init_tracing(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => config.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("citation_finder={}", level)),
    );

    let json = config
        .logging
        .format
        .as_deref()
        .is_some_and(|f| f.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn output_records(records: &[MergedRecord], format: OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(records) {
            Ok(text) => println!("{}", text),
            Err(e) => tracing::error!("Failed to serialize results: {}", e),
        },
        OutputFormat::Plain => {
            for (i, record) in records.iter().enumerate() {
                println!("{}. {} ({})", i + 1, record.title, record.source_label());
                if !record.authors.is_empty() {
                    println!("   Authors: {}", record.authors.join("; "));
                }
                if let Some(year) = &record.year {
                    println!("   Year: {}", year);
                }
                if let Some(doi) = &record.doi {
                    println!("   DOI: {}", doi);
                }
                if let Some(isbn) = &record.isbn {
                    println!("   ISBN: {}", isbn);
                }
                if let Some(url) = &record.url {
                    println!("   URL: {}", url);
                }
            }
        }
        OutputFormat::Table | OutputFormat::Auto => {
            if records.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", records_table(records, terminal_width()));
            }
        }
    }
}

fn output_applied(state: &ApplicationState, format: OutputFormat) -> Result<()> {
    let metadata = state
        .metadata()
        .ok_or_else(|| anyhow!("No metadata was applied"))?;
    let route = state.active_form().map(|f| f.route()).unwrap_or(DEFAULT_ROUTE);

    match format {
        OutputFormat::Json => {
            let out = json!({
                "form": state.active_form(),
                "route": route,
                "metadata": metadata,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Plain => {
            println!("route: {}", route);
            for (key, value) in metadata {
                if key != "raw" && !value.is_null() {
                    println!("{}: {}", key, value);
                }
            }
        }
        OutputFormat::Table | OutputFormat::Auto => {
            print_section(&format!("Applied metadata → {}", route));
            println!("{}", fields_table(metadata, terminal_width()));
        }
    }
    Ok(())
}

fn capability_names(caps: SourceCapabilities) -> Vec<&'static str> {
    [
        (SourceCapabilities::SEARCH, "search"),
        (SourceCapabilities::DOI_LOOKUP, "doi"),
        (SourceCapabilities::ISBN_LOOKUP, "isbn"),
    ]
    .into_iter()
    .filter(|(flag, _)| caps.contains(*flag))
    .map(|(_, name)| name)
    .collect()
}

fn output_sources(registry: &SourceRegistry, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let sources: Vec<_> = registry
                .all()
                .map(|s| {
                    json!({
                        "id": s.id(),
                        "name": s.name(),
                        "capabilities": capability_names(s.capabilities()),
                        "enabled": registry.is_enabled(s.id()),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&sources)?);
        }
        OutputFormat::Plain => {
            for s in registry.all() {
                println!(
                    "{}\t{}\t{}\t{}",
                    s.id(),
                    s.name(),
                    capability_names(s.capabilities()).join(","),
                    if registry.is_enabled(s.id()) { "enabled" } else { "disabled" }
                );
            }
        }
        OutputFormat::Table | OutputFormat::Auto => {
            use comfy_table::{Attribute, Cell, Table};
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["ID", "Name", "Capabilities", "Enabled"]);

            for s in registry.all() {
                table.add_row(vec![
                    Cell::new(s.id()).add_attribute(Attribute::Bold),
                    Cell::new(s.name()),
                    Cell::new(capability_names(s.capabilities()).join(", ")),
                    Cell::new(if registry.is_enabled(s.id()) { "yes" } else { "no" }),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}

fn output_forms(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let forms: Vec<_> = FormKind::ALL
                .iter()
                .map(|f| json!({ "kind": f, "route": f.route() }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&forms)?);
        }
        OutputFormat::Plain => {
            for f in FormKind::ALL {
                println!("{}\t{}", f, f.route());
            }
        }
        OutputFormat::Table | OutputFormat::Auto => {
            use comfy_table::{Cell, Table};
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["Form", "Route"]);
            for f in FormKind::ALL {
                table.add_row(vec![Cell::new(f), Cell::new(f.route())]);
            }
            println!("{table}");
        }
    }
    Ok(())
}
