use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info};
use tracing_log::LogTracer;
use tracing_subscriber::EnvFilter;

use schemaspy::config::schema::{load_config, Catalog, Misc, SchemaspyConfig};
use schemaspy::repository::postgres::PostgresRepository;
use schemaspy::schema::Schema;

#[derive(Parser, Debug, Clone)]
#[clap(name = "schemaspy", version, about)]
struct Args {
    /// Path to a TOML config file. Ignored when --dsn is given.
    #[clap(short, long, default_value = "schemaspy.toml")]
    config_path: PathBuf,

    /// Connection string; overrides the config file.
    #[clap(long, env = "DATABASE_URL")]
    dsn: Option<String>,

    /// Namespace to describe; overrides the config file.
    #[clap(short, long)]
    schema: Option<String>,

    /// Print only the table, view and index names.
    #[clap(long)]
    summary: bool,

    /// Emit logs as JSON.
    #[clap(long)]
    json_logs: bool,
}

fn setup_logging(level: &str, json: bool) {
    // Route sqlx's `log` records through tracing
    if let Err(e) = LogTracer::init() {
        eprintln!("Error installing the log bridge: {e}");
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("schemaspy={level},sqlx=warn")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let result = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    if let Err(e) = result {
        eprintln!("Error setting up logging: {e}");
    }
}

fn resolve_config(args: &Args) -> Result<SchemaspyConfig, String> {
    let mut config = match &args.dsn {
        Some(dsn) => SchemaspyConfig {
            catalog: Catalog {
                dsn: dsn.clone(),
                schema: schemaspy::catalog::DEFAULT_SCHEMA.to_string(),
                max_connections: 1,
            },
            misc: Misc::default(),
        },
        None => load_config(&args.config_path).map_err(|e| {
            format!(
                "Error loading the config from {}: {e}",
                args.config_path.display()
            )
        })?,
    };
    if let Some(schema) = &args.schema {
        config.catalog.schema = schema.clone();
    }
    Ok(config)
}

fn print_summary(schema: &Schema) {
    println!("schema: {}", schema.name);
    for name in &schema.tables {
        let table = &schema.relations[name];
        println!("table: {name} ({} cols)", table.columns.len());
        for index in &table.indexes {
            println!("  index: {index}");
        }
    }
    for name in &schema.views {
        println!("view: {name}");
    }
    for name in &schema.materialized {
        println!("materialized view: {name}");
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    setup_logging(&config.misc.log_level, args.json_logs);

    let repository =
        match PostgresRepository::connect(&config.catalog.dsn, config.catalog.max_connections)
            .await
        {
            Ok(repository) => repository,
            Err(e) => {
                error!("{e}");
                process::exit(1);
            }
        };

    info!("Describing schema {:?}", config.catalog.schema);
    let result = repository.describe(&config.catalog.schema).await;
    repository.executor.close().await;

    let schema = match result {
        Ok(schema) => schema,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    if args.summary {
        print_summary(&schema);
    } else {
        match serde_json::to_string_pretty(&schema) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("Error serializing the schema: {e}");
                process::exit(1);
            }
        }
    }
}
