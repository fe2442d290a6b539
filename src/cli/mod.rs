use std::net::SocketAddr;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing::info;

use crate::models::{Category, FILTER_RESULT_VERSION};
use crate::search::engine;
use crate::server;

mod args;
mod config;
mod format;
mod http_backend;

pub use args::{
    CategoriesArgs, CategoryArg, Cli, Commands, FilterArgs, FilterViewArg, OutputFormat,
    ParseArgs, ServeArgs,
};

use config::{
    apply_filter_config_defaults, apply_parse_config_defaults, apply_serve_config_defaults,
    load_cli_config,
};
use http_backend::HttpFilterBackend;

/// Entry point for the CLI binary.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.schema_version {
        println!(
            "Filter result JSON schema version: {}",
            FILTER_RESULT_VERSION
        );
        return Ok(());
    }

    let cli_config = load_cli_config()?;

    match cli.command {
        Some(Commands::Parse(mut parse_args)) => {
            if let Some(ref config) = cli_config {
                apply_parse_config_defaults(config, &mut parse_args);
            }

            let query = args::parse_query_from_args(&parse_args)?;
            let result = if let Some(server_url) =
                effective_server_url(parse_args.server.as_deref(), parse_args.no_server)
            {
                let backend = HttpFilterBackend::new(server_url)?;
                backend.parse(query)?
            } else {
                engine::run_parse(&query)
            };

            match parse_args.format {
                OutputFormat::Text => format::print_parse_text(&result),
                OutputFormat::Table => format::print_parse_table(&result),
                OutputFormat::Json => {
                    serde_json::to_writer(std::io::stdout(), &result)?;
                    println!();
                    Ok(())
                }
            }
        }
        Some(Commands::Filter(mut filter_args)) => {
            if let Some(ref config) = cli_config {
                apply_filter_config_defaults(config, &mut filter_args);
            }

            let config = args::filter_config_from_args(&filter_args)?;
            let result = if let Some(server_url) =
                effective_server_url(filter_args.server.as_deref(), filter_args.no_server)
            {
                let backend = HttpFilterBackend::new(server_url)?;
                backend.filter(config)?
            } else {
                engine::run_filter(config)?
            };

            match filter_args.format {
                OutputFormat::Text => format::print_filter_text(&result, filter_args.highlight),
                OutputFormat::Table => format::print_filter_table(&result),
                OutputFormat::Json => {
                    serde_json::to_writer(std::io::stdout(), &result)?;
                    println!();
                    Ok(())
                }
            }
        }
        Some(Commands::Categories(categories_args)) => match categories_args.format {
            OutputFormat::Text => format::print_categories_text(),
            OutputFormat::Table => format::print_categories_table(),
            OutputFormat::Json => {
                let categories: Vec<_> = Category::ALL
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "category": c,
                            "label": c.label(),
                            "thread_query": c.thread_query(),
                            "example_query": c.example_query(),
                        })
                    })
                    .collect();
                serde_json::to_writer(std::io::stdout(), &categories)?;
                println!();
                Ok(())
            }
        },
        Some(Commands::Serve(mut serve_args)) => {
            if let Some(ref config) = cli_config {
                apply_serve_config_defaults(config, &mut serve_args);
            }

            let addr: SocketAddr = serve_args.addr.parse()?;
            println!("Starting hnjobs HTTP server on http://{addr}");
            info!(%addr, "starting HTTP server");

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;

            runtime.block_on(server::run(addr))?;
            Ok(())
        }
        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}

fn effective_server_url(server_flag: Option<&str>, no_server: bool) -> Option<String> {
    if no_server {
        None
    } else {
        server_flag.map(|s| s.to_string())
    }
}
