// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod catalog;
mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use coatsel_app::{Catalog, FormState};
use config::Config;
use runtime::CliRuntime;
use std::env;
use std::path::PathBuf;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let catalog = startup(&options)?;

    if options.print_catalog {
        print!("{}", catalog::render_catalog(&catalog)?);
        return Ok(());
    }
    if options.check_only {
        info!("check passed");
        return Ok(());
    }

    let mut state = FormState::default();
    let mut runtime = CliRuntime::new();
    coatsel_tui::run_app(&mut state, &catalog, &mut runtime)?;

    if let Some(order) = runtime.into_order() {
        println!("{}", runtime::order_json(&order)?);
    }
    Ok(())
}

/// Loads config and catalog. Logging comes up in between; if the log file
/// cannot be opened the run continues without it.
fn startup(options: &CliOptions) -> Result<Catalog> {
    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `coatsel --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    if let Err(error) = logging::start(&config) {
        eprintln!("warning: logging disabled: {error:#}");
    }

    match config.catalog_path(options.catalog_path.as_deref()) {
        Some(path) => catalog::load_catalog(&path).with_context(|| {
            format!(
                "catalog {} is unusable -- fix it or drop --catalog/[catalog].path to use the built-in catalog",
                path.display()
            )
        }),
        None => Ok(Catalog::builtin()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    catalog_path: Option<PathBuf>,
    print_config_path: bool,
    print_example: bool,
    print_catalog: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        catalog_path: None,
        print_config_path: false,
        print_example: false,
        print_catalog: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--catalog" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--catalog requires a file path"))?;
                options.catalog_path = Some(PathBuf::from(value.as_ref()));
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--print-catalog" => {
                options.print_catalog = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("coatsel: choose a coating system and a vendor for every coating");
    println!("  --config <path>          Use a specific config path");
    println!("  --catalog <path>         Load companies and vendors from a TOML catalog");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --print-catalog          Print the active catalog as TOML");
    println!("  --check                  Validate config + catalog and exit");
    println!("  --help                   Show this help");
}
