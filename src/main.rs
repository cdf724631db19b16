mod cli;
mod commands;
mod mcp;
mod page_range;
mod pdf;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use page_range::PlanError;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "PDFSUITE_LOG";

/// Logs go to stderr; stdout belongs to command output and the MCP transport.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "pdfsuite=warn",
        1 => "pdfsuite=debug",
        _ => "pdfsuite=trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::Info { path, json } => {
            let info = commands::info::run(&path)?;
            if json {
                print_json(&info)?;
            } else {
                print!("{}", commands::info::render(&path, &info));
            }
        }
        Commands::Validate {
            pages,
            file,
            page_count,
            mode,
            json,
        } => {
            let report = commands::validate::run(&pages, file.as_deref(), page_count, mode)?;
            if json {
                print_json(&report)?;
            } else {
                println!("{}", report);
            }
            if !report.is_valid() {
                anyhow::bail!("Page selection {:?} is not valid", pages);
            }
        }
        Commands::Extract {
            path,
            pages,
            output,
        } => {
            println!(
                "{}",
                commands::extract::run(&path, &pages, output.as_deref())?
            );
        }
        Commands::Remove {
            path,
            pages,
            output,
        } => {
            println!("{}", commands::remove::run(&path, &pages, output.as_deref())?);
        }
        Commands::Split {
            path,
            ranges,
            output_dir,
        } => {
            println!(
                "{}",
                commands::split::run(&path, ranges.as_deref(), output_dir.as_deref())?
            );
        }
        Commands::Rotate {
            path,
            angle,
            pages,
            output,
        } => {
            println!(
                "{}",
                commands::rotate::run(&path, angle, pages.as_deref(), output.as_deref())?
            );
        }
        Commands::Watermark {
            path,
            text,
            pages,
            font_size,
            gray,
            opacity,
            output,
        } => {
            let style = pdf::WatermarkStyle {
                font_size,
                gray,
                opacity,
            };
            println!(
                "{}",
                commands::watermark::run(
                    &path,
                    &text,
                    pages.as_deref(),
                    &style,
                    output.as_deref()
                )?
            );
        }
        Commands::Merge { inputs, output } => {
            println!("{}", commands::merge::run(&inputs, Some(output.as_path()))?);
        }
        Commands::Images { inputs, output } => {
            println!("{}", commands::images::run(&inputs, Some(output.as_path()))?);
        }
        Commands::Compress { path, output } => {
            println!("{}", commands::compress::run(&path, output.as_deref())?);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli.command).await;
    if let Err(err) = &result {
        if let Some(plan_err) = err.downcast_ref::<PlanError>() {
            for token_err in plan_err.errors() {
                eprintln!("  {}", token_err);
            }
        }
    }
    result
}
