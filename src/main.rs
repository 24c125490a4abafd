mod cli;
mod commands;
mod mcp;
mod page_range;
mod pdf;
mod plan;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::Info { path } => {
            println!("{}", commands::info::run(&path)?);
        }
        Commands::Extract {
            path,
            pages,
            output,
        } => {
            println!("{}", commands::extract::run(&path, &pages, &output)?);
        }
        Commands::Delete {
            path,
            pages,
            output,
        } => {
            println!("{}", commands::delete::run(&path, &pages, &output)?);
        }
        Commands::Duplicate {
            path,
            pages,
            output,
        } => {
            println!("{}", commands::duplicate::run(&path, &pages, &output)?);
        }
        Commands::InsertBlank {
            path,
            positions,
            output,
        } => {
            println!("{}", commands::insert_blank::run(&path, &positions, &output)?);
        }
        Commands::Reorder {
            path,
            order,
            output,
        } => {
            println!("{}", commands::reorder::run(&path, &order, &output)?);
        }
        Commands::Split {
            path,
            ranges,
            output_dir,
            base,
            pad,
        } => {
            let options = commands::split::SplitOptions { ranges, base, pad };
            println!("{}", commands::split::run(&path, &output_dir, &options)?);
        }
        Commands::Rotate {
            path,
            pages,
            angle,
            ccw,
            output,
        } => {
            let report = commands::rotate::run(&path, pages.as_deref(), angle, ccw, &output)?;
            println!("{}", report);
        }
        Commands::Merge { inputs, output } => {
            println!("{}", commands::merge::run(&inputs, &output)?);
        }
        Commands::Number {
            path,
            output,
            start,
            size,
            margin,
            position,
            pages,
        } => {
            let options = commands::number::NumberOptions {
                start,
                size,
                margin,
                placement: position,
                pages,
            };
            println!("{}", commands::number::run(&path, &output, &options)?);
        }
        Commands::Stamp {
            path,
            text,
            output,
            size,
            margin,
            position,
            pages,
        } => {
            let options = commands::stamp::StampOptions {
                size,
                margin,
                placement: position,
                pages,
            };
            println!("{}", commands::stamp::run(&path, &text, &output, &options)?);
        }
        Commands::Watermark {
            path,
            text,
            output,
            size,
            angle,
            layout,
            color,
            pages,
        } => {
            let options = commands::watermark::WatermarkOptions {
                size,
                angle,
                layout,
                color,
                pages,
            };
            println!("{}", commands::watermark::run(&path, &text, &output, &options)?);
        }
        Commands::Write {
            input,
            output,
            title,
            size,
            margin,
        } => {
            let style = pdf::note::NoteStyle::new(size, margin);
            println!(
                "{}",
                commands::write::run(&input, title.as_deref(), &output, style)?
            );
        }
        Commands::Metadata {
            path,
            output,
            title,
            author,
            subject,
            keywords,
        } => {
            let update = pdf::InfoUpdate {
                title,
                author,
                subject,
                keywords: keywords.as_deref().map(pdf::InfoUpdate::parse_keywords),
            };
            println!("{}", commands::metadata::run(&path, &update, &output)?);
        }
    }

    Ok(())
}

/// Log to stderr; stdout carries command output and the MCP transport.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pagesmith={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
