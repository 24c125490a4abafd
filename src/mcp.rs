use anyhow::{anyhow, Result};
use clap::ValueEnum;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::commands;
use crate::pdf::InfoUpdate;

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PagesRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Page ranges (e.g., '1-3,5,9-10')")]
    pub pages: String,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SplitRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Directory to write the parts to")]
    pub output_dir: String,
    #[schemars(
        description = "Ranges, one output file each (e.g., '1-3,4,5-9'). Omit to write every page to its own file."
    )]
    #[serde(default)]
    pub ranges: Option<String>,
    #[schemars(description = "File name prefix (default: input file name)")]
    #[serde(default)]
    pub base: Option<String>,
    #[schemars(description = "Digits in the part number, 1-4 (default: 2)")]
    #[serde(default = "default_pad")]
    pub pad: usize,
}

fn default_pad() -> usize {
    commands::split::DEFAULT_PAD
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RotateRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Pages to rotate (e.g., '1-3'). Omit to rotate every page.")]
    #[serde(default)]
    pub pages: Option<String>,
    #[schemars(description = "Angle in degrees, a multiple of 90")]
    pub angle: i64,
    #[schemars(description = "Rotate counter-clockwise (default: false)")]
    #[serde(default)]
    pub counter_clockwise: bool,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MergeRequest {
    #[schemars(description = "PDF files to merge, in order")]
    pub inputs: Vec<String>,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NumberRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Output file path")]
    pub output: String,
    #[schemars(description = "Number of the first page (default: 1)")]
    #[serde(default)]
    pub start: Option<u32>,
    #[schemars(description = "Corner or edge: tl, tc, tr, bl, bc or br (default: br)")]
    #[serde(default)]
    pub position: Option<String>,
    #[schemars(description = "Only number these pages (e.g., '2-10')")]
    #[serde(default)]
    pub pages: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct StampRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Text to draw")]
    pub text: String,
    #[schemars(description = "Output file path")]
    pub output: String,
    #[schemars(description = "Corner or edge: tl, tc, tr, bl, bc or br (default: tl)")]
    #[serde(default)]
    pub position: Option<String>,
    #[schemars(description = "Only stamp these pages (e.g., '1')")]
    #[serde(default)]
    pub pages: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WatermarkRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Text to draw (default: CONFIDENTIAL)")]
    #[serde(default)]
    pub text: Option<String>,
    #[schemars(description = "Output file path")]
    pub output: String,
    #[schemars(description = "Counter-clockwise rotation in degrees (default: 0)")]
    #[serde(default)]
    pub angle: Option<f32>,
    #[schemars(description = "'single' (page centre) or 'tiled' (3x3 grid), default single")]
    #[serde(default)]
    pub layout: Option<String>,
    #[schemars(description = "Text colour as #rrggbb")]
    #[serde(default)]
    pub color: Option<String>,
    #[schemars(description = "Only watermark these pages")]
    #[serde(default)]
    pub pages: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MetadataRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Output file path")]
    pub output: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[schemars(description = "Comma-separated keywords")]
    #[serde(default)]
    pub keywords: Option<String>,
}

/// Parse a clap value name such as "br" or "tiled" sent by an MCP client.
fn parse_value<T: ValueEnum>(value: Option<&str>, default: T) -> Result<T> {
    match value {
        Some(value) => T::from_str(value, true).map_err(|e| anyhow!(e)),
        None => Ok(default),
    }
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

impl PdfServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new()
    }
}

/// Pretty JSON for a successful tool call, `Error: ...` otherwise.
fn respond<T: Serialize>(result: Result<T>) -> String {
    match result {
        Ok(value) => {
            serde_json::to_string_pretty(&value).unwrap_or_else(|e| format!("Error: {}", e))
        }
        Err(e) => format!("Error: {:#}", e),
    }
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Get PDF metadata (title, author, subject, keywords, dates), page count and page sizes")]
    fn pdf_info(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        respond(commands::info::run(&path))
    }

    #[tool(description = "Keep only the selected pages of a PDF and save them to a new file. Page order follows page number, not the order pages are listed in.")]
    fn pdf_extract(&self, Parameters(req): Parameters<PagesRequest>) -> String {
        respond(commands::extract::run(&req.path, &req.pages, &req.output))
    }

    #[tool(description = "Remove the selected pages from a PDF and save the rest to a new file")]
    fn pdf_delete(&self, Parameters(req): Parameters<PagesRequest>) -> String {
        respond(commands::delete::run(&req.path, &req.pages, &req.output))
    }

    #[tool(description = "Append one extra copy of each selected page to the end of a PDF")]
    fn pdf_duplicate(&self, Parameters(req): Parameters<PagesRequest>) -> String {
        respond(commands::duplicate::run(&req.path, &req.pages, &req.output))
    }

    #[tool(description = "Insert a blank page, sized like its predecessor, after each selected page")]
    fn pdf_insert_blank(&self, Parameters(req): Parameters<PagesRequest>) -> String {
        respond(commands::insert_blank::run(&req.path, &req.pages, &req.output))
    }

    #[tool(description = "Write the pages of a PDF in exactly the given order, e.g. '3,1,2' or '10-1'. Pages may repeat or be left out.")]
    fn pdf_reorder(&self, Parameters(req): Parameters<PagesRequest>) -> String {
        respond(commands::reorder::run(&req.path, &req.pages, &req.output))
    }

    #[tool(description = "Split a PDF into one file per comma-separated range, in the order the ranges are given")]
    fn pdf_split(&self, Parameters(req): Parameters<SplitRequest>) -> String {
        let options = commands::split::SplitOptions {
            ranges: req.ranges,
            base: req.base,
            pad: req.pad,
        };
        respond(commands::split::run(&req.path, &req.output_dir, &options))
    }

    #[tool(description = "Rotate selected pages (or all pages) of a PDF by a multiple of 90 degrees")]
    fn pdf_rotate(&self, Parameters(req): Parameters<RotateRequest>) -> String {
        respond(commands::rotate::run(
            &req.path,
            req.pages.as_deref(),
            req.angle,
            req.counter_clockwise,
            &req.output,
        ))
    }

    #[tool(description = "Combine several PDFs into one, in the given order")]
    fn pdf_merge(&self, Parameters(req): Parameters<MergeRequest>) -> String {
        respond(commands::merge::run(&req.inputs, &req.output))
    }

    #[tool(description = "Draw page numbers on a PDF")]
    fn pdf_number(&self, Parameters(req): Parameters<NumberRequest>) -> String {
        let mut options = commands::number::NumberOptions {
            pages: req.pages,
            ..Default::default()
        };
        options.start = req.start.unwrap_or(options.start);
        respond(
            parse_value(req.position.as_deref(), options.placement).and_then(|placement| {
                options.placement = placement;
                commands::number::run(&req.path, &req.output, &options)
            }),
        )
    }

    #[tool(description = "Draw a short line of text in a corner or edge of each page")]
    fn pdf_stamp(&self, Parameters(req): Parameters<StampRequest>) -> String {
        let mut options = commands::stamp::StampOptions {
            pages: req.pages,
            ..Default::default()
        };
        respond(
            parse_value(req.position.as_deref(), options.placement).and_then(|placement| {
                options.placement = placement;
                commands::stamp::run(&req.path, &req.text, &req.output, &options)
            }),
        )
    }

    #[tool(description = "Draw large, optionally rotated and tiled, coloured text across each page")]
    fn pdf_watermark(&self, Parameters(req): Parameters<WatermarkRequest>) -> String {
        let mut options = commands::watermark::WatermarkOptions {
            angle: req.angle.unwrap_or(0.0),
            color: req.color,
            pages: req.pages,
            ..Default::default()
        };
        let text = req.text.unwrap_or_default();
        respond(
            parse_value(req.layout.as_deref(), options.layout).and_then(|layout| {
                options.layout = layout;
                commands::watermark::run(&req.path, &text, &req.output, &options)
            }),
        )
    }

    #[tool(description = "Set the title, author, subject or keywords of a PDF. Fields left out are kept.")]
    fn pdf_metadata(&self, Parameters(req): Parameters<MetadataRequest>) -> String {
        let update = InfoUpdate {
            title: req.title,
            author: req.author,
            subject: req.subject,
            keywords: req.keywords.as_deref().map(InfoUpdate::parse_keywords),
        };
        respond(commands::metadata::run(&req.path, &update, &req.output))
    }
}

impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF page tools. Page ranges are comma-separated page numbers and intervals \
                 such as '1-3,5,9-10'; invalid or out-of-range entries are ignored. Use pdf_info \
                 to get the page count, pdf_extract / pdf_delete / pdf_duplicate / \
                 pdf_insert_blank / pdf_rotate to work on a set of pages, pdf_reorder for an \
                 explicit order, pdf_split to write one file per range and pdf_merge to combine \
                 files. pdf_number, pdf_stamp and pdf_watermark draw text on pages; \
                 pdf_metadata edits the document info."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = PdfServer::new();
    info!("serving MCP on stdio");

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
