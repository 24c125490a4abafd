use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::pdf::overlay::{Placement, WatermarkLayout};

#[derive(Parser)]
#[command(name = "pagesmith")]
#[command(about = "PDF page toolkit: select, delete, duplicate, insert, reorder, split and more")]
#[command(version)]
pub struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server on stdin/stdout
    Mcp,

    /// Display PDF metadata and page sizes
    Info {
        /// PDF file to inspect
        path: PathBuf,
    },

    /// Keep only the selected pages
    #[command(alias = "cat")]
    Extract {
        /// PDF file to extract from
        path: PathBuf,

        /// Pages to keep (e.g., "1-3,5,9-10")
        pages: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Remove the selected pages
    Delete {
        /// PDF file to delete pages from
        path: PathBuf,

        /// Pages to remove (e.g., "2,4-6")
        pages: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Append a copy of each selected page to the end
    Duplicate {
        /// PDF file to duplicate pages of
        path: PathBuf,

        /// Pages to duplicate (e.g., "1,3")
        pages: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Insert a blank page after each listed page
    InsertBlank {
        /// PDF file to insert into
        path: PathBuf,

        /// Pages to follow with a blank page (e.g., "1,3-4")
        positions: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write pages in an explicit order
    Reorder {
        /// PDF file to reorder
        path: PathBuf,

        /// New page order (e.g., "3,1,2" or "10-1"); repeats and omissions are kept
        order: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Split into one file per range
    #[command(alias = "burst")]
    Split {
        /// PDF file to split
        path: PathBuf,

        /// Ranges, one output file each (e.g., "1-3,4,5-9"); every page on its own if omitted
        ranges: Option<String>,

        /// Output directory
        #[arg(short = 'd', long)]
        output_dir: PathBuf,

        /// File name prefix (defaults to the input file name)
        #[arg(long)]
        base: Option<String>,

        /// Digits in the part number (1-4)
        #[arg(long, default_value_t = crate::commands::split::DEFAULT_PAD)]
        pad: usize,
    },

    /// Rotate pages by a multiple of 90 degrees
    Rotate {
        /// PDF file to rotate
        path: PathBuf,

        /// Pages to rotate (e.g., "1-3"); all pages if omitted
        pages: Option<String>,

        /// Angle in degrees
        #[arg(short, long, default_value = "90", allow_hyphen_values = true)]
        angle: i64,

        /// Rotate counter-clockwise
        #[arg(long)]
        ccw: bool,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Combine multiple PDFs into one
    Merge {
        /// PDF files to merge
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Draw page numbers
    Number {
        /// PDF file to number
        path: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Number of the first page
        #[arg(long, default_value = "1")]
        start: u32,

        /// Font size in points
        #[arg(long, default_value = "10")]
        size: f32,

        /// Distance from the page edge in points
        #[arg(long, default_value = "24")]
        margin: f32,

        /// Where to put the number
        #[arg(long, value_enum, default_value = "br")]
        position: Placement,

        /// Only number these pages
        #[arg(long)]
        pages: Option<String>,
    },

    /// Draw a line of text on each page
    Stamp {
        /// PDF file to stamp
        path: PathBuf,

        /// Text to draw
        text: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Font size in points
        #[arg(long, default_value = "10")]
        size: f32,

        /// Distance from the page edge in points
        #[arg(long, default_value = "16")]
        margin: f32,

        /// Where to put the text
        #[arg(long, value_enum, default_value = "tl")]
        position: Placement,

        /// Only stamp these pages
        #[arg(long)]
        pages: Option<String>,
    },

    /// Draw large, optionally rotated text across each page
    Watermark {
        /// PDF file to watermark
        path: PathBuf,

        /// Text to draw
        #[arg(default_value = crate::commands::watermark::DEFAULT_TEXT)]
        text: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Font size in points
        #[arg(long, default_value = "48")]
        size: f32,

        /// Counter-clockwise rotation in degrees
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        angle: f32,

        /// Once in the centre, or a 3x3 grid
        #[arg(long, value_enum, default_value = "single")]
        layout: WatermarkLayout,

        /// Text colour as #rrggbb
        #[arg(long)]
        color: Option<String>,

        /// Only watermark these pages
        #[arg(long)]
        pages: Option<String>,
    },

    /// Typeset a plain text file into a new PDF
    Write {
        /// Text file to read, or "-" for stdin
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Title drawn above the text
        #[arg(long)]
        title: Option<String>,

        /// Font size in points (6-48)
        #[arg(long, default_value = "12")]
        size: f32,

        /// Page margin in points
        #[arg(long, default_value = "40")]
        margin: f32,
    },

    /// Edit title, author, subject and keywords
    Metadata {
        /// PDF file to edit
        path: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        author: Option<String>,

        #[arg(long)]
        subject: Option<String>,

        /// Comma-separated keywords
        #[arg(long)]
        keywords: Option<String>,
    },
}
