//! Convert command implementation.
//!
//! Detects the input kind (text grid, single image, or floor folder),
//! runs the matching parser, and emits the graph as JSON.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::error::{NavError, Result};
use crate::output::{plural, Printer};
use crate::parser::{parse_floors, parse_raster, parse_text, ParseOutcome};
use crate::types::Palette;

/// Extensions routed to the raster parser.
const RASTER_EXTENSIONS: [&str; 5] = ["png", "bmp", "gif", "jpg", "jpeg"];

/// Convert a floor plan to a JSON graph
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input: a .txt grid, an image file, or a folder of floor images
    pub input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Palette override file (JSON of token codes to hex colours)
    #[arg(long)]
    pub palette: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(args: ConvertArgs) -> Result<()> {
    let printer = Printer::new();

    printer.status("Converting", &args.input.display().to_string());
    let outcome = parse_input(&args)?;

    for warning in &outcome.warnings {
        printer.warning("Warning", warning);
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&outcome.graph.to_json())
    } else {
        serde_json::to_string(&outcome.graph.to_json())
    }
    .map_err(|e| NavError::Assembly {
        message: format!("Failed to serialize graph: {}", e),
    })?;

    match &args.output {
        Some(path) => {
            fs::write(path, json + "\n").map_err(|e| NavError::Io {
                path: path.clone(),
                message: format!("Failed to write output: {}", e),
            })?;
            printer.status("Wrote", &path.display().to_string());
        }
        None => println!("{}", json),
    }

    printer.status(
        "Finished",
        &format!(
            "{}, {}",
            plural(outcome.graph.len(), "cell", "cells"),
            plural(outcome.graph.edge_count(), "edge", "edges")
        ),
    );

    Ok(())
}

/// Route the input to a parser by its filesystem shape and extension.
fn parse_input(args: &ConvertArgs) -> Result<ParseOutcome> {
    let input = &args.input;
    let overrides = args.palette.as_deref();

    if input.is_dir() {
        let palette = super::resolve_palette(Palette::full(), overrides)?;
        return parse_floors(input, &palette);
    }

    match extension(input) {
        Some(ext) if ext == "txt" => {
            let source = fs::read_to_string(input).map_err(|e| NavError::Io {
                path: input.clone(),
                message: format!("Failed to read file: {}", e),
            })?;
            parse_text(&source)
        }
        Some(ext) if RASTER_EXTENSIONS.contains(&ext.as_str()) => {
            let palette = super::resolve_palette(Palette::core(), overrides)?;
            parse_raster(input, &palette)
        }
        _ => Err(NavError::Format {
            message: format!("Unsupported input: {}", input.display()),
            help: Some(
                "Expected a .txt grid, an image (png/bmp/gif/jpg), or a folder of floor images"
                    .to_string(),
            ),
        }),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
