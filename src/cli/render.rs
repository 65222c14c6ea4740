//! Render command implementation.
//!
//! Paints a delimited text grid into a PNG floor image, so text-authored
//! maps can enter the raster pipeline or be eyeballed in an image viewer.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::error::{NavError, Result};
use crate::export::write_floor_png;
use crate::output::Printer;
use crate::parser::decode_text;
use crate::types::Palette;

/// Render a text grid to a PNG floor image
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Input text grid file
    pub input: PathBuf,

    /// Output PNG path
    #[arg(long, short)]
    pub output: PathBuf,

    /// Pixels per cell
    #[arg(long, default_value = "16")]
    pub tile: u32,

    /// Palette override file (JSON of token codes to hex colours)
    #[arg(long)]
    pub palette: Option<PathBuf>,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let printer = Printer::new();

    if args.tile < 1 {
        return Err(NavError::Format {
            message: "tile size must be at least 1".to_string(),
            help: None,
        });
    }

    let source = fs::read_to_string(&args.input).map_err(|e| NavError::Io {
        path: args.input.clone(),
        message: format!("Failed to read file: {}", e),
    })?;

    let decode = decode_text(&source)?;
    for warning in &decode.warnings {
        printer.warning("Warning", warning);
    }
    if decode.multilayer && decode.layers.len() > 1 {
        printer.warning(
            "Warning",
            &format!(
                "input has {} layers; rendering the first only",
                decode.layers.len()
            ),
        );
    }

    let palette = super::resolve_palette(Palette::core(), args.palette.as_deref())?;
    let grid = &decode.layers[0];
    write_floor_png(grid, &palette, args.tile, 0, 1, &args.output)?;

    printer.status(
        "Rendered",
        &format!(
            "{} ({}x{} cells at {} px)",
            args.output.display(),
            grid.row_count(),
            grid.col_count(),
            args.tile
        ),
    );

    Ok(())
}
