pub mod completions;
pub mod convert;
pub mod render;
pub mod scan;

use std::path::Path;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::types::{load_palette_overrides, Palette};

/// navgrid - Floor plan to navigation graph converter
#[derive(Parser, Debug)]
#[command(name = "navgrid")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a floor plan (text grid, image, or floor folder) to a JSON graph
    Convert(convert::ConvertArgs),

    /// Render a text grid back to a PNG floor image
    Render(render::RenderArgs),

    /// Scan an image into the delimited text grid format
    Scan(scan::ScanArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Resolve the working palette: the given base with any override file
/// applied on top.
pub(crate) fn resolve_palette(base: Palette, overrides: Option<&Path>) -> Result<Palette> {
    let mut palette = base;
    if let Some(path) = overrides {
        palette.apply_overrides(&load_palette_overrides(path)?);
    }
    Ok(palette)
}
