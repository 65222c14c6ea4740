//! Scan command implementation.
//!
//! Classifies an image and emits the result as a delimited text grid,
//! the editable middle step between a hand-drawn plan and the graph.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::error::{NavError, Result};
use crate::export::graph_to_text;
use crate::output::Printer;
use crate::parser::parse_raster;
use crate::types::{Palette, Token};

/// Scan an image into the text grid format
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Input image file
    pub input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Palette override file (JSON of token codes to hex colours)
    #[arg(long)]
    pub palette: Option<PathBuf>,
}

pub fn run(args: ScanArgs) -> Result<()> {
    let printer = Printer::new();

    let palette = super::resolve_palette(Palette::core(), args.palette.as_deref())?;
    let outcome = parse_raster(&args.input, &palette)?;
    for warning in &outcome.warnings {
        printer.warning("Warning", warning);
    }

    if !outcome.graph.iter().any(|(_, a)| a.has(Token::Spawn)) {
        printer.warning(
            "Warning",
            "no spawn cells detected; check the palette against the source image",
        );
    }

    let text = graph_to_text(&outcome.graph);
    match &args.output {
        Some(path) => {
            fs::write(path, &text).map_err(|e| NavError::Io {
                path: path.clone(),
                message: format!("Failed to write output: {}", e),
            })?;
            printer.status("Wrote", &path.display().to_string());
        }
        None => print!("{}", text),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_text;
    use crate::types::CellKey;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn test_scan_writes_parseable_text() {
        let palette = Palette::core();
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(0, 0, Rgb(palette.colour(Token::Wall).unwrap().to_rgb()));
        img.put_pixel(1, 0, Rgb(palette.colour(Token::Normal).unwrap().to_rgb()));
        img.put_pixel(0, 1, Rgb(palette.colour(Token::Spawn).unwrap().to_rgb()));
        img.put_pixel(1, 1, Rgb(palette.colour(Token::Safe).unwrap().to_rgb()));

        let dir = tempdir().unwrap();
        let input = dir.path().join("plan.png");
        let output = dir.path().join("plan.txt");
        img.save(&input).unwrap();

        run(ScanArgs {
            input,
            output: Some(output.clone()),
            palette: None,
        })
        .unwrap();

        let graph = parse_text(&fs::read_to_string(&output).unwrap())
            .unwrap()
            .graph;
        assert_eq!(graph.len(), 4);
        assert!(graph.has(CellKey::Flat(0, 0), Token::Wall));
        assert!(graph.has(CellKey::Flat(1, 0), Token::Spawn));
        assert!(graph.has(CellKey::Flat(1, 1), Token::Safe));
    }
}
