//! Graph export back-ends.
//!
//! The text exporter emits the same delimited grid format the text parser
//! reads; the raster exporter paints one floor back into a PNG with its
//! `map_meta` annotation, so an edited graph can re-enter the raster
//! pipeline.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde_json::json;

use crate::assemble::LayerGrid;
use crate::error::{NavError, Result};
use crate::types::{CellAttrs, Colour, NavGraph, Palette, Token};

/// Token chosen to represent a multi-flag cell when painting, most
/// specific first. Anything else falls back to `Normal`.
const DISPLAY_PRIORITY: [Token; 9] = [
    Token::Wall,
    Token::Safe,
    Token::Bottleneck,
    Token::Fire,
    Token::Spawn,
    Token::StairsDown,
    Token::StairsUp,
    Token::TeleportDown,
    Token::TeleportUp,
];

/// Serialize a graph to the delimited text grid format.
///
/// Stacked graphs get one `=== LAYER <z> ===` block per floor. Portal
/// meshes and room tags have no text representation and are not emitted.
/// The round trip through [`crate::parser::parse_text`] reproduces the
/// graph exactly when every cell carries at least one category; a cell
/// with an empty flag set serializes to an empty cell, which the parser
/// drops.
pub fn graph_to_text(graph: &NavGraph) -> String {
    let mut floors: BTreeMap<Option<usize>, BTreeMap<(usize, usize), &CellAttrs>> =
        BTreeMap::new();
    for (&key, attrs) in graph.iter() {
        floors
            .entry(key.floor())
            .or_default()
            .insert((key.row(), key.col()), attrs);
    }

    let mut out = String::new();
    for (floor, cells) in &floors {
        if let Some(z) = floor {
            out.push_str(&format!("=== LAYER {} ===\n", z));
        }

        let mut rows: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for (&(r, _), attrs) in cells {
            let codes: Vec<&str> = attrs.flags.iter().map(Token::code).collect();
            rows.entry(r).or_default().push(codes.join(","));
        }
        for row in rows.values() {
            out.push_str(&row.join(";"));
            out.push('\n');
        }
    }
    out
}

/// Paint one floor grid into a PNG at `tile` pixels per cell, annotated
/// with a `map_meta` chunk the raster parsers read back.
pub fn write_floor_png(
    grid: &LayerGrid,
    palette: &Palette,
    tile: u32,
    floor_index: usize,
    floors_total: usize,
    path: &Path,
) -> Result<()> {
    let rows = grid.row_count() as u32;
    let cols = grid.col_count() as u32;
    if rows == 0 || cols == 0 {
        return Err(NavError::EmptyInput);
    }

    let (width, height) = (cols * tile, rows * tile);
    let mut pixels = vec![255u8; (width * height * 3) as usize];

    for (i, row) in grid.rows.iter().enumerate() {
        for (j, flags) in row.iter().enumerate() {
            let token = flags.first_of(&DISPLAY_PRIORITY).unwrap_or(Token::Normal);
            let colour = palette.colour(token).unwrap_or(Colour::WHITE);
            paint_block(&mut pixels, width, i as u32, j as u32, tile, colour);
        }
    }

    let meta = json!({
        "cell_px": tile,
        "floor_index": floor_index,
        "floors_total": floors_total,
    });

    let file = File::create(path).map_err(|e| NavError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to create image: {}", e),
    })?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder
        .add_text_chunk("map_meta".to_string(), meta.to_string())
        .map_err(|e| png_error(path, e))?;
    let mut writer = encoder.write_header().map_err(|e| png_error(path, e))?;
    writer
        .write_image_data(&pixels)
        .map_err(|e| png_error(path, e))?;

    Ok(())
}

fn png_error(path: &Path, e: png::EncodingError) -> NavError {
    NavError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to encode image: {}", e),
    }
}

fn paint_block(pixels: &mut [u8], width: u32, row: u32, col: u32, tile: u32, colour: Colour) {
    let rgb = colour.to_rgb();
    for dy in 0..tile {
        for dx in 0..tile {
            let y = row * tile + dy;
            let x = col * tile + dx;
            let at = ((y * width + x) * 3) as usize;
            pixels[at..at + 3].copy_from_slice(&rgb);
        }
    }
}
