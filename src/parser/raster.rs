//! Raster image parser.
//!
//! Decodes a single image into a flat grid by splitting it into square
//! tiles, averaging each tile's colour, and classifying the average to
//! the nearest palette entry.

use std::path::Path;

use image::RgbImage;

use crate::assemble::{assemble, KeyMode, LayerGrid, PortalTable};
use crate::error::{NavError, Result};
use crate::types::{Colour, Palette, Token};

use super::meta::read_map_meta;
use super::ParseOutcome;

/// Parse a raster image into a flat-keyed graph.
///
/// The tile size comes from the embedded `map_meta` annotation when
/// present, clamped so it always divides the image dimensions; without
/// metadata every pixel is one cell.
pub fn parse_raster(path: &Path, palette: &Palette) -> Result<ParseOutcome> {
    let mut warnings = Vec::new();

    let meta = read_map_meta(path, &mut warnings);
    let img = decode_image(path)?;
    let tile = resolve_tile(
        meta.and_then(|m| m.tile()),
        img.width(),
        img.height(),
        &mut warnings,
    );

    let grid = classify_image(&img, tile, palette);
    let graph = assemble(
        &[grid],
        &PortalTable::default(),
        KeyMode::Flat,
        palette.vocabulary(),
    )?;

    Ok(ParseOutcome { graph, warnings })
}

/// Decode an image file to RGB, mapping failures to a format error.
pub(crate) fn decode_image(path: &Path) -> Result<RgbImage> {
    let img = image::open(path).map_err(|e| NavError::Format {
        message: format!("Failed to decode image {}: {}", path.display(), e),
        help: Some("Expected a standard bitmap container (PNG, BMP, GIF, JPEG)".to_string()),
    })?;
    Ok(img.to_rgb8())
}

/// Resolve the effective tile size for an image.
///
/// A declared size is clamped to `gcd(declared, gcd(width, height))`,
/// which always divides both dimensions. Degrading below the declared
/// size is a performance note, not an error. No declaration means one
/// pixel per cell.
pub(crate) fn resolve_tile(
    declared: Option<u32>,
    width: u32,
    height: u32,
    warnings: &mut Vec<String>,
) -> u32 {
    let Some(declared) = declared else {
        return 1;
    };

    let tile = gcd(declared, gcd(width, height)).max(1);
    if tile != declared {
        warnings.push(format!(
            "declared tile size {} does not divide {}x{}; degrading to {} px per cell",
            declared, width, height, tile
        ));
    }
    tile
}

fn gcd(a: u32, b: u32) -> u32 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Classify every tile of an image to its nearest palette token.
///
/// `tile` must divide both image dimensions. Each tile becomes one cell
/// whose colour is the average over the pixel block.
pub fn classify_image(img: &RgbImage, tile: u32, palette: &Palette) -> LayerGrid {
    debug_assert!(tile >= 1);
    debug_assert_eq!(img.width() % tile, 0);
    debug_assert_eq!(img.height() % tile, 0);

    let rows = img.height() / tile;
    let cols = img.width() / tile;

    let mut tokens: Vec<Vec<Token>> = Vec::with_capacity(rows as usize);
    for i in 0..rows {
        let mut row = Vec::with_capacity(cols as usize);
        for j in 0..cols {
            let avg = block_average(img, i * tile, j * tile, tile);
            row.push(palette.nearest(avg));
        }
        tokens.push(row);
    }

    LayerGrid::from_tokens(tokens)
}

/// Average colour of one `tile` x `tile` block starting at `(y0, x0)`.
fn block_average(img: &RgbImage, y0: u32, x0: u32, tile: u32) -> Colour {
    let mut sum = [0u64; 3];
    for dy in 0..tile {
        for dx in 0..tile {
            let px = img.get_pixel(x0 + dx, y0 + dy).0;
            sum[0] += px[0] as u64;
            sum[1] += px[1] as u64;
            sum[2] += px[2] as u64;
        }
    }
    let count = (tile as u64) * (tile as u64);
    Colour::rgb(
        (sum[0] / count) as u8,
        (sum[1] / count) as u8,
        (sum[2] / count) as u8,
    )
}
