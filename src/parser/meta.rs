//! Embedded `map_meta` image annotation.
//!
//! The map editor stores a small JSON record in a PNG text chunk under the
//! `map_meta` keyword. The record is decoded into a typed struct with
//! explicit fallback: a missing chunk or a non-PNG container simply means
//! no metadata, while a malformed record is reported as a warning and then
//! treated as absent.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

/// The annotation keyword used by the map editor.
const META_KEYWORD: &str = "map_meta";

/// Typed `map_meta` record. All fields are optional; consumers apply
/// their own fallbacks.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MapMeta {
    /// Pixels per cell.
    pub cell_px: Option<u32>,
    /// Alias for `cell_px` accepted on input.
    pub tile_px: Option<u32>,
    /// Declared floor index. A sort key only; floors are renumbered
    /// densely after sorting.
    pub floor_index: Option<i64>,
    /// Declared floor count.
    pub floors_total: Option<u32>,
}

impl MapMeta {
    /// The declared tile size, if any (must be at least 1).
    pub fn tile(&self) -> Option<u32> {
        self.cell_px.or(self.tile_px).filter(|&t| t >= 1)
    }
}

/// Read the `map_meta` annotation from an image file.
///
/// Returns `None` when the file is not a PNG, carries no annotation, or
/// the annotation fails to decode (the last case adds a warning).
pub fn read_map_meta(path: &Path, warnings: &mut Vec<String>) -> Option<MapMeta> {
    let file = File::open(path).ok()?;
    let decoder = png::Decoder::new(BufReader::new(file));
    let reader = decoder.read_info().ok()?;
    let info = reader.info();

    let mut text = None;
    for chunk in &info.uncompressed_latin1_text {
        if chunk.keyword == META_KEYWORD {
            text = Some(chunk.text.clone());
            break;
        }
    }
    if text.is_none() {
        for chunk in &info.utf8_text {
            if chunk.keyword == META_KEYWORD {
                if let Ok(t) = chunk.get_text() {
                    text = Some(t);
                    break;
                }
            }
        }
    }

    let text = text?;
    match serde_json::from_str::<MapMeta>(&text) {
        Ok(meta) => Some(meta),
        Err(e) => {
            warnings.push(format!(
                "ignoring malformed map_meta in {}: {}",
                path.display(),
                e
            ));
            None
        }
    }
}
