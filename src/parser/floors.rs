//! Multi-floor raster folder parser.
//!
//! A map folder holds one raster image per floor plus optional
//! `floor{N}_rooms.txt` sidecar files (1-based floor numbering in the
//! filenames). Floors are classified independently, in parallel, and are
//! only stitched together (teleport linkage, room overlay) once every
//! floor has finished decoding.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use rayon::prelude::*;
use regex::Regex;
use walkdir::WalkDir;

use crate::assemble::{assemble, link_teleports, KeyMode, LayerGrid, PortalTable};
use crate::error::{NavError, Result};
use crate::types::{CellKey, NavGraph, Palette};

use super::meta::{read_map_meta, MapMeta};
use super::raster::{classify_image, decode_image, resolve_tile};
use super::ParseOutcome;

/// File extensions recognized as floor images.
const IMAGE_EXTENSIONS: [&str; 5] = ["png", "bmp", "gif", "jpg", "jpeg"];

fn digit_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+").unwrap())
}

/// One floor image awaiting classification.
#[derive(Debug)]
struct FloorSource {
    path: PathBuf,
    meta: Option<MapMeta>,
}

/// Parse a folder of per-floor images into a stacked graph.
pub fn parse_floors(dir: &Path, palette: &Palette) -> Result<ParseOutcome> {
    let mut warnings = Vec::new();

    let files = scan_floor_images(dir);
    if files.is_empty() {
        return Err(NavError::NoFloorsFound {
            path: dir.to_path_buf(),
        });
    }

    // Read metadata and order the floors. The declared index is a sort
    // key only; the final floor numbers are dense from 0.
    let mut sources: Vec<(i64, FloorSource)> = files
        .into_iter()
        .map(|path| {
            let meta = read_map_meta(&path, &mut warnings);
            let key = floor_sort_key(&path, meta.as_ref());
            (key, FloorSource { path, meta })
        })
        .collect();
    sources.sort_by_key(|(key, _)| *key);

    // Classification has no cross-floor dependency; decode in parallel
    // and join before any stitching.
    let decoded: Result<Vec<(LayerGrid, Vec<String>)>> = sources
        .par_iter()
        .map(|(_, source)| {
            let mut local = Vec::new();
            let img = decode_image(&source.path)?;
            let tile = resolve_tile(
                source.meta.as_ref().and_then(|m| m.tile()),
                img.width(),
                img.height(),
                &mut local,
            );
            Ok((classify_image(&img, tile, palette), local))
        })
        .collect();

    let mut layers = Vec::with_capacity(sources.len());
    for (grid, local) in decoded? {
        layers.push(grid);
        warnings.extend(local);
    }

    let mut graph = assemble(
        &layers,
        &PortalTable::default(),
        KeyMode::Stacked,
        palette.vocabulary(),
    )?;
    link_teleports(&mut graph);

    for z in 0..layers.len() {
        let rooms_path = dir.join(format!("floor{}_rooms.txt", z + 1));
        if rooms_path.exists() {
            overlay_rooms(&mut graph, z, &rooms_path, &mut warnings)?;
        }
    }

    Ok(ParseOutcome { graph, warnings })
}

/// Collect floor image files directly inside `dir`, in filename order.
fn scan_floor_images(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| {
                    IMAGE_EXTENSIONS
                        .iter()
                        .any(|known| ext.eq_ignore_ascii_case(known))
                })
        })
        .collect();
    files.sort();
    files
}

/// Derive a floor's sort key: embedded `floor_index`, else the first
/// digit run in the filename, else 0.
fn floor_sort_key(path: &Path, meta: Option<&MapMeta>) -> i64 {
    if let Some(index) = meta.and_then(|m| m.floor_index) {
        return index;
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|stem| digit_run().find(stem))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// A rectangular room region from a sidecar file, bounds normalized and
/// inclusive.
#[derive(Debug, PartialEq)]
struct RoomDef {
    id: String,
    name: String,
    r0: usize,
    c0: usize,
    r1: usize,
    c1: usize,
}

/// Apply one floor's room definitions to the graph.
///
/// Cells inside a room box that were never decoded are skipped silently;
/// the overlay never creates cells.
fn overlay_rooms(
    graph: &mut NavGraph,
    floor: usize,
    path: &Path,
    warnings: &mut Vec<String>,
) -> Result<()> {
    let source = std::fs::read_to_string(path).map_err(|e| NavError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to read rooms file: {}", e),
    })?;

    for room in parse_room_lines(&source, path, warnings) {
        for r in room.r0..=room.r1 {
            for c in room.c0..=room.c1 {
                if let Some(cell) = graph.get_mut(CellKey::Stacked(floor, r, c)) {
                    cell.room = Some(room.id.clone());
                    cell.room_name = Some(room.name.clone());
                }
            }
        }
    }

    Ok(())
}

/// Parse `room_id name r0 c0 r1 c1` records. Comment and blank lines are
/// skipped silently; malformed lines are skipped with a warning.
fn parse_room_lines(source: &str, path: &Path, warnings: &mut Vec<String>) -> Vec<RoomDef> {
    let mut rooms = Vec::new();

    for (lineno, line) in source.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let parsed = match fields.as_slice() {
            [id, name, r0, c0, r1, c1] => {
                match (r0.parse(), c0.parse(), r1.parse(), c1.parse()) {
                    (Ok(r0), Ok(c0), Ok(r1), Ok(c1)) => Some(RoomDef {
                        id: id.to_string(),
                        name: name.to_string(),
                        r0: usize::min(r0, r1),
                        c0: usize::min(c0, c1),
                        r1: usize::max(r0, r1),
                        c1: usize::max(c0, c1),
                    }),
                    _ => None,
                }
            }
            _ => None,
        };

        match parsed {
            Some(room) => rooms.push(room),
            None => warnings.push(format!(
                "skipping malformed room line {} in {}: {:?}",
                lineno + 1,
                path.display(),
                line
            )),
        }
    }

    rooms
}
