//! navgrid - Floor plan to navigation graph converter
//!
//! A library for turning floor plans (delimited text grids, raster
//! images, or folders of per-floor images) into a navigable spatial
//! graph consumed by evacuation simulations.

pub mod assemble;
pub mod cli;
pub mod error;
pub mod export;
pub mod output;
pub mod parser;
pub mod types;

pub use assemble::{assemble, link_teleports, KeyMode, LayerGrid, PortalTable};
pub use error::{NavError, Result};
pub use export::{graph_to_text, write_floor_png};
pub use parser::{
    classify_image, decode_text, parse_floors, parse_raster, parse_text, MapMeta, ParseOutcome,
    TextDecode,
};
pub use types::{
    load_palette_overrides, CellAttrs, CellKey, Colour, NavGraph, Palette, Token, TokenFlags,
    Vocabulary,
};
