//! Input front-ends.
//!
//! Three parsers feed the same assembler: delimited text grids, single
//! raster images, and folders of per-floor raster images. Each returns a
//! [`ParseOutcome`] so recoverable conditions reach the caller alongside
//! the graph instead of being printed from library code.

use crate::types::NavGraph;

mod floors;
mod meta;
mod raster;
mod text;

pub use floors::parse_floors;
pub use meta::{read_map_meta, MapMeta};
pub use raster::{classify_image, parse_raster};
pub use text::{decode_text, parse_text, TextDecode};

/// A parsed graph plus any warnings produced on the way.
#[derive(Debug)]
pub struct ParseOutcome {
    pub graph: NavGraph,
    pub warnings: Vec<String>,
}
