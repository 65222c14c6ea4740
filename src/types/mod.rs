//! Core types shared by the parsers and the assembler.

mod colour;
mod graph;
mod key;
mod palette;
mod token;

pub use colour::Colour;
pub use graph::{CellAttrs, NavGraph};
pub use key::CellKey;
pub use palette::{load_palette_overrides, Palette};
pub use token::{Token, TokenFlags, Vocabulary};
