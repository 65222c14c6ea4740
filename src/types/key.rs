//! Cell keys: grid coordinates with an optional floor component.

use std::fmt;

/// The identity of one cell in a graph.
///
/// Flat keys address single-layer graphs as `(row, col)`; stacked keys
/// address multi-layer/multi-floor graphs as `(floor, row, col)`. One
/// graph only ever contains keys of a single shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CellKey {
    Flat(usize, usize),
    Stacked(usize, usize, usize),
}

impl CellKey {
    /// The floor component, if this is a stacked key.
    pub fn floor(self) -> Option<usize> {
        match self {
            CellKey::Flat(..) => None,
            CellKey::Stacked(z, _, _) => Some(z),
        }
    }

    /// The row component.
    pub fn row(self) -> usize {
        match self {
            CellKey::Flat(r, _) => r,
            CellKey::Stacked(_, r, _) => r,
        }
    }

    /// The column component.
    pub fn col(self) -> usize {
        match self {
            CellKey::Flat(_, c) => c,
            CellKey::Stacked(_, _, c) => c,
        }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellKey::Flat(r, c) => write!(f, "{},{}", r, c),
            CellKey::Stacked(z, r, c) => write!(f, "{},{},{}", z, r, c),
        }
    }
}
