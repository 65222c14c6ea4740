//! Shared grid-to-graph assembly.
//!
//! Every parser front-end decodes into per-layer token grids (plus an
//! optional portal side table) and hands them here. Assembly is two-phase:
//! all grid cells are materialized first, then edges are wired among
//! already-existing keys. A portal reference to a key that was never
//! materialized is an internal consistency error, not a reason to invent
//! a stray cell.

use std::collections::BTreeMap;

use crate::error::{NavError, Result};
use crate::types::{CellAttrs, CellKey, NavGraph, Token, TokenFlags, Vocabulary};

/// One decoded layer: rows of per-cell flag sets.
///
/// Rows may be ragged; each row keeps its own length and assembly only
/// links positions that actually exist.
#[derive(Debug, Clone, Default)]
pub struct LayerGrid {
    pub rows: Vec<Vec<TokenFlags>>,
}

impl LayerGrid {
    /// Build a rectangular layer from single-token cells (raster output).
    pub fn from_tokens(tokens: Vec<Vec<Token>>) -> Self {
        Self {
            rows: tokens
                .into_iter()
                .map(|row| row.into_iter().map(TokenFlags::single).collect())
                .collect(),
        }
    }

    /// Check if the layer has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row count.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row length.
    pub fn col_count(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }
}

/// Side table of portal occurrences: id -> `(layer, row, col)` locations.
#[derive(Debug, Clone, Default)]
pub struct PortalTable {
    occurrences: BTreeMap<String, Vec<(usize, usize, usize)>>,
}

impl PortalTable {
    /// Record one occurrence of a portal id.
    pub fn record(&mut self, id: impl Into<String>, layer: usize, row: usize, col: usize) {
        self.occurrences
            .entry(id.into())
            .or_default()
            .push((layer, row, col));
    }

    /// Check if no portals were recorded.
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    /// Iterate ids and their occurrence lists, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[(usize, usize, usize)])> {
        self.occurrences
            .iter()
            .map(|(id, locs)| (id.as_str(), locs.as_slice()))
    }
}

/// How cells are keyed in the assembled graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    /// `(row, col)` keys; only valid for a single layer.
    Flat,
    /// `(floor, row, col)` keys.
    Stacked,
}

impl KeyMode {
    fn key(self, layer: usize, row: usize, col: usize) -> CellKey {
        match self {
            KeyMode::Flat => CellKey::Flat(row, col),
            KeyMode::Stacked => CellKey::Stacked(layer, row, col),
        }
    }
}

/// Assemble decoded layers and a portal table into the final graph.
///
/// Phase one materializes every grid cell with its complete flag set and
/// an empty neighbor set. Phase two wires symmetric 4-directional
/// adjacency within each layer, then connects every distinct pair of
/// cells sharing a portal id (a full mesh: k occurrences produce k*(k-1)
/// directed edges, preserved from the source format's semantics).
pub fn assemble(
    layers: &[LayerGrid],
    portals: &PortalTable,
    mode: KeyMode,
    vocabulary: Vocabulary,
) -> Result<NavGraph> {
    debug_assert!(mode == KeyMode::Stacked || layers.len() <= 1);

    let mut graph = NavGraph::new(vocabulary);

    // Phase one: materialize all grid cells.
    for (z, layer) in layers.iter().enumerate() {
        for (i, row) in layer.rows.iter().enumerate() {
            for (j, &flags) in row.iter().enumerate() {
                graph.insert(mode.key(z, i, j), CellAttrs::new(flags));
            }
        }
    }

    // Phase two: in-layer 4-adjacency among materialized cells. Each cell
    // pushes edges outward, so symmetry falls out of iterating both sides.
    for (z, layer) in layers.iter().enumerate() {
        for (i, row) in layer.rows.iter().enumerate() {
            for j in 0..row.len() {
                let from = mode.key(z, i, j);
                for (i2, j2) in neighbours4(i, j) {
                    graph.add_edge(from, mode.key(z, i2, j2));
                }
            }
        }
    }

    connect_portals(&mut graph, portals, mode)?;

    Ok(graph)
}

/// The four in-layer neighbour positions, skipping negative coordinates.
/// Positions past a row or layer edge are rejected later by the edge
/// insertion, which only links materialized keys.
fn neighbours4(i: usize, j: usize) -> impl Iterator<Item = (usize, usize)> {
    [
        i.checked_sub(1).map(|i2| (i2, j)),
        Some((i + 1, j)),
        j.checked_sub(1).map(|j2| (i, j2)),
        Some((i, j + 1)),
    ]
    .into_iter()
    .flatten()
}

/// Connect all occurrences of each portal id as a full pairwise mesh.
///
/// This is quadratic in the occurrence count of one id, by design: the
/// source format links every pair, not a cycle or star.
fn connect_portals(graph: &mut NavGraph, portals: &PortalTable, mode: KeyMode) -> Result<()> {
    for (id, locs) in portals.iter() {
        // All occurrences must refer to materialized cells.
        for &(z, i, j) in locs {
            let key = mode.key(z, i, j);
            if !graph.contains(key) {
                return Err(NavError::Assembly {
                    message: format!("portal {} refers to unknown cell {}", id, key),
                });
            }
        }

        for &(za, ia, ja) in locs {
            for &(zb, ib, jb) in locs {
                if (za, ia, ja) == (zb, ib, jb) {
                    continue;
                }
                graph.add_edge(mode.key(za, ia, ja), mode.key(zb, ib, jb));
            }
        }
    }

    Ok(())
}

/// Wire vertical teleport edges in a stacked graph.
///
/// A `TD` cell at `(z, r, c)` links bidirectionally to `(z-1, r, c)` when
/// that cell exists; `TU` links to `(z+1, r, c)`. A missing target floor
/// or out-of-extent target cell produces no edge and no error.
pub fn link_teleports(graph: &mut NavGraph) {
    let mut links: Vec<(CellKey, CellKey)> = Vec::new();

    for (&key, attrs) in graph.iter() {
        let CellKey::Stacked(z, r, c) = key else {
            continue;
        };
        if attrs.has(Token::TeleportDown) {
            if let Some(below) = z.checked_sub(1) {
                links.push((key, CellKey::Stacked(below, r, c)));
            }
        }
        if attrs.has(Token::TeleportUp) {
            links.push((key, CellKey::Stacked(z + 1, r, c)));
        }
    }

    for (from, to) in links {
        if graph.contains(to) {
            graph.add_edge(from, to);
            graph.add_edge(to, from);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grid(rows: usize, cols: usize, token: Token) -> LayerGrid {
        LayerGrid::from_tokens(vec![vec![token; cols]; rows])
    }

    #[test]
    fn test_flat_cell_count_and_adjacency() {
        let layer = grid(3, 4, Token::Normal);
        let graph = assemble(&[layer], &PortalTable::default(), KeyMode::Flat, Vocabulary::Core)
            .unwrap();

        assert_eq!(graph.len(), 12);

        // Interior cell: exactly its four in-bounds neighbours.
        let nbrs = graph.neighbors(CellKey::Flat(1, 1)).unwrap();
        let expected: Vec<CellKey> = vec![
            CellKey::Flat(0, 1),
            CellKey::Flat(1, 0),
            CellKey::Flat(1, 2),
            CellKey::Flat(2, 1),
        ];
        assert_eq!(nbrs.iter().copied().collect::<Vec<_>>(), expected);

        // Corner cell: two neighbours.
        assert_eq!(graph.neighbors(CellKey::Flat(0, 0)).unwrap().len(), 2);
        assert_eq!(graph.neighbors(CellKey::Flat(2, 3)).unwrap().len(), 2);
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        let layer = grid(2, 2, Token::Normal);
        let graph = assemble(&[layer], &PortalTable::default(), KeyMode::Flat, Vocabulary::Core)
            .unwrap();

        for (&key, attrs) in graph.iter() {
            for &nbr in &attrs.neighbors {
                assert!(
                    graph.neighbors(nbr).unwrap().contains(&key),
                    "{} -> {} has no reverse edge",
                    key,
                    nbr
                );
            }
        }
    }

    #[test]
    fn test_ragged_rows_link_only_existing_cells() {
        let mut layer = grid(2, 3, Token::Normal);
        layer.rows[1].truncate(1); // second row is shorter

        let graph = assemble(&[layer], &PortalTable::default(), KeyMode::Flat, Vocabulary::Core)
            .unwrap();

        assert_eq!(graph.len(), 4);
        assert!(!graph.contains(CellKey::Flat(1, 1)));
        // (0,1) has no southern neighbour because (1,1) was never decoded.
        let nbrs = graph.neighbors(CellKey::Flat(0, 1)).unwrap();
        assert!(!nbrs.contains(&CellKey::Flat(1, 1)));
        assert!(nbrs.contains(&CellKey::Flat(0, 0)));
        assert!(nbrs.contains(&CellKey::Flat(0, 2)));
    }

    #[test]
    fn test_portal_full_mesh() {
        // One portal id at 3 locations across 2 layers: 3*2 directed edges
        // beyond the grid adjacency.
        let layers = vec![grid(1, 3, Token::Normal), grid(1, 3, Token::Normal)];
        let mut portals = PortalTable::default();
        portals.record("Z1", 0, 0, 0);
        portals.record("Z1", 0, 0, 2);
        portals.record("Z1", 1, 0, 1);

        let graph =
            assemble(&layers, &portals, KeyMode::Stacked, Vocabulary::Core).unwrap();

        let a = CellKey::Stacked(0, 0, 0);
        let b = CellKey::Stacked(0, 0, 2);
        let c = CellKey::Stacked(1, 0, 1);
        for (from, to) in [(a, b), (a, c), (b, a), (b, c), (c, a), (c, b)] {
            assert!(
                graph.neighbors(from).unwrap().contains(&to),
                "{} -> {} missing",
                from,
                to
            );
        }
    }

    #[test]
    fn test_portal_ids_do_not_cross_link() {
        let layers = vec![grid(1, 4, Token::Normal)];
        let mut portals = PortalTable::default();
        portals.record("Z1", 0, 0, 0);
        portals.record("Z1", 0, 0, 3);
        portals.record("E2", 0, 0, 1);
        portals.record("E2", 0, 0, 2);

        let graph =
            assemble(&layers, &portals, KeyMode::Flat, Vocabulary::Core).unwrap();

        // Z1 mesh exists.
        assert!(graph
            .neighbors(CellKey::Flat(0, 0))
            .unwrap()
            .contains(&CellKey::Flat(0, 3)));
        // No Z1 <-> E2 links beyond plain grid adjacency.
        assert!(!graph
            .neighbors(CellKey::Flat(0, 0))
            .unwrap()
            .contains(&CellKey::Flat(0, 2)));
        assert!(!graph
            .neighbors(CellKey::Flat(0, 3))
            .unwrap()
            .contains(&CellKey::Flat(0, 1)));
    }

    #[test]
    fn test_portal_edge_count_k_times_k_minus_1() {
        let layers = vec![grid(1, 5, Token::Normal)];
        let mut portals = PortalTable::default();
        for j in 0..4 {
            portals.record("U7", 0, 0, j);
        }

        let graph =
            assemble(&layers, &portals, KeyMode::Flat, Vocabulary::Core).unwrap();
        let baseline =
            assemble(&[grid(1, 5, Token::Normal)], &PortalTable::default(), KeyMode::Flat, Vocabulary::Core)
                .unwrap();

        // k=4 -> 12 directed portal edges, minus the ones that coincide
        // with existing grid adjacency (3 adjacent pairs -> 6 edges).
        assert_eq!(graph.edge_count(), baseline.edge_count() + 12 - 6);
    }

    #[test]
    fn test_portal_unknown_cell_is_fatal() {
        let layers = vec![grid(2, 2, Token::Normal)];
        let mut portals = PortalTable::default();
        portals.record("Z9", 0, 5, 5);

        let result = assemble(&layers, &portals, KeyMode::Flat, Vocabulary::Core);
        assert!(matches!(result, Err(NavError::Assembly { .. })));
    }

    #[test]
    fn test_empty_flags_cell_still_materialized() {
        let mut layer = LayerGrid::default();
        layer.rows.push(vec![TokenFlags::EMPTY, TokenFlags::single(Token::Wall)]);

        let graph = assemble(&[layer], &PortalTable::default(), KeyMode::Flat, Vocabulary::Core)
            .unwrap();

        let cell = graph.get(CellKey::Flat(0, 0)).unwrap();
        assert!(cell.flags.is_empty());
        for token in Token::CORE {
            assert!(!cell.has(token));
        }
        assert_eq!(cell.neighbors.len(), 1);
    }

    #[test]
    fn test_link_teleports_pairs_floors() {
        // Floor 0 has TU at (2,3); floor 1 has TD at (2,3); floor 2 plain.
        let mut floors = vec![
            grid(4, 4, Token::Normal),
            grid(4, 4, Token::Normal),
            grid(4, 4, Token::Normal),
        ];
        floors[0].rows[2][3] = TokenFlags::single(Token::TeleportUp);
        floors[1].rows[2][3] = TokenFlags::single(Token::TeleportDown);

        let mut graph =
            assemble(&floors, &PortalTable::default(), KeyMode::Stacked, Vocabulary::Full)
                .unwrap();
        link_teleports(&mut graph);

        let lower = CellKey::Stacked(0, 2, 3);
        let upper = CellKey::Stacked(1, 2, 3);
        assert!(graph.neighbors(lower).unwrap().contains(&upper));
        assert!(graph.neighbors(upper).unwrap().contains(&lower));

        // Floor 2 declared nothing: no edge up from floor 1 or down from 2.
        let top = CellKey::Stacked(2, 2, 3);
        assert!(!graph.neighbors(upper).unwrap().contains(&top));
        assert!(!graph.neighbors(top).unwrap().contains(&upper));
    }

    #[test]
    fn test_link_teleports_missing_floor_is_silent() {
        let mut floors = vec![grid(2, 2, Token::Normal)];
        floors[0].rows[0][0] = TokenFlags::single(Token::TeleportDown);
        floors[0].rows[1][1] = TokenFlags::single(Token::TeleportUp);

        let mut graph =
            assemble(&floors, &PortalTable::default(), KeyMode::Stacked, Vocabulary::Full)
                .unwrap();
        let edges_before = graph.edge_count();
        link_teleports(&mut graph);

        assert_eq!(graph.edge_count(), edges_before);
    }
}
