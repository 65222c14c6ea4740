//! Delimited text grid parser.
//!
//! Rows are lines, cells are `;`-separated, tokens within a cell are
//! `,`-separated. A blob containing `=== LAYER <name> ===` markers is
//! parsed as a stack of layers; otherwise it is a single flat grid.
//! Portal tokens (`Z1`, `E2`, `U3`, `P4`, ...) are pulled out of the cell
//! token set into a side table and later linked as a full mesh per id.

use std::sync::OnceLock;

use regex::Regex;

use crate::assemble::{assemble, KeyMode, LayerGrid, PortalTable};
use crate::error::{NavError, Result};
use crate::types::{Token, TokenFlags, Vocabulary};

use super::ParseOutcome;

fn layer_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^===\s*LAYER\s*(.*?)\s*===\s*$").unwrap())
}

fn portal_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[ZEUP][0-9]+$").unwrap())
}

/// Decoded text input, before assembly.
#[derive(Debug, Default)]
pub struct TextDecode {
    /// One grid per layer; a single grid in single-layer mode.
    pub layers: Vec<LayerGrid>,
    /// Portal id -> occurrence locations.
    pub portals: PortalTable,
    /// True when layer markers were present.
    pub multilayer: bool,
    /// Recoverable conditions encountered while decoding.
    pub warnings: Vec<String>,
}

/// Decode a text blob into per-layer grids and a portal table.
///
/// Ragged rows are kept as-is; blank lines are skipped. Unrecognized
/// tokens are dropped with a warning, which can leave a cell with an
/// empty category set. Fails with `EmptyInput` when no layer contains a
/// single non-blank row.
pub fn decode_text(source: &str) -> Result<TextDecode> {
    let source = source.replace("\r\n", "\n");

    let mut decode = TextDecode::default();

    let markers: Vec<_> = layer_marker().find_iter(&source).collect();
    decode.multilayer = !markers.is_empty();

    if decode.multilayer {
        // Text before the first marker is ignored, matching the original
        // format.
        for (z, window) in markers.windows(2).enumerate() {
            let block = &source[window[0].end()..window[1].start()];
            let grid = decode_layer(block, z, &mut decode.portals, &mut decode.warnings);
            decode.layers.push(grid);
        }
        let z = markers.len() - 1;
        let block = &source[markers[z].end()..];
        let grid = decode_layer(block, z, &mut decode.portals, &mut decode.warnings);
        decode.layers.push(grid);
    } else {
        let grid = decode_layer(&source, 0, &mut decode.portals, &mut decode.warnings);
        decode.layers.push(grid);
    }

    if decode.layers.iter().all(|layer| layer.is_empty()) {
        return Err(NavError::EmptyInput);
    }

    Ok(decode)
}

/// Decode one layer block into a grid, recording portals and warnings.
fn decode_layer(
    block: &str,
    z: usize,
    portals: &mut PortalTable,
    warnings: &mut Vec<String>,
) -> LayerGrid {
    let mut grid = LayerGrid::default();

    for line in block.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let mut row: Vec<TokenFlags> = Vec::new();
        for cell in line.split(';') {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }

            let mut flags = TokenFlags::EMPTY;
            for part in cell.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                if portal_token().is_match(part) {
                    portals.record(part, z, grid.rows.len(), row.len());
                } else if let Some(token) =
                    Token::from_code(part).filter(|t| Token::CORE.contains(t))
                {
                    flags.set(token);
                } else {
                    warnings.push(format!(
                        "unrecognized token '{}' at layer {}, row {}, col {}",
                        part,
                        z,
                        grid.rows.len(),
                        row.len()
                    ));
                }
            }
            row.push(flags);
        }

        if !row.is_empty() {
            grid.rows.push(row);
        }
    }

    grid
}

/// Parse a text blob all the way to a graph.
///
/// Single-layer input produces `(row, col)` keys; multi-layer input
/// produces `(layer, row, col)` keys. The vocabulary is the core token
/// set either way.
pub fn parse_text(source: &str) -> Result<ParseOutcome> {
    let decode = decode_text(source)?;

    let mode = if decode.multilayer {
        KeyMode::Stacked
    } else {
        KeyMode::Flat
    };
    let graph = assemble(&decode.layers, &decode.portals, mode, Vocabulary::Core)?;

    Ok(ParseOutcome {
        graph,
        warnings: decode.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellKey;

    #[test]
    fn test_single_layer_counts_and_flags() {
        let source = "W;N;S\nW;F;P\n";
        let outcome = parse_text(source).unwrap();
        let graph = &outcome.graph;

        assert_eq!(graph.len(), 6);
        assert!(graph.has(CellKey::Flat(0, 0), Token::Wall));
        assert!(graph.has(CellKey::Flat(0, 2), Token::Safe));
        assert!(graph.has(CellKey::Flat(1, 1), Token::Fire));
        assert!(graph.has(CellKey::Flat(1, 2), Token::Spawn));
        assert!(!graph.has(CellKey::Flat(0, 0), Token::Normal));
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_single_layer_adjacency_exact() {
        let source = "N;N;N\nN;N;N\nN;N;N\n";
        let graph = parse_text(source).unwrap().graph;

        let nbrs = graph.neighbors(CellKey::Flat(1, 1)).unwrap();
        assert_eq!(nbrs.len(), 4);
        let nbrs = graph.neighbors(CellKey::Flat(0, 0)).unwrap();
        assert_eq!(nbrs.len(), 2);
        assert!(nbrs.contains(&CellKey::Flat(0, 1)));
        assert!(nbrs.contains(&CellKey::Flat(1, 0)));
    }

    #[test]
    fn test_multi_token_cell() {
        let source = "N,P;W\n";
        let graph = parse_text(source).unwrap().graph;

        let cell = graph.get(CellKey::Flat(0, 0)).unwrap();
        assert!(cell.has(Token::Normal));
        assert!(cell.has(Token::Spawn));
        assert!(!cell.has(Token::Wall));
    }

    #[test]
    fn test_portal_extracted_from_cell() {
        // Portal tokens leave the main set; a portal-only cell has an
        // empty category set but still exists with all flags false.
        let source = "N,Z1;W\nZ1;N\n";
        let graph = parse_text(source).unwrap().graph;

        let origin = graph.get(CellKey::Flat(0, 0)).unwrap();
        assert!(origin.has(Token::Normal));

        let bare = graph.get(CellKey::Flat(1, 0)).unwrap();
        assert!(bare.flags.is_empty());

        // Mesh edge between the two Z1 occurrences.
        assert!(graph
            .neighbors(CellKey::Flat(0, 0))
            .unwrap()
            .contains(&CellKey::Flat(1, 0)));
        assert!(graph
            .neighbors(CellKey::Flat(1, 0))
            .unwrap()
            .contains(&CellKey::Flat(0, 0)));
    }

    #[test]
    fn test_multilayer_markers() {
        let source = "\
ignored preamble
=== LAYER ground ===
N;N
N;S
=== LAYER upper ===
N;N
";
        let outcome = parse_text(source).unwrap();
        let graph = &outcome.graph;

        assert_eq!(graph.len(), 6);
        assert!(graph.has(CellKey::Stacked(0, 1, 1), Token::Safe));
        assert!(graph.has(CellKey::Stacked(1, 0, 0), Token::Normal));
        // No implicit vertical adjacency between layers.
        assert!(!graph
            .neighbors(CellKey::Stacked(0, 0, 0))
            .unwrap()
            .contains(&CellKey::Stacked(1, 0, 0)));
    }

    #[test]
    fn test_multilayer_portals_cross_layers() {
        let source = "\
=== LAYER a ===
N;N,U3
=== LAYER b ===
U3;N
";
        let graph = parse_text(source).unwrap().graph;

        assert!(graph
            .neighbors(CellKey::Stacked(0, 0, 1))
            .unwrap()
            .contains(&CellKey::Stacked(1, 0, 0)));
    }

    #[test]
    fn test_layers_keep_independent_extents() {
        let source = "\
=== LAYER a ===
N;N;N
=== LAYER b ===
N
";
        let graph = parse_text(source).unwrap().graph;
        assert_eq!(graph.len(), 4);
        assert!(!graph.contains(CellKey::Stacked(1, 0, 1)));
    }

    #[test]
    fn test_crlf_normalized() {
        let source = "W;N\r\nN;S\r\n";
        let graph = parse_text(source).unwrap().graph;
        assert_eq!(graph.len(), 4);
        assert!(graph.has(CellKey::Flat(1, 1), Token::Safe));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse_text(""), Err(NavError::EmptyInput)));
        assert!(matches!(parse_text("\n  \n\n"), Err(NavError::EmptyInput)));
        assert!(matches!(
            parse_text("=== LAYER a ===\n\n"),
            Err(NavError::EmptyInput)
        ));
    }

    #[test]
    fn test_unrecognized_token_warns_and_drops() {
        let source = "N;Q;W\n";
        let outcome = parse_text(source).unwrap();

        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("'Q'"));
        let cell = outcome.graph.get(CellKey::Flat(0, 1)).unwrap();
        assert!(cell.flags.is_empty());
    }

    #[test]
    fn test_extended_codes_not_in_text_vocabulary() {
        // Stair/teleport tokens belong to the raster formats only; in text
        // they are unknown tokens.
        let outcome = parse_text("TD;N\n").unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome
            .graph
            .get(CellKey::Flat(0, 0))
            .unwrap()
            .flags
            .is_empty());
    }

    #[test]
    fn test_whitespace_and_empty_cells_dropped() {
        let source = "  W ; ; N , P \n";
        let graph = parse_text(source).unwrap().graph;

        // The empty cell between the separators is skipped entirely.
        assert_eq!(graph.len(), 2);
        assert!(graph.has(CellKey::Flat(0, 0), Token::Wall));
        let cell = graph.get(CellKey::Flat(0, 1)).unwrap();
        assert!(cell.has(Token::Normal));
        assert!(cell.has(Token::Spawn));
    }
}
