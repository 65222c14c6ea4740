//! The navigable spatial graph handed to the simulation engine.
//!
//! This is the sole contract the external simulation depends on: a mapping
//! from cell key to an attribute record with boolean category accessors
//! and a neighbor set. Graphs are built once by a parser and treated as
//! immutable snapshots afterwards.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{json, Value};

use super::key::CellKey;
use super::token::{Token, TokenFlags, Vocabulary};

/// Attributes of a single cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellAttrs {
    /// Category flags; complete for the graph's vocabulary, never absent.
    pub flags: TokenFlags,
    /// Room identifier, when room metadata was supplied.
    pub room: Option<String>,
    /// Room display name, when room metadata was supplied.
    pub room_name: Option<String>,
    /// Keys reachable by one adjacency step. Never null, may be empty.
    pub neighbors: BTreeSet<CellKey>,
}

impl CellAttrs {
    /// Create attributes with the given flags and no neighbors.
    pub fn new(flags: TokenFlags) -> Self {
        Self {
            flags,
            ..Self::default()
        }
    }

    /// Check a category flag.
    pub fn has(&self, token: Token) -> bool {
        self.flags.has(token)
    }
}

/// A key -> attributes graph over one parsed map.
#[derive(Debug, Clone)]
pub struct NavGraph {
    vocabulary: Vocabulary,
    cells: BTreeMap<CellKey, CellAttrs>,
}

impl NavGraph {
    /// Create an empty graph with the given vocabulary.
    pub(crate) fn new(vocabulary: Vocabulary) -> Self {
        Self {
            vocabulary,
            cells: BTreeMap::new(),
        }
    }

    /// Materialize a cell. Existing cells are never overwritten.
    pub(crate) fn insert(&mut self, key: CellKey, attrs: CellAttrs) {
        self.cells.entry(key).or_insert(attrs);
    }

    pub(crate) fn get_mut(&mut self, key: CellKey) -> Option<&mut CellAttrs> {
        self.cells.get_mut(&key)
    }

    /// Add a one-directional edge. Both endpoints must already exist.
    pub(crate) fn add_edge(&mut self, from: CellKey, to: CellKey) -> bool {
        if !self.cells.contains_key(&to) {
            return false;
        }
        match self.cells.get_mut(&from) {
            Some(cell) => {
                cell.neighbors.insert(to);
                true
            }
            None => false,
        }
    }

    /// The token vocabulary this graph exposes flags for.
    pub fn vocabulary(&self) -> Vocabulary {
        self.vocabulary
    }

    /// Look up a cell.
    pub fn get(&self, key: CellKey) -> Option<&CellAttrs> {
        self.cells.get(&key)
    }

    /// Check whether a cell exists.
    pub fn contains(&self, key: CellKey) -> bool {
        self.cells.contains_key(&key)
    }

    /// Check a cell's category flag; false for missing cells.
    pub fn has(&self, key: CellKey, token: Token) -> bool {
        self.get(key).is_some_and(|c| c.has(token))
    }

    /// A cell's neighbor set.
    pub fn neighbors(&self, key: CellKey) -> Option<&BTreeSet<CellKey>> {
        self.get(key).map(|c| &c.neighbors)
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the graph has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Total number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.cells.values().map(|c| c.neighbors.len()).sum()
    }

    /// Iterate cells in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&CellKey, &CellAttrs)> {
        self.cells.iter()
    }

    /// Iterate keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &CellKey> {
        self.cells.keys()
    }

    /// Export the graph as a JSON object keyed by `"r,c"` / `"z,r,c"`
    /// strings. Every vocabulary token appears as an explicit boolean.
    pub fn to_json(&self) -> Value {
        let mut cells = serde_json::Map::new();

        for (key, attrs) in &self.cells {
            let mut record = serde_json::Map::new();
            for &token in self.vocabulary.tokens() {
                record.insert(token.code().to_string(), json!(attrs.has(token)));
            }
            if let Some(room) = &attrs.room {
                record.insert("room".to_string(), json!(room));
            }
            if let Some(room_name) = &attrs.room_name {
                record.insert("room_name".to_string(), json!(room_name));
            }
            record.insert(
                "neighbors".to_string(),
                Value::Array(
                    attrs
                        .neighbors
                        .iter()
                        .map(|n| json!(n.to_string()))
                        .collect(),
                ),
            );
            cells.insert(key.to_string(), Value::Object(record));
        }

        Value::Object(cells)
    }
}
