//! Ordered token palettes and nearest-colour classification.
//!
//! A palette is an ordered list, not a map: classification ties are broken
//! by the first-declared entry, so declaration order is part of the
//! contract.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{NavError, Result};

use super::token::{Token, Vocabulary};
use super::Colour;

/// An ordered collection of token colours.
#[derive(Debug, Clone)]
pub struct Palette {
    entries: Vec<(Token, Colour)>,
}

impl Palette {
    /// The core six-token palette used for text rendering and plain scans.
    pub fn core() -> Self {
        Self {
            entries: vec![
                (Token::Wall, Colour::rgb(0, 0, 0)),
                (Token::Normal, Colour::rgb(191, 227, 240)),
                (Token::Safe, Colour::rgb(92, 184, 92)),
                (Token::Bottleneck, Colour::rgb(33, 59, 143)),
                (Token::Fire, Colour::rgb(217, 83, 79)),
                (Token::Spawn, Colour::rgb(91, 192, 222)),
            ],
        }
    }

    /// The full ten-token palette written by the map editor.
    pub fn full() -> Self {
        let mut palette = Self::core();
        palette.entries.extend([
            (Token::StairsDown, Colour::rgb(0x7F, 0x3B, 0x08)),
            (Token::StairsUp, Colour::rgb(0xB3, 0x58, 0x06)),
            (Token::TeleportDown, Colour::rgb(0x01, 0x66, 0x5E)),
            (Token::TeleportUp, Colour::rgb(0x35, 0x97, 0x8F)),
        ]);
        palette
    }

    /// The vocabulary implied by this palette's entries.
    pub fn vocabulary(&self) -> Vocabulary {
        let extended = self
            .entries
            .iter()
            .any(|(t, _)| !Token::CORE.contains(t));
        if extended {
            Vocabulary::Full
        } else {
            Vocabulary::Core
        }
    }

    /// Get the colour assigned to a token.
    pub fn colour(&self, token: Token) -> Option<Colour> {
        self.entries
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, c)| *c)
    }

    /// Tokens in declaration order.
    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.entries.iter().map(|(t, _)| *t)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the palette has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Classify a colour to the nearest palette entry by squared RGB
    /// distance. Ties keep the first-declared entry (strict `<` below).
    pub fn nearest(&self, colour: Colour) -> Token {
        debug_assert!(!self.entries.is_empty());

        let mut best = self.entries[0].0;
        let mut best_dist = colour.distance_sq(self.entries[0].1);
        for &(token, entry) in &self.entries[1..] {
            let dist = colour.distance_sq(entry);
            if dist < best_dist {
                best = token;
                best_dist = dist;
            }
        }
        best
    }

    /// Apply colour overrides, keeping declaration order.
    ///
    /// Overrides for known tokens replace the colour in place; overrides
    /// for tokens the palette does not yet carry are appended.
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<Token, Colour>) {
        for (&token, &colour) in overrides {
            match self.entries.iter_mut().find(|(t, _)| *t == token) {
                Some(entry) => entry.1 = colour,
                None => self.entries.push((token, colour)),
            }
        }
    }
}

/// Load a palette override file: a JSON object mapping token codes to hex
/// colour strings, e.g. `{"W": "#000000", "F": "#D9534F"}`.
pub fn load_palette_overrides(path: &Path) -> Result<BTreeMap<Token, Colour>> {
    let source = std::fs::read_to_string(path).map_err(|e| NavError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to read palette file: {}", e),
    })?;

    let raw: BTreeMap<String, String> =
        serde_json::from_str(&source).map_err(|e| NavError::Parse {
            message: format!("Invalid palette file {}: {}", path.display(), e),
            help: Some("Expected a JSON object of token codes to hex colours".to_string()),
        })?;

    let mut overrides = BTreeMap::new();
    for (code, hex) in raw {
        let token = Token::from_code(&code).ok_or_else(|| NavError::Parse {
            message: format!("Unknown token code in palette file: {}", code),
            help: Some("Valid codes are W, N, S, B, F, P, SD, SU, TD, TU".to_string()),
        })?;
        overrides.insert(token, Colour::from_hex(&hex)?);
    }

    Ok(overrides)
}
