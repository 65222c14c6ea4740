//! Cell category tokens and per-cell flag sets.
//!
//! Every addressable cell carries one flag per token in its format's
//! vocabulary. Flags live in a fixed-order bit set so that iteration and
//! serialization are deterministic.

use std::fmt;

/// A cell category code.
///
/// The first six tokens form the core vocabulary shared by the text and
/// raster formats; the stair/teleport tokens only occur in raster maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Token {
    /// `W` - wall
    Wall,
    /// `N` - walkable
    Normal,
    /// `S` - safe / exit
    Safe,
    /// `B` - bottleneck / door
    Bottleneck,
    /// `F` - fire
    Fire,
    /// `P` - spawn
    Spawn,
    /// `SD` - stairs-down area
    StairsDown,
    /// `SU` - stairs-up area
    StairsUp,
    /// `TD` - teleport down
    TeleportDown,
    /// `TU` - teleport up
    TeleportUp,
}

impl Token {
    /// All tokens, in declaration order.
    pub const ALL: [Token; 10] = [
        Token::Wall,
        Token::Normal,
        Token::Safe,
        Token::Bottleneck,
        Token::Fire,
        Token::Spawn,
        Token::StairsDown,
        Token::StairsUp,
        Token::TeleportDown,
        Token::TeleportUp,
    ];

    /// The core vocabulary shared by every input format.
    pub const CORE: [Token; 6] = [
        Token::Wall,
        Token::Normal,
        Token::Safe,
        Token::Bottleneck,
        Token::Fire,
        Token::Spawn,
    ];

    /// The short code used in text grids and palette files.
    pub fn code(self) -> &'static str {
        match self {
            Token::Wall => "W",
            Token::Normal => "N",
            Token::Safe => "S",
            Token::Bottleneck => "B",
            Token::Fire => "F",
            Token::Spawn => "P",
            Token::StairsDown => "SD",
            Token::StairsUp => "SU",
            Token::TeleportDown => "TD",
            Token::TeleportUp => "TU",
        }
    }

    /// Look up a token by its short code.
    pub fn from_code(code: &str) -> Option<Token> {
        Token::ALL.iter().copied().find(|t| t.code() == code)
    }

    fn bit(self) -> u16 {
        1 << self as u8
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The set of tokens a graph exposes a boolean flag for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    /// `W N S B F P`
    Core,
    /// Core plus `SD SU TD TU`
    Full,
}

impl Vocabulary {
    /// The tokens in this vocabulary, in declaration order.
    pub fn tokens(self) -> &'static [Token] {
        match self {
            Vocabulary::Core => &Token::CORE,
            Vocabulary::Full => &Token::ALL,
        }
    }
}

/// Fixed-order set of category flags for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TokenFlags(u16);

impl TokenFlags {
    /// The empty flag set (all categories false).
    pub const EMPTY: Self = Self(0);

    /// A set with exactly one flag raised.
    pub fn single(token: Token) -> Self {
        Self(token.bit())
    }

    /// Raise a flag.
    pub fn set(&mut self, token: Token) {
        self.0 |= token.bit();
    }

    /// Check a flag.
    pub fn has(self, token: Token) -> bool {
        self.0 & token.bit() != 0
    }

    /// True when no flag is raised.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raised flags in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Token> {
        Token::ALL.into_iter().filter(move |t| self.has(*t))
    }

    /// First raised flag among `priority`, if any.
    pub fn first_of(self, priority: &[Token]) -> Option<Token> {
        priority.iter().copied().find(|t| self.has(*t))
    }
}
