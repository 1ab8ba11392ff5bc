use alloc::string::String;
use thiserror::Error;

use crate::FuryId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board dimensions must be at least 1x1, got {rows}x{cols}")]
    InvalidDimensions { rows: u16, cols: u16 },
    #[error("Item density must be within 0..=100, got {0}")]
    InvalidDensity(u8),
    #[error("Unknown item ratio {0:?}")]
    UnknownRatio(String),
    #[error("Board layout rows have mismatched lengths")]
    InvalidBoardShape,
    #[error("Unknown board layout symbol {0:?}")]
    UnknownSymbol(char),
    #[error("Unknown echo {0:?}")]
    UnknownEcho(String),
    #[error("Unknown fury {0:?}")]
    UnknownFury(FuryId),
    #[error("No level definition for level {0}")]
    UnknownLevel(u32),
}

pub type Result<T> = core::result::Result<T, GameError>;
