//! Frame Decoding Engine
//!
//! Turns the packed hex string returned by the controller into detector
//! symbols and the views derived from them.
//!
//! Frame layout after the `0x` prefix: four equal quarters. Only the first
//! quarter (one hex digit per detector) is consumed; the other three carry
//! data this decoder does not interpret.

use crate::types::{DetectorSymbol, FrameError};

/// Prefix every well-formed frame starts with
pub const FRAME_PREFIX: &str = "0x";

/// Marker the device stack produces for a missing value
const NONE_MARKER: &str = "None";

/// Number of bit planes in full mode
pub const PLANE_COUNT: usize = 4;

/// Extract detector symbols, reporting why a frame was rejected
///
/// The prefix is checked on the frame as received, before whitespace is
/// stripped.
pub fn try_parse_symbols(raw: Option<&str>) -> Result<Vec<DetectorSymbol>, FrameError> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() && raw != NONE_MARKER => raw,
        _ => return Err(FrameError::Absent),
    };

    if !raw.starts_with(FRAME_PREFIX) {
        return Err(FrameError::MissingPrefix);
    }

    let digits: Vec<char> = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .skip(FRAME_PREFIX.len())
        .collect();

    let quarter = digits.len() / 4;
    if quarter == 0 {
        return Err(FrameError::EmptyQuarter);
    }

    Ok(digits[..quarter].iter().copied().map(DetectorSymbol::from).collect())
}

/// Extract detector symbols; malformed or absent frames give an empty sequence
pub fn parse_symbols(raw: Option<&str>) -> Vec<DetectorSymbol> {
    match try_parse_symbols(raw) {
        Ok(symbols) => symbols,
        Err(e) => {
            log::debug!("Frame rejected: {}", e);
            Vec::new()
        }
    }
}

/// Swap every adjacent pair: 2,1,4,3,6,5...
///
/// A trailing unpaired element keeps its position. Applying it twice to an
/// even-length sequence gives back the input.
pub fn reorder<T: Clone>(symbols: &[T]) -> Vec<T> {
    symbols
        .chunks(2)
        .flat_map(|pair| pair.iter().rev().cloned())
        .collect()
}

/// `false` (idle) iff the symbol is the character `'0'`
pub fn status_of(symbol: DetectorSymbol) -> bool {
    symbol.is_active()
}

/// Transpose the symbols' bit-reversed nibbles into four rows
///
/// Plane `p` holds bit `p` of every symbol, in symbol order.
pub fn binary_planes(symbols: &[DetectorSymbol]) -> [Vec<bool>; PLANE_COUNT] {
    let encoded: Vec<[bool; 4]> = symbols.iter().map(|s| s.nibble_bits()).collect();

    std::array::from_fn(|plane| encoded.iter().map(|bits| bits[plane]).collect())
}
