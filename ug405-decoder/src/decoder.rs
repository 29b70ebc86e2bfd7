//! Main decoder API
//!
//! `DecodedFrame` is the entry point for turning one raw status frame into
//! detector readings. It carries the reordered symbols; the detector count is
//! supplied by the caller, which learns it from the first valid frame.

use crate::frame::{self, PLANE_COUNT};
use crate::types::{DetectorReading, DetectorSymbol, FrameError};

/// A successfully decoded status frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    /// Symbols in device order, as taken from the first quarter
    raw_symbols: Vec<DetectorSymbol>,
    /// Symbols in detector order (pairs swapped)
    symbols: Vec<DetectorSymbol>,
}

impl DecodedFrame {
    /// Decode a raw frame
    ///
    /// # Returns
    /// * `Ok(DecodedFrame)` with at least one symbol
    /// * `Err(FrameError)` if the frame is absent or malformed
    ///
    /// # Example
    /// ```
    /// use ug405_decoder::DecodedFrame;
    ///
    /// let frame = DecodedFrame::decode(Some("0x1032000000000000")).unwrap();
    /// assert_eq!(frame.len(), 4);
    /// let active: Vec<bool> = frame.light(4).iter().map(|r| r.active).collect();
    /// assert_eq!(active, vec![false, true, true, true]);
    /// ```
    pub fn decode(raw: Option<&str>) -> Result<Self, FrameError> {
        let raw_symbols = frame::try_parse_symbols(raw)?;
        let symbols = frame::reorder(&raw_symbols);
        Ok(Self {
            raw_symbols,
            symbols,
        })
    }

    /// Number of detectors present in this frame
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in device order
    pub fn raw_symbols(&self) -> &[DetectorSymbol] {
        &self.raw_symbols
    }

    /// Symbols in detector order
    pub fn symbols(&self) -> &[DetectorSymbol] {
        &self.symbols
    }

    /// Flat status view of the first `detector_count` detectors
    ///
    /// Frames shorter than `detector_count` produce fewer readings.
    pub fn light(&self, detector_count: usize) -> Vec<DetectorReading> {
        self.visible(detector_count)
            .iter()
            .enumerate()
            .map(|(i, &symbol)| DetectorReading {
                position: i + 1,
                symbol,
                active: frame::status_of(symbol),
            })
            .collect()
    }

    /// Bit-plane view of the first `detector_count` detectors
    ///
    /// Each plane lists the same positions and symbols; `active` is the
    /// plane's bit for that detector.
    pub fn full(&self, detector_count: usize) -> [Vec<DetectorReading>; PLANE_COUNT] {
        let visible = self.visible(detector_count);
        let planes = frame::binary_planes(visible);

        planes.map(|bits| {
            bits.into_iter()
                .zip(visible)
                .enumerate()
                .map(|(i, (active, &symbol))| DetectorReading {
                    position: i + 1,
                    symbol,
                    active,
                })
                .collect()
        })
    }

    fn visible(&self, detector_count: usize) -> &[DetectorSymbol] {
        &self.symbols[..detector_count.min(self.symbols.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_example_frame() {
        let frame = DecodedFrame::decode(Some("0x1032000000000000")).unwrap();
        let raw: String = frame.raw_symbols().iter().map(|s| s.as_char()).collect();
        let ordered: String = frame.symbols().iter().map(|s| s.as_char()).collect();
        assert_eq!(raw, "1032");
        assert_eq!(ordered, "0123");

        let readings = frame.light(4);
        let positions: Vec<usize> = readings.iter().map(|r| r.position).collect();
        let active: Vec<bool> = readings.iter().map(|r| r.active).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
        assert_eq!(active, vec![false, true, true, true]);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert_eq!(DecodedFrame::decode(Some("garbage")), Err(FrameError::MissingPrefix));
        assert_eq!(DecodedFrame::decode(None), Err(FrameError::Absent));
    }

    #[test]
    fn test_light_truncates_to_detector_count() {
        let frame = DecodedFrame::decode(Some("0x10320000000000000000000000000000")).unwrap();
        assert_eq!(frame.len(), 8);
        assert_eq!(frame.light(4).len(), 4);
        // Fewer symbols than the learned count: nothing is invented
        assert_eq!(frame.light(20).len(), 8);
    }

    #[test]
    fn test_full_keeps_symbol_and_uses_plane_bit() {
        // reordered: ['8', '1']
        let frame = DecodedFrame::decode(Some("0x18000000")).unwrap();
        let planes = frame.full(2);

        assert_eq!(planes.len(), 4);
        let plane0: Vec<(char, bool)> = planes[0].iter().map(|r| (r.symbol.as_char(), r.active)).collect();
        let plane3: Vec<(char, bool)> = planes[3].iter().map(|r| (r.symbol.as_char(), r.active)).collect();
        assert_eq!(plane0, vec![('8', false), ('1', true)]);
        assert_eq!(plane3, vec![('8', true), ('1', false)]);
        assert!(planes.iter().all(|p| p.iter().map(|r| r.position).eq(1..=2)));
    }
}
