//! PNG scanline filters (None, Sub, Up, Average, Paeth)
//!
//! The decoder must reconstruct every filter type since other encoders may
//! have produced the input. The encoder applies filter type 0 unless adaptive
//! selection is requested.

use crate::error::DecodeError;

/// The five PNG filter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterType {
    None = 0,
    Sub = 1,
    Up = 2,
    Average = 3,
    Paeth = 4,
}

impl FilterType {
    pub const ALL: [FilterType; 5] =
        [FilterType::None, FilterType::Sub, FilterType::Up, FilterType::Average, FilterType::Paeth];

    pub fn from_byte(byte: u8) -> Result<Self, DecodeError> {
        match byte {
            0 => Ok(FilterType::None),
            1 => Ok(FilterType::Sub),
            2 => Ok(FilterType::Up),
            3 => Ok(FilterType::Average),
            4 => Ok(FilterType::Paeth),
            other => Err(DecodeError::UnsupportedFilter(other)),
        }
    }
}

/// Paeth predictor: whichever of `a` (left), `b` (above), `c` (upper-left) is
/// closest to `a + b - c`. Ties go to `a`, then `b`.
pub fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let pa = (p - a as i16).abs();
    let pb = (p - b as i16).abs();
    let pc = (p - c as i16).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/// Undo a filter on one scanline.
///
/// `prev` is the previous *reconstructed* scanline, or `None` for the first row.
pub fn reconstruct(
    filter: u8,
    scanline: &[u8],
    prev: Option<&[u8]>,
    bpp: usize,
) -> Result<Vec<u8>, DecodeError> {
    let filter = FilterType::from_byte(filter)?;
    let mut out = vec![0u8; scanline.len()];

    for i in 0..scanline.len() {
        let x = scanline[i];
        let a = if i >= bpp { out[i - bpp] } else { 0 };
        let b = prev.and_then(|p| p.get(i).copied()).unwrap_or(0);
        let c = if i >= bpp { prev.and_then(|p| p.get(i - bpp).copied()).unwrap_or(0) } else { 0 };

        out[i] = match filter {
            FilterType::None => x,
            FilterType::Sub => x.wrapping_add(a),
            FilterType::Up => x.wrapping_add(b),
            FilterType::Average => x.wrapping_add(((a as u16 + b as u16) / 2) as u8),
            FilterType::Paeth => x.wrapping_add(paeth(a, b, c)),
        };
    }

    Ok(out)
}

/// Apply a filter to one raw scanline. Inverse of [`reconstruct`].
pub fn apply(filter: FilterType, raw: &[u8], prev: Option<&[u8]>, bpp: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());

    for i in 0..raw.len() {
        let x = raw[i];
        let a = if i >= bpp { raw[i - bpp] } else { 0 };
        let b = prev.and_then(|p| p.get(i).copied()).unwrap_or(0);
        let c = if i >= bpp { prev.and_then(|p| p.get(i - bpp).copied()).unwrap_or(0) } else { 0 };

        out.push(match filter {
            FilterType::None => x,
            FilterType::Sub => x.wrapping_sub(a),
            FilterType::Up => x.wrapping_sub(b),
            FilterType::Average => x.wrapping_sub(((a as u16 + b as u16) / 2) as u8),
            FilterType::Paeth => x.wrapping_sub(paeth(a, b, c)),
        });
    }

    out
}

/// Pick the filter minimizing the sum of absolute signed residuals.
///
/// Returns the chosen type and the filtered bytes. Ties go to the lower type.
pub fn apply_adaptive(raw: &[u8], prev: Option<&[u8]>, bpp: usize) -> (FilterType, Vec<u8>) {
    let mut best: Option<(u64, FilterType, Vec<u8>)> = None;

    for filter in FilterType::ALL {
        let filtered = apply(filter, raw, prev, bpp);
        let score: u64 = filtered.iter().map(|&v| (v as i8).unsigned_abs() as u64).sum();
        if best.as_ref().map_or(true, |(s, _, _)| score < *s) {
            best = Some((score, filter, filtered));
        }
    }

    match best {
        Some((_, filter, filtered)) => (filter, filtered),
        None => (FilterType::None, raw.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paeth_reference_vectors() {
        // p = 15, pa = 5, pb = 5, pc = 0
        assert_eq!(paeth(10, 20, 15), 15);
        // all zero
        assert_eq!(paeth(0, 0, 0), 0);
        // a != b == c: p = a, pa = 0
        assert_eq!(paeth(7, 3, 3), 7);
        // b != a == c: p = b, pb = 0
        assert_eq!(paeth(3, 7, 3), 7);
        // a == b != c: p = 2a - c
        assert_eq!(paeth(5, 5, 9), 5);
        // tie between a and b goes to a
        assert_eq!(paeth(10, 20, 30), 10);
        // extremes
        assert_eq!(paeth(255, 0, 255), 0);
        assert_eq!(paeth(0, 255, 255), 0);
    }

    #[test]
    fn test_reconstruct_none() {
        let out = reconstruct(0, &[1, 2, 3], None, 1).unwrap();
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    fn test_reconstruct_sub_wraps() {
        // bpp = 1: each byte adds the reconstructed left byte
        let out = reconstruct(1, &[200, 100, 1], None, 1).unwrap();
        assert_eq!(out, vec![200, 44, 45]);
    }

    #[test]
    fn test_reconstruct_up() {
        let prev = [10, 20, 30];
        let out = reconstruct(2, &[1, 2, 3], Some(&prev[..]), 1).unwrap();
        assert_eq!(out, vec![11, 22, 33]);

        // No previous row means b = 0
        let out = reconstruct(2, &[1, 2, 3], None, 1).unwrap();
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    fn test_reconstruct_average() {
        let prev = [10, 20];
        // i=0: a=0, b=10 -> 5 + 5 = 10
        // i=1: a=10, b=20 -> 15 + 1 = 16
        let out = reconstruct(3, &[5, 1], Some(&prev[..]), 1).unwrap();
        assert_eq!(out, vec![10, 16]);
    }

    #[test]
    fn test_reconstruct_paeth_uses_upper_left() {
        let prev = [15, 15];
        // i=0: a=0, b=15, c=0 -> p=15 -> b
        // i=1: a=16, b=15, c=15 -> p=16 -> a
        let out = reconstruct(4, &[1, 1], Some(&prev[..]), 1).unwrap();
        assert_eq!(out, vec![16, 17]);
    }

    #[test]
    fn test_reconstruct_unknown_filter() {
        let err = reconstruct(5, &[0], None, 1).unwrap_err();
        assert_eq!(err, DecodeError::UnsupportedFilter(5));
    }

    #[test]
    fn test_apply_reconstruct_inverse_all_filters() {
        let prev: Vec<u8> = (0..16).map(|i| (i * 37 % 256) as u8).collect();
        let raw: Vec<u8> = (0..16).map(|i| (255 - i * 11) as u8).collect();

        for filter in FilterType::ALL {
            let filtered = apply(filter, &raw, Some(&prev[..]), 4);
            let back = reconstruct(filter as u8, &filtered, Some(&prev[..]), 4).unwrap();
            assert_eq!(back, raw, "filter {:?}", filter);
        }
    }

    #[test]
    fn test_apply_adaptive_prefers_sub_on_gradient() {
        let raw: Vec<u8> = (0..32).map(|i| i as u8 * 4).collect();
        let (filter, filtered) = apply_adaptive(&raw, None, 1);
        assert_eq!(filter, FilterType::Sub);
        assert!(filtered[1..].iter().all(|&b| b == 4));
    }

    #[test]
    fn test_apply_adaptive_flat_row_is_none() {
        let (filter, _) = apply_adaptive(&[0, 0, 0, 0], None, 1);
        assert_eq!(filter, FilterType::None);
    }
}
