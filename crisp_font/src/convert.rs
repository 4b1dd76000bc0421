//! Lossless numeric casts, grounded on `guise/src/convert.rs`'s `cast_*`
//! family. Kept as a full belt (not every cast sees use in every build) the
//! same way the teacher's module does.
#![allow(dead_code)]

use std::fmt::Debug;

/// Losslessly converts `n` to `u16` using `TryFrom` or panics.
///
/// # Panics
///
/// Panics if the conversion errors.
pub fn cast_u16<T>(n: T) -> u16
where
    T: TryInto<u16>,
    <T as TryInto<u16>>::Error: Debug,
{
    n.try_into().expect("Expected N to fit in u16")
}

/// Losslessly converts `n` to `u32` using `TryFrom` or panics.
///
/// # Panics
///
/// Panics if the conversion errors.
pub fn cast_u32<T>(n: T) -> u32
where
    T: TryInto<u32>,
    <T as TryInto<u32>>::Error: Debug,
{
    n.try_into().expect("Expected N to fit in u32")
}

/// Losslessly converts `n` to `usize` using `TryFrom` or panics.
///
/// # Panics
///
/// Panics if the conversion errors.
pub fn cast_usize<T>(n: T) -> usize
where
    T: TryInto<usize>,
    <T as TryInto<usize>>::Error: Debug,
{
    n.try_into().expect("Expected N to fit in usize")
}

/// Losslessly converts `n` to `i32` using `TryFrom` or panics.
///
/// # Panics
///
/// Panics if the conversion errors.
pub fn cast_i32<T>(n: T) -> i32
where
    T: TryInto<i32>,
    <T as TryInto<i32>>::Error: Debug,
{
    n.try_into().expect("Expected N to fit in i32")
}

/// Rounds `v` to the nearest whole pixel, matching the host rasterizer's
/// round-half-away-from-zero behavior used throughout the metrics contract.
pub fn round_px(v: f64) -> f64 {
    v.round()
}
