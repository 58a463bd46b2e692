//! Fixed-length pixel vector arithmetic.
//!
//! All operations take `[f32; N]` so both operands always have the same arity;
//! mixing a colour triple with an eight-channel geometry pixel does not compile.

/// Elementwise sum.
#[inline]
pub fn add<const N: usize>(a: [f32; N], b: [f32; N]) -> [f32; N] {
    std::array::from_fn(|i| a[i] + b[i])
}

/// Multiplies every component by `s`.
#[inline]
pub fn scale<const N: usize>(a: [f32; N], s: f32) -> [f32; N] {
    a.map(|v| v * s)
}

/// Euclidean distance normalized by `sqrt(N)`.
///
/// Two vectors whose components all differ by one unit are at distance 1.0,
/// which keeps the metric in roughly `[0, 1]` for normalized samples whatever
/// the vector length.
#[inline]
pub fn distance<const N: usize>(a: [f32; N], b: [f32; N]) -> f32 {
    let sum: f32 = a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum();
    (sum / N as f32).sqrt()
}

/// Copies the `N` components starting at `start` out of a pixel slice.
///
/// # Panics
///
/// Panics if `pixel` holds fewer than `start + N` samples. Callers check image
/// arity once up front (see `PixelFilter::input_channels`).
#[inline]
pub fn take<const N: usize>(pixel: &[f32], start: usize) -> [f32; N] {
    std::array::from_fn(|i| pixel[start + i])
}
