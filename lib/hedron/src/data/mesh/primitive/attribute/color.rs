use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

use meshweld_common::{impl_add_sub, impl_mul_div};

/// An 8-bit-per-channel RGBA color.
///
/// Arithmetic saturates at the bounds of each channel rather than wrapping, so that weighted
/// sums of colors (as produced by morph blending) stay meaningful.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba8(pub [u8; 4]);

static_assertions::assert_eq_size!(Rgba8, [u8; 4]);

impl Default for Rgba8 {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Rgba8 {
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    pub const WHITE: Self = Self([255, 255, 255, 255]);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// Convert from normalized floating point channels, clamping each to `[0, 1]`.
    pub fn from_f32(rgba: [f32; 4]) -> Self {
        Self(rgba.map(|c| quantize(c * 255.0)))
    }

    /// Convert to normalized floating point channels.
    pub fn to_f32(self) -> [f32; 4] {
        self.0.map(|c| c as f32 / 255.0)
    }

    #[inline]
    pub const fn r(self) -> u8 {
        self.0[0]
    }
    #[inline]
    pub const fn g(self) -> u8 {
        self.0[1]
    }
    #[inline]
    pub const fn b(self) -> u8 {
        self.0[2]
    }
    #[inline]
    pub const fn a(self) -> u8 {
        self.0[3]
    }

    /// Apply `f` to every channel as a float, then round and clamp the result.
    #[inline]
    fn map_f32(self, f: impl Fn(f32) -> f32) -> Self {
        Self(self.0.map(|c| quantize(f(c as f32))))
    }

    #[inline]
    fn zip(self, rhs: Self, f: impl Fn(u8, u8) -> u8) -> Self {
        let mut res = self.0;
        for (lhs, rhs) in res.iter_mut().zip(rhs.0) {
            *lhs = f(*lhs, rhs);
        }
        Self(res)
    }
}

#[inline]
fn quantize(c: f32) -> u8 {
    // NaN saturates to 0
    c.round().clamp(0.0, 255.0) as u8
}

impl_mul_div!(lhs: Rgba8, rhs: f32;
    lhs.map_f32(|c| c * rhs);
    lhs.map_f32(|c| c / rhs));

impl_add_sub!(lhs: Rgba8, rhs: Rgba8;
    lhs.zip(rhs, u8::saturating_add);
    lhs.zip(rhs, u8::saturating_sub));

impl From<[u8; 4]> for Rgba8 {
    fn from(value: [u8; 4]) -> Self {
        Self(value)
    }
}

impl From<Rgba8> for [u8; 4] {
    fn from(value: Rgba8) -> Self {
        value.0
    }
}
