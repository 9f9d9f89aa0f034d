//! Time-sampled values.
//!
//! Curve evaluation proper belongs to the animation importer; this module only models what mesh
//! conversion asks of it: "what is this value at time `t`" and "does it change within
//! `[start, end]`".

use std::collections::BTreeMap;

use nalgebra::Matrix4;

use crate::document::Source;

/// Values which can be linearly interpolated between keyframes.
pub trait Interpolate: Copy + PartialEq {
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Interpolate for Matrix4<f32> {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Matrix4::lerp(self, other, t)
    }
}

/// A keyframed value, interpolated linearly and clamped to its first and last keys.
///
/// # Invariants
///
/// * `times.len() == values.len()`
/// * `times` is sorted in ascending order
#[derive(Debug, Clone, PartialEq)]
pub struct Track<T> {
    times: Vec<f32>,
    values: Vec<T>,
}

impl<T: Interpolate> Track<T> {
    /// Construct a track from `(time, value)` keys, which are sorted by time.
    pub fn new(keys: impl IntoIterator<Item = (f32, T)>) -> Self {
        let mut keys: Vec<(f32, T)> = keys.into_iter().collect();
        keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (times, values) = keys.into_iter().unzip();
        Self { times, values }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Evaluate the track at `t`; `None` if the track has no keys.
    pub fn sample(&self, t: f32) -> Option<T> {
        let (first, last) = (*self.times.first()?, *self.times.last()?);
        if t <= first {
            return self.values.first().copied();
        }
        if t >= last {
            return self.values.last().copied();
        }
        // first key strictly after t; 1 <= i < len
        let i = self.times.partition_point(|&k| k <= t);
        let (t0, t1) = (self.times[i - 1], self.times[i]);
        let f = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
        Some(self.values[i - 1].lerp(&self.values[i], f))
    }

    /// Whether the value changes anywhere within `[start, end]`.
    pub fn is_animated(&self, start: f32, end: f32) -> bool {
        if self.times.len() < 2 || end < start {
            return false;
        }
        let (first, last) = (self.times[0], self.times[self.times.len() - 1]);
        if last < start || first > end {
            return false;
        }
        self.values.windows(2).any(|pair| pair[0] != pair[1])
    }
}

/// A value which may be driven by a [Track].
#[derive(Debug, Clone, PartialEq)]
pub struct Animated<T> {
    value: T,
    track: Option<Track<T>>,
}

pub type AnimatedFloat = Animated<f32>;

impl<T: Interpolate> Animated<T> {
    #[inline]
    pub fn constant(value: T) -> Self {
        Self { value, track: None }
    }

    /// A value driven by `track`; `value` is used wherever the track has no keys.
    #[inline]
    pub fn with_track(value: T, track: Track<T>) -> Self {
        Self {
            value,
            track: Some(track),
        }
    }

    pub fn value_at(&self, t: f32) -> T {
        self.track
            .as_ref()
            .and_then(|track| track.sample(t))
            .unwrap_or(self.value)
    }

    pub fn is_animated(&self, start: f32, end: f32) -> bool {
        self.track
            .as_ref()
            .is_some_and(|track| track.is_animated(start, end))
    }
}

impl<T: Interpolate + Default> Default for Animated<T> {
    fn default() -> Self {
        Self::constant(T::default())
    }
}

/// The float array of a [Source], with any of its elements optionally driven by a [Track].
#[derive(Debug, Clone, Copy)]
pub struct AnimatedFloatList<'doc> {
    values: &'doc [f32],
    tracks: Option<&'doc BTreeMap<usize, Track<f32>>>,
}

impl<'doc> AnimatedFloatList<'doc> {
    /// View the float array of `source`; sources without float data (or no source at all)
    /// produce an empty list.
    pub fn new(source: Option<&'doc Source>) -> Self {
        match source {
            Some(source) => Self {
                values: source.floats().unwrap_or_default(),
                tracks: Some(source.animation()),
            },
            None => Self {
                values: &[],
                tracks: None,
            },
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Evaluate every element at `t`.
    pub fn values_at(&self, t: f32) -> Vec<f32> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                self.tracks
                    .and_then(|tracks| tracks.get(&i))
                    .and_then(|track| track.sample(t))
                    .unwrap_or(value)
            })
            .collect()
    }

    /// Whether any element changes within `[start, end]`.
    pub fn is_animated(&self, start: f32, end: f32) -> bool {
        self.tracks.is_some_and(|tracks| {
            tracks
                .iter()
                .any(|(&i, track)| i < self.values.len() && track.is_animated(start, end))
        })
    }
}
