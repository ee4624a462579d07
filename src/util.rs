//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use cgmath::num_traits::Float;
use serde::{Deserialize, Serialize};

/// An interval on the real number line.
///
/// Serialized as a two element array `[min, max]`, which is how input bounds
/// are written in vehicle parameter files.
#[derive(Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[T; 2]", into = "[T; 2]")]
pub struct Interval<T: Copy> {
    pub min: T,
    pub max: T,
}

impl<T: Copy> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Gets the interval as an array.
    pub fn as_array(&self) -> [T; 2] {
        [self.min, self.max]
    }
}

impl<T: Copy> From<[T; 2]> for Interval<T> {
    fn from([min, max]: [T; 2]) -> Self {
        Self { min, max }
    }
}

impl<T: Copy> From<Interval<T>> for [T; 2] {
    fn from(interval: Interval<T>) -> Self {
        interval.as_array()
    }
}

impl<T: Copy + PartialOrd> Interval<T> {
    /// Returns true if this interval contains the value.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }

    /// Returns true if `min <= max`.
    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

impl<T: Copy + std::ops::Sub<T, Output = T>> Interval<T> {
    /// Gets the magnitude of the interval.
    pub fn length(&self) -> T {
        self.max - self.min
    }
}

impl<T: Float> Interval<T> {
    /// Saturates `value` to the interval. NaN saturates to `min`.
    pub fn clamp(&self, value: T) -> T {
        if value.is_nan() {
            self.min
        } else {
            value.max(self.min).min(self.max)
        }
    }

    pub fn lerp(&self, t: T) -> T {
        self.min + t * (self.max - self.min)
    }

    pub fn inv_lerp(&self, value: T) -> T {
        (value - self.min) / (self.max - self.min)
    }
}

impl<T: Copy + Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

#[cfg(test)]
mod test {
    use super::Interval;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn clamp_saturates() {
        let range = Interval::new(-1.0, 1.0);
        assert_eq!(range.clamp(3.0), 1.0);
        assert_eq!(range.clamp(-7.5), -1.0);
        assert_eq!(range.clamp(0.25), 0.25);
        assert_eq!(range.clamp(f64::NAN), -1.0);
    }

    #[test]
    fn lerp_and_inverse() {
        let range: Interval<f64> = Interval::new(-0.5, 0.5);
        assert_approx_eq!(range.lerp(0.0), -0.5);
        assert_approx_eq!(range.lerp(1.0), 0.5);
        assert_approx_eq!(range.inv_lerp(0.25), 0.75);
    }

    #[test]
    fn serializes_as_array() {
        let range = Interval::new(0.0, 1.0);
        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(json, "[0.0,1.0]");
        let back: Interval<f64> = serde_json::from_str("[-2.0, 3.5]").unwrap();
        assert_eq!(back, Interval::new(-2.0, 3.5));
    }
}
