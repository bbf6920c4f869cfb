//! Miscellaneous utility structs and functions.

use std::cmp::Ordering;
use std::fmt::Debug;

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: PartialOrd> Interval<T> {
    /// Returns true if the interval contains the value, including its ends.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Interval<f64> {
    /// Linearly interpolates between the ends of the interval.
    pub fn lerp(&self, t: f64) -> f64 {
        self.min + t * (self.max - self.min)
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

/// A perceived object and its distance from the perceiving vehicle.
///
/// Ordered by distance, with ties broken by the object itself so that
/// distinct objects at the same distance never compare equal.
#[derive(Clone, Copy, Debug)]
pub struct DistancedObject<T> {
    /// The distance in m; negative if the object is partially behind.
    pub distance: f64,
    /// The perceived object.
    pub object: T,
}

impl<T> DistancedObject<T> {
    /// Creates a new distanced object.
    pub const fn new(distance: f64, object: T) -> Self {
        Self { distance, object }
    }
}

impl<T: Ord> Ord for DistancedObject<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.object.cmp(&other.object))
    }
}

impl<T: Ord> PartialOrd for DistancedObject<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Ord> PartialEq for DistancedObject<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T: Ord> Eq for DistancedObject<T> {}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn interval_lerp_spans_the_ends() {
        let tau = Interval::new(0.3, 1.3);
        assert_eq!(tau.lerp(0.0), 0.3);
        assert_eq!(tau.lerp(1.0), 1.3);
        assert!(tau.contains(0.8));
        assert!(!tau.contains(1.4));
    }

    #[test]
    fn distanced_objects_sort_by_distance_then_object() {
        let set = [
            DistancedObject::new(10.0, 'b'),
            DistancedObject::new(-2.0, 'z'),
            DistancedObject::new(10.0, 'a'),
        ]
        .into_iter()
        .collect::<BTreeSet<_>>();

        let order = set.iter().map(|o| o.object).collect::<String>();
        assert_eq!(order, "zab");
    }
}
