//! Picking local peaks and valleys for sparse on-chart labels.

/// Direction of travel between the two most recent points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trend {
    Rising,
    Falling,
}

impl Trend {
    fn flipped(self) -> Self {
        match self {
            Trend::Rising => Trend::Falling,
            Trend::Falling => Trend::Rising,
        }
    }
}

/// Select the local minima/maxima of `data` worth labelling.
///
/// The first point is never returned (it sits on the axis labels), the last
/// point always counts as a turning point, and when `min_delta` is set a
/// candidate is only emitted if it differs from the last emitted value by
/// more than `min_delta`.
pub fn select_extremes<T, F>(data: &[T], value_of: F, min_delta: Option<f64>) -> Vec<&T>
where
    F: Fn(&T) -> f64,
{
    let mut selected = Vec::new();

    let mut trend = match data {
        [first, second, ..] if value_of(second) > value_of(first) => Trend::Rising,
        _ => Trend::Falling,
    };
    let mut last_emitted = f64::MAX;

    // `i == data.len()` is the trailing boundary: the last point is always a
    // candidate.
    for i in 2..=data.len() {
        let d0 = value_of(&data[i - 1]);
        let turning = match data.get(i) {
            None => true,
            Some(next) => {
                let d1 = value_of(next);
                (trend == Trend::Rising && d1 < d0) || (trend == Trend::Falling && d1 > d0)
            }
        };
        if !turning {
            continue;
        }

        trend = trend.flipped();
        if min_delta.is_none_or(|delta| (d0 - last_emitted).abs() > delta) {
            selected.push(&data[i - 1]);
            last_emitted = d0;
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(data: &[f64], min_delta: Option<f64>) -> Vec<f64> {
        select_extremes(data, |v| *v, min_delta).into_iter().copied().collect()
    }

    fn indices(data: &[f64], min_delta: Option<f64>) -> Vec<usize> {
        select_extremes(data, |v| *v, min_delta)
            .into_iter()
            .map(|picked| data.iter().position(|v| std::ptr::eq(v, picked)).unwrap())
            .collect()
    }

    #[test]
    fn zig_zag_emits_every_turning_point_after_the_first() {
        let data = [1.0, 5.0, 1.0, 5.0, 1.0];

        assert_eq!(values(&data, None), vec![5.0, 1.0, 5.0, 1.0]);
        assert_eq!(indices(&data, None), vec![1, 2, 3, 4]);
    }

    #[test]
    fn monotonic_rise_emits_only_the_last_point() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];

        assert_eq!(values(&data, None), vec![5.0]);
        assert_eq!(indices(&data, None), vec![4]);
    }

    #[test]
    fn first_point_is_never_selected() {
        let data = [9.0, 1.0, 8.0, 2.0, 7.0, 3.0];

        assert!(!indices(&data, None).contains(&0));
        assert!(!indices(&data, Some(0.5)).contains(&0));
    }

    #[test]
    fn short_inputs() {
        assert!(values(&[], None).is_empty());
        assert!(values(&[1.0], None).is_empty());
        assert_eq!(values(&[1.0, 2.0], None), vec![2.0]);
    }

    #[test]
    fn last_point_is_subject_to_min_delta() {
        assert_eq!(values(&[0.0, 10.0, 0.0, 0.5], Some(1.0)), vec![10.0, 0.0]);
        assert_eq!(values(&[0.0, 10.0, 0.0, 0.5], None), vec![10.0, 0.0, 0.5]);
    }

    #[test]
    fn min_delta_collapses_small_wiggles() {
        let data = [10.0, 11.0, 10.5, 11.5, 10.0, 12.0, 10.8, 11.2];

        let unfiltered = values(&data, None);
        let filtered = values(&data, Some(3.0));

        assert_eq!(unfiltered.len(), 7);
        assert_eq!(filtered, vec![11.0]);
    }

    #[test]
    fn min_delta_compares_against_last_emitted_value() {
        // 8 and 9.5 are both within 2 of the last emitted 9.
        let data = [0.0, 1.0, 9.0, 8.0, 9.5, 2.0];

        assert_eq!(values(&data, Some(2.0)), vec![9.0, 2.0]);
    }

    #[test]
    fn works_with_derived_values() {
        struct Point {
            temp: Option<f64>,
        }
        let data: Vec<Point> = [3.0, 1.0, 4.0, 1.0]
            .into_iter()
            .map(|t| Point { temp: Some(t) })
            .collect();

        let picked = select_extremes(&data, |p| p.temp.unwrap_or_default(), None);
        let temps: Vec<_> = picked.iter().filter_map(|p| p.temp).collect();

        assert_eq!(temps, vec![1.0, 4.0, 1.0]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn series() -> impl Strategy<Value = Vec<f64>> {
            proptest::collection::vec(-50.0..50.0f64, 0..60)
        }

        proptest! {
            #[test]
            fn first_index_is_never_selected(data in series(), delta in proptest::option::of(0.0..10.0f64)) {
                prop_assert!(!indices(&data, delta).contains(&0));
            }

            #[test]
            fn last_element_is_always_a_candidate(data in proptest::collection::vec(-50.0..50.0f64, 2..60)) {
                let idx = indices(&data, None);
                prop_assert_eq!(idx.last(), Some(&(data.len() - 1)));
            }

            #[test]
            fn min_delta_only_drops_candidates(data in series(), delta in 0.0..10.0f64) {
                let all = indices(&data, None);
                let filtered = indices(&data, Some(delta));

                prop_assert!(filtered.len() <= all.len());
                prop_assert!(filtered.iter().all(|i| all.contains(i)));
                prop_assert!(filtered.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }
}
