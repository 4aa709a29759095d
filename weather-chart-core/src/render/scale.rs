//! Linear value-to-pixel scales.

/// Maps a numeric domain linearly onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// A collapsed domain maps everything to the middle of the range.
    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }
}

/// Min and max of the given values, `None` when there are none.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values.into_iter().filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Round step of roughly `span / count`: 1, 2 or 5 times a power of ten.
pub fn tick_step(span: f64, count: usize) -> f64 {
    let raw = span / count.max(1) as f64;
    if !(raw.is_finite() && raw > 0.0) {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .find(|m| m * magnitude >= raw)
        .unwrap_or(10.0);
    step * magnitude
}

/// Extend a domain outward to round tick boundaries.
pub fn nice_domain(lo: f64, hi: f64, count: usize) -> (f64, f64) {
    if hi <= lo {
        return (lo - 1.0, lo + 1.0);
    }
    let step = tick_step(hi - lo, count);
    ((lo / step).floor() * step, (hi / step).ceil() * step)
}

/// Tick values inside `domain`, spaced by a round step.
pub fn ticks(domain: (f64, f64), count: usize) -> Vec<f64> {
    let (lo, hi) = domain;
    if hi <= lo {
        return vec![lo];
    }
    let step = tick_step(hi - lo, count);
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}
