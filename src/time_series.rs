use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub t: f64,
    pub wpm: f64,
}

impl TimeSeriesPoint {
    pub fn new(t: f64, wpm: f64) -> Self {
        Self { t, wpm }
    }
}

impl From<TimeSeriesPoint> for (f64, f64) {
    fn from(p: TimeSeriesPoint) -> Self {
        (p.t, p.wpm)
    }
}

/// Live wpm sampled once per whole elapsed second.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WpmTrace {
    points: Vec<TimeSeriesPoint>,
}

impl WpmTrace {
    /// Records a point when `elapsed` has entered a second not yet sampled.
    pub fn record(&mut self, elapsed: Duration, wpm: u32) -> bool {
        let second = elapsed.as_secs();
        let last = self.points.last().map_or(0, |p| p.t as u64);
        if second == 0 || second <= last {
            return false;
        }

        self.points.push(TimeSeriesPoint::new(second as f64, wpm as f64));
        true
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}
