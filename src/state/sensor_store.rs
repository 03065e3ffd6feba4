use crate::logic::score::compute_score;
use crate::models::{HistoryPoint, SensorField, SensorReading, NOW_LABEL};
use serde_json::Value;

/// Current reading plus the series shown on the trend chart.
#[derive(Debug, Clone)]
pub struct SensorStore {
    reading: SensorReading,
    history: Vec<HistoryPoint>,
    history_limit: Option<usize>,
    remote_history: Option<Value>,
}

impl SensorStore {
    pub fn new(reading: SensorReading, seed: Vec<HistoryPoint>) -> Self {
        Self {
            reading,
            history: seed,
            history_limit: None,
            remote_history: None,
        }
    }

    /// Cap the display history, evicting oldest points first. `None` keeps everything.
    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit.filter(|l| *l > 0);
        self.enforce_limit();
        self
    }

    pub fn reading(&self) -> &SensorReading {
        &self.reading
    }

    pub fn history(&self) -> &[HistoryPoint] {
        &self.history
    }

    pub fn remote_history(&self) -> Option<&Value> {
        self.remote_history.as_ref()
    }

    /// Replace one field. No validation; the score engine clamps internally.
    pub fn set_field(&mut self, field: SensorField, value: f64) {
        self.reading.set(field, value);
    }

    pub fn replace_all(&mut self, reading: SensorReading) {
        self.reading = reading;
    }

    pub fn append_history(&mut self, point: HistoryPoint) {
        self.history.push(point);
        self.enforce_limit();
    }

    /// Keep the last fetched backend series. Separate from the display history.
    pub fn set_remote_history(&mut self, series: Value) {
        self.remote_history = Some(series);
    }

    pub fn current_score(&self) -> u8 {
        compute_score(&self.reading)
    }

    /// Display history followed by a live point for the current reading.
    pub fn chart_series(&self) -> Vec<HistoryPoint> {
        let mut series = self.history.clone();
        series.push(HistoryPoint::snapshot(NOW_LABEL, &self.reading));
        series
    }

    fn enforce_limit(&mut self) {
        if let Some(limit) = self.history_limit {
            if self.history.len() > limit {
                let excess = self.history.len() - limit;
                self.history.drain(..excess);
            }
        }
    }
}

impl Default for SensorStore {
    fn default() -> Self {
        Self::new(SensorReading::session_default(), crate::models::seed_history())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_field_accepts_out_of_range_values() {
        let mut store = SensorStore::default();
        store.set_field(SensorField::Humidity, 250.0);
        store.set_field(SensorField::Ph, -3.0);
        assert_eq!(store.reading().humidity, 250.0);
        assert_eq!(store.reading().ph, -3.0);
    }

    #[test]
    fn score_tracks_edits() {
        let mut store = SensorStore::default();
        assert_eq!(store.current_score(), 89);

        store.set_field(SensorField::Rainfall, 0.0);
        // Rainfall contributed 7.2 points
        assert_eq!(store.current_score(), 82);
    }

    #[test]
    fn replace_all_overwrites_every_field() {
        let mut store = SensorStore::default();
        let incoming = SensorReading {
            n: 1.0,
            p: 2.0,
            k: 3.0,
            temp: 4.0,
            humidity: 5.0,
            ph: 6.0,
            rainfall: 7.0,
        };
        store.replace_all(incoming);
        assert_eq!(*store.reading(), incoming);
    }

    #[test]
    fn history_grows_unbounded_by_default() {
        let mut store = SensorStore::default();
        let reading = *store.reading();
        for _ in 0..500 {
            store.append_history(HistoryPoint::snapshot(NOW_LABEL, &reading));
        }
        assert_eq!(store.history().len(), 504);
        assert_eq!(store.history()[0].label, "T-4");
    }

    #[test]
    fn history_limit_evicts_oldest() {
        let mut store = SensorStore::default().with_history_limit(Some(5));
        let reading = *store.reading();
        store.append_history(HistoryPoint::snapshot("a", &reading));
        store.append_history(HistoryPoint::snapshot("b", &reading));

        let labels: Vec<_> = store.history().iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["T-3", "T-2", "T-1", "a", "b"]);
    }

    #[test]
    fn chart_series_appends_live_point() {
        let mut store = SensorStore::default();
        store.set_field(SensorField::Temp, 31.0);
        let series = store.chart_series();
        assert_eq!(series.len(), 5);
        let last = series.last().unwrap();
        assert_eq!(last.label, "Now");
        assert_eq!(last.temp, 31.0);
        // The live point is not stored
        assert_eq!(store.history().len(), 4);
    }

    #[test]
    fn remote_history_is_kept_apart() {
        let mut store = SensorStore::default();
        store.set_remote_history(json!([{"n": 10}]));
        assert_eq!(store.history().len(), 4);
        assert_eq!(store.remote_history(), Some(&json!([{"n": 10}])));
    }
}
