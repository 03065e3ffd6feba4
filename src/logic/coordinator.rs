//! Serialises every outbound backend call behind one busy flag and routes
//! outcomes into the sensor/result stores and the notification center.
//!
//! Operations never propagate errors. Each failure is turned into an error
//! notification and reported back as [`Outcome::Failed`]; all previously held
//! state is left untouched.

use super::busy::{BusyFlag, BusyGuard};
use super::score::{score_breakdown, ScoreBreakdown};
use crate::datasources::{AgriBackend, ImageUpload};
use crate::error::AgriScoreError;
use crate::models::{HistoryPoint, Notification, SensorField, SensorReading, NOW_LABEL};
use crate::state::{NotificationCenter, ResultStore, SensorStore};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

/// How a top-level operation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    Completed,
    /// Failed with the message shown to the user.
    Failed(String),
    /// Another operation held the busy flag; nothing was sent.
    Rejected,
    /// Precondition not met (no image); nothing was sent.
    Skipped,
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub reading: SensorReading,
    pub score: u8,
    pub breakdown: ScoreBreakdown,
    pub chart: Vec<HistoryPoint>,
    pub remote_history_len: Option<usize>,
    pub crops: Option<String>,
    pub crops_received: Option<DateTime<Utc>>,
    pub disease: Option<String>,
    pub disease_received: Option<DateTime<Utc>>,
    pub notification: Option<Notification>,
    pub busy: bool,
}

pub struct OperationCoordinator<B: AgriBackend> {
    backend: B,
    busy: BusyFlag,
    sensors: Arc<RwLock<SensorStore>>,
    results: Arc<RwLock<ResultStore>>,
    notifications: NotificationCenter,
    adopt_latest_reading: bool,
}

impl<B: AgriBackend> OperationCoordinator<B> {
    pub fn new(backend: B, sensors: SensorStore, notifications: NotificationCenter) -> Self {
        Self {
            backend,
            busy: BusyFlag::new(),
            sensors: Arc::new(RwLock::new(sensors)),
            results: Arc::new(RwLock::new(ResultStore::new())),
            notifications,
            adopt_latest_reading: false,
        }
    }

    /// Also replace the current reading with the newest entry of a fetched history.
    pub fn adopt_latest_reading(mut self, enabled: bool) -> Self {
        self.adopt_latest_reading = enabled;
        self
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Local edit; never touches the network.
    pub async fn set_field(&self, field: SensorField, value: f64) {
        self.sensors.write().await.set_field(field, value);
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        let (reading, score, chart, remote_history_len) = {
            let sensors = self.sensors.read().await;
            let remote_len = sensors.remote_history().map(|v| match v {
                Value::Array(items) => items.len(),
                Value::Null => 0,
                _ => 1,
            });
            (
                *sensors.reading(),
                sensors.current_score(),
                sensors.chart_series(),
                remote_len,
            )
        };
        let (crops, crops_received, disease, disease_received) = {
            let results = self.results.read().await;
            (
                results.crops.pretty(),
                results.crops.received_at(),
                results.disease.pretty(),
                results.disease.received_at(),
            )
        };

        DashboardSnapshot {
            score,
            breakdown: score_breakdown(&reading),
            reading,
            chart,
            remote_history_len,
            crops,
            crops_received,
            disease,
            disease_received,
            notification: self.notifications.current().await,
            busy: self.busy.is_busy(),
        }
    }

    fn acquire(&self, operation: &'static str) -> Option<BusyGuard> {
        let guard = self.busy.try_acquire();
        if guard.is_none() {
            tracing::debug!(operation, "rejected: another operation is in progress");
        }
        guard
    }

    /// Route a failure to the notification center and hand back its message.
    async fn report(&self, prefix: &str, err: AgriScoreError) -> String {
        tracing::debug!(remote = err.is_remote(), error = ?err, "{}", prefix);
        let message = format!("{}: {}", prefix, err);
        self.notifications.error(message.clone()).await;
        message
    }

    /// Fetch the backend's sensor history and keep it beside the display history.
    pub async fn fetch_history(&self) -> Outcome {
        let Some(_guard) = self.acquire("fetch_history") else {
            return Outcome::Rejected;
        };

        match self.backend.fetch_sensor_history().await {
            Ok(series) => {
                let latest = if self.adopt_latest_reading {
                    latest_reading(&series)
                } else {
                    None
                };

                {
                    let mut sensors = self.sensors.write().await;
                    sensors.set_remote_history(series);
                    if let Some(reading) = latest {
                        sensors.replace_all(reading);
                    }
                }

                tracing::info!(operation = "fetch_history", "completed");
                self.notifications
                    .info("Successfully fetched sensor history")
                    .await;
                Outcome::Completed
            }
            Err(e) => Outcome::Failed(self.report("Fetch failed", e).await),
        }
    }

    /// POST the current reading, then record it on the display history.
    ///
    /// At most once: there is no retry and no durability guarantee.
    pub async fn persist_reading(&self) -> Outcome {
        let Some(_guard) = self.acquire("persist_reading") else {
            return Outcome::Rejected;
        };

        match self.persist_step().await {
            Ok(()) => Outcome::Completed,
            Err(message) => Outcome::Failed(message),
        }
    }

    /// Persist then recommend. The recommend call is never issued unless the
    /// persist step, including its notification, has fully succeeded.
    pub async fn recommend_crops(&self) -> Outcome {
        let Some(_guard) = self.acquire("recommend_crops") else {
            return Outcome::Rejected;
        };

        if let Err(message) = self.persist_step().await {
            let message = format!("Recommend failed: {}", message);
            self.notifications.error(message.clone()).await;
            return Outcome::Failed(message);
        }

        match self.backend.recommend_crops().await {
            Ok(payload) => {
                self.results.write().await.crops.replace(payload);
                tracing::info!(operation = "recommend_crops", "completed");
                self.notifications.info("Got crop recommendations").await;
                Outcome::Completed
            }
            Err(e) => Outcome::Failed(self.report("Recommend failed", e).await),
        }
    }

    /// Upload an image for classification. Without an image this is a no-op.
    pub async fn detect_disease(&self, image: Option<ImageUpload>) -> Outcome {
        let Some(image) = image else {
            return Outcome::Skipped;
        };
        let Some(_guard) = self.acquire("detect_disease") else {
            return Outcome::Rejected;
        };

        match self.backend.detect_disease(image).await {
            Ok(payload) => {
                self.results.write().await.disease.replace(payload);
                tracing::info!(operation = "detect_disease", "completed");
                self.notifications.info("Disease analyzed").await;
                Outcome::Completed
            }
            Err(e) => Outcome::Failed(self.report("Upload failed", e).await),
        }
    }

    /// Read the image at `path`, then upload it. While another operation is in
    /// flight the file is not read at all.
    pub async fn detect_disease_from_path(&self, path: Option<PathBuf>) -> Outcome {
        let Some(path) = path else {
            return Outcome::Skipped;
        };
        if self.busy.is_busy() {
            tracing::debug!(operation = "detect_disease", "rejected: another operation is in progress");
            return Outcome::Rejected;
        }

        match ImageUpload::from_path(&path).await {
            Ok(image) => self.detect_disease(Some(image)).await,
            Err(e) => Outcome::Failed(self.report("Upload failed", e).await),
        }
    }

    /// Shared body of persist; the caller holds the busy guard.
    /// On failure the error has already been notified and its message is returned.
    async fn persist_step(&self) -> std::result::Result<(), String> {
        let reading = *self.sensors.read().await.reading();

        match self.backend.save_sensor_reading(reading).await {
            Ok(()) => {
                let points = {
                    let mut sensors = self.sensors.write().await;
                    sensors.append_history(HistoryPoint::snapshot(NOW_LABEL, &reading));
                    sensors.history().len()
                };
                tracing::info!(operation = "persist_reading", points, "completed");
                self.notifications.info("Sensor data saved").await;
                Ok(())
            }
            Err(e) => Err(self.report("Save failed", e).await),
        }
    }
}

/// Newest reading in a fetched series, if the series is an array of readings.
fn latest_reading(series: &Value) -> Option<SensorReading> {
    let last = series.as_array()?.last()?;
    serde_json::from_value(last.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::models::NotificationKind;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records every backend call in order and can be told to be slow or fail.
    #[derive(Default)]
    struct MockBackend {
        log: Arc<Mutex<Vec<String>>>,
        saved: Arc<Mutex<Vec<SensorReading>>>,
        persist_delay: Duration,
        history: Option<Value>,
        fail_history: Option<u16>,
        fail_persist: Option<u16>,
        fail_recommend: Option<u16>,
        fail_disease: Option<u16>,
        disease_transport_error: bool,
    }

    impl MockBackend {
        fn record(&self, entry: &str) {
            self.log.lock().unwrap().push(entry.to_string());
        }

        fn calls(&self) -> Arc<Mutex<Vec<String>>> {
            Arc::clone(&self.log)
        }
    }

    fn status_error(status: u16) -> AgriScoreError {
        let reason = match status {
            500 => "Internal Server Error",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            404 => "Not Found",
            _ => "",
        };
        AgriScoreError::protocol(status, reason)
    }

    impl AgriBackend for MockBackend {
        async fn fetch_sensor_history(&self) -> Result<Value> {
            self.record("GET /sensor-data");
            if let Some(status) = self.fail_history {
                return Err(status_error(status));
            }
            Ok(self.history.clone().unwrap_or_else(|| json!([])))
        }

        async fn save_sensor_reading(&self, reading: SensorReading) -> Result<()> {
            self.record("POST /sensor-data:start");
            if !self.persist_delay.is_zero() {
                tokio::time::sleep(self.persist_delay).await;
            }
            self.record("POST /sensor-data:end");
            if let Some(status) = self.fail_persist {
                return Err(status_error(status));
            }
            self.saved.lock().unwrap().push(reading);
            Ok(())
        }

        async fn recommend_crops(&self) -> Result<Value> {
            self.record("GET /recommend-crops");
            if let Some(status) = self.fail_recommend {
                return Err(status_error(status));
            }
            Ok(json!({"recommended_crops": ["rice", "jute"]}))
        }

        async fn detect_disease(&self, image: ImageUpload) -> Result<Value> {
            self.record(&format!("POST /detect-disease:{}", image.file_name));
            if self.disease_transport_error {
                return Err(AgriScoreError::Transport("connection refused".into()));
            }
            if let Some(status) = self.fail_disease {
                return Err(status_error(status));
            }
            Ok(json!({"disease": "Early blight", "confidence": 0.93}))
        }
    }

    fn coordinator(backend: MockBackend) -> OperationCoordinator<MockBackend> {
        OperationCoordinator::new(backend, SensorStore::default(), NotificationCenter::default())
    }

    fn leaf() -> Option<ImageUpload> {
        Some(ImageUpload::new("leaf.jpg", vec![0xff, 0xd8, 0xff]))
    }

    async fn live_notification(c: &OperationCoordinator<MockBackend>) -> Notification {
        c.notifications()
            .current()
            .await
            .expect("expected a live notification")
    }

    #[tokio::test]
    async fn fetch_history_stores_series_and_notifies() {
        let backend = MockBackend {
            history: Some(json!([{"n": 1}, {"n": 2}])),
            ..Default::default()
        };
        let c = coordinator(backend);

        assert_eq!(c.fetch_history().await, Outcome::Completed);
        assert!(!c.is_busy());

        let snap = c.snapshot().await;
        assert_eq!(snap.remote_history_len, Some(2));
        // Display history is untouched
        assert_eq!(snap.chart.len(), 5);
        // Reading is not adopted unless enabled
        assert_eq!(snap.reading, SensorReading::session_default());

        let n = live_notification(&c).await;
        assert_eq!(n.kind, NotificationKind::Info);
        assert_eq!(n.message, "Successfully fetched sensor history");
    }

    #[tokio::test]
    async fn fetch_history_can_adopt_latest_reading() {
        let backend = MockBackend {
            history: Some(json!([
                {"n": 1, "p": 1, "k": 1, "temp": 20, "humidity": 50, "ph": 6, "rainfall": 10},
                {"n": 90, "p": 42, "k": 43, "temp": 21, "humidity": 82, "ph": 6.5, "rainfall": 203}
            ])),
            ..Default::default()
        };
        let c = coordinator(backend).adopt_latest_reading(true);

        assert!(c.fetch_history().await.is_completed());
        let reading = *c.sensors.read().await.reading();
        assert_eq!(reading.n, 90.0);
        assert_eq!(reading.rainfall, 203.0);
    }

    #[tokio::test]
    async fn fetch_history_failure_leaves_state_untouched() {
        let backend = MockBackend {
            fail_history: Some(503),
            ..Default::default()
        };
        let c = coordinator(backend);

        let outcome = c.fetch_history().await;
        assert_eq!(
            outcome,
            Outcome::Failed("Fetch failed: Request failed: 503 Service Unavailable".into())
        );
        assert!(!c.is_busy());
        assert!(c.sensors.read().await.remote_history().is_none());

        let n = live_notification(&c).await;
        assert_eq!(n.kind, NotificationKind::Error);
        assert!(n.message.contains("503"));
    }

    #[tokio::test]
    async fn persist_appends_now_snapshot() {
        let backend = MockBackend::default();
        let saved = Arc::clone(&backend.saved);
        let c = coordinator(backend);

        c.set_field(SensorField::Temp, 31.0).await;
        assert_eq!(c.persist_reading().await, Outcome::Completed);

        let sent = saved.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].temp, 31.0);

        let sensors = c.sensors.read().await;
        let last = sensors.history().last().unwrap();
        assert_eq!(last.label, "Now");
        assert_eq!(last.temp, 31.0);
        assert_eq!(sensors.history().len(), 5);

        assert_eq!(live_notification(&c).await.message, "Sensor data saved");
    }

    #[tokio::test]
    async fn persist_failure_does_not_append() {
        let backend = MockBackend {
            fail_persist: Some(500),
            ..Default::default()
        };
        let c = coordinator(backend);

        let outcome = c.persist_reading().await;
        assert!(matches!(outcome, Outcome::Failed(ref m) if m.starts_with("Save failed")));
        assert_eq!(c.sensors.read().await.history().len(), 4);
        assert!(!c.is_busy());

        let n = live_notification(&c).await;
        assert!(n.is_error());
        assert_eq!(n.message, "Save failed: Request failed: 500 Internal Server Error");
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_persist_is_rejected() {
        let backend = MockBackend {
            persist_delay: Duration::from_millis(250),
            ..Default::default()
        };
        let calls = backend.calls();
        let c = coordinator(backend);

        let (first, second) = tokio::join!(c.persist_reading(), c.persist_reading());
        assert_eq!(first, Outcome::Completed);
        assert_eq!(second, Outcome::Rejected);

        let calls = calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["POST /sensor-data:start", "POST /sensor-data:end"]);

        // Flag is free again once the first call settles
        assert!(!c.is_busy());
        assert_eq!(c.persist_reading().await, Outcome::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn operations_are_mutually_exclusive() {
        let backend = MockBackend {
            persist_delay: Duration::from_millis(500),
            ..Default::default()
        };
        let calls = backend.calls();
        let c = coordinator(backend);

        let (recommend, fetch, upload) =
            tokio::join!(c.recommend_crops(), c.fetch_history(), c.detect_disease(leaf()));
        assert_eq!(recommend, Outcome::Completed);
        assert_eq!(fetch, Outcome::Rejected);
        assert_eq!(upload, Outcome::Rejected);

        let calls = calls.lock().unwrap().clone();
        assert!(!calls.iter().any(|c| c.starts_with("GET /sensor-data")));
        assert!(!calls.iter().any(|c| c.starts_with("POST /detect-disease")));
    }

    #[tokio::test(start_paused = true)]
    async fn recommend_persists_strictly_first() {
        let backend = MockBackend {
            persist_delay: Duration::from_secs(2),
            ..Default::default()
        };
        let calls = backend.calls();
        let c = coordinator(backend);

        assert_eq!(c.recommend_crops().await, Outcome::Completed);

        let calls = calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                "POST /sensor-data:start",
                "POST /sensor-data:end",
                "GET /recommend-crops"
            ]
        );

        {
            let results = c.results.read().await;
            assert_eq!(
                results.crops.get(),
                Some(&json!({"recommended_crops": ["rice", "jute"]}))
            );
        }
        assert_eq!(c.sensors.read().await.history().last().unwrap().label, "Now");
        assert_eq!(live_notification(&c).await.message, "Got crop recommendations");
    }

    #[tokio::test(start_paused = true)]
    async fn busy_is_held_across_both_steps() {
        let backend = MockBackend {
            persist_delay: Duration::from_millis(300),
            ..Default::default()
        };
        let c = Arc::new(coordinator(backend));

        let task = {
            let c = Arc::clone(&c);
            tokio::spawn(async move { c.recommend_crops().await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(c.is_busy());
        assert_eq!(c.persist_reading().await, Outcome::Rejected);

        assert_eq!(task.await.unwrap(), Outcome::Completed);
        assert!(!c.is_busy());
    }

    #[tokio::test]
    async fn recommend_aborts_when_persist_fails() {
        let backend = MockBackend {
            fail_persist: Some(502),
            ..Default::default()
        };
        let calls = backend.calls();
        let c = coordinator(backend);

        let outcome = c.recommend_crops().await;
        assert!(matches!(outcome, Outcome::Failed(ref m) if m.starts_with("Recommend failed: Save failed")));
        assert!(!c.is_busy());

        let calls = calls.lock().unwrap().clone();
        assert!(!calls.contains(&"GET /recommend-crops".to_string()));
        assert!(c.results.read().await.crops.get().is_none());
        assert!(live_notification(&c).await.is_error());
    }

    #[tokio::test]
    async fn recommend_failure_keeps_previous_result() {
        let backend = MockBackend {
            fail_recommend: Some(500),
            ..Default::default()
        };
        let c = coordinator(backend);
        c.results
            .write()
            .await
            .crops
            .replace(json!({"recommended_crops": ["maize"]}));

        let outcome = c.recommend_crops().await;
        assert!(matches!(outcome, Outcome::Failed(_)));
        assert!(!c.is_busy());

        // Persist step still went through
        assert_eq!(c.sensors.read().await.history().len(), 5);
        assert_eq!(
            c.results.read().await.crops.get(),
            Some(&json!({"recommended_crops": ["maize"]}))
        );
        let n = live_notification(&c).await;
        assert_eq!(n.message, "Recommend failed: Request failed: 500 Internal Server Error");
    }

    #[tokio::test]
    async fn detect_disease_without_image_is_a_no_op() {
        let backend = MockBackend::default();
        let calls = backend.calls();
        let c = coordinator(backend);

        // Even while busy, a missing image is skipped rather than rejected
        let guard = c.busy.try_acquire();
        assert_eq!(c.detect_disease(None).await, Outcome::Skipped);
        drop(guard);

        assert_eq!(c.detect_disease(None).await, Outcome::Skipped);
        assert!(calls.lock().unwrap().is_empty());
        assert!(c.notifications().current().await.is_none());
    }

    #[tokio::test]
    async fn detect_disease_stores_payload() {
        let backend = MockBackend::default();
        let calls = backend.calls();
        let c = coordinator(backend);

        assert_eq!(c.detect_disease(leaf()).await, Outcome::Completed);
        assert_eq!(
            calls.lock().unwrap().clone(),
            vec!["POST /detect-disease:leaf.jpg"]
        );
        let snap = c.snapshot().await;
        assert!(snap.disease.unwrap().contains("Early blight"));
        assert!(snap.disease_received.is_some());
        assert!(snap.crops_received.is_none());
        assert_eq!(snap.notification.unwrap().message, "Disease analyzed");
    }

    #[tokio::test]
    async fn detect_disease_500_keeps_prior_result() {
        let backend = MockBackend {
            fail_disease: Some(500),
            ..Default::default()
        };
        let c = coordinator(backend);
        let prior = json!({"disease": "Healthy"});
        c.results.write().await.disease.replace(prior.clone());

        let outcome = c.detect_disease(leaf()).await;
        assert_eq!(
            outcome,
            Outcome::Failed("Upload failed: Request failed: 500 Internal Server Error".into())
        );
        assert_eq!(c.results.read().await.disease.get(), Some(&prior));
        assert!(!c.is_busy());

        let n = live_notification(&c).await;
        assert_eq!(n.kind, NotificationKind::Error);
        assert!(n.message.contains("500 Internal Server Error"));
    }

    #[tokio::test]
    async fn transport_and_protocol_failures_share_a_path() {
        let backend = MockBackend {
            disease_transport_error: true,
            ..Default::default()
        };
        let c = coordinator(backend);

        let outcome = c.detect_disease(leaf()).await;
        assert_eq!(
            outcome,
            Outcome::Failed("Upload failed: Request failed: connection refused".into())
        );
        assert!(!c.is_busy());
        assert!(live_notification(&c).await.is_error());
        assert!(c.results.read().await.disease.get().is_none());
    }

    #[tokio::test]
    async fn upload_from_path_is_rejected_before_reading_while_busy() {
        let backend = MockBackend::default();
        let calls = backend.calls();
        let c = coordinator(backend);

        let guard = c.busy.try_acquire();
        let missing = PathBuf::from("/definitely/not/here.png");
        // A read attempt would have failed with an IO error instead
        assert_eq!(
            c.detect_disease_from_path(Some(missing.clone())).await,
            Outcome::Rejected
        );
        assert!(c.notifications().current().await.is_none());
        drop(guard);

        let outcome = c.detect_disease_from_path(Some(missing)).await;
        assert!(matches!(outcome, Outcome::Failed(ref m) if m.starts_with("Upload failed: IO error: ")));
        assert!(calls.lock().unwrap().is_empty());
        assert!(live_notification(&c).await.is_error());
        assert!(!c.is_busy());

        assert_eq!(c.detect_disease_from_path(None).await, Outcome::Skipped);
    }

    #[tokio::test]
    async fn upload_from_path_sends_file_contents() {
        let dir = std::env::temp_dir().join(format!("agriscore-upload-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("leaf.png");
        tokio::fs::write(&path, [0x89, b'P', b'N', b'G']).await.unwrap();

        let backend = MockBackend::default();
        let calls = backend.calls();
        let c = coordinator(backend);

        assert_eq!(c.detect_disease_from_path(Some(path)).await, Outcome::Completed);
        assert_eq!(
            calls.lock().unwrap().clone(),
            vec!["POST /detect-disease:leaf.png"]
        );
        assert_eq!(live_notification(&c).await.message, "Disease analyzed");

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn snapshot_reflects_edits() {
        let c = coordinator(MockBackend::default());
        assert_eq!(c.snapshot().await.score, 89);

        c.set_field(SensorField::Rainfall, 0.0).await;
        let snap = c.snapshot().await;
        assert_eq!(snap.score, 82);
        assert_eq!(snap.reading.rainfall, 0.0);
        assert!(!snap.busy);
    }

    #[test]
    fn latest_reading_requires_array_of_readings() {
        assert!(latest_reading(&json!({"n": 1})).is_none());
        assert!(latest_reading(&json!([])).is_none());
        assert!(latest_reading(&json!(["x"])).is_none());
        let r = latest_reading(&json!([{"n": 5}])).unwrap();
        assert_eq!(r.n, 5.0);
        assert_eq!(r.ph, 7.0);
    }
}
