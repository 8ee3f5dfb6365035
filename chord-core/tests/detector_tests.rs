use std::sync::{Arc, Mutex};
use std::time::Duration;

use chord_core::source::{ChunkCallback, ErrorCallback};
use chord_core::{AudioSource, ChordDetector, PipelineConfig, SourceError};

#[derive(Default)]
struct MockState {
    on_chunk: Option<ChunkCallback>,
    on_error: Option<ErrorCallback>,
    sample_rate: Option<u32>,
    starts: usize,
    stops: usize,
}

/// In-memory source; the test drives it through a cloned handle.
#[derive(Clone, Default)]
struct MockSource {
    state: Arc<Mutex<MockState>>,
    fail_with: Option<SourceError>,
}

impl MockSource {
    fn failing(err: SourceError) -> Self {
        Self {
            fail_with: Some(err),
            ..Default::default()
        }
    }

    fn feed(&self, samples: &[f32]) {
        let mut state = self.state.lock().unwrap();
        if let Some(on_chunk) = state.on_chunk.as_mut() {
            on_chunk(samples);
        }
    }

    fn fail(&self, err: SourceError) {
        let mut state = self.state.lock().unwrap();
        if let Some(on_error) = state.on_error.as_mut() {
            on_error(err);
        }
    }

    fn attached(&self) -> bool {
        self.state.lock().unwrap().on_chunk.is_some()
    }
}

impl AudioSource for MockSource {
    fn start(
        &mut self,
        sample_rate: u32,
        on_chunk: ChunkCallback,
        on_error: ErrorCallback,
    ) -> Result<(), SourceError> {
        if let Some(err) = self.fail_with.clone() {
            return Err(err);
        }
        let mut state = self.state.lock().unwrap();
        state.on_chunk = Some(on_chunk);
        state.on_error = Some(on_error);
        state.sample_rate = Some(sample_rate);
        state.starts += 1;
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.state.lock().unwrap();
        if state.on_chunk.take().is_some() {
            state.stops += 1;
        }
        state.on_error = None;
    }
}

fn a440(len: usize, sample_rate: u32) -> Vec<f32> {
    (0..len)
        .map(|i| 0.3 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sample_rate as f32).sin())
        .collect()
}

#[test]
fn test_start_attaches_and_publishes_results() {
    let source = MockSource::default();
    let detector = ChordDetector::new(source.clone(), PipelineConfig::default()).unwrap();

    detector.start().unwrap();
    assert!(detector.is_running());
    assert!(source.attached());
    assert_eq!(source.state.lock().unwrap().sample_rate, Some(44_100));

    source.feed(&vec![0.0; 4096]);
    let result = detector
        .results()
        .take_timeout(Duration::from_millis(100))
        .expect("a result is emitted for the first frame");
    assert!(result.is_unknown());
    assert_eq!(result.confidence, 0.0);
}

#[test]
fn test_permission_denied_is_reported_and_nothing_runs() {
    let detector =
        ChordDetector::new(MockSource::failing(SourceError::PermissionDenied), PipelineConfig::default())
            .unwrap();

    assert_eq!(detector.start(), Err(SourceError::PermissionDenied));
    assert!(!detector.is_running());
    assert_eq!(
        detector.errors().try_recv().as_deref(),
        Ok("microphone access was denied")
    );
    assert!(detector.errors().try_recv().is_err());
}

#[test]
fn test_initialization_failure_carries_its_reason() {
    let err = SourceError::SourceInitializationFailure("no input device".to_string());
    let detector = ChordDetector::new(MockSource::failing(err.clone()), PipelineConfig::default()).unwrap();

    assert_eq!(detector.start(), Err(err));
    let message = detector.errors().try_recv().unwrap();
    assert!(message.contains("no input device"));
}

#[test]
fn test_stream_failure_stops_processing() {
    let source = MockSource::default();
    let detector = ChordDetector::new(source.clone(), PipelineConfig::default()).unwrap();
    let results = detector.results();
    detector.start().unwrap();

    source.fail(SourceError::StreamFailure("device unplugged".to_string()));
    assert!(!detector.is_running());
    let message = detector.errors().try_recv().unwrap();
    assert!(message.contains("device unplugged"));

    source.feed(&vec![0.0; 8192]);
    assert!(results.try_take().is_none());

    // A fresh start detaches the dead stream before attaching again.
    detector.start().unwrap();
    assert!(detector.is_running());
    let state = source.state.lock().unwrap();
    assert_eq!(state.starts, 2);
    assert_eq!(state.stops, 1);
}

#[test]
fn test_restart_begins_from_a_clean_state() {
    let source = MockSource::default();
    let config = PipelineConfig::default();
    let detector = ChordDetector::new(source.clone(), config.clone()).unwrap();
    let results = detector.results();

    detector.start().unwrap();
    let tone = a440(config.hop_size * 12, config.sample_rate);
    for chunk in tone.chunks(config.hop_size) {
        source.feed(chunk);
    }
    std::thread::sleep(Duration::from_millis(150));
    source.feed(&vec![0.0; config.hop_size]);
    let held = results.try_take().expect("a result after the throttle interval");
    assert_eq!(held.note_names, vec!["A"]);

    detector.stop();
    assert!(!detector.is_running());
    detector.start().unwrap();

    // A carried-over hold would still report "A" here.
    source.feed(&vec![0.0; config.frame_size]);
    let fresh = results.try_take().expect("first frame of a session is emitted");
    assert!(fresh.is_unknown());
    assert!(fresh.note_names.is_empty());
    assert_eq!(fresh.confidence, 0.0);
}

#[test]
fn test_stop_is_idempotent() {
    let source = MockSource::default();
    let detector = ChordDetector::new(source.clone(), PipelineConfig::default()).unwrap();

    detector.stop();
    detector.start().unwrap();
    detector.stop();
    detector.stop();

    assert!(!source.attached());
    assert_eq!(source.state.lock().unwrap().stops, 1);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = PipelineConfig {
        hop_size: 0,
        ..Default::default()
    };
    assert!(ChordDetector::new(MockSource::default(), config).is_err());
}
