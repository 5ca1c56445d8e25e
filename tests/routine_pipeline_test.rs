//! Integration tests for the registration and recognition pipeline
//!
//! Registration: validate samples -> save to store -> persist as JSON
//! Recognition: stroke -> engine -> matched routine -> executor

use gesture_routines::executor::{
    HostCommandInvoker, RecordingNotifier, RoutineExecutor, ShellSubmitter,
};
use gesture_routines::geometry::{strokes_from_json, Point, Stroke};
use gesture_routines::recognition::{
    GestureValidator, NormalizedSampleCache, RecognitionEngine, RecognitionSession, Recognizer,
    SessionOutcome, RECOGNITION_THRESHOLD, SIMILARITY_THRESHOLD,
};
use gesture_routines::routine::{
    Command, JsonFilePersistence, MemoryPersistence, Routine, RoutinePersistence, RoutineStore,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tempfile::TempDir;

/// Host and shell collaborator that records every payload
#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl HostCommandInvoker for Recorder {
    async fn invoke(&self, command_id: &str) -> gesture_routines::Result<()> {
        self.calls.lock().push(format!("host:{}", command_id));
        Ok(())
    }
}

#[async_trait::async_trait]
impl ShellSubmitter for Recorder {
    async fn submit(&self, command_line: &str) -> gesture_routines::Result<()> {
        self.calls.lock().push(format!("shell:{}", command_line));
        Ok(())
    }
}

/// 20-point circle of radius 50 centered at (100, 100), with a small wobble
fn focus_circle(wobble: f64) -> Stroke {
    Stroke::new(
        (0..20)
            .map(|i| {
                let a = (i as f64 / 20.0) * 2.0 * std::f64::consts::PI;
                let r = 50.0 + wobble * ((i * 7) % 3) as f64;
                Point::new(100.0 + r * a.cos(), 100.0 + r * a.sin())
            })
            .collect(),
    )
}

fn horizontal_line() -> Stroke {
    Stroke::new((0..12).map(|i| Point::new(i as f64 * 15.0, 80.0)).collect())
}

struct Harness {
    store: Arc<RoutineStore>,
    engine: Arc<RecognitionEngine>,
    validator: GestureValidator,
    recorder: Arc<Recorder>,
    notifier: Arc<RecordingNotifier>,
}

fn harness(persistence: Box<dyn RoutinePersistence>) -> Harness {
    let cache = Arc::new(NormalizedSampleCache::new());
    let store = Arc::new(RoutineStore::open(persistence, cache.clone()).unwrap());
    let recorder = Arc::new(Recorder::default());
    let notifier = Arc::new(RecordingNotifier::new());
    let executor = Arc::new(RoutineExecutor::new(
        recorder.clone(),
        recorder.clone(),
        notifier.clone(),
    ));
    Harness {
        engine: Arc::new(RecognitionEngine::new(store.clone(), executor, cache.clone())),
        validator: GestureValidator::new(Recognizer::with_cache(cache)),
        store,
        recorder,
        notifier,
    }
}

/// Validate every sample, then save, the way the registration flow does
fn register(h: &Harness, name: &str, samples: Vec<Stroke>, commands: Vec<Command>) {
    let existing = h.store.get_all_gestures();
    for sample in &samples {
        let result = h.validator.validate(sample, &existing, Some(name));
        assert!(result.accepted, "sample rejected: {:?}", result);
    }
    h.store
        .save_routine(Routine::new(name, commands, samples))
        .unwrap();
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[tokio::test]
async fn test_focus_end_to_end() {
    let h = harness(Box::new(MemoryPersistence::new()));
    register(
        &h,
        "Focus",
        vec![focus_circle(0.0), focus_circle(0.5), focus_circle(1.0)],
        vec![
            Command::host("workbench.action.zenMode"),
            Command::shell("notify-send focus"),
        ],
    );

    // Editing Focus: its own gesture is excluded, so a 4th circle is accepted
    let fourth = h
        .validator
        .validate(&focus_circle(0.8), &h.store.get_all_gestures(), Some("Focus"));
    assert!(fourth.accepted);

    let outcome = h.engine.recognize_and_execute(focus_circle(0.3)).await;
    assert!(outcome.recognition.recognized);
    assert!(outcome.recognition.score >= RECOGNITION_THRESHOLD);
    assert_eq!(outcome.recognition.routine.as_ref().unwrap().name, "Focus");

    let report = outcome.execution.unwrap();
    assert_eq!(report.success_count, 2);
    assert_eq!(
        *h.recorder.calls.lock(),
        vec!["host:workbench.action.zenMode", "shell:notify-send focus"]
    );
    assert_eq!(h.notifier.messages(), vec!["Routine Focus: 2 succeeded, 0 failed"]);
}

#[tokio::test]
async fn test_conflicting_gesture_rejected() {
    let h = harness(Box::new(MemoryPersistence::new()));
    register(&h, "A", vec![horizontal_line()], vec![Command::host("a")]);

    let result = h
        .validator
        .validate(&horizontal_line(), &h.store.get_all_gestures(), None);
    assert!(!result.accepted);
    assert_eq!(result.conflicting_name.as_deref(), Some("A"));
    assert!(result.score > SIMILARITY_THRESHOLD);
}

#[tokio::test]
async fn test_disabled_routine_is_not_recognized() {
    let h = harness(Box::new(MemoryPersistence::new()));
    register(&h, "Focus", vec![focus_circle(0.0)], vec![Command::host("zen")]);

    assert!(h.store.toggle("Focus").unwrap());
    let outcome = h.engine.recognize_and_execute(focus_circle(0.2)).await;
    assert!(!outcome.recognition.recognized);
    assert!(outcome.execution.is_none());
    assert!(h.recorder.calls.lock().is_empty());

    assert!(h.store.toggle("Focus").unwrap());
    let outcome = h.engine.recognize_and_execute(focus_circle(0.2)).await;
    assert!(outcome.recognition.recognized);
}

#[tokio::test]
async fn test_deleted_routine_is_not_recognized() {
    let h = harness(Box::new(MemoryPersistence::new()));
    register(&h, "Focus", vec![focus_circle(0.0)], vec![Command::host("zen")]);
    register(&h, "Line", vec![horizontal_line()], vec![Command::host("line")]);

    assert!(h.store.delete("Focus").unwrap());
    let result = h.engine.recognize_async(focus_circle(0.0)).await;
    assert!(!result.recognized);
    assert_eq!(result.matched_name.as_deref(), Some("Line"));
}

#[tokio::test]
async fn test_session_reports_recognition() {
    let h = harness(Box::new(MemoryPersistence::new()));
    register(&h, "Focus", vec![focus_circle(0.0)], vec![Command::delay(5)]);

    let session = RecognitionSession::new(h.engine.clone(), h.notifier.clone());
    match session.submit(focus_circle(0.4)).await {
        SessionOutcome::Completed(outcome) => {
            assert!(outcome.recognition.recognized);
            assert_eq!(outcome.execution.unwrap().success_count, 1);
        }
        other => panic!("expected completion, got {:?}", other),
    }
    let messages = h.notifier.messages();
    assert!(messages[0].starts_with("Running Focus"));
    assert_eq!(messages[1], "Routine Focus: 1 succeeded, 0 failed");
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_routines_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("routines.json");

    {
        let h = harness(Box::new(JsonFilePersistence::new(&path)));
        register(
            &h,
            "Focus",
            vec![focus_circle(0.0), focus_circle(0.5)],
            vec![Command::host("zen").with_label("Zen"), Command::delay(100)],
        );
        h.store
            .save_routine(
                Routine::new("Line", vec![Command::shell("ls")], vec![horizontal_line()])
                    .with_delay_ms(250)
                    .with_enabled(false),
            )
            .unwrap();
    }

    let h = harness(Box::new(JsonFilePersistence::new(&path)));
    assert_eq!(h.store.len(), 2);
    let focus = h.store.get("Focus").unwrap();
    assert_eq!(focus.commands[0].label(), "Zen");
    assert_eq!(focus.samples.len(), 2);
    let line = h.store.get("Line").unwrap();
    assert_eq!(line.delay_ms, 250);
    assert!(!line.is_enabled());

    let result = h.engine.recognize_async(focus_circle(0.2)).await;
    assert!(result.recognized);
}

#[test]
fn test_legacy_file_is_migrated_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("routines.json");
    std::fs::write(
        &path,
        r#"{
            "Build": {
                "name": "Build",
                "commands": [
                    "workbench.action.files.saveAll",
                    {"type": "terminal", "command": "cargo build"},
                    {"type": "delay", "command": "500", "label": "Pause"}
                ],
                "samples": [
                    [{"x": 0, "y": 0}, {"x": 10, "y": 10}, {"x": 20, "y": 0}, {"x": 30, "y": 10}, {"x": 40, "y": 0}]
                ]
            }
        }"#,
    )
    .unwrap();

    let h = harness(Box::new(JsonFilePersistence::new(&path)));
    let build = h.store.get("Build").unwrap();
    assert_eq!(
        build.commands,
        vec![
            Command::host("workbench.action.files.saveAll"),
            Command::shell("cargo build"),
            Command::delay(500).with_label("Pause"),
        ]
    );
    assert!(build.is_enabled());
    assert_eq!(build.delay_ms, 0);
}

#[test]
fn test_stroke_files_accept_both_point_shapes() {
    let one = strokes_from_json(r#"[[0, 0], [1, 1], [2, 0]]"#).unwrap();
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].len(), 3);

    let many = strokes_from_json(r#"[[{"x": 0, "y": 0}, {"x": 1, "y": 2}], [[3, 4], [5, 6]]]"#)
        .unwrap();
    assert_eq!(many.len(), 2);
    assert_eq!(many[1].points()[1], Point::new(5.0, 6.0));
}

// ============================================================================
// Store invariants
// ============================================================================

#[test]
fn test_store_rejects_empty_commands_without_mutation() {
    let h = harness(Box::new(MemoryPersistence::new()));
    let err = h
        .store
        .save_routine(Routine::new("Empty", vec![], vec![focus_circle(0.0)]))
        .unwrap_err();
    assert!(matches!(err, gesture_routines::Error::Validation(_)));
    assert!(h.store.is_empty());
}

#[test]
fn test_resave_keeps_created_at() {
    let h = harness(Box::new(MemoryPersistence::new()));
    let first = h
        .store
        .save_routine(Routine::new("R", vec![Command::host("a")], vec![focus_circle(0.0)]))
        .unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = h
        .store
        .save_routine(Routine::new("R", vec![Command::host("b")], vec![focus_circle(0.0)]))
        .unwrap();

    assert_eq!(first.created_at, second.created_at);
    assert!(second.updated_at > first.updated_at);
    assert_eq!(h.store.get("R").unwrap().commands, vec![Command::host("b")]);
}
