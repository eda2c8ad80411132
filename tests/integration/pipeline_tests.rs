//! Edge → debounce → queue → worker, end to end on the host.

use std::sync::{Arc, Mutex};

use pulsenode::app::events::NodeEvent;
use pulsenode::config::{EVENT_QUEUE_DEPTH, EventName, NodeConfig};
use pulsenode::pipeline::{Dispatch, EdgeOutcome, EventPipeline, MotionEvent, Worker};
use pulsenode::waveform::{FrequencyClass, HapticEngine};

use crate::mock_hw::{
    Action, MockDelay, MockNotifier, MockPulser, MockPwm, RecordingSink, Timeline, action_log, actions,
};

const MOTION_1: &str = "http://10.0.1.2:5058/motion-1";
const MOTION_2: &str = "http://10.0.1.2:5058/motion-2";

fn motion_pipeline(config: &NodeConfig) -> EventPipeline {
    EventPipeline::new(&config.monitored_pins(), config.debounce_window_ms, 0)
}

// ── Motion profile ────────────────────────────────────────────

#[test]
fn bouncing_sensor_posts_once_per_window() {
    let config = NodeConfig::motion();
    let pipeline = motion_pipeline(&config);
    let log = action_log();
    let mut sink = RecordingSink::new();

    assert_eq!(pipeline.on_rising_edge(2, 0), EdgeOutcome::Accepted);
    assert_eq!(pipeline.on_rising_edge(2, 300), EdgeOutcome::Debounced);
    assert_eq!(pipeline.on_rising_edge(2, 800), EdgeOutcome::Accepted);

    let mut worker = Worker::new(
        &pipeline,
        &config,
        MockNotifier::ok(&log),
        None::<MockPulser>,
        &mut sink,
    );
    assert_eq!(worker.process_pending(), 2);
    assert_eq!(worker.handled(), 2);
    drop(worker);

    assert_eq!(
        actions(&log),
        vec![Action::Notify(MOTION_1.into()), Action::Notify(MOTION_1.into())]
    );
    assert_eq!(
        sink.count(|e| matches!(e, NodeEvent::NotifyDelivered { status: 200, .. })),
        2
    );
    let stats = pipeline.stats();
    assert_eq!((stats.accepted, stats.debounced, stats.dropped, stats.pending), (2, 1, 0, 0));
}

#[test]
fn each_pin_posts_its_own_event_name() {
    let config = NodeConfig::motion();
    let pipeline = motion_pipeline(&config);
    let log = action_log();

    pipeline.on_rising_edge(4, 10);
    pipeline.on_rising_edge(2, 20);

    let mut worker = Worker::new(&pipeline, &config, MockNotifier::ok(&log), None::<MockPulser>, RecordingSink::new());
    worker.process_pending();

    // Dequeue order matches enqueue order.
    assert_eq!(
        actions(&log),
        vec![Action::Notify(MOTION_2.into()), Action::Notify(MOTION_1.into())]
    );
}

#[test]
fn event_from_unrouted_pin_is_ignored() {
    let config = NodeConfig::motion();
    let pipeline = motion_pipeline(&config);
    let log = action_log();
    let mut worker = Worker::new(&pipeline, &config, MockNotifier::ok(&log), None::<MockPulser>, RecordingSink::new());

    let outcome = worker.dispatch(MotionEvent {
        source_pin: 33,
        timestamp_ms: 5,
    });

    assert_eq!(outcome, Dispatch::Ignored);
    assert_eq!(worker.handled(), 0);
    assert!(actions(&log).is_empty());
    assert_eq!(worker.sink().events, vec![NodeEvent::MotionIgnored { pin: 33 }]);
}

#[test]
fn unmonitored_edge_never_reaches_the_queue() {
    let pipeline = motion_pipeline(&NodeConfig::motion());
    assert_eq!(pipeline.on_rising_edge(33, 0), EdgeOutcome::Unmonitored);
    assert!(pipeline.queue().is_empty());
}

#[test]
fn failed_notification_does_not_stop_the_worker() {
    let config = NodeConfig::motion();
    let pipeline = motion_pipeline(&config);
    let log = action_log();

    pipeline.on_rising_edge(2, 0);
    pipeline.on_rising_edge(4, 0);

    let mut worker = Worker::new(
        &pipeline,
        &config,
        MockNotifier::failing(&log),
        None::<MockPulser>,
        RecordingSink::new(),
    );
    assert_eq!(worker.process_pending(), 2);

    assert_eq!(actions(&log).len(), 2);
    assert_eq!(
        worker.sink().count(|e| matches!(e, NodeEvent::NotifyFailed(_))),
        2
    );
    assert!(pipeline.queue().is_empty());
}

#[test]
fn burst_beyond_queue_depth_is_dropped_and_counted() {
    let config = NodeConfig::motion();
    let pipeline = motion_pipeline(&config);

    let outcomes: Vec<_> = (0..EVENT_QUEUE_DEPTH as u32 + 3)
        .map(|i| pipeline.on_rising_edge(2, i * 1_000))
        .collect();

    assert!(outcomes[..EVENT_QUEUE_DEPTH].iter().all(|&o| o == EdgeOutcome::Accepted));
    assert!(outcomes[EVENT_QUEUE_DEPTH..].iter().all(|&o| o == EdgeOutcome::Dropped));
    let stats = pipeline.stats();
    assert_eq!(stats.accepted, EVENT_QUEUE_DEPTH as u32);
    assert_eq!(stats.dropped, 3);
    assert_eq!(stats.pending, EVENT_QUEUE_DEPTH as u32);

    // Draining makes room again.
    let log = action_log();
    let mut worker = Worker::new(&pipeline, &config, MockNotifier::ok(&log), None::<MockPulser>, RecordingSink::new());
    assert_eq!(worker.process_pending(), EVENT_QUEUE_DEPTH);
    assert_eq!(pipeline.on_rising_edge(2, 50_000), EdgeOutcome::Accepted);
}

// ── Haptic profile ────────────────────────────────────────────

#[test]
fn local_pulse_runs_before_notification() {
    let mut config = NodeConfig::haptic();
    config.routes[0].event = EventName::try_from("tap").ok();
    let pipeline = motion_pipeline(&config);
    let log = action_log();

    pipeline.on_rising_edge(4, 0);
    let mut worker = Worker::new(
        &pipeline,
        &config,
        MockNotifier::ok(&log),
        MockPulser { log: Arc::clone(&log) },
        RecordingSink::new(),
    );
    worker.process_pending();

    assert_eq!(
        actions(&log),
        vec![
            Action::Pulse(FrequencyClass::LightTap),
            Action::Notify("http://10.0.1.2:5058/tap".into()),
        ]
    );
}

#[test]
fn trigger_edge_drives_the_real_synthesizer() {
    let config = NodeConfig::haptic();
    let haptic = config.haptic.expect("haptic profile has motors");
    let timeline = Timeline::new();
    let engine = Arc::new(Mutex::new(HapticEngine::new(
        pulsenode::actuators::HapticChannel::new(MockPwm::new(haptic.high.channel, &timeline), &haptic.high),
        pulsenode::actuators::HapticChannel::new(MockPwm::new(haptic.low.channel, &timeline), &haptic.low),
        MockDelay::new(&timeline),
    )));
    let pipeline = motion_pipeline(&config);
    let log = action_log();

    pipeline.on_rising_edge(4, 0);
    pipeline.on_rising_edge(4, 100);

    let mut worker = Worker::new(&pipeline, &config, MockNotifier::ok(&log), Arc::clone(&engine), RecordingSink::new());
    let n = worker.process_pending();

    assert_eq!(n, 1);
    // Light tap, full amplitude, twice: peak/zero/peak/zero on the high motor.
    assert_eq!(timeline.writes(haptic.high.channel.channel), vec![8191, 0, 8191, 0]);
    // The haptic trigger route posts nothing.
    assert!(actions(&log).is_empty());
    assert_eq!(
        worker.sink().count(|e| matches!(e, NodeEvent::PulseCompleted(r) if r.writes == 4)),
        1
    );
}
