//! HTTP command handling through `CommandService::handle_request`.

use pulsenode::actuators::{Beam, HapticChannel, Light, Sentry, Servo};
use pulsenode::adapters::device_id::MacString;
use pulsenode::app::commands::CommandKind;
use pulsenode::app::events::NodeEvent;
use pulsenode::app::service::CommandService;
use pulsenode::config::{NodeConfig, Profile};
use pulsenode::error::CommandError;
use pulsenode::waveform::HapticEngine;

use crate::mock_hw::{MockDelay, MockPulser, MockPwm, RecordingSink, Timeline};

const MAC: &str = "de:ad:be:ef:ca:fe";

// Sentry profile channel layout.
const SECONDARY: u8 = 0;
const PRIMARY: u8 = 1;
const PAN: u8 = 2;
const TILT: u8 = 3;

type SentryService = CommandService<MockPwm, MockPulser>;

fn mac() -> MacString {
    MacString::try_from(MAC).unwrap()
}

fn sentry_service(timeline: &Timeline) -> SentryService {
    build_sentry(timeline, "change-me", None)
}

/// `tilt_fail_on` counts the homing write as attempt 0.
fn build_sentry(timeline: &Timeline, token: &str, tilt_fail_on: Option<usize>) -> SentryService {
    let s = NodeConfig::sentry().sentry.unwrap();
    let mut tilt_pwm = MockPwm::new(s.tilt.channel, timeline);
    if let Some(n) = tilt_fail_on {
        tilt_pwm = tilt_pwm.failing_on(n);
    }
    let mut sentry = Sentry::new(
        Servo::new(MockPwm::new(s.pan.channel, timeline), &s.pan),
        Servo::new(tilt_pwm, &s.tilt),
        Beam::new(MockPwm::new(s.primary.channel, timeline), &s.primary),
        Beam::new(MockPwm::new(s.secondary.channel, timeline), &s.secondary),
    );
    sentry.home().unwrap();
    timeline.clear();
    CommandService::new(Profile::Sentry, mac()).with_sentry(sentry, token)
}

// ── Sentry: beams ─────────────────────────────────────────────

#[test]
fn beam_at_rated_power_drives_full_duty() {
    let timeline = Timeline::new();
    let mut service = sentry_service(&timeline);
    let mut sink = RecordingSink::new();

    let reply = service.handle_request(
        "/beam",
        br#"{"target":"primary","active":1,"power":15}"#,
        &mut sink,
    );

    assert_eq!(reply.code, 200);
    assert!(reply.body.contains(r#""beams":{"primary":true,"secondary":false}"#));
    assert_eq!(timeline.writes(PRIMARY), vec![8191]);
    assert!(timeline.writes(SECONDARY).is_empty());
    assert_eq!(sink.events, vec![NodeEvent::CommandApplied(CommandKind::Beam)]);
}

#[test]
fn beam_off_writes_zero() {
    let timeline = Timeline::new();
    let mut service = sentry_service(&timeline);
    let mut sink = RecordingSink::new();

    service.handle_request("/beam", br#"{"target":"secondary","active":1,"power":10}"#, &mut sink);
    let reply = service.handle_request("/beam", br#"{"target":"secondary","active":0,"power":10}"#, &mut sink);

    assert_eq!(reply.code, 200);
    assert_eq!(timeline.writes(SECONDARY), vec![5461, 0]);
    assert!(!service.sentry().unwrap().secondary.is_active());
}

#[test]
fn unknown_beam_target_is_rejected() {
    let timeline = Timeline::new();
    let mut service = sentry_service(&timeline);
    let mut sink = RecordingSink::new();

    let reply = service.handle_request("/beam", br#"{"target":"tertiary","active":1,"power":5}"#, &mut sink);

    assert_eq!(reply.code, 400);
    assert_eq!(timeline.write_count(), 0);
    assert_eq!(
        sink.events,
        vec![NodeEvent::CommandRejected {
            kind: CommandKind::Beam,
            reason: CommandError::UnknownTarget,
        }]
    );
}

#[test]
fn beam_active_flag_must_be_zero_or_one() {
    let timeline = Timeline::new();
    let mut service = sentry_service(&timeline);

    let reply = service.handle_request(
        "/beam",
        br#"{"target":"primary","active":2,"power":5}"#,
        &mut RecordingSink::new(),
    );
    assert_eq!(reply.code, 400);
    assert_eq!(timeline.write_count(), 0);
}

// ── Sentry: servos ────────────────────────────────────────────

#[test]
fn position_with_token_moves_servos() {
    let timeline = Timeline::new();
    let mut service = sentry_service(&timeline);
    let mut sink = RecordingSink::new();

    let reply = service.handle_request(
        "/position",
        br#"{"pan":30,"tilt":-45,"token":"change-me"}"#,
        &mut sink,
    );

    assert_eq!(reply.code, 200);
    assert!(reply.body.contains(r#""servos":{"pan":30,"tilt":-45}"#));
    // 30° → 1766 µs of a 20 ms period at 14 bits.
    assert_eq!(timeline.writes(PAN), vec![1447]);
    assert_eq!(timeline.writes(TILT).len(), 1);
}

#[test]
fn position_without_token_is_unauthorised() {
    let timeline = Timeline::new();
    let mut service = sentry_service(&timeline);
    let mut sink = RecordingSink::new();

    let reply = service.handle_request("/position", br#"{"pan":30}"#, &mut sink);

    assert_eq!(reply.code, 401);
    assert_eq!(timeline.write_count(), 0);
    assert_eq!(service.sentry().unwrap().pan.angle(), 0);
    assert_eq!(
        sink.events,
        vec![NodeEvent::CommandRejected {
            kind: CommandKind::Position,
            reason: CommandError::MissingToken,
        }]
    );
}

#[test]
fn position_with_wrong_token_is_unauthorised() {
    let timeline = Timeline::new();
    let mut service = sentry_service(&timeline);

    let reply = service.handle_request(
        "/position",
        br#"{"pan":30,"token":"guess"}"#,
        &mut RecordingSink::new(),
    );

    assert_eq!(reply.code, 401);
    assert_eq!(timeline.write_count(), 0);
}

#[test]
fn empty_configured_token_opens_nothing() {
    let timeline = Timeline::new();
    let mut service = build_sentry(&timeline, "", None);

    let reply = service.handle_request(
        "/position",
        br#"{"pan":45,"token":""}"#,
        &mut RecordingSink::new(),
    );

    assert_eq!(reply.code, 401);
    assert_eq!(timeline.write_count(), 0);
    assert_eq!(service.sentry().unwrap().pan.angle(), 0);
}

#[test]
fn failed_tilt_write_returns_pan_to_prior_angle() {
    let timeline = Timeline::new();
    let mut service = build_sentry(&timeline, "change-me", Some(1));

    let reply = service.handle_request(
        "/position",
        br#"{"pan":30,"tilt":10,"token":"change-me"}"#,
        &mut RecordingSink::new(),
    );

    assert_eq!(reply.code, 500);
    // Out to 30° (1447), then back to 0° (1188).
    assert_eq!(timeline.writes(PAN), vec![1447, 1188]);
    assert!(timeline.writes(TILT).is_empty());
    let sentry = service.sentry().unwrap();
    assert_eq!((sentry.pan.angle(), sentry.tilt.angle()), (0, 0));
}

#[test]
fn out_of_range_angle_is_skipped_not_clamped() {
    let timeline = Timeline::new();
    let mut service = sentry_service(&timeline);
    let mut sink = RecordingSink::new();

    let reply = service.handle_request(
        "/position",
        br#"{"pan":95,"tilt":10,"token":"change-me"}"#,
        &mut sink,
    );

    assert_eq!(reply.code, 200);
    assert!(timeline.writes(PAN).is_empty());
    assert_eq!(timeline.writes(TILT).len(), 1);
    assert_eq!(service.sentry().unwrap().pan.angle(), 0);
    assert_eq!(service.sentry().unwrap().tilt.angle(), 10);
    assert_eq!(
        sink.count(|e| *e == NodeEvent::ServoRejected { axis: "pan", angle: 95 }),
        1
    );
}

// ── Status ────────────────────────────────────────────────────

#[test]
fn sentry_status_reports_identity_and_state() {
    let timeline = Timeline::new();
    let mut service = sentry_service(&timeline);

    let reply = service.handle_request("/status", b"", &mut RecordingSink::new());

    assert_eq!(reply.code, 200);
    assert_eq!(
        reply.body,
        r#"{"system":{"mac":"de:ad:be:ef:ca:fe"},"servos":{"pan":0,"tilt":0},"beams":{"primary":false,"secondary":false}}"#
    );
}

#[test]
fn unknown_path_is_not_found() {
    let timeline = Timeline::new();
    let mut service = sentry_service(&timeline);
    assert_eq!(service.handle_request("/reboot", b"{}", &mut RecordingSink::new()).code, 404);
}

#[test]
fn malformed_body_is_bad_request() {
    let timeline = Timeline::new();
    let mut service = sentry_service(&timeline);
    let reply = service.handle_request("/beam", b"{not json", &mut RecordingSink::new());
    assert_eq!(reply.code, 400);
    assert!(reply.body.contains("error"));
}

// ── Motion node: light ────────────────────────────────────────

fn motion_service(timeline: &Timeline) -> CommandService<MockPwm, MockPulser> {
    let light = NodeConfig::motion().light.unwrap();
    CommandService::new(Profile::Motion, mac()).with_light(Light::new(MockPwm::new(light, timeline)))
}

#[test]
fn dim_sets_light_duty() {
    let timeline = Timeline::new();
    let mut service = motion_service(&timeline);

    let reply = service.handle_request("/dim", br#"{"dim":50}"#, &mut RecordingSink::new());

    assert_eq!(reply.code, 200);
    assert_eq!(reply.body, r#"{"status":"OK"}"#);
    assert_eq!(timeline.writes(0), vec![2047]);
}

#[test]
fn dim_outside_percent_range_is_rejected() {
    let timeline = Timeline::new();
    let mut service = motion_service(&timeline);

    assert_eq!(service.handle_request("/dim", br#"{"dim":150}"#, &mut RecordingSink::new()).code, 400);
    assert_eq!(service.handle_request("/dim", br#"{"dim":-1}"#, &mut RecordingSink::new()).code, 400);
    assert_eq!(service.handle_request("/dim", br#"{"dim":50.7}"#, &mut RecordingSink::new()).code, 400);
    assert_eq!(timeline.write_count(), 0);
}

#[test]
fn pulse_on_node_without_motors_is_not_found() {
    let timeline = Timeline::new();
    let mut service = motion_service(&timeline);

    let reply = service.handle_request("/pulse", br#"{"freq":0,"amplitude":100,"power":1}"#, &mut RecordingSink::new());
    assert_eq!(reply.code, 404);
}

// ── Haptic node ───────────────────────────────────────────────

fn haptic_service(timeline: &Timeline) -> CommandService<MockPwm, HapticEngine<MockPwm, MockDelay>> {
    let h = NodeConfig::haptic().haptic.unwrap();
    let engine = HapticEngine::new(
        HapticChannel::new(MockPwm::new(h.high.channel, timeline), &h.high),
        HapticChannel::new(MockPwm::new(h.low.channel, timeline), &h.low),
        MockDelay::new(timeline),
    );
    CommandService::new(Profile::Haptic, mac()).with_haptics(engine)
}

#[test]
fn pulse_command_plays_the_requested_class() {
    let timeline = Timeline::new();
    let mut service = haptic_service(&timeline);
    let mut sink = RecordingSink::new();

    let reply = service.handle_request("/pulse", br#"{"freq":1,"amplitude":50,"power":2}"#, &mut sink);

    assert_eq!(reply.code, 200);
    assert_eq!(timeline.writes(1), vec![4096, 0, 4096, 0]);
    assert_eq!(sink.count(|e| matches!(e, NodeEvent::PulseCompleted(_))), 1);
}

#[test]
fn negative_amplitude_plays_silently() {
    let timeline = Timeline::new();
    let mut service = haptic_service(&timeline);

    let reply = service.handle_request("/pulse", br#"{"freq":0,"amplitude":-20,"power":1}"#, &mut RecordingSink::new());

    assert_eq!(reply.code, 200);
    assert_eq!(timeline.writes(0), vec![0, 0]);
}

#[test]
fn pulse_parameters_are_range_checked() {
    let timeline = Timeline::new();
    let mut service = haptic_service(&timeline);
    let mut sink = RecordingSink::new();

    let bad_freq = service.handle_request("/pulse", br#"{"freq":4,"amplitude":100,"power":1}"#, &mut sink);
    let bad_power = service.handle_request("/pulse", br#"{"freq":0,"amplitude":100,"power":101}"#, &mut sink);

    assert_eq!(bad_freq.code, 400);
    assert_eq!(bad_power.code, 400);
    assert_eq!(timeline.write_count(), 0);
    assert_eq!(
        sink.events,
        vec![
            NodeEvent::CommandRejected {
                kind: CommandKind::Pulse,
                reason: CommandError::OutOfRange("freq"),
            },
            NodeEvent::CommandRejected {
                kind: CommandKind::Pulse,
                reason: CommandError::OutOfRange("power"),
            },
        ]
    );
}
