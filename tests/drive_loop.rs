//! Drive loop integration: scripted frame source, sim motor probes.

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use anyhow::{anyhow, Result};

use greenlight_rover::{
    DigitalProbe, DriveLoop, DriveState, Frame, FrameSource, GreenSignalDetector, MotorActuator,
    PwmProbe, SimDigitalOutput, SimPwmOutput, WheelOutputs,
};

/// Serves a fixed frame sequence, then fails like a dead camera.
struct ScriptedSource {
    frames: VecDeque<Frame>,
    opened: bool,
    closed: bool,
}

impl ScriptedSource {
    fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
            opened: false,
            closed: false,
        }
    }
}

impl FrameSource for ScriptedSource {
    fn open(&mut self) -> Result<()> {
        self.opened = true;
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Frame> {
        self.frames
            .pop_front()
            .ok_or_else(|| anyhow!("frame source exhausted"))
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

struct WheelProbes {
    forward: DigitalProbe,
    backward: DigitalProbe,
    throttle: PwmProbe,
}

fn sim_wheel(side: &str) -> (WheelOutputs, WheelProbes) {
    let forward = SimDigitalOutput::new(&format!("{side}-fwd"));
    let backward = SimDigitalOutput::new(&format!("{side}-back"));
    let throttle = SimPwmOutput::new(&format!("{side}-pwm"));
    let probes = WheelProbes {
        forward: forward.probe(),
        backward: backward.probe(),
        throttle: throttle.probe(),
    };
    let outputs = WheelOutputs {
        forward: Box::new(forward),
        backward: Box::new(backward),
        throttle: Box::new(throttle),
    };
    (outputs, probes)
}

fn full_frame_drive_loop() -> (DriveLoop, WheelProbes, WheelProbes) {
    let mut detector = GreenSignalDetector::new();
    detector.set_region(0.0, 0.0, 1.0, 1.0);
    let (left, left_probes) = sim_wheel("left");
    let (right, right_probes) = sim_wheel("right");
    let actuator = MotorActuator::new(left, right);
    let drive = DriveLoop::new(detector, actuator).with_poll_interval(Duration::ZERO);
    (drive, left_probes, right_probes)
}

fn dark() -> Frame {
    Frame::black(100, 100)
}

fn green() -> Frame {
    Frame::filled(100, 100, [0, 255, 0])
}

#[test]
fn consecutive_signal_frames_issue_exactly_one_forward_command() {
    let (mut drive, left, _right) = full_frame_drive_loop();
    let mut source =
        ScriptedSource::new(vec![dark(), dark(), dark(), green(), green(), green(), green()]);
    let stop = AtomicBool::new(false);

    // The loop exits through source exhaustion; the exhaustion error is the
    // run's result, cleanup has already happened.
    let result = drive.run(&mut source, &stop);
    assert!(result.is_err());
    assert_eq!(drive.state(), DriveState::Moving);

    let history = left.throttle.duty_history();
    let cruise_commands = history.iter().filter(|&&d| d == 0.5).count();
    assert_eq!(cruise_commands, 1, "history: {:?}", history);
}

#[test]
fn exit_during_moving_stops_then_releases_exactly_once() {
    let (mut drive, left, right) = full_frame_drive_loop();
    let mut source = ScriptedSource::new(vec![green(), green()]);
    let stop = AtomicBool::new(false);

    let result = drive.run(&mut source, &stop);
    assert!(result.is_err());
    assert_eq!(drive.state(), DriveState::Moving);

    // Motors de-energized, channels released once, source closed.
    assert!(!left.forward.is_high());
    assert!(!left.backward.is_high());
    assert_eq!(left.throttle.duty(), 0.0);
    assert!(!right.forward.is_high());
    assert_eq!(left.throttle.releases(), 1);
    assert_eq!(left.forward.releases(), 1);
    assert_eq!(left.backward.releases(), 1);
    assert_eq!(right.throttle.releases(), 1);
    assert!(source.closed);
}

#[test]
fn stop_flag_requests_a_clean_exit() {
    let (mut drive, left, _right) = full_frame_drive_loop();
    let mut source = ScriptedSource::new(vec![dark(); 100]);
    let stop = AtomicBool::new(true);

    let result = drive.run(&mut source, &stop);
    assert!(result.is_ok());
    assert_eq!(drive.state(), DriveState::WaitingForSignal);
    assert_eq!(left.throttle.releases(), 1);
    assert!(source.closed);
    // No frame consumed: the flag is checked before every read.
    assert_eq!(source.frames.len(), 100);
}

#[test]
fn open_failure_still_runs_cleanup() {
    struct BrokenSource {
        closed: bool,
    }
    impl FrameSource for BrokenSource {
        fn open(&mut self) -> Result<()> {
            Err(anyhow!("device unavailable"))
        }
        fn read_frame(&mut self) -> Result<Frame> {
            unreachable!("read after failed open")
        }
        fn close(&mut self) {
            self.closed = true;
        }
    }

    let (mut drive, left, _right) = full_frame_drive_loop();
    let mut source = BrokenSource { closed: false };
    let stop = AtomicBool::new(false);

    let result = drive.run(&mut source, &stop);
    assert!(result.is_err());
    assert_eq!(left.throttle.releases(), 1);
    assert!(source.closed);
}

#[test]
fn dark_frames_keep_the_rover_waiting() {
    let (mut drive, left, right) = full_frame_drive_loop();
    let mut source = ScriptedSource::new(vec![dark(); 5]);
    let stop = AtomicBool::new(false);

    let _ = drive.run(&mut source, &stop);
    assert_eq!(drive.state(), DriveState::WaitingForSignal);

    // Nothing but the initial stop and cleanup zeros ever hit the wheels.
    assert!(left.throttle.duty_history().iter().all(|&d| d == 0.0));
    assert!(right.throttle.duty_history().iter().all(|&d| d == 0.0));
}
