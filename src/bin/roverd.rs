//! roverd - rover control daemon
//!
//! Three modes:
//! 1. `light`: classify frames and log detections, motors untouched
//! 2. `motor`: scripted actuation sequence, no camera
//! 3. `all`: the full wait-for-green autonomous loop
//!
//! Ctrl-C raises a cooperative stop flag polled once per loop iteration; the
//! actuator releases its channels on every exit path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use greenlight_rover::{
    open_source, DriveLoop, FrameSource, GreenSignalDetector, MotorActuator, RoverConfig,
    SimDigitalOutput, SimPwmOutput, WheelOutputs,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Signal detection only.
    Light,
    /// Motor exercise only.
    Motor,
    /// Full autonomous run.
    All,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Run mode.
    #[arg(long, value_enum, default_value_t = Mode::All)]
    mode: Mode,
    /// Camera device path (overrides config), e.g. /dev/video0 or stub://camera.
    #[arg(long)]
    device: Option<String>,
    /// Log per-frame detection metrics.
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut cfg = RoverConfig::load()?;
    if let Some(device) = args.device {
        cfg.camera.device = device;
    }

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || {
            stop.store(true, Ordering::Relaxed);
        })
        .expect("error setting Ctrl-C handler");
    }

    log::info!("roverd starting (mode {:?}, device {})", args.mode, cfg.camera.device);

    match args.mode {
        Mode::Light => run_signal_test(&cfg, &stop),
        Mode::Motor => run_motor_test(&cfg, &stop),
        Mode::All => run_autonomous(&cfg, &stop),
    }
}

/// Wire the sim GPIO backend with the wheel pin labels of the reference
/// chassis. A hardware deployment swaps in real `DigitalOutput`/`PwmOutput`
/// implementations here.
fn sim_actuator() -> MotorActuator {
    let left = WheelOutputs {
        forward: Box::new(SimDigitalOutput::new("gpio16/left-fwd")),
        backward: Box::new(SimDigitalOutput::new("gpio18/left-back")),
        throttle: Box::new(SimPwmOutput::new("gpio12/left-pwm")),
    };
    let right = WheelOutputs {
        forward: Box::new(SimDigitalOutput::new("gpio36/right-fwd")),
        backward: Box::new(SimDigitalOutput::new("gpio38/right-back")),
        throttle: Box::new(SimPwmOutput::new("gpio32/right-pwm")),
    };
    MotorActuator::new(left, right)
}

fn run_signal_test(cfg: &RoverConfig, stop: &AtomicBool) -> Result<()> {
    log::info!("signal test: waiting for green, Ctrl-C to exit");

    let detector = GreenSignalDetector::from_settings(&cfg.detector);
    let mut source = open_source(&cfg.camera)?;

    let result = signal_test_loop(&detector, source.as_mut(), cfg, stop);
    source.close();
    result
}

fn signal_test_loop(
    detector: &GreenSignalDetector,
    source: &mut dyn FrameSource,
    cfg: &RoverConfig,
    stop: &AtomicBool,
) -> Result<()> {
    source.open()?;
    let mut was_present = false;
    while !stop.load(Ordering::Relaxed) {
        let frame = source.read_frame()?;
        let result = detector.classify(&frame);
        log::debug!(
            "lit={} region={} ratio={:.4} present={}",
            result.lit_pixels,
            result.region_pixels,
            result.lit_ratio,
            result.signal_present
        );
        if result.signal_present && !was_present {
            log::info!(
                "GREEN SIGNAL DETECTED (lit={} ratio={:.4})",
                result.lit_pixels,
                result.lit_ratio
            );
        }
        was_present = result.signal_present;
        std::thread::sleep(cfg.drive.poll_interval);
    }
    Ok(())
}

fn run_motor_test(cfg: &RoverConfig, stop: &AtomicBool) -> Result<()> {
    log::info!("motor test starting");
    let mut actuator = sim_actuator();
    let speed = cfg.drive.cruise_speed;

    let steps: [(&str, fn(&mut MotorActuator, f64), Duration); 5] = [
        ("forward", MotorActuator::forward, Duration::from_secs(2)),
        ("turn left", MotorActuator::turn_left, Duration::from_secs(2)),
        ("turn right", MotorActuator::turn_right, Duration::from_secs(2)),
        ("rotate left", MotorActuator::rotate_left, Duration::from_secs(2)),
        ("rotate right", MotorActuator::rotate_right, Duration::from_secs(2)),
    ];

    for (name, command, hold) in steps {
        log::info!("motor test: {}", name);
        command(&mut actuator, speed);
        if !pause(stop, hold) {
            break;
        }
        actuator.stop();
        if !pause(stop, Duration::from_secs(1)) {
            break;
        }
    }

    actuator.stop();
    actuator.shutdown();
    log::info!("motor test finished");
    Ok(())
}

/// Sleep in short slices so Ctrl-C interrupts a hold promptly. Returns false
/// when a stop was requested.
fn pause(stop: &AtomicBool, total: Duration) -> bool {
    let slice = Duration::from_millis(50);
    let mut remaining = total;
    while !remaining.is_zero() {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        let step = remaining.min(slice);
        std::thread::sleep(step);
        remaining -= step;
    }
    !stop.load(Ordering::Relaxed)
}

fn run_autonomous(cfg: &RoverConfig, stop: &AtomicBool) -> Result<()> {
    log::info!("autonomous mode: waiting for green signal");

    let detector = GreenSignalDetector::from_settings(&cfg.detector);
    let actuator = sim_actuator();
    let mut source = open_source(&cfg.camera)?;

    let mut drive = DriveLoop::new(detector, actuator)
        .with_cruise_speed(cfg.drive.cruise_speed)
        .with_poll_interval(cfg.drive.poll_interval);

    drive.run(source.as_mut(), stop)
}
