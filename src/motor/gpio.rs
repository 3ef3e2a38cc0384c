//! Hardware output seam.
//!
//! The actuator drives two binary direction lines and one duty-cycle channel
//! per side through these traits. A deployment implements them over its GPIO
//! library; the crate ships simulated backends whose probes record every
//! level and duty transition, serving both the tests and bench runs of
//! `roverd` without a driver board attached.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// A binary direction line.
pub trait DigitalOutput: Send {
    fn set_level(&mut self, high: bool);

    /// Release the underlying channel. Called exactly once at shutdown.
    fn release(&mut self);
}

/// A duty-cycle output channel. Duty is a fraction in [0,1].
pub trait PwmOutput: Send {
    fn set_duty_cycle(&mut self, duty: f64);

    /// Release the underlying channel. Called exactly once at shutdown.
    fn release(&mut self);
}

#[derive(Default)]
struct DigitalState {
    high: AtomicBool,
    releases: AtomicU32,
}

#[derive(Default)]
struct PwmState {
    duty_history: Mutex<Vec<f64>>,
    releases: AtomicU32,
}

/// Simulated direction line.
pub struct SimDigitalOutput {
    label: String,
    state: Arc<DigitalState>,
}

impl SimDigitalOutput {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            state: Arc::new(DigitalState::default()),
        }
    }

    /// Observation handle; grab it before boxing the output into a wheel.
    pub fn probe(&self) -> DigitalProbe {
        DigitalProbe(self.state.clone())
    }
}

impl DigitalOutput for SimDigitalOutput {
    fn set_level(&mut self, high: bool) {
        log::trace!("{}: level {}", self.label, if high { "high" } else { "low" });
        self.state.high.store(high, Ordering::SeqCst);
    }

    fn release(&mut self) {
        log::trace!("{}: released", self.label);
        self.state.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Read side of a `SimDigitalOutput`.
#[derive(Clone)]
pub struct DigitalProbe(Arc<DigitalState>);

impl DigitalProbe {
    pub fn is_high(&self) -> bool {
        self.0.high.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> u32 {
        self.0.releases.load(Ordering::SeqCst)
    }
}

/// Simulated duty-cycle channel.
pub struct SimPwmOutput {
    label: String,
    state: Arc<PwmState>,
}

impl SimPwmOutput {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            state: Arc::new(PwmState::default()),
        }
    }

    pub fn probe(&self) -> PwmProbe {
        PwmProbe(self.state.clone())
    }
}

impl PwmOutput for SimPwmOutput {
    fn set_duty_cycle(&mut self, duty: f64) {
        log::trace!("{}: duty {:.2}", self.label, duty);
        self.state
            .duty_history
            .lock()
            .expect("duty history lock")
            .push(duty);
    }

    fn release(&mut self) {
        log::trace!("{}: released", self.label);
        self.state.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Read side of a `SimPwmOutput`.
#[derive(Clone)]
pub struct PwmProbe(Arc<PwmState>);

impl PwmProbe {
    /// The currently applied duty, 0.0 before any command.
    pub fn duty(&self) -> f64 {
        self.0
            .duty_history
            .lock()
            .expect("duty history lock")
            .last()
            .copied()
            .unwrap_or(0.0)
    }

    /// Every duty value applied, in order.
    pub fn duty_history(&self) -> Vec<f64> {
        self.0.duty_history.lock().expect("duty history lock").clone()
    }

    pub fn releases(&self) -> u32 {
        self.0.releases.load(Ordering::SeqCst)
    }
}
