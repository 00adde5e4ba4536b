//! Operator interrupts during discovery.
//!
//! While armed, SIGINT only raises a flag that discovery polls, so the
//! current root is abandoned and the process keeps going. Any child tool in
//! the foreground process group receives the same signal and exits on its
//! own. Outside an armed section SIGINT ends the process as usual.

use crate::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
struct State {
    armed: AtomicBool,
    raised: AtomicBool,
}

/// Shared interrupt flag; clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<State>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route SIGINT of this process to a new flag.
    ///
    /// Can only be called once per process.
    pub fn install() -> Result<Self, Error> {
        let interrupt = Self::new();
        let handler = interrupt.clone();
        ctrlc::set_handler(move || {
            if !handler.raise() {
                std::process::exit(130);
            }
        })?;
        debug!("Interrupt handler installed");
        Ok(interrupt)
    }

    /// Raise the flag. Returns `false`, leaving it lowered, when not armed.
    pub fn raise(&self) -> bool {
        if !self.0.armed.load(Ordering::SeqCst) {
            return false;
        }
        self.0.raised.store(true, Ordering::SeqCst);
        true
    }

    pub fn is_raised(&self) -> bool {
        self.0.raised.load(Ordering::SeqCst)
    }

    /// Lower the flag, returning whether it was raised.
    pub fn take(&self) -> bool {
        self.0.raised.swap(false, Ordering::SeqCst)
    }

    /// Arm until the returned guard is dropped.
    pub fn arm(&self) -> Armed<'_> {
        self.0.raised.store(false, Ordering::SeqCst);
        self.0.armed.store(true, Ordering::SeqCst);
        Armed(&self.0)
    }
}

/// Keeps an [`Interrupt`] armed; disarms and lowers it on drop.
#[must_use = "the interrupt is disarmed as soon as the guard is dropped"]
pub struct Armed<'a>(&'a State);

impl Drop for Armed<'_> {
    fn drop(&mut self) {
        self.0.armed.store(false, Ordering::SeqCst);
        self.0.raised.store(false, Ordering::SeqCst);
    }
}
