use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide maintenance switch. While on, only admins get answers.
#[derive(Debug, Default)]
pub struct ModeFlag(AtomicBool);

impl ModeFlag {
    pub fn is_on(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Flips the flag and returns the new state.
    pub fn toggle(&self) -> bool {
        !self.0.fetch_xor(true, Ordering::AcqRel)
    }

    pub fn set(&self, on: bool) {
        self.0.store(on, Ordering::Release);
    }
}
