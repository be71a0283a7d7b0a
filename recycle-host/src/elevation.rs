//! Scoped elevated execution.
//!
//! [`ElevatedScope`] widens the ambient capability on acquisition and
//! restores it when dropped, so every exit path — normal return, `?`, or
//! panic — leaves the broker back at ambient capability.

use crate::error::Result;
use crate::traits::PrivilegeBroker;

/// RAII guard over an elevated capability context.
#[must_use = "dropping the scope immediately restores ambient capability"]
pub struct ElevatedScope<'a> {
    broker: &'a dyn PrivilegeBroker,
}

impl<'a> ElevatedScope<'a> {
    /// Enter the elevated context. Fails if the broker is already elevated.
    pub fn acquire(broker: &'a dyn PrivilegeBroker) -> Result<Self> {
        broker.elevate()?;
        Ok(Self { broker })
    }
}

impl Drop for ElevatedScope<'_> {
    fn drop(&mut self) {
        self.broker.restore();
    }
}

/// Run one unit of work under elevated capability.
///
/// The guard is held for exactly the duration of `work`; capability is
/// restored before this function returns, even if `work` panics.
pub fn run_elevated<R>(broker: &dyn PrivilegeBroker, work: impl FnOnce() -> R) -> Result<R> {
    let _scope = ElevatedScope::acquire(broker)?;
    Ok(work())
}
