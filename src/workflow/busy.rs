//! Single-active-operation gate.

use parking_lot::Mutex;

/// Gate that admits one remote operation at a time.
///
/// A caller that finds the gate taken is expected to skip its work, not
/// wait. The guard returned by [`BusyFlag::try_acquire`] releases the gate
/// when dropped, so every exit path of an operation clears it.
///
/// # Examples
///
/// ```
/// use ragflow::workflow::BusyFlag;
///
/// let busy = BusyFlag::new();
/// let guard = busy.try_acquire().unwrap();
/// assert!(busy.is_busy());
/// assert!(busy.try_acquire().is_none());
/// drop(guard);
/// assert!(!busy.is_busy());
/// ```
#[derive(Debug, Default)]
pub struct BusyFlag {
    gate: Mutex<Gate>,
}

#[derive(Debug, Default)]
struct Gate {
    /// Ticket of the current holder, `None` when idle.
    holder: Option<u64>,
    /// Last ticket handed out.
    issued: u64,
}

impl BusyFlag {
    /// Creates an idle gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the gate, or returns `None` if it is already taken.
    #[must_use]
    pub fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        let mut gate = self.gate.lock();
        if gate.holder.is_some() {
            return None;
        }
        gate.issued = gate.issued.wrapping_add(1);
        let ticket = gate.issued;
        gate.holder = Some(ticket);
        Some(BusyGuard { flag: self, ticket })
    }

    /// Returns true while an operation holds the gate.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.gate.lock().holder.is_some()
    }

    /// Forces the gate open.
    ///
    /// A guard taken before the call no longer owns the gate and will not
    /// release a later holder when it drops.
    pub fn clear(&self) {
        self.gate.lock().holder = None;
    }
}

/// Holds the gate until dropped.
#[derive(Debug)]
pub struct BusyGuard<'a> {
    flag: &'a BusyFlag,
    ticket: u64,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut gate = self.flag.gate.lock();
        if gate.holder == Some(self.ticket) {
            gate.holder = None;
        }
    }
}
