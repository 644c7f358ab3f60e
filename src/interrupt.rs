//! SIGINT/SIGTERM handling
//!
//! The handler only records that a signal arrived. The invoker and the
//! orchestrator poll [`is_requested`] and unwind normally, which lets the
//! working directory guard run.

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_signal(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Install handlers for SIGINT and SIGTERM.
pub fn install_handlers() -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(on_signal),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    for signal in [Signal::SIGINT, Signal::SIGTERM] {
        // The handler only touches an atomic, which is async-signal-safe
        unsafe { sigaction(signal, &action) }?;
    }
    Ok(())
}

/// Whether an interrupt has been received.
pub fn is_requested() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Mark the run as interrupted, as if a signal had arrived.
pub fn request() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}
