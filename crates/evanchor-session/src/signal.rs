//! # Completion Signalling
//!
//! The invoking framework holds resources open until it is told the
//! invocation finished. [`CompletionSignal::complete`] consumes the signal
//! by value, so notifying twice does not compile — the "exactly once"
//! contract is enforced by the type system rather than by discipline.

use crate::error::AnchorError;
use crate::session::AnchorOutcome;

/// One-shot notification back to the invoking framework.
///
/// [`AnchoringSession::dispatch`](crate::AnchoringSession::dispatch)
/// invokes this exactly once per invocation, on both the success and the
/// failure path.
pub trait CompletionSignal {
    /// Consume the signal with the invocation's outcome.
    fn complete(self, outcome: Result<&AnchorOutcome, &AnchorError>);
}

/// Closures work directly as completion signals.
impl<F> CompletionSignal for F
where
    F: FnOnce(Result<&AnchorOutcome, &AnchorError>),
{
    fn complete(self, outcome: Result<&AnchorOutcome, &AnchorError>) {
        self(outcome)
    }
}
