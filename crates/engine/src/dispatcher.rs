//! Invocation dispatcher
//!
//! Runs one invocation as a frame on the call stack:
//!
//! 1. Build the frame; fails with `CallDepthExceeded` at the nesting limit.
//! 2. Resolve target and method; fails with `MethodNotFound`.
//! 3. Push the frame and move the amount from caller to target inside it.
//! 4. Run the method body with a [`CallContext`] scoped to the target and
//!    checked against its declared tables.
//! 5. Commit on success, roll back on any failure.
//!
//! The transfer is a write in the frame's own log, so a rollback undoes it
//! along with every table write and every nested frame merged so far.
//! Failures of nested frames reach the invoker wrapped in
//! `InvocationFailure`; the outermost frame returns the original error.

use tessera_concurrency::{CallStack, CommitOutcome, FrameState, Invocation};
use tessera_core::{Error, Name, Result, Timestamp};
use tracing::debug;

use crate::context::CallContext;
use crate::ledger::Ledger;

/// Execute `invocation` on top of `stack`
pub(crate) fn dispatch(
    ledger: &Ledger,
    stack: &mut CallStack,
    now: Timestamp,
    invocation: Invocation,
) -> Result<()> {
    let nested = !stack.is_empty();
    let contract = invocation.target.clone();
    let method = invocation.method.clone();

    match run_frame(ledger, stack, now, invocation) {
        Err(source) if nested => Err(Error::InvocationFailure {
            contract,
            method,
            source: Box::new(source),
        }),
        other => other,
    }
}

fn run_frame(
    ledger: &Ledger,
    stack: &mut CallStack,
    now: Timestamp,
    invocation: Invocation,
) -> Result<()> {
    let mut frame = stack.new_frame(invocation)?;
    frame.mark_resolving()?;

    let resolved = ledger.resolve(&frame.invocation.target, &frame.invocation.method);
    let (contract, schema) = match resolved {
        Ok(resolved) => resolved,
        Err(err) => {
            frame.mark_rolled_back(err.to_string())?;
            return Err(err);
        }
    };

    frame.mark_executing()?;
    let depth = frame.depth;
    let invocation = frame.invocation.clone();
    stack.push(frame)?;
    ledger.counters().record_start(depth);

    debug!(
        target: "tessera::dispatch",
        caller = %invocation.caller,
        contract = %invocation.target,
        method = %invocation.method,
        amount = invocation.amount,
        depth,
        "Invocation started"
    );

    let result = transfer(ledger, stack, &invocation).and_then(|()| {
        let mut ctx = CallContext::new(
            ledger,
            &mut *stack,
            &schema,
            now,
            invocation.clone(),
            depth,
        );
        contract.invoke(&mut ctx, &invocation.method, &invocation.args)
    });

    match result {
        Ok(()) => {
            let outcome = stack.commit_top(ledger.store())?;
            ledger.counters().record_commit();
            if let CommitOutcome::Applied(version) = outcome {
                debug!(
                    target: "tessera::dispatch",
                    contract = %invocation.target,
                    method = %invocation.method,
                    version,
                    "Transaction committed"
                );
            }
            Ok(())
        }
        Err(err) => {
            stack.rollback_top(err.to_string())?;
            ledger.counters().record_rollback();
            debug!(
                target: "tessera::dispatch",
                contract = %invocation.target,
                method = %invocation.method,
                depth,
                error = %err,
                "Invocation rolled back"
            );
            Err(err)
        }
    }
}

fn transfer(ledger: &Ledger, stack: &mut CallStack, invocation: &Invocation) -> Result<()> {
    if invocation.amount == 0 {
        return Ok(());
    }
    let mut state = FrameState::new(ledger.store(), stack, Name::system());
    ledger.balances().transfer(
        &mut state,
        &invocation.caller,
        &invocation.target,
        invocation.amount,
    )
}
