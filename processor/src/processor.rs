//! The two-phase processor contract and the registry hosts look up
//! processors in.

use std::collections::HashMap;

use coinage_operations::{AnyOperation, OpKind};
use coinage_types::Height;

use crate::error::{PassFault, Rejection};
use crate::merge::StateMergeValue;
use crate::state::StateAccessor;

/// Per-operation verdict: `Ok` carries the phase's result, `Err` is a
/// non-fatal rejection that drops only this operation from the block.
pub type OpOutcome<T> = Result<T, Rejection>;

/// A per-operation-kind handler with a linear lifecycle:
/// constructed → pre-processed → processed → closed.
///
/// Instances live for exactly one block-processing pass and hold nothing
/// mutable across passes; a fresh (or pool-recycled and re-armed) instance
/// comes from the kind's [`ProcessorFactory`] each pass.
pub trait OperationProcessor: Send {
    fn kind(&self) -> OpKind;

    /// Side-effect-free precondition check: signature thresholds and state
    /// existence/non-existence requirements.
    fn pre_process(
        &mut self,
        op: &AnyOperation,
        state: &dyn StateAccessor,
    ) -> Result<OpOutcome<()>, PassFault>;

    /// Compute the operation's state deltas, in the order documented per
    /// kind. Re-reads state rather than trusting pre-process-time values,
    /// since earlier operations in the pass may have moved it.
    fn process(
        &mut self,
        op: &AnyOperation,
        state: &dyn StateAccessor,
    ) -> Result<OpOutcome<Vec<StateMergeValue>>, PassFault>;

    /// Reset pass-scoped fields and recycle the instance.
    fn close(self: Box<Self>);
}

impl std::fmt::Debug for dyn OperationProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("OperationProcessor").field(&self.kind()).finish()
    }
}

/// Builds one processor per pass, capturing whatever pass-scoped snapshot
/// the kind needs (suffrage and threshold for node operations).
pub type ProcessorFactory = Box<
    dyn Fn(&dyn StateAccessor, Height) -> Result<Box<dyn OperationProcessor>, PassFault>
        + Send
        + Sync,
>;

/// Explicit processor lookup, built once at host startup and threaded
/// through; there is no ambient global registry.
#[derive(Default)]
pub struct ProcessorRegistry {
    factories: HashMap<OpKind, ProcessorFactory>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the factory for a kind. Registering a kind twice replaces
    /// the earlier factory.
    pub fn register(&mut self, kind: OpKind, factory: ProcessorFactory) {
        self.factories.insert(kind, factory);
    }

    /// Construct the processor for `kind` for one pass.
    pub fn create(
        &self,
        kind: OpKind,
        state: &dyn StateAccessor,
        height: Height,
    ) -> Result<Box<dyn OperationProcessor>, PassFault> {
        let factory = self
            .factories
            .get(&kind)
            .ok_or(PassFault::UnknownKind(kind))?;
        tracing::debug!(%kind, %height, "constructing processor for pass");
        factory(state, height)
    }

    pub fn contains(&self, kind: OpKind) -> bool {
        self.factories.contains_key(&kind)
    }
}
