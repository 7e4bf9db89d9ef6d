//! Two-phase operation processing for the coinage currency module.
//!
//! The host ledger hands each operation to the processor registered for its
//! kind. `pre_process` checks signature thresholds and state preconditions
//! without side effects; `process` computes the ordered state deltas; the
//! host commits them. A rejection drops one operation, a pass fault aborts
//! the whole block-processing pass.
//!
//! Processing within one pass is strictly sequential: `process` re-reads
//! state so later operations see what earlier ones changed. Passes for
//! different blocks may run concurrently, each with its own processor
//! instances.

mod common;
pub mod create_contract_account;
pub mod currency_register;
pub mod error;
pub mod genesis;
pub mod merge;
pub mod policy_updater;
pub mod pool;
pub mod processor;
pub mod state;
pub mod suffrage;
pub mod transfer;
pub mod withdraw;

pub use create_contract_account::CreateContractAccountProcessor;
pub use currency_register::CurrencyRegisterProcessor;
pub use error::{PassFault, Rejection};
pub use genesis::GenesisCurrenciesProcessor;
pub use merge::{Merge, StateMergeValue};
pub use policy_updater::CurrencyPolicyUpdaterProcessor;
pub use pool::Pool;
pub use processor::{OperationProcessor, OpOutcome, ProcessorFactory, ProcessorRegistry};
pub use state::{MemoryState, StateAccessor, StateError, StateValue};
pub use suffrage::{read_suffrage, SuffrageNode, SuffrageSnapshot};
pub use transfer::TransferProcessor;
pub use withdraw::WithdrawProcessor;

use coinage_operations::OpKind;

/// A registry with every operation kind this module defines, using
/// `threshold` for the node-level kinds.
pub fn default_registry(threshold: u64) -> ProcessorRegistry {
    let mut registry = ProcessorRegistry::new();
    registry.register(
        OpKind::CurrencyRegister,
        CurrencyRegisterProcessor::factory(threshold),
    );
    registry.register(
        OpKind::CurrencyPolicyUpdater,
        CurrencyPolicyUpdaterProcessor::factory(threshold),
    );
    registry.register(OpKind::Transfer, TransferProcessor::factory());
    registry.register(OpKind::Withdraw, WithdrawProcessor::factory());
    registry.register(
        OpKind::CreateContractAccount,
        CreateContractAccountProcessor::factory(),
    );
    registry.register(OpKind::GenesisCurrencies, GenesisCurrenciesProcessor::factory());
    registry
}
