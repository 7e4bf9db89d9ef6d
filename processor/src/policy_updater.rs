//! Processor for currency policy updates, a node-level operation verified
//! against the suffrage.
//!
//! Emits a single delta: the re-read design with its policy replaced.

use std::sync::Arc;

use coinage_operations::{
    check_signs_threshold, AnyOperation, CurrencyPolicyUpdaterFact, Fact, OpKind, Operation,
};
use coinage_types::Height;

use crate::common::require_account;
use crate::error::{outcome, PassFault, ProcError, Rejection};
use crate::merge::StateMergeValue;
use crate::pool::Pool;
use crate::processor::{OperationProcessor, OpOutcome, ProcessorFactory};
use crate::state::{currency_design_key, get_design, StateAccessor, StateValue};
use crate::suffrage::{read_suffrage, SuffrageSnapshot};

pub struct CurrencyPolicyUpdaterProcessor {
    suffrage: SuffrageSnapshot,
    height: Height,
    pool: Arc<Pool<CurrencyPolicyUpdaterProcessor>>,
}

impl CurrencyPolicyUpdaterProcessor {
    pub fn factory(threshold: u64) -> ProcessorFactory {
        let pool: Arc<Pool<Self>> = Arc::new(Pool::new());
        Box::new(move |state, height| {
            let suffrage = read_suffrage(state, threshold)?;
            let mut p = pool.take().unwrap_or_else(|| Self {
                suffrage: SuffrageSnapshot::default(),
                height: Height::GENESIS,
                pool: pool.clone(),
            });
            p.suffrage = suffrage;
            p.height = height;
            Ok(Box::new(p))
        })
    }

    fn as_op<'a>(
        op: &'a AnyOperation,
    ) -> Result<&'a Operation<CurrencyPolicyUpdaterFact>, PassFault> {
        match op {
            AnyOperation::CurrencyPolicyUpdater(op) => Ok(op),
            other => Err(PassFault::KindMismatch {
                expected: OpKind::CurrencyPolicyUpdater,
                got: other.kind(),
            }),
        }
    }

    fn check(
        &self,
        op: &Operation<CurrencyPolicyUpdaterFact>,
        state: &dyn StateAccessor,
    ) -> Result<(), ProcError> {
        check_signs_threshold(op.signs(), &self.suffrage)?;
        let fact = &op.fact;
        if get_design(state, &fact.currency)?.is_none() {
            return Err(Rejection::CurrencyNotFound(fact.currency.to_string()).into());
        }
        if let Some(receiver) = fact.policy.feeer.receiver() {
            require_account(state, receiver)?;
        }
        Ok(())
    }

    fn deltas(
        &self,
        op: &Operation<CurrencyPolicyUpdaterFact>,
        state: &dyn StateAccessor,
    ) -> Result<Vec<StateMergeValue>, ProcError> {
        let fact = &op.fact;
        // Re-read: the design may carry a different aggregate or policy than
        // it did at pre-process time.
        let Some(design) = get_design(state, &fact.currency)? else {
            return Err(Rejection::CurrencyNotFound(fact.currency.to_string()).into());
        };
        let updated = design.with_policy(fact.policy.clone());
        tracing::debug!(height = %self.height, fact = %fact.hash(), currency = %fact.currency, "currency policy updated");
        Ok(vec![StateMergeValue::put(
            currency_design_key(&fact.currency),
            StateValue::CurrencyDesign(updated),
        )])
    }
}

impl OperationProcessor for CurrencyPolicyUpdaterProcessor {
    fn kind(&self) -> OpKind {
        OpKind::CurrencyPolicyUpdater
    }

    fn pre_process(
        &mut self,
        op: &AnyOperation,
        state: &dyn StateAccessor,
    ) -> Result<OpOutcome<()>, PassFault> {
        let op = Self::as_op(op)?;
        outcome(self.check(op, state))
    }

    fn process(
        &mut self,
        op: &AnyOperation,
        state: &dyn StateAccessor,
    ) -> Result<OpOutcome<Vec<StateMergeValue>>, PassFault> {
        let op = Self::as_op(op)?;
        outcome(self.deltas(op, state))
    }

    fn close(mut self: Box<Self>) {
        self.suffrage = SuffrageSnapshot::default();
        self.height = Height::GENESIS;
        let pool = self.pool.clone();
        pool.put(*self);
    }
}
