//! Processor for currency registration, a node-level operation verified
//! against the suffrage.
//!
//! Deltas, in order: genesis balance put, currency design put, zero account
//! put, zero balance put.

use std::sync::Arc;

use coinage_operations::{
    check_signs_threshold, AnyOperation, CurrencyRegisterFact, Fact, OpKind, Operation,
};
use coinage_types::{Address, Amount, Height};

use crate::common::{require_plain_account, zero_account};
use crate::error::{outcome, PassFault, ProcError, Rejection};
use crate::merge::StateMergeValue;
use crate::pool::Pool;
use crate::processor::{OperationProcessor, OpOutcome, ProcessorFactory};
use crate::state::{
    account_key, balance_key, currency_design_key, get_balance, get_design, StateAccessor,
    StateValue,
};
use crate::suffrage::{read_suffrage, SuffrageSnapshot};

pub struct CurrencyRegisterProcessor {
    suffrage: SuffrageSnapshot,
    height: Height,
    pool: Arc<Pool<CurrencyRegisterProcessor>>,
}

impl CurrencyRegisterProcessor {
    /// Factory for one pass: reads the suffrage membership (absent or empty
    /// suffrage is a retryable fault) and freezes it with the host-supplied
    /// threshold.
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
    ) -> Result<&'a Operation<CurrencyRegisterFact>, PassFault> {
        match op {
            AnyOperation::CurrencyRegister(op) => Ok(op),
            other => Err(PassFault::KindMismatch {
                expected: OpKind::CurrencyRegister,
                got: other.kind(),
            }),
        }
    }

    fn check(
        &self,
        op: &Operation<CurrencyRegisterFact>,
        state: &dyn StateAccessor,
    ) -> Result<(), ProcError> {
        check_signs_threshold(op.signs(), &self.suffrage)?;
        let design = &op.fact.design;
        let currency = design.currency();
        if get_design(state, currency)?.is_some() {
            return Err(Rejection::CurrencyAlreadyRegistered(currency.to_string()).into());
        }
        require_plain_account(state, &design.genesis_account)?;
        if let Some(receiver) = design.policy.feeer.receiver() {
            require_plain_account(state, receiver)?;
        }
        if get_balance(state, &design.genesis_account, currency)?.is_some() {
            return Err(Rejection::BalanceAlreadyExists {
                address: design.genesis_account.to_string(),
                currency: currency.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn deltas(
        &self,
        op: &Operation<CurrencyRegisterFact>,
        state: &dyn StateAccessor,
    ) -> Result<Vec<StateMergeValue>, ProcError> {
        let design = &op.fact.design;
        let currency = design.currency();
        // An earlier operation in this pass may have claimed the currency.
        if get_design(state, currency)?.is_some() {
            return Err(Rejection::CurrencyAlreadyRegistered(currency.to_string()).into());
        }
        let zero = zero_account(currency);
        let merges = vec![
            StateMergeValue::put(
                balance_key(&design.genesis_account, currency),
                StateValue::Balance(design.amount.clone()),
            ),
            StateMergeValue::put(
                currency_design_key(currency),
                StateValue::CurrencyDesign(design.clone()),
            ),
            StateMergeValue::put(
                account_key(&zero.address),
                StateValue::Account(zero.clone()),
            ),
            StateMergeValue::put(
                balance_key(&Address::zero(currency), currency),
                StateValue::Balance(Amount::zero(currency.clone())),
            ),
        ];
        tracing::debug!(height = %self.height, fact = %op.fact.hash(), %currency, "currency registered");
        Ok(merges)
    }
}

impl OperationProcessor for CurrencyRegisterProcessor {
    fn kind(&self) -> OpKind {
        OpKind::CurrencyRegister
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
