//! Processor for the genesis bootstrap operation.
//!
//! Exactly one signer is acceptable: the genesis node key named in the fact
//! itself. Deltas, in order: genesis account put, then per currency the
//! design put, genesis balance put, zero account put and zero balance put.

use std::sync::Arc;

use coinage_currency::Account;
use coinage_operations::{AnyOperation, Fact, GenesisCurrenciesFact, OpKind, Operation};
use coinage_types::{Amount, Height};

use crate::common::zero_account;
use crate::error::{outcome, PassFault, ProcError, Rejection};
use crate::merge::StateMergeValue;
use crate::pool::Pool;
use crate::processor::{OperationProcessor, OpOutcome, ProcessorFactory};
use crate::state::{
    account_key, balance_key, currency_design_key, get_account, get_design, StateAccessor,
    StateValue,
};

pub struct GenesisCurrenciesProcessor {
    height: Height,
    pool: Arc<Pool<GenesisCurrenciesProcessor>>,
}

impl GenesisCurrenciesProcessor {
    pub fn factory() -> ProcessorFactory {
        let pool: Arc<Pool<Self>> = Arc::new(Pool::new());
        Box::new(move |_state, height| {
            let mut p = pool.take().unwrap_or_else(|| Self {
                height: Height::GENESIS,
                pool: pool.clone(),
            });
            p.height = height;
            Ok(Box::new(p))
        })
    }

    fn as_op<'a>(
        op: &'a AnyOperation,
    ) -> Result<&'a Operation<GenesisCurrenciesFact>, PassFault> {
        match op {
            AnyOperation::GenesisCurrencies(op) => Ok(op),
            other => Err(PassFault::KindMismatch {
                expected: OpKind::GenesisCurrencies,
                got: other.kind(),
            }),
        }
    }

    fn check(
        &self,
        op: &Operation<GenesisCurrenciesFact>,
        state: &dyn StateAccessor,
    ) -> Result<(), ProcError> {
        let fact = &op.fact;
        if op.signs().is_empty() {
            return Err(Rejection::ThresholdNotMet {
                collected: 0,
                required: 1,
            }
            .into());
        }
        for sign in op.signs() {
            if sign.signer != fact.genesis_node_key {
                return Err(Rejection::UnknownSigner(sign.signer.to_string()).into());
            }
        }
        let genesis = fact.genesis_address();
        if get_account(state, &genesis)?.is_some() {
            return Err(Rejection::AccountAlreadyExists(genesis.to_string()).into());
        }
        for design in &fact.currencies {
            if get_design(state, design.currency())?.is_some() {
                return Err(
                    Rejection::CurrencyAlreadyRegistered(design.currency().to_string()).into(),
                );
            }
        }
        Ok(())
    }

    fn deltas(
        &self,
        op: &Operation<GenesisCurrenciesFact>,
        state: &dyn StateAccessor,
    ) -> Result<Vec<StateMergeValue>, ProcError> {
        let fact = &op.fact;
        let genesis = fact.genesis_address();
        if get_account(state, &genesis)?.is_some() {
            return Err(Rejection::AccountAlreadyExists(genesis.to_string()).into());
        }
        let mut merges = vec![StateMergeValue::put(
            account_key(&genesis),
            StateValue::Account(Account::new(fact.keys.clone())),
        )];
        for design in &fact.currencies {
            let currency = design.currency();
            merges.push(StateMergeValue::put(
                currency_design_key(currency),
                StateValue::CurrencyDesign(design.clone()),
            ));
            merges.push(StateMergeValue::put(
                balance_key(&genesis, currency),
                StateValue::Balance(design.amount.clone()),
            ));
            let zero = zero_account(currency);
            let zero_balance_key = balance_key(&zero.address, currency);
            merges.push(StateMergeValue::put(
                account_key(&zero.address),
                StateValue::Account(zero),
            ));
            merges.push(StateMergeValue::put(
                zero_balance_key,
                StateValue::Balance(Amount::zero(currency.clone())),
            ));
        }
        tracing::debug!(height = %self.height, fact = %fact.hash(), currencies = fact.currencies.len(), "genesis applied");
        Ok(merges)
    }
}

impl OperationProcessor for GenesisCurrenciesProcessor {
    fn kind(&self) -> OpKind {
        OpKind::GenesisCurrencies
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
        self.height = Height::GENESIS;
        let pool = self.pool.clone();
        pool.put(*self);
    }
}
