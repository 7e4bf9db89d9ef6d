//! Processor for withdraws: an account pulls funds back out of contract
//! accounts it owns.
//!
//! Deltas, in order: per item and amount a target debit and a sender
//! credit, then per currency the sender's fee debit and the fee credit.

use std::collections::BTreeMap;
use std::sync::Arc;

use coinage_operations::{
    check_signs_threshold, AnyOperation, Fact, OpKind, Operation, WithdrawFact,
};
use coinage_types::{Address, Big, CurrencyId, Height};

use crate::common::{design_for, require_balance, require_plain_account, FeeTable};
use crate::error::{outcome, PassFault, ProcError, Rejection};
use crate::merge::StateMergeValue;
use crate::pool::Pool;
use crate::processor::{OperationProcessor, OpOutcome, ProcessorFactory};
use crate::state::{balance_key, get_contract_status, StateAccessor};

pub struct WithdrawProcessor {
    height: Height,
    pool: Arc<Pool<WithdrawProcessor>>,
}

impl WithdrawProcessor {
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

    fn as_op<'a>(op: &'a AnyOperation) -> Result<&'a Operation<WithdrawFact>, PassFault> {
        match op {
            AnyOperation::Withdraw(op) => Ok(op),
            other => Err(PassFault::KindMismatch {
                expected: OpKind::Withdraw,
                got: other.kind(),
            }),
        }
    }

    /// The target must be a contract account owned by the sender.
    fn require_owned_contract(
        state: &dyn StateAccessor,
        target: &Address,
        sender: &Address,
    ) -> Result<(), ProcError> {
        let Some(status) = get_contract_status(state, target)? else {
            return Err(Rejection::ContractAccountRequired(target.to_string()).into());
        };
        if &status.owner != sender {
            return Err(Rejection::NotOwner {
                target: target.to_string(),
                sender: sender.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn check(
        &self,
        op: &Operation<WithdrawFact>,
        state: &dyn StateAccessor,
    ) -> Result<(), ProcError> {
        let fact = &op.fact;
        let sender = require_plain_account(state, &fact.sender)?;
        check_signs_threshold(op.signs(), &sender.keys)?;
        let mut fees = FeeTable::new();
        for item in &fact.items {
            Self::require_owned_contract(state, &item.target, &fact.sender)?;
            for amount in &item.amounts {
                let design = design_for(state, &amount.currency)?;
                fees.accrue(&design, &amount.big);
                require_balance(state, &item.target, &amount.currency, &amount.big)?;
            }
        }
        // Fees come out of the sender's own balance, not the withdrawn funds.
        for (currency, total, _) in fees.iter() {
            require_balance(state, &fact.sender, currency, total)?;
        }
        Ok(())
    }

    fn deltas(
        &self,
        op: &Operation<WithdrawFact>,
        state: &dyn StateAccessor,
    ) -> Result<Vec<StateMergeValue>, ProcError> {
        let fact = &op.fact;
        let mut merges = Vec::new();
        let mut drawn: BTreeMap<(Address, CurrencyId), Big> = BTreeMap::new();
        let mut fees = FeeTable::new();
        for item in &fact.items {
            for amount in &item.amounts {
                let design = design_for(state, &amount.currency)?;
                fees.accrue(&design, &amount.big);
                merges.push(StateMergeValue::balance_delta(
                    balance_key(&item.target, &amount.currency),
                    amount.currency.clone(),
                    -amount.big.clone(),
                ));
                merges.push(StateMergeValue::balance_delta(
                    balance_key(&fact.sender, &amount.currency),
                    amount.currency.clone(),
                    amount.big.clone(),
                ));
                let total = drawn
                    .entry((item.target.clone(), amount.currency.clone()))
                    .or_insert_with(Big::zero);
                *total = &*total + &amount.big;
            }
        }
        // Re-assert against re-read balances.
        for ((target, currency), total) in &drawn {
            require_balance(state, target, currency, total)?;
        }
        for (currency, total, receiver) in fees.iter() {
            require_balance(state, &fact.sender, currency, total)?;
            merges.push(StateMergeValue::balance_delta(
                balance_key(&fact.sender, currency),
                currency.clone(),
                -total.clone(),
            ));
            merges.push(StateMergeValue::balance_delta(
                balance_key(receiver, currency),
                currency.clone(),
                total.clone(),
            ));
        }
        tracing::debug!(height = %self.height, fact = %fact.hash(), items = fact.items.len(), "withdraw processed");
        Ok(merges)
    }
}

impl OperationProcessor for WithdrawProcessor {
    fn kind(&self) -> OpKind {
        OpKind::Withdraw
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
