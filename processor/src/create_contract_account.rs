//! Processor for creating contract accounts funded by the sender.
//!
//! Deltas, in order: per item the new account put, its contract status put
//! and its initial balance puts, then the sender debits and fee credits in
//! currency order.

use std::collections::BTreeMap;
use std::sync::Arc;

use coinage_currency::{Account, ContractAccountStatus};
use coinage_operations::{
    check_signs_threshold, AnyOperation, CreateContractAccountFact, Fact, OpKind, Operation,
};
use coinage_types::{Big, CurrencyId, Height};

use crate::common::{design_for, require_balance, require_plain_account, FeeTable};
use crate::error::{outcome, PassFault, ProcError, Rejection};
use crate::merge::StateMergeValue;
use crate::pool::Pool;
use crate::processor::{OperationProcessor, OpOutcome, ProcessorFactory};
use crate::state::{
    account_key, balance_key, contract_status_key, get_account, get_contract_status,
    StateAccessor, StateValue,
};

pub struct CreateContractAccountProcessor {
    height: Height,
    pool: Arc<Pool<CreateContractAccountProcessor>>,
}

impl CreateContractAccountProcessor {
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
    ) -> Result<&'a Operation<CreateContractAccountFact>, PassFault> {
        match op {
            AnyOperation::CreateContractAccount(op) => Ok(op),
            other => Err(PassFault::KindMismatch {
                expected: OpKind::CreateContractAccount,
                got: other.kind(),
            }),
        }
    }

    /// Total sender debit per currency: every initial balance plus its fee.
    /// Also enforces the per-currency minimum on each initial balance.
    fn debits(
        fact: &CreateContractAccountFact,
        state: &dyn StateAccessor,
    ) -> Result<BTreeMap<CurrencyId, Big>, ProcError> {
        let mut debits: BTreeMap<CurrencyId, Big> = BTreeMap::new();
        let mut fees = FeeTable::new();
        for item in &fact.items {
            for amount in &item.amounts {
                let design = design_for(state, &amount.currency)?;
                if amount.big < design.policy.new_account_min_balance {
                    return Err(Rejection::UnderMinBalance {
                        currency: amount.currency.to_string(),
                        min: design.policy.new_account_min_balance.clone(),
                        amount: amount.big.clone(),
                    }
                    .into());
                }
                let fee = fees.accrue(&design, &amount.big);
                let debit = debits.entry(amount.currency.clone()).or_insert_with(Big::zero);
                *debit = &*debit + &(&amount.big + &fee);
            }
        }
        Ok(debits)
    }

    fn check(
        &self,
        op: &Operation<CreateContractAccountFact>,
        state: &dyn StateAccessor,
    ) -> Result<(), ProcError> {
        let fact = &op.fact;
        let sender = require_plain_account(state, &fact.sender)?;
        check_signs_threshold(op.signs(), &sender.keys)?;
        for item in &fact.items {
            let address = item.address();
            if get_account(state, &address)?.is_some()
                || get_contract_status(state, &address)?.is_some()
            {
                return Err(Rejection::AccountAlreadyExists(address.to_string()).into());
            }
        }
        for (currency, required) in &Self::debits(fact, state)? {
            require_balance(state, &fact.sender, currency, required)?;
        }
        Ok(())
    }

    fn deltas(
        &self,
        op: &Operation<CreateContractAccountFact>,
        state: &dyn StateAccessor,
    ) -> Result<Vec<StateMergeValue>, ProcError> {
        let fact = &op.fact;
        let mut merges = Vec::new();
        let mut debits: BTreeMap<CurrencyId, Big> = BTreeMap::new();
        let mut fees = FeeTable::new();
        for item in &fact.items {
            let account = Account::contract(&item.keys);
            let address = account.address.clone();
            // An earlier operation in this pass may have taken the address.
            if get_account(state, &address)?.is_some()
                || get_contract_status(state, &address)?.is_some()
            {
                return Err(Rejection::AccountAlreadyExists(address.to_string()).into());
            }
            merges.push(StateMergeValue::put(
                account_key(&address),
                StateValue::Account(account),
            ));
            merges.push(StateMergeValue::put(
                contract_status_key(&address),
                StateValue::ContractAccount(ContractAccountStatus::new(fact.sender.clone())),
            ));
            for amount in &item.amounts {
                let design = design_for(state, &amount.currency)?;
                let fee = fees.accrue(&design, &amount.big);
                merges.push(StateMergeValue::put(
                    balance_key(&address, &amount.currency),
                    StateValue::Balance(amount.clone()),
                ));
                let debit = debits.entry(amount.currency.clone()).or_insert_with(Big::zero);
                *debit = &*debit + &(&amount.big + &fee);
            }
        }
        for (currency, required) in &debits {
            require_balance(state, &fact.sender, currency, required)?;
            merges.push(StateMergeValue::balance_delta(
                balance_key(&fact.sender, currency),
                currency.clone(),
                -required.clone(),
            ));
        }
        merges.extend(fees.credits());
        tracing::debug!(height = %self.height, fact = %fact.hash(), items = fact.items.len(), "contract accounts created");
        Ok(merges)
    }
}

impl OperationProcessor for CreateContractAccountProcessor {
    fn kind(&self) -> OpKind {
        OpKind::CreateContractAccount
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
