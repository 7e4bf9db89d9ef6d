//! Processor for transfers, an account-level operation verified against the
//! sender's own key set.
//!
//! Deltas, in order: per item and amount a sender debit (amount plus fee)
//! and a receiver credit (amount), then the fee credits in currency order.

use std::collections::BTreeMap;
use std::sync::Arc;

use coinage_operations::{
    check_signs_threshold, AnyOperation, Fact, OpKind, Operation, TransferFact,
};
use coinage_types::{Big, CurrencyId, Height};

use crate::common::{design_for, require_account, require_balance, require_plain_account, FeeTable};
use crate::error::{outcome, PassFault, ProcError};
use crate::merge::StateMergeValue;
use crate::pool::Pool;
use crate::processor::{OperationProcessor, OpOutcome, ProcessorFactory};
use crate::state::{balance_key, StateAccessor};

pub struct TransferProcessor {
    height: Height,
    pool: Arc<Pool<TransferProcessor>>,
}

impl TransferProcessor {
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

    fn as_op<'a>(op: &'a AnyOperation) -> Result<&'a Operation<TransferFact>, PassFault> {
        match op {
            AnyOperation::Transfer(op) => Ok(op),
            other => Err(PassFault::KindMismatch {
                expected: OpKind::Transfer,
                got: other.kind(),
            }),
        }
    }

    /// Total sender debit per currency: every moved amount plus its fee.
    fn debits(
        fact: &TransferFact,
        state: &dyn StateAccessor,
    ) -> Result<BTreeMap<CurrencyId, Big>, ProcError> {
        let mut debits: BTreeMap<CurrencyId, Big> = BTreeMap::new();
        let mut fees = FeeTable::new();
        for item in &fact.items {
            for amount in &item.amounts {
                let design = design_for(state, &amount.currency)?;
                let fee = fees.accrue(&design, &amount.big);
                let debit = debits.entry(amount.currency.clone()).or_insert_with(Big::zero);
                *debit = &*debit + &(&amount.big + &fee);
            }
        }
        Ok(debits)
    }

    fn check(
        &self,
        op: &Operation<TransferFact>,
        state: &dyn StateAccessor,
    ) -> Result<(), ProcError> {
        let fact = &op.fact;
        let sender = require_plain_account(state, &fact.sender)?;
        check_signs_threshold(op.signs(), &sender.keys)?;
        for item in &fact.items {
            require_account(state, &item.receiver)?;
        }
        for (currency, required) in &Self::debits(fact, state)? {
            require_balance(state, &fact.sender, currency, required)?;
        }
        Ok(())
    }

    fn deltas(
        &self,
        op: &Operation<TransferFact>,
        state: &dyn StateAccessor,
    ) -> Result<Vec<StateMergeValue>, ProcError> {
        let fact = &op.fact;
        let mut merges = Vec::new();
        let mut debits: BTreeMap<CurrencyId, Big> = BTreeMap::new();
        let mut fees = FeeTable::new();
        for item in &fact.items {
            for amount in &item.amounts {
                let design = design_for(state, &amount.currency)?;
                let fee = fees.accrue(&design, &amount.big);
                merges.push(StateMergeValue::balance_delta(
                    balance_key(&fact.sender, &amount.currency),
                    amount.currency.clone(),
                    -(&amount.big + &fee),
                ));
                merges.push(StateMergeValue::balance_delta(
                    balance_key(&item.receiver, &amount.currency),
                    amount.currency.clone(),
                    amount.big.clone(),
                ));
                let debit = debits.entry(amount.currency.clone()).or_insert_with(Big::zero);
                *debit = &*debit + &(&amount.big + &fee);
            }
        }
        // Re-assert against re-read balances: an earlier operation in this
        // pass may have spent the funds since pre-process.
        for (currency, required) in &debits {
            require_balance(state, &fact.sender, currency, required)?;
        }
        merges.extend(fees.credits());
        tracing::debug!(height = %self.height, fact = %fact.hash(), items = fact.items.len(), "transfer processed");
        Ok(merges)
    }
}

impl OperationProcessor for TransferProcessor {
    fn kind(&self) -> OpKind {
        OpKind::Transfer
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Rejection;
    use crate::state::{account_key, currency_design_key, MemoryState, StateValue};
    use coinage_crypto::keypair_from_seed;
    use coinage_currency::{
        Account, AccountKey, AccountKeys, CurrencyDesign, CurrencyPolicy, Feeer,
    };
    use coinage_operations::TransferItem;
    use coinage_types::{Address, Amount, KeyPair, NetworkId, Token};

    fn network() -> NetworkId {
        NetworkId::new("coinage-dev").unwrap()
    }

    fn keypair(seed: u8) -> KeyPair {
        keypair_from_seed(&[seed; 32])
    }

    fn account(seed: u8) -> Account {
        let keys =
            AccountKeys::new(vec![AccountKey::new(keypair(seed).public, 100).unwrap()], 100)
                .unwrap();
        Account::new(keys)
    }

    fn pen() -> CurrencyId {
        CurrencyId::new("PEN").unwrap()
    }

    const SENDER: u8 = 1;
    const RECEIVER: u8 = 2;
    const COLLECTOR: u8 = 3;

    /// Sender with 1000 PEN, receiver, fee collector; fixed fee 3 to the
    /// collector.
    fn setup() -> MemoryState {
        let mut state = MemoryState::new();
        for seed in [SENDER, RECEIVER, COLLECTOR] {
            let acct = account(seed);
            state.put(account_key(&acct.address), StateValue::Account(acct));
        }
        let design = CurrencyDesign::new(
            Amount::new(Big::from(1_000_000u64), pen()),
            account(COLLECTOR).address,
            CurrencyPolicy::new(
                Big::from(1u64),
                Feeer::Fixed {
                    receiver: Some(account(COLLECTOR).address),
                    amount: Big::from(3u64),
                    exchange_min: Big::zero(),
                },
            ),
        );
        state.put(currency_design_key(&pen()), StateValue::CurrencyDesign(design));
        state.put(
            balance_key(&account(SENDER).address, &pen()),
            StateValue::Balance(Amount::new(Big::from(1_000u64), pen())),
        );
        state
    }

    fn signed_transfer(receiver: Address, value: u64) -> AnyOperation {
        let fact = TransferFact::new(
            Token::from_text("t").unwrap(),
            account(SENDER).address,
            vec![TransferItem::new(
                receiver,
                vec![Amount::new(Big::from(value), pen())],
            )],
        );
        let mut op = AnyOperation::Transfer(Operation::new(fact));
        op.hash_sign(&keypair(SENDER).private, &network());
        op
    }

    fn processor(state: &MemoryState) -> Box<dyn OperationProcessor> {
        TransferProcessor::factory()(state, Height::new(1)).unwrap()
    }

    #[test]
    fn transfer_moves_amount_and_fee() {
        let mut state = setup();
        let op = signed_transfer(account(RECEIVER).address, 100);
        let mut p = processor(&state);
        assert!(p.pre_process(&op, &state).unwrap().is_ok());
        let merges = p.process(&op, &state).unwrap().unwrap();
        state.apply(&merges).unwrap();
        assert_eq!(
            state.balance_of(&account(SENDER).address, &pen()),
            Big::from(897u64)
        );
        assert_eq!(
            state.balance_of(&account(RECEIVER).address, &pen()),
            Big::from(100u64)
        );
        assert_eq!(
            state.balance_of(&account(COLLECTOR).address, &pen()),
            Big::from(3u64)
        );
    }

    #[test]
    fn unsigned_by_sender_rejected() {
        let state = setup();
        let fact = TransferFact::new(
            Token::from_text("t").unwrap(),
            account(SENDER).address,
            vec![TransferItem::new(
                account(RECEIVER).address,
                vec![Amount::new(Big::from(100u64), pen())],
            )],
        );
        let mut op = AnyOperation::Transfer(Operation::new(fact));
        op.hash_sign(&keypair(RECEIVER).private, &network());
        let mut p = processor(&state);
        assert!(matches!(
            p.pre_process(&op, &state).unwrap(),
            Err(Rejection::UnknownSigner(_))
        ));
    }

    #[test]
    fn unknown_receiver_rejected() {
        let state = setup();
        let op = signed_transfer(account(9).address, 100);
        let mut p = processor(&state);
        assert!(matches!(
            p.pre_process(&op, &state).unwrap(),
            Err(Rejection::AccountNotFound(_))
        ));
    }

    #[test]
    fn insufficient_balance_rejected() {
        let state = setup();
        // 1000 available, 998 + 3 fee required.
        let op = signed_transfer(account(RECEIVER).address, 998);
        let mut p = processor(&state);
        assert!(matches!(
            p.pre_process(&op, &state).unwrap(),
            Err(Rejection::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn exact_balance_including_fee_accepted() {
        let mut state = setup();
        let op = signed_transfer(account(RECEIVER).address, 997);
        let mut p = processor(&state);
        assert!(p.pre_process(&op, &state).unwrap().is_ok());
        let merges = p.process(&op, &state).unwrap().unwrap();
        state.apply(&merges).unwrap();
        assert_eq!(state.balance_of(&account(SENDER).address, &pen()), Big::zero());
    }

    #[test]
    fn unregistered_currency_rejected() {
        let state = setup();
        let fact = TransferFact::new(
            Token::from_text("t").unwrap(),
            account(SENDER).address,
            vec![TransferItem::new(
                account(RECEIVER).address,
                vec![Amount::new(Big::from(1u64), CurrencyId::new("MCC").unwrap())],
            )],
        );
        let mut op = AnyOperation::Transfer(Operation::new(fact));
        op.hash_sign(&keypair(SENDER).private, &network());
        let mut p = processor(&state);
        assert!(matches!(
            p.pre_process(&op, &state).unwrap(),
            Err(Rejection::CurrencyNotFound(_))
        ));
    }

    #[test]
    fn second_transfer_in_pass_sees_spent_funds() {
        let mut state = setup();
        let first = signed_transfer(account(RECEIVER).address, 600);
        let second = signed_transfer(account(COLLECTOR).address, 600);
        let mut p = processor(&state);
        // Both pass pre-process against the untouched state.
        assert!(p.pre_process(&first, &state).unwrap().is_ok());
        assert!(p.pre_process(&second, &state).unwrap().is_ok());
        let merges = p.process(&first, &state).unwrap().unwrap();
        state.apply(&merges).unwrap();
        // Process re-reads: the first transfer consumed the funds.
        assert!(matches!(
            p.process(&second, &state).unwrap(),
            Err(Rejection::InsufficientBalance { .. })
        ));
    }
}
