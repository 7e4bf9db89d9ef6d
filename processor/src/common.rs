//! Precondition checks and fee accounting shared by the per-kind
//! processors.

use std::collections::BTreeMap;

use coinage_currency::{Account, AccountKeys, CurrencyDesign};
use coinage_types::{Address, Big, CurrencyId};

use crate::error::{ProcError, Rejection};
use crate::merge::StateMergeValue;
use crate::state::{
    balance_key, get_account, get_balance, get_contract_status, get_design, StateAccessor,
};

/// The account must exist.
pub(crate) fn require_account(
    state: &dyn StateAccessor,
    address: &Address,
) -> Result<Account, ProcError> {
    match get_account(state, address)? {
        Some(account) => Ok(account),
        None => Err(Rejection::AccountNotFound(address.to_string()).into()),
    }
}

/// The account must exist and must not be a contract account.
pub(crate) fn require_plain_account(
    state: &dyn StateAccessor,
    address: &Address,
) -> Result<Account, ProcError> {
    let account = require_account(state, address)?;
    if get_contract_status(state, address)?.is_some() {
        return Err(Rejection::ContractAccountDisallowed(address.to_string()).into());
    }
    Ok(account)
}

/// The currency must be registered.
pub(crate) fn design_for(
    state: &dyn StateAccessor,
    currency: &CurrencyId,
) -> Result<CurrencyDesign, ProcError> {
    match get_design(state, currency)? {
        Some(design) => Ok(design),
        None => Err(Rejection::CurrencyNotFound(currency.to_string()).into()),
    }
}

/// The sender must hold at least `required` in `currency`.
pub(crate) fn require_balance(
    state: &dyn StateAccessor,
    address: &Address,
    currency: &CurrencyId,
    required: &Big,
) -> Result<(), ProcError> {
    let available = get_balance(state, address, currency)?
        .map(|a| a.big)
        .unwrap_or_else(Big::zero);
    if &available < required {
        return Err(Rejection::InsufficientBalance {
            address: address.to_string(),
            currency: currency.to_string(),
            required: required.clone(),
            available,
        }
        .into());
    }
    Ok(())
}

/// The per-currency zero account written at currency registration: the
/// bookkeeping slot fees fall into when a policy names no receiver.
pub(crate) fn zero_account(currency: &CurrencyId) -> Account {
    Account {
        address: Address::zero(currency),
        keys: AccountKeys::contract_locked(),
    }
}

/// Accumulated fees of one operation, keyed by currency so the emitted
/// credits come out in currency order regardless of item order.
pub(crate) struct FeeTable {
    entries: BTreeMap<CurrencyId, (Big, Address)>,
}

impl FeeTable {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Record the fee for moving `amount` under `design`'s policy and
    /// return it. Zero fees are not recorded.
    pub fn accrue(&mut self, design: &CurrencyDesign, amount: &Big) -> Big {
        let fee = design.policy.feeer.fee(amount);
        if fee.over_zero() {
            let receiver = design
                .policy
                .feeer
                .receiver()
                .cloned()
                .unwrap_or_else(|| Address::zero(design.currency()));
            let entry = self
                .entries
                .entry(design.currency().clone())
                .or_insert_with(|| (Big::zero(), receiver));
            entry.0 = &entry.0 + &fee;
        }
        fee
    }

    /// (currency, accumulated fee, receiver) in currency order.
    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyId, &Big, &Address)> {
        self.entries
            .iter()
            .map(|(currency, (total, receiver))| (currency, total, receiver))
    }

    /// Credit merges for the accumulated fees, in currency order.
    pub fn credits(&self) -> Vec<StateMergeValue> {
        self.iter()
            .map(|(currency, total, receiver)| {
                StateMergeValue::balance_delta(
                    balance_key(receiver, currency),
                    currency.clone(),
                    total.clone(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinage_currency::{CurrencyPolicy, Feeer};
    use coinage_crypto::{blake2b_256, derive_address};
    use coinage_types::{Amount, Hash};

    fn addr(seed: &[u8]) -> Address {
        derive_address(&Hash::new(blake2b_256(seed)))
    }

    fn design(currency: &str, feeer: Feeer) -> CurrencyDesign {
        CurrencyDesign::new(
            Amount::new(Big::from(1_000u64), CurrencyId::new(currency).unwrap()),
            addr(b"genesis"),
            CurrencyPolicy::new(Big::zero(), feeer),
        )
    }

    fn fixed(amount: u64, receiver: Option<Address>) -> Feeer {
        Feeer::Fixed {
            receiver,
            amount: Big::from(amount),
            exchange_min: Big::zero(),
        }
    }

    #[test]
    fn accrue_returns_and_accumulates() {
        let d = design("PEN", fixed(3, Some(addr(b"collector"))));
        let mut fees = FeeTable::new();
        assert_eq!(fees.accrue(&d, &Big::from(100u64)), Big::from(3u64));
        assert_eq!(fees.accrue(&d, &Big::from(200u64)), Big::from(3u64));
        let collected: Vec<_> = fees.iter().collect();
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].1, &Big::from(6u64));
        assert_eq!(collected[0].2, &addr(b"collector"));
    }

    #[test]
    fn zero_fee_not_recorded() {
        let d = design("PEN", Feeer::Nil);
        let mut fees = FeeTable::new();
        assert_eq!(fees.accrue(&d, &Big::from(100u64)), Big::zero());
        assert!(fees.credits().is_empty());
    }

    #[test]
    fn missing_receiver_falls_back_to_zero_address() {
        let d = design("PEN", fixed(3, None));
        let mut fees = FeeTable::new();
        fees.accrue(&d, &Big::from(100u64));
        let credits = fees.credits();
        assert_eq!(credits.len(), 1);
        let zero = Address::zero(&CurrencyId::new("PEN").unwrap());
        assert!(credits[0].key.starts_with(zero.as_str()));
    }

    #[test]
    fn credits_in_currency_order() {
        let mut fees = FeeTable::new();
        fees.accrue(&design("ZZZ", fixed(1, None)), &Big::from(1u64));
        fees.accrue(&design("AAA", fixed(1, None)), &Big::from(1u64));
        let currencies: Vec<_> = fees.iter().map(|(c, _, _)| c.to_string()).collect();
        assert_eq!(currencies, vec!["AAA", "ZZZ"]);
    }
}
