//! Described, not-yet-applied mutations to ledger state slots.

use serde::{Deserialize, Serialize};

use coinage_types::{Big, CurrencyId};

use crate::state::StateValue;

/// How a slot is mutated.
///
/// `Put` replaces the whole slot. `BalanceDelta` is a signed add into a
/// balance slot; adds are associative, so when several operations in one
/// block touch the same balance the host can fold their deltas in any
/// grouping and land on the same value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Merge {
    Put(StateValue),
    BalanceDelta { currency: CurrencyId, delta: Big },
}

/// One described mutation: the slot key and how to merge into it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateMergeValue {
    pub key: String,
    pub merge: Merge,
}

impl StateMergeValue {
    pub fn put(key: String, value: StateValue) -> Self {
        Self {
            key,
            merge: Merge::Put(value),
        }
    }

    pub fn balance_delta(key: String, currency: CurrencyId, delta: Big) -> Self {
        Self {
            key,
            merge: Merge::BalanceDelta { currency, delta },
        }
    }
}
