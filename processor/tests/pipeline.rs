//! End-to-end pass scenarios over the in-memory state backend: genesis
//! bootstrap, currency registration, transfers with fees, contract account
//! round trip.

use coinage_crypto::keypair_from_seed;
use coinage_currency::{
    Account, AccountKey, AccountKeys, CurrencyDesign, CurrencyPolicy, Feeer,
};
use coinage_operations::{
    AnyOperation, CreateContractAccountFact, CreateContractAccountItem, CurrencyRegisterFact,
    GenesisCurrenciesFact, OpKind, Operation, TransferFact, TransferItem, WithdrawFact,
    WithdrawItem,
};
use coinage_processor::state::{account_key, StateValue, SUFFRAGE_KEY};
use coinage_processor::{
    default_registry, MemoryState, ProcessorRegistry, Rejection, SuffrageNode,
};
use coinage_types::{Address, Amount, Big, CurrencyId, Height, KeyPair, NetworkId, Token};

fn network() -> NetworkId {
    NetworkId::new("coinage-dev").unwrap()
}

fn keypair(seed: u8) -> KeyPair {
    keypair_from_seed(&[seed; 32])
}

fn keys(seed: u8) -> AccountKeys {
    AccountKeys::new(vec![AccountKey::new(keypair(seed).public, 100).unwrap()], 100).unwrap()
}

fn pen() -> CurrencyId {
    CurrencyId::new("PEN").unwrap()
}

const NODE: u8 = 10;
const GENESIS: u8 = 1;
const ALICE: u8 = 2;
const VAULT: u8 = 3;

fn token(text: &str) -> Token {
    Token::from_text(text).unwrap()
}

/// Run one operation through pre-process and process, applying its deltas
/// on success.
fn run(
    registry: &ProcessorRegistry,
    state: &mut MemoryState,
    op: &AnyOperation,
    height: u64,
) -> Result<(), Rejection> {
    let mut p = registry
        .create(op.kind(), state, Height::new(height))
        .expect("processor construction");
    let verdict = p.pre_process(op, state).expect("pre_process fault");
    if let Err(rejection) = verdict {
        p.close();
        return Err(rejection);
    }
    let result = p.process(op, state).expect("process fault");
    p.close();
    let merges = result?;
    state.apply(&merges).expect("apply");
    Ok(())
}

fn genesis_op() -> AnyOperation {
    let design = CurrencyDesign::new(
        Amount::new(Big::from(1_000_000u64), pen()),
        keys(GENESIS).address(),
        CurrencyPolicy::new(
            Big::from(1u64),
            Feeer::Fixed {
                receiver: None,
                amount: Big::from(2u64),
                exchange_min: Big::zero(),
            },
        ),
    );
    let fact = GenesisCurrenciesFact::new(
        token("genesis"),
        keypair(NODE).public,
        keys(GENESIS),
        vec![design],
    );
    let mut op = AnyOperation::GenesisCurrencies(Operation::new(fact));
    op.hash_sign(&keypair(NODE).private, &network());
    op
}

/// Genesis-bootstrapped state with the suffrage slot and an extra plain
/// account for Alice.
fn bootstrapped() -> (ProcessorRegistry, MemoryState) {
    let registry = default_registry(1);
    let mut state = MemoryState::new();
    state.put(
        SUFFRAGE_KEY,
        StateValue::SuffrageNodes(vec![SuffrageNode {
            key: keypair(NODE).public,
            weight: 1,
        }]),
    );
    run(&registry, &mut state, &genesis_op(), 0).expect("genesis");
    let alice = Account::new(keys(ALICE));
    state.put(account_key(&alice.address), StateValue::Account(alice));
    (registry, state)
}

#[test]
fn genesis_then_transfer() {
    let (registry, mut state) = bootstrapped();
    assert_eq!(
        state.balance_of(&keys(GENESIS).address(), &pen()),
        Big::from(1_000_000u64)
    );

    let fact = TransferFact::new(
        token("t1"),
        keys(GENESIS).address(),
        vec![TransferItem::new(
            keys(ALICE).address(),
            vec![Amount::new(Big::from(500u64), pen())],
        )],
    );
    let mut op = AnyOperation::Transfer(Operation::new(fact));
    op.hash_sign(&keypair(GENESIS).private, &network());
    run(&registry, &mut state, &op, 1).expect("transfer");

    assert_eq!(state.balance_of(&keys(ALICE).address(), &pen()), Big::from(500u64));
    // 500 moved + 2 fixed fee.
    assert_eq!(
        state.balance_of(&keys(GENESIS).address(), &pen()),
        Big::from(999_498u64)
    );
    // No receiver configured: the fee lands in the zero account.
    assert_eq!(state.balance_of(&Address::zero(&pen()), &pen()), Big::from(2u64));
}

#[test]
fn genesis_applies_only_once() {
    let (registry, mut state) = bootstrapped();
    let again = run(&registry, &mut state, &genesis_op(), 1);
    assert!(matches!(again, Err(Rejection::AccountAlreadyExists(_))));
}

#[test]
fn registering_usd_twice_fails_second_time() {
    let (registry, mut state) = bootstrapped();
    let design = CurrencyDesign::new(
        Amount::new(Big::from(9_000u64), CurrencyId::new("USD").unwrap()),
        keys(ALICE).address(),
        CurrencyPolicy::new(Big::from(1u64), Feeer::Nil),
    );
    let register = |t: &str| {
        let fact = CurrencyRegisterFact::new(token(t), design.clone());
        let mut op = AnyOperation::CurrencyRegister(Operation::new(fact));
        op.hash_sign(&keypair(NODE).private, &network());
        op
    };
    run(&registry, &mut state, &register("r1"), 1).expect("first registration");
    let second = run(&registry, &mut state, &register("r2"), 2);
    assert!(matches!(
        second,
        Err(Rejection::CurrencyAlreadyRegistered(_))
    ));
}

#[test]
fn contract_account_full_round_trip() {
    let (registry, mut state) = bootstrapped();

    // Genesis funds the vault contract account with 300 PEN (+2 fee).
    let fact = CreateContractAccountFact::new(
        token("c1"),
        keys(GENESIS).address(),
        vec![CreateContractAccountItem::new(
            keys(VAULT),
            vec![Amount::new(Big::from(300u64), pen())],
        )],
    );
    let mut create = AnyOperation::CreateContractAccount(Operation::new(fact));
    create.hash_sign(&keypair(GENESIS).private, &network());
    run(&registry, &mut state, &create, 1).expect("create contract account");

    let vault = keys(VAULT).address();
    assert_eq!(state.balance_of(&vault, &pen()), Big::from(300u64));
    assert_eq!(
        state.balance_of(&keys(GENESIS).address(), &pen()),
        Big::from(999_698u64)
    );

    // The contract account itself can never sign a transfer out.
    let fact = TransferFact::new(
        token("t2"),
        vault.clone(),
        vec![TransferItem::new(
            keys(ALICE).address(),
            vec![Amount::new(Big::from(10u64), pen())],
        )],
    );
    let mut steal = AnyOperation::Transfer(Operation::new(fact));
    steal.hash_sign(&keypair(VAULT).private, &network());
    let verdict = run(&registry, &mut state, &steal, 2);
    assert!(matches!(
        verdict,
        Err(Rejection::ContractAccountDisallowed(_))
    ));

    // The owner withdraws 100 back, paying the 2 PEN fee.
    let fact = WithdrawFact::new(
        token("w1"),
        keys(GENESIS).address(),
        vec![WithdrawItem::new(
            vault.clone(),
            vec![Amount::new(Big::from(100u64), pen())],
        )],
    );
    let mut withdraw = AnyOperation::Withdraw(Operation::new(fact));
    withdraw.hash_sign(&keypair(GENESIS).private, &network());
    run(&registry, &mut state, &withdraw, 3).expect("withdraw");

    assert_eq!(state.balance_of(&vault, &pen()), Big::from(200u64));
    assert_eq!(
        state.balance_of(&keys(GENESIS).address(), &pen()),
        Big::from(999_796u64)
    );
}

#[test]
fn later_operation_in_pass_sees_earlier_spend() {
    let (registry, mut state) = bootstrapped();

    // Drain nearly everything first.
    let fact = TransferFact::new(
        token("t1"),
        keys(GENESIS).address(),
        vec![TransferItem::new(
            keys(ALICE).address(),
            vec![Amount::new(Big::from(999_990u64), pen())],
        )],
    );
    let mut drain = AnyOperation::Transfer(Operation::new(fact));
    drain.hash_sign(&keypair(GENESIS).private, &network());

    let fact = TransferFact::new(
        token("t2"),
        keys(GENESIS).address(),
        vec![TransferItem::new(
            keys(ALICE).address(),
            vec![Amount::new(Big::from(100u64), pen())],
        )],
    );
    let mut second = AnyOperation::Transfer(Operation::new(fact));
    second.hash_sign(&keypair(GENESIS).private, &network());

    // Same pass: one processor instance, submission order.
    let mut p = registry
        .create(OpKind::Transfer, &state, Height::new(1))
        .unwrap();
    assert!(p.pre_process(&drain, &state).unwrap().is_ok());
    assert!(p.pre_process(&second, &state).unwrap().is_ok());
    let merges = p.process(&drain, &state).unwrap().unwrap();
    state.apply(&merges).unwrap();
    let verdict = p.process(&second, &state).unwrap();
    assert!(matches!(verdict, Err(Rejection::InsufficientBalance { .. })));
    p.close();
}

#[test]
fn node_ops_fault_without_suffrage() {
    let registry = default_registry(1);
    let state = MemoryState::new();
    let err = registry
        .create(OpKind::CurrencyRegister, &state, Height::new(1))
        .unwrap_err();
    assert!(err.retry_pass());
}

#[test]
fn policy_update_changes_fees_mid_stream() {
    let (registry, mut state) = bootstrapped();

    // Drop the fixed fee to nil.
    let fact = coinage_operations::CurrencyPolicyUpdaterFact::new(
        token("p1"),
        pen(),
        CurrencyPolicy::new(Big::from(1u64), Feeer::Nil),
    );
    let mut update = AnyOperation::CurrencyPolicyUpdater(Operation::new(fact));
    update.hash_sign(&keypair(NODE).private, &network());
    run(&registry, &mut state, &update, 1).expect("policy update");

    let fact = TransferFact::new(
        token("t1"),
        keys(GENESIS).address(),
        vec![TransferItem::new(
            keys(ALICE).address(),
            vec![Amount::new(Big::from(500u64), pen())],
        )],
    );
    let mut op = AnyOperation::Transfer(Operation::new(fact));
    op.hash_sign(&keypair(GENESIS).private, &network());
    run(&registry, &mut state, &op, 2).expect("transfer");

    // No fee charged under the new policy.
    assert_eq!(
        state.balance_of(&keys(GENESIS).address(), &pen()),
        Big::from(999_500u64)
    );
    assert_eq!(state.balance_of(&Address::zero(&pen()), &pen()), Big::zero());
}
