//! coinage — offline builder and signer for coinage operations.
//!
//! Constructs a fact from command-line arguments, signs it for the given
//! network, validates the result, and prints the canonical JSON encoding on
//! stdout. Any validation failure exits non-zero with a message naming the
//! offending field or precondition.

use std::io::Read;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use coinage_crypto::generate_keypair;
use coinage_currency::{
    AccountKey, AccountKeys, CurrencyDesign, CurrencyPolicy, Feeer,
};
use coinage_operations::{
    AnyOperation, CreateContractAccountFact, CreateContractAccountItem, CurrencyPolicyUpdaterFact,
    CurrencyRegisterFact, GenesisCurrenciesFact, Operation, TransferFact, TransferItem,
    WithdrawFact, WithdrawItem,
};
use coinage_types::{Address, Amount, Big, CurrencyId, NetworkId, PrivateKey, Token};

#[derive(Parser)]
#[command(name = "coinage", about = "Offline builder and signer for coinage operations")]
struct Cli {
    /// Network the operation is bound to.
    #[arg(long, global = true, default_value = "coinage-dev", env = "COINAGE_NETWORK")]
    network: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate an Ed25519 key pair and its single-key account address.
    Keygen,

    /// Build and sign a currency-registration operation.
    RegisterCurrency {
        /// Currency id, e.g. PEN.
        #[arg(long)]
        currency: CurrencyId,
        /// Initial supply, credited to the genesis account.
        #[arg(long)]
        supply: Big,
        /// Account receiving the initial supply.
        #[arg(long)]
        genesis_account: Address,
        #[command(flatten)]
        policy: PolicyArgs,
        #[command(flatten)]
        sign: SignArgs,
    },

    /// Build and sign a currency-policy-update operation.
    UpdatePolicy {
        #[arg(long)]
        currency: CurrencyId,
        #[command(flatten)]
        policy: PolicyArgs,
        #[command(flatten)]
        sign: SignArgs,
    },

    /// Build and sign a transfer to one receiver.
    Transfer {
        #[arg(long)]
        sender: Address,
        #[arg(long)]
        receiver: Address,
        /// Amount as CURRENCY:VALUE, repeatable.
        #[arg(long, required = true)]
        amount: Vec<Amount>,
        #[command(flatten)]
        sign: SignArgs,
    },

    /// Build and sign a withdraw from an owned contract account.
    Withdraw {
        #[arg(long)]
        sender: Address,
        /// The contract account to withdraw from.
        #[arg(long)]
        target: Address,
        /// Amount as CURRENCY:VALUE, repeatable.
        #[arg(long, required = true)]
        amount: Vec<Amount>,
        #[command(flatten)]
        sign: SignArgs,
    },

    /// Build and sign a create-contract-account operation.
    CreateContractAccount {
        #[arg(long)]
        sender: Address,
        /// Derivation key as PUBLICKEYHEX:WEIGHT, repeatable.
        #[arg(long = "key", required = true)]
        keys: Vec<String>,
        #[arg(long, default_value_t = 100)]
        threshold: u8,
        /// Initial balance as CURRENCY:VALUE, repeatable.
        #[arg(long, required = true)]
        amount: Vec<Amount>,
        #[command(flatten)]
        sign: SignArgs,
    },

    /// Build and sign the genesis bootstrap operation.
    GenesisCurrencies {
        /// Genesis account key as PUBLICKEYHEX:WEIGHT, repeatable.
        #[arg(long = "key", required = true)]
        keys: Vec<String>,
        #[arg(long, default_value_t = 100)]
        threshold: u8,
        /// Initial currency as CURRENCY:SUPPLY, repeatable; every currency
        /// shares the policy flags.
        #[arg(long, required = true)]
        supply: Vec<Amount>,
        #[command(flatten)]
        policy: PolicyArgs,
        /// Private key of the genesis node; also the fact's node key.
        #[command(flatten)]
        sign: SignArgs,
    },

    /// Add a signature to an already-encoded operation.
    Sign {
        /// Path to the operation JSON, or `-` for stdin.
        #[arg(long, default_value = "-")]
        operation: PathBuf,
        #[command(flatten)]
        sign: SignArgs,
    },
}

#[derive(Args)]
struct SignArgs {
    /// Signer's private key, hex.
    #[arg(long)]
    private_key: String,

    /// Fact token; defaults to the current UNIX time.
    #[arg(long)]
    token: Option<String>,
}

impl SignArgs {
    fn private_key(&self) -> Result<PrivateKey> {
        PrivateKey::from_hex(&self.private_key).context("invalid --private-key")
    }

    fn token(&self) -> Result<Token> {
        let text = match &self.token {
            Some(text) => text.clone(),
            None => {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .context("system clock before the UNIX epoch")?;
                now.as_secs().to_string()
            }
        };
        Token::from_text(&text).context("invalid --token")
    }
}

#[derive(Args)]
struct PolicyArgs {
    /// Minimum initial balance for new accounts in this currency.
    #[arg(long, default_value = "0")]
    min_balance: Big,

    /// Fee policy: nil, fixed, or ratio.
    #[arg(long, default_value = "nil")]
    feeer: String,

    /// Account fees are credited to; defaults to the currency's zero account.
    #[arg(long)]
    fee_receiver: Option<Address>,

    /// Flat fee (fixed policy only).
    #[arg(long)]
    fee_amount: Option<Big>,

    /// Fee ratio in basis points, at most 10000 (ratio policy only).
    #[arg(long)]
    fee_ratio: Option<u32>,

    /// Lower fee bound (ratio policy only).
    #[arg(long)]
    fee_min: Option<Big>,

    /// Upper fee bound (ratio policy only); omit for unlimited.
    #[arg(long)]
    fee_max: Option<Big>,

    /// Reserved exchange minimum (fixed and ratio policies).
    #[arg(long)]
    exchange_min: Option<Big>,
}

impl PolicyArgs {
    fn feeer(&self) -> Result<Feeer> {
        let feeer = match self.feeer.as_str() {
            "nil" => Feeer::Nil,
            "fixed" => Feeer::Fixed {
                receiver: self.fee_receiver.clone(),
                amount: self
                    .fee_amount
                    .clone()
                    .context("--fee-amount is required for --feeer fixed")?,
                exchange_min: self.exchange_min.clone().unwrap_or_else(Big::zero),
            },
            "ratio" => Feeer::Ratio {
                receiver: self.fee_receiver.clone(),
                ratio: self
                    .fee_ratio
                    .context("--fee-ratio is required for --feeer ratio")?,
                min: self.fee_min.clone().unwrap_or_else(Big::zero),
                max: self.fee_max.clone(),
                exchange_min: self.exchange_min.clone().unwrap_or_else(Big::zero),
            },
            other => bail!("unknown --feeer {other:?}: expected nil, fixed, or ratio"),
        };
        feeer.is_valid()?;
        Ok(feeer)
    }

    fn policy(&self) -> Result<CurrencyPolicy> {
        let policy = CurrencyPolicy::new(self.min_balance.clone(), self.feeer()?);
        policy.is_valid()?;
        Ok(policy)
    }
}

/// Parse a `PUBLICKEYHEX:WEIGHT` argument.
fn parse_account_key(s: &str) -> Result<AccountKey> {
    let (key, weight) = s
        .split_once(':')
        .with_context(|| format!("expected PUBLICKEYHEX:WEIGHT, got {s:?}"))?;
    let key = key.parse().with_context(|| format!("invalid public key in {s:?}"))?;
    let weight: u8 = weight
        .parse()
        .with_context(|| format!("invalid weight in {s:?}"))?;
    Ok(AccountKey::new(key, weight)?)
}

fn parse_account_keys(specs: &[String], threshold: u8) -> Result<AccountKeys> {
    let keys = specs
        .iter()
        .map(|s| parse_account_key(s))
        .collect::<Result<Vec<_>>>()?;
    Ok(AccountKeys::new(keys, threshold)?)
}

/// Sign, validate, and print the operation.
fn emit(mut op: AnyOperation, private_key: &PrivateKey, network: &NetworkId) -> Result<()> {
    op.hash_sign(private_key, network);
    op.is_valid(network)?;
    println!("{}", serde_json::to_string_pretty(&op)?);
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let network = NetworkId::new(cli.network.clone())?;

    match cli.command {
        Command::Keygen => {
            let keypair = generate_keypair();
            let keys = AccountKeys::new(vec![AccountKey::new(keypair.public, 100)?], 100)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "private_key": hex::encode(keypair.private.0),
                    "public_key": keypair.public.to_string(),
                    "address": keys.address().to_string(),
                }))?
            );
        }

        Command::RegisterCurrency {
            currency,
            supply,
            genesis_account,
            policy,
            sign,
        } => {
            let design = CurrencyDesign::new(
                Amount::new(supply, currency),
                genesis_account,
                policy.policy()?,
            );
            design.is_valid()?;
            let fact = CurrencyRegisterFact::new(sign.token()?, design);
            let op = AnyOperation::CurrencyRegister(Operation::new(fact));
            emit(op, &sign.private_key()?, &network)?;
        }

        Command::UpdatePolicy {
            currency,
            policy,
            sign,
        } => {
            let fact = CurrencyPolicyUpdaterFact::new(sign.token()?, currency, policy.policy()?);
            let op = AnyOperation::CurrencyPolicyUpdater(Operation::new(fact));
            emit(op, &sign.private_key()?, &network)?;
        }

        Command::Transfer {
            sender,
            receiver,
            amount,
            sign,
        } => {
            let fact = TransferFact::new(
                sign.token()?,
                sender,
                vec![TransferItem::new(receiver, amount)],
            );
            let op = AnyOperation::Transfer(Operation::new(fact));
            emit(op, &sign.private_key()?, &network)?;
        }

        Command::Withdraw {
            sender,
            target,
            amount,
            sign,
        } => {
            let fact = WithdrawFact::new(
                sign.token()?,
                sender,
                vec![WithdrawItem::new(target, amount)],
            );
            let op = AnyOperation::Withdraw(Operation::new(fact));
            emit(op, &sign.private_key()?, &network)?;
        }

        Command::CreateContractAccount {
            sender,
            keys,
            threshold,
            amount,
            sign,
        } => {
            let derivation_keys = parse_account_keys(&keys, threshold)?;
            let fact = CreateContractAccountFact::new(
                sign.token()?,
                sender,
                vec![CreateContractAccountItem::new(derivation_keys, amount)],
            );
            let op = AnyOperation::CreateContractAccount(Operation::new(fact));
            emit(op, &sign.private_key()?, &network)?;
        }

        Command::GenesisCurrencies {
            keys,
            threshold,
            supply,
            policy,
            sign,
        } => {
            let account_keys = parse_account_keys(&keys, threshold)?;
            let genesis_account = account_keys.address();
            let shared_policy = policy.policy()?;
            let currencies = supply
                .into_iter()
                .map(|amount| {
                    let design = CurrencyDesign::new(
                        amount,
                        genesis_account.clone(),
                        shared_policy.clone(),
                    );
                    design.is_valid()?;
                    Ok(design)
                })
                .collect::<Result<Vec<_>>>()?;
            let private_key = sign.private_key()?;
            let node_key = coinage_crypto::public_from_private(&private_key);
            let fact =
                GenesisCurrenciesFact::new(sign.token()?, node_key, account_keys, currencies);
            let op = AnyOperation::GenesisCurrencies(Operation::new(fact));
            emit(op, &private_key, &network)?;
        }

        Command::Sign { operation, sign } => {
            let json = if operation.as_os_str() == "-" {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .context("reading operation from stdin")?;
                buffer
            } else {
                std::fs::read_to_string(&operation)
                    .with_context(|| format!("reading {}", operation.display()))?
            };
            let op: AnyOperation =
                serde_json::from_str(&json).context("decoding operation JSON")?;
            tracing::debug!(kind = %op.kind(), "adding signature");
            emit(op, &sign.private_key()?, &network)?;
        }
    }

    Ok(())
}
