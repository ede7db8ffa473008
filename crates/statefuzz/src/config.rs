//! Typed configuration, loaded with `figment`.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. [`Config::default()`]
//! 2. an optional TOML file
//! 3. environment variables prefixed `STATEFUZZ_`, nested with `__`
//!    (e.g. `STATEFUZZ_PRESTATE__ARGUMENTS__RENEW_LIMIT=3`)
//!
//! Every key has a default, so an empty TOML file yields the default configuration.

use std::{collections::BTreeMap, fmt, path::Path};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use primitive_types::{H160, H256};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::{
    parse_address, parse_hash, AddressSpec, CodeGen, EnvSpec, Error, HashSpec, Result,
};

/// Prefix of environment variables overriding configuration keys.
pub const ENV_PREFIX: &str = "STATEFUZZ_";

/// Secret key of the conventional state test sender.
pub const TEST_SECRET_KEY: &str =
    "0x45a915e4d060149eb4365960e6a7a45f334393093061116b197e3240065ff2d8";

/// Complete configuration of a [`Template`](crate::Template).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `info` section of fixtures.
    pub info: InfoConfig,
    /// Block environment.
    pub env: EnvConfig,
    /// Transaction.
    pub transaction: TransactionConfig,
    /// Prestate generation and autofill.
    pub prestate: PrestateConfig,
    /// Code generator weights.
    pub codegen: CodegenConfig,
    /// Post state scaffold.
    pub post: PostConfig,
}

impl Config {
    /// Loads configuration from defaults, the TOML file at `path` (if any) and the environment.
    ///
    /// A `path` that does not exist contributes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the sources cannot be merged into a `Config`, and the errors
    /// of [`Self::validate()`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extracts and validates configuration from an arbitrary `figment`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if extraction fails, and the errors of [`Self::validate()`].
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks ranges and literals.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] for a range whose minimum exceeds its maximum, and
    /// [`Error::InvalidAddress`] or [`Error::InvalidHash`] for malformed literals.
    pub fn validate(&self) -> Result<()> {
        let transaction = &self.transaction;
        check_range(
            "transaction.gas_limit",
            transaction.gas_limit_min,
            transaction.gas_limit_max,
        )?;
        check_range("transaction.value", transaction.value_min, transaction.value_max)?;

        let prestate = &self.prestate;
        if let (Some(min), Some(max)) = (prestate.code_length.min, prestate.code_length.max) {
            check_range("prestate.code_length", min as u64, max as u64)?;
        }
        check_range(
            "prestate.storage_slots",
            prestate.storage_slots.min as u64,
            prestate.storage_slots.max as u64,
        )?;

        self.env.coinbase()?;
        self.env.previous_hash()?;
        transaction.secret_key()?;
        transaction.to()?;
        Ok(())
    }
}

/// Numeric literal kept verbatim. Accepts strings and bare integers, which TOML and environment
/// variables produce for values such as `1000`.
struct Literal(String);

impl<'de> Deserialize<'de> for Literal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LiteralVisitor;

        impl de::Visitor<'_> for LiteralVisitor {
            type Value = Literal;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a string or an unsigned integer")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Literal, E> {
                Ok(Literal(value.to_owned()))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Literal, E> {
                Ok(Literal(value.to_string()))
            }

            fn visit_u128<E: de::Error>(self, value: u128) -> Result<Literal, E> {
                Ok(Literal(value.to_string()))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Literal, E> {
                u64::try_from(value)
                    .map(|value| Literal(value.to_string()))
                    .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
            }
        }

        deserializer.deserialize_any(LiteralVisitor)
    }
}

fn literal_deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Literal::deserialize(deserializer).map(|literal| literal.0)
}

fn optional_literal_deserialize<'de, D>(
    deserializer: D,
) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let literal: Option<Literal> = Deserialize::deserialize(deserializer)?;
    Ok(literal.map(|literal| literal.0))
}

fn check_range(key: &'static str, min: u64, max: u64) -> Result<()> {
    if min > max {
        return Err(Error::InvalidRange { key, min, max });
    }
    Ok(())
}

/// Provenance strings copied into every fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct InfoConfig {
    pub fuzzer: String,
    pub comment: String,
    pub filled_with: String,
}

impl Default for InfoConfig {
    fn default() -> Self {
        Self {
            fuzzer: "statefuzz".to_owned(),
            comment: "statefuzz".to_owned(),
            filled_with: "statefuzz randomfuzz".to_owned(),
        }
    }
}

/// Block environment. Unset optional fields are drawn per fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Block beneficiary; a random sending account if unset.
    pub coinbase: Option<String>,
    /// Block difficulty.
    #[serde(deserialize_with = "literal_deserialize")]
    pub difficulty: String,
    /// Block gas limit.
    #[serde(deserialize_with = "literal_deserialize")]
    pub gas_limit: String,
    /// Block number.
    #[serde(deserialize_with = "literal_deserialize")]
    pub number: String,
    /// Block timestamp.
    #[serde(deserialize_with = "literal_deserialize")]
    pub timestamp: String,
    /// Parent block hash; random if unset.
    pub previous_hash: Option<String>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            coinbase: None,
            difficulty: "0x20000".to_owned(),
            gas_limit: "0x1312D00".to_owned(),
            number: "1".to_owned(),
            timestamp: "1000".to_owned(),
            previous_hash: None,
        }
    }
}

impl EnvConfig {
    fn coinbase(&self) -> Result<Option<H160>> {
        self.coinbase.as_deref().map(parse_address).transpose()
    }

    fn previous_hash(&self) -> Result<Option<H256>> {
        self.previous_hash.as_deref().map(parse_hash).transpose()
    }

    pub(crate) fn to_spec(&self) -> Result<EnvSpec> {
        Ok(EnvSpec {
            coinbase: self
                .coinbase()?
                .map_or_else(AddressSpec::sending_account, AddressSpec::Fixed),
            difficulty: self.difficulty.clone(),
            gas_limit: self.gas_limit.clone(),
            number: self.number.clone(),
            timestamp: self.timestamp.clone(),
            previous_hash: self.previous_hash()?.map_or(HashSpec::Random, HashSpec::Fixed),
        })
    }
}

/// Transaction parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Global nonce, shared by the transaction and every generated account. Random if unset.
    #[serde(deserialize_with = "optional_literal_deserialize")]
    pub nonce: Option<String>,
    /// Key signing the transaction.
    pub secret_key: String,
    /// Destination; a random classified address or zero, drawn per fill, if unset.
    pub to: Option<String>,
    /// Calldata length; chosen by the generator if unset.
    pub data_length: Option<usize>,
    /// Lower bound of the gas limit.
    pub gas_limit_min: u64,
    /// Upper bound of the gas limit.
    pub gas_limit_max: u64,
    /// Lower bound of the transferred value.
    pub value_min: u64,
    /// Upper bound of the transferred value.
    pub value_max: u64,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            nonce: None,
            secret_key: TEST_SECRET_KEY.to_owned(),
            to: None,
            data_length: None,
            gas_limit_min: 476_000,
            gas_limit_max: 20_000_000,
            value_min: 0,
            value_max: 1 << 24,
        }
    }
}

impl TransactionConfig {
    pub(crate) fn secret_key(&self) -> Result<H256> {
        parse_hash(&self.secret_key)
    }

    pub(crate) fn to(&self) -> Result<Option<H160>> {
        self.to.as_deref().map(parse_address).transpose()
    }
}

/// Prestate generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrestateConfig {
    /// Length of generated account code.
    pub code_length: CodeLengthConfig,
    /// Number of random storage slots of generated accounts.
    pub storage_slots: StorageSlotsConfig,
    /// Whether precompiles get minimal entries when the template is built.
    pub seed_precompiled: bool,
    /// Autofill of the transaction destination.
    pub target: TargetConfig,
    /// Autofill of addresses referenced by generated code.
    pub arguments: ArgumentsConfig,
}

/// Code length range. `min` alone fixes the length; without `min` generators choose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct CodeLengthConfig {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

/// Inclusive storage slot count range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct StorageSlotsConfig {
    pub min: usize,
    pub max: usize,
}

impl Default for StorageSlotsConfig {
    fn default() -> Self {
        Self { min: 0, max: 2 }
    }
}

/// Target pass settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Whether the pass runs.
    pub enabled: bool,
    /// An existing destination is renewed in rounds divisible by this; 0 acts as 1.
    pub renew_every: u64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            renew_every: 1,
        }
    }
}

/// Argument pass settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArgumentsConfig {
    /// Whether the pass runs.
    pub enabled: bool,
    /// Existing accounts are renewed in rounds divisible by this; 0 acts as 1.
    pub renew_every: u64,
    /// Maximum number of existing accounts renewed per round; 0 means unlimited.
    pub renew_limit: usize,
}

impl Default for ArgumentsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            renew_every: 1,
            renew_limit: 0,
        }
    }
}

/// Selection weights of code generators by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    /// Weight per generator name. Names must be built in or registered with the builder.
    pub weights: BTreeMap<String, u32>,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            weights: BTreeMap::from([
                (CodeGen::BYTES.to_owned(), 5),
                (CodeGen::INSTRUCTIONS.to_owned(), 25),
                (CodeGen::CALLS.to_owned(), 70),
            ]),
        }
    }
}

/// Post state scaffold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    /// Fork the placeholder entry is keyed by.
    pub fork: String,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            fork: "Byzantium".to_owned(),
        }
    }
}
