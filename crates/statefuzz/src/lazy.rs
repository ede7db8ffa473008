//! Environment and transaction fields that are either literal or drawn anew for every fill.

use primitive_types::{H160, H256, U256};
use rand::RngCore;
use statefuzz_interface::{AddressKind, AddressTaxonomy, ValueSource};

use crate::{Bytes, Env, Transaction};

/// Address field of a fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressSpec {
    /// Always this address.
    Fixed(H160),
    /// One of the taxonomy's addresses of the listed kinds, drawn per fill.
    Random {
        /// Kinds to draw from.
        kinds: Vec<AddressKind>,
        /// Whether the zero address is an additional candidate.
        or_zero: bool,
    },
}

impl AddressSpec {
    /// A random sending account.
    pub fn sending_account() -> Self {
        Self::Random {
            kinds: vec![AddressKind::SendingAccount],
            or_zero: false,
        }
    }

    /// A random classified address or the zero address.
    pub fn destination_or_zero() -> Self {
        Self::Random {
            kinds: AddressKind::ALL.to_vec(),
            or_zero: true,
        }
    }

    fn resolve(&self, resolver: &mut Resolver<'_>) -> H160 {
        match self {
            Self::Fixed(address) => *address,
            Self::Random { kinds, or_zero } => {
                let mut candidates: Vec<H160> = kinds
                    .iter()
                    .flat_map(|&kind| resolver.taxonomy.addresses(kind).iter().copied())
                    .collect();
                if *or_zero {
                    candidates.push(H160::zero());
                }
                resolver
                    .values
                    .address(resolver.rng, &candidates)
                    .unwrap_or_default()
            }
        }
    }
}

/// 256-bit integer field of a fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UintSpec {
    /// Always this value.
    Fixed(U256),
    /// A value in `min..=max`, drawn per fill. An inverted range resolves to `min`.
    Random {
        /// Inclusive lower bound.
        min: U256,
        /// Inclusive upper bound.
        max: U256,
    },
}

impl UintSpec {
    /// Shorthand for a random range with machine-sized bounds.
    pub fn range(min: u64, max: u64) -> Self {
        Self::Random {
            min: min.into(),
            max: max.into(),
        }
    }

    fn resolve(&self, resolver: &mut Resolver<'_>) -> U256 {
        match *self {
            Self::Fixed(value) => value,
            Self::Random { min, max } => resolver.values.uint(resolver.rng, min, max.max(min)),
        }
    }
}

/// 32-byte hash field of a fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashSpec {
    /// Always this hash.
    Fixed(H256),
    /// A random hash, drawn per fill.
    Random,
}

impl HashSpec {
    fn resolve(&self, resolver: &mut Resolver<'_>) -> H256 {
        match self {
            Self::Fixed(hash) => *hash,
            Self::Random => resolver.values.hash(resolver.rng),
        }
    }
}

/// Specification of the block environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSpec {
    /// Block beneficiary; also seeded into the prestate on every fill.
    pub coinbase: AddressSpec,
    /// Block difficulty, copied verbatim.
    pub difficulty: String,
    /// Block gas limit, copied verbatim.
    pub gas_limit: String,
    /// Block number, copied verbatim.
    pub number: String,
    /// Block timestamp, copied verbatim.
    pub timestamp: String,
    /// Hash of the parent block.
    pub previous_hash: HashSpec,
}

impl EnvSpec {
    pub(crate) fn resolve(&self, resolver: &mut Resolver<'_>) -> Env {
        Env {
            current_coinbase: self.coinbase.resolve(resolver),
            current_difficulty: self.difficulty.clone(),
            current_gas_limit: self.gas_limit.clone(),
            current_number: self.number.clone(),
            current_timestamp: self.timestamp.clone(),
            previous_hash: self.previous_hash.resolve(resolver),
        }
    }
}

/// Specification of the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSpec {
    /// Key signing the transaction.
    pub secret_key: H256,
    /// Calldata variants.
    pub data: Vec<Bytes>,
    /// Gas limit variants.
    pub gas_limit: Vec<UintSpec>,
    /// Gas price.
    pub gas_price: UintSpec,
    /// Sender nonce, copied verbatim.
    pub nonce: String,
    /// Destination; receives a prestate entry by the target pass if it is fillable.
    pub to: AddressSpec,
    /// Value variants.
    pub value: Vec<UintSpec>,
}

impl TransactionSpec {
    pub(crate) fn resolve(&self, resolver: &mut Resolver<'_>) -> Transaction {
        Transaction {
            secret_key: self.secret_key,
            data: self.data.clone(),
            gas_limit: self
                .gas_limit
                .iter()
                .map(|spec| spec.resolve(resolver))
                .collect(),
            gas_price: self.gas_price.resolve(resolver),
            nonce: self.nonce.clone(),
            to: self.to.resolve(resolver),
            value: self.value.iter().map(|spec| spec.resolve(resolver)).collect(),
        }
    }
}

/// Everything needed to turn specs into literals.
pub(crate) struct Resolver<'a> {
    pub(crate) values: &'a dyn ValueSource,
    pub(crate) taxonomy: &'a dyn AddressTaxonomy,
    pub(crate) rng: &'a mut dyn RngCore,
}
