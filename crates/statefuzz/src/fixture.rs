//! Serializable state test fixture.
//!
//! Field names follow the layout consumed by state test runners; they are the compatibility
//! surface of this crate and must not change.

use std::collections::BTreeMap;

use primitive_types::{H160, H256, U256};
use serde::{Deserialize, Serialize};

use crate::{Account, Bytes};

/// Name under which [`Fixture::named()`] is usually called.
pub const DEFAULT_FIXTURE_NAME: &str = "randomStatetest";

/// One complete generated test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    /// Provenance of the fixture.
    pub info: Info,
    /// Block environment.
    pub env: Env,
    /// Expected results; a static scaffold.
    pub post: Post,
    /// World state before the transaction.
    pub pre: BTreeMap<H160, Account>,
    /// Transaction to execute.
    pub transaction: Transaction,
}

impl Fixture {
    /// Wraps the fixture under `name`, the top-level layout of a state test file.
    pub fn named(self, name: impl Into<String>) -> BTreeMap<String, Self> {
        BTreeMap::from([(name.into(), self)])
    }
}

/// Provenance of a fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    /// Name of the fuzzer.
    pub fuzzer: String,
    /// Free-form comment.
    pub comment: String,
    /// Name of the filling tool.
    #[serde(rename = "filledwith")]
    pub filled_with: String,
}

/// Block environment with every field resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct Env {
    pub current_coinbase: H160,
    pub current_difficulty: String,
    pub current_gas_limit: String,
    pub current_number: String,
    pub current_timestamp: String,
    pub previous_hash: H256,
}

/// Transaction with every field resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Key signing the transaction.
    pub secret_key: H256,
    /// Calldata variants.
    pub data: Vec<Bytes>,
    /// Gas limit variants.
    pub gas_limit: Vec<U256>,
    /// Gas price.
    pub gas_price: U256,
    /// Sender nonce.
    pub nonce: String,
    /// Destination.
    pub to: H160,
    /// Value variants.
    pub value: Vec<U256>,
}

/// Expected results keyed by fork name.
pub type Post = BTreeMap<String, Vec<PostEntry>>;

/// Expected result of one combination of transaction variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostEntry {
    /// State root after execution.
    pub hash: H256,
    /// Hash of the emitted logs.
    pub logs: H256,
    /// Selected transaction variants.
    pub indexes: Indexes,
}

/// Indexes into the `data`, `gasLimit` and `value` lists of a [`Transaction`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct Indexes {
    pub data: usize,
    pub gas: usize,
    pub value: usize,
}

/// Post state with a single placeholder entry under `fork`.
///
/// Fuzzing compares implementations against each other, so the expected hashes are dummies.
pub fn placeholder_post(fork: &str) -> Post {
    let entry = PostEntry {
        hash: H256::from_low_u64_be(0xdead_c0de),
        logs: H256::from_low_u64_be(0xdead_beef),
        indexes: Indexes::default(),
    };
    BTreeMap::from([(fork.to_owned(), vec![entry])])
}
