use std::collections::BTreeMap;

use primitive_types::{H256, U256};
use serde::{Deserialize, Serialize};

use crate::Bytes;

/// Account storage: 32-byte slot keys mapped to 32-byte values.
pub type Storage = BTreeMap<H256, H256>;

/// Prestate entry of a single account.
///
/// The address is not part of the entry; it is the key under which the entry is stored in a
/// [`PrestateStore`](crate::PrestateStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Balance in wei.
    pub balance: U256,
    /// Deployed code; empty for externally owned accounts.
    pub code: Bytes,
    /// Nonce as a hex or decimal string, copied verbatim into fixtures.
    pub nonce: String,
    /// Storage slots.
    pub storage: Storage,
}

/// Explicit values for [`Template::add_prestate()`](crate::Template::add_prestate()).
///
/// Every field left as `None` is filled with the template's default: generated code, the global
/// nonce, a random balance and empty storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountOverrides {
    /// Balance to use instead of a random one.
    pub balance: Option<U256>,
    /// Code to use instead of generated code.
    pub code: Option<Bytes>,
    /// Nonce to use instead of the global nonce.
    pub nonce: Option<String>,
    /// Storage to use instead of empty storage.
    pub storage: Option<Storage>,
}

impl AccountOverrides {
    /// Sets the balance.
    #[must_use]
    pub fn balance(mut self, balance: U256) -> Self {
        self.balance = Some(balance);
        self
    }

    /// Sets the code.
    #[must_use]
    pub fn code(mut self, code: impl Into<Bytes>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets the nonce.
    #[must_use]
    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Sets the storage.
    #[must_use]
    pub fn storage(mut self, storage: Storage) -> Self {
        self.storage = Some(storage);
        self
    }
}
