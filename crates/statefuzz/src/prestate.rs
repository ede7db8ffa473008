use std::collections::BTreeMap;

use primitive_types::{H160, U256};

use crate::{Account, Bytes, Storage};

/// Balance given to seeded precompile entries.
pub const PRECOMPILE_BALANCE: U256 = U256([1, 0, 0, 0]);

/// World state accumulated by a template: one [`Account`] per canonical address.
///
/// The store is never cleared. Entries are only added or overwritten in place, so it grows
/// monotonically over the lifetime of a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrestateStore {
    accounts: BTreeMap<H160, Account>,
}

impl PrestateStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `account` at `address`, replacing and returning the previous entry if any.
    pub fn insert(&mut self, address: H160, account: Account) -> Option<Account> {
        self.accounts.insert(address, account)
    }

    /// Returns whether an entry exists at `address`.
    pub fn contains(&self, address: &H160) -> bool {
        self.accounts.contains_key(address)
    }

    /// Returns the entry at `address`.
    pub fn get(&self, address: &H160) -> Option<&Account> {
        self.accounts.get(address)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns whether the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Iterates over entries in ascending address order.
    pub fn iter(&self) -> impl Iterator<Item = (&H160, &Account)> + '_ {
        self.accounts.iter()
    }

    /// Iterates over stored addresses in ascending order.
    pub fn addresses(&self) -> impl Iterator<Item = H160> + '_ {
        self.accounts.keys().copied()
    }

    /// Copies the current contents.
    pub fn snapshot(&self) -> BTreeMap<H160, Account> {
        self.accounts.clone()
    }

    /// Adds a minimal entry (balance `0x01`, no code, no storage) for every address in `precompiled`.
    ///
    /// Existing entries are only replaced if `force` is set, so repeated calls without `force`
    /// leave customized entries alone. Returns the number of entries written.
    pub fn seed_precompiled(&mut self, precompiled: &[H160], nonce: &str, force: bool) -> usize {
        let mut seeded = 0;
        for &address in precompiled {
            if force || !self.contains(&address) {
                self.insert(
                    address,
                    Account {
                        balance: PRECOMPILE_BALANCE,
                        code: Bytes::new(),
                        nonce: nonce.to_owned(),
                        storage: Storage::new(),
                    },
                );
                seeded += 1;
            }
        }
        seeded
    }
}

impl<'a> IntoIterator for &'a PrestateStore {
    type Item = (&'a H160, &'a Account);
    type IntoIter = std::collections::btree_map::Iter<'a, H160, Account>;

    fn into_iter(self) -> Self::IntoIter {
        self.accounts.iter()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn account(balance: u64) -> Account {
        Account {
            balance: balance.into(),
            code: Bytes(vec![0x60, 0x00]),
            nonce: "0x00".to_owned(),
            storage: Storage::new(),
        }
    }

    fn precompiles() -> Vec<H160> {
        (1..=8).map(H160::from_low_u64_be).collect()
    }

    #[test]
    fn insert_overwrites_existing_entry() {
        let mut store = PrestateStore::new();
        let address = H160::repeat_byte(0xb9);
        assert!(store.insert(address, account(1)).is_none());
        assert_eq!(store.insert(address, account(2)), Some(account(1)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&address), Some(&account(2)));
    }

    #[test]
    fn seeding_precompiles_is_idempotent() {
        let mut store = PrestateStore::new();
        assert_eq!(store.seed_precompiled(&precompiles(), "0x1d", false), 8);

        let custom = H160::from_low_u64_be(4);
        store.insert(custom, account(42));
        let before = store.clone();

        assert_eq!(store.seed_precompiled(&precompiles(), "0x1d", false), 0);
        assert_eq!(store, before);
        assert_eq!(store.get(&custom), Some(&account(42)));
    }

    #[test]
    fn forced_seeding_resets_precompiles() {
        let mut store = PrestateStore::new();
        let custom = H160::from_low_u64_be(4);
        store.insert(custom, account(42));

        assert_eq!(store.seed_precompiled(&precompiles(), "0x1d", true), 8);
        let seeded = store.get(&custom).unwrap();
        assert_eq!(seeded.balance, PRECOMPILE_BALANCE);
        assert!(seeded.code.is_empty());
        assert_eq!(seeded.nonce, "0x1d");
    }

    proptest! {
        #[test]
        fn last_write_wins(writes in proptest::collection::vec((0_u64..16, any::<u64>()), 0..64)) {
            let mut store = PrestateStore::new();
            let mut expected = BTreeMap::new();
            for (address, balance) in &writes {
                let address = H160::from_low_u64_be(*address);
                store.insert(address, account(*balance));
                expected.insert(address, account(*balance));
            }
            prop_assert_eq!(store.len(), expected.len());
            prop_assert_eq!(store.snapshot(), expected);
        }
    }
}
