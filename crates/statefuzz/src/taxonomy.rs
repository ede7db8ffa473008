use std::collections::BTreeSet;

use primitive_types::H160;
use statefuzz_interface::{AddressKind, AddressTaxonomy};

use crate::{Error, Result};

/// Sending account of the standard test key.
const SENDER: [u8; 20] = [
    0xa9, 0x4f, 0x53, 0x74, 0xfc, 0xe5, 0xed, 0xbc, 0x8e, 0x2a, 0x86, 0x97, 0xc1, 0x53, 0x31, 0x67,
    0x7e, 0x6e, 0xbf, 0x0b,
];

/// Address lists of the conventional state test world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardTaxonomy {
    sending: Vec<H160>,
    state: Vec<H160>,
    precompiled: Vec<H160>,
}

impl StandardTaxonomy {
    /// Creates a taxonomy from explicit lists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OverlappingTaxonomy`] if an address occurs in more than one list.
    pub fn new(sending: Vec<H160>, state: Vec<H160>, precompiled: Vec<H160>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for kind in [&sending, &state, &precompiled] {
            // duplicates within one list are harmless
            let unique: BTreeSet<_> = kind.iter().copied().collect();
            for address in unique {
                if !seen.insert(address) {
                    return Err(Error::OverlappingTaxonomy(address));
                }
            }
        }
        Ok(Self {
            sending,
            state,
            precompiled,
        })
    }
}

impl Default for StandardTaxonomy {
    /// Precompiles `0x01..=0x08`, the test key's sender, and five state accounts.
    fn default() -> Self {
        let with_prefix = |first: u8| {
            let mut address = H160(SENDER);
            address.0[0] = first;
            address
        };
        let mut lowest = H160::zero();
        lowest.0[0] = 0x10;

        Self {
            sending: vec![H160(SENDER)],
            state: vec![
                lowest,
                with_prefix(0xb9),
                with_prefix(0xc9),
                with_prefix(0xd9),
                H160::repeat_byte(0xff),
            ],
            precompiled: (1..=8).map(H160::from_low_u64_be).collect(),
        }
    }
}

impl AddressTaxonomy for StandardTaxonomy {
    fn addresses(&self, kind: AddressKind) -> &[H160] {
        match kind {
            AddressKind::SendingAccount => &self.sending,
            AddressKind::StateAccount => &self.state,
            AddressKind::Precompiled => &self.precompiled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_address;

    #[test]
    fn default_lists() {
        let taxonomy = StandardTaxonomy::default();
        let classify = |s: &str| taxonomy.classify(&parse_address(s).unwrap());

        assert_eq!(
            classify("0xa94f5374fce5edbc8e2a8697c15331677e6ebf0b"),
            Some(AddressKind::SendingAccount)
        );
        for state in [
            "0x1000000000000000000000000000000000000000",
            "0xb94f5374fce5edbc8e2a8697c15331677e6ebf0b",
            "0xc94f5374fce5edbc8e2a8697c15331677e6ebf0b",
            "0xd94f5374fce5edbc8e2a8697c15331677e6ebf0b",
            "0xffffffffffffffffffffffffffffffffffffffff",
        ] {
            assert_eq!(classify(state), Some(AddressKind::StateAccount), "{state}");
        }
        assert_eq!(
            classify("0x0000000000000000000000000000000000000008"),
            Some(AddressKind::Precompiled)
        );
        assert_eq!(classify("0x0000000000000000000000000000000000000009"), None);
        assert!(!taxonomy.is_fillable(&H160::from_low_u64_be(1)));
        assert!(taxonomy.is_precompiled(&H160::from_low_u64_be(1)));
    }

    #[test]
    fn overlapping_lists_are_rejected() {
        let address = H160::repeat_byte(0x11);
        let err = StandardTaxonomy::new(vec![address], vec![address], vec![]).unwrap_err();
        assert!(matches!(err, Error::OverlappingTaxonomy(a) if a == address));

        StandardTaxonomy::new(vec![address, address], vec![], vec![]).unwrap();
    }
}
