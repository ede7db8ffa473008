use primitive_types::H160;

/// Category of a well-known address.
///
/// The categories are disjoint: an address belongs to at most one of them. Addresses outside all
/// categories are "unclassified"; the engine never generates prestate for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AddressKind {
    /// Externally owned account that signs transactions.
    SendingAccount,
    /// Contract account that may hold code and storage.
    StateAccount,
    /// Address reserved for built-in functionality.
    Precompiled,
}

impl AddressKind {
    /// All kinds, in classification order.
    pub const ALL: [Self; 3] = [Self::SendingAccount, Self::StateAccount, Self::Precompiled];

    /// Returns whether accounts of this kind get randomized prestate entries.
    pub fn is_fillable(self) -> bool {
        matches!(self, Self::SendingAccount | Self::StateAccount)
    }
}

/// Source of categorized address lists.
pub trait AddressTaxonomy {
    /// Returns every address of the specified kind.
    fn addresses(&self, kind: AddressKind) -> &[H160];

    /// Returns the kind of `address`, or `None` if it is unclassified.
    fn classify(&self, address: &H160) -> Option<AddressKind> {
        AddressKind::ALL
            .into_iter()
            .find(|&kind| self.addresses(kind).contains(address))
    }

    /// Returns whether `address` is a sending or a state account.
    fn is_fillable(&self, address: &H160) -> bool {
        self.classify(address).is_some_and(AddressKind::is_fillable)
    }

    /// Returns whether `address` is a precompile.
    fn is_precompiled(&self, address: &H160) -> bool {
        self.addresses(AddressKind::Precompiled).contains(address)
    }
}
