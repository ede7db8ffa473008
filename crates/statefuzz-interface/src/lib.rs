//! # Statefuzz Collaborator Interface
//!
//! This crate defines the interfaces the state test synthesis engine consumes but does not own:
//! where scalar random values come from ([`ValueSource`]) and how raw addresses are categorized
//! ([`AddressTaxonomy`]).
//!
//! Both traits are deliberately small. The engine never asks a collaborator for more than a
//! single value at a time, and it passes its own random number generator into every call, so a
//! collaborator never needs to hold randomness of its own. That is what makes fixture generation
//! reproducible: a template seeded with the same value draws the same sequence regardless of
//! which [`ValueSource`] implementation is plugged in, as long as that implementation is itself
//! a pure function of the generator.
//!
//! ## Implementing a taxonomy
//!
//! Only [`AddressTaxonomy::addresses()`] is required; classification is derived from it.
//!
//! ```
//! use primitive_types::H160;
//! use statefuzz_interface::{AddressKind, AddressTaxonomy};
//!
//! struct SingleSender {
//!     sender: [H160; 1],
//! }
//!
//! impl AddressTaxonomy for SingleSender {
//!     fn addresses(&self, kind: AddressKind) -> &[H160] {
//!         match kind {
//!             AddressKind::SendingAccount => &self.sender,
//!             AddressKind::StateAccount | AddressKind::Precompiled => &[],
//!         }
//!     }
//! }
//!
//! let taxonomy = SingleSender { sender: [H160::repeat_byte(0xa9)] };
//! assert!(taxonomy.is_fillable(&H160::repeat_byte(0xa9)));
//! assert_eq!(taxonomy.classify(&H160::zero()), None);
//! ```

pub use self::{taxonomy::*, values::*};

mod taxonomy;
mod values;
