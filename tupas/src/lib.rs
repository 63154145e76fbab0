#![warn(
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms,
    unreachable_pub
)]

//! `tupas` is a collection of components for relying on TUPAS bank identification:
//! * [`protocol`] extracts and verifies the fields of the bank's identification response.
//! * [`verisigner`] turns a verified response into a signed redirect carrying the customer's name.

#[doc(inline)]
pub use protocol;
#[doc(inline)]
pub use verisigner;

pub use verisigner::{Verisigner, VerisignerConfig};
