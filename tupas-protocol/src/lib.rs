#![warn(
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms,
    unreachable_pub
)]

//! `tupas-protocol` is a library providing the inbound half of the TUPAS bank identification
//! callback: extraction of the `B02K_*` query parameters from a return URL and verification of
//! the `B02K_MAC` digest over them.

pub mod digest;
pub mod extract;
pub mod mac;

pub use crate::{
    extract::ExtractError,
    mac::{compute_mac, verify_mac, MacError},
};

/// Query parameter names of the identification response, in digest order.
pub const FIELD_NAMES: [&str; 10] = [
    "B02K_VERS",
    "B02K_TIMESTMP",
    "B02K_IDNBR",
    "B02K_STAMP",
    "B02K_CUSTNAME",
    "B02K_KEYVERS",
    "B02K_ALG",
    "B02K_CUSTID",
    "B02K_CUSTTYPE",
    "B02K_MAC",
];

/// Represents the fields of an identification response, decoded from the bank's legacy encoding.
///
/// Every field is guaranteed non-empty once constructed by [`ProtocolFields::from_url`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolFields {
    /// `B02K_VERS`, the protocol version.
    pub version: String,
    /// `B02K_TIMESTMP`, the bank's timestamp.
    pub timestamp: String,
    /// `B02K_IDNBR`, the identification number.
    pub personal_id: String,
    /// `B02K_STAMP`, the stamp echoed from the original request.
    pub confirmation_stamp: String,
    /// `B02K_CUSTNAME`, the customer's name as sent by the bank.
    pub customer_name: String,
    /// `B02K_KEYVERS`, the version of the shared secret.
    pub key_version: String,
    /// `B02K_ALG`, the digest algorithm identifier.
    pub algorithm: String,
    /// `B02K_CUSTID`, the customer identifier.
    pub customer_id: String,
    /// `B02K_CUSTTYPE`, the customer identifier type.
    pub customer_type: String,
    /// `B02K_MAC`, the hex digest supplied by the bank.
    pub mac: String,
}

impl ProtocolFields {
    /// The nine signed fields, in digest order. The MAC itself is excluded.
    pub fn signed_fields(&self) -> [&str; 9] {
        [
            self.version.as_str(),
            self.timestamp.as_str(),
            self.personal_id.as_str(),
            self.confirmation_stamp.as_str(),
            self.customer_name.as_str(),
            self.key_version.as_str(),
            self.algorithm.as_str(),
            self.customer_id.as_str(),
            self.customer_type.as_str(),
        ]
    }
}
