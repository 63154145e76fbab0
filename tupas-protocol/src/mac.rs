//! Verification of the bank-supplied `B02K_MAC`.

use std::{borrow::Cow, iter};

use encoding_rs::Encoding;
use ring::{constant_time::verify_slices_are_equal, digest::Digest};
use thiserror::Error;

use crate::{digest::tupas_digest, ProtocolFields};

/// The error type associated with MAC verification.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum MacError {
    /// The supplied MAC does not match the recomputed digest.
    #[error("mac mismatch")]
    Mismatch,
}

fn mac_digest(fields: &ProtocolFields, secret: &[u8], encoding: &'static Encoding) -> Digest {
    let signed = fields.signed_fields();
    let parts = signed
        .iter()
        .map(|value| encoding.encode(value).0)
        .chain(iter::once(Cow::Borrowed(secret)));
    tupas_digest(parts)
}

/// Compute the MAC, as upper-case hex, the bank would attach to `fields`.
///
/// The signed fields are re-encoded with `encoding` so the digest covers the bytes the bank sent.
pub fn compute_mac(fields: &ProtocolFields, secret: &[u8], encoding: &'static Encoding) -> String {
    hex::encode_upper(mac_digest(fields, secret, encoding))
}

/// Verify the MAC supplied in `fields`.
///
/// Hex case is ignored. The digest comparison is constant-time.
pub fn verify_mac(
    fields: &ProtocolFields,
    secret: &[u8],
    encoding: &'static Encoding,
) -> Result<(), MacError> {
    let expected = mac_digest(fields, secret, encoding);
    let supplied = hex::decode(&fields.mac).map_err(|_| MacError::Mismatch)?;
    verify_slices_are_equal(expected.as_ref(), &supplied).map_err(|_| MacError::Mismatch)
}
