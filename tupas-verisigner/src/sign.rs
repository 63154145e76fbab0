//! The outbound hash over the customer's name.

use protocol::digest::tupas_digest;

use crate::name::DecodedName;

/// Compute the lower-case hex hash authorising `name` at the destination.
///
/// Covers `first_name&last_name&secret&` in UTF-8, the same layout as the inbound MAC.
pub fn sign_name(name: &DecodedName, secret: &[u8]) -> String {
    let digest = tupas_digest(&[
        name.first_name.as_bytes(),
        name.last_name.as_bytes(),
        secret,
    ]);
    hex::encode(digest)
}
