//! The digest construction shared by the inbound MAC and the outbound name hash.

use ring::digest::{Context, Digest, SHA256};

/// Length in bytes of a TUPAS digest.
pub const DIGEST_LEN: usize = 32;

/// Computes SHA-256 over `parts`, each one terminated by `&`.
///
/// This is the TUPAS MAC layout: `field_1&field_2&...&field_n&secret&`.
pub fn tupas_digest<I, P>(parts: I) -> Digest
where
    I: IntoIterator<Item = P>,
    P: AsRef<[u8]>,
{
    let mut context = Context::new(&SHA256);
    for part in parts {
        context.update(part.as_ref());
        context.update(b"&");
    }
    context.finish()
}
