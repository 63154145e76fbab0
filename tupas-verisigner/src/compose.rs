//! Construction of the destination URL.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::name::DecodedName;

/// Everything outside the RFC 3986 unreserved set.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Build `base?firstname=..&lastname=..&hash=..`, appending to any query `base` already has.
pub fn success_url(base: &Url, name: &DecodedName, hash: &str) -> String {
    let params = format!(
        "firstname={}&lastname={}&hash={}",
        utf8_percent_encode(&name.first_name, COMPONENT),
        utf8_percent_encode(&name.last_name, COMPONENT),
        hash
    );
    let query = match base.query() {
        Some(existing) if !existing.is_empty() => format!("{}&{}", existing, params),
        _ => params,
    };

    let mut url = base.clone();
    url.set_query(Some(&query));
    url.to_string()
}
