//! Extraction of [`ProtocolFields`] from a return URL.

use std::borrow::Cow;

use encoding_rs::Encoding;
use percent_encoding::percent_decode;
use thiserror::Error;
use url::Url;

use crate::{ProtocolFields, FIELD_NAMES};

/// The error type associated with field extraction.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// The URL could not be parsed.
    #[error(transparent)]
    Url(#[from] url::ParseError),
    /// The URL has no query string.
    #[error("missing query")]
    MissingQuery,
    /// A required parameter is absent.
    #[error("missing field {0}")]
    MissingField(&'static str),
    /// A required parameter is present but empty.
    #[error("empty field {0}")]
    EmptyField(&'static str),
    /// A parameter value contains bytes the configured encoding cannot map.
    #[error("field {field} is not valid {encoding}")]
    Undecodable {
        /// Parameter name.
        field: &'static str,
        /// Name of the configured encoding.
        encoding: &'static str,
    },
}

impl ProtocolFields {
    /// Parse `url` and extract the identification response fields from its query string.
    ///
    /// Percent-escapes are decoded to raw bytes which are then interpreted with `encoding`,
    /// the bank's legacy single-byte encoding.
    pub fn from_url(url: &str, encoding: &'static Encoding) -> Result<Self, ExtractError> {
        let url = Url::parse(url)?;
        let query = url.query().ok_or(ExtractError::MissingQuery)?;
        Self::from_query(query, encoding)
    }

    /// Extract the identification response fields from a raw query string.
    ///
    /// Unknown parameters are ignored and the first occurrence of a repeated parameter wins.
    pub fn from_query(query: &str, encoding: &'static Encoding) -> Result<Self, ExtractError> {
        let mut values: [Option<String>; 10] = Default::default();

        for pair in query.split('&') {
            let (raw_name, raw_value) = match pair.find('=') {
                Some(index) => (&pair[..index], &pair[index + 1..]),
                None => (pair, ""),
            };

            // Parameter names are ASCII, anything else is not ours
            let index = match decode_component(raw_name, encoding)
                .and_then(|name| FIELD_NAMES.iter().position(|field| *field == name))
            {
                Some(index) => index,
                None => continue,
            };
            if values[index].is_some() {
                continue;
            }

            let value =
                decode_component(raw_value, encoding).ok_or(ExtractError::Undecodable {
                    field: FIELD_NAMES[index],
                    encoding: encoding.name(),
                })?;
            values[index] = Some(value);
        }

        let mut take = |index: usize| {
            let field = FIELD_NAMES[index];
            match values[index].take() {
                None => Err(ExtractError::MissingField(field)),
                Some(value) if value.is_empty() => Err(ExtractError::EmptyField(field)),
                Some(value) => Ok(value),
            }
        };

        Ok(ProtocolFields {
            version: take(0)?,
            timestamp: take(1)?,
            personal_id: take(2)?,
            confirmation_stamp: take(3)?,
            customer_name: take(4)?,
            key_version: take(5)?,
            algorithm: take(6)?,
            customer_id: take(7)?,
            customer_type: take(8)?,
            mac: take(9)?,
        })
    }
}

/// Decode a form-encoded query component with a legacy encoding.
fn decode_component(raw: &str, encoding: &'static Encoding) -> Option<String> {
    let unplussed: Vec<u8> = raw
        .bytes()
        .map(|byte| if byte == b'+' { b' ' } else { byte })
        .collect();
    let bytes: Cow<'_, [u8]> = percent_decode(&unplussed).into();
    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes)
        .map(Cow::into_owned)
}
