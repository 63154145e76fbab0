#![warn(
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms,
    unreachable_pub
)]

//! `tupas-verisigner` verifies the return URL of a TUPAS bank identification and, if it is
//! authentic, re-signs the customer's name into a redirect toward a relying application.
//!
//! Every rejected callback maps to the same configured error URL, so the caller learns nothing
//! about which check failed.

pub mod compose;
pub mod config;
pub mod name;
pub mod sign;

use encoding_rs::Encoding;
use protocol::{verify_mac, ExtractError, MacError, ProtocolFields};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub use crate::{
    config::{ConfigError, Secret, VerisignerConfig},
    name::DecodedName,
};

/// Reasons a callback is rejected. Never surfaced to the caller.
#[derive(Debug, Error)]
enum VerificationError {
    #[error(transparent)]
    Extraction(#[from] ExtractError),
    #[error(transparent)]
    Mac(#[from] MacError),
    #[error("empty customer name")]
    EmptyName,
}

/// Verifies identification callbacks and signs the redirect toward the relying application.
///
/// Immutable once constructed; share it freely between threads.
#[derive(Debug)]
pub struct Verisigner {
    input_secret: Secret,
    output_secret: Secret,
    success_base_url: Url,
    error_url: String,
    encoding: &'static Encoding,
}

impl Verisigner {
    /// Validate `config` and construct a [`Verisigner`].
    pub fn new(config: VerisignerConfig) -> Result<Self, ConfigError> {
        if config.input_secret.is_empty() {
            return Err(ConfigError::EmptySecret("input secret"));
        }
        if config.output_secret.is_empty() {
            return Err(ConfigError::EmptySecret("output secret"));
        }

        let encoding = Encoding::for_label(config.encoding.as_bytes())
            .ok_or_else(|| ConfigError::UnknownEncoding(config.encoding.clone()))?;
        if !encoding.is_single_byte() {
            return Err(ConfigError::NotSingleByte(encoding.name()));
        }

        let success_base_url = Url::parse(&config.success_base_url)?;
        debug!(encoding = encoding.name(), "constructed verisigner");

        Ok(Self {
            input_secret: config.input_secret,
            output_secret: config.output_secret,
            success_base_url,
            error_url: config.error_url,
            encoding,
        })
    }

    /// The resolved legacy encoding used to decode callbacks.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// The URL returned for rejected callbacks.
    pub fn error_url(&self) -> &str {
        &self.error_url
    }

    /// Verify `input_url` and return the signed success URL, or the error URL if verification
    /// fails for any reason.
    pub fn verify_and_sign(&self, input_url: &str) -> String {
        match self.verify(input_url) {
            Ok(success_url) => success_url,
            Err(err) => {
                debug!(reason = %err, "rejected identification callback");
                self.error_url.clone()
            }
        }
    }

    fn verify(&self, input_url: &str) -> Result<String, VerificationError> {
        let fields = ProtocolFields::from_url(input_url, self.encoding)?;
        verify_mac(&fields, self.input_secret.expose(), self.encoding)?;

        let name =
            DecodedName::parse(&fields.customer_name).ok_or(VerificationError::EmptyName)?;
        let hash = sign::sign_name(&name, self.output_secret.expose());
        Ok(compose::success_url(&self.success_base_url, &name, &hash))
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use encoding_rs::{ISO_8859_15, UTF_8, WINDOWS_1252};
    use percent_encoding::{percent_encode, NON_ALPHANUMERIC};
    use protocol::{compute_mac, FIELD_NAMES};

    use super::*;

    const ERROR_URL: &str = "http://otherserver.com/error.html";
    // Hash is SHA-256 over `Väinö&Mäki&outputsecret&`, see `sign::sign_name`
    const SUCCESS_URL: &str = "http://otherserver.com/?firstname=V%C3%A4in%C3%B6&lastname=M%C3%A4ki&hash=4ff3fc8334015dfe68df8ab07baf96b250f9973ec6eeba0e3c8d2b7fbca42f7c";

    fn signer() -> Verisigner {
        Verisigner::new(
            VerisignerConfig::new(
                "inputsecret",
                "outputsecret",
                "http://otherserver.com",
                ERROR_URL,
            )
            .with_encoding("Windows-1252"),
        )
        .unwrap()
    }

    fn query_args() -> Vec<(&'static str, String)> {
        vec![
            ("B02K_VERS", "0003"),
            ("B02K_TIMESTMP", "50020181017141433899056"),
            ("B02K_IDNBR", "2512408990"),
            ("B02K_STAMP", "20010125140015123456"),
            ("B02K_CUSTNAME", "VÄINÖ MÄKI"),
            ("B02K_KEYVERS", "0001"),
            ("B02K_ALG", "03"),
            ("B02K_CUSTID", "9984"),
            ("B02K_CUSTTYPE", "02"),
            (
                "B02K_MAC",
                "88AAF3CE995A7887935A50B0F483C4FB35D908D6ABC8BADDB9B4C0C30416275D",
            ),
        ]
        .into_iter()
        .map(|(name, value)| (name, value.to_string()))
        .collect()
    }

    fn set(args: &mut Vec<(&'static str, String)>, name: &str, value: &str) {
        for (arg_name, arg_value) in args.iter_mut() {
            if *arg_name == name {
                *arg_value = value.to_string();
            }
        }
    }

    fn input_url(args: &[(&'static str, String)], encoding: &'static Encoding) -> String {
        let query = args
            .iter()
            .map(|(name, value)| {
                let (bytes, _, _) = encoding.encode(value);
                format!("{}={}", name, percent_encode(&bytes, NON_ALPHANUMERIC))
            })
            .collect::<Vec<_>>()
            .join("&");
        format!("http://someserver.com/?{}", query)
    }

    /// Re-sign `args` the way the bank would after changing a field.
    fn resign(args: &mut Vec<(&'static str, String)>, secret: &[u8], encoding: &'static Encoding) {
        let url = input_url(args, encoding);
        let fields = ProtocolFields::from_url(&url, encoding).unwrap();
        let mac = compute_mac(&fields, secret, encoding);
        set(args, "B02K_MAC", &mac);
    }

    #[test]
    fn valid_signature() {
        let url = input_url(&query_args(), WINDOWS_1252);
        assert_eq!(signer().verify_and_sign(&url), SUCCESS_URL);
    }

    #[test]
    fn deterministic() {
        let signer = signer();
        let url = input_url(&query_args(), WINDOWS_1252);
        assert_eq!(signer.verify_and_sign(&url), signer.verify_and_sign(&url));
    }

    #[test]
    fn lower_case_mac() {
        let mut args = query_args();
        set(
            &mut args,
            "B02K_MAC",
            "88aaf3ce995a7887935a50b0f483c4fb35d908d6abc8baddb9b4c0c30416275d",
        );
        let url = input_url(&args, WINDOWS_1252);
        assert_eq!(signer().verify_and_sign(&url), SUCCESS_URL);
    }

    #[test]
    fn missing_argument() {
        let signer = signer();
        for name in FIELD_NAMES.iter() {
            let args: Vec<_> = query_args()
                .into_iter()
                .filter(|(arg_name, _)| arg_name != name)
                .collect();
            assert_eq!(signer.verify_and_sign(&input_url(&args, WINDOWS_1252)), ERROR_URL);
        }
    }

    #[test]
    fn empty_argument() {
        let signer = signer();
        for name in FIELD_NAMES.iter() {
            let mut args = query_args();
            set(&mut args, name, "");
            assert_eq!(signer.verify_and_sign(&input_url(&args, WINDOWS_1252)), ERROR_URL);
        }
    }

    #[test]
    fn garbage_signature() {
        let mut args = query_args();
        set(&mut args, "B02K_MAC", "garbage");
        let url = input_url(&args, WINDOWS_1252);
        assert_eq!(signer().verify_and_sign(&url), ERROR_URL);
    }

    #[test]
    fn mutated_signature() {
        let signer = signer();
        let mac = query_args()[9].1.clone();
        for index in 0..mac.len() {
            let mut mutated = mac.clone();
            let replacement = if &mac[index..index + 1] == "F" { "E" } else { "F" };
            mutated.replace_range(index..index + 1, replacement);

            let mut args = query_args();
            set(&mut args, "B02K_MAC", &mutated);
            assert_eq!(signer.verify_and_sign(&input_url(&args, WINDOWS_1252)), ERROR_URL);
        }
    }

    #[test]
    fn utf8_callback() {
        // A callback re-encoded as UTF-8 no longer matches the bank's MAC
        let url = input_url(&query_args(), UTF_8);
        assert_eq!(signer().verify_and_sign(&url), ERROR_URL);
    }

    #[test]
    fn blank_name() {
        let mut args = query_args();
        set(&mut args, "B02K_CUSTNAME", "   ");
        resign(&mut args, b"inputsecret", WINDOWS_1252);
        let url = input_url(&args, WINDOWS_1252);
        assert_eq!(signer().verify_and_sign(&url), ERROR_URL);
    }

    #[test]
    fn malformed_url() {
        assert_eq!(signer().verify_and_sign("not a url"), ERROR_URL);
        assert_eq!(signer().verify_and_sign("http://someserver.com/"), ERROR_URL);
    }

    #[test]
    fn configured_encoding() {
        // 0xA6 and 0xA4 are Š and € in ISO-8859-15 but ¦ and ¤ in windows-1252
        let mut args = query_args();
        set(&mut args, "B02K_CUSTNAME", "ŠÄRKÄ €");
        resign(&mut args, b"inputsecret", ISO_8859_15);
        let url = input_url(&args, ISO_8859_15);

        let signer = Verisigner::new(
            VerisignerConfig::new(
                "inputsecret",
                "outputsecret",
                "http://otherserver.com",
                ERROR_URL,
            )
            .with_encoding("iso-8859-15"),
        )
        .unwrap();
        assert!(signer.verify_and_sign(&url).starts_with(
            "http://otherserver.com/?firstname=%C5%A0%C3%A4rk%C3%A4&lastname=%E2%82%AC&hash="
        ));

        // The MAC still holds under windows-1252 but the name is silently wrong
        assert!(self::signer().verify_and_sign(&url).starts_with(
            "http://otherserver.com/?firstname=%C2%A6%C3%A4rk%C3%A4&lastname=%C2%A4&hash="
        ));
    }

    #[test]
    fn success_hash_shape() {
        let output = signer().verify_and_sign(&input_url(&query_args(), WINDOWS_1252));
        let hash = output.rsplit("&hash=").next().unwrap();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn parallel() {
        let signer = Arc::new(signer());
        let url = Arc::new(input_url(&query_args(), WINDOWS_1252));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let signer = signer.clone();
                let url = url.clone();
                thread::spawn(move || signer.verify_and_sign(&url))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), SUCCESS_URL);
        }
    }

    #[test]
    fn send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Verisigner>();
    }

    #[test]
    fn unknown_encoding() {
        let config = VerisignerConfig::new("a", "b", "http://otherserver.com", ERROR_URL)
            .with_encoding("klingon");
        assert!(matches!(
            Verisigner::new(config),
            Err(ConfigError::UnknownEncoding(_))
        ));
    }

    #[test]
    fn multi_byte_encoding() {
        let config = VerisignerConfig::new("a", "b", "http://otherserver.com", ERROR_URL)
            .with_encoding("utf-8");
        assert!(matches!(
            Verisigner::new(config),
            Err(ConfigError::NotSingleByte("UTF-8"))
        ));
    }

    #[test]
    fn invalid_success_url() {
        let config = VerisignerConfig::new("a", "b", "otherserver", ERROR_URL);
        assert!(matches!(
            Verisigner::new(config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn empty_secret() {
        let config = VerisignerConfig::new("a", "", "http://otherserver.com", ERROR_URL);
        assert!(matches!(
            Verisigner::new(config),
            Err(ConfigError::EmptySecret("output secret"))
        ));
    }

    #[test]
    fn default_encoding() {
        let config = VerisignerConfig::new("a", "b", "http://otherserver.com", ERROR_URL);
        let signer = Verisigner::new(config).unwrap();
        assert_eq!(signer.encoding(), WINDOWS_1252);
        assert_eq!(signer.error_url(), ERROR_URL);
    }
}
