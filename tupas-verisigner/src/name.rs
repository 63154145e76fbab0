//! Splitting and case normalisation of the customer's name.

/// The customer's name, split and normalised for the destination URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedName {
    /// First whitespace-delimited token.
    pub first_name: String,
    /// Remaining tokens, joined by single spaces. Empty for a single-token name.
    pub last_name: String,
}

impl DecodedName {
    /// Split a decoded `B02K_CUSTNAME` value into first and last name.
    ///
    /// Returns `None` if the value holds no tokens.
    pub fn parse(customer_name: &str) -> Option<Self> {
        let mut words = customer_name.split_whitespace().map(normalize_word);
        let first_name = words.next()?;
        let last_name = words.collect::<Vec<_>>().join(" ");
        Some(Self {
            first_name,
            last_name,
        })
    }
}

/// Upper-case the first letter of each hyphen-separated part and lower-case the rest.
fn normalize_word(word: &str) -> String {
    word.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    let mut word = titlecase(first);
                    word.extend(chars.flat_map(char::to_lowercase));
                    word
                }
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("-")
}

/// Unicode title case of `c`, which differs from upper case for digraphs and multi-char mappings.
fn titlecase(c: char) -> String {
    match c {
        'Ǆ' | 'ǅ' | 'ǆ' => "ǅ".to_string(),
        'Ǉ' | 'ǈ' | 'ǉ' => "ǈ".to_string(),
        'Ǌ' | 'ǋ' | 'ǌ' => "ǋ".to_string(),
        'Ǳ' | 'ǲ' | 'ǳ' => "ǲ".to_string(),
        _ => {
            let mut upper = c.to_uppercase();
            upper
                .next()
                .into_iter()
                .chain(upper.flat_map(char::to_lowercase))
                .collect()
        }
    }
}
