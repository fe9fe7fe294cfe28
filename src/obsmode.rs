//! Obsmode string tokenizer.
//!
//! An observation mode ("obsmode") is a comma-separated keyword string such
//! as `"acs,wfc1,f555w,mjd#56000"`. This module splits it into normalized
//! tokens before graph traversal:
//!
//! - plain keywords are trimmed and lower-cased (`"WFC1"` -> `"wfc1"`),
//! - `name#value` tokens split at the first `#` into a parameterized keyword
//!   and its numeric payload (`"mjd#56000"` -> `("mjd", 56000.0)`),
//! - a wrapping `band( ... )` is stripped case-insensitively, so obsmode
//!   strings copied out of expression-language source still parse.
//!
//! Tokenization is the only place obsmode syntax is checked; the resolver
//! works purely on [`ObsToken`]s.

use crate::error::ResolveError;
use crate::regex;

/// One normalized obsmode token.
#[derive(Debug, Clone, PartialEq)]
pub enum ObsToken {
    /// An ordinary keyword, e.g. `acs`.
    Plain(String),
    /// A parameterized keyword split at `#`, e.g. `mjd#56000`.
    Param { name: String, value: f64 },
}

impl ObsToken {
    /// The keyword as it appears in the graph table: plain keywords match
    /// verbatim, parameterized keywords match the `name#` form.
    pub fn table_keyword(&self) -> String {
        match self {
            ObsToken::Plain(name) => name.clone(),
            ObsToken::Param { name, .. } => format!("{name}#"),
        }
    }
}

/// A tokenized obsmode string.
#[derive(Debug, Clone, PartialEq)]
pub struct Obsmode {
    /// Canonical form: lower-cased, whitespace stripped, `band()` removed.
    /// Used as the memoization key for resolved paths.
    pub canonical: String,
    /// Tokens in input order, exact duplicates removed.
    pub tokens: Vec<ObsToken>,
}

impl Obsmode {
    /// Tokenize an obsmode string.
    ///
    /// # Example
    /// ```
    /// use bandpath::obsmode::{Obsmode, ObsToken};
    ///
    /// let om = Obsmode::parse("band(ACS, wfc1, mjd#56000)").unwrap();
    /// assert_eq!(om.canonical, "acs,wfc1,mjd#56000");
    /// assert_eq!(om.tokens[0], ObsToken::Plain("acs".into()));
    /// ```
    pub fn parse(input: &str) -> Result<Self, ResolveError> {
        let invalid = |reason: &str| ResolveError::InvalidObsmode {
            obsmode: input.to_string(),
            reason: reason.to_string(),
        };

        let mut text = input.trim().to_lowercase().replace(' ', "");
        if let Some(caps) = regex!(r"^band\((.*)\)$").captures(&text) {
            text = caps[1].to_string();
        }
        if text.is_empty() {
            return Err(invalid("empty string"));
        }

        let mut tokens: Vec<ObsToken> = Vec::new();
        for raw in text.split(',') {
            if raw.is_empty() {
                return Err(invalid("empty keyword between commas"));
            }
            let token = match raw.split_once('#') {
                None => ObsToken::Plain(raw.to_string()),
                Some((name, suffix)) => {
                    if name.is_empty() {
                        return Err(invalid(&format!("'{raw}' has no keyword before '#'")));
                    }
                    let value: f64 = suffix
                        .parse()
                        .map_err(|_| invalid(&format!("'{raw}' has a non-numeric parameter value")))?;
                    ObsToken::Param { name: name.to_string(), value }
                }
            };
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }

        Ok(Obsmode { canonical: text, tokens })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_keywords_normalized() {
        let om = Obsmode::parse(" ACS, Wfc1 ,f555w").unwrap();
        assert_eq!(om.canonical, "acs,wfc1,f555w");
        assert_eq!(
            om.tokens,
            vec![
                ObsToken::Plain("acs".into()),
                ObsToken::Plain("wfc1".into()),
                ObsToken::Plain("f555w".into()),
            ]
        );
    }

    #[test]
    fn parameterized_keyword_splits_at_first_hash() {
        let om = Obsmode::parse("acs,mjd#56000").unwrap();
        assert_eq!(om.tokens[1], ObsToken::Param { name: "mjd".into(), value: 56000.0 });
        assert_eq!(om.tokens[1].table_keyword(), "mjd#");
    }

    #[test]
    fn float_parameter_values() {
        let om = Obsmode::parse("acs,wfc1,fr388n#3881.0").unwrap();
        assert_eq!(om.tokens[2], ObsToken::Param { name: "fr388n".into(), value: 3881.0 });
    }

    #[test]
    fn band_wrapper_stripped() {
        let om = Obsmode::parse("BAND(johnson, v)").unwrap();
        assert_eq!(om.canonical, "johnson,v");
    }

    #[test]
    fn duplicate_tokens_collapse() {
        let om = Obsmode::parse("acs,acs,wfc1").unwrap();
        assert_eq!(om.tokens.len(), 2);
    }

    #[test]
    fn rejects_bad_input() {
        for bad in ["", "  ", "acs,,wfc1", "acs,mjd#fifty", "acs,#56000", "acs,mjd#"] {
            assert!(
                matches!(Obsmode::parse(bad), Err(ResolveError::InvalidObsmode { .. })),
                "expected InvalidObsmode for {bad:?}"
            );
        }
    }
}
