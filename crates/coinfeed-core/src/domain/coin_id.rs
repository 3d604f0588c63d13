use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_COIN_ID_LEN: usize = 64;

/// CoinGecko API key for a coin, e.g. `bitcoin` or `theta-token`.
///
/// Keys are lowercase ASCII letters and digits joined by single hyphens. Input
/// is trimmed and lowercased before the rules are checked, so `" Bitcoin "`
/// parses as `bitcoin`. The key ends up in URL paths verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CoinId(String);

impl CoinId {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let key = input.trim().to_ascii_lowercase();
        check_key(&key)?;
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn check_key(key: &str) -> Result<(), ValidationError> {
    if key.is_empty() {
        return Err(ValidationError::EmptyCoinId);
    }
    if key.len() > MAX_COIN_ID_LEN {
        return Err(ValidationError::CoinIdTooLong {
            len: key.len(),
            max: MAX_COIN_ID_LEN,
        });
    }
    if let Some((index, ch)) = key
        .char_indices()
        .find(|(_, ch)| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || *ch == '-'))
    {
        return Err(ValidationError::CoinIdInvalidChar { ch, index });
    }
    if key.starts_with('-') || key.ends_with('-') || key.contains("--") {
        return Err(ValidationError::CoinIdMisplacedHyphen {
            value: key.to_owned(),
        });
    }
    Ok(())
}

impl Display for CoinId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CoinId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CoinId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for CoinId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CoinId> for String {
    fn from(value: CoinId) -> Self {
        value.0
    }
}
