use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Plant species context selecting which classifier and knowledge base
/// apply to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Crop {
    Mango,
    Cashew,
}

impl Crop {
    pub const ALL: [Self; 2] = [Self::Mango, Self::Cashew];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mango => "mango",
            Self::Cashew => "cashew",
        }
    }
}

impl fmt::Display for Crop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Crop {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mango" => Ok(Self::Mango),
            "cashew" => Ok(Self::Cashew),
            other => Err(format!("unknown crop: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_round_trip() {
        for crop in Crop::ALL {
            assert_eq!(crop.as_str().parse::<Crop>(), Ok(crop));
        }
    }

    #[test]
    fn test_crop_parse_is_case_insensitive() {
        assert_eq!("Mango".parse::<Crop>(), Ok(Crop::Mango));
        assert_eq!("CASHEW".parse::<Crop>(), Ok(Crop::Cashew));
    }

    #[test]
    fn test_unknown_crop_is_rejected() {
        assert!("papaya".parse::<Crop>().is_err());
    }
}
