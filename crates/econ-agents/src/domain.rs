//! Economic domains covered by the agents

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EconError;

/// One of the three analysed areas of the economy
///
/// Ordering is the fixed order in which domains are run and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Inflation,
    Gdp,
    Trade,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Inflation, Domain::Gdp, Domain::Trade];

    /// Lowercase key used in file names and report maps
    pub fn key(self) -> &'static str {
        match self {
            Self::Inflation => "inflation",
            Self::Gdp => "gdp",
            Self::Trade => "trade",
        }
    }

    /// Name of the agent responsible for the domain
    pub fn agent_name(self) -> &'static str {
        match self {
            Self::Inflation => "InflationAgent",
            Self::Gdp => "GDPAgent",
            Self::Trade => "TradeAgent",
        }
    }

    /// Title-cased label for human-readable output
    pub fn title(self) -> &'static str {
        match self {
            Self::Inflation => "Inflation",
            Self::Gdp => "Gdp",
            Self::Trade => "Trade",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Domain {
    type Err = EconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inflation" => Ok(Self::Inflation),
            "gdp" => Ok(Self::Gdp),
            "trade" => Ok(Self::Trade),
            other => Err(EconError::UnknownDomain(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("GDP".parse::<Domain>().unwrap(), Domain::Gdp);
        assert_eq!(" trade ".parse::<Domain>().unwrap(), Domain::Trade);
        assert!(matches!("housing".parse::<Domain>(), Err(EconError::UnknownDomain(_))));
    }

    #[test]
    fn test_order_and_names() {
        let mut domains = vec![Domain::Trade, Domain::Inflation, Domain::Gdp];
        domains.sort();
        assert_eq!(domains, Domain::ALL.to_vec());
        assert_eq!(Domain::Gdp.agent_name(), "GDPAgent");
        assert_eq!(Domain::Inflation.to_string(), "inflation");
    }
}
