use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Chain {
    Eth,
    Arbitrum,
    Optimism,
    Polygon,
    Bsc,
    Avalanche,
    Base,
    Core,
    OpBnb,
    Celo,
    Klaytn,
    Fantom,
    Moonbeam,
    Moonriver,
}

impl Chain {
    /// All supported chains in report order. The first one is the default.
    pub const ALL: [Chain; 14] = [
        Chain::Eth,
        Chain::Arbitrum,
        Chain::Optimism,
        Chain::Polygon,
        Chain::Bsc,
        Chain::Avalanche,
        Chain::Base,
        Chain::Core,
        Chain::OpBnb,
        Chain::Celo,
        Chain::Klaytn,
        Chain::Fantom,
        Chain::Moonbeam,
        Chain::Moonriver,
    ];

    pub fn default_chain() -> Self {
        Self::ALL[0]
    }

    /// Display name, also used for column headers and CSV file names.
    pub fn name(&self) -> &'static str {
        match self {
            Chain::Eth => "ETH",
            Chain::Arbitrum => "Arbitrum",
            Chain::Optimism => "Optimism",
            Chain::Polygon => "Polygon",
            Chain::Bsc => "BSC",
            Chain::Avalanche => "Avalanche",
            Chain::Base => "Base",
            Chain::Core => "Core",
            Chain::OpBnb => "opBNB",
            Chain::Celo => "Celo",
            Chain::Klaytn => "Klaytn",
            Chain::Fantom => "Fantom",
            Chain::Moonbeam => "Moonbeam",
            Chain::Moonriver => "Moonriver",
        }
    }

    /// Ticker of the fee currency. Doubles as the price API `fsym`.
    pub fn native_symbol(&self) -> &'static str {
        match self {
            Chain::Eth | Chain::Arbitrum | Chain::Optimism | Chain::Base => "ETH",
            Chain::Polygon => "MATIC",
            Chain::Bsc | Chain::OpBnb => "BNB",
            Chain::Avalanche => "AVAX",
            Chain::Core => "CORE",
            Chain::Celo => "CELO",
            Chain::Klaytn => "KLAY",
            Chain::Fantom => "FTM",
            Chain::Moonbeam => "GLMR",
            Chain::Moonriver => "MOVR",
        }
    }

    /// Suffix for the `RPC_<KEY>` endpoint override variable.
    pub fn env_key(&self) -> String {
        self.name().to_uppercase()
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown chain: {0}")]
pub struct UnknownChain(pub String);

impl FromStr for Chain {
    type Err = UnknownChain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Chain::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownChain(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// ReportTarget: one chain or the multi-chain summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTarget {
    Chain(Chain),
    All,
}

impl ReportTarget {
    /// Resolve an optional CLI argument; `None` means the default chain.
    pub fn parse(arg: Option<&str>) -> Result<Self, UnknownChain> {
        match arg {
            None => Ok(ReportTarget::Chain(Chain::default_chain())),
            Some(s) if s.trim().eq_ignore_ascii_case("all") => Ok(ReportTarget::All),
            Some(s) => s.parse().map(ReportTarget::Chain),
        }
    }

    /// Chains that must be fetched for this target.
    pub fn chains(&self) -> Vec<Chain> {
        match self {
            ReportTarget::Chain(c) => vec![*c],
            ReportTarget::All => Chain::ALL.to_vec(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReportTarget::Chain(c) => c.name(),
            ReportTarget::All => "all",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("opbnb".parse::<Chain>().unwrap(), Chain::OpBnb);
        assert_eq!("BSC".parse::<Chain>().unwrap(), Chain::Bsc);
        assert_eq!(" arbitrum ".parse::<Chain>().unwrap(), Chain::Arbitrum);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            "Solana".parse::<Chain>(),
            Err(UnknownChain("Solana".into()))
        );
    }

    #[test]
    fn test_target_defaults_to_first_chain() {
        assert_eq!(ReportTarget::parse(None).unwrap(), ReportTarget::Chain(Chain::Eth));
        assert_eq!(ReportTarget::parse(Some("ALL")).unwrap(), ReportTarget::All);
        assert_eq!(ReportTarget::All.chains().len(), Chain::ALL.len());
    }

    #[test]
    fn test_env_key() {
        assert_eq!(Chain::OpBnb.env_key(), "OPBNB");
        assert_eq!(Chain::Eth.env_key(), "ETH");
    }
}
