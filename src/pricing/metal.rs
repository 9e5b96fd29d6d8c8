/// Tracked instruments: spot precious metals quoted in USD per troy ounce
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metal {
    Gold,
    Silver,
    Platinum,
    Palladium,
}

impl Metal {
    pub const ALL: [Metal; 4] = [Metal::Gold, Metal::Silver, Metal::Platinum, Metal::Palladium];

    /// Lowercase identifier, also the metals.live path segment and JSON key
    pub fn as_str(&self) -> &'static str {
        match self {
            Metal::Gold => "gold",
            Metal::Silver => "silver",
            Metal::Platinum => "platinum",
            Metal::Palladium => "palladium",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Metal::Gold => "Gold",
            Metal::Silver => "Silver",
            Metal::Platinum => "Platinum",
            Metal::Palladium => "Palladium",
        }
    }

    /// ISO 4217 code (XAU, XAG, ...)
    pub fn iso_code(&self) -> &'static str {
        match self {
            Metal::Gold => "XAU",
            Metal::Silver => "XAG",
            Metal::Platinum => "XPT",
            Metal::Palladium => "XPD",
        }
    }

    /// Front-month futures symbol on Yahoo Finance
    pub fn futures_symbol(&self) -> &'static str {
        match self {
            Metal::Gold => "GC=F",
            Metal::Silver => "SI=F",
            Metal::Platinum => "PL=F",
            Metal::Palladium => "PA=F",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Metal::Gold => "🥇",
            Metal::Silver => "🪙",
            Metal::Platinum | Metal::Palladium => "⚪",
        }
    }
}

impl fmt::Display for Metal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Metal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gold" | "xau" | "au" => Ok(Metal::Gold),
            "silver" | "xag" | "ag" => Ok(Metal::Silver),
            "platinum" | "xpt" | "pt" => Ok(Metal::Platinum),
            "palladium" | "xpd" | "pd" => Ok(Metal::Palladium),
            other => Err(format!("unknown metal '{}'", other)),
        }
    }
}
