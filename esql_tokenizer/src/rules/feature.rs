//! Feature flags that gate development-only rules

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureFlag {
    DevInlineStats,
    DevLookup,
    DevMetrics,
}

impl FeatureFlag {
    pub const ALL: [FeatureFlag; 3] = [
        FeatureFlag::DevInlineStats,
        FeatureFlag::DevLookup,
        FeatureFlag::DevMetrics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureFlag::DevInlineStats => "dev_inline_stats",
            FeatureFlag::DevLookup => "dev_lookup",
            FeatureFlag::DevMetrics => "dev_metrics",
        }
    }
}

impl fmt::Display for FeatureFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown feature flag '{0}'")]
pub struct UnknownFeatureFlag(pub String);

impl FromStr for FeatureFlag {
    type Err = UnknownFeatureFlag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        FeatureFlag::ALL
            .into_iter()
            .find(|flag| flag.as_str() == normalized)
            .ok_or_else(|| UnknownFeatureFlag(s.to_string()))
    }
}
