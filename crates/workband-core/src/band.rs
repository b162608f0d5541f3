use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use semver::Version;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureBand {
    major: u64,
    minor: u64,
    band: u64,
}

impl FeatureBand {
    pub fn new(major: u64, minor: u64, band: u64) -> Self {
        Self { major, minor, band }
    }

    // The band partition key truncates the patch to its hundred; prerelease
    // and build metadata on the running SDK never influence the band.
    pub fn from_sdk_version(version: &Version) -> Self {
        Self {
            major: version.major,
            minor: version.minor,
            band: (version.patch / 100) * 100,
        }
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn band(&self) -> u64 {
        self.band
    }
}

impl fmt::Display for FeatureBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.band)
    }
}

impl FromStr for FeatureBand {
    type Err = anyhow::Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut segments = input.split('.');
        let mut next_segment = |label: &str| -> anyhow::Result<u64> {
            let raw = segments
                .next()
                .ok_or_else(|| anyhow!("feature band '{input}' is missing its {label} segment"))?;
            raw.parse::<u64>()
                .map_err(|_| anyhow!("feature band '{input}' has a non-numeric {label} segment"))
        };

        let major = next_segment("major")?;
        let minor = next_segment("minor")?;
        let band = next_segment("band")?;
        if segments.next().is_some() {
            return Err(anyhow!(
                "feature band '{input}' has trailing segments; expected major.minor.band"
            ));
        }

        Ok(Self { major, minor, band })
    }
}

impl Serialize for FeatureBand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for FeatureBand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
