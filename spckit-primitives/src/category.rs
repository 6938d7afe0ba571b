//! Hardware categories used to key selections and drive the guided build.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// One stage of the guided build, in the fixed order parts are chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildCategory {
    /// Processor.
    Cpu,
    /// Motherboard.
    Mainboard,
    /// Memory modules.
    Ram,
    /// Graphics card.
    Gpu,
    /// Storage.
    Ssd,
    /// Power supply.
    Power,
    /// Chassis.
    Case,
}

impl BuildCategory {
    /// Every category in guided-build order.
    pub const ALL: [Self; 7] = [
        Self::Cpu,
        Self::Mainboard,
        Self::Ram,
        Self::Gpu,
        Self::Ssd,
        Self::Power,
        Self::Case,
    ];

    /// Label shown to users and sent to the model.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            Self::Mainboard => "메인보드",
            Self::Ram => "RAM",
            Self::Gpu => "GPU",
            Self::Ssd => "SSD",
            Self::Power => "파워",
            Self::Case => "케이스",
        }
    }

    /// Lowercase labels the model is known to use for this category.
    const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Cpu => &["cpu", "processor", "프로세서", "씨피유"],
            Self::Mainboard => &["메인보드", "mainboard", "motherboard", "mobo", "보드"],
            Self::Ram => &["ram", "memory", "메모리", "램"],
            Self::Gpu => &["gpu", "graphics card", "vga", "그래픽카드", "그래픽 카드", "글카"],
            Self::Ssd => &["ssd", "storage", "nvme", "저장장치", "저장 장치"],
            Self::Power => &["파워", "power", "psu", "power supply", "파워서플라이"],
            Self::Case => &["케이스", "case", "chassis"],
        }
    }

    /// Resolves a free-form label case-insensitively.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let needle = label.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|category| category.aliases().contains(&needle.as_str()))
    }

    /// Zero-based position in the guided-build order.
    #[must_use]
    pub fn position(self) -> usize {
        Self::ALL
            .iter()
            .position(|candidate| *candidate == self)
            .unwrap_or_default()
    }

    /// Returns the category that follows in guided-build order.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.position() + 1).copied()
    }
}

impl fmt::Display for BuildCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BuildCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::UnknownCategory {
            label: s.to_owned(),
        })
    }
}

/// Slot a selected component occupies; at most one component per key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryKey {
    /// Label resolved to the fixed vocabulary.
    Known(BuildCategory),
    /// Label outside the vocabulary, normalized to trimmed lowercase.
    Other(String),
}

impl CategoryKey {
    /// Builds the key for a free-form category label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        BuildCategory::parse(label)
            .map_or_else(|| Self::Other(label.trim().to_lowercase()), Self::Known)
    }

    /// Returns the resolved category when the label was recognised.
    #[must_use]
    pub const fn category(&self) -> Option<BuildCategory> {
        match self {
            Self::Known(category) => Some(*category),
            Self::Other(_) => None,
        }
    }
}

impl From<BuildCategory> for CategoryKey {
    fn from(value: BuildCategory) -> Self {
        Self::Known(value)
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(category) => fmt::Display::fmt(category, f),
            Self::Other(label) => f.write_str(label),
        }
    }
}
