//! Metric identifiers carried by scenario samples.

use serde::{Deserialize, Serialize};

/// A per-threshold measurement a scenario may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Wall-clock seconds for the scenario run.
    ExecutionTime,
    /// Free space divided by total allocated space, in [0, 1].
    FragmentationRatio,
    /// Size of the data segment in bytes.
    DataSegmentBytes,
    /// Free bytes left inside the data segment.
    FreeSpaceBytes,
}

impl Metric {
    pub const ALL: [Self; 4] = [
        Self::ExecutionTime,
        Self::FragmentationRatio,
        Self::DataSegmentBytes,
        Self::FreeSpaceBytes,
    ];

    /// Parse with loose casing; accepts `-` or `_` separators and a few short aliases.
    #[must_use]
    pub fn from_str_loose(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "execution_time" | "exec_time" | "time" => Some(Self::ExecutionTime),
            "fragmentation_ratio" | "fragmentation" | "frag" => Some(Self::FragmentationRatio),
            "data_segment_bytes" | "data_segment" => Some(Self::DataSegmentBytes),
            "free_space_bytes" | "free_space" => Some(Self::FreeSpaceBytes),
            _ => None,
        }
    }

    /// Stable name used in long-form rows and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExecutionTime => "execution_time",
            Self::FragmentationRatio => "fragmentation_ratio",
            Self::DataSegmentBytes => "data_segment_bytes",
            Self::FreeSpaceBytes => "free_space_bytes",
        }
    }

    /// Byte-count metrics are the only ones memory normalization accepts.
    #[must_use]
    pub const fn is_byte_count(self) -> bool {
        matches!(self, Self::DataSegmentBytes | Self::FreeSpaceBytes)
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
