//! Capability dimensions, supported masks, and capability requests.
//!
//! A team library advertises one bitmask per [`CapabilityDimension`]. A
//! caller narrows the set of usable team libraries with a
//! [`CapabilityRequest`]: every dimension the request sets must overlap
//! with the library's mask for that dimension.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Presence bits of the C `field_mask`, one per dimension.
pub mod field {
    /// The request constrains reproducibility.
    pub const REPRODUCIBLE: u64 = 1 << 0;
    /// The request constrains the thread mode.
    pub const THREAD_MODE: u64 = 1 << 1;
    /// The request constrains the team usage pattern.
    pub const TEAM_USAGE: u64 = 1 << 2;
    /// The request constrains collective type coverage.
    pub const COLL_TYPES: u64 = 1 << 3;
}

/// Reproducibility bits.
pub mod reproducibility {
    /// Results are bitwise reproducible across runs.
    pub const REPRODUCIBLE: u64 = 1 << 0;
    /// Results may differ between runs.
    pub const NON_REPRODUCIBLE: u64 = 1 << 1;
}

/// Thread mode bits.
pub mod thread_mode {
    /// Only one thread drives the library.
    pub const SINGLE: u64 = 1 << 0;
    /// Multiple threads may drive the library concurrently.
    pub const MULTIPLE: u64 = 1 << 1;
}

/// Team usage pattern bits.
pub mod team_usage {
    /// Software-implemented collectives.
    pub const SW_COLLECTIVES: u64 = 1 << 0;
    /// Hardware-offloaded collectives.
    pub const HW_COLLECTIVES: u64 = 1 << 1;
    /// Point-to-point based collectives.
    pub const P2P: u64 = 1 << 2;
    /// Mixed hardware and software collectives.
    pub const HYBRID: u64 = 1 << 3;
}

/// Collective type bits.
pub mod coll_types {
    pub const BARRIER: u64 = 1 << 0;
    pub const BCAST: u64 = 1 << 1;
    pub const ALLREDUCE: u64 = 1 << 2;
    pub const REDUCE: u64 = 1 << 3;
    pub const ALLTOALL: u64 = 1 << 4;
    pub const ALLGATHER: u64 = 1 << 5;
    pub const GATHER: u64 = 1 << 6;
    pub const SCATTER: u64 = 1 << 7;
}

/// One independently negotiable trait of a team library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityDimension {
    /// Whether results are reproducible.
    Reproducibility,
    /// Supported threading model.
    ThreadMode,
    /// Supported team usage pattern.
    TeamUsage,
    /// Covered collective operations.
    CollTypes,
}

impl CapabilityDimension {
    /// Every dimension, in evaluation order.
    pub const ALL: [Self; 4] = [
        Self::Reproducibility,
        Self::ThreadMode,
        Self::TeamUsage,
        Self::CollTypes,
    ];

    /// The presence bit of this dimension in a C `field_mask`.
    pub fn field_flag(self) -> u64 {
        match self {
            Self::Reproducibility => field::REPRODUCIBLE,
            Self::ThreadMode => field::THREAD_MODE,
            Self::TeamUsage => field::TEAM_USAGE,
            Self::CollTypes => field::COLL_TYPES,
        }
    }

    /// Upper-case name used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reproducibility => "REPRODUCIBLE",
            Self::ThreadMode => "THREAD_MODE",
            Self::TeamUsage => "TEAM_USAGE",
            Self::CollTypes => "COLL_TYPES",
        }
    }
}

impl fmt::Display for CapabilityDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Masks a team library supports, one per dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilitySet {
    /// Reproducibility mask.
    pub reproducible: u64,
    /// Thread mode mask.
    pub thread_mode: u64,
    /// Team usage mask.
    pub team_usage: u64,
    /// Collective types mask.
    pub coll_types: u64,
}

impl CapabilitySet {
    /// Returns the mask for `dimension`.
    pub fn mask(&self, dimension: CapabilityDimension) -> u64 {
        match dimension {
            CapabilityDimension::Reproducibility => self.reproducible,
            CapabilityDimension::ThreadMode => self.thread_mode,
            CapabilityDimension::TeamUsage => self.team_usage,
            CapabilityDimension::CollTypes => self.coll_types,
        }
    }

    fn mask_mut(&mut self, dimension: CapabilityDimension) -> &mut u64 {
        match dimension {
            CapabilityDimension::Reproducibility => &mut self.reproducible,
            CapabilityDimension::ThreadMode => &mut self.thread_mode,
            CapabilityDimension::TeamUsage => &mut self.team_usage,
            CapabilityDimension::CollTypes => &mut self.coll_types,
        }
    }

    /// Returns a copy with `dimension` set to `mask`.
    pub fn with(mut self, dimension: CapabilityDimension, mask: u64) -> Self {
        *self.mask_mut(dimension) = mask;
        self
    }
}

/// Capabilities a caller requires from a team library.
///
/// `None` means the dimension is unconstrained. `Some(mask)` requires a
/// nonzero intersection between `mask` and the library's mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityRequest {
    /// Requested reproducibility bits.
    pub reproducible: Option<u64>,
    /// Requested thread mode bits.
    pub thread_mode: Option<u64>,
    /// Requested team usage bits.
    pub team_usage: Option<u64>,
    /// Requested collective type bits.
    pub coll_types: Option<u64>,
}

impl CapabilityRequest {
    /// A request that constrains nothing.
    pub fn any() -> Self {
        Self::default()
    }

    /// Builds a request from the C encoding: a presence `field_mask` plus
    /// one value per dimension.
    pub fn from_field_mask(field_mask: u64, values: CapabilitySet) -> Self {
        CapabilityDimension::ALL
            .into_iter()
            .filter(|dim| field_mask & dim.field_flag() != 0)
            .fold(Self::any(), |req, dim| req.with(dim, values.mask(dim)))
    }

    /// Returns a copy that requires `mask` on `dimension`.
    pub fn with(mut self, dimension: CapabilityDimension, mask: u64) -> Self {
        *self.slot_mut(dimension) = Some(mask);
        self
    }

    /// The requested mask for `dimension`, if the dimension is constrained.
    pub fn requested(&self, dimension: CapabilityDimension) -> Option<u64> {
        match dimension {
            CapabilityDimension::Reproducibility => self.reproducible,
            CapabilityDimension::ThreadMode => self.thread_mode,
            CapabilityDimension::TeamUsage => self.team_usage,
            CapabilityDimension::CollTypes => self.coll_types,
        }
    }

    fn slot_mut(&mut self, dimension: CapabilityDimension) -> &mut Option<u64> {
        match dimension {
            CapabilityDimension::Reproducibility => &mut self.reproducible,
            CapabilityDimension::ThreadMode => &mut self.thread_mode,
            CapabilityDimension::TeamUsage => &mut self.team_usage,
            CapabilityDimension::CollTypes => &mut self.coll_types,
        }
    }

    /// The C presence mask for this request.
    pub fn field_mask(&self) -> u64 {
        CapabilityDimension::ALL
            .into_iter()
            .filter(|dim| self.requested(*dim).is_some())
            .fold(0, |mask, dim| mask | dim.field_flag())
    }

    /// Whether any dimension is constrained.
    pub fn is_constrained(&self) -> bool {
        self.field_mask() != 0
    }

    /// The first constrained dimension that `supported` does not overlap.
    ///
    /// Evaluation stops at the first failing dimension.
    pub fn first_unmet(&self, supported: &CapabilitySet) -> Option<CapabilityDimension> {
        CapabilityDimension::ALL.into_iter().find(|dim| {
            self.requested(*dim)
                .is_some_and(|requested| requested & supported.mask(*dim) == 0)
        })
    }

    /// Whether every constrained dimension overlaps `supported`.
    pub fn is_satisfied_by(&self, supported: &CapabilitySet) -> bool {
        self.first_unmet(supported).is_none()
    }
}
