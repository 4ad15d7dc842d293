//! Capability filter: drops team libraries that cannot serve a request.

use tccl_core::types::{CapabilityDimension, CapabilityRequest};
use tracing::{info, warn};

use crate::registry::TeamLibRegistry;

/// Outcome of one filtering pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterReport {
    /// Team libraries still registered.
    pub kept: usize,
    /// Disqualified team libraries with the first dimension they failed, in
    /// discovery order.
    pub disqualified: Vec<(String, CapabilityDimension)>,
}

/// Removes every team library that fails any requested dimension.
///
/// Disqualified team libraries are finalized and unloaded. Survivors keep
/// discovery order. An empty result is not an error here.
pub fn apply(request: &CapabilityRequest, registry: &mut TeamLibRegistry) -> FilterReport {
    let mut disqualified = Vec::new();

    let removed = registry.compact(|team_lib| match request.first_unmet(team_lib.capabilities()) {
        None => true,
        Some(dimension) => {
            info!(
                team_lib = %team_lib.name(),
                capability = %dimension,
                "Disqualifying team library"
            );
            disqualified.push((team_lib.name().to_string(), dimension));
            false
        }
    });

    for team_lib in removed {
        team_lib.unload();
    }

    if registry.is_empty() && !disqualified.is_empty() {
        warn!(
            disqualified = disqualified.len(),
            "Capability request disqualified every team library"
        );
    }

    FilterReport {
        kept: registry.len(),
        disqualified,
    }
}
