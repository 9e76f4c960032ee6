//! The built-in relay fleet.
//!
//! Targets are plain descriptors (id, display label, tier); the probe URL is
//! derived from the settings' base URL at probe time. The registry is an
//! explicit owned list handed to the orchestrator, never a process-wide
//! singleton.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Service tier a relay belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Always-on production relays.
    Core,
    /// Regional expansion relays.
    Extended,
    /// Pre-release relays, no availability guarantees.
    Preview,
}

impl Tier {
    /// Returns the display label for this tier.
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Core => "core",
            Tier::Extended => "extended",
            Tier::Preview => "preview",
        }
    }
}

/// One relay endpoint under test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    /// Stable identifier, also the path segment in the probe URL.
    pub id: String,
    /// Human-readable label shown in the table.
    pub label: String,
    pub tier: Tier,
}

impl Target {
    pub fn new(id: &str, label: &str, tier: Tier) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            tier,
        }
    }
}

/// The full relay fleet, in display order.
pub fn builtin() -> Vec<Target> {
    vec![
        Target::new("use1", "US East (N. Virginia)", Tier::Core),
        Target::new("usw2", "US West (Oregon)", Tier::Core),
        Target::new("euw1", "EU West (Ireland)", Tier::Core),
        Target::new("euc1", "EU Central (Frankfurt)", Tier::Extended),
        Target::new("apne1", "Asia Pacific (Tokyo)", Tier::Extended),
        Target::new("apse2", "Asia Pacific (Sydney)", Tier::Extended),
        Target::new("sae1", "South America (Sao Paulo)", Tier::Preview),
        Target::new("afs1", "Africa (Cape Town)", Tier::Preview),
    ]
}

/// Keep only targets matching any of the given tiers.
///
/// An empty tier list means no filtering (the whole fleet).
pub fn filter_by_tiers(targets: Vec<Target>, tiers: &[Tier]) -> Vec<Target> {
    if tiers.is_empty() {
        return targets;
    }
    targets.into_iter().filter(|t| tiers.contains(&t.tier)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_ids_are_unique() {
        let targets = builtin();
        let mut ids: Vec<&str> = targets.iter().map(|t| t.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), targets.len());
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let all = builtin();
        let count = all.len();
        assert_eq!(filter_by_tiers(all, &[]).len(), count);
    }

    #[test]
    fn filter_selects_matching_tiers_only() {
        let core = filter_by_tiers(builtin(), &[Tier::Core]);
        assert!(!core.is_empty());
        assert!(core.iter().all(|t| t.tier == Tier::Core));
    }

    #[test]
    fn filter_accepts_multiple_tiers() {
        let subset = filter_by_tiers(builtin(), &[Tier::Core, Tier::Preview]);
        assert!(subset.iter().all(|t| t.tier != Tier::Extended));
        assert!(subset.iter().any(|t| t.tier == Tier::Preview));
    }

    #[test]
    fn filter_preserves_registry_order() {
        let subset = filter_by_tiers(builtin(), &[Tier::Extended]);
        let ids: Vec<&str> = subset.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["euc1", "apne1", "apse2"]);
    }
}
