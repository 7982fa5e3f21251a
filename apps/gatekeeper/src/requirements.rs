use crate::{
    batcher::Entitlement,
    config::{GateConfig, parse_hat_id},
    snapshot::EntitlementSnapshot,
};
use alloy::primitives::Address;
use std::str::FromStr;
use tracing::debug;

/// A gate attached to a chat group, forum category or product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenRequirement {
    Holds(Entitlement),
    /// Unrecognised requirement; never satisfied.
    Unknown(String),
}

impl TokenRequirement {
    /// Resolves a stored requirement string. Accepts the short tags the app
    /// writes (`exec`, `dev`, `bounty`, ...) as well as raw contract addresses
    /// and Hat ids from the deployment config. Empty means "no requirement".
    pub fn parse(raw: &str, config: &GateConfig) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        if let Some(entitlement) = from_alias(&normalized) {
            return Some(Self::Holds(entitlement));
        }

        // Address-shaped strings only ever name a contract, never a Hat id.
        if let Some(address) = normalized.strip_prefix("0x").and_then(|hex| Address::from_str(hex).ok()) {
            return Some(match from_contract(address, config) {
                Some(entitlement) => Self::Holds(entitlement),
                None => {
                    debug!(requirement = %normalized, "Requirement names an unconfigured contract");
                    Self::Unknown(normalized)
                }
            });
        }

        if let Some(entitlement) = from_hat_id(&normalized, config) {
            return Some(Self::Holds(entitlement));
        }

        debug!(requirement = %normalized, "Unrecognised token requirement");
        Some(Self::Unknown(normalized))
    }

    pub fn is_satisfied_by(&self, snapshot: &EntitlementSnapshot) -> bool {
        match self {
            Self::Holds(entitlement) => holds(snapshot, *entitlement),
            Self::Unknown(_) => false,
        }
    }
}

pub fn holds(snapshot: &EntitlementSnapshot, entitlement: Entitlement) -> bool {
    match entitlement {
        Entitlement::ProofOfCuriosity => snapshot.has_proof_of_curiosity,
        Entitlement::SystemBalance => snapshot.holds_system_tokens(),
        Entitlement::SelfBalance => snapshot.holds_self_tokens(),
        Entitlement::MarketAdmin => snapshot.has_market_admin,
        Entitlement::ExecutivePod => snapshot.has_executive_pod,
        Entitlement::DevPod => snapshot.has_dev_pod,
        Entitlement::MarketManagement => snapshot.has_market_management,
        Entitlement::EventManagement => snapshot.has_event_management,
        Entitlement::BountyHat => snapshot.has_bounty_hat,
    }
}

/// Whether a wallet with `snapshot` may see an item gated by `raw`.
pub fn has_access(raw: Option<&str>, config: &GateConfig, snapshot: &EntitlementSnapshot) -> bool {
    match raw.and_then(|raw| TokenRequirement::parse(raw, config)) {
        None => true,
        Some(requirement) => requirement.is_satisfied_by(snapshot),
    }
}

/// Keeps the items whose requirement the wallet meets, in their original order.
pub fn filter_accessible<T, F>(
    items: Vec<T>,
    requirement_of: F,
    config: &GateConfig,
    snapshot: &EntitlementSnapshot,
) -> Vec<T>
where
    F: Fn(&T) -> Option<&str>,
{
    items
        .into_iter()
        .filter(|item| has_access(requirement_of(item), config, snapshot))
        .collect()
}

fn from_alias(tag: &str) -> Option<Entitlement> {
    let entitlement = match tag {
        "exec" | "executive_pod" => Entitlement::ExecutivePod,
        "dev" | "dev_pod" => Entitlement::DevPod,
        "bounty" | "bounty_hat" => Entitlement::BountyHat,
        "curiosity" | "poc" | "proof_of_curiosity" => Entitlement::ProofOfCuriosity,
        "market_admin" | "market" => Entitlement::MarketAdmin,
        "market_management" => Entitlement::MarketManagement,
        "event_management" => Entitlement::EventManagement,
        "system" => Entitlement::SystemBalance,
        "self" => Entitlement::SelfBalance,
        _ => return None,
    };
    Some(entitlement)
}

fn from_contract(address: Address, config: &GateConfig) -> Option<Entitlement> {
    let contracts = &config.contracts;
    [
        (contracts.proof_of_curiosity, Entitlement::ProofOfCuriosity),
        (contracts.system_token, Entitlement::SystemBalance),
        (contracts.self_token, Entitlement::SelfBalance),
        (contracts.market_admin, Entitlement::MarketAdmin),
    ]
    .into_iter()
    .find(|(configured, _)| *configured == Some(address))
    .map(|(_, entitlement)| entitlement)
}

fn from_hat_id(raw: &str, config: &GateConfig) -> Option<Entitlement> {
    let id = parse_hat_id(raw)?;
    let ids = &config.hat_ids;
    [
        (ids.executive_pod, Entitlement::ExecutivePod),
        (ids.dev_pod, Entitlement::DevPod),
        (ids.market_management, Entitlement::MarketManagement),
        (ids.event_management, Entitlement::EventManagement),
        (ids.bounty, Entitlement::BountyHat),
    ]
    .into_iter()
    .find(|(configured, _)| *configured == Some(id))
    .map(|(_, entitlement)| entitlement)
}
