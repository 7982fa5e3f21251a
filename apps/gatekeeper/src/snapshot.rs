use crate::error::GateError;
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Parses a user-supplied wallet address. Accepts any hex casing; checksum
/// casing is not enforced because wallets and the database disagree on it.
pub fn parse_wallet_address(raw: &str) -> Result<Address, GateError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GateError::MissingAddress);
    }

    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| GateError::InvalidAddress(trimmed.to_string()))?;

    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(GateError::InvalidAddress(trimmed.to_string()));
    }

    Address::from_str(hex).map_err(|_| GateError::InvalidAddress(trimmed.to_string()))
}

/// Everything the app knows about a wallet's on-chain entitlements at one
/// point in time. The default value grants nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementSnapshot {
    pub has_proof_of_curiosity: bool,
    pub has_market_admin: bool,
    pub has_executive_pod: bool,
    pub has_dev_pod: bool,
    pub has_market_management: bool,
    pub has_event_management: bool,
    pub has_bounty_hat: bool,
    pub system_balance: String,
    pub self_balance: String,
}

impl Default for EntitlementSnapshot {
    fn default() -> Self {
        Self {
            has_proof_of_curiosity: false,
            has_market_admin: false,
            has_executive_pod: false,
            has_dev_pod: false,
            has_market_management: false,
            has_event_management: false,
            has_bounty_hat: false,
            system_balance: "0".to_string(),
            self_balance: "0".to_string(),
        }
    }
}

impl EntitlementSnapshot {
    pub fn holds_system_tokens(&self) -> bool {
        is_positive_amount(&self.system_balance)
    }

    /// Product creation in the marketplace requires the Market Management hat.
    pub fn can_manage_market(&self) -> bool {
        self.has_market_management
    }

    pub fn holds_self_tokens(&self) -> bool {
        is_positive_amount(&self.self_balance)
    }

    /// Tags of the roles and tokens this wallet holds, in a stable order.
    /// Used by proposal forms and notification fan-out to list eligibility.
    pub fn held_tokens(&self) -> Vec<&'static str> {
        let mut tokens = Vec::new();
        if self.has_proof_of_curiosity {
            tokens.push("curiosity");
        }
        if self.has_executive_pod {
            tokens.push("exec");
        }
        if self.has_dev_pod {
            tokens.push("dev");
        }
        if self.has_market_admin {
            tokens.push("market_admin");
        }
        if self.has_market_management {
            tokens.push("market_management");
        }
        if self.has_event_management {
            tokens.push("event_management");
        }
        if self.has_bounty_hat {
            tokens.push("bounty");
        }
        if self.holds_system_tokens() {
            tokens.push("system");
        }
        if self.holds_self_tokens() {
            tokens.push("self");
        }
        tokens
    }
}

fn is_positive_amount(amount: &str) -> bool {
    amount.chars().any(|c| c.is_ascii_digit() && c != '0')
}
