use crate::{
    batcher::{CallBatch, CallKind, Entitlement},
    rpc::{IERC20, IERC721, IHats},
    snapshot::EntitlementSnapshot,
};
use alloy::{
    primitives::{Bytes, U256, utils::format_units},
    sol_types::SolCall,
};
use anyhow::{Context, Result};
use tracing::{error, warn};

pub const ERC20_DECIMALS: u8 = 18;

/// Decoded value of one return slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    Present(bool),
    Amount(String),
}

/// Turns the multicall's return data into a snapshot. Slots pair with batch
/// entries by position; each slot is decoded on its own and falls back to the
/// absent value if it cannot be read.
pub fn decode_snapshot(batch: &CallBatch, return_data: &[Bytes]) -> EntitlementSnapshot {
    let mut snapshot = EntitlementSnapshot::default();

    if return_data.len() != batch.len() {
        error!(
            expected = batch.len(),
            received = return_data.len(),
            "Return data does not line up with the call batch, denying all entitlements"
        );
        return snapshot;
    }

    for ((entitlement, _), data) in batch.entries().iter().zip(return_data) {
        match decode_slot(entitlement.kind(), data) {
            Ok(value) => apply(&mut snapshot, *entitlement, value),
            Err(e) => {
                warn!(
                    entitlement = %entitlement,
                    raw = %data,
                    error = %e,
                    "Failed to decode return data, entitlement defaults to absent"
                );
            }
        }
    }

    snapshot
}

pub fn decode_slot(kind: CallKind, data: &[u8]) -> Result<DecodedValue> {
    match kind {
        CallKind::Erc721Presence => {
            let balance = IERC721::balanceOfCall::abi_decode_returns(data)
                .context("Failed to decode ERC-721 balance")?;
            Ok(DecodedValue::Present(balance > U256::ZERO))
        }
        CallKind::Erc20Presence => {
            let balance = IERC20::balanceOfCall::abi_decode_returns(data)
                .context("Failed to decode ERC-20 balance")?;
            Ok(DecodedValue::Present(balance > U256::ZERO))
        }
        CallKind::Erc20Balance => {
            let balance = IERC20::balanceOfCall::abi_decode_returns(data)
                .context("Failed to decode ERC-20 balance")?;
            Ok(DecodedValue::Amount(format_token_amount(balance, ERC20_DECIMALS)?))
        }
        CallKind::HatWearer => {
            let wearer = IHats::isWearerOfHatCall::abi_decode_returns(data)
                .context("Failed to decode isWearerOfHat result")?;
            Ok(DecodedValue::Present(wearer))
        }
    }
}

fn apply(snapshot: &mut EntitlementSnapshot, entitlement: Entitlement, value: DecodedValue) {
    match (entitlement, value) {
        (Entitlement::SystemBalance, DecodedValue::Amount(amount)) => snapshot.system_balance = amount,
        (Entitlement::SelfBalance, DecodedValue::Amount(amount)) => snapshot.self_balance = amount,
        (Entitlement::ProofOfCuriosity, DecodedValue::Present(held)) => snapshot.has_proof_of_curiosity = held,
        (Entitlement::MarketAdmin, DecodedValue::Present(held)) => snapshot.has_market_admin = held,
        (Entitlement::ExecutivePod, DecodedValue::Present(held)) => snapshot.has_executive_pod = held,
        (Entitlement::DevPod, DecodedValue::Present(held)) => snapshot.has_dev_pod = held,
        (Entitlement::MarketManagement, DecodedValue::Present(held)) => snapshot.has_market_management = held,
        (Entitlement::EventManagement, DecodedValue::Present(held)) => snapshot.has_event_management = held,
        (Entitlement::BountyHat, DecodedValue::Present(held)) => snapshot.has_bounty_hat = held,
        (entitlement, value) => {
            warn!(entitlement = %entitlement, value = ?value, "Decoded value does not fit entitlement, ignoring");
        }
    }
}

/// Formats a raw token amount as a plain decimal string without trailing
/// zeros, e.g. `1500000000000000000` with 18 decimals is `"1.5"`.
pub fn format_token_amount(amount: U256, decimals: u8) -> Result<String> {
    let formatted = format_units(amount, decimals).context("Failed to format token amount")?;
    if !formatted.contains('.') {
        return Ok(formatted);
    }
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    Ok(trimmed.to_string())
}
