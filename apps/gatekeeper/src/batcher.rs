use crate::{
    config::GateConfig,
    rpc::{ContractCall, IERC20, IERC721, IHats},
};
use alloy::{
    primitives::{Address, U256},
    sol_types::SolCall,
};
use std::fmt;
use tracing::warn;

/// A single fact about a wallet that some part of the app gates on.
///
/// Variant order is the order calls are registered in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entitlement {
    ProofOfCuriosity,
    SystemBalance,
    SelfBalance,
    MarketAdmin,
    ExecutivePod,
    DevPod,
    MarketManagement,
    EventManagement,
    BountyHat,
}

impl Entitlement {
    pub const ALL: [Entitlement; 9] = [
        Entitlement::ProofOfCuriosity,
        Entitlement::SystemBalance,
        Entitlement::SelfBalance,
        Entitlement::MarketAdmin,
        Entitlement::ExecutivePod,
        Entitlement::DevPod,
        Entitlement::MarketManagement,
        Entitlement::EventManagement,
        Entitlement::BountyHat,
    ];

    pub fn kind(&self) -> CallKind {
        match self {
            Entitlement::ProofOfCuriosity => CallKind::Erc721Presence,
            Entitlement::SystemBalance | Entitlement::SelfBalance => CallKind::Erc20Balance,
            Entitlement::MarketAdmin => CallKind::Erc20Presence,
            Entitlement::ExecutivePod
            | Entitlement::DevPod
            | Entitlement::MarketManagement
            | Entitlement::EventManagement
            | Entitlement::BountyHat => CallKind::HatWearer,
        }
    }

    fn hat_id(&self, config: &GateConfig) -> Option<U256> {
        let ids = &config.hat_ids;
        match self {
            Entitlement::ExecutivePod => ids.executive_pod,
            Entitlement::DevPod => ids.dev_pod,
            Entitlement::MarketManagement => ids.market_management,
            Entitlement::EventManagement => ids.event_management,
            Entitlement::BountyHat => ids.bounty,
            _ => None,
        }
    }

    fn token_contract(&self, config: &GateConfig) -> Option<Address> {
        let contracts = &config.contracts;
        match self {
            Entitlement::ProofOfCuriosity => contracts.proof_of_curiosity,
            Entitlement::SystemBalance => contracts.system_token,
            Entitlement::SelfBalance => contracts.self_token,
            Entitlement::MarketAdmin => contracts.market_admin,
            _ => contracts.hats,
        }
    }
}

impl fmt::Display for Entitlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entitlement::ProofOfCuriosity => "Proof of Curiosity",
            Entitlement::SystemBalance => "System Token",
            Entitlement::SelfBalance => "Self Token",
            Entitlement::MarketAdmin => "Market Admin",
            Entitlement::ExecutivePod => "Executive Pod",
            Entitlement::DevPod => "Dev Pod",
            Entitlement::MarketManagement => "Market Management",
            Entitlement::EventManagement => "Event Management",
            Entitlement::BountyHat => "Bounty Hat",
        };
        f.write_str(name)
    }
}

/// How a call is encoded and how its return slot is read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// ERC-721 `balanceOf(owner) > 0`.
    Erc721Presence,
    /// ERC-20 `balanceOf(account) > 0`.
    Erc20Presence,
    /// ERC-20 `balanceOf(account)` as an 18-decimal amount.
    Erc20Balance,
    /// Hats `isWearerOfHat(user, hatId)`.
    HatWearer,
}

/// Calls for one wallet, each tagged with the entitlement it answers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallBatch {
    entries: Vec<(Entitlement, ContractCall)>,
}

impl CallBatch {
    pub fn push(&mut self, entitlement: Entitlement, call: ContractCall) {
        self.entries.push((entitlement, call));
    }

    pub fn entries(&self) -> &[(Entitlement, ContractCall)] {
        &self.entries
    }

    pub fn calls(&self) -> Vec<ContractCall> {
        self.entries.iter().map(|(_, call)| call.clone()).collect()
    }

    pub fn contains(&self, entitlement: Entitlement) -> bool {
        self.entries.iter().any(|(tag, _)| *tag == entitlement)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds every call needed to evaluate the configured entitlements for
/// `wallet`. Entitlements whose contract or Hat id is not configured are left
/// out of the batch and therefore decode as absent.
pub fn build_batch(config: &GateConfig, wallet: Address) -> CallBatch {
    let mut batch = CallBatch::default();

    for entitlement in Entitlement::ALL {
        let Some(target) = entitlement.token_contract(config) else {
            warn!(entitlement = %entitlement, "Contract not configured, entitlement defaults to absent");
            continue;
        };

        let call_data = match entitlement.kind() {
            CallKind::Erc721Presence => IERC721::balanceOfCall { owner: wallet }.abi_encode(),
            CallKind::Erc20Presence | CallKind::Erc20Balance => {
                IERC20::balanceOfCall { account: wallet }.abi_encode()
            }
            CallKind::HatWearer => {
                let Some(hat_id) = entitlement.hat_id(config) else {
                    warn!(entitlement = %entitlement, "Hat id not configured, entitlement defaults to absent");
                    continue;
                };
                IHats::isWearerOfHatCall {
                    _user: wallet,
                    _hatId: hat_id,
                }
                .abi_encode()
            }
        };

        batch.push(
            entitlement,
            ContractCall {
                target,
                call_data: call_data.into(),
            },
        );
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HatIds, TokenContracts};
    use alloy::primitives::address;

    const WALLET: Address = address!("0xabcdefabcdefabcdefabcdefabcdefabcdefabcd");
    const POC: Address = address!("0x756d2ad6642c2ed43fd87af70d83f277ec0a669f");
    const SYSTEM: Address = address!("0x1000000000000000000000000000000000000001");
    const SELF_TOKEN: Address = address!("0x1000000000000000000000000000000000000002");
    const HATS: Address = address!("0x3bc1a0ad72417f2d411118085256fc53cbddd137");

    fn full_config() -> GateConfig {
        GateConfig {
            contracts: TokenContracts {
                proof_of_curiosity: Some(POC),
                system_token: Some(SYSTEM),
                self_token: Some(SELF_TOKEN),
                market_admin: None,
                hats: Some(HATS),
            },
            hat_ids: HatIds {
                executive_pod: Some(U256::from(1)),
                dev_pod: Some(U256::from(2)),
                market_management: Some(U256::from(3)),
                event_management: Some(U256::from(4)),
                bounty: Some(U256::from(5)),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_batch_follows_registration_order() {
        let batch = build_batch(&full_config(), WALLET);
        let tags: Vec<_> = batch.entries().iter().map(|(tag, _)| *tag).collect();
        assert_eq!(
            tags,
            vec![
                Entitlement::ProofOfCuriosity,
                Entitlement::SystemBalance,
                Entitlement::SelfBalance,
                Entitlement::ExecutivePod,
                Entitlement::DevPod,
                Entitlement::MarketManagement,
                Entitlement::EventManagement,
                Entitlement::BountyHat,
            ]
        );
    }

    #[test]
    fn test_batch_targets_and_encoding() {
        let batch = build_batch(&full_config(), WALLET);
        let (_, poc_call) = &batch.entries()[0];
        assert_eq!(poc_call.target, POC);
        assert_eq!(
            poc_call.call_data.as_ref(),
            IERC721::balanceOfCall { owner: WALLET }.abi_encode().as_slice()
        );

        let (tag, exec_call) = &batch.entries()[3];
        assert_eq!(*tag, Entitlement::ExecutivePod);
        assert_eq!(exec_call.target, HATS);
        let decoded = IHats::isWearerOfHatCall::abi_decode(&exec_call.call_data).unwrap();
        assert_eq!(decoded._user, WALLET);
        assert_eq!(decoded._hatId, U256::from(1));
    }

    #[test]
    fn test_unset_hat_id_is_skipped() {
        let mut config = full_config();
        config.hat_ids.dev_pod = None;
        let batch = build_batch(&config, WALLET);
        assert!(!batch.contains(Entitlement::DevPod));
        assert!(batch.contains(Entitlement::ExecutivePod));
        assert_eq!(batch.len(), 7);
    }

    #[test]
    fn test_missing_hats_contract_skips_all_roles() {
        let mut config = full_config();
        config.contracts.hats = None;
        let batch = build_batch(&config, WALLET);
        assert_eq!(batch.len(), 3);
        assert!(batch.entries().iter().all(|(tag, _)| tag.kind() != CallKind::HatWearer));
    }

    #[test]
    fn test_empty_config_builds_empty_batch() {
        let batch = build_batch(&GateConfig::default(), WALLET);
        assert!(batch.is_empty());
        assert!(batch.calls().is_empty());
    }
}
