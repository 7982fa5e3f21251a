#![allow(dead_code)]

use alloy::{
    primitives::{Address, Bytes, U256, address},
    sol_types::{SolCall, SolValue},
};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use gatekeeper::{
    config::{GateConfig, HatIds, RpcLimits, TokenContracts},
    rpc::{ContractCall, IHats, MulticallClient},
};
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

pub const WALLET: Address = address!("0x00000000000000000000000000000000000000aa");
pub const OTHER_WALLET: Address = address!("0x00000000000000000000000000000000000000bb");
pub const POC: Address = address!("0x756d2ad6642c2ed43fd87af70d83f277ec0a669f");
pub const SYSTEM_TOKEN: Address = address!("0x1000000000000000000000000000000000000001");
pub const SELF_TOKEN: Address = address!("0x1000000000000000000000000000000000000002");
pub const MARKET_ADMIN: Address = address!("0x1000000000000000000000000000000000000003");
pub const HATS: Address = address!("0x3bc1a0ad72417f2d411118085256fc53cbddd137");

pub const EXEC_HAT: u64 = 1;
pub const DEV_HAT: u64 = 2;
pub const MARKET_HAT: u64 = 3;
pub const EVENT_HAT: u64 = 4;
pub const BOUNTY_HAT: u64 = 5;

pub fn test_config() -> GateConfig {
    GateConfig {
        rpc_url: "http://localhost:8545".to_string(),
        contracts: TokenContracts {
            proof_of_curiosity: Some(POC),
            system_token: Some(SYSTEM_TOKEN),
            self_token: Some(SELF_TOKEN),
            market_admin: Some(MARKET_ADMIN),
            hats: Some(HATS),
        },
        hat_ids: HatIds {
            executive_pod: Some(U256::from(EXEC_HAT)),
            dev_pod: Some(U256::from(DEV_HAT)),
            market_management: Some(U256::from(MARKET_HAT)),
            event_management: Some(U256::from(EVENT_HAT)),
            bounty: Some(U256::from(BOUNTY_HAT)),
        },
        cache_ttl: Duration::from_secs(30),
        rpc: RpcLimits {
            max_attempts: 3,
            retry_delay: Duration::ZERO,
            rate_limit_window: Duration::from_secs(1),
            rate_limit_max_requests: 1_000,
        },
        ..Default::default()
    }
}

pub fn word(value: u64) -> Bytes {
    U256::from(value).abi_encode().into()
}

pub fn flag(value: bool) -> Bytes {
    value.abi_encode().into()
}

/// Chain state the mock answers from.
#[derive(Debug, Clone, Default)]
pub struct Holdings {
    pub poc: u64,
    pub system: U256,
    pub self_token: U256,
    pub market_admin: u64,
    pub hats: Vec<u64>,
}

impl Holdings {
    pub fn answer(&self, call: &ContractCall) -> Bytes {
        if call.target == HATS {
            let decoded = IHats::isWearerOfHatCall::abi_decode(&call.call_data).expect("hat call");
            let worn = self.hats.iter().any(|id| U256::from(*id) == decoded._hatId);
            return flag(worn);
        }
        match call.target {
            POC => word(self.poc),
            SYSTEM_TOKEN => self.system.abi_encode().into(),
            SELF_TOKEN => self.self_token.abi_encode().into(),
            MARKET_ADMIN => word(self.market_admin),
            other => panic!("unexpected call target {}", other),
        }
    }
}

type Responder = dyn Fn(&[ContractCall]) -> Result<Vec<Bytes>> + Send + Sync;

/// In-process multicall that counts round trips.
#[derive(Clone)]
pub struct MockMulticall {
    calls: Arc<AtomicUsize>,
    responder: Arc<Responder>,
}

impl MockMulticall {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&[ContractCall]) -> Result<Vec<Bytes>> + Send + Sync + 'static,
    {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            responder: Arc::new(responder),
        }
    }

    pub fn holding(holdings: Holdings) -> Self {
        Self::new(move |calls| Ok(calls.iter().map(|call| holdings.answer(call)).collect()))
    }

    pub fn failing() -> Self {
        Self::new(|_| Err(anyhow!("connection reset by peer")))
    }

    pub fn round_trips(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MulticallClient for MockMulticall {
    async fn aggregate(&self, calls: &[ContractCall]) -> Result<Vec<Bytes>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.responder)(calls)
    }
}
