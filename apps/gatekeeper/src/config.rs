use alloy::primitives::{Address, U256, address};
use anyhow::{Context, Result};
use std::{env, net::SocketAddr, str::FromStr, time::Duration};
use tracing::{info, warn};

/// Multicall3 is deployed at the same address on every chain we care about.
pub const DEFAULT_MULTICALL_ADDRESS: Address = address!("0xcA11bde05977b3631167028862bE2a173976CA11");
pub const DEFAULT_CHAIN_ID: u64 = 8453;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(1);
pub const DEFAULT_RATE_LIMIT_MAX_REQUESTS: usize = 10;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Deployments leave these in `.env` files to mean "not deployed yet".
const PLACEHOLDER_ADDRESSES: [Address; 2] = [
    Address::ZERO,
    address!("0x0000000000000000000000000000000000000001"),
];

pub fn is_placeholder(address: &Address) -> bool {
    PLACEHOLDER_ADDRESSES.contains(address)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenContracts {
    pub proof_of_curiosity: Option<Address>,
    pub system_token: Option<Address>,
    pub self_token: Option<Address>,
    pub market_admin: Option<Address>,
    pub hats: Option<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HatIds {
    pub executive_pod: Option<U256>,
    pub dev_pod: Option<U256>,
    pub market_management: Option<U256>,
    pub event_management: Option<U256>,
    pub bounty: Option<U256>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcLimits {
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub rate_limit_window: Duration,
    pub rate_limit_max_requests: usize,
}

impl Default for RpcLimits {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            rate_limit_window: DEFAULT_RATE_LIMIT_WINDOW,
            rate_limit_max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub multicall: Address,
    pub contracts: TokenContracts,
    pub hat_ids: HatIds,
    pub cache_ttl: Duration,
    pub rpc: RpcLimits,
    pub bind_addr: SocketAddr,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            chain_id: DEFAULT_CHAIN_ID,
            multicall: DEFAULT_MULTICALL_ADDRESS,
            contracts: TokenContracts::default(),
            hat_ids: HatIds::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
            rpc: RpcLimits::default(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

impl GateConfig {
    /// Loads configuration from the process environment. Only `RPC_URL` is
    /// mandatory; token contracts and Hat ids that are missing degrade to
    /// "entitlement absent" at fetch time.
    pub fn from_env() -> Result<Self> {
        let rpc_url = env::var("RPC_URL").context(utils::errors::RPC_URL_NOT_SET)?;

        let multicall = match env::var("MULTICALL_ADDRESS") {
            Ok(raw) => Address::from_str(raw.trim()).context(utils::errors::MULTICALL_ADDRESS_INVALID)?,
            Err(_) => DEFAULT_MULTICALL_ADDRESS,
        };

        let bind_addr = env::var("GATEKEEPER_BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context(utils::errors::BIND_ADDR_INVALID)?;

        let mut config = Self {
            rpc_url,
            multicall,
            bind_addr,
            contracts: TokenContracts {
                proof_of_curiosity: contract_from_env("PROOF_OF_CURIOSITY"),
                system_token: contract_from_env("SYSTEM_TOKEN"),
                self_token: contract_from_env("SELF_TOKEN"),
                market_admin: contract_from_env("MARKET_ADMIN"),
                hats: contract_from_env("HATS_CONTRACT"),
            },
            hat_ids: HatIds {
                executive_pod: hat_id_from_env("EXECUTIVE_POD_HAT_ID"),
                dev_pod: hat_id_from_env("DEV_POD_HAT_ID"),
                market_management: hat_id_from_env("MARKET_MANAGEMENT_HAT_ID"),
                event_management: hat_id_from_env("EVENT_MANAGEMENT_HAT_ID"),
                bounty: hat_id_from_env("BOUNTY_HAT_ID"),
            },
            ..Default::default()
        };

        apply_env_overrides(&mut config);

        info!(
            chain_id = config.chain_id,
            multicall = %config.multicall,
            hats_configured = config.contracts.hats.is_some(),
            cache_ttl_secs = config.cache_ttl.as_secs(),
            max_attempts = config.rpc.max_attempts,
            "Gatekeeper config loaded"
        );

        Ok(config)
    }
}

/// Reads a contract address, treating unset, unparsable and placeholder
/// values alike as "not configured".
fn contract_from_env(var: &str) -> Option<Address> {
    let raw = env::var(var).ok()?;
    match parse_contract(&raw) {
        Some(address) => Some(address),
        None => {
            warn!(var = var, value = %raw, "Contract address is a placeholder or invalid, treating as unset");
            None
        }
    }
}

pub fn parse_contract(raw: &str) -> Option<Address> {
    Address::from_str(raw.trim())
        .ok()
        .filter(|address| !is_placeholder(address))
}

fn hat_id_from_env(var: &str) -> Option<U256> {
    let raw = env::var(var).ok()?;
    match parse_hat_id(&raw) {
        Some(id) => Some(id),
        None => {
            warn!(var = var, value = %raw, "Hat id is empty or invalid, treating as unset");
            None
        }
    }
}

/// Hat ids are uint256 values, usually written as 0x-prefixed hex.
pub fn parse_hat_id(raw: &str) -> Option<U256> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    U256::from_str(trimmed).ok()
}

fn apply_env_overrides(config: &mut GateConfig) {
    if let Some(chain_id) = parse_override::<u64>("CHAIN_ID") {
        config.chain_id = chain_id;
    }
    if let Some(secs) = parse_override::<u64>("CACHE_TTL_SECS") {
        config.cache_ttl = Duration::from_secs(secs);
    }
    if let Some(attempts) = parse_override::<u32>("RPC_MAX_ATTEMPTS") {
        if attempts == 0 {
            warn!("RPC_MAX_ATTEMPTS must be at least 1, keeping default");
        } else {
            config.rpc.max_attempts = attempts;
        }
    }
    if let Some(ms) = parse_override::<u64>("RPC_RETRY_DELAY_MS") {
        config.rpc.retry_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = parse_override::<u64>("RPC_RATE_LIMIT_WINDOW_MS") {
        config.rpc.rate_limit_window = Duration::from_millis(ms);
    }
    if let Some(max) = parse_override::<usize>("RPC_RATE_LIMIT_MAX_REQUESTS") {
        if max == 0 {
            warn!("RPC_RATE_LIMIT_MAX_REQUESTS must be at least 1, keeping default");
        } else {
            config.rpc.rate_limit_max_requests = max;
        }
    }
}

fn parse_override<T>(var: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = env::var(var).ok()?;
    match value.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(error = %err, var = var, value = %value, "Failed to parse override, using default");
            None
        }
    }
}
