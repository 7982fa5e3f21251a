//env
pub const RPC_URL_NOT_SET: &str = "RPC_URL not set!";
pub const MULTICALL_ADDRESS_INVALID: &str = "MULTICALL_ADDRESS is not a valid address!";
pub const BIND_ADDR_INVALID: &str = "GATEKEEPER_BIND_ADDR is not a valid socket address!";

//rpc
pub const MULTICALL_FAILED: &str = "Multicall aggregate failed";
pub const CHAIN_ID_FETCH_FAILED: &str = "Failed to fetch chain id from provider";
pub const RPC_PROVIDER_INIT_FAILED: &str = "Failed to build RPC provider";

//gate
pub const NO_WALLET_ADDRESS: &str = "No wallet address provided";
