use alloy::{
    primitives::{Address, Bytes},
    providers::{DynProvider, Provider, ProviderBuilder},
    sol,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, instrument};

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IMulticall {
        struct Call {
            address target;
            bytes callData;
        }

        function aggregate(Call[] calldata calls) external view returns (uint256 blockNumber, bytes[] memory returnData);
    }

    #[allow(missing_docs)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
    }

    #[allow(missing_docs)]
    interface IERC721 {
        function balanceOf(address owner) external view returns (uint256);
    }

    #[allow(missing_docs)]
    interface IHats {
        function isWearerOfHat(address _user, uint256 _hatId) external view returns (bool isWearer);
    }
}

/// One read against one contract, already ABI-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub target: Address,
    pub call_data: Bytes,
}

/// Executes a batch of read calls in a single round trip and returns the raw
/// return data in request order.
#[async_trait]
pub trait MulticallClient: Send + Sync {
    async fn aggregate(&self, calls: &[ContractCall]) -> Result<Vec<Bytes>>;
}

#[derive(Clone)]
pub struct AlloyMulticallClient {
    provider: DynProvider,
    multicall: Address,
}

impl AlloyMulticallClient {
    pub fn connect(rpc_url: &str, multicall: Address) -> Result<Self> {
        let url = rpc_url
            .parse()
            .context(utils::errors::RPC_PROVIDER_INIT_FAILED)?;
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_http(url)
            .erased();
        Ok(Self {
            provider,
            multicall,
        })
    }

    pub async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .context(utils::errors::CHAIN_ID_FETCH_FAILED)
    }
}

#[async_trait]
impl MulticallClient for AlloyMulticallClient {
    #[instrument(skip(self, calls), fields(calls = calls.len()))]
    async fn aggregate(&self, calls: &[ContractCall]) -> Result<Vec<Bytes>> {
        let multicall = IMulticall::new(self.multicall, &self.provider);
        let encoded = calls
            .iter()
            .map(|call| IMulticall::Call {
                target: call.target,
                callData: call.call_data.clone(),
            })
            .collect::<Vec<_>>();

        let result = multicall
            .aggregate(encoded)
            .call()
            .await
            .context(utils::errors::MULTICALL_FAILED)?;

        if result.returnData.len() != calls.len() {
            anyhow::bail!(
                "Multicall returned {} results for {} calls",
                result.returnData.len(),
                calls.len()
            );
        }

        debug!(block_number = %result.blockNumber, "Multicall aggregate succeeded");
        Ok(result.returnData)
    }
}
