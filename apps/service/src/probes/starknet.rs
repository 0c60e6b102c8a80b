use anyhow::Result;
use pulse::Probe;
use serde::Deserialize;
use serde_json::json;

use super::rpc::JsonRpcClient;

#[derive(Debug, Deserialize)]
struct Block {
    block_number: u64,
}

/// Number of the latest accepted StarkNet block.
pub struct StarknetProbe {
    rpc: JsonRpcClient,
}

impl StarknetProbe {
    pub fn new(rpc: JsonRpcClient) -> Self {
        Self { rpc }
    }
}

#[async_trait::async_trait]
impl Probe for StarknetProbe {
    async fn check(&self) -> Result<String> {
        let block: Block = self
            .rpc
            .call("starknet_getBlockWithTxHashes", json!({ "block_id": "latest" }))
            .await?;

        Ok(format!("block {}", block.block_number))
    }
}
