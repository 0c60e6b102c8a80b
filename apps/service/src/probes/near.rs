use anyhow::Result;
use pulse::Probe;
use serde::Deserialize;
use serde_json::json;

use super::rpc::JsonRpcClient;

#[derive(Debug, Deserialize)]
struct Block {
    header: Header,
}

#[derive(Debug, Deserialize)]
struct Header {
    height: u64,
}

/// Height of the latest final NEAR block.
pub struct NearProbe {
    rpc: JsonRpcClient,
}

impl NearProbe {
    pub fn new(rpc: JsonRpcClient) -> Self {
        Self { rpc }
    }
}

#[async_trait::async_trait]
impl Probe for NearProbe {
    async fn check(&self) -> Result<String> {
        let block: Block = self.rpc.call("block", json!({ "finality": "final" })).await?;

        Ok(format!("block {}", block.header.height))
    }
}
