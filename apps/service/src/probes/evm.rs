use anyhow::{Context, Result, anyhow};
use pulse::Probe;
use serde_json::json;

use super::rpc::JsonRpcClient;

/// Latest block number of an EVM chain via `eth_blockNumber`.
pub struct EvmProbe {
    rpc: JsonRpcClient,
}

impl EvmProbe {
    pub fn new(rpc: JsonRpcClient) -> Self {
        Self { rpc }
    }
}

#[async_trait::async_trait]
impl Probe for EvmProbe {
    async fn check(&self) -> Result<String> {
        let quantity: String = self.rpc.call("eth_blockNumber", json!([])).await?;
        let height = parse_quantity(&quantity)?;

        Ok(format!("block {height}"))
    }
}

/// Decode a `0x`-prefixed hex quantity.
fn parse_quantity(raw: &str) -> Result<u64> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .filter(|digits| !digits.is_empty())
        .ok_or_else(|| anyhow!("block number `{raw}` is not a hex quantity"))?;

    u64::from_str_radix(digits, 16).with_context(|| format!("block number `{raw}` is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::stub::StubServer;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_quantity("0x12d687").unwrap(), 1_234_567);
        assert_eq!(parse_quantity("0XFF").unwrap(), 255);
        assert!(parse_quantity("1234").is_err());
        assert!(parse_quantity("0x").is_err());
        assert!(parse_quantity("0xzz").is_err());
    }

    #[tokio::test]
    async fn test_reports_block_height() {
        let server = StubServer::start(200, r#"{"jsonrpc":"2.0","id":1,"result":"0x12d687"}"#).await;
        let probe = EvmProbe::new(JsonRpcClient::new(reqwest::Client::new(), server.url()));

        assert_eq!(probe.check().await.unwrap(), "block 1234567");
    }
}
