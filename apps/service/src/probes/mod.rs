//! Network probes - one liveness check per monitored chain
//!
//! Every probe performs a single read-only request and reports the height or
//! status it observed. Errors are left to the scheduler, which logs them and
//! counts the probe as failed for the current cycle.

pub mod axelar;
pub mod cosmos;
pub mod evm;
pub mod near;
pub mod rpc;
pub mod starknet;

#[cfg(test)]
pub(crate) mod stub;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use pulse::{Probe, ProbeDescriptor};
use tracing::warn;
use url::Url;

use crate::config::{Network, Settings};
use axelar::AxelarProbe;
use cosmos::CometProbe;
use evm::EvmProbe;
use near::NearProbe;
use rpc::JsonRpcClient;
use starknet::StarknetProbe;

pub const USER_AGENT: &str = concat!("pulse/", env!("CARGO_PKG_VERSION"));

type RpcProbeBuilder = fn(JsonRpcClient) -> Arc<dyn Probe>;

/// Shared HTTP client. `timeout` bounds every request.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder().timeout(timeout).user_agent(USER_AGENT).build()?;

    Ok(client)
}

/// The probe set of the configured variant, in dispatch order.
///
/// Probes whose endpoint is not configured are left out with a warning.
pub fn build_probes(settings: &Settings, client: &reqwest::Client) -> Vec<ProbeDescriptor> {
    let endpoints = &settings.endpoints;

    let mut candidates: Vec<(&str, Option<&Url>, RpcProbeBuilder)> = Vec::new();
    if settings.network == Network::Mainnet {
        candidates.push(("Ethereum", endpoints.ethereum.as_ref(), evm_probe));
    }
    candidates.push(("Evmos", endpoints.evmos.as_ref(), evm_probe));
    candidates.push(("Evmos Cosmos", endpoints.evmos_cosmos.as_ref(), comet_probe));
    candidates.push(("StarkNet", endpoints.starknet.as_ref(), starknet_probe));
    candidates.push(("NEAR", endpoints.near.as_ref(), near_probe));

    let mut probes = Vec::with_capacity(candidates.len() + 1);
    for (name, endpoint, build) in candidates {
        match endpoint {
            Some(url) => {
                let rpc = JsonRpcClient::new(client.clone(), url.clone());
                probes.push(ProbeDescriptor::from_arc(name, build(rpc)));
            }
            None => warn!("{name} endpoint is not configured, probe disabled"),
        }
    }

    probes.push(ProbeDescriptor::new(
        "Axelar",
        AxelarProbe::new(client.clone(), endpoints.axelar_gmp.clone(), settings.tx_file.clone()),
    ));

    probes
}

fn evm_probe(rpc: JsonRpcClient) -> Arc<dyn Probe> {
    Arc::new(EvmProbe::new(rpc))
}

fn comet_probe(rpc: JsonRpcClient) -> Arc<dyn Probe> {
    Arc::new(CometProbe::new(rpc))
}

fn starknet_probe(rpc: JsonRpcClient) -> Arc<dyn Probe> {
    Arc::new(StarknetProbe::new(rpc))
}

fn near_probe(rpc: JsonRpcClient) -> Arc<dyn Probe> {
    Arc::new(NearProbe::new(rpc))
}
