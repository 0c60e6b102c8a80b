use std::{env, fmt, path::PathBuf, time::Duration};

use clap::ValueEnum;
use pulse::{BoundsError, JitterBounds, SchedulerConfig};
use thiserror::Error;
use url::Url;

pub const AXELAR_GMP_API: &str = "AXELAR_GMP_API";
pub const AXELAR_TX_FILE: &str = "AXELAR_TX_FILE";
pub const PROBE_TIMEOUT_SECS: &str = "PROBE_TIMEOUT_SECS";
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),
    #[error("{key} must be a whole number of seconds, got `{value}`")]
    InvalidSeconds { key: &'static str, value: String },
    #[error("{key} is not a valid URL: {source}")]
    InvalidUrl {
        key: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("{key} uses unsupported URL scheme `{scheme}`")]
    UnsupportedScheme { key: &'static str, scheme: String },
    #[error("invalid {window} jitter window: {source}")]
    Bounds {
        window: &'static str,
        #[source]
        source: BoundsError,
    },
    #[error("PROBE_TIMEOUT_SECS must be at least 1 second")]
    ZeroProbeTimeout,
}

/// Deployment variant. Selects the probe set and which variables are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

/// Variable names used by one variant.
struct EnvKeys {
    ethereum: Option<&'static str>,
    evmos: &'static str,
    evmos_cosmos: &'static str,
    starknet: &'static str,
    near: &'static str,
    required: &'static [&'static str],
    start_min: &'static str,
    start_max: &'static str,
    cycle_min: &'static str,
    cycle_max: &'static str,
    default_gmp_api: &'static str,
    default_tx_file: &'static str,
}

impl Network {
    fn keys(self) -> EnvKeys {
        match self {
            Network::Mainnet => EnvKeys {
                ethereum: Some("ETH_RPC"),
                evmos: "EVMOS_RPC",
                evmos_cosmos: "EVMOS_COSMOS_RPC",
                starknet: "STARKNET_RPC",
                near: "NEAR_RPC",
                required: &["ETH_RPC", "EVMOS_RPC"],
                start_min: "TIMEOUT_MIN",
                start_max: "TIMEOUT_MAX",
                cycle_min: "TIMEOUT_CICLE_MIN",
                cycle_max: "TIMEOUT_CICLE_MAX",
                default_gmp_api: "https://api.gmp.axelarscan.io",
                default_tx_file: "axelar.txt",
            },
            Network::Testnet => EnvKeys {
                ethereum: None,
                evmos: "EVMOS_RPC_TESTNET",
                evmos_cosmos: "EVMOS_COSMOS_RPC_TESTNET",
                starknet: "STARKNET_RPC_TESTNET",
                near: "NEAR_RPC_TESTNET",
                required: &["EVMOS_RPC_TESTNET", "NEAR_RPC_TESTNET"],
                start_min: "TIMEOUT_TESTNET_MIN",
                start_max: "TIMEOUT_TESTNET_MAX",
                cycle_min: "TIMEOUT_TESTNET_CICLE_MIN",
                cycle_max: "TIMEOUT_TESTNET_CICLE_MAX",
                default_gmp_api: "https://testnet.api.gmp.axelarscan.io",
                default_tx_file: "axelar_testnet.txt",
            },
        }
    }
}

/// Remote endpoints of the active variant. `None` means the probe is disabled.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub ethereum: Option<Url>,
    pub evmos: Option<Url>,
    pub evmos_cosmos: Option<Url>,
    pub starknet: Option<Url>,
    pub near: Option<Url>,
    pub axelar_gmp: Url,
}

/// Fully resolved daemon settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub network: Network,
    pub endpoints: Endpoints,
    pub start_bounds: JitterBounds,
    pub cycle_bounds: JitterBounds,
    pub probe_timeout: Duration,
    /// Newline-separated Axelar transaction hashes
    pub tx_file: PathBuf,
}

impl Settings {
    /// Read settings for `network` from the process environment.
    pub fn from_env(network: Network) -> Result<Self, ConfigError> {
        Self::from_lookup(network, |key| env::var(key).ok())
    }

    /// Resolve settings through `lookup`. Blank values count as unset.
    pub fn from_lookup(
        network: Network,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|value| value.trim().to_string()).filter(|v| !v.is_empty());
        let keys = network.keys();

        for &key in keys.required {
            if get(key).is_none() {
                return Err(ConfigError::Missing(key));
            }
        }

        let url = |key: &'static str| get(key).map(|raw| parse_url(key, &raw)).transpose();
        let endpoints = Endpoints {
            ethereum: match keys.ethereum {
                Some(key) => url(key)?,
                None => None,
            },
            evmos: url(keys.evmos)?,
            evmos_cosmos: url(keys.evmos_cosmos)?,
            starknet: url(keys.starknet)?,
            near: url(keys.near)?,
            axelar_gmp: match get(AXELAR_GMP_API) {
                Some(raw) => parse_url(AXELAR_GMP_API, &raw)?,
                None => parse_url(AXELAR_GMP_API, keys.default_gmp_api)?,
            },
        };

        let seconds = |key: &'static str| -> Result<u64, ConfigError> {
            let raw = get(key).ok_or(ConfigError::Missing(key))?;
            raw.parse().map_err(|_| ConfigError::InvalidSeconds { key, value: raw })
        };
        let start_bounds = JitterBounds::new(seconds(keys.start_min)?, seconds(keys.start_max)?)
            .map_err(|source| ConfigError::Bounds { window: "task start", source })?;
        let cycle_bounds = JitterBounds::new(seconds(keys.cycle_min)?, seconds(keys.cycle_max)?)
            .map_err(|source| ConfigError::Bounds { window: "inter-cycle", source })?;

        let probe_timeout = match get(PROBE_TIMEOUT_SECS) {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidSeconds { key: PROBE_TIMEOUT_SECS, value: raw })?,
            None => DEFAULT_PROBE_TIMEOUT_SECS,
        };
        if probe_timeout == 0 {
            return Err(ConfigError::ZeroProbeTimeout);
        }

        let tx_file = get(AXELAR_TX_FILE).unwrap_or_else(|| keys.default_tx_file.to_string());

        Ok(Self {
            network,
            endpoints,
            start_bounds,
            cycle_bounds,
            probe_timeout: Duration::from_secs(probe_timeout),
            tx_file: PathBuf::from(tx_file),
        })
    }

    pub fn with_tx_file(mut self, tx_file: PathBuf) -> Self {
        self.tx_file = tx_file;
        self
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            start_bounds: self.start_bounds,
            cycle_bounds: self.cycle_bounds,
            probe_timeout: Some(self.probe_timeout),
        }
    }
}

fn parse_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { key, source })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme { key, scheme: other.to_string() }),
    }
}

/// Host and port only; RPC URLs often carry API keys in the path or query.
fn redacted(url: &Url) -> String {
    let host = url.host_str().unwrap_or("?");
    match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };
        let endpoint = |url: &Option<Url>| {
            url.as_ref().map(redacted).unwrap_or_else(|| "not configured".to_string())
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Resolved Configuration ({}):", self.network)?;
        write_title_1(f, "Endpoints")?;
        if self.network == Network::Mainnet {
            write_1(f, "Ethereum", &endpoint(&self.endpoints.ethereum))?;
        }
        write_1(f, "Evmos", &endpoint(&self.endpoints.evmos))?;
        write_1(f, "Evmos Cosmos", &endpoint(&self.endpoints.evmos_cosmos))?;
        write_1(f, "StarkNet", &endpoint(&self.endpoints.starknet))?;
        write_1(f, "NEAR", &endpoint(&self.endpoints.near))?;
        write_1(f, "Axelar GMP", &redacted(&self.endpoints.axelar_gmp))?;
        write_title_1(f, "Timing")?;
        write_1(f, "Task start jitter", &self.start_bounds)?;
        write_1(f, "Inter-cycle jitter", &self.cycle_bounds)?;
        write_1(f, "Probe timeout", &format!("{}s", self.probe_timeout.as_secs()))?;
        write_title_1(f, "Samples")?;
        write_1(f, "Axelar tx file", &self.tx_file.display())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn mainnet_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("ETH_RPC", "https://eth.example.org/v2/secret-key"),
            ("EVMOS_RPC", "https://evmos.example.org"),
            ("EVMOS_COSMOS_RPC", "https://evmos-rpc.example.org:26657"),
            ("NEAR_RPC", "https://rpc.mainnet.near.org"),
            ("TIMEOUT_MIN", "5"),
            ("TIMEOUT_MAX", "60"),
            ("TIMEOUT_CICLE_MIN", "300"),
            ("TIMEOUT_CICLE_MAX", "900"),
        ])
    }

    fn resolve(network: Network, vars: &HashMap<&str, &str>) -> Result<Settings, ConfigError> {
        Settings::from_lookup(network, |key| vars.get(key).map(|value| value.to_string()))
    }

    #[test]
    fn test_mainnet_settings() {
        let settings = resolve(Network::Mainnet, &mainnet_env()).unwrap();

        assert_eq!(settings.start_bounds, JitterBounds::new(5, 60).unwrap());
        assert_eq!(settings.cycle_bounds, JitterBounds::new(300, 900).unwrap());
        assert_eq!(settings.probe_timeout, Duration::from_secs(30));
        assert_eq!(settings.tx_file, PathBuf::from("axelar.txt"));
        assert!(settings.endpoints.ethereum.is_some());
        assert!(settings.endpoints.starknet.is_none());
        assert_eq!(settings.endpoints.axelar_gmp.as_str(), "https://api.gmp.axelarscan.io/");
    }

    #[test]
    fn test_missing_required_endpoint() {
        let mut vars = mainnet_env();
        vars.remove("ETH_RPC");
        assert!(matches!(resolve(Network::Mainnet, &vars), Err(ConfigError::Missing("ETH_RPC"))));

        let mut vars = mainnet_env();
        vars.insert("EVMOS_RPC", "   ");
        assert!(matches!(resolve(Network::Mainnet, &vars), Err(ConfigError::Missing("EVMOS_RPC"))));
    }

    #[test]
    fn test_missing_bounds_fail_fast() {
        let mut vars = mainnet_env();
        vars.remove("TIMEOUT_CICLE_MAX");
        assert!(matches!(
            resolve(Network::Mainnet, &vars),
            Err(ConfigError::Missing("TIMEOUT_CICLE_MAX"))
        ));
    }

    #[test]
    fn test_invalid_bounds() {
        let mut vars = mainnet_env();
        vars.insert("TIMEOUT_MIN", "-3");
        assert!(matches!(
            resolve(Network::Mainnet, &vars),
            Err(ConfigError::InvalidSeconds { key: "TIMEOUT_MIN", .. })
        ));

        let mut vars = mainnet_env();
        vars.insert("TIMEOUT_MIN", "90");
        let error = resolve(Network::Mainnet, &vars).unwrap_err();
        assert!(matches!(error, ConfigError::Bounds { window: "task start", .. }));
        assert!(error.to_string().contains("task start"));
    }

    #[test]
    fn test_testnet_uses_its_own_keys() {
        let vars = HashMap::from([
            ("ETH_RPC", "https://eth.example.org"),
            ("EVMOS_RPC_TESTNET", "https://evmos-testnet.example.org"),
            ("NEAR_RPC_TESTNET", "https://rpc.testnet.near.org"),
            ("TIMEOUT_TESTNET_MIN", "1"),
            ("TIMEOUT_TESTNET_MAX", "2"),
            ("TIMEOUT_TESTNET_CICLE_MIN", "3"),
            ("TIMEOUT_TESTNET_CICLE_MAX", "4"),
            ("AXELAR_TX_FILE", "/srv/pulse/hashes.txt"),
            ("PROBE_TIMEOUT_SECS", "12"),
        ]);

        let settings = resolve(Network::Testnet, &vars).unwrap();
        assert!(settings.endpoints.ethereum.is_none());
        assert_eq!(settings.start_bounds, JitterBounds::new(1, 2).unwrap());
        assert_eq!(settings.cycle_bounds, JitterBounds::new(3, 4).unwrap());
        assert_eq!(settings.tx_file, PathBuf::from("/srv/pulse/hashes.txt"));
        assert_eq!(settings.probe_timeout, Duration::from_secs(12));
        assert_eq!(
            settings.endpoints.axelar_gmp.as_str(),
            "https://testnet.api.gmp.axelarscan.io/"
        );

        assert!(matches!(resolve(Network::Testnet, &mainnet_env()), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_rejects_bad_urls_and_zero_timeout() {
        let mut vars = mainnet_env();
        vars.insert("STARKNET_RPC", "ws://starknet.example.org");
        assert!(matches!(
            resolve(Network::Mainnet, &vars),
            Err(ConfigError::UnsupportedScheme { key: "STARKNET_RPC", .. })
        ));

        let mut vars = mainnet_env();
        vars.insert("NEAR_RPC", "not a url");
        assert!(matches!(resolve(Network::Mainnet, &vars), Err(ConfigError::InvalidUrl { .. })));

        let mut vars = mainnet_env();
        vars.insert("PROBE_TIMEOUT_SECS", "0");
        assert!(matches!(resolve(Network::Mainnet, &vars), Err(ConfigError::ZeroProbeTimeout)));
    }

    #[test]
    fn test_display_hides_url_secrets() {
        let settings = resolve(Network::Mainnet, &mainnet_env()).unwrap();
        let rendered = settings.to_string();

        assert!(rendered.contains("https://eth.example.org"));
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("https://evmos-rpc.example.org:26657"));
        assert!(rendered.contains("StarkNet: not configured"));
        assert!(rendered.contains("Task start jitter: 5s..=60s"));
    }
}
