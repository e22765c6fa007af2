//! Layered configuration: built-in network profiles, an optional TOML file and
//! `SHIPYARD_` prefixed environment variables.

mod endpoint;
mod resolver;
mod secret;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

pub use endpoint::{EndpointError, is_loopback, validate_endpoint};
pub use resolver::{NetworkProfile, ProfileResolver};
pub use secret::SigningKey;

use crate::ConfigError;

/// The default name for the shipyard configuration file.
pub const CONFIG_FILENAME: &str = "Shipyard.toml";

/// Prefix of environment variables merged over the configuration.
pub const ENV_PREFIX: &str = "SHIPYARD_";

/// The only profile that deploys through the node's unlocked accounts. Every other
/// profile signs with `PRIVATE_KEY`.
pub const LOCAL_PROFILE: &str = "local";

/// Environment variable holding the signing key for remote networks.
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// Default confirmation deadline for a deployment transaction.
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 300;

/// Default interval between receipt polls.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Contract deployed by default.
pub const DEFAULT_CONTRACT: &str = "VWBLMetaTx";

/// Default constructor arguments: gateway proxy, NFT access checker, trusted forwarder.
pub const DEFAULT_CONSTRUCTOR_ARGS: [&str; 3] = [
    "0xa0cbAF6872f80172Bf0a471bC447440edFEC4475",
    "0x9c9bd1b3376ccf3d695d9233c04e865e556f8980",
    "0xf0511f123164602042ab2bCF02111fA5D3Fe97CD",
];

/// Static settings of one named network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// JSON-RPC endpoint.
    pub url: String,
    /// Gas limit attached to the deployment transaction.
    pub gas: u64,
    /// Block gas limit of the chain, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_gas_limit: Option<u64>,
    /// Chain id the endpoint is expected to report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// How long to wait for the deployment to be included.
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
    /// Delay between two receipt polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_confirmation_timeout_secs() -> u64 {
    DEFAULT_CONFIRMATION_TIMEOUT_SECS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl NetworkSettings {
    /// Unmetered local development chain (Hardhat node, Anvil).
    pub fn local() -> Self {
        Self {
            url: "http://localhost:8545".to_string(),
            gas: 100_000_000,
            block_gas_limit: Some(100_000_000),
            chain_id: None,
            confirmation_timeout_secs: 60,
            poll_interval_ms: 500,
        }
    }

    /// Public test network (Sepolia).
    pub fn testnet() -> Self {
        Self {
            url: "https://ethereum-sepolia-rpc.publicnode.com".to_string(),
            gas: 5_500_000,
            block_gas_limit: None,
            chain_id: Some(11155111),
            confirmation_timeout_secs: DEFAULT_CONFIRMATION_TIMEOUT_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Ethereum mainnet.
    pub fn mainnet() -> Self {
        Self {
            url: "https://ethereum-mainnet-rpc.publicnode.com".to_string(),
            gas: 5_500_000,
            block_gas_limit: None,
            chain_id: Some(1),
            confirmation_timeout_secs: DEFAULT_CONFIRMATION_TIMEOUT_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

/// What to deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentSettings {
    /// Contract name, or fully qualified `path/File.sol:Name`.
    pub contract: String,
    /// Constructor arguments, in order.
    pub args: Vec<String>,
    /// Directory searched for compiled artifacts.
    pub artifacts: PathBuf,
}

impl Default for DeploymentSettings {
    fn default() -> Self {
        Self {
            contract: DEFAULT_CONTRACT.to_string(),
            args: DEFAULT_CONSTRUCTOR_ARGS.iter().map(|a| a.to_string()).collect(),
            artifacts: PathBuf::from("artifacts"),
        }
    }
}

/// Full shipyard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipyardConfig {
    /// Network profiles by name.
    pub networks: BTreeMap<String, NetworkSettings>,
    /// The deployment to perform.
    pub deployment: DeploymentSettings,
}

impl Default for ShipyardConfig {
    fn default() -> Self {
        let networks = BTreeMap::from([
            (LOCAL_PROFILE.to_string(), NetworkSettings::local()),
            ("testnet".to_string(), NetworkSettings::testnet()),
            ("mainnet".to_string(), NetworkSettings::mainnet()),
        ]);

        Self {
            networks,
            deployment: DeploymentSettings::default(),
        }
    }
}

impl ShipyardConfig {
    /// Build the configuration layers.
    ///
    /// Later layers win: built-in defaults, then the TOML file, then `SHIPYARD_*`
    /// environment variables (`__` separates nested keys, e.g.
    /// `SHIPYARD_NETWORKS__TESTNET__URL`).
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .ignore(&["config", "network", "verbosity"])
                    .split("__"),
            )
    }

    /// Load the configuration.
    ///
    /// An explicit `path` must exist. Without one, [`CONFIG_FILENAME`] in the
    /// working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(CONFIG_FILENAME),
        };

        let config: Self = Self::figment(&path)
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))?;

        tracing::debug!(
            path = %path.display(),
            networks = ?config.networks.keys().collect::<Vec<_>>(),
            "Configuration loaded"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn test_default_profiles() {
        let config = ShipyardConfig::default();
        assert_eq!(
            config.networks.keys().collect::<Vec<_>>(),
            vec!["local", "mainnet", "testnet"]
        );
        assert_eq!(config.deployment.args.len(), 3);
    }

    #[test]
    fn test_file_overrides_and_extends_defaults() {
        let dir = TempDir::new("shipyard-config").unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[networks.testnet]
gas = 6000000

[networks.polygon]
url = "https://polygon-rpc.com"
gas = 5500000
chain_id = 137

[deployment]
contract = "Other"
"#,
        )
        .unwrap();

        let config = ShipyardConfig::load(Some(&path)).unwrap();

        let testnet = &config.networks["testnet"];
        assert_eq!(testnet.gas, 6_000_000);
        assert_eq!(testnet.url, NetworkSettings::testnet().url);
        assert_eq!(testnet.chain_id, Some(11155111));

        let polygon = &config.networks["polygon"];
        assert_eq!(polygon.chain_id, Some(137));
        assert_eq!(polygon.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);

        assert_eq!(config.deployment.contract, "Other");
        assert_eq!(config.deployment.args, DeploymentSettings::default().args);
        assert_eq!(config.networks["local"], NetworkSettings::local());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new("shipyard-config").unwrap();
        let path = dir.path().join("nope.toml");
        assert!(matches!(
            ShipyardConfig::load(Some(&path)),
            Err(ConfigError::FileNotFound(p)) if p == path
        ));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new("shipyard-config").unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[networks.local]\ngas = \"lots\"\n").unwrap();
        assert!(matches!(
            ShipyardConfig::load(Some(&path)),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn test_unknown_keys_in_file_are_ignored() {
        let dir = TempDir::new("shipyard-config").unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[networks.mainnet]\nrequires_signing_key = false\n",
        )
        .unwrap();

        let config = ShipyardConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.networks["mainnet"], NetworkSettings::mainnet());
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = ShipyardConfig::default();
        let rendered = toml::to_string_pretty(&config).unwrap();
        let parsed: ShipyardConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
