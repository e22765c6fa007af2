//! Resolution of a named network profile.

use std::{collections::BTreeMap, fmt, time::Duration};

use url::Url;

use super::{LOCAL_PROFILE, NetworkSettings, SigningKey, is_loopback, validate_endpoint};
use crate::ConfigError;

/// Connection parameters of one network, ready for deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    /// Profile name.
    pub name: String,
    /// Validated JSON-RPC endpoint.
    pub endpoint: Url,
    /// Key used to sign transactions. `None` means the node signs with an unlocked account.
    pub signing_key: Option<SigningKey>,
    /// Gas limit attached to the deployment transaction.
    pub gas_limit: u64,
    /// Block gas limit of the chain, if known.
    pub block_gas_limit: Option<u64>,
    /// Chain id the endpoint must report before anything is signed.
    pub chain_id: Option<u64>,
    /// Deadline for the deployment to be included.
    pub confirmation_timeout: Duration,
    /// Delay between two receipt polls.
    pub poll_interval: Duration,
}

/// Turns profile names into [`NetworkProfile`]s.
///
/// The signing key is handed over once at construction and never read again.
pub struct ProfileResolver {
    networks: BTreeMap<String, NetworkSettings>,
    signing_key: Option<String>,
}

impl ProfileResolver {
    pub fn new(networks: BTreeMap<String, NetworkSettings>, signing_key: Option<String>) -> Self {
        Self {
            networks,
            signing_key,
        }
    }

    /// Names of all known profiles.
    pub fn profiles(&self) -> impl Iterator<Item = &str> {
        self.networks.keys().map(String::as_str)
    }

    /// Resolve a profile by name.
    ///
    /// Every profile except [`LOCAL_PROFILE`] needs the signing key, whatever its
    /// settings say.
    pub fn resolve(&self, name: &str) -> Result<NetworkProfile, ConfigError> {
        let settings = self
            .networks
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                name: name.to_string(),
                known: self.profiles().collect::<Vec<_>>().join(", "),
            })?;

        let signing_key = if name == LOCAL_PROFILE {
            None
        } else {
            Some(self.signing_key_for(name)?)
        };

        let endpoint =
            validate_endpoint(&settings.url).map_err(|source| ConfigError::InvalidEndpoint {
                profile: name.to_string(),
                source,
            })?;

        if signing_key.is_none() && !is_loopback(&endpoint) {
            tracing::warn!(
                network = %name,
                endpoint = %endpoint,
                "Local profile points at a remote node, relying on its unlocked accounts"
            );
        }

        let invalid = |reason| ConfigError::InvalidSetting {
            profile: name.to_string(),
            reason,
        };
        if settings.gas == 0 {
            return Err(invalid("gas must be greater than zero"));
        }
        if settings.confirmation_timeout_secs == 0 {
            return Err(invalid("confirmation_timeout_secs must be greater than zero"));
        }
        if settings.poll_interval_ms == 0 {
            return Err(invalid("poll_interval_ms must be greater than zero"));
        }

        let profile = NetworkProfile {
            name: name.to_string(),
            endpoint,
            signing_key,
            gas_limit: settings.gas,
            block_gas_limit: settings.block_gas_limit,
            chain_id: settings.chain_id,
            confirmation_timeout: Duration::from_secs(settings.confirmation_timeout_secs),
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
        };

        tracing::debug!(
            network = %profile.name,
            endpoint = %profile.endpoint,
            gas_limit = profile.gas_limit,
            signed = profile.signing_key.is_some(),
            "Resolved network profile"
        );

        Ok(profile)
    }

    fn signing_key_for(&self, profile: &str) -> Result<SigningKey, ConfigError> {
        let raw = self
            .signing_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::MissingSecret {
                profile: profile.to_string(),
            })?;

        SigningKey::parse(raw).ok_or_else(|| ConfigError::InvalidSigningKey {
            profile: profile.to_string(),
        })
    }
}

impl fmt::Debug for ProfileResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileResolver")
            .field("networks", &self.networks)
            .field("signing_key", &self.signing_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;
    use crate::config::{CONFIG_FILENAME, ShipyardConfig};

    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn resolver(signing_key: Option<&str>) -> ProfileResolver {
        ProfileResolver::new(
            ShipyardConfig::default().networks,
            signing_key.map(String::from),
        )
    }

    #[test]
    fn test_local_resolves_without_key() {
        let profile = resolver(None).resolve("local").unwrap();
        assert!(profile.signing_key.is_none());
        assert!(is_loopback(&profile.endpoint));
        assert!(profile.gas_limit >= 10_000_000);
        assert_eq!(profile.block_gas_limit, Some(100_000_000));
    }

    #[test]
    fn test_local_ignores_provided_key() {
        let profile = resolver(Some(DEV_KEY)).resolve("local").unwrap();
        assert!(profile.signing_key.is_none());
    }

    #[test]
    fn test_remote_profiles_require_key() {
        let resolver = resolver(None);
        for name in resolver.profiles().filter(|name| *name != "local") {
            assert!(
                matches!(
                    resolver.resolve(name),
                    Err(ConfigError::MissingSecret { ref profile }) if profile == name
                ),
                "profile {name} resolved without a key"
            );
        }
    }

    #[test]
    fn test_custom_profile_requires_key() {
        let mut networks = ShipyardConfig::default().networks;
        networks.insert(
            "polygon".to_string(),
            NetworkSettings {
                url: "https://polygon-rpc.com".to_string(),
                chain_id: Some(137),
                ..NetworkSettings::local()
            },
        );
        let resolver = ProfileResolver::new(networks, None);

        assert!(matches!(
            resolver.resolve("polygon"),
            Err(ConfigError::MissingSecret { ref profile }) if profile == "polygon"
        ));
    }

    #[test]
    fn test_overridden_mainnet_still_requires_key() {
        let dir = TempDir::new("shipyard-resolver").unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[networks.mainnet]\nurl = \"http://127.0.0.1:8545\"\nrequires_signing_key = false\n",
        )
        .unwrap();
        let config = ShipyardConfig::load(Some(path.as_path())).unwrap();
        let resolver = ProfileResolver::new(config.networks, None);

        assert!(matches!(
            resolver.resolve("mainnet"),
            Err(ConfigError::MissingSecret { ref profile }) if profile == "mainnet"
        ));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        assert!(matches!(
            resolver(Some("   ")).resolve("testnet"),
            Err(ConfigError::MissingSecret { .. })
        ));
    }

    #[test]
    fn test_malformed_key_is_rejected() {
        assert!(matches!(
            resolver(Some("0xdeadbeef")).resolve("mainnet"),
            Err(ConfigError::InvalidSigningKey { .. })
        ));
    }

    #[test]
    fn test_remote_profile_with_key() {
        let profile = resolver(Some(DEV_KEY)).resolve("testnet").unwrap();
        assert!(profile.signing_key.is_some());
        assert_eq!(profile.chain_id, Some(11155111));
        assert_eq!(profile.gas_limit, 5_500_000);
        assert!(!is_loopback(&profile.endpoint));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let resolver = resolver(Some(DEV_KEY));
        for name in ["local", "testnet", "mainnet"] {
            assert_eq!(resolver.resolve(name).unwrap(), resolver.resolve(name).unwrap());
        }
    }

    #[test]
    fn test_unknown_profile() {
        let err = resolver(None).resolve("polygon").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile { ref name, .. } if name == "polygon"));
        assert!(err.to_string().contains("local, mainnet, testnet"));
    }

    #[test]
    fn test_endpoint_with_leading_tab_is_rejected() {
        let mut networks = ShipyardConfig::default().networks;
        networks.insert(
            "polygon".to_string(),
            NetworkSettings {
                url: "\thttps://polygon-rpc.com".to_string(),
                ..NetworkSettings::mainnet()
            },
        );
        let resolver = ProfileResolver::new(networks, Some(DEV_KEY.to_string()));

        assert!(matches!(
            resolver.resolve("polygon"),
            Err(ConfigError::InvalidEndpoint { ref profile, .. }) if profile == "polygon"
        ));
    }

    #[test]
    fn test_zero_gas_is_rejected() {
        let mut networks = ShipyardConfig::default().networks;
        networks.insert(
            "local".to_string(),
            NetworkSettings {
                gas: 0,
                ..NetworkSettings::local()
            },
        );
        let resolver = ProfileResolver::new(networks, None);
        assert!(matches!(
            resolver.resolve("local"),
            Err(ConfigError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        let debug = format!("{:?}", resolver(Some(DEV_KEY)));
        assert!(!debug.contains(&DEV_KEY[2..]));
        assert!(debug.contains("<redacted>"));
    }
}
