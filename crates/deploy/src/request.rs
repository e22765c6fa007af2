//! The deployment request: which contract, with which constructor arguments.

use alloy_core::{
    dyn_abi::DynSolValue,
    json_abi::JsonAbi,
    primitives::{Address, Bytes},
};

use crate::config::DeploymentSettings;

/// Problems with the contract name or the constructor arguments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("contract name is empty")]
    EmptyContractName,

    #[error("argument {index}: invalid address format, expected 0x-prefixed 40 hex chars, got '{value}'")]
    MalformedAddress { index: usize, value: String },

    #[error("argument {index}: address '{value}' fails its EIP-55 checksum")]
    BadChecksum { index: usize, value: String },

    #[error("constructor takes {expected} argument(s), got {got}")]
    ArityMismatch { expected: usize, got: usize },

    #[error("constructor parameter {index} ('{name}') has type {ty}, only address parameters are supported")]
    UnsupportedParameter {
        index: usize,
        name: String,
        ty: String,
    },
}

/// A contract to deploy and its ordered constructor arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRequest {
    contract_name: String,
    constructor_args: Vec<Address>,
}

impl DeploymentRequest {
    /// Build a request, validating every argument as an address.
    pub fn new<I, S>(contract_name: impl Into<String>, args: I) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let contract_name = contract_name.into().trim().to_string();
        if contract_name.is_empty() {
            return Err(RequestError::EmptyContractName);
        }

        let constructor_args = args
            .into_iter()
            .enumerate()
            .map(|(index, arg)| parse_address(index, arg.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            contract_name,
            constructor_args,
        })
    }

    /// Build the request described by the `[deployment]` configuration section.
    pub fn from_settings(settings: &DeploymentSettings) -> Result<Self, RequestError> {
        Self::new(settings.contract.as_str(), &settings.args)
    }

    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    pub fn constructor_args(&self) -> &[Address] {
        &self.constructor_args
    }

    /// ABI-encode the arguments against the constructor declared in `abi`.
    ///
    /// A contract without an explicit constructor takes no arguments.
    pub fn encode_constructor_args(&self, abi: &JsonAbi) -> Result<Bytes, RequestError> {
        let inputs = abi
            .constructor
            .as_ref()
            .map(|constructor| constructor.inputs.as_slice())
            .unwrap_or_default();

        if inputs.len() != self.constructor_args.len() {
            return Err(RequestError::ArityMismatch {
                expected: inputs.len(),
                got: self.constructor_args.len(),
            });
        }

        if let Some((index, param)) = inputs
            .iter()
            .enumerate()
            .find(|(_, param)| param.ty != "address")
        {
            return Err(RequestError::UnsupportedParameter {
                index,
                name: param.name.clone(),
                ty: param.ty.clone(),
            });
        }

        if self.constructor_args.is_empty() {
            return Ok(Bytes::new());
        }

        let values = self
            .constructor_args
            .iter()
            .copied()
            .map(DynSolValue::Address)
            .collect();

        Ok(DynSolValue::Tuple(values).abi_encode_params().into())
    }
}

/// Validate an Ethereum address (0x-prefixed, 40 hex chars).
///
/// Mixed-case input must carry a valid EIP-55 checksum. All-lowercase and
/// all-uppercase input is taken as is.
fn parse_address(index: usize, value: &str) -> Result<Address, RequestError> {
    let malformed = || RequestError::MalformedAddress {
        index,
        value: value.to_string(),
    };

    let hex_part = value.strip_prefix("0x").ok_or_else(malformed)?;
    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(malformed());
    }

    let has_lower = hex_part.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex_part.chars().any(|c| c.is_ascii_uppercase());

    if has_lower && has_upper {
        Address::parse_checksummed(value, None).map_err(|_| RequestError::BadChecksum {
            index,
            value: value.to_string(),
        })
    } else {
        value.parse().map_err(|_| malformed())
    }
}
