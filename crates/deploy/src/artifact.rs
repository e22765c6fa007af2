//! Compiled contract artifacts.
//!
//! Artifacts are looked up by contract name in a build output directory. Both the
//! Hardhat layout (`artifacts/<path>/<File>.sol/<Name>.json` with a hex string
//! `bytecode`) and the Foundry layout (`out/<File>.sol/<Name>.json` with
//! `bytecode.object`) are understood.

use std::path::{Path, PathBuf};

use alloy_core::{json_abi::JsonAbi, primitives::Bytes};
use serde::Deserialize;

/// Directory holding Hardhat build metadata, never searched.
const BUILD_INFO_DIR: &str = "build-info";

/// Suffix of Hardhat debug artifacts, which are not contract artifacts.
const DEBUG_SUFFIX: &str = ".dbg.json";

/// Reasons a contract artifact could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("contract name is empty")]
    EmptyName,

    #[error("artifacts directory not found: {} (was the project compiled?)", .0.display())]
    MissingDirectory(PathBuf),

    #[error("no artifact for contract '{contract}' under {}", .root.display())]
    NotFound { contract: String, root: PathBuf },

    #[error(
        "contract name '{contract}' is ambiguous, use a fully qualified name (one of: {})",
        .candidates.join(", ")
    )]
    Ambiguous {
        contract: String,
        candidates: Vec<String>,
    },

    #[error("failed to read artifact {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("contract '{0}' has no creation bytecode (abstract contract or interface?)")]
    NotDeployable(String),

    #[error("contract '{0}' needs library linking before it can be deployed")]
    UnlinkedLibraries(String),

    #[error("contract '{0}' has malformed bytecode")]
    InvalidBytecode(String),
}

/// The deployable template of a contract: its ABI and creation bytecode.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractArtifact {
    pub contract_name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

/// A place contract artifacts can be loaded from.
pub trait ArtifactSource {
    /// Load the artifact of a contract by name.
    fn load(&self, contract: &str) -> Result<ContractArtifact, ArtifactError>;
}

/// Artifact file as written by Hardhat or Foundry. Only the fields needed for deployment.
#[derive(Debug, Deserialize)]
struct RawArtifact {
    abi: JsonAbi,
    bytecode: RawBytecode,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    /// Hardhat: `"bytecode": "0x6080..."`.
    Hex(String),
    /// Foundry: `"bytecode": { "object": "0x6080...", ... }`.
    Object { object: String },
}

impl RawBytecode {
    fn as_str(&self) -> &str {
        match self {
            RawBytecode::Hex(hex) => hex,
            RawBytecode::Object { object } => object,
        }
    }
}

impl ContractArtifact {
    /// Parse an artifact file's JSON content.
    pub fn from_json(contract: &str, path: &Path, content: &str) -> Result<Self, ArtifactError> {
        let raw: RawArtifact =
            serde_json::from_str(content).map_err(|source| ArtifactError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let bytecode = parse_bytecode(contract, raw.bytecode.as_str())?;

        Ok(Self {
            contract_name: contract.to_string(),
            abi: raw.abi,
            bytecode,
        })
    }
}

fn parse_bytecode(contract: &str, code: &str) -> Result<Bytes, ArtifactError> {
    let code = code.trim();
    let hex_part = code.strip_prefix("0x").unwrap_or(code);

    if hex_part.is_empty() {
        return Err(ArtifactError::NotDeployable(contract.to_string()));
    }

    // Unresolved library references look like `__$<hash>$__` (or `__LibName___` in older solc).
    if hex_part.contains("__") {
        return Err(ArtifactError::UnlinkedLibraries(contract.to_string()));
    }

    hex::decode(hex_part)
        .map(Bytes::from)
        .map_err(|_| ArtifactError::InvalidBytecode(contract.to_string()))
}

/// Artifacts laid out on disk by a Solidity toolchain.
#[derive(Debug, Clone)]
pub struct ArtifactDir {
    root: PathBuf,
}

impl ArtifactDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the artifact files of `contract`.
    ///
    /// A fully qualified name (`src/Token.sol:Token`) maps to the Hardhat path
    /// `<root>/src/Token.sol/Token.json`, or failing that to the Foundry path
    /// `<root>/Token.sol/Token.json`. A bare name matches every `<name>.json` in the
    /// tree. Symlinked directories are not followed.
    fn candidates(&self, contract: &str) -> Result<Vec<PathBuf>, ArtifactError> {
        if let Some((source, name)) = contract.rsplit_once(':') {
            let file_name = format!("{}.json", name);
            let hardhat = self.root.join(source).join(&file_name);
            let foundry = Path::new(source)
                .file_name()
                .map(|source_file| self.root.join(source_file).join(&file_name));

            return Ok(std::iter::once(hardhat)
                .chain(foundry)
                .find(|path| path.is_file())
                .into_iter()
                .collect());
        }

        let file_name = format!("{}.json", contract);
        let mut found = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let io_error = |source| ArtifactError::Io {
                path: dir.clone(),
                source,
            };
            let entries = std::fs::read_dir(&dir).map_err(io_error)?;

            for entry in entries {
                let entry = entry.map_err(io_error)?;
                let file_type = entry.file_type().map_err(io_error)?;
                let path = entry.path();

                if file_type.is_dir() {
                    if entry.file_name() != BUILD_INFO_DIR {
                        pending.push(path);
                    }
                    continue;
                }

                if file_type.is_symlink() && !path.is_file() {
                    tracing::trace!(path = %path.display(), "Skipping symlinked directory");
                    continue;
                }

                let name = entry.file_name();
                let name = name.to_string_lossy();
                if name == file_name && !name.ends_with(DEBUG_SUFFIX) {
                    found.push(path);
                }
            }
        }

        found.sort();
        Ok(found)
    }
}

impl ArtifactSource for ArtifactDir {
    fn load(&self, contract: &str) -> Result<ContractArtifact, ArtifactError> {
        let contract = contract.trim();
        if contract.is_empty() {
            return Err(ArtifactError::EmptyName);
        }

        if !self.root.is_dir() {
            return Err(ArtifactError::MissingDirectory(self.root.clone()));
        }

        let mut candidates = self.candidates(contract)?;
        let path = match candidates.len() {
            0 => {
                return Err(ArtifactError::NotFound {
                    contract: contract.to_string(),
                    root: self.root.clone(),
                });
            }
            1 => candidates.remove(0),
            _ => {
                return Err(ArtifactError::Ambiguous {
                    contract: contract.to_string(),
                    candidates: candidates
                        .iter()
                        .map(|path| qualified_name(&self.root, path, contract))
                        .collect(),
                });
            }
        };

        tracing::debug!(contract = %contract, path = %path.display(), "Loading contract artifact");

        let content = std::fs::read_to_string(&path).map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?;

        let name = contract.rsplit_once(':').map_or(contract, |(_, name)| name);
        ContractArtifact::from_json(name, &path, &content)
    }
}

/// Render `<root>/contracts/Token.sol/Token.json` as `contracts/Token.sol:Token`.
fn qualified_name(root: &Path, path: &Path, contract: &str) -> String {
    let source = path
        .parent()
        .and_then(|parent| parent.strip_prefix(root).ok())
        .map(|parent| parent.display().to_string())
        .unwrap_or_default();
    format!("{}:{}", source, contract)
}
