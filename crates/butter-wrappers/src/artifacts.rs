//! Loads compiled contract artifacts so that contracts without a checked-in
//! wrapper (the Butter batch contract, the registries, the staking contracts)
//! can be deployed from their bytecode.
//!
//! Both Hardhat artifacts (`"bytecode": "0x.."`) and Foundry artifacts
//! (`"bytecode": { "object": "0x.." }`) are understood.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use ethers::{
    abi::{Abi, Tokenize},
    contract::{Contract, ContractFactory},
    providers::Middleware,
    types::Bytes,
};
use eyre::{eyre, Result};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Hardhat(Bytes),
    Foundry { object: Bytes },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    contract_name: Option<String>,
    abi: Abi,
    bytecode: RawBytecode,
}

/// A compiled contract: its ABI and creation bytecode.
#[derive(Clone, Debug)]
pub struct Artifact {
    pub name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
}

impl Artifact {
    /// Reads an artifact file. The contract name falls back to the file stem
    /// for Foundry artifacts, which don't record it.
    pub fn load(path: &Path) -> Result<Self> {
        let raw: RawArtifact = serde_json::from_reader(fs::File::open(path)?)
            .map_err(|e| eyre!("failed to parse artifact {}: {}", path.display(), e))?;
        let name = match raw.contract_name {
            Some(name) => name,
            None => path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .ok_or_else(|| eyre!("artifact path {} has no file stem", path.display()))?
                .to_string(),
        };
        let bytecode = match raw.bytecode {
            RawBytecode::Hardhat(bytecode) => bytecode,
            RawBytecode::Foundry { object } => object,
        };
        if bytecode.is_empty() {
            return Err(eyre!(
                "artifact {} has no bytecode; is {} abstract?",
                path.display(),
                name
            ));
        }
        Ok(Self {
            name,
            abi: raw.abi,
            bytecode,
        })
    }

    /// Deploys the artifact with the given constructor arguments and waits
    /// for the deployment to be mined.
    pub async fn deploy<M: Middleware + 'static, T: Tokenize>(
        &self,
        client: Arc<M>,
        args: T,
    ) -> Result<Contract<M>> {
        let factory = ContractFactory::new(self.abi.clone(), self.bytecode.clone(), client);
        let contract = factory
            .deploy(args)
            .map_err(|e| eyre!("failed to encode {} constructor: {}", self.name, e))?
            .send()
            .await
            .map_err(|e| eyre!("failed to deploy {}: {}", self.name, e))?;
        Ok(contract)
    }
}

/// A directory of compiled artifacts, searched recursively by contract name.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Finds and loads `<name>.json` anywhere below the root. Hardhat's debug
    /// files (`<name>.dbg.json`) never match since their stem differs.
    pub fn get(&self, name: &str) -> Result<Artifact> {
        let path = find(&self.root, &format!("{}.json", name))?.ok_or_else(|| {
            eyre!(
                "couldn't find an artifact for {} under {}",
                name,
                self.root.display()
            )
        })?;
        Artifact::load(&path)
    }
}

fn find(dir: &Path, file_name: &str) -> Result<Option<PathBuf>> {
    let mut entries = fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.path());
    for entry in entries {
        let path = entry.path();
        if path.is_file() {
            if path.file_name().and_then(|n| n.to_str()) == Some(file_name) {
                return Ok(Some(path));
            }
        } else if let Some(found) = find(&path, file_name)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}
