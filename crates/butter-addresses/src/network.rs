use std::{fmt, str::FromStr};

use eyre::{eyre, Error, Result};
use serde::{Deserialize, Serialize};

/// The networks the deployment tooling knows how to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    /// A local anvil node, optionally forking mainnet.
    Anvil,
    Localhost,
    Rinkeby,
    Kovan,
    Goerli,
    Polygon,
    Mumbai,
    Arbitrum,
    Bsc,
}

impl Network {
    pub fn chain_id(&self) -> Option<u64> {
        match self {
            Network::Mainnet => Some(1),
            Network::Anvil | Network::Localhost => Some(1337),
            Network::Rinkeby => Some(4),
            Network::Kovan => Some(42),
            Network::Goerli => Some(5),
            Network::Polygon => Some(137),
            Network::Mumbai => Some(80001),
            Network::Arbitrum => Some(42161),
            Network::Bsc => None,
        }
    }

    /// Resolves the RPC url for the network. An explicit `rpc_url` always
    /// wins; otherwise Infura networks need a project id.
    pub fn rpc_url(
        &self,
        rpc_url: Option<&str>,
        infura_project_id: Option<&str>,
    ) -> Result<String> {
        if let Some(url) = rpc_url {
            return Ok(url.to_string());
        }
        let infura = |subdomain: &str| {
            infura_project_id
                .map(|id| format!("https://{}.infura.io/v3/{}", subdomain, id))
                .ok_or_else(|| eyre!("{} needs RPC_URL or INFURA_PROJECT_ID", self))
        };
        match self {
            Network::Mainnet => infura("mainnet"),
            Network::Rinkeby => infura("rinkeby"),
            Network::Kovan => infura("kovan"),
            Network::Goerli => infura("goerli"),
            Network::Polygon => infura("polygon-mainnet"),
            Network::Mumbai => infura("polygon-mumbai"),
            Network::Arbitrum => infura("arbitrum-mainnet"),
            Network::Anvil | Network::Localhost => Ok("http://localhost:8545".to_string()),
            Network::Bsc => Err(eyre!("bsc has no default rpc url; set RPC_URL")),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::Mainnet => "mainnet",
            Network::Anvil => "anvil",
            Network::Localhost => "localhost",
            Network::Rinkeby => "rinkeby",
            Network::Kovan => "kovan",
            Network::Goerli => "goerli",
            Network::Polygon => "polygon",
            Network::Mumbai => "mumbai",
            Network::Arbitrum => "arbitrum",
            Network::Bsc => "bsc",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "anvil" | "hardhat" => Ok(Network::Anvil),
            "localhost" => Ok(Network::Localhost),
            "rinkeby" => Ok(Network::Rinkeby),
            "kovan" => Ok(Network::Kovan),
            "goerli" | "gorli" => Ok(Network::Goerli),
            "polygon" => Ok(Network::Polygon),
            "mumbai" => Ok(Network::Mumbai),
            "arbitrum" => Ok(Network::Arbitrum),
            "bsc" => Ok(Network::Bsc),
            _ => Err(eyre!("unknown network {:?}", s)),
        }
    }
}
