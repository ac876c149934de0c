//! The basket configuration: target NAV, the Set Protocol contracts to create
//! the token with, the modules to initialize and the component split.

use std::path::Path;

use ethers::types::{Address, U256};
use eyre::{eyre, Result};
use fixed_point::FixedPoint;
use fixed_point_macros::{fixed, uint256};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

fn serialize_u256<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

fn deserialize_u256<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    let dec_string: String = Deserialize::deserialize(deserializer)?;
    let u256 = U256::from_dec_str(&dec_string).map_err(serde::de::Error::custom)?;
    Ok(u256)
}

/// Writes a wad percent as its shortest decimal string, e.g. `"33.34"`.
fn serialize_percent<S: Serializer>(value: &FixedPoint, serializer: S) -> Result<S::Ok, S::Error> {
    let percent = value.to_string();
    serializer.serialize_str(percent.trim_end_matches('0').trim_end_matches('.'))
}

/// Reads a percent given as a JSON number (`25`, `33.34`) or a decimal
/// string into a wad, so `25` becomes `25e18`.
fn deserialize_percent<'de, D>(deserializer: D) -> Result<FixedPoint, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Percent {
        Number(serde_json::Number),
        Text(String),
    }

    let percent = match Percent::deserialize(deserializer)? {
        Percent::Number(number) => number.to_string(),
        Percent::Text(text) => text,
    };
    percent.parse().map_err(serde::de::Error::custom)
}

/// The settings the streaming fee module is initialized with. Percentages
/// are wads, so `0.01e18` is a 1% annual fee.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSettings {
    pub fee_recipient: Address,
    #[serde(
        serialize_with = "serialize_u256",
        deserialize_with = "deserialize_u256"
    )]
    pub max_streaming_fee_percentage: U256,
    #[serde(
        serialize_with = "serialize_u256",
        deserialize_with = "deserialize_u256"
    )]
    pub streaming_fee_percentage: U256,
    #[serde(
        serialize_with = "serialize_u256",
        deserialize_with = "deserialize_u256"
    )]
    pub last_streaming_fee_timestamp: U256,
}

impl FeeSettings {
    /// A 1% fee capped at 3%, paid to `fee_recipient`.
    pub fn new(fee_recipient: Address) -> Self {
        Self {
            fee_recipient,
            max_streaming_fee_percentage: uint256!(0.03e18),
            streaming_fee_percentage: uint256!(0.01e18),
            last_streaming_fee_timestamp: U256::zero(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicIssuanceModuleConfig {
    pub address: Address,
    #[serde(default)]
    pub pre_issue_hook: Option<Address>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingFeeModuleConfig {
    pub address: Address,
    #[serde(default)]
    pub settings: Option<FeeSettings>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Modules {
    #[serde(default)]
    pub basic_issuance_module: Option<BasicIssuanceModuleConfig>,
    #[serde(default)]
    pub streaming_fee_module: Option<StreamingFeeModuleConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Core {
    pub set_token_creator: Address,
    #[serde(default)]
    pub modules: Modules,
}

/// A basket component: the yield-bearing token held by the set and the
/// Curve pool whose virtual price values it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Percent of the target NAV held in this component, as a wad.
    #[serde(
        serialize_with = "serialize_percent",
        deserialize_with = "deserialize_percent"
    )]
    pub ratio: FixedPoint,
    pub address: Address,
    pub oracle: Address,
}

/// A module to initialize once the set token exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Module {
    BasicIssuance(Address),
    StreamingFee(Address),
}

impl Module {
    pub fn address(&self) -> Address {
        match self {
            Module::BasicIssuance(address) | Module::StreamingFee(address) => *address,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    #[serde(
        serialize_with = "serialize_u256",
        deserialize_with = "deserialize_u256"
    )]
    pub target_nav: U256,
    pub name: String,
    pub symbol: String,
    /// The manager of the created token. Defaults to the sender of the
    /// creation transaction.
    #[serde(default)]
    pub manager: Option<Address>,
    pub core: Core,
    /// Components in the order they are passed to `create`.
    pub components: IndexMap<String, Component>,
}

/// The `ADDR_*` environment the default configuration is built from.
#[derive(Clone, Debug, Deserialize)]
pub struct SetTokenEnv {
    pub set_set_token_creator: Address,
    pub set_basic_issuance_module: Address,
    pub set_streaming_fee_module: Address,
    pub set_streaming_fee_module_fee_recipient: Address,
    pub yearn_crvdusd: Address,
    pub curve_crvdusd: Address,
    pub yearn_crvfrax: Address,
    pub curve_crvfrax: Address,
    pub yearn_crvusdn: Address,
    pub curve_crvusdn: Address,
    pub yearn_crvust: Address,
    pub curve_crvust: Address,
}

impl SetTokenEnv {
    pub fn from_env() -> Result<Self> {
        envy::prefixed("ADDR_")
            .from_env::<Self>()
            .map_err(|e| eyre!("failed to read ADDR_* environment: {}", e))
    }
}

impl From<SetTokenEnv> for Configuration {
    /// The High-Yield Small Cap Stablecoin Index: a 250 USD NAV split evenly
    /// across four Yearn crv vaults, with issuance and a 1% streaming fee.
    fn from(env: SetTokenEnv) -> Self {
        let component = |address, oracle| Component {
            ratio: fixed!(25e18),
            address,
            oracle,
        };
        Self {
            target_nav: uint256!(250e18),
            name: "High-Yield Small Cap Stablecoin Index".to_string(),
            symbol: "HYSI".to_string(),
            manager: None,
            core: Core {
                set_token_creator: env.set_set_token_creator,
                modules: Modules {
                    basic_issuance_module: Some(BasicIssuanceModuleConfig {
                        address: env.set_basic_issuance_module,
                        pre_issue_hook: None,
                    }),
                    streaming_fee_module: Some(StreamingFeeModuleConfig {
                        address: env.set_streaming_fee_module,
                        settings: Some(FeeSettings::new(
                            env.set_streaming_fee_module_fee_recipient,
                        )),
                    }),
                },
            },
            components: IndexMap::from([
                (
                    "ycrvDUSD".to_string(),
                    component(env.yearn_crvdusd, env.curve_crvdusd),
                ),
                (
                    "ycrvFRAX".to_string(),
                    component(env.yearn_crvfrax, env.curve_crvfrax),
                ),
                (
                    "ycrvUSDN".to_string(),
                    component(env.yearn_crvusdn, env.curve_crvusdn),
                ),
                (
                    "ycrvUST".to_string(),
                    component(env.yearn_crvust, env.curve_crvust),
                ),
            ]),
        }
    }
}

impl Configuration {
    /// Builds the default configuration from the `ADDR_*` environment.
    pub fn from_env() -> Result<Self> {
        Ok(SetTokenEnv::from_env()?.into())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| eyre!("failed to open {}: {}", path.display(), e))?;
        let configuration: Self = serde_json::from_reader(file)
            .map_err(|e| eyre!("failed to parse {}: {}", path.display(), e))?;
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn target_nav(&self) -> FixedPoint {
        self.target_nav.into()
    }

    /// Checks the configuration before anything is sent on chain.
    pub fn validate(&self) -> Result<()> {
        if self.components.is_empty() {
            return Err(eyre!("configuration has no components"));
        }
        let mut total = fixed!(0);
        for (name, component) in &self.components {
            if component.ratio.is_zero() {
                return Err(eyre!("component {} has a ratio of zero", name));
            }
            if component.ratio > fixed!(100e18) {
                return Err(eyre!(
                    "component {} is {} percent of the NAV",
                    name,
                    component.ratio
                ));
            }
            if component.address.is_zero() || component.oracle.is_zero() {
                return Err(eyre!("component {} is missing an address", name));
            }
            total += component.ratio;
        }
        if total != fixed!(100e18) {
            return Err(eyre!(
                "component ratios must add up to 100 percent, got {}",
                total
            ));
        }
        if self.core.set_token_creator.is_zero() {
            return Err(eyre!("missing SetTokenCreator address"));
        }
        if let Some(module) = &self.core.modules.streaming_fee_module {
            if let Some(settings) = &module.settings {
                if settings.streaming_fee_percentage > settings.max_streaming_fee_percentage {
                    return Err(eyre!(
                        "streaming fee {} exceeds the maximum {}",
                        FixedPoint::from(settings.streaming_fee_percentage),
                        FixedPoint::from(settings.max_streaming_fee_percentage)
                    ));
                }
            }
        }
        if self.target_nav.is_zero() {
            return Err(eyre!("target NAV must be positive"));
        }
        Ok(())
    }

    /// The configured modules in the order they are initialized.
    pub fn modules(&self) -> Vec<Module> {
        let modules = &self.core.modules;
        modules
            .basic_issuance_module
            .as_ref()
            .map(|m| Module::BasicIssuance(m.address))
            .into_iter()
            .chain(
                modules
                    .streaming_fee_module
                    .as_ref()
                    .map(|m| Module::StreamingFee(m.address)),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_vars() -> Vec<(String, String)> {
        [
            ("ADDR_SET_SET_TOKEN_CREATOR", "0x00000000000000000000000000000000000000c1"),
            ("ADDR_SET_BASIC_ISSUANCE_MODULE", "0x00000000000000000000000000000000000000b1"),
            ("ADDR_SET_STREAMING_FEE_MODULE", "0x00000000000000000000000000000000000000f1"),
            (
                "ADDR_SET_STREAMING_FEE_MODULE_FEE_RECIPIENT",
                "0x00000000000000000000000000000000000000fe",
            ),
            ("ADDR_YEARN_CRVDUSD", "0x0000000000000000000000000000000000000011"),
            ("ADDR_CURVE_CRVDUSD", "0x0000000000000000000000000000000000000012"),
            ("ADDR_YEARN_CRVFRAX", "0x0000000000000000000000000000000000000021"),
            ("ADDR_CURVE_CRVFRAX", "0x0000000000000000000000000000000000000022"),
            ("ADDR_YEARN_CRVUSDN", "0x0000000000000000000000000000000000000031"),
            ("ADDR_CURVE_CRVUSDN", "0x0000000000000000000000000000000000000032"),
            ("ADDR_YEARN_CRVUST", "0x0000000000000000000000000000000000000041"),
            ("ADDR_CURVE_CRVUST", "0x0000000000000000000000000000000000000042"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn default_configuration() -> Result<Configuration> {
        let env: SetTokenEnv = envy::prefixed("ADDR_").from_iter(env_vars())?;
        Ok(env.into())
    }

    #[test]
    fn test_default_configuration() -> Result<()> {
        let configuration = default_configuration()?;
        configuration.validate()?;

        assert_eq!(configuration.target_nav(), fixed!(250e18));
        assert_eq!(configuration.symbol, "HYSI");
        assert_eq!(
            configuration.components.keys().collect::<Vec<_>>(),
            vec!["ycrvDUSD", "ycrvFRAX", "ycrvUSDN", "ycrvUST"]
        );
        assert_eq!(
            configuration.components["ycrvUSDN"].oracle,
            Address::from_low_u64_be(0x32)
        );

        let settings = configuration
            .core
            .modules
            .streaming_fee_module
            .as_ref()
            .and_then(|m| m.settings.clone())
            .ok_or_else(|| eyre!("missing fee settings"))?;
        assert_eq!(settings.fee_recipient, Address::from_low_u64_be(0xfe));
        assert_eq!(settings.max_streaming_fee_percentage, uint256!(0.03e18));
        assert_eq!(settings.streaming_fee_percentage, uint256!(0.01e18));
        assert_eq!(settings.last_streaming_fee_timestamp, U256::zero());

        Ok(())
    }

    #[test]
    fn test_missing_env_var_fails() {
        let mut vars = env_vars();
        vars.retain(|(k, _)| k != "ADDR_CURVE_CRVUST");
        assert!(envy::prefixed("ADDR_")
            .from_iter::<_, SetTokenEnv>(vars)
            .is_err());
    }

    #[test]
    fn test_module_order() -> Result<()> {
        let mut configuration = default_configuration()?;
        assert_eq!(
            configuration.modules(),
            vec![
                Module::BasicIssuance(Address::from_low_u64_be(0xb1)),
                Module::StreamingFee(Address::from_low_u64_be(0xf1)),
            ]
        );

        configuration.core.modules.basic_issuance_module = None;
        assert_eq!(
            configuration
                .modules()
                .iter()
                .map(Module::address)
                .collect::<Vec<_>>(),
            vec![Address::from_low_u64_be(0xf1)]
        );

        Ok(())
    }

    #[test]
    fn test_validate() -> Result<()> {
        let mut configuration = default_configuration()?;
        configuration
            .components
            .get_mut("ycrvFRAX")
            .ok_or_else(|| eyre!("missing component"))?
            .ratio = fixed!(30e18);
        assert!(configuration.validate().is_err());

        let mut configuration = default_configuration()?;
        configuration.components.clear();
        assert!(configuration.validate().is_err());

        let mut configuration = default_configuration()?;
        if let Some(module) = configuration.core.modules.streaming_fee_module.as_mut() {
            module.settings = Some(FeeSettings {
                streaming_fee_percentage: uint256!(0.05e18),
                ..FeeSettings::new(Address::from_low_u64_be(1))
            });
        }
        assert!(configuration.validate().is_err());

        let mut configuration = default_configuration()?;
        configuration.core.set_token_creator = Address::zero();
        assert!(configuration.validate().is_err());

        Ok(())
    }

    #[test]
    fn test_json_file() -> Result<()> {
        let configuration = default_configuration()?;
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("hysi.json");
        std::fs::write(&path, serde_json::to_string_pretty(&configuration)?)?;

        // U256 values are written as decimal strings.
        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(json["targetNav"], "250000000000000000000");
        assert_eq!(
            json["core"]["modules"]["streamingFeeModule"]["settings"]["streamingFeePercentage"],
            "10000000000000000"
        );

        assert_eq!(Configuration::from_json_file(&path)?, configuration);

        Ok(())
    }

    fn configuration_with_components(components: &str) -> Result<Configuration> {
        let json = format!(
            r#"{{
                "targetNav": "250000000000000000000",
                "name": "Test Index",
                "symbol": "TEST",
                "core": {{ "setTokenCreator": "0x00000000000000000000000000000000000000c1" }},
                "components": {}
            }}"#,
            components
        );
        Ok(serde_json::from_str(&json)?)
    }

    fn component_json(name: &str, ratio: &str, n: u8) -> String {
        format!(
            r#""{}": {{
                "ratio": {},
                "address": "0x00000000000000000000000000000000000000{:02x}",
                "oracle": "0x00000000000000000000000000000000000000{:02x}"
            }}"#,
            name,
            ratio,
            n,
            n + 1
        )
    }

    #[test]
    fn test_ratios_near_u32_max() -> Result<()> {
        // 4294967295 + 101 wraps to 100 in 32 bits.
        let configuration = configuration_with_components(&format!(
            "{{ {}, {} }}",
            component_json("a", "4294967295", 0x10),
            component_json("b", "101", 0x20)
        ))?;
        assert_eq!(configuration.components["a"].ratio, fixed!(4294967295e18));
        assert!(configuration.validate().is_err());

        // A single component over 100 percent is rejected on its own.
        let mut configuration = default_configuration()?;
        configuration
            .components
            .get_mut("ycrvDUSD")
            .ok_or_else(|| eyre!("missing component"))?
            .ratio = fixed!(175e18);
        let err = configuration
            .validate()
            .err()
            .ok_or_else(|| eyre!("expected an error"))?;
        assert!(err.to_string().contains("percent of the NAV"));

        Ok(())
    }

    #[test]
    fn test_fractional_ratios() -> Result<()> {
        let configuration = configuration_with_components(&format!(
            "{{ {}, {}, {} }}",
            component_json("a", "33.33", 0x10),
            component_json("b", "\"33.33\"", 0x20),
            component_json("c", "33.34", 0x30)
        ))?;
        configuration.validate()?;
        assert_eq!(configuration.components["a"].ratio, fixed!(33.33e18));
        assert_eq!(configuration.components["b"].ratio, fixed!(33.33e18));
        assert_eq!(configuration.components["c"].ratio, fixed!(33.34e18));

        // Ratios are written back in their shortest form.
        let json = serde_json::to_value(&configuration)?;
        assert_eq!(json["components"]["c"]["ratio"], "33.34");
        let json = serde_json::to_value(default_configuration()?)?;
        assert_eq!(json["components"]["ycrvFRAX"]["ratio"], "25");

        // Thirds that don't add up to 100 are rejected.
        let configuration = configuration_with_components(&format!(
            "{{ {}, {}, {} }}",
            component_json("a", "33.33", 0x10),
            component_json("b", "33.33", 0x20),
            component_json("c", "33.33", 0x30)
        ))?;
        assert!(configuration.validate().is_err());

        assert!(configuration_with_components(&format!(
            "{{ {} }}",
            component_json("a", "-100", 0x10)
        ))
        .is_err());

        Ok(())
    }

    #[test]
    fn test_component_order_is_kept() -> Result<()> {
        let configuration = configuration_with_components(&format!(
            "{{ {}, {}, {} }}",
            component_json("ycrvRAI", "50", 0x10),
            component_json("ycrvALUSD", "25", 0x20),
            component_json("ycrvFRAX", "25", 0x30)
        ))?;
        configuration.validate()?;
        assert_eq!(
            configuration.components.keys().collect::<Vec<_>>(),
            vec!["ycrvRAI", "ycrvALUSD", "ycrvFRAX"]
        );
        assert_eq!(
            configuration
                .components
                .values()
                .map(|component| component.address)
                .collect::<Vec<_>>(),
            vec![
                Address::from_low_u64_be(0x10),
                Address::from_low_u64_be(0x20),
                Address::from_low_u64_be(0x30)
            ]
        );
        Ok(())
    }
}
