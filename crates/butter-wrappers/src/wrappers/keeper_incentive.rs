use ethers::contract::abigen;

abigen!(
    KeeperIncentive,
    r#"[
        function createIncentive(bytes32 _contractName, uint256 _reward, bool _enabled, bool _openToEveryone) external
        function addControllerContract(bytes32 _contractName, address contract_) external
    ]"#
);
