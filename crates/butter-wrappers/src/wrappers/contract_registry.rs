use ethers::contract::abigen;

abigen!(
    ContractRegistry,
    r#"[
        function addContract(bytes32 _name, address _address, bytes32 _version) external
        function getContract(bytes32 _name) external view returns (address)
    ]"#
);
