use ethers::contract::abigen;

abigen!(
    ACLRegistry,
    r#"[
        function grantRole(bytes32 role, address account) external
        function revokeRole(bytes32 role, address account) external
        function hasRole(bytes32 role, address account) external view returns (bool)
    ]"#
);
