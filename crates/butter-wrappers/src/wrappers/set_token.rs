use ethers::contract::abigen;

abigen!(
    SetToken,
    r#"[
        function name() external view returns (string)
        function symbol() external view returns (string)
        function manager() external view returns (address)
        function totalSupply() external view returns (uint256)
        function balanceOf(address account) external view returns (uint256)
        function approve(address spender, uint256 amount) external returns (bool)
        function getComponents() external view returns (address[])
        function getModules() external view returns (address[])
        function getDefaultPositionRealUnit(address _component) external view returns (int256)
        function isInitializedModule(address _module) external view returns (bool)
        function isPendingModule(address _module) external view returns (bool)
    ]"#
);
