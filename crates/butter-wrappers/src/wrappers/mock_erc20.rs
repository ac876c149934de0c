use ethers::contract::abigen;

abigen!(
    MockERC20,
    r#"[
        function mint(address to, uint256 amount) external
        function balanceOf(address account) external view returns (uint256)
        function approve(address spender, uint256 amount) external returns (bool)
    ]"#
);
