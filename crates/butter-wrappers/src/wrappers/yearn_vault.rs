use ethers::contract::abigen;

abigen!(
    YearnVault,
    r#"[
        function pricePerShare() external view returns (uint256)
        function token() external view returns (address)
        function balanceOf(address account) external view returns (uint256)
        function deposit(uint256 amount) external returns (uint256)
        function withdraw(uint256 maxShares) external returns (uint256)
    ]"#
);
