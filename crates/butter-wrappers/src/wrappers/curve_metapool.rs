use ethers::contract::abigen;

abigen!(
    CurveMetapool,
    r#"[
        function get_virtual_price() external view returns (uint256)
        function coins(uint256 i) external view returns (address)
        function balanceOf(address account) external view returns (uint256)
        function calc_token_amount(uint256[2] amounts, bool is_deposit) external view returns (uint256)
        function add_liquidity(uint256[2] amounts, uint256 min_mint_amount) external returns (uint256)
        function remove_liquidity_one_coin(uint256 token_amount, int128 i, uint256 min_amount) external returns (uint256)
    ]"#
);
