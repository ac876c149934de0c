use ethers::contract::abigen;

abigen!(
    Faucet,
    r#"[
        function sendThreeCrv(uint256 amount, address recipient) external
    ]"#
);
