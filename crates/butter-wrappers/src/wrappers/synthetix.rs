use ethers::contract::abigen;

abigen!(
    Synthetix,
    r#"[
        function exchangeAtomically(bytes32 sourceCurrencyKey, uint256 sourceAmount, bytes32 destinationCurrencyKey, bytes32 trackingCode) external returns (uint256 amountReceived)
    ]"#
);
