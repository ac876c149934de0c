use ethers::contract::abigen;

abigen!(
    ButterBatchProcessing,
    r#"[
        function depositForMint(uint256 _amount, address _depositFor) external
        function depositForRedeem(uint256 _amount) external
        function batchMint() external
        function batchRedeem() external
        function claim(bytes32 _batchId, address _claimFor) external
        function moveUnclaimedDepositsIntoCurrentBatch(bytes32[] _batchIds, uint256[] _shares, uint8 _batchType) external
        function currentMintBatchId() external view returns (bytes32)
        function currentRedeemBatchId() external view returns (bytes32)
        function batches(bytes32 _batchId) external view returns (uint8 batchType, bytes32 batchId, bool claimable, uint256 unclaimedShares, uint256 suppliedTokenBalance, uint256 claimableTokenBalance, address suppliedTokenAddress, address claimableTokenAddress)
        function accountBalances(bytes32 _batchId, address _account) external view returns (uint256)
        function getAccountBatches(address _account) external view returns (bytes32[])
        function valueOfComponents(address[] _tokenAddresses, uint256[] _quantities) external view returns (uint256)
        function setApprovals() external
        function setMintSlippage(uint256 _slippage) external
        function setRedeemSlippage(uint256 _slippage) external
    ]"#
);
