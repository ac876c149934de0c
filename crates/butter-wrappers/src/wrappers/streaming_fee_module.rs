use ethers::contract::abigen;

abigen!(
    StreamingFeeModule,
    r#"[
        struct FeeState { address feeRecipient; uint256 maxStreamingFeePercentage; uint256 streamingFeePercentage; uint256 lastStreamingFeeTimestamp; }
        function initialize(address _setToken, FeeState _settings) external
        function accrueFee(address _setToken) external
        function feeStates(address _setToken) external view returns (address feeRecipient, uint256 maxStreamingFeePercentage, uint256 streamingFeePercentage, uint256 lastStreamingFeeTimestamp)
        function getFee(address _setToken) external view returns (uint256)
        function updateFeeRecipient(address _setToken, address _newFeeRecipient) external
        function updateStreamingFee(address _setToken, uint256 _newFee) external
        function removeModule() external
        function controller() external view returns (address)
        event FeeActualized(address indexed _setToken, uint256 _managerFee, uint256 _protocolFee)
        event FeeRecipientUpdated(address indexed _setToken, address _newFeeRecipient)
        event StreamingFeeUpdated(address indexed _setToken, uint256 _newStreamingFee)
    ]"#,
    derives(serde::Deserialize, serde::Serialize)
);
