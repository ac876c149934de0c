use ethers::contract::abigen;

abigen!(
    BasicIssuanceModule,
    r#"[
        function initialize(address _setToken, address _preIssueHook) external
        function issue(address _setToken, uint256 _quantity, address _to) external
        function redeem(address _setToken, uint256 _quantity, address _to) external
        function getRequiredComponentUnitsForIssue(address _setToken, uint256 _quantity) external view returns (address[], uint256[])
        function managerIssuanceHook(address _setToken) external view returns (address)
        function controller() external view returns (address)
        event SetTokenIssued(address indexed _setToken, address indexed _issuer, address indexed _to, address _hookContract, uint256 _quantity)
        event SetTokenRedeemed(address indexed _setToken, address indexed _redeemer, address indexed _to, uint256 _quantity)
    ]"#
);
