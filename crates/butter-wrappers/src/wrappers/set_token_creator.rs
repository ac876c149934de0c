use ethers::contract::abigen;

abigen!(
    SetTokenCreator,
    r#"[
        function create(address[] _components, int256[] _units, address[] _modules, address _manager, string _name, string _symbol) external returns (address)
        function controller() external view returns (address)
        event SetTokenCreated(address indexed _setToken, address _manager, string _name, string _symbol)
    ]"#
);
