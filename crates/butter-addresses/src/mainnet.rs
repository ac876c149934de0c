use ethers::types::Address;

lazy_static! {
    // Set Protocol v2.
    pub static ref SET_TOKEN_CREATOR: Address = "0xeF72D3278dC3Eba6Dc2614965308d1435FFd748a".parse().unwrap();
    pub static ref SET_BASIC_ISSUANCE_MODULE: Address = "0xd8EF3cACe8b4907117a45B0b125c68560532F94D".parse().unwrap();
    pub static ref SET_STREAMING_FEE_MODULE: Address = "0x08f866c74205617B6F3903EF481798EcED10cDEC".parse().unwrap();

    // Routers and registries the faucet swaps through.
    pub static ref UNISWAP_ROUTER: Address = "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D".parse().unwrap();
    pub static ref CURVE_ADDRESS_PROVIDER: Address = "0x0000000022D53366457F9d5E68Ec105046FC4383".parse().unwrap();
    pub static ref CURVE_FACTORY_METAPOOL_DEPOSIT_ZAP: Address = "0xA79828DF1850E8a3A3064576f380D90aECDD3359".parse().unwrap();

    // Curve 3pool.
    pub static ref THREE_CRV: Address = "0x6c3F90f043a72FA612cbac8115EE7e52BDe6E490".parse().unwrap();
    pub static ref THREE_POOL: Address = "0xbEbc44782C7dB0a1A60Cb6fe97d0b483032FF1C7".parse().unwrap();

    // Yearn yCRV vaults.
    pub static ref Y_CRV_FRAX: Address = "0xB4AdA607B9d6b2c9Ee07A275e9616B84AC560139".parse().unwrap();
    pub static ref Y_CRV_RAI: Address = "0x2D5D4869381C4Fce34789BC1D38aCCe747E295AE".parse().unwrap();
    pub static ref Y_CRV_MUSD: Address = "0x8cc94ccd0f3841a468184aCA3Cc478D2148E1757".parse().unwrap();
    pub static ref Y_CRV_ALUSD: Address = "0xA74d4B67b3368E83797a35382AFB776bAAE4F5C8".parse().unwrap();

    // Curve LP tokens.
    pub static ref CRV_FRAX: Address = "0xd632f22692FaC7611d2AA1C0D552930D43CAEd3B".parse().unwrap();
    pub static ref CRV_RAI: Address = "0x6BA5b4e438FA0aAf7C1bD179285aF65d13bD3D90".parse().unwrap();
    pub static ref CRV_MUSD: Address = "0x1AEf73d49Dedc4b1778d0706583995958Dc862e6".parse().unwrap();
    pub static ref CRV_ALUSD: Address = "0x43b4FdFD4Ff969587185cDB6f0BD875c5Fc83f8c".parse().unwrap();

    // Curve metapools.
    pub static ref FRAX_METAPOOL: Address = "0xd632f22692FaC7611d2AA1C0D552930D43CAEd3B".parse().unwrap();
    pub static ref RAI_METAPOOL: Address = "0x618788357D0EBd8A37e763ADab3bc575D54c2C7d".parse().unwrap();
    pub static ref MUSD_METAPOOL: Address = "0x8474DdbE98F5aA3179B3B3F5942D724aFcdec9f6".parse().unwrap();
    pub static ref ALUSD_METAPOOL: Address = "0x43b4FdFD4Ff969587185cDB6f0BD875c5Fc83f8c".parse().unwrap();

    // Synthetix.
    pub static ref SYNTHETIX: Address = "0xC011a73ee8576Fb46F5E1c5751cA3B9Fe0af2a6F".parse().unwrap();
    pub static ref S_USD: Address = "0x57Ab1ec28D129707052df4dF418D58a2D46d5f51".parse().unwrap();
    pub static ref S_EUR: Address = "0xd71ecff9342a5ced620049e616c5035f1db98620".parse().unwrap();
    pub static ref S_GBP: Address = "0x97fe22e7341a0cd8db6f6c021a24dc8f4dad855f".parse().unwrap();
    pub static ref S_AUD: Address = "0xf48e200eaf9906362bb1442fca31e0835773b8b4".parse().unwrap();
    pub static ref S_JPY: Address = "0xf6b1c627e95bfc3c1b4c9b825a032ff0fbf3e07d".parse().unwrap();
    pub static ref SUSD_WHALE: Address = "0xC8C2b727d864CC75199f5118F0943d2087fB543b".parse().unwrap();
}
