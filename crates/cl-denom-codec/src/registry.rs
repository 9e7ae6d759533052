use cl_api_types::DenomMetadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeDenom {
    pub denom: &'static str,
    pub symbol: &'static str,
    pub decimals: u32,
    pub display_name: &'static str,
}

impl NativeDenom {
    pub fn metadata(&self) -> DenomMetadata {
        DenomMetadata {
            denom: self.denom.to_owned(),
            display_name: self.display_name.to_owned(),
            symbol: self.symbol.to_owned(),
            decimals: self.decimals,
            is_ibc: false,
            ibc_hash: None,
        }
    }
}

const fn native(
    denom: &'static str,
    symbol: &'static str,
    decimals: u32,
    display_name: &'static str,
) -> NativeDenom {
    NativeDenom {
        denom,
        symbol,
        decimals,
        display_name,
    }
}

/// Well-known native denominations across the Cosmos ecosystem.
///
/// Also consulted when an IBC trace unwinds to a base denom that is native
/// to some counterparty chain.
pub const NATIVE_DENOMS: &[NativeDenom] = &[
    native("uatom", "ATOM", 6, "Cosmos Hub"),
    native("uosmo", "OSMO", 6, "Osmosis"),
    native("uion", "ION", 6, "Ion"),
    native("ujuno", "JUNO", 6, "Juno"),
    native("uakt", "AKT", 6, "Akash"),
    native("ustars", "STARS", 6, "Stargaze"),
    native("uscrt", "SCRT", 6, "Secret"),
    native("inj", "INJ", 18, "Injective"),
    native("aevmos", "EVMOS", 18, "Evmos"),
    native("ucre", "CRE", 6, "Crescent"),
    native("uluna", "LUNA", 6, "Terra"),
    native("untrn", "NTRN", 6, "Neutron"),
    native("utia", "TIA", 6, "Celestia"),
    native("adydx", "DYDX", 18, "dYdX"),
    native("uusdc", "USDC", 6, "USD Coin"),
    native("ukuji", "KUJI", 6, "Kujira"),
    native("uaxl", "AXL", 6, "Axelar"),
    native("ustrd", "STRD", 6, "Stride"),
    native("uregen", "REGEN", 6, "Regen"),
    native("uhuahua", "HUAHUA", 6, "Chihuahua"),
    native("ucmdx", "CMDX", 6, "Comdex"),
    native("umntl", "MNTL", 6, "AssetMantle"),
    native("uband", "BAND", 6, "Band Protocol"),
    native("aarch", "ARCH", 18, "Archway"),
    native("uom", "OM", 6, "MANTRA"),
    native("uandr", "ANDR", 6, "Andromeda"),
];

pub fn lookup(denom: &str) -> Option<&'static NativeDenom> {
    NATIVE_DENOMS.iter().find(|entry| entry.denom == denom)
}

pub fn lookup_metadata(denom: &str) -> Option<DenomMetadata> {
    lookup(denom).map(NativeDenom::metadata)
}
