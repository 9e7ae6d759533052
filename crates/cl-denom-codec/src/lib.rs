//! Pure denomination helpers: the compiled-in registry of native denoms and
//! the `ibc/<hash>` codec. Nothing in here performs I/O.

pub mod ibc;
pub mod registry;

pub use ibc::{
    CodecError, IBC_HASH_LEN, IBC_PREFIX, hash_for_trace, is_ibc_denom, parse_ibc_denom,
    placeholder_symbol, shorten_denom, verify_trace,
};
pub use registry::{NATIVE_DENOMS, NativeDenom, lookup, lookup_metadata};
