//! Chain metadata resolution for the explorer.
//!
//! Everything here is constructed explicitly and shared through `Arc`, so a
//! host process owns one instance of each for its lifetime while tests build
//! isolated instances per case.

mod capabilities;
mod channel_cache;
mod error;
mod facade;
mod resolver;

#[cfg(test)]
mod testing;

pub use capabilities::{CapabilityResolver, CapabilityState, FeatureRules, derive_capabilities};
pub use channel_cache::{ChannelInfoCache, DEFAULT_CHANNEL_INFO_TTL};
pub use error::{DenomError, ResolutionError};
pub use facade::DenomFacade;
pub use resolver::IbcResolver;
