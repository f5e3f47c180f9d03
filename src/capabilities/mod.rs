//! # Capability Negotiation
//!
//! The host's API generation is detected exactly once, when the platform
//! starts, and threaded through the rest of the crate as plain data.
//!
//! ## Detection Flow
//!
//! 1. `Platform::new(host)` builds a [`CapabilityProbe`] from the config
//! 2. `CapabilityProbe::tier(host)` asks the host for the marker feature
//! 3. Marker present → [`Tier::Modern`]; absent or lookup failed → [`Tier::Legacy`]
//! 4. The tier is memoized and handed to every `HandlerChain::resolve`

pub mod probe;
pub mod tier;

pub use probe::{CapabilityProbe, DEFAULT_MARKER_FEATURE};
pub use tier::Tier;
