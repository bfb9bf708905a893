//! Common types module for the cross-swap quoting system.
//!
//! This module defines the core data types and structures used throughout
//! the cross-swap engine and its collaborators. It provides a centralized
//! location for shared types to ensure consistency across all components.

/// Cross-swap intents, tokens and amount semantics.
pub mod swap;
/// Swap and bridge quotes plus the composed quote aggregate.
pub mod quotes;
/// Destination-chain multicall actions and the bridge deposit structure.
pub mod multicall;
/// Values read from token contracts for signature-domain checks.
pub mod signing;
/// Network, token and bridge route configuration types.
pub mod networks;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Ordered call record shared by mock collaborators.
pub mod journal;
/// Utility functions for EIP-712 encoding, amount math and formatting.
pub mod utils;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;

pub use journal::CallJournal;
pub use multicall::*;
pub use networks::{BridgeRouteConfig, NetworkConfig, NetworksConfig, TokenConfig};
pub use quotes::*;
pub use registry::ImplementationRegistry;
pub use signing::*;
pub use swap::*;
pub use utils::{current_timestamp, truncate_id, with_0x_prefix, without_0x_prefix};
pub use validation::*;
