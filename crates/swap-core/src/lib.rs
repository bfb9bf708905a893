//! Cross-chain swap composition for the swap engine.
//!
//! Given a swap of any token on one chain into any token on another, this
//! crate decides which legs are needed (origin swap, bridge, destination
//! swap), sizes each leg so that the next one is covered, and encodes the
//! result as a single origin-chain transaction or as a gasless-approval
//! payload. Destination-chain work travels with the bridge deposit as a
//! multicall message executed by the handler contract.

pub mod builder;
pub mod classifier;
pub mod composers;
pub mod engine;
pub mod error;
pub mod message;
pub mod refinement;
pub mod routes;
pub mod selector;
pub mod signing;
pub mod transaction;

pub use builder::{BuilderError, EngineBuilder, EngineFactories};
pub use classifier::classify;
pub use engine::{CrossSwapEngine, CrossSwapRequest};
pub use error::CrossSwapError;
pub use message::{decode_message, DecodedMessage, Delivery, MessageBuilder};
pub use routes::RouteRegistry;
pub use selector::RouteSelector;
pub use signing::{resolve_domain_version, verify_token_domain, SignablePayload};
pub use transaction::{tag_integrator, CallTemplate, SignatureWindow, TransactionBuilder};
