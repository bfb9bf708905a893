//! Registry trait for self-registering collaborator implementations.

/// Declares the configuration name and factory of an implementation.
///
/// Every DEX, bridge and chain implementation module exposes a `Registry`
/// struct implementing this trait. The name matches the key used under
/// `implementations` in the TOML configuration, e.g. `dex.implementations.aggregator`
/// or `chain.implementations.mock`.
pub trait ImplementationRegistry {
	/// Configuration key of this implementation.
	const NAME: &'static str;

	/// Factory type defined by the collaborator crate, e.g. `DexFactory`.
	type Factory;

	fn factory() -> Self::Factory;
}
