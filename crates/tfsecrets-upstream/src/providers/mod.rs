//! Token provider implementations

pub mod mock;
pub mod terraform;

pub use mock::{MockProvider, ProviderCall};
pub use terraform::TerraformCloudProvider;
