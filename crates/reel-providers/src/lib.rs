//! SkillReel Providers - remote backends
//!
//! Concrete implementations of the `reel-core` provider contracts:
//! - `ModelProvider`: direct model invocation through a messages endpoint
//! - `FunctionProvider`: server-side functions, also used as the verifier
//! - `LocalEvidenceStore`: evidence artifacts on the local filesystem
//!
//! # Example
//!
//! ```rust,ignore
//! use reel_providers::providers_from_settings;
//!
//! let config = reel_core::PipelineConfig::load("reel.toml")?;
//! let providers = providers_from_settings(&config.providers)?;
//! let pipeline = reel_core::SkillReelPipeline::from_config(config, &providers);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod evidence;
pub mod functions;
pub mod model;
pub mod prompts;

mod http;

pub use evidence::LocalEvidenceStore;
pub use functions::{FunctionProvider, FUNCTIONS_PROVIDER};
pub use model::{ModelProvider, MODEL_PROVIDER};

use reel_core::{ProviderError, ProviderSet, ProviderSettings};
use std::sync::Arc;

/// Build the provider set described by `settings`
///
/// The model endpoint fills the primary slot and the function endpoint the
/// secondary one. Verification goes to the function endpoint, or to the
/// model endpoint when no functions are configured. Unconfigured slots stay
/// empty.
///
/// # Errors
/// Propagates construction failures of a configured provider
pub fn providers_from_settings(settings: &ProviderSettings) -> Result<ProviderSet, ProviderError> {
    let mut providers = ProviderSet::new();

    let model = settings
        .model
        .clone()
        .map(ModelProvider::new)
        .transpose()?
        .map(Arc::new);
    let functions = settings
        .functions
        .clone()
        .map(FunctionProvider::new)
        .transpose()?
        .map(Arc::new);

    if let Some(model) = &model {
        providers = providers.with_primary(Arc::clone(model) as _);
    }
    if let Some(functions) = &functions {
        providers = providers
            .with_secondary(Arc::clone(functions) as _)
            .with_verifier(Arc::clone(functions) as _);
    } else if let Some(model) = &model {
        providers = providers.with_verifier(Arc::clone(model) as _);
    }

    tracing::info!("Configured providers: {:?}", providers);
    Ok(providers)
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
