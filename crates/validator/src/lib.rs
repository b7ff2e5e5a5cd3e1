//! Structural validation for generated and edited component files.
//!
//! `StructuralChecker` is the boundary to the external checker;
//! `SelfHealingValidator` wraps it in the check → fix → re-check loop.

pub mod checker;
pub mod healer;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use checker::{CheckOutcome, ProcessChecker, StructuralChecker, scoped_config_path};
pub use healer::{MAX_FIX_ATTEMPTS, SelfHealingValidator};

use pagewright_config::AppConfig;
use pagewright_core::Provider;
use std::sync::Arc;

/// Build the validator described by `config`, running the configured
/// checker process in the project root.
pub fn from_config(config: &AppConfig, provider: Arc<dyn Provider>) -> SelfHealingValidator {
    let checker = Arc::new(ProcessChecker::new(
        &config.validator,
        config.project.root_path(),
    ));
    with_checker(config, provider, checker)
}

/// Same settings as [`from_config`], around a caller-supplied checker.
pub fn with_checker(
    config: &AppConfig,
    provider: Arc<dyn Provider>,
    checker: Arc<dyn StructuralChecker>,
) -> SelfHealingValidator {
    SelfHealingValidator::new(
        checker,
        provider,
        &config.default_model,
        config.project.root_path(),
    )
    .with_temperature(config.validator.fix_temperature)
    .with_max_tokens(config.default_max_tokens)
    .enabled(config.validator.enabled)
}
