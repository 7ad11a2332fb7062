//! The convert-then-maybe-delete step shared by the watcher and the
//! startup sweep.

use std::path::Path;

use crate::config::{Config, ConversionPolicy};
use crate::conversion::{ConversionOutcome, Converter};
use crate::deleter::Deleter;

#[derive(Debug, Clone)]
pub struct ConversionPipeline {
    converter: Converter,
    deleter: Deleter,
    policy: ConversionPolicy,
}

impl ConversionPipeline {
    pub fn new(converter: Converter, deleter: Deleter, policy: ConversionPolicy) -> Self {
        Self {
            converter,
            deleter,
            policy,
        }
    }

    /// Wire up converter, trash and policy from config for a tree rooted at `root`.
    pub fn from_config(config: &Config, root: &Path) -> Self {
        Self::new(
            Converter::from_config(config),
            Deleter::from_config(&config.trash, root),
            config.policy(),
        )
    }

    pub fn policy(&self) -> ConversionPolicy {
        self.policy
    }

    /// Convert `source`, then trash it if the conversion succeeded and
    /// auto-delete is on.
    pub async fn process(&self, source: &Path) -> ConversionOutcome {
        let outcome = self.converter.convert(source).await;

        if outcome.succeeded && self.policy.auto_delete {
            self.deleter.delete(source).await;
        }

        outcome
    }
}
