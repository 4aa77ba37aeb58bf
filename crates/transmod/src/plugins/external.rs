//! Routes every import of a build unit through its [`ExternalClassifier`].

use rolldown_common::ResolvedExternal;
use rolldown_plugin::{
    HookResolveIdArgs, HookResolveIdOutput, HookResolveIdReturn, HookUsage, Plugin,
    PluginContext,
};
use std::borrow::Cow;
use tracing::trace;

use crate::external::{Disposition, ExternalClassifier};

#[derive(Debug, Clone)]
pub struct ExternalPlugin {
    classifier: ExternalClassifier,
}

impl ExternalPlugin {
    pub fn new(classifier: ExternalClassifier) -> Self {
        Self { classifier }
    }

    /// Decision for one import of `importer`. Only an explicit
    /// [`Disposition::Bundle`] lets the bundler resolve and inline it.
    /// Plugin-virtual ids (`\0` prefix) are never external.
    fn decide(&self, specifier: &str, importer: &str) -> Disposition {
        if specifier.starts_with('\0') {
            return Disposition::Bundle;
        }
        match self.classifier.classify(specifier, Some(importer), false) {
            Some(Disposition::Bundle) => Disposition::Bundle,
            Some(Disposition::External) | None => Disposition::External,
        }
    }
}

impl Plugin for ExternalPlugin {
    fn name(&self) -> Cow<'static, str> {
        "transmod:external".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        // The entry itself has no importer and is always bundled.
        let decision = args
            .importer
            .map(|importer| self.decide(&args.specifier, importer));
        let specifier = args.specifier.to_string();

        async move {
            match decision {
                Some(Disposition::External) => {
                    trace!("[transmod] external: {}", specifier);
                    Ok(Some(HookResolveIdOutput {
                        id: specifier.into(),
                        external: Some(ResolvedExternal::Bool(true)),
                        ..Default::default()
                    }))
                }
                Some(Disposition::Bundle) | None => Ok(None),
            }
        }
    }
}
