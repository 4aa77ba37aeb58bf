//! Rolldown plugins and their ordering.
//!
//! Every build unit runs three groups of plugins, in phase order:
//! the synthetic hook plugin carrying the caller's typed hooks, the
//! external classifier, then any caller-provided plugins.

mod external;
mod hooks;

pub use external::ExternalPlugin;
pub use hooks::{HookPlugin, LoadHook, PluginHooks, ResolveIdHook, TransformHook};

use rolldown_plugin::__inner::SharedPluginable;

/// Plugin execution phases. Lower runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum PluginPhase {
    /// Caller hooks that must see every module before anything else.
    PreStage = 0,
    /// External classification.
    Resolve = 10,
    /// Caller plugins.
    Transform = 20,
}

/// Plugins kept in phase order.
#[derive(Default)]
pub(crate) struct PluginRegistry {
    plugins: Vec<(PluginPhase, SharedPluginable)>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_with_phase(&mut self, plugin: SharedPluginable, phase: PluginPhase) {
        self.plugins.push((phase, plugin));
    }

    /// Sorted by phase; insertion order is kept within a phase.
    pub fn into_rolldown_plugins(mut self) -> Vec<SharedPluginable> {
        self.plugins.sort_by_key(|(phase, _)| *phase);
        self.plugins.into_iter().map(|(_, plugin)| plugin).collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }
}
