//! Caller-supplied hooks, run ahead of every other plugin.

use anyhow::Context;
use rolldown_common::ModuleType;
use rolldown_plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs, HookResolveIdOutput,
    HookResolveIdReturn, HookTransformArgs, HookTransformOutput, HookTransformReturn, HookUsage,
    Plugin, PluginContext, SharedTransformPluginContext,
};
use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// `(specifier, importer)` → replacement id.
pub type ResolveIdHook =
    dyn Fn(&str, Option<&str>) -> anyhow::Result<Option<String>> + Send + Sync;
/// `id` → module source.
pub type LoadHook = dyn Fn(&str) -> anyhow::Result<Option<String>> + Send + Sync;
/// `(code, id)` → rewritten code.
pub type TransformHook = dyn Fn(&str, &str) -> anyhow::Result<Option<String>> + Send + Sync;

/// Hooks a caller can attach to every build unit without writing a full
/// Rolldown plugin. Returning `Ok(None)` defers to the next plugin.
#[derive(Clone, Default)]
pub struct PluginHooks {
    pub resolve_id: Option<Arc<ResolveIdHook>>,
    pub load: Option<Arc<LoadHook>>,
    pub transform: Option<Arc<TransformHook>>,
}

impl PluginHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_resolve_id<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, Option<&str>) -> anyhow::Result<Option<String>> + Send + Sync + 'static,
    {
        self.resolve_id = Some(Arc::new(f));
        self
    }

    pub fn on_load<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<Option<String>> + Send + Sync + 'static,
    {
        self.load = Some(Arc::new(f));
        self
    }

    pub fn on_transform<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &str) -> anyhow::Result<Option<String>> + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(f));
        self
    }

    /// Names of the hooks that are set.
    pub fn defined_hooks(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.resolve_id.is_some() {
            names.push("resolveId");
        }
        if self.load.is_some() {
            names.push("load");
        }
        if self.transform.is_some() {
            names.push("transform");
        }
        names
    }

    pub fn is_empty(&self) -> bool {
        self.resolve_id.is_none() && self.load.is_none() && self.transform.is_none()
    }
}

impl fmt::Debug for PluginHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PluginHooks")
            .field(&self.defined_hooks())
            .finish()
    }
}

/// The synthetic pre-stage plugin of a build unit.
///
/// Registers only the Rolldown hooks for which the caller supplied a
/// function, so an empty [`PluginHooks`] costs nothing at build time.
#[derive(Debug, Clone)]
pub struct HookPlugin {
    hooks: PluginHooks,
}

impl HookPlugin {
    pub fn new(hooks: PluginHooks) -> Self {
        Self { hooks }
    }

    pub fn hooks(&self) -> &PluginHooks {
        &self.hooks
    }
}

impl Plugin for HookPlugin {
    fn name(&self) -> Cow<'static, str> {
        "transmod:hooks".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        let mut usage = HookUsage::empty();
        if self.hooks.resolve_id.is_some() {
            usage |= HookUsage::ResolveId;
        }
        if self.hooks.load.is_some() {
            usage |= HookUsage::Load;
        }
        if self.hooks.transform.is_some() {
            usage |= HookUsage::Transform;
        }
        usage
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let specifier = args.specifier.to_string();
        let importer = args.importer.map(str::to_string);
        let hook = self.hooks.resolve_id.clone();

        async move {
            let Some(hook) = hook else {
                return Ok(None);
            };

            let resolved = hook(&specifier, importer.as_deref())
                .with_context(|| format!("resolveId hook failed for '{}'", specifier))?;

            Ok(resolved.map(|id| HookResolveIdOutput {
                id: id.into(),
                ..Default::default()
            }))
        }
    }

    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let id = args.id.to_string();
        let hook = self.hooks.load.clone();

        async move {
            let Some(hook) = hook else {
                return Ok(None);
            };

            let source = hook(&id).with_context(|| format!("load hook failed for '{}'", id))?;

            Ok(source.map(|code| HookLoadOutput {
                code: code.into(),
                module_type: Some(infer_module_type(&id)),
                ..Default::default()
            }))
        }
    }

    fn transform(
        &self,
        _ctx: SharedTransformPluginContext,
        args: &HookTransformArgs<'_>,
    ) -> impl std::future::Future<Output = HookTransformReturn> + Send {
        let id = args.id.to_string();
        let code = args.code.to_string();
        let hook = self.hooks.transform.clone();

        async move {
            let Some(hook) = hook else {
                return Ok(None);
            };

            let rewritten =
                hook(&code, &id).with_context(|| format!("transform hook failed for '{}'", id))?;

            Ok(rewritten.map(|code| HookTransformOutput {
                code: Some(code),
                map: None,
                side_effects: None,
                module_type: None,
            }))
        }
    }
}

fn infer_module_type(id: &str) -> ModuleType {
    let path = id.split_once('?').map_or(id, |(path, _)| path);
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some("tsx") => ModuleType::Tsx,
        Some("ts") | Some("mts") | Some("cts") => ModuleType::Ts,
        Some("jsx") => ModuleType::Jsx,
        Some("css") => ModuleType::Css,
        Some("json") => ModuleType::Json,
        _ => ModuleType::Js,
    }
}
