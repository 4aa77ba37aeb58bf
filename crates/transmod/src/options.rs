//! Batch options.
//!
//! [`BatchOptions`] is the whole caller-facing surface of a batch: where to
//! look, which formats to emit, and what to layer on top of the synthesized
//! per-file configuration.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rolldown::Platform;
use rolldown_plugin::__inner::SharedPluginable;
use tokio_util::sync::CancellationToken;

use crate::discovery::{default_extensions, default_ignore};
use crate::external::ExternalOption;
use crate::format::{FormatSpec, default_formats};
use crate::minify::MinifyLevel;
use crate::plugins::PluginHooks;

type ResolveFn<T> = dyn Fn(&str) -> anyhow::Result<T> + Send + Sync;

/// A per-file option: either one value for every file, or computed from a
/// path. Resolved once per build unit during synthesis.
pub struct Resolver<T>(Arc<ResolveFn<T>>);

impl<T: 'static> Resolver<T> {
    /// Same value for every file.
    pub fn constant(value: T) -> Self
    where
        T: Clone + Send + Sync,
    {
        Self(Arc::new(move |_: &str| Ok(value.clone())))
    }

    /// Value computed from the path the resolver is applied to.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn resolve(&self, path: &str) -> anyhow::Result<T> {
        (self.0)(path)
    }
}

impl<T> Clone for Resolver<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver(<fn>)")
    }
}

/// Build-level settings a caller may change per file.
///
/// There is deliberately no output directory here: where a unit writes is
/// always derived from its format and input path.
#[derive(Debug, Clone, Default)]
pub struct BuildOverride {
    pub minify: Option<MinifyLevel>,
    pub sourcemap: Option<bool>,
    pub platform: Option<Platform>,
}

/// Output-level settings a caller may change per file. Resolved against the
/// root-relative output path (`util/math.js`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputOverride {
    /// Indentation of wrapper bodies. Only meaningful for wrapped formats.
    pub indent: Option<String>,
    /// Template for emitted asset names; `[name]` and `[ext]` are replaced.
    pub asset_file_names: Option<String>,
    pub inline_dynamic_imports: Option<bool>,
    /// Prepended to the entry chunk.
    pub banner: Option<String>,
    /// Appended to the entry chunk.
    pub footer: Option<String>,
}

type StartFn = dyn Fn(usize) + Send + Sync;
type EndFn = dyn Fn(usize) + Send + Sync;
type SuccessFn = dyn Fn(usize, &str) + Send + Sync;

/// Lifecycle callbacks of a batch.
#[derive(Clone, Default)]
pub struct BatchCallbacks {
    /// Called once with the number of discovered files.
    pub on_start: Option<Arc<StartFn>>,
    /// Called once with the final success count.
    pub on_end: Option<Arc<EndFn>>,
    /// Called after each file with the running success count and its path.
    pub on_success: Option<Arc<SuccessFn>>,
}

impl fmt::Debug for BatchCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchCallbacks")
            .field("on_start", &self.on_start.is_some())
            .field("on_end", &self.on_end.is_some())
            .field("on_success", &self.on_success.is_some())
            .finish()
    }
}

/// Options for one [`run_batch`](crate::run_batch) call.
#[derive(Clone)]
pub struct BatchOptions {
    pub cwd: PathBuf,
    /// Directory (relative to `cwd`) searched for inputs and stripped from
    /// output names.
    pub input_root: String,
    pub formats: Vec<FormatSpec>,
    /// Extensions without the leading dot.
    pub extensions: Vec<String>,
    /// Glob patterns relative to `cwd`.
    pub ignore: Vec<String>,
    pub build_override: Option<Resolver<BuildOverride>>,
    pub output_override: Option<Resolver<OutputOverride>>,
    pub external: Option<ExternalOption>,
    pub hooks: PluginHooks,
    pub plugins: Vec<SharedPluginable>,
    pub callbacks: BatchCallbacks,
    /// Passed through to every synthesized configuration.
    pub watch: bool,
    pub unit_timeout: Option<Duration>,
    pub cancel: CancellationToken,
}

impl BatchOptions {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            input_root: "src".to_string(),
            formats: default_formats(),
            extensions: default_extensions(),
            ignore: default_ignore(),
            build_override: None,
            output_override: None,
            external: None,
            hooks: PluginHooks::default(),
            plugins: Vec::new(),
            callbacks: BatchCallbacks::default(),
            watch: false,
            unit_timeout: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn input_root(mut self, root: impl Into<String>) -> Self {
        self.input_root = root.into();
        self
    }

    pub fn formats(mut self, formats: impl IntoIterator<Item = FormatSpec>) -> Self {
        self.formats = formats.into_iter().collect();
        self
    }

    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.into().trim_start_matches('.').to_string())
            .collect();
        self
    }

    pub fn ignore<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn build_override(mut self, resolver: Resolver<BuildOverride>) -> Self {
        self.build_override = Some(resolver);
        self
    }

    pub fn output_override(mut self, resolver: Resolver<OutputOverride>) -> Self {
        self.output_override = Some(resolver);
        self
    }

    pub fn external(mut self, external: impl Into<ExternalOption>) -> Self {
        self.external = Some(external.into());
        self
    }

    pub fn hooks(mut self, hooks: PluginHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn plugin(mut self, plugin: SharedPluginable) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn on_start(mut self, f: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.callbacks.on_start = Some(Arc::new(f));
        self
    }

    pub fn on_end(mut self, f: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.callbacks.on_end = Some(Arc::new(f));
        self
    }

    pub fn on_success(mut self, f: impl Fn(usize, &str) + Send + Sync + 'static) -> Self {
        self.callbacks.on_success = Some(Arc::new(f));
        self
    }

    pub fn watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    pub fn unit_timeout(mut self, timeout: Duration) -> Self {
        self.unit_timeout = Some(timeout);
        self
    }

    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }
}

impl fmt::Debug for BatchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchOptions")
            .field("cwd", &self.cwd)
            .field("input_root", &self.input_root)
            .field("formats", &self.formats)
            .field("extensions", &self.extensions)
            .field("ignore", &self.ignore)
            .field("external", &self.external)
            .field("hooks", &self.hooks)
            .field("plugins", &self.plugins.len())
            .field("callbacks", &self.callbacks)
            .field("watch", &self.watch)
            .field("unit_timeout", &self.unit_timeout)
            .finish_non_exhaustive()
    }
}
