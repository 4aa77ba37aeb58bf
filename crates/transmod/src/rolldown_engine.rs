//! [`Bundler`] implementation on top of Rolldown.

use std::sync::Arc;

use async_trait::async_trait;
use rolldown::{
    BundlerBuilder as RolldownBundlerBuilder, BundlerOptions, InputItem, IsExternal,
    LogLevel as RolldownLogLevel, SourceMapType, WatchOption,
};
use rolldown_common::Output;
use rustc_hash::FxHashSet;
use tracing::{Level, debug};

use crate::bundler::{Bundler, EmittedFile, EmittedKind};
use crate::config::BuildConfiguration;
use crate::plugins::{ExternalPlugin, PluginPhase, PluginRegistry};
use crate::{Error, Result};

/// Compiles each unit with a fresh Rolldown bundler.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolldownBundler;

impl RolldownBundler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Bundler for RolldownBundler {
    async fn bundle(&self, config: &BuildConfiguration) -> Result<Vec<EmittedFile>> {
        debug!("[transmod] rolldown build {}", config.unit_name());

        let options = bundler_options(config);
        let plugins = ordered_plugins(config);

        let mut bundler = RolldownBundlerBuilder::default()
            .with_options(options)
            .with_plugins(plugins)
            .build()
            .map_err(|e| Error::from_rolldown_batch(&e))?;

        let bundle = bundler
            .generate()
            .await
            .map_err(|e| Error::from_rolldown_batch(&e))?;

        let mut emitted = Vec::with_capacity(bundle.assets.len());
        let mut seen: FxHashSet<String> = FxHashSet::default();

        for output in &bundle.assets {
            match output {
                Output::Chunk(chunk) => {
                    let kind = if chunk.is_entry {
                        EmittedKind::Entry
                    } else {
                        EmittedKind::Chunk
                    };
                    seen.insert(chunk.filename.to_string());
                    emitted.push(EmittedFile {
                        file_name: chunk.filename.to_string(),
                        contents: chunk.code.clone().into_bytes(),
                        kind,
                    });

                    // Generate keeps file maps on the chunk.
                    if let (Some(map), Some(map_name)) = (&chunk.map, &chunk.sourcemap_filename) {
                        if seen.insert(map_name.clone()) {
                            emitted.push(EmittedFile {
                                file_name: map_name.clone(),
                                contents: map.to_json_string().into_bytes(),
                                kind: EmittedKind::SourceMap,
                            });
                        }
                    }
                }
                Output::Asset(asset) => {
                    let file_name = asset.filename.to_string();
                    if !seen.insert(file_name.clone()) {
                        continue;
                    }
                    let kind = if file_name.ends_with(".map") {
                        EmittedKind::SourceMap
                    } else {
                        EmittedKind::Asset
                    };
                    emitted.push(EmittedFile {
                        file_name,
                        contents: asset.source.as_bytes().to_vec(),
                        kind,
                    });
                }
            }
        }

        if !emitted.iter().any(|f| f.kind == EmittedKind::Entry) {
            return Err(Error::bundler_message(format!(
                "no entry chunk emitted for {}",
                config.file
            )));
        }

        Ok(emitted)
    }
}

/// Entry chunk name: the output file name without its final `.js`, so
/// Rolldown's `[name].js` reproduces it.
fn entry_name(config: &BuildConfiguration) -> String {
    let file_name = config
        .output_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    file_name
        .strip_suffix(".js")
        .map(str::to_string)
        .unwrap_or(file_name)
}

/// Rolldown has no error-only level; anything quieter than info maps to
/// `Warn`.
fn log_level(level: Level) -> RolldownLogLevel {
    if level >= Level::DEBUG {
        RolldownLogLevel::Debug
    } else if level >= Level::INFO {
        RolldownLogLevel::Info
    } else {
        RolldownLogLevel::Warn
    }
}

/// Rolldown never reads a config file of its own, so `config.config_file`
/// has nothing to map to.
fn bundler_options(config: &BuildConfiguration) -> BundlerOptions {
    let entry_dir = config
        .output_file
        .parent()
        .unwrap_or(&config.output.dir)
        .to_string_lossy()
        .into_owned();

    BundlerOptions {
        input: Some(vec![InputItem {
            name: Some(entry_name(config)),
            import: config.input.to_string_lossy().into_owned(),
        }]),
        cwd: Some(config.cwd.clone()),
        format: Some(config.output.format.to_rolldown()),
        dir: Some(entry_dir),
        platform: Some(config.platform),
        sourcemap: config.sourcemap.then_some(SourceMapType::File),
        minify: config.minify.to_rolldown_options(),
        inline_dynamic_imports: Some(config.output.inline_dynamic_imports),
        // Classification happens in ExternalPlugin.
        external: Some(IsExternal::from(vec![])),
        define: Some(
            [(
                "process.env.NODE_ENV".to_string(),
                format!("\"{}\"", config.mode.node_env()),
            )]
            .into_iter()
            .collect(),
        ),
        log_level: Some(log_level(config.log_level)),
        // The driver writes every file itself.
        watch: config.watch.then(|| WatchOption {
            skip_write: true,
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn ordered_plugins(config: &BuildConfiguration) -> Vec<rolldown_plugin::__inner::SharedPluginable> {
    let mut registry = PluginRegistry::new();
    let mut plugins = config.plugins.iter().cloned();

    if let Some(hooks) = plugins.next() {
        registry.add_with_phase(hooks, PluginPhase::PreStage);
    }
    registry.add_with_phase(
        Arc::new(ExternalPlugin::new(config.external.clone())),
        PluginPhase::Resolve,
    );
    for plugin in plugins {
        registry.add_with_phase(plugin, PluginPhase::Transform);
    }

    registry.into_rolldown_plugins()
}
