//! Per-unit configuration synthesis.
//!
//! A build unit is one (input file, format) pair. [`synthesize`] turns a
//! discovered [`BuildJob`] and one of its [`FormatSpec`]s into a complete,
//! immutable [`BuildConfiguration`]. Caller overrides are layered on top of
//! fixed library-build defaults, but nothing a caller supplies can move the
//! unit's output directory or output file.

use std::path::PathBuf;
use std::sync::Arc;

use rolldown::Platform;
use rolldown_plugin::__inner::SharedPluginable;
use tracing::Level;

use crate::external::ExternalClassifier;
use crate::format::{FormatSpec, ModuleFormat};
use crate::minify::MinifyLevel;
use crate::options::{BatchOptions, BuildOverride, OutputOverride};
use crate::paths::{absolutize, resolve_output_path};
use crate::plugins::HookPlugin;
use crate::{Error, Result};

/// One discovered input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildJob {
    /// cwd-relative input path with `/` separators (`src/util/math.ts`).
    pub path: String,
    /// Source extension without the dot.
    pub extension: String,
    /// Root-relative output name (`util/math.js`).
    pub output_path: String,
    /// Requested formats, shared by every job of a batch.
    pub formats: Arc<[FormatSpec]>,
}

impl BuildJob {
    pub fn new(path: impl Into<String>, formats: Arc<[FormatSpec]>) -> Self {
        let path = path.into().replace('\\', "/");
        let extension = path
            .rsplit_once('/')
            .map_or(path.as_str(), |(_, file)| file)
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_string())
            .unwrap_or_default();
        let output_path = resolve_output_path(&path);
        Self {
            path,
            extension,
            output_path,
            formats,
        }
    }
}

/// Run mode of a unit. Library output is always a production build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    #[default]
    Production,
}

impl BuildMode {
    /// Value substituted for `process.env.NODE_ENV`.
    pub fn node_env(self) -> &'static str {
        match self {
            BuildMode::Production => "production",
        }
    }
}

/// Output settings of one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOptions {
    /// Entry output name relative to `dir`.
    pub entry_file_name: String,
    pub format: ModuleFormat,
    pub indent: Option<String>,
    /// Template for emitted asset names, `[name]` and `[ext]` substituted.
    pub asset_file_names: Option<String>,
    pub inline_dynamic_imports: bool,
    pub banner: Option<String>,
    pub footer: Option<String>,
    /// Absolute output directory of the format.
    pub dir: PathBuf,
}

/// Library-mode description kept for engines that validate it. The
/// explicit [`OutputOptions`] win wherever the two disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryStub {
    pub entry: PathBuf,
    pub formats: Vec<ModuleFormat>,
}

/// Everything a [`Bundler`](crate::Bundler) needs for one unit.
#[derive(Debug, Clone)]
pub struct BuildConfiguration {
    /// cwd-relative input path, used for reporting.
    pub file: String,
    pub cwd: PathBuf,
    /// Absolute input path.
    pub input: PathBuf,
    /// Absolute destination of the entry chunk.
    pub output_file: PathBuf,
    /// Asset directory relative to `output.dir`.
    pub assets_dir: String,
    pub code_splitting: bool,
    /// Never set: a batch writes next to previous output without clearing.
    pub empty_out_dir: bool,
    pub output: OutputOptions,
    pub external: ExternalClassifier,
    pub library: LibraryStub,
    /// `[hook plugin, ...caller plugins]`.
    pub plugins: Vec<SharedPluginable>,
    pub mode: BuildMode,
    /// Engines must not look for their own config file.
    pub config_file: bool,
    pub log_level: Level,
    pub minify: MinifyLevel,
    pub sourcemap: bool,
    pub platform: Platform,
    pub watch: bool,
}

impl BuildConfiguration {
    /// `src/a.ts [cjs]`
    pub fn unit_name(&self) -> String {
        format!("{} [{}]", self.file, self.output.format)
    }
}

/// Build the configuration of one (file, format) unit.
///
/// A failing override resolver fails this unit only, as
/// [`Error::Override`].
pub fn synthesize(
    job: &BuildJob,
    spec: &FormatSpec,
    options: &BatchOptions,
) -> Result<BuildConfiguration> {
    let resolved = spec.normalize();
    let cwd = options.cwd.clone();
    let input = absolutize(&cwd, &job.path);

    let build = match &options.build_override {
        Some(resolver) => resolver
            .resolve(&job.path)
            .map_err(|e| override_error(job, e))?,
        None => BuildOverride::default(),
    };

    let output_override = match &options.output_override {
        Some(resolver) => resolver
            .resolve(&job.output_path)
            .map_err(|e| override_error(job, e))?,
        None => OutputOverride::default(),
    };

    // Computed after the overrides so nothing can redirect it.
    let dir = absolutize(&cwd, &resolved.out_dir);
    let output_file = absolutize(&dir, &job.output_path);

    let code_splitting = false;
    let output = OutputOptions {
        entry_file_name: job.output_path.clone(),
        format: resolved.format,
        indent: output_override.indent,
        asset_file_names: output_override.asset_file_names,
        inline_dynamic_imports: output_override
            .inline_dynamic_imports
            .unwrap_or(!code_splitting),
        banner: output_override.banner,
        footer: output_override.footer,
        dir,
    };

    let external =
        ExternalClassifier::new(cwd.clone(), &input).with_option(options.external.clone());

    let mut plugins: Vec<SharedPluginable> = Vec::with_capacity(options.plugins.len() + 1);
    plugins.push(Arc::new(HookPlugin::new(options.hooks.clone())));
    plugins.extend(options.plugins.iter().cloned());

    Ok(BuildConfiguration {
        file: job.path.clone(),
        library: LibraryStub {
            entry: input.clone(),
            formats: vec![resolved.format],
        },
        cwd,
        input,
        output_file,
        assets_dir: ".".to_string(),
        code_splitting,
        empty_out_dir: false,
        output,
        external,
        plugins,
        mode: BuildMode::Production,
        config_file: false,
        log_level: Level::WARN,
        minify: build.minify.unwrap_or_default(),
        sourcemap: build.sourcemap.unwrap_or(false),
        platform: build.platform.unwrap_or(Platform::Neutral),
        watch: options.watch,
    })
}

fn override_error(job: &BuildJob, error: anyhow::Error) -> Error {
    Error::Override {
        file: job.path.clone(),
        message: format!("{:#}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Resolver;
    use std::path::Path;

    fn job(path: &str, options: &BatchOptions) -> BuildJob {
        BuildJob::new(path, options.formats.clone().into())
    }

    #[test]
    fn test_build_job_fields() {
        let job = BuildJob::new("src\\util\\math.ts", Arc::from(Vec::new()));
        assert_eq!(job.path, "src/util/math.ts");
        assert_eq!(job.extension, "ts");
        assert_eq!(job.output_path, "util/math.js");

        let sfc = BuildJob::new("src/Comp.vue", Arc::from(Vec::new()));
        assert_eq!(sfc.extension, "vue");
        assert_eq!(sfc.output_path, "Comp.vue.js");
    }

    #[test]
    fn test_synthesize_defaults() {
        let options = BatchOptions::new("/proj");
        let job = job("src/util/math.ts", &options);
        let config = synthesize(&job, &FormatSpec::from(ModuleFormat::Cjs), &options).unwrap();

        assert_eq!(config.output.dir, Path::new("/proj/lib"));
        assert_eq!(config.output_file, Path::new("/proj/lib/util/math.js"));
        assert_eq!(config.input, Path::new("/proj/src/util/math.ts"));
        assert_eq!(config.output.format, ModuleFormat::Cjs);
        assert_eq!(config.assets_dir, ".");
        assert!(!config.code_splitting);
        assert!(!config.empty_out_dir);
        assert!(config.output.inline_dynamic_imports);
        assert_eq!(config.mode, BuildMode::Production);
        assert!(!config.config_file);
        assert_eq!(config.log_level, Level::WARN);
        assert_eq!(config.minify, MinifyLevel::None);
        assert_eq!(config.library.formats, vec![ModuleFormat::Cjs]);
        assert_eq!(config.plugins.len(), 1);
        assert_eq!(config.unit_name(), "src/util/math.ts [cjs]");
    }

    #[test]
    fn test_explicit_out_dir() {
        let options = BatchOptions::new("/proj");
        let job = job("src/util/math.ts", &options);
        let config =
            synthesize(&job, &FormatSpec::target(ModuleFormat::Es, "esm"), &options).unwrap();
        assert_eq!(config.output_file, Path::new("/proj/esm/util/math.js"));
    }

    #[test]
    fn test_relative_out_dir_is_resolved_against_cwd() {
        let options = BatchOptions::new("/proj");
        let job = job("src/a.ts", &options);
        let config = synthesize(
            &job,
            &FormatSpec::target(ModuleFormat::Es, "./build/../dist/es"),
            &options,
        )
        .unwrap();
        assert_eq!(config.output.dir, Path::new("/proj/dist/es"));
        assert_eq!(config.output_file, Path::new("/proj/dist/es/a.js"));
    }

    #[test]
    fn test_build_override_is_resolved_per_file() {
        let options = BatchOptions::new("/proj").build_override(Resolver::computed(|path| {
            Ok(BuildOverride {
                minify: path.ends_with("min.ts").then_some(MinifyLevel::Identifiers),
                sourcemap: Some(true),
                platform: None,
            })
        }));

        let plain = synthesize(
            &job("src/a.ts", &options),
            &FormatSpec::from(ModuleFormat::Es),
            &options,
        )
        .unwrap();
        assert_eq!(plain.minify, MinifyLevel::None);
        assert!(plain.sourcemap);

        let minified = synthesize(
            &job("src/a.min.ts", &options),
            &FormatSpec::from(ModuleFormat::Es),
            &options,
        )
        .unwrap();
        assert_eq!(minified.minify, MinifyLevel::Identifiers);
    }

    #[test]
    fn test_output_override_receives_output_path() {
        let options = BatchOptions::new("/proj").output_override(Resolver::computed(|path| {
            assert_eq!(path, "util/math.js");
            Ok(OutputOverride {
                banner: Some("/* banner */".into()),
                inline_dynamic_imports: Some(false),
                ..Default::default()
            })
        }));
        let config = synthesize(
            &job("src/util/math.ts", &options),
            &FormatSpec::from(ModuleFormat::Es),
            &options,
        )
        .unwrap();
        assert_eq!(config.output.banner.as_deref(), Some("/* banner */"));
        assert!(!config.output.inline_dynamic_imports);
        assert_eq!(config.output_file, Path::new("/proj/es/util/math.js"));
    }

    #[test]
    fn test_override_error_names_file() {
        let options = BatchOptions::new("/proj")
            .build_override(Resolver::computed(|_| anyhow::bail!("bad override")));
        let err = synthesize(
            &job("src/a.ts", &options),
            &FormatSpec::from(ModuleFormat::Cjs),
            &options,
        )
        .unwrap_err();
        match err {
            Error::Override { file, message } => {
                assert_eq!(file, "src/a.ts");
                assert!(message.contains("bad override"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_caller_plugins_follow_hook_plugin() {
        let extra: SharedPluginable = Arc::new(HookPlugin::new(Default::default()));
        let options = BatchOptions::new("/proj").plugin(Arc::clone(&extra));
        let config = synthesize(
            &job("src/a.ts", &options),
            &FormatSpec::from(ModuleFormat::Es),
            &options,
        )
        .unwrap();
        assert_eq!(config.plugins.len(), 2);
        assert!(Arc::ptr_eq(&config.plugins[1], &extra));
    }

    #[test]
    fn test_classifier_bound_to_input() {
        let options = BatchOptions::new("/proj");
        let config = synthesize(
            &job("src/a.ts", &options),
            &FormatSpec::from(ModuleFormat::Es),
            &options,
        )
        .unwrap();
        assert_eq!(config.external.owner_file(), Path::new("/proj/src/a.ts"));
        assert!(config.external.is_external("/proj/src/a.ts", None, true));
    }
}
