//! End-to-end builds through Rolldown.

mod helpers;

use std::fs;
use std::sync::Arc;

use helpers::*;
use transmod::{
    BatchOptions, Disposition, ExternalOption, FormatSpec, ModuleFormat, PluginHooks,
    RolldownBundler, default_policy, run_batch,
};

#[tokio::test]
async fn compiles_each_file_into_every_format() {
    let project = project(&[]);
    write_file(
        project.path(),
        "src/util/math.ts",
        "export const add = (a: number, b: number): number => a + b;\n",
    );
    write_file(
        project.path(),
        "src/index.ts",
        "import { add } from './util/math';\nexport const three = add(1, 2);\n",
    );

    let options = BatchOptions::new(project.path()).formats([
        FormatSpec::from(ModuleFormat::Cjs),
        FormatSpec::target(ModuleFormat::Es, "esm"),
    ]);
    let result = run_batch(Arc::new(RolldownBundler::new()), options)
        .await
        .expect("batch");

    assert!(result.is_success(), "{:?}", result.failures);
    assert_eq!(result.succeeded, 2);

    let cjs = fs::read_to_string(project.path().join("lib/util/math.js")).expect("cjs output");
    assert!(cjs.contains("add"));
    assert!(!cjs.contains(": number"), "types were not stripped");

    let esm = fs::read_to_string(project.path().join("esm/util/math.js")).expect("esm output");
    assert!(esm.contains("export"));

    // Siblings are imported, never inlined.
    let cjs_index = fs::read_to_string(project.path().join("lib/index.js")).expect("cjs index");
    assert!(cjs_index.contains("./util/math"), "{cjs_index}");
    assert!(!cjs_index.contains("a + b"), "{cjs_index}");

    let esm_index = fs::read_to_string(project.path().join("esm/index.js")).expect("esm index");
    assert!(esm_index.contains("./util/math"), "{esm_index}");
    assert!(!esm_index.contains("a + b"), "{esm_index}");
}

#[tokio::test]
async fn explicitly_bundled_imports_are_inlined() {
    let project = project(&[]);
    write_file(
        project.path(),
        "src/internal.ts",
        "export const double = (n: number): number => n * 2;\n",
    );
    write_file(
        project.path(),
        "src/api.ts",
        "import { double } from './internal';\nexport const four = double(2);\n",
    );

    let options = BatchOptions::new(project.path())
        .formats([FormatSpec::from(ModuleFormat::Es)])
        .external(ExternalOption::resolver(|query| {
            if query.module_id == "./internal" {
                Some(Disposition::Bundle)
            } else {
                default_policy(query)
            }
        }));
    let result = run_batch(Arc::new(RolldownBundler::new()), options)
        .await
        .expect("batch");

    assert!(result.is_success(), "{:?}", result.failures);
    let api = fs::read_to_string(project.path().join("es/api.js")).expect("output");
    assert!(api.contains("n * 2"), "{api}");
    assert!(!api.contains("./internal"), "{api}");
}

#[tokio::test]
async fn stylesheets_stay_external() {
    let project = project(&[]);
    write_file(project.path(), "src/theme.css", "body { color: red; }\n");
    write_file(
        project.path(),
        "src/button.ts",
        "import './theme.css';\nexport const button = 'button';\n",
    );

    let options =
        BatchOptions::new(project.path()).formats([FormatSpec::from(ModuleFormat::Es)]);
    let result = run_batch(Arc::new(RolldownBundler::new()), options)
        .await
        .expect("batch");

    assert!(result.is_success(), "{:?}", result.failures);
    let out = fs::read_to_string(project.path().join("es/button.js")).expect("output");
    assert!(out.contains("theme.css"));
    assert!(!out.contains("color: red"));
}

#[tokio::test]
async fn transform_hook_runs_before_compilation() {
    let project = project(&[]);
    write_file(
        project.path(),
        "src/greet.ts",
        "export const greeting = '__GREETING__';\n",
    );

    let hooks = PluginHooks::new().on_transform(|code, id| {
        Ok(id
            .ends_with("greet.ts")
            .then(|| code.replace("__GREETING__", "hello")))
    });
    let options = BatchOptions::new(project.path())
        .formats([FormatSpec::from(ModuleFormat::Es)])
        .hooks(hooks);

    let result = run_batch(Arc::new(RolldownBundler::new()), options)
        .await
        .expect("batch");

    assert!(result.is_success(), "{:?}", result.failures);
    let out = fs::read_to_string(project.path().join("es/greet.js")).expect("output");
    assert!(out.contains("hello"));
}

#[tokio::test]
async fn syntax_errors_are_unit_failures() {
    let project = project(&["src/ok.ts"]);
    write_file(project.path(), "src/broken.ts", "export const = ;\n");

    let options =
        BatchOptions::new(project.path()).formats([FormatSpec::from(ModuleFormat::Cjs)]);
    let result = run_batch(Arc::new(RolldownBundler::new()), options)
        .await
        .expect("batch");

    assert!(result.failed);
    assert_eq!(result.succeeded, 1);
    assert_eq!(result.failures[0].file, "src/broken.ts");
    assert!(project.path().join("lib/ok.js").is_file());
}
