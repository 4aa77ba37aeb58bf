//! Batch orchestration behaviour, driven through mock bundlers so no
//! JavaScript toolchain is involved.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use helpers::*;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use transmod::{
    BATCH_CONCURRENCY, BatchOptions, BuildConfiguration, BuildOverride, Bundler, Disposition,
    EmittedFile, Error, ExternalOption, FormatSpec, ModuleFormat, Resolver, Result,
    default_policy, run_batch,
};

#[tokio::test]
async fn one_unit_per_format_and_ignored_files_produce_none() {
    let project = project(&[
        "src/a.ts",
        "src/nested/b.tsx",
        "src/a.test.ts",
        "src/types.d.ts",
        "src/__tests__/c.ts",
        "src/readme.md",
    ]);
    let bundler = shared(EchoBundler::default());

    let result = run_batch(bundler.clone(), BatchOptions::new(project.path()))
        .await
        .expect("batch");

    assert_eq!(result.total, 2);
    assert_eq!(result.succeeded, 2);
    assert!(result.is_success());

    let mut calls = bundler.calls.lock().clone();
    calls.sort();
    assert_eq!(
        calls,
        vec![
            "src/a.ts [cjs]",
            "src/a.ts [es]",
            "src/nested/b.tsx [cjs]",
            "src/nested/b.tsx [es]",
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn never_more_than_the_ceiling_in_flight() {
    let files: Vec<String> = (0..25).map(|i| format!("src/f{i}.ts")).collect();
    let refs: Vec<&str> = files.iter().map(String::as_str).collect();
    let project = project(&refs);
    let bundler = shared(CountingBundler::default());

    let options =
        BatchOptions::new(project.path()).formats([FormatSpec::from(ModuleFormat::Es)]);
    let result = run_batch(bundler.clone(), options).await.expect("batch");

    assert_eq!(result.succeeded, 25);
    assert_eq!(bundler.total.load(Ordering::SeqCst), 25);
    let peak = bundler.peak.load(Ordering::SeqCst);
    assert!(peak <= BATCH_CONCURRENCY, "peak {peak} exceeds ceiling");
    assert!(peak > 1, "units never overlapped");
}

#[tokio::test]
async fn one_failing_file_does_not_stop_the_others() {
    let project = project(&["src/a.ts", "src/b.ts", "src/c.ts"]);
    let successes = Arc::new(Mutex::new(Vec::new()));
    let ended = Arc::new(Mutex::new(None));

    let options = {
        let successes = Arc::clone(&successes);
        let ended = Arc::clone(&ended);
        BatchOptions::new(project.path())
            .on_success(move |count, file| successes.lock().push((count, file.to_string())))
            .on_end(move |count| *ended.lock() = Some(count))
    };

    let result = run_batch(shared(FailingBundler { needle: "b.ts" }), options)
        .await
        .expect("batch");

    assert!(result.failed);
    assert_eq!(result.total, 3);
    assert_eq!(result.succeeded, 2);
    assert_eq!(*ended.lock(), Some(2));

    let mut files: Vec<String> = successes.lock().iter().map(|(_, f)| f.clone()).collect();
    files.sort();
    assert_eq!(files, vec!["src/a.ts", "src/c.ts"]);

    let mut counts: Vec<usize> = successes.lock().iter().map(|(c, _)| *c).collect();
    counts.sort();
    assert_eq!(counts, vec![1, 2]);

    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].file, "src/b.ts");
    assert!(matches!(result.failures[0].error, Error::Bundler(_)));
}

#[tokio::test]
async fn sequential_batches_do_not_share_a_count() {
    let five = project(&["src/1.ts", "src/2.ts", "src/3.ts", "src/4.ts", "src/5.ts"]);
    let three = project(&["src/1.ts", "src/2.ts", "src/3.ts"]);
    let ends = Arc::new(Mutex::new(Vec::new()));

    for dir in [&five, &three] {
        let ends = Arc::clone(&ends);
        let options = BatchOptions::new(dir.path()).on_end(move |count| ends.lock().push(count));
        run_batch(shared(EchoBundler::default()), options)
            .await
            .expect("batch");
    }

    assert_eq!(*ends.lock(), vec![5, 3]);
}

#[tokio::test]
async fn start_callback_sees_total_before_dispatch() {
    let project = project(&["src/a.ts", "src/b.ts"]);
    let started = Arc::new(AtomicUsize::new(usize::MAX));
    let options = {
        let started = Arc::clone(&started);
        BatchOptions::new(project.path())
            .on_start(move |total| started.store(total, Ordering::SeqCst))
    };

    run_batch(shared(EchoBundler::default()), options)
        .await
        .expect("batch");
    assert_eq!(started.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn formats_resolve_to_their_own_directories() {
    let project = project(&["src/util/math.ts"]);
    let options = BatchOptions::new(project.path()).formats([
        FormatSpec::from(ModuleFormat::Cjs),
        FormatSpec::target(ModuleFormat::Es, "esm"),
    ]);

    let result = run_batch(shared(EchoBundler::default()), options)
        .await
        .expect("batch");

    assert_eq!(result.succeeded, 1);
    assert!(result.bytes_written > 0);
    assert!(project.path().join("lib/util/math.js").is_file());
    assert!(project.path().join("esm/util/math.js").is_file());
    assert!(!project.path().join("lib/util/entry.js").exists());
}

#[tokio::test]
async fn single_file_components_keep_their_extension() {
    let project = project(&["src/Comp.vue"]);

    run_batch(shared(EchoBundler::default()), BatchOptions::new(project.path()))
        .await
        .expect("batch");

    assert!(project.path().join("es/Comp.vue.js").is_file());
    assert!(project.path().join("lib/Comp.vue.js").is_file());
    assert!(!project.path().join("es/Comp.js").exists());
}

#[tokio::test]
async fn slow_units_time_out_without_failing_the_rest() {
    let project = project(&["src/fast.ts", "src/slow.ts"]);
    let options = BatchOptions::new(project.path()).unit_timeout(Duration::from_millis(50));

    let result = run_batch(shared(HangingBundler { needle: "slow" }), options)
        .await
        .expect("batch");

    assert_eq!(result.succeeded, 1);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].file, "src/slow.ts");
    assert!(matches!(
        result.failures[0].error,
        Error::Timeout { .. }
    ));
}

#[tokio::test]
async fn cancelled_batch_runs_nothing() {
    let project = project(&["src/a.ts", "src/b.ts"]);
    let token = CancellationToken::new();
    token.cancel();
    let bundler = shared(EchoBundler::default());

    let result = run_batch(
        bundler.clone(),
        BatchOptions::new(project.path()).cancel_token(token),
    )
    .await
    .expect("batch");

    assert!(result.cancelled);
    assert_eq!(result.succeeded, 0);
    assert_eq!(result.failures.len(), 2);
    assert!(bundler.calls.lock().is_empty());
    assert!(
        result
            .failures
            .iter()
            .all(|f| matches!(f.error, Error::Cancelled(_)))
    );
}

#[tokio::test]
async fn invalid_ignore_pattern_aborts_before_start() {
    let project = project(&["src/a.ts"]);
    let started = Arc::new(AtomicUsize::new(0));
    let options = {
        let started = Arc::clone(&started);
        BatchOptions::new(project.path())
            .ignore(["src/[broken"])
            .on_start(move |_| {
                started.fetch_add(1, Ordering::SeqCst);
            })
    };

    let err = run_batch(shared(EchoBundler::default()), options)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Discovery(_)));
    assert_eq!(started.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failing_override_only_fails_its_file() {
    let project = project(&["src/a.ts", "src/b.ts"]);
    let options = BatchOptions::new(project.path()).build_override(Resolver::computed(|path| {
        if path.ends_with("b.ts") {
            anyhow::bail!("no settings for {path}");
        }
        Ok(BuildOverride::default())
    }));

    let result = run_batch(shared(EchoBundler::default()), options)
        .await
        .expect("batch");

    assert_eq!(result.succeeded, 1);
    match &result.failures[0].error {
        Error::Override { file, message } => {
            assert_eq!(file, "src/b.ts");
            assert!(message.contains("no settings"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

/// Fails the unit unless its classifier keeps everything external except
/// the `./internal/` imports the batch asks to bundle.
struct ClassifierCheck;

#[async_trait]
impl Bundler for ClassifierCheck {
    async fn bundle(&self, config: &BuildConfiguration) -> Result<Vec<EmittedFile>> {
        let importer = config.input.to_string_lossy().into_owned();
        let importer = Some(importer.as_str());
        let checks = [
            config.external.is_external("react", importer, false),
            config.external.is_external("./theme.css", importer, false),
            config.external.is_external("./other", importer, false),
            !config.external.is_external("./internal/helpers", importer, false),
            config.external.is_external(&config.input.to_string_lossy(), None, true),
        ];
        if checks.iter().all(|ok| *ok) {
            Ok(vec![EmittedFile::entry("entry.js", "1;")])
        } else {
            Err(Error::bundler_message(format!("classifier mismatch: {checks:?}")))
        }
    }
}

#[tokio::test]
async fn every_unit_gets_a_classifier_bound_to_its_file() {
    let project = project(&["src/a.ts", "src/b.ts"]);
    let options = BatchOptions::new(project.path()).external(ExternalOption::resolver(|query| {
        if query.module_id.starts_with("./internal/") {
            Some(Disposition::Bundle)
        } else {
            default_policy(query)
        }
    }));

    let result = run_batch(Arc::new(ClassifierCheck), options)
        .await
        .expect("batch");

    assert!(result.is_success(), "{:?}", result.failures);
}

#[tokio::test]
async fn dot_input_root_is_rejected_before_dispatch() {
    let project = project(&["a.ts", "es/a.js", "lib/a.js"]);
    let bundler = shared(EchoBundler::default());

    let err = run_batch(bundler.clone(), BatchOptions::new(project.path()).input_root("."))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidConfig(_)), "{err:?}");
    assert!(bundler.calls.lock().is_empty());
}
