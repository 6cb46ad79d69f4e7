//! Batch runs: per-file isolation, idempotent reruns, parallel workers.

mod common;

use std::fs;

use avmaster_core::batch::{discover_inputs, plan_jobs, BatchResult, BatchRunner};
use avmaster_core::logging::LineCallback;
use avmaster_core::models::{FileJob, OverwritePolicy, RunFlags};
use avmaster_core::orchestrator::FailureKind;

use common::{read, Engine, Sandbox};

fn jobs_for(sb: &Sandbox, flags: &RunFlags) -> Vec<FileJob> {
    let run = sb.run_context(flags.clone()).with_input_extensions(["wav"]);
    let inputs = discover_inputs(&sb.path("in"), &run, false).unwrap();
    plan_jobs(&inputs, &sb.path("in"), &sb.path("out"), &run)
}

#[test]
fn missing_head_for_one_file_fails_only_that_file() {
    let sb = Sandbox::new();
    for name in ["a", "b", "c"] {
        sb.input(&format!("{name}.wav"), name);
    }
    sb.input("readme.txt", "not audio");

    let engine = Engine::new();
    let flags = RunFlags::default();
    let jobs = jobs_for(&sb, &flags);
    assert_eq!(jobs.len(), 3);

    let head = sb.assets().head;
    let stash = sb.path("head.stash");
    let runner = BatchRunner::new(sb.processor(flags, &engine), 1);

    // The head disappears while b is processed and is back for c.
    let outcome = runner.run_batch(&jobs, |job| -> Option<LineCallback> {
        match job.name().as_str() {
            "b.wav" => fs::rename(&head, &stash).unwrap(),
            "c.wav" => fs::rename(&stash, &head).unwrap(),
            _ => {}
        }
        None
    });

    let results = outcome.results();
    assert_eq!(results.len(), 3);
    assert!(matches!(
        &results[&sb.path("in/a.wav")],
        BatchResult::Produced { .. }
    ));
    match &results[&sb.path("in/b.wav")] {
        BatchResult::Failed(reason) => {
            assert_eq!(reason.kind, FailureKind::MissingAsset);
            assert!(reason.message.contains("head"), "{}", reason.message);
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(matches!(
        &results[&sb.path("in/c.wav")],
        BatchResult::Produced { .. }
    ));

    assert!(sb.path("out/a.mp3").is_file());
    assert!(!sb.path("out/b.mp3").exists());
    assert_eq!(read(&sb.path("out/c.mp3")), "HEAD|mastered:c|silence|TAIL|silence");
    assert!(sb.temp_root_is_empty());

    let report = outcome.report(false);
    assert_eq!((report.produced, report.skipped, report.failed), (2, 0, 1));
    assert_eq!(report.failures[0].input, sb.path("in/b.wav"));
}

#[test]
fn second_run_skips_every_existing_output() {
    let sb = Sandbox::new();
    for name in ["a", "b"] {
        sb.input(&format!("{name}.wav"), name);
    }
    let flags = RunFlags::default();
    let jobs = jobs_for(&sb, &flags);

    let first = BatchRunner::new(sb.processor(flags.clone(), &Engine::new()), 1)
        .run_batch(&jobs, |_| None);
    assert_eq!(first.report(false).produced, 2);

    let engine = Engine::new();
    let second = BatchRunner::new(sb.processor(flags, &engine), 1).run_batch(&jobs, |_| None);

    assert!(second
        .entries
        .iter()
        .all(|e| matches!(e.result, BatchResult::SkippedExisting { .. })));
    assert!(engine.calls().is_empty());
    assert_eq!(
        second.report(false).summary(),
        "Processing complete: 0 produced, 2 skipped, 0 failed (2 total)"
    );
}

#[test]
fn parallel_workers_produce_every_file_and_share_one_silence() {
    let sb = Sandbox::new();
    let names = ["a", "b", "c", "d", "e", "f"];
    for name in names {
        sb.input(&format!("{name}.wav"), name);
    }
    let flags = RunFlags::default();
    let jobs = jobs_for(&sb, &flags);
    let engine = Engine::new();

    let outcome = BatchRunner::new(sb.processor(flags, &engine), 3).run_batch(&jobs, |_| None);

    let inputs: Vec<_> = outcome.entries.iter().map(|e| e.input.clone()).collect();
    let expected: Vec<_> = jobs.iter().map(|j| j.input.clone()).collect();
    assert_eq!(inputs, expected);

    for name in names {
        assert_eq!(
            read(&sb.path(&format!("out/{name}.mp3"))),
            format!("HEAD|mastered:{name}|silence|TAIL|silence")
        );
    }
    assert_eq!(engine.count("silence"), 1);
    assert_eq!(engine.count("master"), names.len());
    assert!(sb.temp_root_is_empty());
}

#[test]
fn dry_run_batch_reports_but_writes_nothing() {
    let sb = Sandbox::new();
    for name in ["a", "b"] {
        sb.input(&format!("{name}.wav"), name);
    }
    let flags = RunFlags {
        dry_run: true,
        ..Default::default()
    };
    let jobs = jobs_for(&sb, &flags);
    let engine = Engine::new();

    let outcome = BatchRunner::new(sb.processor(flags, &engine), 2).run_batch(&jobs, |_| None);

    let report = outcome.report(true);
    assert_eq!(report.produced, 2);
    assert!(report.summary().ends_with("[dry run]"));
    assert!(outcome.entries.iter().all(|e| !e.actions.is_empty()));
    assert!(engine.calls().is_empty());
    assert!(fs::read_dir(sb.path("out")).unwrap().next().is_none());
    assert!(!sb.assets().silence.exists());
}

#[test]
fn inputs_sharing_an_output_name_do_not_overwrite_each_other() {
    let sb = Sandbox::new();
    sb.input("a.flac", "FLAC");
    sb.input("a.wav", "WAV");
    sb.input("b.wav", "b");
    let flags = RunFlags {
        overwrite: OverwritePolicy::Force,
        ..Default::default()
    };
    let run = sb
        .run_context(flags.clone())
        .with_input_extensions(["wav", "flac"]);
    let inputs = discover_inputs(&sb.path("in"), &run, false).unwrap();
    let jobs = plan_jobs(&inputs, &sb.path("in"), &sb.path("out"), &run);
    let engine = Engine::new();

    let outcome = BatchRunner::new(sb.processor(flags, &engine), 2).run_batch(&jobs, |_| None);

    let results = outcome.results();
    assert!(matches!(
        &results[&sb.path("in/a.flac")],
        BatchResult::Produced { .. }
    ));
    match &results[&sb.path("in/a.wav")] {
        BatchResult::Failed(reason) => {
            assert_eq!(reason.kind, FailureKind::InvalidInput);
            assert!(reason.message.contains("a.flac"), "{}", reason.message);
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(
        read(&sb.path("out/a.mp3")),
        "HEAD|mastered:FLAC|silence|TAIL|silence"
    );
    assert_eq!(read(&sb.path("out/b.mp3")), "HEAD|mastered:b|silence|TAIL|silence");
    assert_eq!(engine.count("master"), 2);
}
