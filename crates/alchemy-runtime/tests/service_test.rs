//! Compile service tests through the public API

use std::sync::Arc;
use std::time::Duration;

use alchemy_core::{NodeRegistry, builtins};
use alchemy_dsl::{CompileOptions, Compiler};
use alchemy_runtime::{CompileReport, CompileService, jobs::content_hash};
use rstest::rstest;

async fn report_for(service: &CompileService, generation: u64) -> Arc<CompileReport> {
    let mut reports = service.subscribe();
    let report = tokio::time::timeout(
        Duration::from_secs(5),
        reports.wait_for(|r| r.as_ref().is_some_and(|r| r.generation >= generation)),
    )
    .await
    .expect("timed out waiting for report")
    .expect("worker stopped");
    report.clone().unwrap()
}

fn numbered_source(i: u64) -> String {
    format!("workspace {{ node Step{} {{ outputs {{ out: any }} }} }}", i)
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(10)]
#[tokio::test]
async fn test_burst_publishes_last_submission(#[case] burst: u64) {
    let service = CompileService::spawn(Compiler::default());

    for i in 1..=burst {
        assert_eq!(service.submit(numbered_source(i)), i);
    }

    let report = report_for(&service, burst).await;
    assert_eq!(report.generation, burst);
    assert_eq!(report.hash, content_hash(&numbered_source(burst)));
    assert_eq!(report.output.nodes[0].node_type, format!("Step{}", burst));

    let stats = service.stats();
    assert_eq!(stats.published, 1);
    assert_eq!(stats.superseded, burst - 1);

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_service_keeps_library_types() {
    let mut tester = builtins::test_node();
    tester.type_key = "Tester".to_string();
    let mut registry = NodeRegistry::with_builtins();
    registry.register_builtin(tester);

    let compiler = Compiler::with_registry(registry, CompileOptions::default());
    let service = CompileService::spawn(compiler);

    service.submit_from("a = Tester()\nb = Tester(a)", "scratch");
    let report = report_for(&service, 1).await;
    assert!(report.output.is_ok(), "{:?}", report.output.errors);
    assert_eq!(report.output.edges.len(), 1);

    service.submit("workspace { node Extra { } }");
    report_for(&service, 2).await;

    let compiler = service.shutdown().await.unwrap();
    assert!(compiler.registry().has("Tester"));
    assert_eq!(compiler.registry().dynamic_types(), ["Extra"]);
}
