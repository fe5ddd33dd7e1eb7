//! End-to-end runs
//!
//! Drive a whole comparison from a config file and a query file, with offline
//! models standing in for Bedrock.

use std::fs;

use travel_agent_bench::comparison::{load_queries, Comparison, ModelId, QueryRunner};
use travel_agent_bench::config::BenchConfig;
use travel_agent_bench::error::{BenchError, RunError};
use travel_agent_bench::language_models::options::CallOptions;
use travel_agent_bench::llm::FakeLLM;
use travel_agent_bench::prompt::ConversationTemplate;

const CONFIG: &str = r#"
queries_file = "queries.txt"
models = ["model-a", "model-b"]

[options]
max_tokens = 300

[[variants]]
name = "no-system-prompt"

[[variants]]
name = "few-shot"
instruction = "You are a virtual travel agent."

[[variants.examples]]
input = "Paris in spring?"
output = "Absolutely! April is lovely."
"#;

const QUERIES: &str = "I want to see the northern lights\n\nBest beaches in Portugal?\nA weekend in Vienna\n";

#[tokio::test]
async fn test_config_and_query_file_drive_a_full_run() {
    let _ = env_logger::builder().is_test(true).try_init();

    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("bench.toml");
    fs::write(&config_path, CONFIG).unwrap();
    fs::write(dir.path().join("queries.txt"), QUERIES).unwrap();

    let config = BenchConfig::from_path(&config_path).unwrap();
    let queries = load_queries(&config.queries_file).await.unwrap();
    assert_eq!(queries.len(), 3);

    let model_a = FakeLLM::echo();
    let mut comparison = Comparison::new()
        .with_options(config.options.clone())
        .with_failure_policy(config.failure_policy)
        .with_variants(config.prompt_variants(&[]).unwrap());
    comparison = comparison
        .with_model(config.models[0].as_str(), model_a.clone())
        .with_model(config.models[1].as_str(), FakeLLM::fixed("Absolutely!"));

    let report = comparison.run(&queries).await.unwrap();

    assert_eq!(report.len(), 2);
    for variant in report.iter() {
        assert_eq!(variant.table.columns(), config.model_ids().as_slice());
        assert_eq!(variant.table.cell_count(), queries.len() * config.models.len());
        for (row, query) in variant.table.rows().iter().zip(&queries) {
            assert_eq!(row.example(), query.as_str());
        }
    }

    let few_shot = report.get("few-shot").unwrap();
    assert_eq!(
        few_shot.cell(2, &ModelId::from("model-a")).unwrap().text(),
        Some("A weekend in Vienna")
    );
    assert_eq!(model_a.options().max_tokens, Some(300));
    // 2 variants x 3 queries
    assert_eq!(model_a.call_count(), 6);

    let out = dir.path().join("out");
    let written = report.write_csv_dir(&out).unwrap();
    assert_eq!(written.len(), 2);
    let csv = fs::read_to_string(out.join("few-shot.csv")).unwrap();
    assert!(csv.starts_with("example,model-a,model-b\n"));
    assert!(csv.contains("Best beaches in Portugal?,Best beaches in Portugal?,Absolutely!"));
}

#[tokio::test]
async fn test_failures_are_recorded_in_the_table() {
    let queries = vec!["Tokyo?".to_string(), "Cairo?".to_string()];
    let runner = QueryRunner::new(ConversationTemplate::new())
        .with_model("flaky", FakeLLM::scripted(vec![Err("throttled".to_string())]))
        .with_model("steady", FakeLLM::echo());

    let table = runner.run(&queries).await.unwrap();

    assert_eq!(table.failures(), 2);
    let markdown = table.to_markdown();
    assert!(markdown.contains("| Tokyo? | ERROR: Error: throttled | Tokyo? |"));
}

#[tokio::test]
async fn test_run_errors_surface_as_bench_errors() {
    let runner = QueryRunner::new(ConversationTemplate::new())
        .with_options(CallOptions::new().with_timeout(30));

    let err: BenchError = runner.run(&["Lima?".to_string()]).await.unwrap_err().into();

    assert!(matches!(err, BenchError::RunError(RunError::NoModels)));
}
