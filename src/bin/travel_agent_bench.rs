use std::path::PathBuf;

use clap::Parser;

use travel_agent_bench::{
    comparison::{load_queries, Comparison, ComparisonReport},
    config::BenchConfig,
    error::Result,
    llm::{Bedrock, FakeLLM},
};

/// Ask several Bedrock models the same travel questions under different
/// prompt setups and print the answers side by side.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "PATH",
        help = "TOML run configuration (built-in travel agent setup if omitted)"
    )]
    config: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "PATH",
        help = "Query file, one query per line (overrides the config)"
    )]
    queries: Option<PathBuf>,

    #[arg(
        short,
        long = "model",
        value_name = "MODEL_ID",
        help = "Model to compare; repeat for several (overrides the config)"
    )]
    models: Vec<String>,

    #[arg(
        long = "variant",
        value_name = "NAME",
        help = "Only run the named prompt variant; repeat for several"
    )]
    variants: Vec<String>,

    #[arg(long, value_name = "DIR", help = "Also write one CSV file per variant into DIR")]
    csv: Option<PathBuf>,

    #[arg(long, help = "Use an offline echo model instead of calling Bedrock")]
    dry_run: bool,
}

async fn build_comparison(config: &BenchConfig, cli: &Cli) -> Result<Comparison> {
    let mut comparison = Comparison::new()
        .with_options(config.options.clone())
        .with_failure_policy(config.failure_policy)
        .with_variants(config.prompt_variants(&cli.variants)?);

    if cli.dry_run {
        log::info!("Dry run: answers echo the query");
        for model in &config.models {
            comparison = comparison.with_model(model.as_str(), FakeLLM::echo());
        }
        return Ok(comparison);
    }

    let bedrock = match &config.region {
        Some(region) => Bedrock::with_region_config(region.as_str()).await?,
        None => Bedrock::new().await?,
    };
    log::info!(
        "Bedrock region: {}",
        bedrock.region().unwrap_or_else(|| "<unset>".to_string())
    );
    for model in &config.models {
        comparison = comparison.with_model(model.as_str(), bedrock.clone().with_model(model.as_str()));
    }
    Ok(comparison)
}

fn print_usage(report: &ComparisonReport) {
    let usage = report.usage();
    if usage.is_empty() {
        return;
    }

    let mut models: Vec<_> = usage.get_all_usage().iter().collect();
    models.sort_by(|a, b| a.0.cmp(b.0));

    println!("## Token usage\n");
    println!("| Model | Prompt | Completion | Total |");
    println!("|---|---|---|---|");
    for (model, tokens) in models {
        println!(
            "| {} | {} | {} | {} |",
            model, tokens.prompt_tokens, tokens.completion_tokens, tokens.total_tokens
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => BenchConfig::from_path(path)?,
        None => BenchConfig::travel_agent(),
    };
    if !cli.models.is_empty() {
        config.models = cli.models.clone();
        config.validate()?;
    }

    let queries_file = cli.queries.clone().unwrap_or_else(|| config.queries_file.clone());
    let queries = load_queries(&queries_file).await?;

    let comparison = build_comparison(&config, &cli).await?;
    let report = comparison.run(&queries).await?;

    println!("{}", report.to_markdown());
    print_usage(&report);

    if let Some(dir) = &cli.csv {
        for path in report.write_csv_dir(dir)? {
            eprintln!("Wrote {}", path.display());
        }
    }
    Ok(())
}
