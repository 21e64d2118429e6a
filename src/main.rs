use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use star_analysis::{
    report, AnalysisResult, AnalyzerConfig, LexiconTokenizer, StarAnalyzer, SAMPLE_STATEMENTS,
};

#[derive(Parser)]
#[command(
    name = "star-analysis",
    about = "Classify Japanese reflective statements as SENSE, THINK, ACT or RELATE",
    version
)]
struct Cli {
    /// Statements to analyze (reads stdin, one per line, if none provided)
    statements: Vec<String>,

    /// JSON configuration file (falls back to the built-in dictionary)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON lexicon enabling part-of-speech boosts
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Print results as pretty JSON
    #[arg(long)]
    json: bool,

    /// Read stdin lines as JSON values and print one JSON result per line
    #[arg(long, conflicts_with_all = ["statements", "samples"])]
    jsonl: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Analyze the built-in sample statements
    #[arg(long)]
    samples: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn print_result(result: &AnalysisResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!("{}", report::render(result));
    }
    Ok(())
}

fn run_jsonl(analyzer: &StarAnalyzer) -> anyhow::Result<()> {
    let mut rejected = 0usize;
    for (number, line) in std::io::stdin().lock().lines().enumerate() {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("line {}: not JSON: {err}", number + 1);
                rejected += 1;
                continue;
            }
        };
        match analyzer.analyze_value(&value) {
            Ok(result) => println!("{}", serde_json::to_string(&result)?),
            Err(err) => {
                log::warn!("line {}: {err}", number + 1);
                rejected += 1;
            }
        }
    }
    if rejected > 0 {
        log::warn!("{rejected} line(s) rejected");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match &cli.config {
        Some(path) => AnalyzerConfig::load_or_default(path),
        None => AnalyzerConfig::builtin(),
    };
    let mut analyzer = StarAnalyzer::new(config);
    if cli.print_config {
        println!("{}", analyzer.config().to_json_pretty()?);
        return Ok(());
    }

    if let Some(path) = &cli.lexicon {
        let lexicon = LexiconTokenizer::load(path)
            .with_context(|| format!("cannot use lexicon {}", path.display()))?;
        analyzer = analyzer.with_tokenizer(lexicon);
    }

    if cli.jsonl {
        return run_jsonl(&analyzer);
    }

    let statements: Vec<String> = if cli.samples {
        SAMPLE_STATEMENTS.iter().map(|s| s.to_string()).collect()
    } else if !cli.statements.is_empty() {
        cli.statements
    } else {
        std::io::stdin()
            .lock()
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .context("failed to read stdin")?
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .collect()
    };

    for statement in &statements {
        print_result(&analyzer.analyze(statement), cli.json)?;
    }
    Ok(())
}
