use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use recipe_core::corpus::load_corpus;
use recipe_core::persist::{load_meta, save_bundle, IndexPaths};
use recipe_core::{EngineConfig, IdfMode, RecipeEngine, Retrieval, Weighting};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "recipe-indexer")]
#[command(about = "Build and inspect the ingredient TF-IDF index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the index over a recipe corpus (.csv, .json or .jsonl)
    Build {
        /// Corpus file
        #[arg(long)]
        input: PathBuf,
        /// Output index directory
        #[arg(long)]
        output: PathBuf,
        /// Use smoothed IDF = ln((1 + N)/(1 + df)) + 1 instead of ln(N/df)
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        smoothed_idf: bool,
        /// Use 1 + ln(tf) instead of raw term counts
        #[arg(long, default_value_t = false)]
        sublinear_tf: bool,
    },
    /// Validate a persisted index and print its metadata
    Inspect {
        #[arg(long, default_value = "./index")]
        index: PathBuf,
    },
    /// Report rows missing instructions or falling back to the default image
    Check {
        #[arg(long, default_value = "./index")]
        index: PathBuf,
        /// Image dataset root used for existence checks
        #[arg(long)]
        image_root: Option<PathBuf>,
    },
    /// Run one retrieval against a persisted index
    Query {
        #[arg(long, default_value = "./index")]
        index: PathBuf,
        /// Free-text ingredient list
        #[arg(long)]
        ingredients: String,
        /// Dietary filter
        #[arg(long, default_value = "all")]
        diet: String,
        /// Image dataset root used for existence checks
        #[arg(long)]
        image_root: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, smoothed_idf, sublinear_tf } => {
            let idf = if smoothed_idf { IdfMode::Smooth } else { IdfMode::Plain };
            build_index(&input, &output, Weighting { sublinear_tf, idf })
        }
        Commands::Inspect { index } => inspect(&index),
        Commands::Check { index, image_root } => check(&index, image_root),
        Commands::Query { index, ingredients, diet, image_root } => query(&index, &ingredients, &diet, image_root),
    }
}

fn build_index(input: &Path, output: &Path, weighting: Weighting) -> Result<()> {
    let corpus = load_corpus(input).with_context(|| format!("loading corpus {}", input.display()))?;
    let engine = RecipeEngine::build(corpus, weighting, &EngineConfig::default())?;
    let paths = IndexPaths::new(output);
    let meta = save_bundle(&paths, engine.corpus(), engine.index())?;
    tracing::info!(output = %output.display(), num_docs = meta.num_docs, num_terms = meta.num_terms, "index build complete");
    Ok(())
}

fn inspect(index: &Path) -> Result<()> {
    let paths = IndexPaths::new(index);
    // Opening validates the whole bundle, not just meta.json.
    RecipeEngine::open(&paths, &EngineConfig::default())?;
    let meta = load_meta(&paths)?;
    println!("{}", serde_json::to_string_pretty(&meta)?);
    Ok(())
}

fn check(index: &Path, image_root: Option<PathBuf>) -> Result<()> {
    let engine = open_engine(index, image_root)?;
    let report = engine.audit();
    if report.is_clean() {
        tracing::info!(rows = report.rows, "all recipes have instructions and images");
    } else {
        tracing::warn!(
            missing_instructions = report.missing_instructions.len(),
            default_images = report.default_images,
            "corpus has incomplete recipes"
        );
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn open_engine(index: &Path, image_root: Option<PathBuf>) -> Result<RecipeEngine> {
    let mut config = EngineConfig::from_env()?;
    if let Some(root) = image_root {
        config.image_root = root;
    }
    Ok(RecipeEngine::open(&IndexPaths::new(index), &config)?)
}

#[derive(Serialize)]
struct QueryOutput<'a> {
    query: &'a str,
    diet: &'a str,
    ranked: Vec<RankedRow<'a>>,
    results: &'a [recipe_core::ResolvedResult],
}

#[derive(Serialize)]
struct RankedRow<'a> {
    title: &'a str,
    score: f32,
}

fn query(index: &Path, ingredients: &str, diet: &str, image_root: Option<PathBuf>) -> Result<()> {
    let engine = open_engine(index, image_root)?;
    let ranked = engine
        .rank(ingredients)
        .into_iter()
        .map(|c| RankedRow { title: &engine.corpus()[c.corpus_index].title, score: c.score })
        .collect();
    let retrieval = engine.retrieve(ingredients, diet);
    if let Retrieval::NoMatches = retrieval {
        eprintln!("No matching recipes found.");
    }
    let out = QueryOutput { query: ingredients, diet, ranked, results: retrieval.results() };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
