use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wordvec::core::indexing::{build_forest, BuildParams};
use wordvec::core::segment::Segmenter;
use wordvec::core::store::{read_text_embeddings_file, InMemoryVectorStore, IndexedStore, VectorStore, Vocabulary};
use wordvec::{AnnForest, Config, QueryEngine, QueryOptions};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Keyword similarity search over word vectors", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when absent
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the ingested store, vocabulary and forest
    #[clap(long, global = true)]
    data_dir: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a text embedding file into the binary store
    Ingest { input: PathBuf },
    /// Build the search forest from the ingested store
    Build {
        #[clap(long)]
        trees: Option<usize>,
        #[clap(long)]
        leaf_capacity: Option<usize>,
        #[clap(long)]
        seed: Option<u64>,
    },
    /// Serve the HTTP query API
    Serve {
        #[clap(long)]
        listen: Option<String>,
        #[clap(long)]
        http_path_prefix: Option<String>,
        /// Segmentation dictionary for unknown phrases
        #[clap(long)]
        dict: Option<PathBuf>,
    },
    /// Print the keywords most similar to the given ones
    Query {
        #[clap(required = true)]
        keywords: Vec<String>,
        #[clap(long)]
        num: Option<i64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load_or_default(cli.config.as_deref()).context("loading configuration")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    match cli.command {
        Commands::Ingest { input } => ingest(&config, &input),
        Commands::Build { trees, leaf_capacity, seed } => {
            if let Some(trees) = trees {
                config.num_trees = trees;
            }
            if leaf_capacity.is_some() {
                config.leaf_capacity = leaf_capacity;
            }
            if seed.is_some() {
                config.build_seed = seed;
            }
            build(&config)
        }
        Commands::Serve { listen, http_path_prefix, dict } => {
            if let Some(listen) = listen {
                config.listen_addr = listen;
            }
            if let Some(prefix) = http_path_prefix {
                config.http_path_prefix = prefix;
            }
            if dict.is_some() {
                config.dictionary = dict;
            }
            serve(&config)
        }
        Commands::Query { keywords, num } => {
            let engine = open_engine(&config)?;
            for keyword in engine.similar_keywords(&keywords, num)? {
                println!("{}\t{:.6}", keyword.word, keyword.similarity);
            }
            Ok(())
        }
    }
}

fn ingest(config: &Config, input: &std::path::Path) -> Result<()> {
    config.validate()?;
    let store = read_text_embeddings_file(input, config.vector_dimension)
        .with_context(|| format!("reading embeddings from {}", input.display()))?;
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating {}", config.data_dir.display()))?;
    let path = config.store_path();
    store.save(&path).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), keywords = store.len(), "store saved");
    Ok(())
}

fn build(config: &Config) -> Result<()> {
    config.validate()?;
    let store_path = config.store_path();
    let store = InMemoryVectorStore::load(&store_path)
        .with_context(|| format!("loading {}; run `ingest` first", store_path.display()))?;
    if store.dimension() != config.vector_dimension {
        bail!(
            "store dimension {} does not match configured dimension {}",
            store.dimension(),
            config.vector_dimension
        );
    }

    let seed = config.build_seed.unwrap_or_else(rand::random);
    info!(seed, "build seed");
    let params = BuildParams { num_trees: config.num_trees, leaf_capacity: config.leaf_capacity, seed };
    let forest = build_forest(&store, params)?;

    let forest_path = config.forest_path();
    forest.save(&forest_path).with_context(|| format!("writing {}", forest_path.display()))?;
    let vocabulary_path = config.vocabulary_path();
    store
        .vocabulary()
        .save(&vocabulary_path)
        .with_context(|| format!("writing {}", vocabulary_path.display()))?;
    info!(forest = %forest_path.display(), vocabulary = %vocabulary_path.display(), "build artifacts saved");
    Ok(())
}

fn open_engine(config: &Config) -> Result<QueryEngine> {
    config.validate()?;
    let forest_path = config.forest_path();
    let forest = Arc::new(
        AnnForest::load(&forest_path)
            .with_context(|| format!("loading {}; run `build` first", forest_path.display()))?,
    );
    let vocabulary_path = config.vocabulary_path();
    let vocabulary =
        Vocabulary::load(&vocabulary_path).with_context(|| format!("loading {}", vocabulary_path.display()))?;
    if forest.dimension() != config.vector_dimension {
        bail!(
            "forest dimension {} does not match configured dimension {}",
            forest.dimension(),
            config.vector_dimension
        );
    }
    info!(keywords = vocabulary.len(), trees = forest.num_trees(), "index loaded");

    let store = IndexedStore::new(vocabulary, Arc::clone(&forest))?;
    let engine = QueryEngine::new(forest, Arc::new(store), QueryOptions::from(config))?;
    Ok(match &config.dictionary {
        Some(path) => {
            let segmenter = Segmenter::load_dictionary(path)
                .with_context(|| format!("loading dictionary {}", path.display()))?;
            engine.with_segmenter(Arc::new(segmenter))
        }
        None => engine,
    })
}

fn serve(config: &Config) -> Result<()> {
    let engine = Arc::new(open_engine(config)?);
    let addr = config.socket_addr()?;
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(wordvec::api::serve(engine, addr, &config.http_path_prefix))?;
    Ok(())
}
