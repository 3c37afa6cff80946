use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use bio::io::fasta;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, LevelFilter};

use kblast::align::SmithWaterman;
use kblast::config::args::{Cli, Commands, IndexArgs, SearchArgs};
use kblast::config::{IndexParams, IndexStrategy};
use kblast::core::EncoderRegistry;
use kblast::index::InvertedIndex;
use kblast::report::{TabularConfig, TabularWriter};
use kblast::{search_collection, Databank, DatabankBuilder, DatabankCollection, Searcher};

fn level_filter(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        4 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn databank_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Ingest every FASTA record of `path` into `builder`.
fn ingest(mut builder: DatabankBuilder, path: &Path) -> Result<Databank> {
    let reader = fasta::Reader::from_file(path)
        .with_context(|| format!("cannot open databank FASTA {}", path.display()))?;

    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} records {msg}")?,
    );
    bar.set_message(databank_name(path));

    for record in reader.records() {
        let record = record.with_context(|| format!("malformed FASTA record in {}", path.display()))?;
        builder
            .add_record(record.id(), record.desc(), record.seq())
            .with_context(|| format!("cannot index record '{}'", record.id()))?;
        bar.inc(1);
    }
    bar.finish_and_clear();

    let skipped = builder.skipped();
    let databank = builder
        .finish()
        .with_context(|| format!("cannot build the index of {}", path.display()))?;
    info!(
        "{}: {} sequences indexed, {} skipped",
        databank.name(),
        databank.store().len(),
        skipped
    );
    Ok(databank)
}

fn run_index(args: IndexArgs) -> Result<()> {
    let params = args.index.to_params(Some(args.output.clone()));
    let mut registry = EncoderRegistry::new();
    let builder = DatabankBuilder::new(&databank_name(&args.input), &params, &mut registry)?;
    let databank = ingest(builder, &args.input)?;

    // sort/merge construction already wrote the bucket file to the output
    if params.strategy == IndexStrategy::InMemory {
        databank
            .index()
            .save(&args.output)
            .with_context(|| format!("cannot write index {}", args.output.display()))?;
    }
    info!(
        "wrote {} postings to {}",
        databank.index().total_postings(),
        args.output.display()
    );
    Ok(())
}

fn load_collection(args: &SearchArgs, params: &IndexParams) -> Result<DatabankCollection> {
    let mut registry = EncoderRegistry::new();
    let mut collection = DatabankCollection::new();

    if let Some(index_file) = &args.index_file {
        if args.databanks.len() != 1 {
            bail!("--index-file needs exactly one --db, got {}", args.databanks.len());
        }
        let path = &args.databanks[0];
        let index = InvertedIndex::load(index_file)
            .with_context(|| format!("cannot load index {}", index_file.display()))?;
        let builder = DatabankBuilder::with_index(&databank_name(path), params, &mut registry, index)?;
        collection.push(ingest(builder, path)?);
        return Ok(collection);
    }

    for path in &args.databanks {
        let builder = DatabankBuilder::new(&databank_name(path), params, &mut registry)?;
        collection.push(ingest(builder, path)?);
    }
    Ok(collection)
}

fn run_search(args: SearchArgs) -> Result<()> {
    let index_params = args.index.to_params(None);
    let collection = load_collection(&args, &index_params)?;
    let aligner = Arc::new(SmithWaterman::new(args.aligner_config()));
    let searcher = Searcher::new(args.search_params(), aligner)?;
    info!("{:?}", searcher);

    let out: Box<dyn Write> = match &args.out {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut writer = TabularWriter::new(out, TabularConfig::default());
    let label = collection
        .databanks()
        .iter()
        .map(|db| db.name())
        .collect::<Vec<_>>()
        .join(",");

    let reader = fasta::Reader::from_file(&args.query)
        .with_context(|| format!("cannot open query FASTA {}", args.query.display()))?;
    let mut failed_queries = 0usize;
    for record in reader.records() {
        let record = record.context("malformed query record")?;
        let results = match collection.databanks() {
            [single] => searcher.search(single, record.id(), record.seq())?,
            _ => search_collection(&searcher, &collection, record.id(), record.seq())?,
        };
        if results.has_failures() {
            for failure in &results.failures {
                error!("{}: {}", record.id(), failure);
            }
            failed_queries += 1;
            continue;
        }
        writer.write_results(&results, &label)?;
    }
    writer.flush()?;

    if failed_queries > 0 {
        bail!("{} queries had failed search tasks", failed_queries);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_default_env()
        .filter_level(level_filter(cli.verbosity))
        .format_timestamp(None)
        .format_target(false)
        .init();

    match cli.command {
        Commands::Index(args) => run_index(args),
        Commands::Search(args) => run_search(args),
    }
}
