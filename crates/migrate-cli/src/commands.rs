use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use migrate_engine::{
    AffinityTable, MappingSuggester, MigrationSession, SuggesterConfig, default_affinity_table,
    default_target_schema, load_target_schema,
};
use migrate_index::{CorpusStore, FsCorpusStore, SimilarityIndex};
use migrate_model::{ConfirmedMapping, SourceDna};
use migrate_profile::SourceDnaExtractor;

use crate::cli::{ConfirmArgs, EngineOpts, HistoryArgs, ProfileArgs, SuggestArgs};
use crate::csv_source::read_csv_source;
use crate::summary::{print_history, print_profile, print_suggestions};

pub fn run_profile(args: &ProfileArgs) -> Result<()> {
    let dna = profile_source(&args.source, &args.source_opts.source_system)?;
    if let Some(path) = &args.output {
        write_json(path, &dna)?;
    }
    print_profile(&dna, args.show_samples);
    Ok(())
}

pub fn run_suggest(args: &SuggestArgs) -> Result<()> {
    let dna = profile_source(&args.source, &args.source_opts.source_system)?;
    let suggester = build_suggester(&args.engine_opts)?;
    let index = open_scoring_index(&args.engine_opts);

    let suggest_span = info_span!("suggest", dna_id = %dna.dna_id);
    let payload = suggest_span.in_scope(|| suggester.suggest(&dna, index.as_ref()));

    if let Some(path) = &args.output {
        write_json(path, &payload)?;
    }
    print_suggestions(&payload);
    Ok(())
}

pub fn run_confirm(args: &ConfirmArgs) -> Result<()> {
    let dna = profile_source(&args.source, &args.source_opts.source_system)?;
    let suggester = build_suggester(&args.engine_opts)?;
    // Confirmation always needs the corpus open for writing, even when
    // scoring runs without the prior.
    let store = FsCorpusStore::new(&args.engine_opts.corpus_dir)?;
    let index = SimilarityIndex::open(store).context("open corpus index")?;
    let scoring_index = if args.engine_opts.no_corpus {
        None
    } else {
        Some(&index)
    };

    let payload = suggester.suggest(&dna, scoring_index);
    let decisions = read_decisions(&args.decisions)?;

    let mut session = MigrationSession::new(dna);
    session.attach_suggestions(payload)?;
    session.begin_review()?;
    let record = session.confirm(&decisions, &index)?;

    println!(
        "Recorded migration {} from {} ({} outcomes, {} learnable)",
        record.dna_id,
        record.source_system,
        record.confirmed_mappings.len(),
        record.learnable().count()
    );
    Ok(())
}

pub fn run_history(args: &HistoryArgs) -> Result<()> {
    let store = FsCorpusStore::new(&args.corpus_dir)?;
    let entries = store.load().context("load corpus")?;
    print_history(&entries);
    Ok(())
}

fn profile_source(source: &Path, source_system: &str) -> Result<SourceDna> {
    let profile_span = info_span!("profile", source = %source.display());
    let _guard = profile_span.enter();
    let start = Instant::now();

    let raw = read_csv_source(source, source_system)?;
    let dna = SourceDnaExtractor::default().extract(&raw)?;
    info!(
        columns = dna.column_count,
        rows = dna.row_count,
        dna_id = %dna.dna_id,
        duration_ms = start.elapsed().as_millis(),
        "profile complete"
    );
    Ok(dna)
}

fn build_suggester(opts: &EngineOpts) -> Result<MappingSuggester> {
    let schema = match &opts.schema {
        Some(path) => load_target_schema(path)?,
        None => default_target_schema(),
    };
    let affinity = match &opts.affinity {
        Some(path) => AffinityTable::from_json_file(path)?,
        None => default_affinity_table(),
    };
    let mut config = SuggesterConfig::default();
    if let Some(floor) = opts.min_confidence {
        config.min_confidence = floor;
    }
    if let Some(top_k) = opts.top_k {
        config.top_k = top_k;
    }
    Ok(MappingSuggester::new(schema, affinity, config))
}

/// A missing or unreadable corpus degrades scoring instead of failing it.
fn open_scoring_index(opts: &EngineOpts) -> Option<SimilarityIndex<FsCorpusStore>> {
    if opts.no_corpus {
        return None;
    }
    let opened = FsCorpusStore::new(&opts.corpus_dir).and_then(SimilarityIndex::open);
    match opened {
        Ok(index) => Some(index),
        Err(error) => {
            warn!(
                corpus_dir = %opts.corpus_dir.display(),
                %error,
                "corpus unavailable; scoring without historical prior"
            );
            None
        }
    }
}

fn read_decisions(path: &Path) -> Result<Vec<ConfirmedMapping>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read decisions: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parse decisions: {}", path.display()))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    fs::write(path, json).with_context(|| format!("write output: {}", path.display()))?;
    Ok(())
}
