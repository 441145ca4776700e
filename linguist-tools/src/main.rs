use std::path::{Path, PathBuf};

use clap::ArgMatches;
use linguist_model::format::{self, ConversionOptions};
use linguist_model::{DataModel, LoadOutcome, MultiDataModel, SaveMode, StatisticalData};
use serde_json::json;
use tracing::{info, warn};

mod cli;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn path_arg(matches: &ArgMatches, name: &str) -> CliResult<PathBuf> {
    matches
        .get_one::<String>(name)
        .map(PathBuf::from)
        .ok_or_else(|| format!("missing argument <{}>", name).into())
}

fn file_args(matches: &ArgMatches) -> Vec<PathBuf> {
    matches
        .get_many::<String>("files")
        .map(|files| files.map(PathBuf::from).collect())
        .unwrap_or_default()
}

fn load(path: &Path) -> CliResult<DataModel> {
    let LoadOutcome { model, warnings, .. } = DataModel::load(path)?;
    for warning in warnings {
        warn!("{}", warning);
    }
    Ok(model)
}

fn print_stats(name: &str, stats: &StatisticalData) {
    println!("{}", name);
    println!(
        "  messages: {} finished ({} with warnings), {} unfinished ({} with warnings), {} obsolete",
        stats.translated_messages(),
        stats.translated_msg_danger,
        stats.unfinished_messages(),
        stats.unfinished_msg_danger,
        stats.obsolete_msg
    );
    println!(
        "  source:     {:>7} words {:>8} chars {:>8} with spaces",
        stats.source.words, stats.source.chars, stats.source.chars_with_space
    );
    println!(
        "  finished:   {:>7} words {:>8} chars {:>8} with spaces",
        stats.finished.words, stats.finished.chars, stats.finished.chars_with_space
    );
    println!(
        "  unfinished: {:>7} words {:>8} chars {:>8} with spaces",
        stats.unfinished.words, stats.unfinished.chars, stats.unfinished.chars_with_space
    );
    println!("  complete:   {}%", stats.percent_finished());
}

fn stats(matches: &ArgMatches) -> CliResult<()> {
    let mut rows = Vec::new();
    for path in file_args(matches) {
        let model = load(&path)?;
        rows.push((model.display_file_name(true), model.statistics()));
    }

    if matches.get_flag("json") {
        let files: Vec<_> = rows
            .iter()
            .map(|(file, stats)| json!({ "file": file, "statistics": stats }))
            .collect();
        let total: StatisticalData = rows.iter().map(|(_, stats)| *stats).sum();
        let report = json!({ "files": files, "total": total });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for (file, stats) in &rows {
        print_stats(file, stats);
    }
    if rows.len() > 1 {
        let total: StatisticalData = rows.iter().map(|(_, stats)| *stats).sum();
        print_stats("Total", &total);
    }
    Ok(())
}

fn merge_check(matches: &ArgMatches) -> CliResult<()> {
    let read_only = matches.get_flag("read-only");
    let mut session = MultiDataModel::new();
    for (i, path) in file_args(matches).iter().enumerate() {
        let model = load(path)?;
        if !session.is_well_mergeable(&model) {
            println!(
                "{}: does not seem to contain translations of the same messages as {}",
                model.display_file_name(true),
                session.condensed_src_file_names(true)
            );
        }
        session.append(model, i == 0 || !read_only);
    }

    println!("Files:    {}", session.condensed_src_file_names(true));
    println!(
        "Merged:   {} messages in {} contexts",
        session.message_count(),
        session.context_count()
    );
    println!(
        "Finished: {}/{} editable messages",
        session.finished_count(),
        session.editable_count()
    );
    for context in 0..session.context_count() {
        let Some(mc) = session.multi_context_item(context) else {
            continue;
        };
        if mc.finished_count() < mc.editable_count() {
            println!(
                "  {}: {}/{}",
                mc.context(),
                mc.finished_count(),
                mc.editable_count()
            );
        }
    }
    Ok(())
}

fn convert(matches: &ArgMatches) -> CliResult<()> {
    let input = path_arg(matches, "input")?;
    let output = path_arg(matches, "output")?;
    let catalog = format::load_catalog(&input)?;
    format::save_catalog(&catalog, &output, &ConversionOptions::default())?;
    info!(
        "Converted {} messages from '{}' to '{}'",
        catalog.message_count(),
        input.display(),
        output.display()
    );
    Ok(())
}

fn release(matches: &ArgMatches, verbose: bool) -> CliResult<()> {
    let input = path_arg(matches, "input")?;
    let output = match matches.get_one::<String>("output") {
        Some(output) => PathBuf::from(output),
        None => input.with_extension("qm"),
    };
    let mode = if matches.get_flag("compress") {
        SaveMode::Stripped
    } else {
        SaveMode::Everything
    };
    let model = load(&input)?;
    let report = model.release(&output, verbose, matches.get_flag("ignore-unfinished"), mode)?;
    println!(
        "Generated {} translation(s) ({} finished and {} unfinished) in '{}'",
        report.generated(),
        report.finished,
        report.unfinished,
        output.display()
    );
    if report.untranslated > 0 {
        println!("Ignored {} untranslated source text(s)", report.untranslated);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = cli::command().get_matches();
    let verbose = matches.get_flag("verbose");

    // Initialize tracing
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match matches.subcommand() {
        Some(("stats", sub)) => stats(sub),
        Some(("merge-check", sub)) => merge_check(sub),
        Some(("convert", sub)) => convert(sub),
        Some(("release", sub)) => release(sub, verbose),
        _ => Err("unknown command".into()),
    }
}
