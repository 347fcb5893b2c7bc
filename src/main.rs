//! CLI entry point for genefind.
//!
//! Six-frame ORF extraction, CpG-island (or compile-time-swapped)
//! filtering, and a simulated-rank distributed dispatcher, wired
//! together the way `main_mpi.cpp::main` drives `findingGene`.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;

use genefind::config::Config;
use genefind::dispatch::run_distributed;
use genefind::emitter;
use genefind::fasta::{FastaReader, FastaWriter};
use genefind::predicate;

/// Six-frame ORF gene finder with CpG-island filtering.
#[derive(Parser, Debug)]
#[command(name = "genefind")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input FASTA file
    #[arg(long = "input")]
    input: PathBuf,

    /// Output FASTA file
    #[arg(long = "output")]
    output: PathBuf,

    /// Label template: %s = parent label, %d x3 = frame, start, end
    #[arg(long = "pattern", default_value = "%s | gene | frame=%d | LOC=[%d,%d]")]
    pattern: String,

    /// Output FASTA wrap column
    #[arg(long = "output-line-width", default_value_t = 70)]
    output_line_width: usize,

    /// Number of simulated dispatcher ranks (0 = auto-detect)
    #[arg(long = "workers", short = 'j', default_value_t = 0)]
    workers: usize,

    /// Print elapsed wall-clock time to stderr on completion
    #[arg(long = "time")]
    time: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if !args.input.exists() {
        bail!("input file not found: {}", args.input.display());
    }

    let workers = if args.workers == 0 {
        num_cpus::get()
    } else {
        args.workers
    };

    let mut config = Config::new();
    config.pattern = args.pattern.clone();
    config.set_output_line_width(args.output_line_width);
    config.set_workers(workers);

    let predicate = predicate::make();

    let start = Instant::now();

    let mut reader = FastaReader::open(&args.input)?;
    let mut writer = FastaWriter::create(&args.output, config.output_line_width)?;

    let mut sequences = 0u64;
    let mut genes_written = 0u64;

    loop {
        let seq = reader.next_sequence();
        if !seq.valid {
            break;
        }
        sequences += 1;
        eprintln!("genefind: processing {} ({} bases)", seq.label, seq.len());

        let genes = run_distributed(&seq, &config, predicate.as_ref(), config.workers)
            .with_context(|| format!("dispatcher failed on sequence {}", seq.label))?;

        for range in genes {
            let gene = emitter::materialize(range, &seq, &config.pattern);
            writer
                .write_sequence(&gene)
                .map_err(genefind::GenefindError::WriteFailure)
                .with_context(|| format!("writing gene derived from {}", seq.label))?;
            genes_written += 1;
        }
    }

    eprintln!(
        "genefind: {sequences} sequence(s) processed, {genes_written} gene(s) written"
    );
    if args.time {
        println!("genefind: elapsed {:.3}s", start.elapsed().as_secs_f64());
    }

    Ok(())
}
