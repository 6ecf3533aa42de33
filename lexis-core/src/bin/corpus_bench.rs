//! Corpus Benchmarking Tool
//!
//! Measures each pipeline stage on a large Greek text file (a Perseus or
//! First1KGreek plain-text dump works well) and checks that two full runs
//! serialize to the same bytes.
//!
//! ## Usage
//!
//! ```bash
//! # Normalization only
//! ./target/release/corpus_bench /path/to/corpus.txt normalize
//!
//! # Sentence segmentation of pre-normalized text
//! ./target/release/corpus_bench /path/to/corpus.txt segment
//!
//! # Tokenization of every segmented sentence
//! ./target/release/corpus_bench /path/to/corpus.txt tokenize
//!
//! # Full pipeline including key derivation and CoNLL-U serialization
//! ./target/release/corpus_bench /path/to/corpus.txt pipeline
//!
//! # Everything (default)
//! ./target/release/corpus_bench /path/to/corpus.txt all
//! ```
//!
//! Library logging is controlled by `LEXIS_LOG`, which takes `EnvFilter`
//! directives, e.g. `LEXIS_LOG=warn,lexis_core::pipeline=debug`.
//!
//! ## Example Output
//!
//! ```text
//! [pipeline]
//!   best        0.797 s
//!   mean        0.812 s
//!   rate        63.4 MiB/s
//!   sentences   412_337
//!   tokens      6_104_552 (7_659_413/s)
//! ```

use std::env;
use std::fmt;
use std::fs;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use lexis_core::analyzer::{SentenceSegmenter, TextNormalizer, Tokenizer};
use lexis_core::Pipeline;
use lexis_types::PipelineConfig;
use tracing_subscriber::EnvFilter;

const WARMUP_RUNS: usize = 1;
const MEASURE_RUNS: usize = 5;

const LOG_ENV: &str = "LEXIS_LOG";
const DEFAULT_LOG: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normalize,
    Segment,
    Tokenize,
    Pipeline,
    All,
}

impl Mode {
    fn parse(arg: Option<&str>) -> Result<Self> {
        Ok(match arg {
            None | Some("all") => Mode::All,
            Some("normalize") => Mode::Normalize,
            Some("segment") => Mode::Segment,
            Some("tokenize") => Mode::Tokenize,
            Some("pipeline") => Mode::Pipeline,
            Some(other) => bail!("unknown mode {other:?}"),
        })
    }

    fn includes(self, other: Mode) -> bool {
        self == Mode::All || self == other
    }
}

/// Durations of the measured runs of one stage, after warmup.
struct Samples(Vec<Duration>);

impl Samples {
    fn take(mut run: impl FnMut()) -> Self {
        (0..WARMUP_RUNS).for_each(|_| run());

        let timings = (0..MEASURE_RUNS)
            .map(|_| {
                let start = Instant::now();
                run();
                start.elapsed()
            })
            .collect();
        Self(timings)
    }

    fn best(&self) -> Duration {
        self.0.iter().min().copied().unwrap_or_default()
    }

    fn mean(&self) -> Duration {
        match self.0.len() {
            0 => Duration::ZERO,
            n => self.0.iter().sum::<Duration>() / n as u32,
        }
    }
}

/// One stage's result block.
struct Report {
    stage: &'static str,
    input_bytes: usize,
    samples: Samples,
    sentences: Option<u64>,
    tokens: Option<u64>,
}

impl Report {
    fn new(stage: &'static str, input_bytes: usize, samples: Samples) -> Self {
        Self {
            stage,
            input_bytes,
            samples,
            sentences: None,
            tokens: None,
        }
    }

    fn sentences(mut self, n: u64) -> Self {
        self.sentences = Some(n);
        self
    }

    fn tokens(mut self, n: u64) -> Self {
        self.tokens = Some(n);
        self
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mean = self.samples.mean().as_secs_f64().max(f64::EPSILON);

        writeln!(f, "[{}]", self.stage)?;
        writeln!(f, "  best        {:.3} s", self.samples.best().as_secs_f64())?;
        writeln!(f, "  mean        {mean:.3} s")?;
        writeln!(
            f,
            "  rate        {}/s",
            human_bytes((self.input_bytes as f64 / mean) as u64)
        )?;
        if let Some(n) = self.sentences {
            writeln!(f, "  sentences   {}", grouped(n))?;
        }
        if let Some(n) = self.tokens {
            writeln!(
                f,
                "  tokens      {} ({}/s)",
                grouped(n),
                grouped((n as f64 / mean) as u64)
            )?;
        }
        Ok(())
    }
}

/// Filter from the `LEXIS_LOG` value, falling back to `info` when unset
/// or unparsable.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(env::var(LOG_ENV).ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: corpus_bench <path> [normalize|segment|tokenize|pipeline|all]");
        std::process::exit(1);
    }

    let path = &args[1];
    let mode = Mode::parse(args.get(2).map(String::as_str))?;

    let bytes = fs::read(path).with_context(|| format!("reading {path}"))?;
    let input =
        std::str::from_utf8(&bytes).with_context(|| format!("{path} is not valid UTF-8"))?;
    println!("{path}: {}, mode {mode:?}\n", human_bytes(input.len() as u64));

    let config = PipelineConfig::default();
    let pipeline = Pipeline::new(config.clone()).context("building pipeline")?;

    let normalizer = TextNormalizer::new(config.normalization);
    let normalized = normalizer.normalize(input).context("normalizing input")?;

    if mode.includes(Mode::Normalize) {
        println!("{}", bench_normalize(&normalizer, input)?);
    }
    if mode.includes(Mode::Segment) {
        let segmenter = SentenceSegmenter::new(&config.segmentation)?;
        println!("{}", bench_segment(&segmenter, &normalized));
    }
    if mode.includes(Mode::Tokenize) {
        let segmenter = SentenceSegmenter::new(&config.segmentation)?;
        let tokenizer = Tokenizer::new(&config.tokenization)?;
        println!("{}", bench_tokenize(&segmenter, &tokenizer, &normalized));
    }
    if mode.includes(Mode::Pipeline) {
        println!("{}", bench_pipeline(&pipeline, input)?);
    }

    check_determinism(&pipeline, input)
}

fn bench_normalize(normalizer: &TextNormalizer, input: &str) -> Result<Report> {
    let mut out = String::with_capacity(input.len());
    let mut outcome = Ok(());

    let samples = Samples::take(|| outcome = normalizer.normalize_into(input, &mut out));
    outcome?;

    Ok(Report::new("normalize", input.len(), samples))
}

fn bench_segment(segmenter: &SentenceSegmenter, text: &str) -> Report {
    let mut sentences = 0u64;

    let samples = Samples::take(|| {
        let mut count = 0u64;
        segmenter.segment(text, |_| count += 1);
        sentences = std::hint::black_box(count);
    });

    Report::new("segment", text.len(), samples).sentences(sentences)
}

fn bench_tokenize(segmenter: &SentenceSegmenter, tokenizer: &Tokenizer, text: &str) -> Report {
    let spans = segmenter.spans(text);
    let mut tokens = 0u64;

    let samples = Samples::take(|| {
        let mut count = 0u64;
        for span in &spans {
            tokenizer.tokenize(span.slice(text), |_| count += 1);
        }
        tokens = std::hint::black_box(count);
    });

    Report::new("tokenize", text.len(), samples)
        .sentences(spans.len() as u64)
        .tokens(tokens)
}

fn bench_pipeline(pipeline: &Pipeline, input: &str) -> Result<Report> {
    let mut out = Vec::with_capacity(input.len() * 4);
    let mut counts = (0u64, 0u64);
    let mut failed: Option<anyhow::Error> = None;

    let samples = Samples::take(|| {
        let written = pipeline
            .run(input)
            .map_err(anyhow::Error::from)
            .and_then(|doc| {
                out.clear();
                doc.write_to(&mut out)?;
                Ok((doc.sentences().len() as u64, doc.token_count() as u64))
            });
        match written {
            Ok(c) => counts = std::hint::black_box(c),
            Err(e) => failed = Some(e),
        }
    });
    if let Some(e) = failed {
        return Err(e);
    }

    Ok(Report::new("pipeline", input.len(), samples)
        .sentences(counts.0)
        .tokens(counts.1))
}

fn check_determinism(pipeline: &Pipeline, input: &str) -> Result<()> {
    let first = pipeline.run(input)?.to_string();
    let second = pipeline.run(input)?.to_string();

    if first != second {
        let at = first
            .bytes()
            .zip(second.bytes())
            .position(|(a, b)| a != b)
            .unwrap_or(first.len().min(second.len()));
        bail!("two runs differ starting at byte {at}");
    }

    tracing::info!(bytes = first.len(), "two runs are byte-identical");
    Ok(())
}

fn human_bytes(n: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }

    match unit {
        0 => format!("{n} B"),
        _ => format!("{value:.1} {}", UNITS[unit]),
    }
}

/// `6104552` → `6_104_552`.
fn grouped(n: u64) -> String {
    let digits = n.to_string();
    digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|group| group.iter().map(|&b| char::from(b)).collect::<String>())
        .collect::<Vec<_>>()
        .join("_")
}
