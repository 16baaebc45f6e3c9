//! Polyparse CLI - Segment text lines into words from a vocabulary
//!
//! Every line is matched against the grammar
//!
//!   WORD     := word_1 | ... | word_n
//!   SENTENCE := WORD | WORD SENTENCE
//!
//! and every way of covering the whole line is reported.
//!
//! Usage:
//!   ppcli [OPTIONS] [COMMAND] -w <WORD>... <FILE>
//!
//! Commands:
//!   split   List every decomposition of each line (default)
//!   check   Fail if some line has no decomposition
//!   stats   Show decomposition counts

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use polyparse_core::{full_match, literal, named, Alternation, Grammar, Line, Lines, ParseError};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = env::args().collect();

    match run(&args) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let config = parse_args(args)?;
    init_logging(config.verbose);

    let input = read_input(&config.file)?;
    let grammar = build_segmenter(&config.words)?;
    info!(words = config.words.len(), "built segmenter");

    let reports = segment_lines(&grammar, &input, config.limit);

    match config.command {
        Command::Split => cmd_split(&reports, &config),
        Command::Check => cmd_check(&reports, &config),
        Command::Stats => cmd_stats(&reports, &config),
    }
}

#[derive(Debug)]
struct Config {
    command: Command,
    words: Vec<String>,
    file: String,
    format: OutputFormat,
    limit: Option<usize>,
    verbose: bool,
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Split,
    Check,
    Stats,
}

#[derive(Debug, Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_args(args: &[String]) -> Result<Config, String> {
    let mut command = Command::Split;
    let mut format = OutputFormat::Text;
    let mut verbose = false;
    let mut words = Vec::new();
    let mut limit = None;
    let mut file = None;

    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            "-V" | "--version" => {
                println!("ppcli {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "-v" | "--verbose" => verbose = true,
            "-j" | "--json" => format = OutputFormat::Json,
            "-w" | "--word" => {
                i += 1;
                let word = args
                    .get(i)
                    .ok_or_else(|| format!("{} needs a value", arg))?;
                words.push(word.clone());
            }
            "--words" => {
                i += 1;
                let list = args
                    .get(i)
                    .ok_or_else(|| "--words needs a value".to_string())?;
                words.extend(
                    list.split(',')
                        .map(str::trim)
                        .filter(|w| !w.is_empty())
                        .map(str::to_string),
                );
            }
            "-n" | "--limit" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| format!("{} needs a value", arg))?;
                let n: usize = value
                    .parse()
                    .map_err(|_| format!("invalid limit: {}", value))?;
                if n == 0 {
                    return Err("limit must be at least 1".to_string());
                }
                limit = Some(n);
            }
            "split" => command = Command::Split,
            "check" => command = Command::Check,
            "stats" => command = Command::Stats,
            "-" => {
                if file.is_some() {
                    return Err("multiple files specified".to_string());
                }
                file = Some(arg.clone());
            }
            _ if arg.starts_with('-') => {
                return Err(format!("unknown option: {}", arg));
            }
            _ => {
                if file.is_some() {
                    return Err("multiple files specified".to_string());
                }
                file = Some(arg.clone());
            }
        }
        i += 1;
    }

    let file = file.ok_or_else(|| "no input file specified".to_string())?;
    if words.is_empty() {
        return Err("no vocabulary given (use -w or --words)".to_string());
    }

    Ok(Config {
        command,
        words,
        file,
        format,
        limit,
        verbose,
    })
}

fn print_help() {
    eprintln!(
        r#"ppcli - split text lines into vocabulary words, keeping every reading

USAGE:
    ppcli [OPTIONS] [COMMAND] -w <WORD>... <FILE>

COMMANDS:
    split       List every decomposition of each line (default)
    check       Exit with an error if some line cannot be decomposed
    stats       Show decomposition counts

OPTIONS:
    -w, --word <WORD>     Add a word to the vocabulary (repeatable)
        --words <LIST>    Add comma-separated words to the vocabulary
    -n, --limit <N>       Stop after N decompositions per line
    -v, --verbose         Debug logging (RUST_LOG overrides)
    -j, --json            Output in JSON format
    -h, --help            Print help information
    -V, --version         Print version information

Use - as FILE to read standard input.

EXAMPLES:
    ppcli --words a,b,ab input.txt          Show every reading of each line
    ppcli -n 1 -w the -w there -w re in.txt First reading only
    ppcli check --words a,b input.txt       Validate every line
"#
    );
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(file: &str) -> Result<String, String> {
    if file == "-" {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .map_err(|e| format!("failed to read stdin: {}", e))?;
        Ok(input)
    } else {
        fs::read_to_string(file).map_err(|e| format!("failed to read '{}': {}", file, e))
    }
}

// =============================================================================
// Grammar
// =============================================================================

/// SENTENCE := WORD | WORD SENTENCE, matched against whole lines.
fn build_segmenter(words: &[String]) -> Result<Grammar, String> {
    let mut alternatives = Vec::with_capacity(words.len());
    for word in words {
        let matcher = literal(word).map_err(|e| format!("invalid word {:?}: {}", word, e))?;
        alternatives.push(named("word", matcher));
    }

    let word = Grammar::new(Alternation::new(alternatives));
    let sentence = Grammar::new(Alternation::new([word.clone()]));
    sentence
        .add_alternative(word + sentence.clone())
        .map_err(|e| e.to_string())?;

    Ok(full_match(sentence))
}

/// Outcome of matching one input line.
struct LineReport {
    number: usize,
    text: String,
    decompositions: Vec<Vec<String>>,
    error: Option<ParseError>,
}

impl LineReport {
    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

fn segment_lines(grammar: &Grammar, input: &str, limit: Option<usize>) -> Vec<LineReport> {
    let mut reports = Vec::new();

    for (idx, line) in Lines::new(input).enumerate() {
        let mut report = LineReport {
            number: idx + 1,
            text: line.as_str().to_string(),
            decompositions: Vec::new(),
            error: None,
        };

        if !report.is_blank() {
            match segment(grammar, line, limit) {
                Ok(decompositions) => report.decompositions = decompositions,
                Err(e) => report.error = Some(e),
            }
            debug!(
                line = report.number,
                decompositions = report.decompositions.len(),
                "segmented line"
            );
        }

        // The memo is keyed by line suffix; drop it before the next line.
        grammar.clear_cache();
        reports.push(report);
    }

    reports
}

fn segment(
    grammar: &Grammar,
    line: Line,
    limit: Option<usize>,
) -> Result<Vec<Vec<String>>, ParseError> {
    let variants = grammar.parse(line).take(limit.unwrap_or(usize::MAX));

    let mut decompositions = Vec::new();
    for variant in variants {
        let variant = variant?;
        let words = variant
            .state
            .captures()
            .into_iter()
            .map(|(_, state)| state.text())
            .collect();
        decompositions.push(words);
    }
    Ok(decompositions)
}

// =============================================================================
// Split Command
// =============================================================================

fn cmd_split(reports: &[LineReport], config: &Config) -> Result<(), String> {
    match config.format {
        OutputFormat::Json => print_json(reports)?,
        OutputFormat::Text => {
            for report in reports.iter().filter(|r| !r.is_blank()) {
                println!("line {}: {}", report.number, report.text);
                match &report.error {
                    Some(e) => println!("  no decomposition ({})", e),
                    None => {
                        for words in &report.decompositions {
                            println!("  {}", words.join(" "));
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

// =============================================================================
// Check Command
// =============================================================================

fn cmd_check(reports: &[LineReport], config: &Config) -> Result<(), String> {
    let failed: Vec<&LineReport> = reports.iter().filter(|r| r.error.is_some()).collect();

    if failed.is_empty() {
        if matches!(config.format, OutputFormat::Json) {
            println!(r#"{{"valid": true, "errors": []}}"#);
        } else {
            println!("Valid: every line decomposes");
        }
        return Ok(());
    }

    if matches!(config.format, OutputFormat::Json) {
        let errors: Vec<_> = failed
            .iter()
            .filter_map(|r| r.error.as_ref().map(|e| (r.number, e)))
            .map(|(number, e)| {
                serde_json::json!({
                    "line": number,
                    "message": e.message,
                    "offset": e.offset,
                    "deepest_offset": e.deepest_offset(),
                })
            })
            .collect();
        println!("{}", serde_json::json!({"valid": false, "errors": errors}));
    } else {
        eprintln!("Invalid: {} line(s) do not decompose", failed.len());
        for report in &failed {
            if let Some(e) = &report.error {
                eprintln!("  - line {}: {}", report.number, e);
            }
        }
    }
    Err(format!("{} line(s) do not decompose", failed.len()))
}

// =============================================================================
// Stats Command
// =============================================================================

#[derive(Serialize)]
struct SegmentStats {
    lines: usize,
    blank: usize,
    segmented: usize,
    ambiguous: usize,
    unsegmented: usize,
    decompositions: usize,
    max_per_line: usize,
}

impl SegmentStats {
    fn from_reports(reports: &[LineReport]) -> Self {
        let mut stats = Self {
            lines: reports.len(),
            blank: 0,
            segmented: 0,
            ambiguous: 0,
            unsegmented: 0,
            decompositions: 0,
            max_per_line: 0,
        };

        for report in reports {
            if report.is_blank() {
                stats.blank += 1;
                continue;
            }
            let count = report.decompositions.len();
            match count {
                0 => stats.unsegmented += 1,
                1 => stats.segmented += 1,
                _ => {
                    stats.segmented += 1;
                    stats.ambiguous += 1;
                }
            }
            stats.decompositions += count;
            stats.max_per_line = stats.max_per_line.max(count);
        }

        stats
    }
}

fn cmd_stats(reports: &[LineReport], config: &Config) -> Result<(), String> {
    let stats = SegmentStats::from_reports(reports);

    if matches!(config.format, OutputFormat::Json) {
        let json = serde_json::to_string_pretty(&stats).map_err(|e| e.to_string())?;
        println!("{}", json);
        return Ok(());
    }

    println!("Segmentation Statistics");
    println!("-----------------------");
    println!("Vocabulary:     {}", config.words.len());
    println!("Lines:          {}", stats.lines);
    println!("  Blank:        {}", stats.blank);
    println!("  Segmented:    {}", stats.segmented);
    println!("  Ambiguous:    {}", stats.ambiguous);
    println!("  Unsegmented:  {}", stats.unsegmented);
    println!();
    println!("Decompositions: {}", stats.decompositions);
    println!("Most per line:  {}", stats.max_per_line);
    if let Some(limit) = config.limit {
        println!("Limit:          {}", limit);
    }

    Ok(())
}

// =============================================================================
// JSON Output
// =============================================================================

#[derive(Serialize)]
struct JsonLine<'a> {
    line: usize,
    text: &'a str,
    decompositions: &'a [Vec<String>],
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonError<'a>>,
}

#[derive(Serialize)]
struct JsonError<'a> {
    kind: String,
    message: &'a str,
    offset: usize,
}

fn print_json(reports: &[LineReport]) -> Result<(), String> {
    let lines: Vec<JsonLine> = reports
        .iter()
        .filter(|r| !r.is_blank())
        .map(|r| JsonLine {
            line: r.number,
            text: &r.text,
            decompositions: &r.decompositions,
            error: r.error.as_ref().map(|e| JsonError {
                kind: format!("{:?}", e.kind),
                message: &e.message,
                offset: e.offset,
            }),
        })
        .collect();

    let json = serde_json::to_string_pretty(&lines).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}
