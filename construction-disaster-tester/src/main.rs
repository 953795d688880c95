mod logic;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use construction_disaster::DisasterConfig;
use logic::{
    SweepResult, SweepTester, build_matrix, resolve_difficulty_inputs, resolve_seed_inputs,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HeavyMode {
    /// Heavy disasters allowed: resolutions may explode
    Allowed,
    /// The no-heavy-disasters preference is set: resolutions always burn
    Disabled,
    /// Sweep both settings
    Both,
}

impl HeavyMode {
    fn settings(self) -> Vec<bool> {
        match self {
            Self::Allowed => vec![true],
            Self::Disabled => vec![false],
            Self::Both => vec![true, false],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "construction-disaster-tester", version)]
#[command(
    about = "Seed sweeps and property checks for the construction disaster story event"
)]
struct Args {
    /// Seeds to run (comma-separated integers or a..b / a..=b ranges)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Difficulties to run (comma-separated presets or multipliers)
    #[arg(long, default_value = "relaxing,normal,challenging")]
    difficulties: String,

    /// Heavy disaster setting to sweep
    #[arg(long, value_enum, default_value_t = HeavyMode::Both)]
    heavy: HeavyMode,

    /// Constructions completed per case
    #[arg(long, default_value_t = 50)]
    iterations: usize,

    /// Optional JSON file overriding the disaster tuning
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    announce_banner();

    let start_time = Instant::now();
    let config = load_config(args.config.as_deref())?;
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let difficulties = resolve_difficulty_inputs(&split_csv(&args.difficulties))?;
    let cases = build_matrix(&seeds, &difficulties, &args.heavy.settings());
    log::info!(
        "sweeping {} cases x {} constructions",
        cases.len(),
        args.iterations
    );

    let tester = SweepTester::new(config, args.verbose);
    let results = tester.run_matrix(&cases, args.iterations);

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn announce_banner() {
    println!("{}", "⚡ Construction Disaster Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn load_config(path: Option<&Path>) -> Result<DisasterConfig> {
    let Some(path) = path else {
        return Ok(DisasterConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    DisasterConfig::from_json(&raw).with_context(|| format!("invalid config {}", path.display()))
}

fn write_reports(args: &Args, results: &[SweepResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => logic::reports::generate_json_report(&mut output_target, results)?,
        ReportFormat::Markdown => {
            logic::reports::generate_markdown_report(&mut output_target, results)?;
        }
        ReportFormat::Csv => logic::reports::generate_csv_report(&mut output_target, results)?,
        ReportFormat::Console => {
            if results.is_empty() {
                writeln!(&mut output_target, "No sweep cases executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(
                &mut output_target,
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use construction_disaster::EndPolicy;

    fn base_args() -> Args {
        Args {
            seeds: "1".to_string(),
            difficulties: "normal".to_string(),
            heavy: HeavyMode::Allowed,
            iterations: 5,
            config: None,
            report: ReportFormat::Json,
            verbose: false,
            output: None,
        }
    }

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("construction-disaster-{name}-{}", std::process::id()))
    }

    #[test]
    fn heavy_mode_expands_settings() {
        assert_eq!(HeavyMode::Allowed.settings(), vec![true]);
        assert_eq!(HeavyMode::Disabled.settings(), vec![false]);
        assert_eq!(HeavyMode::Both.settings(), vec![true, false]);
    }

    #[test]
    fn split_csv_drops_blanks() {
        assert_eq!(split_csv(" 1, ,2..4,"), vec!["1".to_string(), "2..4".to_string()]);
    }

    #[test]
    fn load_config_defaults_without_path() {
        assert_eq!(load_config(None).unwrap(), DisasterConfig::default());
    }

    #[test]
    fn load_config_reads_json_file() {
        let path = temp_file("config.json");
        std::fs::write(&path, r#"{ "end_policy": "deactivate" }"#).unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.end_policy, EndPolicy::Deactivate);
    }

    #[test]
    fn load_config_rejects_invalid_values() {
        let path = temp_file("bad-config.json");
        std::fs::write(&path, r#"{ "max_explode_chance": 3.0 }"#).unwrap();
        assert!(load_config(Some(&path)).is_err());
        assert!(load_config(Some(Path::new("/nonexistent/disaster.json"))).is_err());
    }

    #[test]
    fn write_reports_emits_json_for_results() {
        let path = temp_file("report.json");
        let args = Args {
            output: Some(path.clone()),
            ..base_args()
        };
        let tester = SweepTester::new(DisasterConfig::default(), false);
        let cases = build_matrix(&[1], &[construction_disaster::Difficulty::default()], &[true]);
        let results = tester.run_matrix(&cases, args.iterations);
        write_reports(&args, &results, Instant::now()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("case_name"));
    }

    #[test]
    fn write_reports_console_without_results() {
        let path = temp_file("report.txt");
        let args = Args {
            report: ReportFormat::Console,
            output: Some(path.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("No sweep cases executed"));
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
