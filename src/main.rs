use clap::{Parser, ValueEnum};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::process;

use score_engine::{parse_score_file, Dialect, EngineConfig, ParsedScore, ScoreError};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// One summary line, then the notes starting at each step
    Summary,
    Json,
    Yaml,
}

#[derive(Parser, Debug)]
#[command(
    name = "score-engine",
    version,
    about = "Parse ABC or legacy line-format scores into a playback schedule"
)]
struct Args {
    /// Score file to parse
    file: PathBuf,

    /// Input dialect: auto, abc or legacy
    #[arg(short, long, default_value = "auto")]
    dialect: String,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,

    /// Engine configuration (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig, ScoreError> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let content = fs::read_to_string(path).map_err(|source| ScoreError::Io {
        path: path.clone(),
        source,
    })?;
    EngineConfig::from_yaml(&content)
}

fn summary(score: &ParsedScore) -> String {
    let mut out = format!(
        "{} | {} bpm | {} notes | {} steps ({:.1}s) | voices: {}\n",
        score.metadata.title.as_deref().unwrap_or("<untitled>"),
        score.metadata.bpm,
        score.notes.len(),
        score.total_steps,
        score.duration_ms() / 1000.0,
        score.voices().join(", ")
    );
    for (step, notes) in &score.notes_by_step {
        let names: Vec<String> = notes
            .iter()
            .map(|n| format!("{}/{}x{} {:.2}Hz", n.midi_number(), n.voice_id(), n.duration, n.frequency))
            .collect();
        out.push_str(&format!("{:>5}: {}\n", step, names.join("  ")));
    }
    out
}

fn run(args: &Args) -> Result<String, ScoreError> {
    let config = load_config(args.config.as_ref())?;
    let dialect = Dialect::from_name(&args.dialect)?;

    info!("Parsing '{}'", args.file.display());
    let score = parse_score_file(&args.file, dialect, &config)?;

    match args.format {
        OutputFormat::Summary => Ok(summary(&score)),
        OutputFormat::Json => score.to_json(),
        OutputFormat::Yaml => score.to_yaml(),
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(output) => println!("{}", output.trim_end()),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
