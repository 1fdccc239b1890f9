//! CLI for nanostudio - prompt-driven image generation and editing.

use clap::{Args, Parser, Subcommand, ValueEnum};
use nanostudio::{
    AspectRatio, FileStorage, GeminiClient, GeminiModel, HistoryStore, Mode, Studio,
    DETAILED_EXAMPLE_PROMPT, EXAMPLE_PROMPTS,
};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nanostudio")]
#[command(about = "Generate or edit images with Gemini, with a local result history")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an image from a prompt, or edit one with --input
    Generate(GenerateArgs),

    /// List past results
    History,

    /// Clear the stored history
    ClearHistory(ClearArgs),

    /// Show example prompts
    Prompts,
}

#[derive(Args)]
struct GenerateArgs {
    /// The text prompt (an edit instruction when --input is given)
    prompt: String,

    /// Source image to edit
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Aspect ratio hint (best-effort when editing)
    #[arg(long, value_enum, default_value = "1:1")]
    aspect_ratio: AspectRatioArg,

    /// Model to use
    #[arg(long, value_enum, default_value = "nano-banana")]
    model: ModelArg,

    /// Directory to write the result image into
    #[arg(short, long, default_value = ".")]
    out: PathBuf,
}

#[derive(Args)]
struct ClearArgs {
    /// Skip the confirmation prompt
    #[arg(long)]
    yes: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AspectRatioArg {
    #[value(name = "1:1")]
    Square,
    #[value(name = "3:4")]
    Portrait,
    #[value(name = "4:3")]
    Landscape,
    #[value(name = "9:16")]
    Tall,
    #[value(name = "16:9")]
    Wide,
}

impl From<AspectRatioArg> for AspectRatio {
    fn from(arg: AspectRatioArg) -> Self {
        match arg {
            AspectRatioArg::Square => AspectRatio::Square,
            AspectRatioArg::Portrait => AspectRatio::Portrait,
            AspectRatioArg::Landscape => AspectRatio::Landscape,
            AspectRatioArg::Tall => AspectRatio::Tall,
            AspectRatioArg::Wide => AspectRatio::Wide,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    NanoBanana,
    NanoBananaPro,
}

impl From<ModelArg> for GeminiModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::NanoBanana => GeminiModel::NanoBanana,
            ModelArg::NanoBananaPro => GeminiModel::NanoBananaPro,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => generate(args, cli.json).await?,
        Commands::History => show_history(cli.json)?,
        Commands::ClearHistory(args) => clear_history(args)?,
        Commands::Prompts => list_prompts(cli.json)?,
    }

    Ok(())
}

fn open_store() -> anyhow::Result<HistoryStore<FileStorage>> {
    Ok(HistoryStore::new(FileStorage::in_data_dir()?))
}

async fn generate(args: GenerateArgs, json_output: bool) -> anyhow::Result<()> {
    let client = GeminiClient::builder().model(args.model.into()).build()?;
    let mut studio = Studio::new(client, open_store()?);

    if let Some(ref input) = args.input {
        studio.select_source_file(input).await;
        if let Some(error) = studio.last_error() {
            anyhow::bail!("{error}");
        }
    }

    studio.set_prompt(&args.prompt);
    studio.set_aspect_ratio(args.aspect_ratio.into());

    let mode = studio.mode();
    studio.generate().await;

    if let Some(error) = studio.last_error() {
        anyhow::bail!("{error}");
    }

    let path = studio.export_result(&args.out)?;

    if json_output {
        let result = serde_json::json!({
            "type": "image",
            "success": true,
            "output": path.display().to_string(),
            "prompt": args.prompt.trim(),
            "mode": match mode {
                Mode::Generate => "generate",
                Mode::Edit => "edit",
            },
            "aspect_ratio": studio.aspect_ratio().as_str(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let verb = match mode {
            Mode::Generate => "Generated",
            Mode::Edit => "Edited",
        };
        println!("{} image: {}", verb, path.display());
    }

    Ok(())
}

fn show_history(json_output: bool) -> anyhow::Result<()> {
    let store = open_store()?;
    let log = store.load();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&log)?);
        return Ok(());
    }

    if log.is_empty() {
        println!("No history yet.");
        return Ok(());
    }

    for (index, entry) in log.iter().enumerate() {
        let when = chrono::DateTime::from_timestamp_millis(entry.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown time".to_string());
        println!("{index:>2}  {when}  {}", entry.prompt);
    }

    Ok(())
}

fn clear_history(args: ClearArgs) -> anyhow::Result<()> {
    if !args.yes {
        print!("Are you sure you want to clear your history? [y/N] ");
        std::io::stdout().flush()?;

        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let mut store = open_store()?;
    store.clear();
    println!("History cleared.");

    Ok(())
}

fn list_prompts(json_output: bool) -> anyhow::Result<()> {
    if json_output {
        let result = serde_json::json!({
            "examples": EXAMPLE_PROMPTS,
            "detailed_example": DETAILED_EXAMPLE_PROMPT,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Example prompts:\n");
        for prompt in EXAMPLE_PROMPTS {
            println!("  {prompt}");
        }
        println!("\nDetailed example:\n  {DETAILED_EXAMPLE_PROMPT}");
    }

    Ok(())
}
