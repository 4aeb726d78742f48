use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use picture_prompt::config::{self, Config};
use picture_prompt::shell::{HELP, run_shell};
use picture_prompt::{DownloadOutcome, GenerateOutcome, ToggleOutcome, Workbench};

/// Picture Prompt - turn a text prompt into images and save the ones you like
#[derive(Parser, Debug)]
#[command(
    name = "picture-prompt",
    about = "Turn a text prompt into retrieved images, pick a subset, and save it locally",
    after_help = "ENVIRONMENT VARIABLES:\n\
        PICTURE_PROMPT_API_BASE      Base address of the generation service\n\
        PICTURE_PROMPT_OUTPUT_DIR    Directory for saved files\n\
        PICTURE_PROMPT_ARCHIVE_NAME  File name for multi-image saves\n\
        PICTURE_PROMPT_LOG           Log filter (e.g. info, picture_prompt=debug)"
)]
struct Args {
    /// Base address of the generation service
    #[arg(long, global = true, env = "PICTURE_PROMPT_API_BASE")]
    api_base: Option<String>,

    /// Directory where images are saved
    #[arg(short, long, global = true, env = "PICTURE_PROMPT_OUTPUT_DIR")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate images for a prompt and list them
    Generate {
        /// What to look for
        prompt: String,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate images for a prompt and save a selection of them
    Fetch {
        /// What to look for
        prompt: String,

        /// Positions to save, in order (e.g. "2,0"); archive entries follow this order
        #[arg(short, long, value_delimiter = ',')]
        select: Vec<usize>,

        /// Save only the first result
        #[arg(long, conflicts_with = "select")]
        first: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive session: prompt, generate, select, download
    Shell,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_env(config::ENV_LOG)
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config: Config = config::get().clone();
    if let Some(base) = args.api_base {
        config = config.api_base(base);
    }
    if let Some(dir) = args.output {
        config = config.output_dir(dir);
    }

    match args.command {
        Some(Commands::Generate { prompt, json }) => {
            let mut workbench = Workbench::from_config(&config)?;
            workbench.set_prompt(prompt);
            check_generation(workbench.generate().await)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&workbench.snapshot())?);
            } else {
                print_results(&workbench);
            }
        }

        Some(Commands::Fetch {
            prompt,
            select,
            first,
            json,
        }) => {
            let mut workbench = Workbench::from_config(&config)?;
            workbench.set_prompt(prompt);
            check_generation(workbench.generate().await)?;

            let outcome = if first {
                workbench.download_first().await
            } else {
                workbench.toggle_selection_mode();
                let order: Vec<usize> = if select.is_empty() {
                    (0..workbench.results().len()).collect()
                } else {
                    select
                };
                for index in order {
                    if workbench.toggle_item(index) != ToggleOutcome::Added {
                        eprintln!("Warning: skipping position {} (invalid or repeated)", index);
                    }
                }
                workbench.download_selected().await
            };

            match outcome {
                DownloadOutcome::Saved(artifact) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&artifact)?);
                    } else {
                        println!("Saved {}", artifact.path.display());
                        for entry in &artifact.entries {
                            println!("  {} <- {}", entry.name, entry.url);
                        }
                    }
                }
                DownloadOutcome::Nothing => println!("Nothing to download."),
                DownloadOutcome::Failed(e) => return Err(e.into()),
            }
        }

        Some(Commands::Shell) => {
            let mut workbench = Workbench::from_config(&config)?;
            println!("Picture Prompt shell. API: {}", config.api.base_url);
            println!("{}", HELP);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            run_shell(&mut workbench, stdin, &mut stdout).await?;
        }

        None => {
            println!("Picture Prompt - turn a text prompt into images and save the ones you like");
            println!();
            println!("Usage: picture-prompt <COMMAND>");
            println!();
            println!("Commands:");
            println!("  generate  Generate images for a prompt and list them");
            println!("  fetch     Generate and save a selection (one image or images.zip)");
            println!("  shell     Interactive session");
            println!();
            println!("Run with --help for more information.");
        }
    }

    Ok(())
}

fn check_generation(outcome: GenerateOutcome) -> Result<(), Box<dyn Error>> {
    match outcome {
        GenerateOutcome::Published { .. } => Ok(()),
        GenerateOutcome::Ignored => Err("Prompt is empty".into()),
        GenerateOutcome::Busy => Err("A generation is already running".into()),
        GenerateOutcome::Failed(e) => Err(e.into()),
    }
}

fn print_results(workbench: &Workbench) {
    let results = workbench.results();
    if results.is_empty() {
        println!("No results for '{}'.", results.prompt);
        return;
    }
    println!("{} results for '{}':", results.len(), results.prompt);
    for (index, item) in results.iter().enumerate() {
        println!("  [{}] {}", index, item.description);
        println!("      {}", item.url);
    }
}
