use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{ArgAction, Args, Parser, Subcommand};
use crossterm::style::Stylize;
use tracing_subscriber::EnvFilter;

use contract_drafter::config::{Environment, FileConfig, FlagSettings, Settings};
use contract_drafter::term::{self, Console, Terminal};
use contract_drafter::workflow::generate_contract;
use contract_drafter::workflow::output::{default_output_name, save_contract};
use contract_drafter::workflow::session::Session;

#[derive(Parser, Debug)]
#[command(
    name = "contract-drafter",
    version,
    about = "Draft a German freelance contract in five guided LLM stages",
    subcommand_required = true,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    provider: ProviderArgs,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a contract; asks only for values not given as flags
    Generate(GenerateArgs),
    /// Guided session with banner and output-file question
    Interactive(RunArgs),
}

/// Provider and sampling settings shared by all commands.
#[derive(Args, Debug)]
struct ProviderArgs {
    /// Model name
    #[arg(long, global = true)]
    model: Option<String>,

    /// Sampling temperature (0.0 - 2.0)
    #[arg(long, global = true)]
    temperature: Option<f32>,

    /// Maximum output tokens per call
    #[arg(long, global = true)]
    max_tokens: Option<u32>,

    /// Chat-completions base URL [env: OPENAI_BASE_URL]
    #[arg(long, value_name = "URL", global = true)]
    base_url: Option<String>,

    /// YAML file with model, temperature, max_tokens, base_url
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Directory holding the five stage templates
    #[arg(short, long, value_name = "PATH", default_value = "./prompts")]
    directory: PathBuf,

    /// Where to write the final contract
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Provider API key [env: OPENAI_API_KEY]
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Short project description
    #[arg(short, long, value_name = "TEXT")]
    prompt: Option<String>,

    #[command(flatten)]
    run: RunArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Generate(args) => cmd_generate(args, &cli.provider).await,
        Command::Interactive(args) => cmd_interactive(args, &cli.provider).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "contract_drafter=info",
        _ => "contract_drafter=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn cmd_generate(args: GenerateArgs, provider: &ProviderArgs) -> Result<()> {
    let mut console = Console::new();
    let settings = resolve_settings(provider, args.run.api_key.as_deref(), &mut console)?;

    let session = run_pipeline(&settings, &mut console, &args.run.directory, args.prompt).await?;
    let path = save_contract(&session, args.run.output.as_deref())?;
    print_result(&session, &path);
    Ok(())
}

async fn cmd_interactive(args: RunArgs, provider: &ProviderArgs) -> Result<()> {
    term::print_banner();

    let mut console = Console::new();
    let settings = resolve_settings(provider, args.api_key.as_deref(), &mut console)?;

    let session = run_pipeline(&settings, &mut console, &args.directory, None).await?;

    let suggested = args
        .output
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| default_output_name(Local::now()));
    let answer = term::ask(&mut console, "Save the contract as:", Some(&suggested))?;
    let path = save_contract(&session, Some(Path::new(answer.trim())))?;
    print_result(&session, &path);
    Ok(())
}

fn resolve_settings(
    provider: &ProviderArgs,
    api_key: Option<&str>,
    term: &mut dyn Terminal,
) -> Result<Settings> {
    let file = match &provider.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let flags = FlagSettings {
        api_key: api_key.map(str::to_string),
        base_url: provider.base_url.clone(),
        model: provider.model.clone(),
        temperature: provider.temperature,
        max_tokens: provider.max_tokens,
    };
    Ok(Settings::resolve(
        &flags,
        &Environment::from_process(),
        &file,
        term,
    )?)
}

async fn run_pipeline(
    settings: &Settings,
    console: &mut Console,
    template_dir: &Path,
    prompt: Option<String>,
) -> Result<Session> {
    let chat = settings.chat_client();
    let session = generate_contract(&chat, console, template_dir, prompt)
        .await
        .context("contract generation failed")?;
    Ok(session)
}

fn print_result(session: &Session, path: &Path) {
    if let Some(text) = session.final_text() {
        term::print_saved(text, path);
    }
}
