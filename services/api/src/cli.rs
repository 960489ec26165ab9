use crate::demo::{run_demo, DemoArgs};
use crate::server;
use chrono::{Local, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use conduta::error::AppError;
use conduta::programacao::fechar_pendentes;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "Conduta",
    about = "Run the conduct-scoring and administrative reporting service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Close overdue routine schedule entries and exit
    FecharProgramacao(FecharArgs),
    /// Run a seeded walkthrough printing the conceitos board
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct FecharArgs {
    /// Reference instant (YYYY-MM-DDTHH:MM:SS). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_datetime)]
    pub(crate) agora: Option<NaiveDateTime>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::FecharProgramacao(args) => run_fechar(args),
        Command::Demo(args) => run_demo(args),
    }
}

fn run_fechar(args: FecharArgs) -> Result<(), AppError> {
    let agora = args.agora.unwrap_or_else(|| Local::now().naive_local());
    let store = crate::infra::seeded_store(Duration::from_secs(30));
    let fechados = fechar_pendentes(store.as_ref(), agora)?;

    if fechados.is_empty() {
        println!("No schedule entries to close at {agora}");
    } else {
        println!("Closed {} schedule entries at {agora}:", fechados.len());
        for id in fechados {
            println!("- {id}");
        }
    }
    Ok(())
}
