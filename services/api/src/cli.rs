use crate::demo::{run_demo, run_validate, run_value, DemoArgs, ValidateArgs, ValueArgs};
use crate::server;
use assessor_ai::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Assessment Control Program",
    about = "Validate, value, and route property assessment requests",
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
    /// Validate property records from a JSON or CSV file
    Validate(ValidateArgs),
    /// Value property records from a JSON or CSV file
    Value(ValueArgs),
    /// Walk sample records through every agent
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

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Validate(args) => run_validate(args),
        Command::Value(args) => run_value(args),
        Command::Demo(args) => run_demo(args),
    }
}
