use crate::demo::{
    run_demo, run_distribution, run_render, DemoArgs, DistributionArgs, RenderArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use milegado::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "milegado-api",
    about = "Draft, store and render Chilean open wills from the command line or over HTTP",
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
    /// Work with a will submission offline
    Will {
        #[command(subcommand)]
        command: WillCommand,
    },
    /// Run an end-to-end demo: sign up, submit, distribute and render
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum WillCommand {
    /// Validate a submission file and write its preview or printable document
    Render(RenderArgs),
    /// Compute the inheritance split for a beneficiary CSV
    Distribution(DistributionArgs),
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
        Command::Will {
            command: WillCommand::Render(args),
        } => run_render(args),
        Command::Will {
            command: WillCommand::Distribution(args),
        } => run_distribution(args),
        Command::Demo(args) => run_demo(args).await,
    }
}
