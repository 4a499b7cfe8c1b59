use clap::Parser;
use gazeflow::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    gazeflow::init_tracing(cli.verbose);
    gazeflow::run(cli).await
}
