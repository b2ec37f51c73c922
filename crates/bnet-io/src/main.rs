use bnet_io::cli::{run_check_command, run_infer_command, run_order_command, Cli, Commands};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Infer {
            model,
            queries,
            algorithm,
            steps,
            workers,
            reserved_cores,
            seed,
            output,
        } => {
            run_infer_command(
                model,
                queries,
                algorithm,
                steps,
                workers,
                reserved_cores,
                seed,
                output,
            )
            .await?;
        }
        Commands::Order { model, bfs } => run_order_command(model, bfs).await?,
        Commands::Check { model } => run_check_command(model).await?,
    }

    Ok(())
}
