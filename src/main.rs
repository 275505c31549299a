// src/main.rs

use stylepipe::engine::PipelineOutcome;
use stylepipe::{cli, logging, run};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(PipelineOutcome::Success) => {}
        Ok(PipelineOutcome::Failed) => std::process::exit(1),
        Err(err) => {
            eprintln!("stylepipe error: {err:?}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<PipelineOutcome> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
