use crate::{
    config::{
        Cli,
        Config,
    },
    lpd::{
        session::JobSession,
        transmit::DataPayload,
    },
    model::job::RandomJobNumbers,
};
use anyhow::{
    Context,
    Result,
};
use clap::Parser;
use log::{
    error,
    info,
};

mod config;
mod error;
mod lpd;
mod model;
mod transport;

async fn run(config: Config) -> Result<()> {
    // Fail on a bad file before touching the network
    let payload = DataPayload::open(&config.file)
        .await
        .with_context(|| format!("Cannot print {}", config.file.display()))?;

    let stream = transport::connect(&config.transport).await?;
    let mut session = JobSession::new(stream, config.job, &mut RandomJobNumbers)
        .with_chunk_size(config.chunk_size)
        .with_timeout(config.transport.timeout);
    info!(
        "Submitting {} to queue {} as job {}",
        session.job().print_name(),
        session.job().queue(),
        session.job().number()
    );

    let receipt = match session.submit(payload).await {
        Ok(receipt) => receipt,
        Err(e) => {
            if let Some(step) = e.step() {
                error!(
                    "Job {} failed at {} [state={:?}]",
                    session.job().number(),
                    step,
                    session.state()
                );
            }
            return Err(e.into());
        }
    };
    info!(
        "Job {} accepted by {} [{}={} bytes, {}={} bytes]",
        receipt.job_number,
        config.transport.address,
        receipt.control_file,
        receipt.control_len,
        receipt.data_file,
        receipt.data_len
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = Config::try_from(args)?;
    if let Err(e) = run(config).await {
        error!("{:#}", e);
        return Err(e);
    }

    Ok(())
}
