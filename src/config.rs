use crate::{
    lpd::transmit::DEFAULT_CHUNK_SIZE,
    model::job::JobRequest,
    transport::{
        TransportConfig,
        DEFAULT_PORT,
        DEFAULT_SOURCE_PORT,
    },
};
use anyhow::{
    bail,
    Result,
};
use clap::Parser;
use std::{
    path::PathBuf,
    time::Duration,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// Send one file to a line printer daemon
pub struct Cli {
    /// Address of the print server
    #[clap(short, long, env = "LPRSEND_ADDRESS")]
    pub address: String,
    /// Port of the print server
    #[clap(short, long, default_value_t = DEFAULT_PORT, env = "LPRSEND_PORT")]
    pub port: u16,
    /// Local port to send from, 0 lets the OS pick
    #[clap(short = 'P', long, default_value_t = DEFAULT_SOURCE_PORT, env = "LPRSEND_SOURCE_PORT")]
    pub source_port: u16,
    /// Queue to print to
    #[clap(short, long, env = "LPRSEND_QUEUE")]
    pub queue: String,
    /// File to print
    #[clap(short, long, env = "LPRSEND_FILE")]
    pub file: PathBuf,
    /// Job number, taken modulo 1000. Random when omitted
    #[clap(short, long, env = "LPRSEND_JOB")]
    pub job: Option<u32>,
    /// Log frames and the control file
    #[clap(short, long, env = "LPRSEND_DEBUG")]
    pub debug: bool,
    /// Reset the connection on close instead of waiting in TIME_WAIT
    #[clap(short = 'R', long, env = "LPRSEND_LINGER")]
    pub linger: bool,
    /// Host name to put in the control file
    #[clap(long, env = "LPRSEND_HOST")]
    pub host: Option<String>,
    /// User name to put in the control file
    #[clap(long, env = "LPRSEND_USER")]
    pub user: Option<String>,
    /// Name shown for the job, defaults to the file path
    #[clap(long, env = "LPRSEND_NAME")]
    pub name: Option<String>,
    /// Seconds to wait on any single network operation, 0 waits forever
    #[clap(long, default_value = "0", env = "LPRSEND_TIMEOUT")]
    pub timeout: u64,
}

/// Everything a run needs, fixed before the first byte goes out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub transport: TransportConfig,
    pub job: JobRequest,
    pub file: PathBuf,
    pub chunk_size: usize,
}

impl TryFrom<Cli> for Config {
    type Error = anyhow::Error;

    fn try_from(args: Cli) -> Result<Self> {
        if args.queue.is_empty() {
            bail!("Queue name must not be empty");
        }
        if args.queue.contains('\n') {
            bail!("Queue name must not contain a line feed");
        }

        let host = args.host.unwrap_or_else(system_host_name);
        let user = args.user.unwrap_or_else(login_name);
        if host.is_empty() || user.is_empty() {
            bail!("Host and user names must not be empty");
        }
        if host.contains(char::is_whitespace) {
            bail!("Host name must not contain whitespace");
        }

        let print_name = args
            .name
            .unwrap_or_else(|| args.file.display().to_string());
        let timeout = (args.timeout > 0).then(|| Duration::from_secs(args.timeout));

        Ok(Self {
            transport: TransportConfig {
                address: args.address,
                port: args.port,
                source_port: args.source_port,
                linger: args.linger,
                timeout,
            },
            job: JobRequest {
                queue: args.queue,
                host,
                user,
                print_name,
                job_number: args.job,
            },
            file: args.file,
            chunk_size: DEFAULT_CHUNK_SIZE,
        })
    }
}

fn system_host_name() -> String {
    std::fs::read_to_string("/proc/sys/kernel/hostname")
        .ok()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .or_else(|| std::env::var("HOSTNAME").ok())
        .unwrap_or_else(|| "localhost".to_string())
}

fn login_name() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .unwrap_or_else(|_| "nobody".to_string())
}
