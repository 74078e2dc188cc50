use crate::error::{
    LpdError,
    Result,
    Step,
};
use log::{
    debug,
    info,
};
use std::{
    io,
    net::{
        Ipv4Addr,
        Ipv6Addr,
        SocketAddr,
    },
    time::Duration,
};
use tokio::{
    net::{
        lookup_host,
        TcpSocket,
        TcpStream,
    },
    time::timeout,
};

pub const DEFAULT_PORT: u16 = 515;
/// Daemons expect clients on a reserved port in 721-731.
pub const DEFAULT_SOURCE_PORT: u16 = 731;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub address: String,
    pub port: u16,
    /// 0 leaves the local port to the OS.
    pub source_port: u16,
    /// Close with RST instead of lingering in TIME_WAIT.
    pub linger: bool,
    pub timeout: Option<Duration>,
}

fn connect_error(source: io::Error) -> LpdError {
    LpdError::transport(Step::Connect, source)
}

// Newer tokio deprecates set_linger; TcpSocket has no replacement across the 1.x versions we allow.
#[allow(deprecated)]
fn set_zero_linger(socket: &TcpSocket) -> io::Result<()> {
    socket.set_linger(Some(Duration::ZERO))
}

pub async fn connect(config: &TransportConfig) -> Result<TcpStream> {
    let destination = lookup_host((config.address.as_str(), config.port))
        .await
        .map_err(connect_error)?
        .next()
        .ok_or_else(|| {
            connect_error(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no address for {}", config.address),
            ))
        })?;

    let socket = match destination {
        SocketAddr::V4(_) => TcpSocket::new_v4(),
        SocketAddr::V6(_) => TcpSocket::new_v6(),
    }
    .map_err(connect_error)?;

    socket.set_reuseaddr(true).map_err(connect_error)?;
    if config.linger {
        set_zero_linger(&socket).map_err(connect_error)?;
    }

    if config.source_port != 0 {
        let local = match destination {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.source_port)),
            SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, config.source_port)),
        };
        debug!("Binding to {}", local);
        socket.bind(local).map_err(connect_error)?;
    }

    info!("Connecting to {}", destination);
    let stream = match config.timeout {
        Some(limit) => timeout(limit, socket.connect(destination))
            .await
            .map_err(|_| {
                connect_error(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("no connection within {:?}", limit),
                ))
            })?,
        None => socket.connect(destination).await,
    }
    .map_err(connect_error)?;

    debug!("Connected from {:?}", stream.local_addr());
    Ok(stream)
}
