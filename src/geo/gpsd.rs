use std::io;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{timeout_at, Instant};

use super::locate::{Coordinates, LocateError, PositionOptions, PositionProvider};

const WATCH_COMMAND: &[u8] = b"?WATCH={\"enable\":true,\"json\":true};\n";

/// Reads a fix from a local gpsd daemon.
pub struct GpsdProvider {
    addr: String,
}

impl GpsdProvider {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "class")]
enum Report {
    #[serde(rename = "TPV")]
    Tpv {
        #[serde(default)]
        mode: u8,
        lat: Option<f64>,
        lon: Option<f64>,
    },
    #[serde(rename = "DEVICES")]
    Devices {
        #[serde(default)]
        devices: Vec<serde_json::Value>,
    },
    #[serde(other)]
    Other,
}

fn io_to_locate_error(e: &io::Error) -> LocateError {
    match e.kind() {
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::NotFound
        | io::ErrorKind::AddrNotAvailable => LocateError::Unsupported,
        io::ErrorKind::PermissionDenied => LocateError::PermissionDenied,
        io::ErrorKind::TimedOut => LocateError::Timeout,
        io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::UnexpectedEof => LocateError::PositionUnavailable,
        _ => LocateError::Unknown,
    }
}

#[async_trait]
impl PositionProvider for GpsdProvider {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinates, LocateError> {
        let deadline = Instant::now() + options.timeout;

        let stream = match timeout_at(deadline, TcpStream::connect(&self.addr)).await {
            Err(_) => return Err(LocateError::Timeout),
            Ok(Err(e)) => {
                tracing::debug!("gpsd connect to {} failed: {}", self.addr, e);
                return Err(io_to_locate_error(&e));
            }
            Ok(Ok(stream)) => stream,
        };

        let (read, mut write) = stream.into_split();
        write
            .write_all(WATCH_COMMAND)
            .await
            .map_err(|e| io_to_locate_error(&e))?;

        // Reports that follow WATCH are live, so every fix seen here
        // satisfies a zero maximum age.
        let mut lines = BufReader::new(read).lines();
        let mut two_d_fix = None;

        loop {
            let line = match timeout_at(deadline, lines.next_line()).await {
                Err(_) => return two_d_fix.ok_or(LocateError::Timeout),
                Ok(Err(e)) => return Err(io_to_locate_error(&e)),
                Ok(Ok(None)) => return two_d_fix.ok_or(LocateError::PositionUnavailable),
                Ok(Ok(Some(line))) => line,
            };

            let report = match serde_json::from_str::<Report>(&line) {
                Ok(report) => report,
                Err(e) => {
                    tracing::debug!("Skipping unparseable gpsd line: {}", e);
                    continue;
                }
            };

            match report {
                Report::Devices { devices } if devices.is_empty() => {
                    return Err(LocateError::Unsupported);
                }
                Report::Tpv {
                    mode,
                    lat: Some(latitude),
                    lon: Some(longitude),
                } if mode >= 2 => {
                    let coords = Coordinates {
                        latitude,
                        longitude,
                    };
                    if mode >= 3 || !options.high_accuracy {
                        return Ok(coords);
                    }
                    two_d_fix = Some(coords);
                }
                _ => {}
            }
        }
    }
}
