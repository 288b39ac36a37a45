//! Minimal SNTP client used once at startup to set the wall clock.
//!
//! Sends a single 48-byte client request over UDP and reads the server's
//! transmit timestamp. No round-trip delay correction is applied; the
//! controller only needs second-level accuracy for run reports.
//!
//! The exchange itself is async ([`SntpTimeSource::query`]). The blocking
//! [`TimeSource`] impl drives it on a multi-thread runtime handle and must be
//! called from outside that runtime's worker threads, as the boot sequence
//! does.

use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::runtime::Handle;

use crate::config::ClockConfig;
use crate::traits::TimeSource;

/// Size of an SNTP packet without extensions.
pub const PACKET_LEN: usize = 48;

/// Seconds between the NTP era start (1900) and the Unix epoch.
pub const NTP_UNIX_OFFSET_SECS: u64 = 2_208_988_800;

/// Length of one NTP era (2^32 seconds).
const NTP_ERA_SECS: u64 = 1 << 32;

/// Transmit seconds below this are read as era 1 (from February 2036).
const ERA_PIVOT: u64 = 0x8000_0000;

/// Byte offset of the transmit timestamp.
const TRANSMIT_OFFSET: usize = 40;

/// LI = 0, VN = 3, Mode = 3 (client)
const CLIENT_REQUEST_FLAGS: u8 = 0x1B;

const MODE_SERVER: u8 = 4;

/// Errors from an SNTP exchange.
#[derive(Debug, thiserror::Error)]
pub enum SntpError {
    /// Socket setup, send, or receive failed.
    #[error("SNTP I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// No reply arrived in time.
    #[error("SNTP server did not answer within {0:?}")]
    Timeout(Duration),
    /// Fewer bytes than a full packet came back.
    #[error("SNTP response too short: {0} bytes")]
    ShortResponse(usize),
    /// The reply was not a server-mode packet.
    #[error("SNTP response has mode {0}, expected server mode")]
    UnexpectedMode(u8),
    /// The server did not fill in its transmit timestamp.
    #[error("SNTP response has no transmit timestamp")]
    MissingTimestamp,
}

/// Builds a client request packet.
pub fn request_packet() -> [u8; PACKET_LEN] {
    let mut packet = [0u8; PACKET_LEN];
    packet[0] = CLIENT_REQUEST_FLAGS;
    packet
}

/// Extracts the server transmit time as Unix milliseconds (UTC).
///
/// Seconds values with the top bit clear are taken from NTP era 1, so the
/// client keeps working after the 32-bit counter wraps in 2036.
///
/// # Example
///
/// ```rust
/// use slide_timer::services::sntp::{parse_response, PACKET_LEN, NTP_UNIX_OFFSET_SECS};
///
/// let mut reply = [0u8; PACKET_LEN];
/// reply[0] = 0x1C; // server mode
/// let secs = (NTP_UNIX_OFFSET_SECS + 60) as u32;
/// reply[40..44].copy_from_slice(&secs.to_be_bytes());
///
/// assert_eq!(parse_response(&reply).unwrap(), 60_000);
/// ```
pub fn parse_response(buf: &[u8]) -> Result<i64, SntpError> {
    if buf.len() < PACKET_LEN {
        return Err(SntpError::ShortResponse(buf.len()));
    }
    let mode = buf[0] & 0x07;
    if mode != MODE_SERVER {
        return Err(SntpError::UnexpectedMode(mode));
    }

    let word = |at: usize| u32::from_be_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]);
    let seconds = u64::from(word(TRANSMIT_OFFSET));
    let fraction = u64::from(word(TRANSMIT_OFFSET + 4));
    if seconds == 0 && fraction == 0 {
        return Err(SntpError::MissingTimestamp);
    }

    let seconds = if seconds < ERA_PIVOT {
        seconds + NTP_ERA_SECS
    } else {
        seconds
    };
    let unix_secs = seconds as i64 - NTP_UNIX_OFFSET_SECS as i64;
    let millis = ((fraction * 1_000) >> 32) as i64;
    Ok(unix_secs * 1_000 + millis)
}

/// [`TimeSource`] backed by an SNTP server.
#[derive(Clone, Debug)]
pub struct SntpTimeSource {
    host: String,
    port: u16,
    timeout: Duration,
    runtime: Handle,
}

impl SntpTimeSource {
    /// Creates a client for `host:port` with a 3 second timeout.
    ///
    /// `runtime` drives the exchange when used as a blocking [`TimeSource`].
    pub fn new(host: &str, port: u16, runtime: Handle) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: Duration::from_secs(3),
            runtime,
        }
    }

    /// Creates a client from the clock section of the config.
    pub fn from_config(config: &ClockConfig, runtime: Handle) -> Self {
        Self::new(&config.ntp_host, config.ntp_port, runtime)
            .with_timeout(Duration::from_millis(u64::from(config.timeout_ms)))
    }

    /// Sets how long to wait for a reply.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Server address as `host:port`.
    pub fn server(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Performs one request/reply exchange and returns UTC milliseconds.
    pub async fn query(&self) -> Result<i64, SntpError> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect((self.host.as_str(), self.port)).await?;
        socket.send(&request_packet()).await?;

        let mut buf = [0u8; 2 * PACKET_LEN];
        let len = tokio::time::timeout(self.timeout, socket.recv(&mut buf))
            .await
            .map_err(|_| SntpError::Timeout(self.timeout))??;
        parse_response(&buf[..len])
    }
}

impl TimeSource for SntpTimeSource {
    type Error = SntpError;

    fn fetch_utc_ms(&mut self) -> Result<i64, Self::Error> {
        log::debug!("querying SNTP server {}", self.server());
        self.runtime.block_on(self.query())
    }
}
