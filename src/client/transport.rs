//! Transport seam: how the client gets a byte stream to a server.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tracing::{info, warn};

use crate::config::ServerConfig;

/// Any duplex byte stream the client can speak over.
pub trait AsyncStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> AsyncStream for T {}

pub type BoxedStream = Box<dyn AsyncStream>;

/// Opens connections to a server.
///
/// The default is [`TcpConnector`]; tests substitute in-memory streams.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, server: &ServerConfig) -> io::Result<BoxedStream>;
}

/// TCP, optionally wrapped in TLS verified against the platform roots.
#[derive(Clone, Copy, Debug, Default)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, server: &ServerConfig) -> io::Result<BoxedStream> {
        let tcp = TcpStream::connect((server.host.as_str(), server.port)).await?;
        tcp.set_nodelay(true)?;
        if !server.tls.enabled {
            return Ok(Box::new(tcp));
        }

        let hostname = server.tls.server_name.as_deref().unwrap_or(&server.host);
        let tls = upgrade_to_tls(tcp, hostname).await?;
        Ok(Box::new(tls))
    }
}

async fn upgrade_to_tls(
    tcp: TcpStream,
    hostname: &str,
) -> io::Result<tokio_rustls::client::TlsStream<TcpStream>> {
    let mut roots = RootCertStore::empty();
    let certs = rustls_native_certs::load_native_certs();
    for cert in certs.certs {
        if let Err(e) = roots.add(cert) {
            warn!("Failed to add root cert: {}", e);
        }
    }
    for e in &certs.errors {
        warn!("Error loading native certs: {}", e);
    }

    let config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    let connector = TlsConnector::from(Arc::new(config));
    let server_name = ServerName::try_from(hostname.to_string())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let stream = connector.connect(server_name, tcp).await?;
    info!(hostname = %hostname, "TLS handshake completed");
    Ok(stream)
}
