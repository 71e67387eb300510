// Shared transport construction for the REST client and event streams.
//
// Both sides honour `insecure_skip_verify`: reqwest through its own switch,
// tungstenite through a rustls config carrying a verifier that accepts any
// server certificate.

use std::sync::Arc;
use std::time::Duration;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::{DigitallySignedStruct, SignatureScheme};
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};
use tokio_tungstenite::Connector;

use crate::config::ClientConfig;
use crate::error::Error;

const USER_AGENT: &str = concat!("unified/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the pooled HTTP client shared by every REST call.
pub fn build_http_client(config: &ClientConfig) -> Result<reqwest::Client, Error> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .danger_accept_invalid_certs(config.insecure_skip_verify)
        .build()
        .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
}

/// TLS connector for `wss://` handshakes.
///
/// `None` lets tungstenite use its default webpki-rooted config.
pub fn websocket_connector(config: &ClientConfig) -> Result<Option<Connector>, Error> {
    if !config.insecure_skip_verify {
        return Ok(None);
    }

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let tls = rustls::ClientConfig::builder_with_provider(Arc::clone(&provider))
        .with_safe_default_protocol_versions()
        .map_err(|e| Error::Tls(format!("unsupported protocol versions: {e}")))?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate(provider)))
        .with_no_client_auth();

    Ok(Some(Connector::Rustls(Arc::new(tls))))
}

/// Skips chain and hostname checks but still verifies handshake signatures,
/// so the peer must hold the key for the certificate it presents.
#[derive(Debug)]
struct AcceptAnyCertificate(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verified_connector_defers_to_tungstenite() {
        let mut config = ClientConfig::new("key");
        config.insecure_skip_verify = false;
        assert!(matches!(websocket_connector(&config), Ok(None)));
    }

    #[test]
    fn insecure_connector_uses_rustls() {
        let config = ClientConfig::new("key");
        assert!(matches!(
            websocket_connector(&config),
            Ok(Some(Connector::Rustls(_)))
        ));
    }
}
