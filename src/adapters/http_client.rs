use std::fs;
use std::sync::Arc;

use axum::body::Body;
use hyper::Request;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use rustls::RootCertStore;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};
use thiserror::Error;

use crate::config::TransportConfig;
use crate::ports::http_client::{HttpClient, HttpClientError, HttpResponseFuture};

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to read CA bundle {path}: {source}")]
    CaBundleRead {
        path: String,
        source: std::io::Error,
    },

    #[error("CA bundle {path} contains no usable certificates")]
    CaBundleEmpty { path: String },

    #[error("failed to load system trust roots: {0}")]
    NativeRoots(std::io::Error),
}

type HttpsClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, Body>;

/// TLS-capable client for the upstream, built once at startup from the
/// transport configuration and shared by the prober and the forwarder.
pub struct HyperHttpClient {
    client: HttpsClient,
}

impl HyperHttpClient {
    pub fn new(transport: &TransportConfig) -> Result<Self, TransportError> {
        let tls = Self::tls_config(transport)?;
        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(tls)
            .https_or_http()
            .enable_all_versions()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(https);
        Ok(Self { client })
    }

    fn tls_config(transport: &TransportConfig) -> Result<rustls::ClientConfig, TransportError> {
        if transport.insecure_skip_verify {
            tracing::warn!("upstream certificate verification is disabled");
            return Ok(rustls::ClientConfig::builder()
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(DisabledVerification::new()))
                .with_no_client_auth());
        }

        let mut roots = RootCertStore::empty();
        if let Some(path) = &transport.ca_bundle {
            let bundle_path = path.display().to_string();
            let pem = fs::read(path).map_err(|source| TransportError::CaBundleRead {
                path: bundle_path.clone(),
                source,
            })?;
            let certs = rustls_pemfile::certs(&mut pem.as_slice())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| TransportError::CaBundleRead {
                    path: bundle_path.clone(),
                    source,
                })?;
            let (added, _ignored) = roots.add_parsable_certificates(certs);
            if added == 0 {
                return Err(TransportError::CaBundleEmpty { path: bundle_path });
            }
            tracing::info!(ca_bundle = %bundle_path, roots = added, "using custom upstream trust roots");
        } else {
            for cert in rustls_native_certs::load_native_certs()
                .map_err(TransportError::NativeRoots)?
            {
                // Individual unusable system certs are skipped, same as the
                // platform verifier does.
                let _ = roots.add(cert);
            }
        }

        Ok(rustls::ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth())
    }
}

impl HttpClient for HyperHttpClient {
    fn send_request<'a>(&'a self, req: Request<Body>) -> HttpResponseFuture<'a> {
        let client = self.client.clone();
        let method = req.method().clone();
        let uri = req.uri().clone();

        Box::pin(async move {
            tracing::debug!(%method, %uri, "dispatching upstream request");
            match client.request(req).await {
                Ok(response) => {
                    tracing::debug!(%method, %uri, status = %response.status(), "upstream responded");
                    Ok(response.map(Body::new))
                }
                Err(err) => Err(HttpClientError::Connection(err.to_string())),
            }
        })
    }
}

/// Accepts any server certificate. Only reachable when the skip-verify flag
/// is set in the transport configuration.
#[derive(Debug)]
struct DisabledVerification(rustls::crypto::CryptoProvider);

impl DisabledVerification {
    fn new() -> Self {
        Self(rustls::crypto::aws_lc_rs::default_provider())
    }
}

impl ServerCertVerifier for DisabledVerification {
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
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn skip_verify_builds_a_client() {
        let transport = TransportConfig {
            ca_bundle: None,
            insecure_skip_verify: true,
        };
        assert!(HyperHttpClient::new(&transport).is_ok());
    }

    #[test]
    fn missing_ca_bundle_file_is_an_error() {
        let transport = TransportConfig {
            ca_bundle: Some(PathBuf::from("/nonexistent/ca.pem")),
            insecure_skip_verify: false,
        };
        assert!(matches!(
            HyperHttpClient::new(&transport),
            Err(TransportError::CaBundleRead { .. })
        ));
    }

    #[test]
    fn ca_bundle_without_certificates_is_an_error() {
        let mut ca = tempfile::NamedTempFile::new().unwrap();
        ca.write_all(b"this is not pem data").unwrap();

        let transport = TransportConfig {
            ca_bundle: Some(ca.path().to_path_buf()),
            insecure_skip_verify: false,
        };
        assert!(matches!(
            HyperHttpClient::new(&transport),
            Err(TransportError::CaBundleEmpty { .. })
        ));
    }
}
