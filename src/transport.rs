//! SMTP connection properties and TLS posture

use std::fmt;
use std::time::Duration;

use lazy_static::lazy_static;
use lettre::transport::smtp::client::TlsParameters;
use lettre::transport::smtp::SMTP_PORT;

use crate::config::SmtpConfig;
use crate::error::{EmailError, Result};
use crate::truststore::{HostnameVerificationPolicy, TruststoreProvider};

/// Fixed TCP connect deadline, not configurable per realm.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Fixed socket read/write deadline, not configurable per realm.
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_HOST: &str = "localhost";

lazy_static! {
    /// TLS protocol names offered by the default client configuration,
    /// computed once per process. `None` when the enumeration comes up
    /// empty.
    static ref SUPPORTED_TLS_PROTOCOLS: Option<Vec<&'static str>> = supported_tls_protocols();
}

fn supported_tls_protocols() -> Option<Vec<&'static str>> {
    let protocols: Vec<&'static str> = rustls::DEFAULT_VERSIONS
        .iter()
        .filter_map(|supported| match supported.version {
            rustls::ProtocolVersion::TLSv1_2 => Some("TLSv1.2"),
            rustls::ProtocolVersion::TLSv1_3 => Some("TLSv1.3"),
            _ => None,
        })
        .collect();

    if protocols.is_empty() {
        tracing::warn!("failed to get list of supported ssl protocols");
        return None;
    }
    Some(protocols)
}

/// Connection-level view of a realm's SMTP settings, derived once per send.
#[derive(Clone)]
pub struct ConnectionProperties {
    pub host: String,
    pub port: u16,
    pub auth: bool,
    pub ssl: bool,
    pub starttls: bool,
    /// Attached only when the session requests transport security
    pub ssl_protocols: Option<Vec<&'static str>>,
    /// Present only when the truststore supplies custom trust anchors
    pub check_server_identity: Option<bool>,
    /// Accept any certificate chain known to the truststore
    pub trust_any: bool,
    pub envelope_from: Option<String>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    tls_parameters: Option<TlsParameters>,
}

impl ConnectionProperties {
    /// Translate the realm configuration into connection properties.
    ///
    /// When any of `ssl`, `starttls` or `auth` is enabled, the supported
    /// TLS protocol list is attached and the truststore is consulted: with
    /// custom trust anchors and an accept-any hostname policy, server
    /// identity checking is disabled entirely; with a strict policy it
    /// stays on. Without custom anchors the transport keeps its default
    /// certificate handling.
    pub fn from_config(config: &SmtpConfig, truststore: &dyn TruststoreProvider) -> Result<Self> {
        let host = config.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = config.port.unwrap_or(SMTP_PORT);
        let secured = config.ssl || config.starttls || config.auth;

        let mut ssl_protocols = None;
        let mut check_server_identity = None;
        let mut trust_any = false;
        let mut tls_parameters = None;

        if secured {
            ssl_protocols = SUPPORTED_TLS_PROTOCOLS.clone();

            let mut builder = TlsParameters::builder(host.clone());
            if let Some(roots) = truststore.root_certificates() {
                for certificate in roots {
                    builder = builder.add_root_certificate(certificate);
                }
                match truststore.hostname_verification_policy() {
                    HostnameVerificationPolicy::Any => {
                        trust_any = true;
                        check_server_identity = Some(false);
                        builder = builder
                            .dangerous_accept_invalid_certs(true)
                            .dangerous_accept_invalid_hostnames(true);
                    }
                    HostnameVerificationPolicy::Strict => {
                        check_server_identity = Some(true);
                    }
                }
            }
            tls_parameters = Some(builder.build().map_err(|e| {
                EmailError::Configuration(format!("failed to build tls parameters: {e}"))
            })?);
        }

        Ok(Self {
            host,
            port,
            auth: config.auth,
            ssl: config.ssl,
            starttls: config.starttls,
            ssl_protocols,
            check_server_identity,
            trust_any,
            envelope_from: config.envelope_from.clone(),
            connect_timeout: CONNECT_TIMEOUT,
            read_timeout: READ_TIMEOUT,
            tls_parameters,
        })
    }

    /// TLS material for the session; `None` for plaintext-only sessions.
    pub(crate) fn tls_parameters(&self) -> Option<&TlsParameters> {
        self.tls_parameters.as_ref()
    }
}

impl fmt::Debug for ConnectionProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProperties")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("auth", &self.auth)
            .field("ssl", &self.ssl)
            .field("starttls", &self.starttls)
            .field("ssl_protocols", &self.ssl_protocols)
            .field("check_server_identity", &self.check_server_identity)
            .field("trust_any", &self.trust_any)
            .field("envelope_from", &self.envelope_from)
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}
