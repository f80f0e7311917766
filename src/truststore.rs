//! Certificate-trust collaborator

use lettre::transport::smtp::client::Certificate;

/// How strictly the server identity is checked during a TLS handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostnameVerificationPolicy {
    /// Verify that the presented certificate chain matches the hostname
    #[default]
    Strict,
    /// Accept any certificate presented by the peer
    Any,
}

/// Supplies the trust anchors used for outgoing TLS connections.
#[cfg_attr(test, mockall::automock)]
pub trait TruststoreProvider: Send + Sync {
    /// Custom trust anchors for the SMTP session.
    ///
    /// `None` leaves certificate handling to the transport defaults.
    fn root_certificates(&self) -> Option<Vec<Certificate>>;

    fn hostname_verification_policy(&self) -> HostnameVerificationPolicy;
}

/// Platform default trust: no custom anchors, strict identity checking.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTruststore;

impl TruststoreProvider for DefaultTruststore {
    fn root_certificates(&self) -> Option<Vec<Certificate>> {
        None
    }

    fn hostname_verification_policy(&self) -> HostnameVerificationPolicy {
        HostnameVerificationPolicy::Strict
    }
}
