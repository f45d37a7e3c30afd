//! HTTPS transport.
//!
//! The [`Transport`] trait is the seam between the request pipeline and the
//! network. [`HttpTransport`] is the production implementation; tests plug in
//! a scripted mock instead.
//!
//! # Feature Flags
//!
//! `HttpTransport` requires the `http-client` feature (on by default).
//! PKCS#12 client certificates additionally need `native-tls`; PEM bundles
//! work with the default rustls backend.

use async_trait::async_trait;

use crate::Result;

/// Sends a request body and returns the response body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` (XML text) to `url`.
    ///
    /// `use_client_cert` asks for mutual TLS with the merchant certificate.
    async fn post(&self, url: &str, body: String, use_client_cert: bool) -> Result<String>;
}

#[cfg(feature = "http-client")]
pub use self::http::HttpTransport;

#[cfg(feature = "http-client")]
mod http {
    use async_trait::async_trait;

    use super::Transport;
    use crate::config::MerchantConfig;
    use crate::{Result, WxPayError};

    /// reqwest-backed transport.
    ///
    /// Holds two clients: a plain one, and one presenting the merchant's
    /// client certificate, built only when a certificate is configured.
    pub struct HttpTransport {
        plain: reqwest::Client,
        with_identity: Option<reqwest::Client>,
        timeout_secs: u64,
    }

    impl HttpTransport {
        /// Build the clients from the merchant configuration.
        pub fn new(config: &MerchantConfig) -> Result<Self> {
            let plain = Self::builder(config)
                .build()
                .map_err(|e| WxPayError::Transport(format!("failed to build HTTP client: {}", e)))?;

            let with_identity = match Self::identity_builder(config)? {
                Some(builder) => Some(builder.build().map_err(|e| {
                    WxPayError::Transport(format!("failed to build HTTP client: {}", e))
                })?),
                None => None,
            };

            Ok(Self {
                plain,
                with_identity,
                timeout_secs: config.timeout_secs,
            })
        }

        /// Whether requests needing a client certificate can be served.
        pub fn has_identity(&self) -> bool {
            self.with_identity.is_some()
        }

        fn builder(config: &MerchantConfig) -> reqwest::ClientBuilder {
            reqwest::Client::builder()
                .timeout(config.timeout())
                .user_agent(concat!("wxpay-rs/", env!("CARGO_PKG_VERSION")))
        }

        fn identity_builder(config: &MerchantConfig) -> Result<Option<reqwest::ClientBuilder>> {
            if let Some(pem) = &config.client_cert_pem {
                let identity = reqwest::Identity::from_pem(pem.as_bytes())
                    .map_err(|e| WxPayError::invalid_config("client_cert_pem", e.to_string()))?;
                return Ok(Some(
                    Self::builder(config).use_rustls_tls().identity(identity),
                ));
            }

            if let Some(_der) = &config.client_cert_p12 {
                #[cfg(feature = "native-tls")]
                {
                    let identity = reqwest::Identity::from_pkcs12_der(_der, config.p12_password())
                        .map_err(|e| WxPayError::invalid_config("client_cert_p12", e.to_string()))?;
                    return Ok(Some(
                        Self::builder(config).use_native_tls().identity(identity),
                    ));
                }
                #[cfg(not(feature = "native-tls"))]
                return Err(WxPayError::invalid_config(
                    "client_cert_p12",
                    "PKCS#12 certificates require the 'native-tls' feature; convert to PEM",
                ));
            }

            Ok(None)
        }

        fn map_reqwest_error(&self, url: &str, e: reqwest::Error) -> WxPayError {
            if e.is_timeout() {
                WxPayError::ConnectionTimeout {
                    operation: format!("POST {}", url),
                    timeout_ms: self.timeout_secs * 1000,
                }
            } else if e.is_connect() {
                WxPayError::ConnectionFailed {
                    target: url.to_string(),
                    reason: e.to_string(),
                }
            } else {
                WxPayError::Transport(format!("request to {} failed: {}", url, e))
            }
        }

        fn map_status_error(&self, status: u16, body: &str) -> WxPayError {
            WxPayError::Transport(format!("HTTP {}: {}", status, body))
        }
    }

    #[async_trait]
    impl Transport for HttpTransport {
        #[cfg_attr(
            feature = "tracing",
            tracing::instrument(skip(self, body), fields(bytes = body.len()))
        )]
        async fn post(&self, url: &str, body: String, use_client_cert: bool) -> Result<String> {
            let client = if use_client_cert {
                self.with_identity.as_ref().ok_or_else(|| {
                    WxPayError::invalid_config(
                        "client_cert",
                        "endpoint requires a client certificate but none is configured",
                    )
                })?
            } else {
                &self.plain
            };

            let response = client
                .post(url)
                .header("Content-Type", "text/xml; charset=utf-8")
                .body(body)
                .send()
                .await
                .map_err(|e| self.map_reqwest_error(url, e))?;

            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| WxPayError::Transport(format!("failed to read response: {}", e)))?;

            if status.as_u16() >= 400 {
                return Err(self.map_status_error(status.as_u16(), &text));
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(status = status.as_u16(), bytes = text.len(), "response received");

            Ok(text)
        }
    }

}
