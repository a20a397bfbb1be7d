//! Cluster proxy policy resolution.
//!
//! # Responsibilities
//! - Read the singleton proxy object from the proxy cache
//! - Copy its observed status into a [`ProxyConfig`]
//! - Turn a [`ProxyConfig`] into a [`ProxyFunc`] that picks a proxy per request
//!
//! # Design Decisions
//! - A missing proxy object is the normal state on clusters without a proxy: `Ok(None)`
//! - URL syntax is not checked while resolving; parsing happens when the proxy
//!   function is built, and a value that cannot be parsed leaves that scheme unproxied
//! - HTTPS requests use only the HTTPS proxy and HTTP requests only the HTTP proxy

use hyper::{Request, Uri};
use url::Url;

use crate::cluster::{ClusterProxy, Lister, ProxyStatus};
use crate::egress::error::{TransportError, TransportResult};
use crate::egress::no_proxy::NoProxy;

/// Name of the singleton cluster proxy object.
pub const CLUSTER_PROXY_NAME: &str = "cluster";

/// Proxy settings copied from the cluster proxy status, unvalidated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    pub http_proxy: String,
    pub https_proxy: String,
    pub no_proxy: String,
}

impl From<&ProxyStatus> for ProxyConfig {
    fn from(status: &ProxyStatus) -> Self {
        Self {
            http_proxy: status.http_proxy.clone(),
            https_proxy: status.https_proxy.clone(),
            no_proxy: status.no_proxy.clone(),
        }
    }
}

impl ProxyConfig {
    /// Build the per-request proxy selection function.
    pub fn proxy_func(&self) -> ProxyFunc {
        ProxyFunc {
            http: parse_proxy(&self.http_proxy),
            https: parse_proxy(&self.https_proxy),
            no_proxy: NoProxy::parse(&self.no_proxy),
        }
    }
}

/// Look up the cluster proxy policy.
///
/// Returns `Ok(None)` when the proxy object does not exist. Every other lookup
/// failure is returned unchanged.
pub fn resolve_proxy_policy(
    proxies: &dyn Lister<ClusterProxy>,
) -> TransportResult<Option<ProxyConfig>> {
    match proxies.get(CLUSTER_PROXY_NAME) {
        Ok(proxy) => Ok(Some(ProxyConfig::from(&proxy.status))),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Chooses the proxy for an outgoing request.
#[derive(Debug, Clone)]
pub struct ProxyFunc {
    http: Option<Url>,
    https: Option<Url>,
    no_proxy: NoProxy,
}

impl ProxyFunc {
    /// Proxy for `request`, or `Ok(None)` to connect directly.
    ///
    /// Fails with [`TransportError::InvalidInput`] when there is no request or
    /// its URI is not absolute.
    pub fn proxy_for<B>(&self, request: Option<&Request<B>>) -> TransportResult<Option<Url>> {
        let request = request.ok_or_else(TransportError::nil_request)?;
        let target = absolute_url(request.uri())?;
        Ok(self.proxy_for_url(&target))
    }

    /// Proxy for a request to `target`, or `None` to connect directly.
    pub fn proxy_for_url(&self, target: &Url) -> Option<Url> {
        let proxy = match target.scheme() {
            "https" => self.https.as_ref(),
            "http" => self.http.as_ref(),
            _ => None,
        }?;

        if self.no_proxy.bypasses(target) {
            return None;
        }
        Some(proxy.clone())
    }

    pub fn http_proxy(&self) -> Option<&Url> {
        self.http.as_ref()
    }

    pub fn https_proxy(&self) -> Option<&Url> {
        self.https.as_ref()
    }
}

fn absolute_url(uri: &Uri) -> TransportResult<Url> {
    if uri.scheme().is_none() || uri.authority().is_none() {
        return Err(TransportError::InvalidInput(format!(
            "cannot calculate proxy URI for relative request URI {uri}"
        )));
    }
    Url::parse(&uri.to_string())
        .map_err(|e| TransportError::InvalidInput(format!("invalid request URI {uri}: {e}")))
}

/// Parse a proxy address, accepting a bare `host:port` as `http://host:port`.
fn parse_proxy(value: &str) -> Option<Url> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match Url::parse(value) {
        Ok(url) if url.has_host() => Some(url),
        _ => Url::parse(&format!("http://{value}"))
            .ok()
            .filter(Url::has_host),
    }
}
