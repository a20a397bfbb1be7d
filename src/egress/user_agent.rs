//! User-Agent for outgoing requests.
//!
//! <https://www.rfc-editor.org/rfc/rfc7231#section-5.5.3>

/// Product token identifying this component.
pub const PRODUCT_TOKEN: &str = "ClusterVersionOperator";

/// Version of the running build. Release builds set `CLUSTER_EGRESS_VERSION`
/// at compile time; otherwise the crate version is used.
pub fn version() -> &'static str {
    option_env!("CLUSTER_EGRESS_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// `<product>/<version>`.
pub fn user_agent() -> String {
    format!("{}/{}", PRODUCT_TOKEN, version())
}
