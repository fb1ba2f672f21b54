//! Static description of the provider for a feature-service host.

use serde::Serialize;

/// Registration descriptor a host framework reads to mount the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub name: &'static str,
    /// Routes accept a `:host` segment.
    pub hosts: bool,
    /// Routes omit the `:id` segment.
    pub disable_id_param: bool,
    pub version: &'static str,
    pub route_template: &'static str,
}

pub const PROVIDER: ProviderInfo = ProviderInfo {
    type_: "provider",
    name: "socrata",
    hosts: true,
    disable_id_param: false,
    version: env!("CARGO_PKG_VERSION"),
    route_template: "/:name/:hosts?/:disableIdParam?/FeatureServer/:layer/:method",
};
