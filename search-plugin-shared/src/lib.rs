//! # Search Plugin Shared
//!
//! Configuration data model shared by the search client plugin crates.
//!
//! The types in this crate describe the closed set of options a caller may
//! hand to the plugin. They carry data only; callbacks live next to the
//! client that invokes them in `search-plugin-repository`.

pub mod configuration;
pub mod settings;

pub use configuration::{
    ApiVersion, ClientConfiguration, HostDescriptor, HostList, LogConfig, OneOrMany,
    SelectorName, SniffInterval, TlsSettings,
};
pub use settings::{PluginSettings, DEFAULT_HOST};
