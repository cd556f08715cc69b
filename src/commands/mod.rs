pub mod check;
pub mod completions;
pub mod config;
pub mod fetch;
pub mod subresource;
pub mod targets;
pub mod url;
