// Export the modules the binary and the integration tests share
pub mod cli;
pub mod config;
pub mod http;
pub mod logging;
pub mod store;

pub use http::ReqwestTransport;
pub use store::FileStore;
