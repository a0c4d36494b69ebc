pub use layerscope_app as app;
pub use layerscope_domain as domain;
pub use layerscope_infra as infra;

pub mod cli;
pub mod error;
