pub mod instrumentation_config;
pub mod middleware_options;
