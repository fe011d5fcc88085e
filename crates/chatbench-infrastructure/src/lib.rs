pub mod config_service;
pub mod logging;
pub mod prompt_loader;
pub mod result_sink;

pub use config_service::{CONFIG_FILE_NAME, load_config, load_file_config, read_config_file};
pub use logging::init_tracing;
pub use prompt_loader::CsvPromptLoader;
pub use result_sink::CsvResultSink;
