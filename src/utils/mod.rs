pub mod environment;
pub mod filename;
pub mod timestamps;

pub use environment::{Settings, default_data_dir};
pub use filename::{DEFAULT_FILE_NAME, sanitize_file_name};
pub use timestamps::format_saved_at;
