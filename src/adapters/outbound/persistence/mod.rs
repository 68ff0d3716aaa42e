pub mod json_result_file;

pub use json_result_file::{downloads_path_for, load_objects, read_json, to_pretty_json, write_json};
