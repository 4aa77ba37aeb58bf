pub use transmod::{default_extensions, default_formats, default_ignore};

pub fn default_root() -> String {
    "src".to_string()
}
