pub mod command;
pub mod imports;
pub mod module_path;
pub mod version;

pub use command::GoCommand;
pub use imports::{ImportSpec, scan_imports};
pub use module_path::{ModuleIdentity, is_within};
pub use version::GoVersion;
