pub mod import_rewriter;
pub mod manifest_editor;
pub mod project_scanner;
pub mod source_loader;
pub mod version_resolver;

pub use import_rewriter::{ImportRewriter, RewriteReport};
pub use manifest_editor::{GoModFile, ManifestEditor};
pub use project_scanner::ProjectScannerAgent;
pub use version_resolver::VersionResolver;
