use crate::config::UpgradeConfig;
use crate::golang::GoCommand;
use crate::repository::ModuleQuery;

pub struct RepositoryFactory;

impl RepositoryFactory {
    /// The `go list` backed oracle, run from the project root.
    pub fn create_go_command(config: &UpgradeConfig) -> Box<dyn ModuleQuery> {
        Box::new(GoCommand::new(&config.go_binary, &config.project_root))
    }
}
