use crate::agents::{
    GoModFile, ImportRewriter, ManifestEditor, ProjectScannerAgent, RewriteReport,
    VersionResolver,
};
use crate::config::UpgradeConfig;
use crate::error::{GomajorError, Result};
use crate::golang::{GoVersion, ModuleIdentity};
use crate::repository::{ModuleQuery, RepositoryFactory};
use crate::utils::fs::write_atomic;
use colored::Colorize;
use tracing::info;

/// Where the dependency is moving to. Fixed before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub new_path: String,
    pub version: String,
}

/// Result of a completed upgrade
#[derive(Debug, Clone)]
pub struct UpgradeOutcome {
    pub old_path: String,
    pub target: ResolvedTarget,
    pub rewrite: RewriteReport,
}

/// Execute the upgrade workflow against the `go` tool
pub fn execute_upgrade(
    config: &UpgradeConfig,
    module: &str,
    target_version: Option<&str>,
) -> Result<UpgradeOutcome> {
    let query = RepositoryFactory::create_go_command(config);
    run_upgrade(config, query.as_ref(), module, target_version)
}

/// Upgrade `module` to `target_version`, or to its highest published major
/// line when no version is given.
pub fn run_upgrade(
    config: &UpgradeConfig,
    query: &dyn ModuleQuery,
    module: &str,
    target_version: Option<&str>,
) -> Result<UpgradeOutcome> {
    // Step 1: Validate input before touching anything external
    let identity = ModuleIdentity::parse(module)?;
    let explicit = target_version.map(GoVersion::parse).transpose()?;
    if let (Some(version), Some(major)) = (&explicit, identity.major) {
        reject_downgrade(module, version, major)?;
    }

    // Step 2: Make sure the module is actually a dependency
    let project_info = ProjectScannerAgent::new(config).validate()?;
    let mut manifest = GoModFile::load(&project_info.manifest_path)?;
    let Some(pinned) = manifest.requirement_version(module) else {
        return Err(GomajorError::NotADependency(module.to_string()));
    };
    // Unsuffixed paths cover v0 and v1, so the pinned version decides.
    if let (Some(version), None) = (&explicit, identity.major) {
        let pinned_major = GoVersion::parse(&pinned).map_or(1, |v| v.major());
        reject_downgrade(module, version, pinned_major)?;
    }
    if let Some(main_module) = manifest.module_path() {
        info!("Upgrading dependency {} of {}", module, main_module);
    }

    // Step 3: Resolve the target path and full version
    let target = resolve_target(query, &identity, explicit)?;
    info!("Resolved target {}@{}", target.new_path, target.version);

    // Step 4: Rewrite import paths
    let rewrite = ImportRewriter::new(&project_info.project_root)
        .rewrite_imports(module, &target.new_path)?;

    // Step 5: Swap the requirement and write go.mod
    manifest.drop_requirement(module)?;
    manifest.add_requirement(&target.new_path, &target.version)?;
    manifest.cleanup_and_sort();
    write_atomic(&project_info.manifest_path, &manifest.serialize())?;

    let outcome = UpgradeOutcome {
        old_path: module.to_string(),
        target,
        rewrite,
    };

    if config.verbose {
        print_outcome(&outcome);
    }

    Ok(outcome)
}

fn reject_downgrade(module: &str, target: &GoVersion, current_major: u64) -> Result<()> {
    if target.major() < current_major {
        return Err(GomajorError::InvalidInput(format!(
            "Cannot downgrade {} to {}",
            module, target.original
        )));
    }
    Ok(())
}

fn resolve_target(
    query: &dyn ModuleQuery,
    identity: &ModuleIdentity,
    explicit: Option<GoVersion>,
) -> Result<ResolvedTarget> {
    let resolver = VersionResolver::new(query);

    let target_version = match explicit {
        Some(version) => version.original,
        None => resolver.resolve_highest_major(&identity.prefix, identity.major)?,
    };

    let target_major = GoVersion::parse(&target_version)
        .map_err(|_| {
            GomajorError::TransportFailure(format!(
                "go reported an invalid version '{target_version}'"
            ))
        })?
        .major();
    let new_path = identity.path_for_major(target_major);
    let version = resolver.resolve_full_version(&new_path, &target_version)?;

    Ok(ResolvedTarget { new_path, version })
}

fn print_outcome(outcome: &UpgradeOutcome) {
    println!(
        "{}",
        format!(
            "✓ {} → {} {}",
            outcome.old_path, outcome.target.new_path, outcome.target.version
        )
        .green()
        .bold()
    );

    if outcome.rewrite.is_empty() {
        println!("{}", "No import paths needed rewriting".yellow());
        return;
    }

    println!(
        "{}",
        format!(
            "Rewrote {} import(s) in {} of {} file(s):",
            outcome.rewrite.imports_rewritten,
            outcome.rewrite.files_rewritten.len(),
            outcome.rewrite.files_scanned
        )
        .cyan()
    );
    for path in &outcome.rewrite.files_rewritten {
        println!("  • {}", path.display());
    }
}
