use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "gomajor",
    about = "Upgrades the named module dependency to the specified version,\n\
             or, if no version is given, to the highest major version available.",
    long_about = "Upgrades the named module dependency to the specified version,\n\
                  or, if no version is given, to the highest major version available.\n\n\
                  The module should be given as a fully qualified module path\n\
                  (including the major version component, if applicable).\n\
                  For example: github.com/nathanjcochran/gomod.",
    version
)]
pub struct Cli {
    /// go.mod file path
    #[arg(short = 'f', long = "file", default_value = "./go.mod")]
    pub file: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// go binary used to query module versions
    #[arg(long = "go", value_name = "BIN", default_value = "go")]
    pub go_binary: String,

    /// Fully qualified module path of the dependency to upgrade
    #[arg(value_name = "MODULE")]
    pub module: String,

    /// Target version (e.g. v3 or v3.2.1); defaults to the highest major available
    #[arg(id = "target_version", value_name = "VERSION")]
    pub version: Option<String>,
}
