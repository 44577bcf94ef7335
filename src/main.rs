use anyhow::{Context, Result};
use clap::Parser;
use cube_updater::app::App;
use cube_updater::config::Config;
use cube_updater::download::ConsoleProgress;
use cube_updater::source::RepoId;
use std::io;
use std::path::PathBuf;

const DEFAULT_REPO: &str = "RLeventisB/cubito";

/// cube-updater - browse and download game releases
///
/// Lists the releases of a GitHub repository page by page and downloads the
/// files of the one you pick into `Descargas/` next to the executable.
///
/// If the GITHUB_TOKEN environment variable is set, it will be used for authentication.
/// This is useful for accessing private repositories or avoiding rate limits.
///
/// Examples:
///   cube-updater                        # Browse the default repository
///   cube-updater --repo owner/repo      # Browse another repository
#[derive(Parser, Debug)]
#[command(author, version = env!("CUBE_UPDATER_VERSION"), about)]
struct Cli {
    /// Repository to browse, as "owner/repo"
    #[arg(
        long,
        env = "CUBE_UPDATER_REPO",
        value_name = "OWNER/REPO",
        default_value = DEFAULT_REPO
    )]
    pub repo: String,

    /// Directory that receives downloads (defaults to the executable's directory)
    #[arg(long = "root", short = 'r', env = "CUBE_UPDATER_ROOT", value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// GitHub API URL (defaults to https://api.github.com)
    #[arg(long = "api-url", env = "CUBE_UPDATER_API_URL", value_name = "URL")]
    pub api_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let repo: RepoId = cli
        .repo
        .parse()
        .with_context(|| format!("Invalid repository {:?}", cli.repo))?;
    let config = Config::new(cube_updater::runtime::RealRuntime, repo, cli.api_url, cli.root)?;
    let mut app = App::from_config(config, Box::new(ConsoleProgress::new()));

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    app.run(&mut input, &mut output).await
}
