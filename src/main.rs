use std::sync::Arc;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use timicli::{
    cli, config, error,
    types::{AccountRole, MigrationPlan, PkceToken},
};
use tokio::sync::Mutex;

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize one account with the Tidal API
    Auth(AuthOptions),

    /// Migrate the library between the two authorized accounts
    Migrate(MigrateOptions),

    /// Remote library counts for an account
    Info(InfoOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    /// Which account to authorize
    #[clap(value_enum)]
    pub account: AccountRole,
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Migrate the library between the two authorized accounts")]
pub struct MigrateOptions {
    /// What to migrate
    #[command(subcommand)]
    pub target: MigrateTarget,
}

#[derive(Subcommand, Debug, Clone)]
pub enum MigrateTarget {
    /// Everything: wipe destination tracks, then artists, albums, tracks, playlists
    Full(RunOpts),

    /// Followed artists only
    Artists(RunOpts),

    /// Liked albums only
    Albums(RunOpts),

    /// Liked tracks only
    Tracks(TracksOpts),

    /// User playlists only
    Playlists(RunOpts),

    /// Delete all liked tracks on the destination account
    Wipe(RunOpts),
}

#[derive(Parser, Debug, Clone)]
pub struct RunOpts {
    /// Skip confirmation prompts
    #[clap(long)]
    pub yes: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct TracksOpts {
    /// Wipe destination liked tracks before copying
    #[clap(long)]
    pub wipe: bool,

    /// Skip confirmation prompts
    #[clap(long)]
    pub yes: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct InfoOptions {
    /// Which account to inspect
    #[clap(value_enum, default_value = "source")]
    pub account: AccountRole,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth(opt) => {
            let oauth_result: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(None));
            cli::auth(Arc::clone(&oauth_result), opt.account).await;
        }
        Command::Migrate(opt) => match opt.target {
            MigrateTarget::Full(o) => cli::migrate(MigrationPlan::Full, false, o.yes).await,
            MigrateTarget::Artists(o) => {
                cli::migrate(MigrationPlan::ArtistsOnly, false, o.yes).await
            }
            MigrateTarget::Albums(o) => cli::migrate(MigrationPlan::AlbumsOnly, false, o.yes).await,
            MigrateTarget::Tracks(o) => {
                cli::migrate(MigrationPlan::TracksOnly, o.wipe, o.yes).await
            }
            MigrateTarget::Playlists(o) => {
                cli::migrate(MigrationPlan::PlaylistsOnly, false, o.yes).await
            }
            MigrateTarget::Wipe(o) => cli::migrate(MigrationPlan::WipeOnly, false, o.yes).await,
        },
        Command::Info(opt) => cli::info(opt.account).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
