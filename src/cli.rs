use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "spotify-explorer",
    about = "Discover music on Spotify and keep annotated favorites",
    long_about = None,
    version,
    arg_required_else_help = true,
)]
pub struct Args {
    /// Spotify application client id [env: SPOTIFY_CLIENT_ID]
    #[arg(long, global = true)]
    pub client_id: Option<String>,

    /// Redirect URI registered for the application [env: SPOTIFY_REDIRECT_URI] [default: http://127.0.0.1:8898/callback]
    #[arg(long, global = true)]
    pub redirect_uri: Option<String>,

    /// Directory for tokens, favorites and logs [env: SPOTIFY_EXPLORER_DATA_DIR]
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to TOML config file (overrides default search: ./spotify-explorer.toml, ~/.config/spotify-explorer/config.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Authorize with Spotify through the browser
    Login,
    /// Forget stored tokens
    Logout,
    /// Show authentication state and the signed-in user
    Status,
    /// Search tracks by name or artist
    Search {
        query: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Recommended tracks, optionally seeded by a genre
    Recommend {
        #[arg(short, long)]
        genre: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// List available genre seeds
    Genres,
    /// List browse categories
    Categories {
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
    /// Manage favorites
    #[command(subcommand)]
    Favorites(FavoritesCommand),
}

#[derive(ClapArgs, Debug, Clone, Copy)]
pub struct PageArgs {
    /// Result page, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: u32,
}

#[derive(Subcommand, Debug)]
pub enum FavoritesCommand {
    /// List favorites, most recent first
    List,
    /// Toggle a track in or out of favorites
    Toggle { track_id: String },
    /// Edit the note, alias or rating of a favorite
    Annotate {
        track_id: String,
        #[arg(short, long)]
        note: Option<String>,
        #[arg(short, long)]
        alias: Option<String>,
        #[arg(short, long)]
        rating: Option<u8>,
    },
    /// Remove one or more favorites
    Remove {
        #[arg(num_args = 1..)]
        track_ids: Vec<String>,
    },
}
