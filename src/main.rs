use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use spotify_explorer::callback::CallbackListener;
use spotify_explorer::cli::{Args, Command, FavoritesCommand};
use spotify_explorer::config::{find_config_file, load_config, Config};
use spotify_explorer::controller::AppController;
use spotify_explorer::logging;
use spotify_explorer::model::{
    AnnotationPatch, FileTokenStore, FilterOptions, JsonFileDocumentStore, Route, TokenStore,
};
use spotify_explorer::session::Session;
use spotify_explorer::view::{AppView, DEFAULT_WIDTH};

fn resolve_config(args: &Args) -> Result<Config> {
    let file_config = match find_config_file(args.config.as_deref()) {
        Some(path) => Some(
            load_config(&path).with_context(|| format!("Failed to load {}", path.display()))?,
        ),
        None => None,
    };
    Ok(Config::resolve(file_config, args))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    let config = resolve_config(&args)?;

    let _log_guard = match logging::init_logging(&config.log_dir()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!(command = ?args.command, "=== spotify-explorer starting ===");
    config.validate()?;

    let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(config.token_dir()));
    let documents = Arc::new(JsonFileDocumentStore::new(config.data_dir.join("documents")));
    let session = Session::new(config.clone(), tokens)?;
    let controller = AppController::new(session, documents);

    let outcome = run(&controller, args.command, &config).await;
    if let Err(e) = &outcome {
        tracing::error!(error = %e, "Command failed");
    }
    outcome
}

async fn run(controller: &AppController, command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Login => {
            let url = controller.login_url()?;
            let listener = CallbackListener::bind(&config.redirect_uri).await?;
            print!("{}", AppView::render_login_prompt(url.as_str()));

            let outcome = listener.wait(config.callback_timeout).await?;
            controller.handle_callback(outcome).await;
            let state = controller.state().await;
            print!("{}", AppView::render_status(controller.is_authenticated(), &state));
            fail_on_error(&state.error)
        }
        Command::Logout => {
            controller.logout().await?;
            println!("Logged out.");
            Ok(())
        }
        Command::Status => {
            controller.resume().await;
            let state = controller.state().await;
            print!("{}", AppView::render_status(controller.is_authenticated(), &state));
            Ok(())
        }
        Command::Search { query, page } => {
            let filters = FilterOptions {
                query: Some(query),
                genre: None,
            };
            browse(controller, filters, page.page).await
        }
        Command::Recommend { genre, page } => {
            let filters = FilterOptions { query: None, genre };
            browse(controller, filters, page.page).await
        }
        Command::Genres => {
            controller.resume().await;
            let genres = controller.load_genres().await;
            print!("{}", AppView::render_genres(&genres));
            Ok(())
        }
        Command::Categories { limit } => {
            require_login(controller).await?;
            let categories = controller.client().get_categories(limit).await?;
            print!("{}", AppView::render_categories(&categories));
            Ok(())
        }
        Command::Favorites(command) => favorites(controller, command).await,
    }
}

async fn require_login(controller: &AppController) -> Result<()> {
    if controller.resume().await {
        return Ok(());
    }
    let state = controller.state().await;
    print!("{}", AppView::render_status(false, &state));
    anyhow::bail!("not logged in")
}

fn fail_on_error(error: &Option<String>) -> Result<()> {
    match error {
        Some(error) => Err(anyhow::anyhow!(error.clone())),
        None => Ok(()),
    }
}

/// Load one page of search results or recommendations and print it.
async fn browse(controller: &AppController, filters: FilterOptions, page: u32) -> Result<()> {
    require_login(controller).await?;
    controller.load_favorites().await;
    controller.apply_filters(filters).await;
    if page > 1 && !controller.go_to_page(page).await {
        let total = controller.state().await.total_pages;
        eprintln!("Page {page} is out of range (1..={total}), showing page 1.");
    }

    let state = controller.state().await;
    print!("{}", AppView::render(&state, Route::Explore, DEFAULT_WIDTH));
    fail_on_error(&state.error)
}

async fn favorites(controller: &AppController, command: FavoritesCommand) -> Result<()> {
    require_login(controller).await?;
    controller.load_favorites().await;

    match command {
        FavoritesCommand::List => {}
        FavoritesCommand::Toggle { track_id } => match controller.toggle_favorite_by_id(&track_id).await {
            Some(true) => println!("Saved {track_id} to favorites.\n"),
            Some(false) => println!("Removed {track_id} from favorites.\n"),
            None => {}
        },
        FavoritesCommand::Annotate {
            track_id,
            note,
            alias,
            rating,
        } => {
            let patch = AnnotationPatch { note, alias, rating };
            if patch.is_empty() {
                anyhow::bail!("nothing to change: pass --note, --alias or --rating");
            }
            if controller.save_annotation(&track_id, patch).await {
                println!("Updated {track_id}.\n");
            }
        }
        FavoritesCommand::Remove { track_ids } => {
            if controller.bulk_remove(&track_ids).await {
                println!("Removed {} favorite(s).\n", track_ids.len());
            }
        }
    }

    let state = controller.state().await;
    print!("{}", AppView::render(&state, Route::Favorites, DEFAULT_WIDTH));
    fail_on_error(&state.error)
}
