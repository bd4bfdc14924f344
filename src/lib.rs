pub mod api;
pub mod clients;
pub mod clock;
pub mod config;
pub mod constants;
pub mod models;
pub mod services;
pub mod storage;

use tokio::signal;

pub use config::Config;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "daemon" | "-d" | "--daemon" => run_daemon(config).await,

        "search" | "s" => {
            if args.len() < 3 {
                println!("Usage: tubefeed search <query> [--user <id>]");
                return Ok(());
            }
            let user = flag_value(&args, "--user");
            let query = args[2..]
                .iter()
                .take_while(|a| *a != "--user")
                .cloned()
                .collect::<Vec<_>>()
                .join(" ");
            cmd_search(&config, &query, user.as_deref()).await
        }

        "recent" | "r" => {
            let user = flag_value(&args, "--user");
            cmd_recent(&config, user.as_deref())
        }

        "feed" | "f" => {
            let user = flag_value(&args, "--user");
            let refresh = args.iter().any(|a| a == "--refresh");
            cmd_feed(&config, user.as_deref(), refresh)
        }

        "clear-cache" => {
            let user = flag_value(&args, "--user");
            cmd_clear_cache(&config, user.as_deref())
        }

        "init" | "--init" => {
            Config::create_default_if_missing()?;
            println!("✓ Config file created. Edit config.toml and run again.");
            Ok(())
        }

        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        _ => {
            println!("Unknown command: {}", args[1]);
            println!();
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!("Tubefeed - Video Discovery Cache");
    println!("Personalized search caching and home-feed synthesis");
    println!();
    println!("USAGE:");
    println!("  tubefeed <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("  search <query>    Search videos (cache-first) and record the query");
    println!("  recent            Show recent searches");
    println!("  feed              Show the personalized home feed");
    println!("  clear-cache       Delete cached searches and recency for a user");
    println!("  daemon            Run the web API");
    println!("  init              Create default config file");
    println!("  help              Show this help message");
    println!();
    println!("OPTIONS:");
    println!("  --user <id>       Operate on this user's cache (default: anonymous)");
    println!("  --refresh         With 'feed': force a random fallback feed");
    println!();
    println!("EXAMPLES:");
    println!("  tubefeed search \"lofi beats\"      # Search and cache results");
    println!("  tubefeed feed --user alice        # Alice's personalized feed");
    println!("  tubefeed daemon                   # Start the web API");
    println!();
    println!("CONFIG:");
    println!("  Edit config.toml to configure the API key, server, and cache bounds.");
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

async fn cmd_search(config: &Config, query: &str, user: Option<&str>) -> anyhow::Result<()> {
    let state = api::create_app_state(config.clone())?;

    let (results, cached) = match state.cache.get_cached_results(query, user) {
        Some(results) => (results, true),
        None => {
            println!("Searching for: {}", query);
            let results = state.youtube.search(query).await?;
            state.cache.cache_search_results(query, &results, user);
            (results, false)
        }
    };

    if results.is_empty() {
        println!("No videos found matching '{}'", query);
        return Ok(());
    }

    println!();
    println!(
        "Results{}:",
        if cached { " (from cache)" } else { "" }
    );
    println!("{:-<60}", "");

    for video in &results {
        println!("• {} ({})", video.title, video.channel_title);
        println!("  ID: {} | Published: {}", video.id, video.published_at);
    }

    Ok(())
}

fn cmd_recent(config: &Config, user: Option<&str>) -> anyhow::Result<()> {
    let state = api::create_app_state(config.clone())?;
    let recent = state.cache.get_recent_searches(user);

    if recent.is_empty() {
        println!("No recent searches.");
        return Ok(());
    }

    println!("Recent Searches ({} total)", recent.len());
    println!("{:-<60}", "");
    for (i, query) in recent.iter().enumerate() {
        println!("{}. {}", i + 1, query);
    }

    Ok(())
}

fn cmd_feed(config: &Config, user: Option<&str>, refresh: bool) -> anyhow::Result<()> {
    let state = api::create_app_state(config.clone())?;
    let videos = state.cache.get_personalized_videos(user, refresh);

    println!("Home Feed ({} videos)", videos.len());
    println!("{:-<60}", "");

    for video in &videos {
        println!("• {} ({})", video.title, video.channel_title);
    }

    Ok(())
}

fn cmd_clear_cache(config: &Config, user: Option<&str>) -> anyhow::Result<()> {
    let state = api::create_app_state(config.clone())?;
    state.cache.clear_user_cache(user);
    println!("✓ Cleared cache for {}", user.unwrap_or("anonymous"));
    Ok(())
}

async fn run_daemon(config: Config) -> anyhow::Result<()> {
    info!(
        "Tubefeed v{} starting in daemon mode...",
        env!("CARGO_PKG_VERSION")
    );

    if !config.server.enabled {
        anyhow::bail!("Server is disabled in config.toml");
    }

    let port = config.server.port;
    let state = api::create_app_state(config)?;

    let app = api::router(state);
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let server_handle = tokio::spawn(async move {
        info!("🌐 Web Server running at http://0.0.0.0:{}", port);
        if let Err(e) = axum::serve(listener, app).await {
            error!("Web server error: {}", e);
        }
    });

    info!("Daemon running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    server_handle.abort();
    info!("Daemon stopped");

    Ok(())
}
