use anyhow::Result;
use axum::Router;
use clap::Parser;
use recipe_server::{build_app, ServerSettings};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Index directory path
    #[arg(long, env = "RECIPE_INDEX_DIR", default_value = "./index")]
    index: PathBuf,
    /// Image dataset root (<category>/<filename>)
    #[arg(long, env = "RECIPE_IMAGE_ROOT", default_value = "./dataset/food-101/images")]
    image_root: PathBuf,
    /// Static files directory, must contain images/default.jpg
    #[arg(long, env = "RECIPE_STATIC_DIR", default_value = "./static")]
    static_dir: PathBuf,
    /// Candidates ranked before dietary filtering
    #[arg(long, env = "RECIPE_TOP_K", default_value_t = 3)]
    top_k: usize,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let settings = ServerSettings {
        index_dir: args.index,
        image_root: args.image_root,
        static_dir: args.static_dir,
        top_k: args.top_k,
        admin_token: std::env::var("ADMIN_TOKEN").ok(),
        cors_allow_origin: std::env::var("CORS_ALLOW_ORIGIN").ok(),
        ..ServerSettings::default()
    };
    let app: Router = build_app(settings)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
