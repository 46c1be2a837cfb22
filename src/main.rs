//! Demo JSON API served by `jsongate`.
//!
//! Routes:
//! - `GET /`            private, returns the default OK status
//! - `GET /custom`      private, writes its own JSON body
//! - `GET /public`      public, same body as `/custom`
//! - `GET /items/:id`   private, echoes the path parameter
//! - `DELETE /items/:id` private, `204 No Content`
//!
//! Private routes require `Authorization: Bearer <token>` where the token is
//! given with `--token`. Without a token every private route answers 403.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tokio::net::TcpListener;

use jsongate::config;
use jsongate::lifecycle::{signals, Shutdown};
use jsongate::observability::logging;
use jsongate::{Context, HttpServer, RouteError, Router, Status};

#[derive(Parser)]
#[command(name = "jsongate")]
#[command(about = "Demo JSON API with route-level authorization", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, overriding the configuration.
    #[arg(short, long)]
    bind: Option<String>,

    /// Bearer token accepted by the authorizer.
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Serialize)]
struct Custom {
    #[serde(rename = "Foo")]
    foo: &'static str,
    #[serde(rename = "Bar")]
    bar: u32,
}

async fn serve_root(_ctx: Context) -> Option<Status> {
    None
}

async fn serve_custom(ctx: Context) -> Option<Status> {
    if let Err(e) = ctx.writer().write_json(&Custom { foo: "foo", bar: 1 }) {
        return Some(Status::INTERNAL_SERVER_ERROR.with_error(e.to_string()));
    }
    None
}

async fn get_item(ctx: Context) -> Option<Status> {
    let Some(id) = ctx.param("id") else {
        return Some(Status::BAD_REQUEST.with_error("missing id"));
    };
    if let Err(e) = ctx.writer().write_json(&serde_json::json!({ "id": id })) {
        return Some(Status::INTERNAL_SERVER_ERROR.with_error(e.to_string()));
    }
    None
}

async fn delete_item(_ctx: Context) -> Option<Status> {
    Some(Status::NO_CONTENT)
}

fn build_router(token: Option<String>) -> Result<Router, RouteError> {
    let mut router = Router::new();

    if let Some(token) = token {
        let expected = format!("Bearer {}", token);
        router.set_authorizer(move |ctx: Context| {
            let allowed = ctx.header("authorization") == Some(expected.as_str());
            async move {
                if allowed {
                    None
                } else {
                    Some(Status::FORBIDDEN)
                }
            }
        });
    }

    router.get("/", serve_root)?;
    router.get("/custom", serve_custom)?;
    router.get("/public", serve_custom)?.mark_public();
    router.get("/items/:id", get_item)?;
    router.delete("/items/:id", delete_item)?;

    Ok(router)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.logging.filter);
    tracing::info!("jsongate v{} starting", env!("CARGO_PKG_VERSION"));

    if cli.token.is_none() {
        tracing::warn!("No token configured, private routes will answer 403");
    }
    let router = build_router(cli.token)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(&shutdown);

    let server = HttpServer::new(config, router);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
