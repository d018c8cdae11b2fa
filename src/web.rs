//! Local development server for the exported model and the rest of the static assets.

use std::net::IpAddr;
use std::str::FromStr;

use poem::endpoint::StaticFilesEndpoint;
use poem::listener::TcpListener;
use poem::middleware::CatchPanic;
use poem::{Endpoint, EndpointExt, Response, Route, Server};

use self::middleware::{CorsHeadersMiddleware, RequestLogMiddleware};
use crate::opts::ServeOpts;
use crate::prelude::*;

mod middleware;

pub async fn run(opts: ServeOpts) -> Result {
    let app = create_app(&opts.root);
    info!("Starting server at http://localhost:{}", opts.port);
    info!("Press Ctrl+C to quit");
    Server::new(TcpListener::bind((IpAddr::from_str(&opts.host)?, opts.port)))
        .run_with_graceful_shutdown(
            app,
            async {
                if let Err(error) = tokio::signal::ctrl_c().await {
                    error!("failed to listen for Ctrl+C: {:#}", error);
                }
                info!("Shutting down");
            },
            None,
        )
        .await
        .with_context(|| format!("failed to serve on {}:{}", opts.host, opts.port))?;
    Ok(())
}

pub fn create_app(root: &Path) -> impl Endpoint<Output = Response> {
    Route::new()
        .nest(
            "/",
            StaticFilesEndpoint::new(root)
                .show_files_listing()
                .index_file("index.html"),
        )
        .with(CatchPanic::new())
        .with(CorsHeadersMiddleware)
        .with(RequestLogMiddleware)
}
