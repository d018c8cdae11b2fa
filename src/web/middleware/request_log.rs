use poem::{Endpoint, Middleware, Request, Response, Result};

use crate::prelude::*;

/// Logs the client address, request line and response status of every request.
pub struct RequestLogMiddleware;

impl<E: Endpoint<Output = Response>> Middleware<E> for RequestLogMiddleware {
    type Output = RequestLogMiddlewareImpl<E>;

    fn transform(&self, ep: E) -> Self::Output {
        RequestLogMiddlewareImpl { ep }
    }
}

pub struct RequestLogMiddlewareImpl<E> {
    ep: E,
}

#[poem::async_trait]
impl<E: Endpoint<Output = Response>> Endpoint for RequestLogMiddlewareImpl<E> {
    type Output = Response;

    async fn call(&self, request: Request) -> Result<Self::Output> {
        let remote_addr = request.remote_addr().to_string();
        let request_line =
            format!("{} {} {:?}", request.method(), request.uri(), request.version());
        let start_instant = std::time::Instant::now();
        let response = self.ep.call(request).await;
        let elapsed = start_instant.elapsed();
        match &response {
            Ok(response) if response.status().is_server_error() => {
                let status = response.status().as_u16();
                error!(%remote_addr, status, ?elapsed, "\"{}\"", request_line);
            }
            Ok(response) => {
                let status = response.status().as_u16();
                info!(%remote_addr, status, ?elapsed, "\"{}\"", request_line);
            }
            Err(error) => {
                error!(%remote_addr, ?elapsed, "\"{}\": {:#}", request_line, error);
            }
        }
        response
    }
}
