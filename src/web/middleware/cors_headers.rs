use poem::http::header::{ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL};
use poem::http::HeaderValue;
use poem::{Endpoint, IntoResponse, Middleware, Request, Response, Result};

/// Allows any origin to fetch the assets and disables caching.
///
/// Errors are rendered here as well, so that the headers make it to error responses too.
pub struct CorsHeadersMiddleware;

impl<E: Endpoint> Middleware<E> for CorsHeadersMiddleware {
    type Output = CorsHeadersMiddlewareImpl<E>;

    fn transform(&self, ep: E) -> Self::Output {
        CorsHeadersMiddlewareImpl { ep }
    }
}

pub struct CorsHeadersMiddlewareImpl<E> {
    ep: E,
}

#[poem::async_trait]
impl<E: Endpoint> Endpoint for CorsHeadersMiddlewareImpl<E> {
    type Output = Response;

    async fn call(&self, request: Request) -> Result<Self::Output> {
        let mut response = match self.ep.call(request).await {
            Ok(output) => output.into_response(),
            Err(error) => error.into_response(),
        };
        let headers = response.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET"));
        headers.insert(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate"),
        );
        Ok(response)
    }
}
