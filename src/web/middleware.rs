pub use self::cors_headers::CorsHeadersMiddleware;
pub use self::request_log::RequestLogMiddleware;

mod cors_headers;
mod request_log;
