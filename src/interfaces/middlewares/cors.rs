use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderMap, HeaderValue},
    Error,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::{rc::Rc, task::{Context, Poll}};

use crate::constants::CSRF_HEADER;

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";

/// Static allow-list: a listed `Origin` is echoed back, anything else gets the
/// first listed origin.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
    allowed_headers: HeaderValue,
}

impl CorsPolicy {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        let allowed_headers = HeaderValue::from_str(&format!("Content-Type, {}", CSRF_HEADER))
            .unwrap_or_else(|_| HeaderValue::from_static("Content-Type"));

        CorsPolicy {
            allowed_origins,
            allowed_headers,
        }
    }

    pub fn allow_origin(&self, origin: Option<&str>) -> Option<&str> {
        origin
            .and_then(|o| self.allowed_origins.iter().find(|allowed| allowed.as_str() == o))
            .or_else(|| self.allowed_origins.first())
            .map(String::as_str)
    }

    pub fn apply(&self, origin: Option<&str>, headers: &mut HeaderMap) {
        if let Some(value) = self
            .allow_origin(origin)
            .and_then(|o| HeaderValue::from_str(o).ok())
        {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }

        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, self.allowed_headers.clone());
        headers.insert(header::VARY, HeaderValue::from_static("Origin"));
    }
}

/// Adds the CORS headers to every response, errors included, so browsers can
/// read error bodies.
pub struct CorsHeaders {
    policy: Rc<CorsPolicy>,
}

impl CorsHeaders {
    pub fn new(policy: CorsPolicy) -> Self {
        CorsHeaders {
            policy: Rc::new(policy),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CorsHeaders
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = CorsHeadersService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(CorsHeadersService {
            service: Rc::new(service),
            policy: Rc::clone(&self.policy),
        })
    }
}

pub struct CorsHeadersService<S> {
    service: Rc<S>,
    policy: Rc<CorsPolicy>,
}

impl<S, B> Service<ServiceRequest> for CorsHeadersService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let policy = Rc::clone(&self.policy);

        Box::pin(async move {
            let origin = req
                .headers()
                .get(header::ORIGIN)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);

            let mut res = service.call(req).await?;
            policy.apply(origin.as_deref(), res.headers_mut());

            Ok(res)
        })
    }
}
