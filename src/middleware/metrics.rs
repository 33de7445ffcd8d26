//! Request metrics middleware.
//!
//! Feeds `http_requests_total` and `http_request_duration_seconds` for the
//! `/api/*` surface. Prometheus scrapes and OpenAPI document fetches are left
//! out so polling does not drown the traffic callers generate.

use crate::{services::metrics::AppMetrics, utils::route::extract_route_pattern};
use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    web,
};
use std::{
    future::{Ready, ready},
    pin::Pin,
    time::Instant,
};

/// Route patterns that are never counted.
pub const UNTRACKED_ROUTES: [&str; 2] = ["/api/metrics", "/api/spec/v2"];

/// Metrics middleware factory
///
/// Labels every tracked request by method, matched route and final status.
/// Does nothing when no [`AppMetrics`] is registered.
pub struct MetricsMiddleware;

impl<S, B> Transform<S, ServiceRequest> for MetricsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = MetricsService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MetricsService { service }))
    }
}

pub struct MetricsService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for MetricsService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let route = extract_route_pattern(&req);
        let metrics = req
            .app_data::<web::Data<AppMetrics>>()
            .filter(|_| !UNTRACKED_ROUTES.contains(&route.as_str()))
            .cloned();

        let Some(metrics) = metrics else {
            return Box::pin(self.service.call(req));
        };

        let start_time = Instant::now();
        let method = req.method().to_string();
        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;
            let status = match &result {
                Ok(res) => res.status(),
                Err(err) => err.as_response_error().status_code(),
            };
            metrics.record_request(&method, &route, status.as_u16(), start_time.elapsed());
            result
        })
    }
}
