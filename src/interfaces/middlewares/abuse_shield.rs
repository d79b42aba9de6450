use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, HeaderName, HeaderValue},
    web, Error, ResponseError,
};
use futures_util::future::{ok, Ready, LocalBoxFuture};
use std::{rc::Rc, task::{Context, Poll}};

use crate::{
    errors::ContactError,
    limiter::rate_limiter::RateDecision,
    utils::client_ip::client_identifier,
    AppState,
};

const RATELIMIT_LIMIT: &str = "ratelimit-limit";
const RATELIMIT_REMAINING: &str = "ratelimit-remaining";
const RATELIMIT_RESET: &str = "ratelimit-reset";

/// Slow-down and hard rate limit, per client, in front of a resource.
pub struct AbuseShield;

impl<S> Transform<S, ServiceRequest> for AbuseShield
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = AbuseShieldService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AbuseShieldService {
            service: Rc::new(service),
        })
    }
}

pub struct AbuseShieldService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for AbuseShieldService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                tracing::error!("AppState missing in abuse shield, passing request through");
                return service.call(req).await;
            };

            let client = client_identifier(req.headers(), req.peer_addr(), state.trust_x_forwarded_for);
            let decision = state.limiter.check(&client);

            if !decision.delay.is_zero() {
                tracing::debug!("Slowing down {} by {:?}", client, decision.delay);
                tokio::time::sleep(decision.delay).await;
            }

            if !decision.allowed {
                tracing::warn!("Rate limit exceeded for {}", client);
                let rejection = ContactError::RateLimited {
                    retry_after: decision.retry_after_secs(),
                };
                let mut res = req.into_response(rejection.error_response());
                insert_rate_headers(res.headers_mut(), &decision);
                return Ok(res);
            }

            let mut res = service.call(req).await?;
            insert_rate_headers(res.headers_mut(), &decision);
            Ok(res)
        })
    }
}

fn insert_rate_headers(headers: &mut HeaderMap, decision: &RateDecision) {
    headers.insert(HeaderName::from_static(RATELIMIT_LIMIT), HeaderValue::from(decision.limit));
    headers.insert(HeaderName::from_static(RATELIMIT_REMAINING), HeaderValue::from(decision.remaining));
    headers.insert(HeaderName::from_static(RATELIMIT_RESET), HeaderValue::from(decision.retry_after_secs()));
}
