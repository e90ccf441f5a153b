use http::{Request, Response};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::session::Session;

/// Tower layer that attaches the login session to requests and feeds
/// response headers back into it.
#[derive(Clone)]
pub struct SessionLayer {
    session: Session,
}

impl SessionLayer {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

impl<S> Layer<S> for SessionLayer {
    type Service = SessionService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionService {
            inner,
            session: self.session.clone(),
        }
    }
}

#[derive(Clone)]
pub struct SessionService<S> {
    inner: S,
    session: Session,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for SessionService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        self.session.apply(req.headers_mut());

        let session = self.session.clone();
        let fut = self.inner.call(req);
        Box::pin(async move {
            let response = fut.await?;
            session.absorb(response.status(), response.headers());
            Ok(response)
        })
    }
}
