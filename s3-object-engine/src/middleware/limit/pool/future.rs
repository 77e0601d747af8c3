/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::error;
use crate::runtime::worker_pool::{AcquirePermitFuture, OwnedWorkPermit};

use futures_util::ready;
use pin_project_lite::pin_project;
use std::{future::Future, task::Poll};
use tower::util::Oneshot;
use tower::Service;

pin_project! {
    #[derive(Debug)]
    pub(crate) struct ResponseFuture<S, Request>
        where S: Service<Request>
    {
        request: Option<(S, Request)>,
        #[pin]
        state: State<Oneshot<S, Request>>
    }
}

pin_project! {
    #[project = StateProj]
    #[derive(Debug)]
    enum State<F> {
        // Waiting on a worker from the pool
        AcquiringPermit {
            #[pin]
            permit_fut: AcquirePermitFuture
        },
        // Polling the future from [`Service::call`]
        Called {
            #[pin]
            fut: F,
            // held until the request completes
            _permit: OwnedWorkPermit,
        },
        // The worker pool was shut down before a permit was handed out
        Done,
    }
}

impl<S, Request> ResponseFuture<S, Request>
where
    S: Service<Request>,
{
    pub(crate) fn new(
        inner: S,
        req: Request,
        permit_fut: AcquirePermitFuture,
    ) -> ResponseFuture<S, Request> {
        ResponseFuture {
            request: Some((inner, req)),
            state: State::AcquiringPermit { permit_fut },
        }
    }
}

impl<S, Request> Future for ResponseFuture<S, Request>
where
    S: Service<Request>,
    S::Error: From<error::Error>,
{
    type Output = Result<S::Response, S::Error>;

    fn poll(self: std::pin::Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();
        loop {
            match this.state.as_mut().project() {
                StateProj::AcquiringPermit { permit_fut } => {
                    let permit = ready!(permit_fut.poll(cx));
                    match (permit, this.request.take()) {
                        (Ok(_permit), Some((svc, req))) => {
                            tracing::trace!("worker acquired");
                            // the service was cloned and never polled for readiness, Oneshot
                            // drives it to ready before calling it
                            let fut = Oneshot::new(svc, req);
                            this.state.set(State::Called { fut, _permit });
                        }
                        (Ok(_), None) => {
                            this.state.set(State::Done);
                            return Poll::Ready(Err(error::Error::new(
                                error::ErrorKind::RuntimeError,
                                "pool limited request polled after its request was taken",
                            )
                            .into()));
                        }
                        (Err(err), _) => {
                            this.state.set(State::Done);
                            return Poll::Ready(Err(err.into()));
                        }
                    }
                }
                StateProj::Called { fut, .. } => {
                    let result = ready!(fut.poll(cx));
                    tracing::trace!("worker released");
                    return Poll::Ready(result);
                }
                // Done is only entered when an error was returned; like any Future this one
                // must not be polled again after yielding Ready
                StateProj::Done => panic!("ResponseFuture polled after completion"),
            }
        }
    }
}
