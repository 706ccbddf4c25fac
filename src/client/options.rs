use tokio_util::sync::CancellationToken;

/// Per-call options: query parameters and a cancellation handle.
///
/// Cancelling aborts the network exchange only; a refresh already started on
/// behalf of the call keeps running for the other waiters.
#[derive(Debug, Clone)]
pub struct RequestOptions<Q = ()> {
    pub query: Option<Q>,
    pub cancel: Option<CancellationToken>,
}

impl<Q> Default for RequestOptions<Q> {
    fn default() -> Self {
        Self {
            query: None,
            cancel: None,
        }
    }
}

impl<Q> RequestOptions<Q> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(query: Q) -> Self {
        Self {
            query: Some(query),
            cancel: None,
        }
    }

    pub fn with_query(mut self, query: Q) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}
