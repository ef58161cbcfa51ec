use super::{HttpExchange, JsonRpcHandler, ProxyResponse, RequestContext};
use crate::ProxyError;
use async_trait::async_trait;
use client::DownstreamClient;
use tracing::debug;

/// Forwards requests downstream and relays the reply as received.
#[derive(Debug, Clone)]
pub struct PassThroughHandler {
    downstream: DownstreamClient,
}

impl PassThroughHandler {
    pub const fn new(downstream: DownstreamClient) -> Self {
        Self { downstream }
    }

    pub async fn forward(&self, http: HttpExchange) -> Result<ProxyResponse, ProxyError> {
        debug!(
            method = %http.method,
            path = %http.path_and_query,
            "Passing request through"
        );

        let response = self
            .downstream
            .forward(http.method, &http.path_and_query, &http.headers, http.body)
            .await?;

        Ok(ProxyResponse::from_downstream(response))
    }
}

#[async_trait]
impl JsonRpcHandler for PassThroughHandler {
    async fn handle(&self, context: RequestContext) -> Result<ProxyResponse, ProxyError> {
        self.forward(context.http).await
    }
}
