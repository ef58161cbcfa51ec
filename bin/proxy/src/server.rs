//! HTTP front end.
//!
//! `POST <mount path>` carries JSON-RPC and is dispatched through the
//! [`RequestMapper`]; `GET /upcheck` answers liveness probes; everything else
//! is passed through to the downstream node untouched.

use crate::{
    handler::{
        EthAccountsHandler, EthSignHandler, HttpExchange, PassThroughHandler, ProxyResponse,
        RequestContext, SendTransactionHandler, SignTransactionHandler, ETH_ACCOUNTS, ETH_SIGN,
    },
    mapper::RequestMapper,
    metrics::Metrics,
};
use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::get,
    Router,
};
use bytes::Bytes;
use client::{ClientError, DownstreamClient, EnclaveClient};
use config::ProxyConfig;
use jsonrpc::{Id, JsonRpcErrorCode, JsonRpcRequest};
use nonce::DownstreamNonceProvider;
use signer::SignerProvider;
use std::{future::Future, io, sync::Arc, time::Instant};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};
use transaction::{EEA_SEND_TRANSACTION, ETH_SEND_TRANSACTION, ETH_SIGN_TRANSACTION};

pub const UPCHECK_PATH: &str = "/upcheck";
pub const UPCHECK_RESPONSE: &str = "I'm up!";

#[derive(Clone)]
struct AppState {
    mapper: Arc<RequestMapper>,
    passthrough: Arc<PassThroughHandler>,
    mount_path: Arc<str>,
    metrics: Metrics,
}

/// The assembled proxy, ready to serve.
#[derive(Clone)]
pub struct ProxyServer {
    state: AppState,
}

impl ProxyServer {
    /// Wire the handlers for `config` around `signers`.
    pub fn new(config: &ProxyConfig, signers: Arc<dyn SignerProvider>) -> Result<Self, ClientError> {
        let timeout = config.downstream.request_timeout();
        let downstream = DownstreamClient::new(&config.downstream.url, timeout)?;
        let enclave = config
            .enclave
            .as_ref()
            .map(|enclave| EnclaveClient::new(&enclave.url, timeout))
            .transpose()?;
        let nonces = DownstreamNonceProvider::new(downstream.clone());
        let metrics = Metrics::new();

        let passthrough = Arc::new(PassThroughHandler::new(downstream.clone()));
        let mut mapper = RequestMapper::new(passthrough.clone());

        let send = Arc::new(SendTransactionHandler::new(
            config.chain_id,
            signers.clone(),
            nonces.clone(),
            downstream,
            enclave,
            metrics.clone(),
        ));
        mapper.add_handler(ETH_SEND_TRANSACTION, send.clone());
        mapper.add_handler(EEA_SEND_TRANSACTION, send);
        mapper.add_handler(
            ETH_SIGN_TRANSACTION,
            Arc::new(SignTransactionHandler::new(
                config.chain_id,
                signers.clone(),
                nonces,
                metrics.clone(),
            )),
        );
        mapper.add_handler(ETH_SIGN, Arc::new(EthSignHandler::new(signers.clone())));
        mapper.add_handler(ETH_ACCOUNTS, Arc::new(EthAccountsHandler::new(signers)));

        debug!(methods = ?mapper.methods(), "Registered handlers");

        Ok(Self {
            state: AppState {
                mapper: Arc::new(mapper),
                passthrough,
                mount_path: Arc::from(config.http.mount_path.as_str()),
                metrics,
            },
        })
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route(UPCHECK_PATH, get(upcheck).fallback(dispatch))
            .fallback(dispatch)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve on `listener` until `shutdown` resolves, then drain in-flight
    /// requests.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }
}

async fn upcheck() -> &'static str {
    UPCHECK_RESPONSE
}

async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> ProxyResponse {
    let path_and_query = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), |pq| pq.as_str().to_string());

    let http = HttpExchange {
        method,
        path_and_query,
        headers,
        body,
    };

    if http.method == Method::POST && uri.path() == &*state.mount_path {
        return state.handle_json_rpc(http).await;
    }

    match state.passthrough.forward(http).await {
        Ok(response) => response,
        Err(e) => {
            state.record_failure(&e);
            error!(path = %uri.path(), error = %e, "Pass-through request failed");
            e.into_response(Id::null())
        }
    }
}

impl AppState {
    async fn handle_json_rpc(&self, http: HttpExchange) -> ProxyResponse {
        let request = match JsonRpcRequest::from_slice(&http.body) {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "Rejecting undecodable JSON-RPC request");
                self.metrics.record_error("ParseError");
                return ProxyResponse::error(
                    StatusCode::BAD_REQUEST,
                    Id::null(),
                    JsonRpcErrorCode::ParseError,
                );
            }
        };

        let started = Instant::now();
        let id = request.id.clone();
        let method = request.method.clone();
        debug!(%method, id = ?id, "Handling JSON-RPC request");

        let handler = self.mapper.get_matching_handler(&method);
        let response = match handler.handle(RequestContext { http, request }).await {
            Ok(response) => response,
            Err(e) => {
                self.record_failure(&e);
                warn!(%method, error = %e, "Request failed");
                e.into_response(id)
            }
        };

        self.metrics.record_request(&method, started.elapsed());
        response
    }

    fn record_failure(&self, error: &crate::ProxyError) {
        let code = error.code();
        if code == JsonRpcErrorCode::ConnectionToDownstreamNodeTimedOut {
            self.metrics.record_downstream_timeout();
        }
        self.metrics.record_error(&format!("{code:?}"));
    }
}
