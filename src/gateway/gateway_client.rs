use std::sync::Arc;

use reqwest::{header, Client};

use super::gateway_request::{authorization_header, GatewayRequest, Operation, Transaction, REST_API};
use super::gateway_response::{Reply, TransactionResult};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::logger::{ConsoleLogger, Exchange, TransactionLogger};

/// Client for the gateway's REST API.
///
/// Holds an immutable configuration snapshot, so one configuration can back
/// any number of clients. Each remote operation performs exactly one request;
/// the client does not track transaction state, callers sequence
/// `init` → `start` → `result` → `close` themselves.
///
/// ```rust,no_run
/// use payment_gateway::{GatewayClient, GatewayConfig, Transaction};
///
/// # async fn checkout() -> payment_gateway::GatewayResult<()> {
/// let config = GatewayConfig::builder()
///     .configure([("store", "PhantomStore"), ("app_host", "https://shop.example/")])
///     .build();
/// let client = GatewayClient::new(config);
///
/// let mut tx = Transaction::new("payment/done", 3000).with_order_id("order123");
/// let reply = client.init(&mut tx).await?;
/// if let Some(id) = reply.transaction_id {
///     let redirect_to = client.start(&id);
///     // ... user pays, comes back to the response url ...
///     let status = client.result(&id).await?;
///     client.close_with(&id, status.success).await?;
/// #   let _ = redirect_to;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GatewayClient {
    config: Arc<GatewayConfig>,
    http: Client,
    logger: Arc<dyn TransactionLogger>,
}

impl GatewayClient {
    /// Creates a client for `config` that reports exchanges to stdout.
    ///
    /// # Parameters
    ///
    /// - `config`: The gateway configuration, owned or already shared in an `Arc`.
    ///
    /// # Returns
    ///
    /// A client with a default `reqwest::Client` and a [`ConsoleLogger`].
    pub fn new(config: impl Into<Arc<GatewayConfig>>) -> Self {
        Self {
            config: config.into(),
            http: Client::new(),
            logger: Arc::new(ConsoleLogger),
        }
    }

    /// Replaces the observer every exchange is reported to.
    ///
    /// # Parameters
    ///
    /// - `logger`: Any [`TransactionLogger`], including a plain closure over `&Exchange`.
    ///
    /// # Returns
    ///
    /// The client, for chaining.
    pub fn with_logger(mut self, logger: impl TransactionLogger + 'static) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    /// Use a preconfigured client, e.g. one with a request timeout. The default client has none.
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// URL of the REST endpoint requests are posted to.
    pub fn endpoint(&self) -> String {
        format!(
            "{}://{}{}",
            self.config.scheme(),
            self.config.authority(),
            REST_API
        )
    }

    /// Opens a payment transaction.
    ///
    /// # Parameters
    ///
    /// - `transaction`: The payment to open. Its provider, currency and language
    ///   fall back to the configured defaults when unset.
    ///
    /// # Returns
    ///
    /// The gateway's [`Reply`]. `transaction.transaction_id` is overwritten on
    /// every call: it holds the new id only when the reply is successful and
    /// carries a well-formed id, and is `None` after any failed attempt, so a
    /// re-initialized transaction never keeps the id of an earlier one.
    /// Transport failures are returned as [`GatewayError`].
    pub async fn init(&self, transaction: &mut Transaction) -> GatewayResult<Reply> {
        let request = GatewayRequest::init(&self.config, transaction);
        transaction.transaction_id = None;
        let result = self
            .submit(&request, Some(transaction.order_id.as_str()), None)
            .await?;
        let reply = Reply::new(result);
        transaction.transaction_id = reply.transaction_id.clone().filter(|_| reply.success);
        Ok(reply)
    }

    /// Builds the URL the user has to be redirected to. Makes no request.
    ///
    /// # Parameters
    ///
    /// - `transaction_id`: The id returned by [`init`](Self::init).
    ///
    /// # Returns
    ///
    /// `http://{header_host}/Start?TransactionId={transaction_id}`. The URL is
    /// also reported to the logger.
    pub fn start(&self, transaction_id: &str) -> String {
        let url = format!(
            "http://{}/Start?TransactionId={}",
            self.config.header_host, transaction_id
        );
        self.logger.record(&Exchange {
            operation: "Start",
            order_id: None,
            transaction_id: Some(transaction_id),
            request: &url,
            response: None,
        });
        url
    }

    /// Queries the state of a transaction. Safe to repeat.
    ///
    /// # Parameters
    ///
    /// - `transaction_id`: The id returned by [`init`](Self::init).
    ///
    /// # Returns
    ///
    /// The gateway's [`Reply`]; `success` is only true once the payment
    /// completed. Transport failures are returned as [`GatewayError`].
    pub async fn result(&self, transaction_id: &str) -> GatewayResult<Reply> {
        let request = GatewayRequest::result(transaction_id);
        let result = self.submit(&request, None, Some(transaction_id)).await?;
        Ok(Reply::new(result))
    }

    /// Closes a transaction approving it, i.e. charging the held amount.
    ///
    /// # Parameters
    ///
    /// - `transaction_id`: The id returned by [`init`](Self::init).
    ///
    /// # Returns
    ///
    /// Same as [`close_with`](Self::close_with) with `approved = true`.
    pub async fn close(&self, transaction_id: &str) -> GatewayResult<Reply> {
        self.close_with(transaction_id, true).await
    }

    /// Closes a transaction.
    ///
    /// # Parameters
    ///
    /// - `transaction_id`: The id returned by [`init`](Self::init).
    /// - `approved`: `true` captures the held authorization, `false` voids it.
    ///
    /// # Returns
    ///
    /// The gateway's [`Reply`]. Transport failures are returned as [`GatewayError`].
    pub async fn close_with(&self, transaction_id: &str, approved: bool) -> GatewayResult<Reply> {
        let request = GatewayRequest::close(transaction_id, approved);
        let result = self.submit(&request, None, Some(transaction_id)).await?;
        Ok(Reply::new(result))
    }

    /// [`result`](Self::result) for a transaction opened by [`init`](Self::init).
    ///
    /// # Parameters
    ///
    /// - `transaction`: A transaction whose `transaction_id` was set by a successful `init`.
    ///
    /// # Returns
    ///
    /// The gateway's [`Reply`], or [`GatewayError::MissingTransactionId`]
    /// without any request when the transaction has no id.
    pub async fn query_transaction(&self, transaction: &Transaction) -> GatewayResult<Reply> {
        let id = transaction
            .transaction_id
            .as_deref()
            .ok_or(GatewayError::MissingTransactionId)?;
        self.result(id).await
    }

    /// [`close_with`](Self::close_with) using the transaction's approved flag.
    ///
    /// # Parameters
    ///
    /// - `transaction`: A transaction whose `transaction_id` was set by a successful
    ///   `init`. An unset `approved` flag counts as `true`.
    ///
    /// # Returns
    ///
    /// The gateway's [`Reply`], or [`GatewayError::MissingTransactionId`]
    /// without any request when the transaction has no id.
    pub async fn close_transaction(&self, transaction: &Transaction) -> GatewayResult<Reply> {
        let id = transaction
            .transaction_id
            .as_deref()
            .ok_or(GatewayError::MissingTransactionId)?;
        self.close_with(id, transaction.approved.unwrap_or(true)).await
    }

    async fn submit(
        &self,
        request: &GatewayRequest,
        order_id: Option<&str>,
        transaction_id: Option<&str>,
    ) -> GatewayResult<TransactionResult> {
        let operation = request.operation();
        let request_repr = request.to_json()?;

        let outcome = self.send(operation, request).await;
        let response_repr = match &outcome {
            Ok(body) => Some(body.as_str()),
            Err(e) => {
                tracing::warn!(%operation, error = %e, "payment gateway request failed");
                None
            }
        };
        self.logger.record(&Exchange {
            operation: operation.as_str(),
            order_id,
            transaction_id,
            request: &request_repr,
            response: response_repr,
        });

        let body = outcome?;
        serde_json::from_str(&body).map_err(|source| {
            tracing::warn!(%operation, error = %source, "payment gateway response is not valid JSON");
            GatewayError::Decode { operation, source }
        })
    }

    async fn send(&self, operation: Operation, request: &GatewayRequest) -> GatewayResult<String> {
        let endpoint = self.endpoint();
        tracing::debug!(%operation, %endpoint, "submitting payment gateway request");

        let mut builder = self
            .http
            .post(&endpoint)
            .header(header::ACCEPT, "application/json")
            .header(
                header::AUTHORIZATION,
                authorization_header(&self.config.store, &self.config.api_key),
            )
            .form(&request.form()?);
        if let Some(host) = self.config.host_header() {
            builder = builder.header(header::HOST, host);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GatewayError::Status {
                operation,
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}
