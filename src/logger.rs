use std::fmt::{self, Write as _};

/// One request/response pair as seen by the client.
///
/// `response` is `None` when the call failed before the gateway answered,
/// and for [`start`](crate::gateway::GatewayClient::start), which makes no call.
#[derive(Debug, Clone, Copy)]
pub struct Exchange<'a> {
    pub operation: &'a str,
    pub order_id: Option<&'a str>,
    pub transaction_id: Option<&'a str>,
    pub request: &'a str,
    pub response: Option<&'a str>,
}

impl fmt::Display for Exchange<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.operation)?;
        if let Some(order_id) = self.order_id.filter(|s| !s.is_empty()) {
            write!(f, " OrderId: {order_id}")?;
        }
        if let Some(transaction_id) = self.transaction_id.filter(|s| !s.is_empty()) {
            write!(f, " TransactionId: {transaction_id}")?;
        }
        write!(
            f,
            " Request: {} Response: {}",
            self.request,
            self.response.unwrap_or("")
        )
    }
}

/// Observer of every exchange with the gateway.
///
/// Implementations must not panic; the client calls them on both the
/// success and the failure path.
pub trait TransactionLogger: Send + Sync {
    fn record(&self, exchange: &Exchange<'_>);
}

impl<F> TransactionLogger for F
where
    F: Fn(&Exchange<'_>) + Send + Sync,
{
    fn record(&self, exchange: &Exchange<'_>) {
        self(exchange)
    }
}

/// Renders an exchange as a single line. A rendering failure turns into an
/// inert description instead of a panic.
pub fn render(exchange: &Exchange<'_>) -> String {
    let mut line = String::new();
    match write!(line, "{exchange}") {
        Ok(()) => line.replace(['\r', '\n'], " "),
        Err(e) => format!("<unrenderable {} exchange: {e}>", exchange.operation),
    }
}

/// Default logger: one line per exchange on standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLogger;

impl TransactionLogger for ConsoleLogger {
    fn record(&self, exchange: &Exchange<'_>) {
        println!("{}", render(exchange));
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl TransactionLogger for NoopLogger {
    fn record(&self, _exchange: &Exchange<'_>) {}
}

/// Sends exchanges to `tracing` at info level under the `payment_gateway::exchange` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TransactionLogger for TracingLogger {
    fn record(&self, exchange: &Exchange<'_>) {
        tracing::info!(
            target: "payment_gateway::exchange",
            operation = exchange.operation,
            order_id = exchange.order_id.unwrap_or_default(),
            transaction_id = exchange.transaction_id.unwrap_or_default(),
            "{}",
            render(exchange)
        );
    }
}
