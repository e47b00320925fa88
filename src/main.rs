use std::env;
use std::process::ExitCode;

use payment_gateway::{
    utils, GatewayClient, GatewayConfig, GatewayResult, Reply, Transaction, TracingLogger,
};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: payment_gateway [--env <file>] <command>

Commands:
  init <response-path> <amount> [order-id] [user-id]
  start <transaction-id>
  result <transaction-id>
  close <transaction-id> [true|false]";

/// Runs one step of the transaction lifecycle against the configured gateway.
///
/// Configuration comes from the defaults, then `PAYMENT_GATEWAY_CONFIG_FILE`
/// (YAML) if set, then `PAYMENT_GATEWAY_*` variables from the environment and
/// the dotenv file given with `--env` (default `.env`).
///
/// Exits non-zero when the gateway could not be reached or did not answer
/// `SUCCESSFUL`.
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let env_file = match args.iter().position(|a| a == "--env") {
        Some(i) if i + 1 < args.len() => {
            let path = args.remove(i + 1);
            args.remove(i);
            Some(path)
        }
        Some(_) => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
        None => None,
    };

    let env_file = utils::ensure_dotenv_loaded(env_file.as_deref());
    println!("📦 Loading environment from {env_file}");

    let mut builder = GatewayConfig::builder();
    if let Ok(path) = env::var("PAYMENT_GATEWAY_CONFIG_FILE") {
        builder = builder.configure_from_file(path);
    }
    let config = builder.configure_from_env().build();
    println!(
        "🔗 Gateway {} (store {}, provider {})",
        config.header_host, config.store, config.provider
    );
    let client = GatewayClient::new(config).with_logger(TracingLogger);

    let arg = |i: usize| args.get(i).map(String::as_str);
    let outcome: GatewayResult<Reply> = match (arg(0), arg(1), arg(2)) {
        (Some("init"), Some(response_path), Some(amount)) => {
            let mut tx = Transaction::new(response_path, amount)
                .with_order_id(arg(3).unwrap_or_default())
                .with_user_id(arg(4).unwrap_or_default());
            let outcome = client.init(&mut tx).await;
            if let Some(id) = &tx.transaction_id {
                println!("➡️  Redirect the customer to {}", client.start(id));
            }
            outcome
        }
        (Some("start"), Some(transaction_id), None) => {
            println!("{}", client.start(transaction_id));
            return ExitCode::SUCCESS;
        }
        (Some("result"), Some(transaction_id), None) => client.result(transaction_id).await,
        (Some("close"), Some(transaction_id), approved) => {
            let approved = approved.map_or(true, |a| a.eq_ignore_ascii_case("true"));
            client.close_with(transaction_id, approved).await
        }
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match outcome {
        Ok(reply) => {
            let icon = if reply.success { "✅" } else { "❌" };
            println!(
                "{icon} {} {}",
                reply.result.result_code,
                reply.result.result_message.as_deref().unwrap_or("")
            );
            match serde_json::to_string_pretty(&reply.result) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("🚨 Could not render result: {e}"),
            }
            if reply.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("🚨 {e}");
            ExitCode::FAILURE
        }
    }
}
