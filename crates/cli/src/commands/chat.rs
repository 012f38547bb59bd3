use std::io::{BufRead, Write};

use crate::commands::{init_logging, runtime, CommandResult};
use stockwise_core::config::LoadOptions;
use stockwise_core::SessionId;

pub fn run(session: Option<&str>) -> CommandResult {
    let tokio_runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(tokio_runtime) => tokio_runtime,
        Err(error) => {
            return CommandResult::failure(
                "chat",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    tokio_runtime.block_on(async {
        let app = match runtime::bootstrap(LoadOptions::default()).await {
            Ok(app) => app,
            Err(error) => {
                return CommandResult::failure("chat", "bootstrap", error.to_string(), 2);
            }
        };
        init_logging(&app.config.logging);

        let session_id = session
            .map(|session| SessionId(session.to_string()))
            .unwrap_or_else(SessionId::generate);

        println!("Stockwise interactive console. Type your query, or 'quit' to exit.\n");

        let stdin = std::io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            print!("You: ");
            if std::io::stdout().flush().is_err() {
                break;
            }

            let Some(Ok(line)) = lines.next() else {
                break;
            };
            let query = line.trim();
            if query.is_empty() {
                continue;
            }
            if matches!(query.to_ascii_lowercase().as_str(), "quit" | "exit" | "q") {
                break;
            }

            let reply = app.coordinator.handle(&session_id, query).await;
            println!("\nStockwise: {}\n", reply.text);
        }

        println!("Goodbye!");
        app.pool.close().await;
        CommandResult { exit_code: 0, output: String::new() }
    })
}
