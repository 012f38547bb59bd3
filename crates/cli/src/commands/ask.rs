use crate::commands::{init_logging, runtime, CommandResult};
use stockwise_core::config::LoadOptions;
use stockwise_core::SessionId;

pub fn run(query: &str, session: Option<&str>) -> CommandResult {
    let tokio_runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(tokio_runtime) => tokio_runtime,
        Err(error) => {
            return CommandResult::failure(
                "ask",
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
                return CommandResult::failure("ask", "bootstrap", error.to_string(), 2);
            }
        };
        init_logging(&app.config.logging);

        let session_id = session
            .map(|session| SessionId(session.to_string()))
            .unwrap_or_else(SessionId::generate);

        let reply = app.coordinator.handle(&session_id, query).await;
        app.pool.close().await;

        CommandResult { exit_code: 0, output: reply.text }
    })
}
