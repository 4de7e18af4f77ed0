use std::process::ExitCode;
use std::sync::Arc;

use perun_core::engine::BollardEngine;
use perun_core::reactor::Reactor;
use perun_core::PerunError;
use tracing::error;

/// Detached entry point for the Debug Event Reactor (spec §4.5). Spawned by
/// the Coordinator before an environment activates if no instance is already
/// running; it never exits on its own short of the event stream erroring.
fn main() -> ExitCode {
    // `PerunLog=verbose` forces trace-level logging to stdout, strictly more
    // verbose than `H_DEBUG=TRUE`'s debug level (spec §1/§6).
    let filter = if std::env::var("PerunLog").as_deref() == Ok("verbose") {
        "trace"
    } else if std::env::var("H_DEBUG").as_deref() == Ok("TRUE") {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("tokio runtime should build");

    let result: Result<(), PerunError> = runtime.block_on(async {
        let engine = Arc::new(BollardEngine::connect()?);
        let reactor = Reactor::new(engine);
        reactor.run().await?;
        Ok(())
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "debug event reactor exited");
            ExitCode::FAILURE
        }
    }
}
