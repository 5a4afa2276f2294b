//! Test fixtures for common types.

use std::sync::Once;

use a3bridge_core::CallContext;

/// A context resembling a dedicated-server call.
#[must_use]
pub fn test_context() -> CallContext {
    CallContext::new("76561198000000000", "fn_test.sqf", "Altis_Test", "Test Server")
}

/// The host's context argument vector for [`test_context`].
#[must_use]
pub fn test_context_args() -> Vec<String> {
    vec![
        "76561198000000000".into(),
        "fn_test.sqf".into(),
        "Altis_Test".into(),
        "Test Server".into(),
    ]
}

/// Send logs to the test harness's captured output. Safe to call from
/// every test; only the first call installs a subscriber.
pub fn init_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
