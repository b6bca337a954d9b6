// Alert payloads and the notifier boundary
pub mod formatter;
pub mod notifier;

// Re-export commonly used types
pub use formatter::{
    AlertPayload, NumericContext, Severity, format_breakout, format_multi_breakout,
    format_regression_anomaly, format_value,
};
pub use notifier::{CollectingNotifier, LogNotifier, Notifier, dispatch_report};
