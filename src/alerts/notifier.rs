use crate::alerts::formatter::{
    AlertPayload, Severity, format_breakout, format_multi_breakout, format_regression_anomaly,
};
use crate::engine::TickReport;

/// Consumer of alert payloads. Delivery (browser push, webhook, log) is the
/// implementor's business; payloads are handed over by value.
pub trait Notifier {
    fn notify(&mut self, payload: AlertPayload);
}

/// Writes alerts to the log, at a level matching their severity.
#[derive(Debug, Default)]
pub struct LogNotifier {
    pub sent: usize,
}

impl Notifier for LogNotifier {
    fn notify(&mut self, payload: AlertPayload) {
        let line = format!("{} | {}", payload.title, payload.body.replace('\n', " | "));
        match payload.severity {
            Severity::Info => log::info!("{}", line),
            Severity::Warning => log::warn!("{}", line),
            Severity::Critical => log::error!("{}", line),
        }
        self.sent += 1;
    }
}

/// Keeps every payload; handy for tests and for batching.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    pub sent: Vec<AlertPayload>,
}

impl Notifier for CollectingNotifier {
    fn notify(&mut self, payload: AlertPayload) {
        self.sent.push(payload);
    }
}

/// Sends every alert in a tick report: individual breakouts first, then the
/// multi-breakout summary, then regression anomalies. Returns how many were sent.
pub fn dispatch_report(report: &TickReport, notifier: &mut dyn Notifier) -> usize {
    let mut sent = 0;
    for event in &report.breakouts {
        notifier.notify(format_breakout(event));
        sent += 1;
    }
    if let Some(multi) = &report.multi_breakout {
        notifier.notify(format_multi_breakout(multi));
        sent += 1;
    }
    for note in &report.anomalies {
        notifier.notify(format_regression_anomaly(note));
        sent += 1;
    }
    sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn empty_report_sends_nothing() {
        let mut notifier = CollectingNotifier::default();
        assert_eq!(dispatch_report(&TickReport::empty(Utc::now()), &mut notifier), 0);
        assert!(notifier.sent.is_empty());
    }
}
