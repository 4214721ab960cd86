use crate::types::Alert;

/// Downstream consumer of alerts raised by the evaluation engine.
///
/// Implementations may log, persist or notify, and may decorate the
/// description they deliver, but must not panic for a well-formed alert.
/// Delivery failures are the sink's own concern and are never reported back
/// to the engine.
pub trait AlertSink: Send + Sync {
    fn accept(&self, alert: &Alert);
}

impl<T: AlertSink + ?Sized> AlertSink for std::sync::Arc<T> {
    fn accept(&self, alert: &Alert) {
        (**self).accept(alert);
    }
}
