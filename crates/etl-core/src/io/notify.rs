use std::sync::{Arc, Mutex};

use log::error;

use crate::errors::NotifyError;

/// Canal de notificación de fallos (fire-and-forget).
///
/// El runner ignora el resultado más allá de registrarlo: un notifier caído
/// nunca cambia el outcome de un stage.
pub trait Notifier: Send + Sync {
    fn notify_failure(&self, subject: &str, message: &str, recipient: &str) -> Result<(), NotifyError>;
}

/// Deja el fallo en el log (nivel error). Es el notifier por defecto.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_failure(&self, subject: &str, message: &str, recipient: &str) -> Result<(), NotifyError> {
        error!("{subject} (to={recipient}): {message}");
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify_failure(&self, _subject: &str, _message: &str, _recipient: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub message: String,
    pub recipient: String,
}

/// Notifier que acumula lo enviado; opcionalmente falla en cada envío (para
/// probar que el fallo del canal se traga).
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
    fail: bool,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra el intento pero devuelve error de entrega.
    pub fn failing() -> Self {
        Self { sent: Arc::default(),
               fail: true }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl Notifier for InMemoryNotifier {
    fn notify_failure(&self, subject: &str, message: &str, recipient: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(Notification { subject: subject.to_string(),
                                 message: message.to_string(),
                                 recipient: recipient.to_string() });
        if self.fail {
            return Err(NotifyError::Delivery("smtp unreachable".into()));
        }
        Ok(())
    }
}
