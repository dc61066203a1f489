//! Reloj inyectable.
//!
//! Cada transición del ledger lleva `last_update`; en producción viene de
//! `SystemClock`, en tests de `ManualClock` para que los timestamps sean
//! reproducibles.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Reloj manual: devuelve el instante actual y avanza `step` en cada lectura.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<Utc>>,
    step: Duration,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self { current: Mutex::new(start),
               step }
    }

    /// Reloj congelado (step = 0).
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::new(at, Duration::zero())
    }

    /// Instante que devolverá la próxima lectura.
    pub fn peek(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let mut guard = self.current.lock().unwrap_or_else(|p| p.into_inner());
        let now = *guard;
        *guard = now + self.step;
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn manual_clock_advances_by_step() {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let clock = ManualClock::new(t0, Duration::seconds(1));
        assert_eq!(clock.now(), t0);
        assert_eq!(clock.now(), t0 + Duration::seconds(1));
        assert_eq!(clock.peek(), t0 + Duration::seconds(2));
    }

    #[test]
    fn fixed_clock_never_moves() {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let clock = ManualClock::fixed(t0);
        assert_eq!(clock.now(), clock.now());
    }
}
