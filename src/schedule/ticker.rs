use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, FixedOffset, Local};
use log::debug;

use crate::schedule::builder::PrayerSchedule;
use crate::schedule::countdown::{tick, CountdownState};

/// Source of "now" for the ticker.
pub trait Clock: Send + 'static {
    fn now(&self) -> DateTime<FixedOffset>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<FixedOffset> + Send + 'static,
{
    fn now(&self) -> DateTime<FixedOffset> {
        self()
    }
}

/// Shared cell holding the schedule currently on display.
///
/// Replacing the schedule is one atomic swap; a tick sees either the old
/// snapshot or the new one, never a mix.
#[derive(Clone)]
pub struct ScheduleSlot {
    inner: Arc<ArcSwapOption<PrayerSchedule>>,
}

impl Default for ScheduleSlot {
    fn default() -> Self {
        Self {
            inner: Arc::new(ArcSwapOption::empty()),
        }
    }
}

impl ScheduleSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, schedule: PrayerSchedule) {
        self.inner.store(Some(Arc::new(schedule)));
    }

    pub fn clear(&self) {
        self.inner.store(None);
    }

    pub fn current(&self) -> Option<Arc<PrayerSchedule>> {
        self.inner.load_full()
    }
}

/// Background thread that recomputes the countdown every `period` and hands
/// it to `publish`. Stops when dropped, or when `publish` returns `false`.
pub struct Ticker {
    stop_tx: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn<C, F>(slot: ScheduleSlot, clock: C, period: Duration, mut publish: F) -> Self
    where
        C: Clock,
        F: FnMut(CountdownState) -> bool + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {}
                    // stop requested or owner dropped
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }

                let Some(schedule) = slot.current() else {
                    continue;
                };

                let state = tick(&schedule, &clock.now());
                if !publish(state) {
                    debug!("Countdown consumer gone, ticker exiting");
                    break;
                }
            }
        });

        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Stop the thread and wait for it. Equivalent to dropping the ticker.
    pub fn stop(self) {}
}

impl Drop for Ticker {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PrayerName;
    use crate::schedule::builder::build_schedule;
    use crate::schedule::test_support::{at, sample_timings};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PERIOD: Duration = Duration::from_millis(5);

    #[test]
    fn publishes_countdown_for_current_schedule() {
        let now = at(10, 13, 0);
        let slot = ScheduleSlot::new();
        slot.replace(build_schedule(&sample_timings(), &now).unwrap());

        let (tx, rx) = mpsc::channel();
        let ticker = Ticker::spawn(slot, move || now, PERIOD, move |s| tx.send(s).is_ok());

        let state = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(state.next, PrayerName::Asr);
        assert_eq!(state.remaining_label(), "02:45:00");

        drop(ticker);
        while rx.try_recv().is_ok() {}
        assert_eq!(
            rx.recv_timeout(Duration::from_millis(50)),
            Err(RecvTimeoutError::Disconnected)
        );
    }

    #[test]
    fn empty_slot_skips_until_schedule_arrives() {
        let now = at(10, 13, 0);
        let slot = ScheduleSlot::new();
        let (tx, rx) = mpsc::channel();
        let _ticker = Ticker::spawn(slot.clone(), move || now, PERIOD, move |s| {
            tx.send(s).is_ok()
        });

        assert_eq!(
            rx.recv_timeout(Duration::from_millis(50)),
            Err(RecvTimeoutError::Timeout)
        );

        slot.replace(build_schedule(&sample_timings(), &now).unwrap());
        let state = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(state.next, PrayerName::Asr);
    }

    #[test]
    fn swapped_schedule_is_observed() {
        let now = at(10, 13, 0);
        let slot = ScheduleSlot::new();
        slot.replace(build_schedule(&sample_timings(), &now).unwrap());

        let (tx, rx) = mpsc::channel();
        let _ticker = Ticker::spawn(slot.clone(), move || now, PERIOD, move |s| {
            tx.send(s).is_ok()
        });
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap().next, PrayerName::Asr);

        let evening = build_schedule(&sample_timings(), &at(10, 21, 0)).unwrap();
        slot.replace(evening);

        let mut saw_fajr = false;
        for _ in 0..200 {
            if rx.recv_timeout(Duration::from_secs(2)).unwrap().next == PrayerName::Fajr {
                saw_fajr = true;
                break;
            }
        }
        assert!(saw_fajr);
    }

    #[test]
    fn stops_when_consumer_declines() {
        let now = at(10, 13, 0);
        let slot = ScheduleSlot::new();
        slot.replace(build_schedule(&sample_timings(), &now).unwrap());

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let ticker = Ticker::spawn(slot, move || now, PERIOD, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        });

        thread::sleep(Duration::from_millis(60));
        ticker.stop();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
