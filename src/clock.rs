// File: ./src/clock.rs
// Wall clock shown in the header. Runs on its own and never touches task state.
use chrono::Local;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const CLOCK_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn now_string() -> String {
    Local::now().format(CLOCK_FORMAT).to_string()
}

pub struct Clock {
    rx: watch::Receiver<String>,
    handle: JoinHandle<()>,
}

impl Clock {
    /// Starts ticking every `every`. Must be called inside a tokio runtime.
    pub fn spawn(every: Duration) -> Self {
        let (tx, rx) = watch::channel(now_string());
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if tx.send(now_string()).is_err() {
                    break;
                }
            }
        });
        Self { rx, handle }
    }

    pub fn current(&self) -> String {
        self.rx.borrow().clone()
    }

    /// A receiver the UI can wait on for the next tick.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.rx.clone()
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}
