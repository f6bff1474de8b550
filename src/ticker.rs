//! Background periodic flushing.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, Sender};
use log::{debug, warn};


/// A thread calling a flush callback on a fixed interval until stopped.
///
/// The callback returns `false` to end the loop early, e.g. once the
/// client it flushes has gone away.
pub struct FlushTimer {
    interval: Duration,
    stop: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl FlushTimer {
    pub fn start<F>(interval: Duration, mut on_tick: F) -> std::io::Result<FlushTimer>
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let (stop, stopped) = bounded::<()>(1);
        let ticker = tick(interval);

        let handle = thread::Builder::new()
            .name("statsd-flush".to_string())
            .spawn(move || {
                debug!("statsd flush timer started, interval {:?}", interval);
                loop {
                    select! {
                        recv(ticker) -> _ => {
                            if !on_tick() {
                                break;
                            }
                        }
                        recv(stopped) -> _ => break,
                    }
                }
                debug!("statsd flush timer stopped");
            })?;

        Ok(FlushTimer {
            interval,
            stop,
            handle: Some(handle),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stop the thread and wait for an in-flight flush to finish.
    ///
    /// After this returns no further tick fires.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = self.stop.try_send(());
        // The timer thread may itself drop the last client handle.
        if handle.thread().id() == thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            warn!("statsd flush timer thread panicked");
        }
    }
}

impl Drop for FlushTimer {
    fn drop(&mut self) {
        self.shutdown();
    }
}


#[cfg(test)]
mod test {
    use super::FlushTimer;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_ticks_until_stopped() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let timer = FlushTimer::start(Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        })
        .unwrap();
        assert_eq!(Duration::from_millis(5), timer.interval());

        thread::sleep(Duration::from_millis(100));
        timer.stop();
        let after_stop = ticks.load(Ordering::SeqCst);
        assert!(after_stop > 0);

        thread::sleep(Duration::from_millis(50));
        assert_eq!(after_stop, ticks.load(Ordering::SeqCst));
    }

    #[test]
    fn test_callback_can_end_loop() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let timer = FlushTimer::start(Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        })
        .unwrap();

        thread::sleep(Duration::from_millis(50));
        assert_eq!(1, ticks.load(Ordering::SeqCst));
        timer.stop();
    }
}
