use std::fmt;
use std::net::ToSocketAddrs;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use log::{debug, warn};
use parking_lot::{Mutex, RwLock};

use crate::buffer::{PacketBuffer, DEFAULT_MAX_PACKET_SIZE};
use crate::error::{Result, StatsdError};
use crate::metric::{format_line, MetricKind};
use crate::ticker::FlushTimer;
use crate::transport::{Transport, UdpTransport};
use crate::value::ToMetricValue;


/// Hook rewriting every metric name before the prefix is applied.
pub type NameFormatter = Arc<dyn Fn(&str) -> String + Send + Sync>;


/// Client settings that can be given up front.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Largest packet, in bytes, the client batches lines into.
    pub max_packet_size: usize,

    /// Flush buffered lines on this interval. `None` disables the timer.
    pub flush_interval: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_packet_size: DEFAULT_MAX_PACKET_SIZE,
            flush_interval: None,
        }
    }
}


struct State<T> {
    buffer: PacketBuffer,
    transport: T,
    closed: bool,
}

struct Inner<T: Transport> {
    prefix: String,
    formatter: RwLock<Option<NameFormatter>>,
    state: Mutex<State<T>>,
    // Lock order: timer before state.
    timer: Mutex<Option<FlushTimer>>,
}

impl<T: Transport> Inner<T> {
    fn append(&self, line: &str) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(StatsdError::Closed);
        }
        let State { buffer, transport, .. } = &mut *state;
        buffer.append(line, transport)
    }

    fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(StatsdError::Closed);
        }
        let State { buffer, transport, .. } = &mut *state;
        buffer.flush(transport)
    }

    fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    fn close(&self) -> Result<()> {
        let mut timer = self.timer.lock();
        if let Some(timer) = timer.take() {
            timer.stop();
        }

        let mut state = self.state.lock();
        if state.closed {
            return Ok(());
        }
        state.closed = true;

        let State { buffer, transport, .. } = &mut *state;
        let flushed = buffer.flush(transport);
        let closed = transport.close();
        debug!("statsd client closed");
        flushed?;
        closed?;
        Ok(())
    }
}

impl<T: Transport> Drop for Inner<T> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("failed to close statsd client on drop: {}", e);
        }
    }
}


/// Buffered statsd client.
///
/// Metric lines are batched into packets of at most `max_packet_size`
/// bytes and written to the transport when a packet fills up, when
/// `flush` is called, on the `flush_every` interval, and on close.
///
/// `Client` is a cheap handle: clones share the same buffer and
/// transport and can be used from any number of threads. The transport
/// is closed by `close`, or when the last handle is dropped.
///
/// # Example
///
/// ```no_run
/// use statsd::Client;
///
/// let client = Client::connect("127.0.0.1:8125", "myapp.").unwrap();
/// client.increment("some.metric.completed").unwrap();
/// client.close().unwrap();
/// ```
pub struct Client<T: Transport> {
    inner: Arc<Inner<T>>,
}

impl<T: Transport> Clone for Client<T> {
    fn clone(&self) -> Self {
        Client { inner: self.inner.clone() }
    }
}

impl<T: Transport> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Client")
            .field("prefix", &self.inner.prefix)
            .field("closed", &self.inner.is_closed())
            .finish()
    }
}

impl Client<UdpTransport> {
    /// Construct a new statsd client given an host/port & prefix
    pub fn connect<A: ToSocketAddrs>(host: A, prefix: &str) -> Result<Client<UdpTransport>> {
        let transport = UdpTransport::connect(host)?;
        Ok(Client::new(transport, prefix))
    }
}

impl<T: Transport + 'static> Client<T> {
    /// Wrap `transport`, prepending `prefix` verbatim to every metric name.
    pub fn new(transport: T, prefix: &str) -> Client<T> {
        Client {
            inner: Arc::new(Inner {
                prefix: prefix.to_string(),
                formatter: RwLock::new(None),
                state: Mutex::new(State {
                    buffer: PacketBuffer::new(DEFAULT_MAX_PACKET_SIZE),
                    transport,
                    closed: false,
                }),
                timer: Mutex::new(None),
            }),
        }
    }

    /// Like `new`, applying `config` before any metric is sent.
    pub fn with_config(transport: T, prefix: &str, config: ClientConfig) -> Result<Client<T>> {
        let client = Client::new(transport, prefix);
        client.set_max_packet_size(config.max_packet_size);
        if let Some(interval) = config.flush_interval {
            client.flush_every(interval)?;
        }
        Ok(client)
    }

    pub fn prefix(&self) -> &str {
        &self.inner.prefix
    }

    /// Modify a counter by `delta`.
    ///
    /// ```ignore
    /// # Increment by 12
    /// client.count("metric.completed", 12);
    /// ```
    pub fn count(&self, metric: &str, delta: i64) -> Result<()> {
        self.send(metric, &delta, MetricKind::Counter, 1.0)
    }

    /// Increment a metric by 1
    pub fn increment(&self, metric: &str) -> Result<()> {
        self.count(metric, 1)
    }

    /// Decrement a metric by 1
    pub fn decrement(&self, metric: &str) -> Result<()> {
        self.count(metric, -1)
    }

    /// Modify a counter by `delta` only `rate` of the time.
    ///
    /// Sent lines carry the rate so the server can scale them back up.
    ///
    /// ```ignore
    /// # Increment by 4 50% of the time.
    /// client.sampled_count("metric.completed", 4, 0.5);
    /// ```
    pub fn sampled_count(&self, metric: &str, delta: i64, rate: f64) -> Result<()> {
        if self.is_closed() {
            return Err(StatsdError::Closed);
        }
        if rand::random::<f64>() >= rate {
            return Ok(());
        }
        self.send(metric, &delta, MetricKind::Counter, rate)
    }

    /// Set a gauge value.
    ///
    /// ```ignore
    /// # set a gauge to 9001
    /// client.gauge("power_level.observed", 9001);
    /// ```
    pub fn gauge<V: ToMetricValue>(&self, metric: &str, value: V) -> Result<()> {
        self.send(metric, &value, MetricKind::Gauge, 1.0)
    }

    /// Add `value` to a set; the server counts unique values.
    pub fn unique<V: ToMetricValue>(&self, metric: &str, value: V) -> Result<()> {
        self.send(metric, &value, MetricKind::Set, 1.0)
    }

    /// Send a timer value, rounded to whole milliseconds.
    pub fn time(&self, metric: &str, duration: Duration) -> Result<()> {
        self.send(metric, &duration, MetricKind::Timer, 1.0)
    }

    /// Send a timer value already in ms.
    pub fn timing(&self, metric: &str, millis: u64) -> Result<()> {
        self.send(metric, &millis, MetricKind::Timer, 1.0)
    }

    /// Start timing now; the returned function sends the elapsed time.
    ///
    /// ```ignore
    /// let done = client.record("request.duration", 1.0);
    /// handle_request();
    /// done()?;
    /// ```
    ///
    /// The returned function may be moved to another thread.
    pub fn record(&self, metric: &str, rate: f64) -> impl FnOnce() -> Result<()> + Send + 'static {
        let client = self.clone();
        let metric = metric.to_string();
        let start = Instant::now();
        move || client.send(&metric, &start.elapsed(), MetricKind::Timer, rate)
    }

    /// Time a block of code.
    ///
    /// The passed closure will be timed and executed. The block's
    /// duration will be sent as a metric.
    ///
    /// ```ignore
    /// client.time_block("response.duration", || {
    ///   # Your code here.
    /// });
    /// ```
    pub fn time_block<F: FnOnce()>(&self, metric: &str, block: F) -> Result<()> {
        let start = Instant::now();
        block();
        self.time(metric, start.elapsed())
    }

    /// Send a metric with an arbitrary type tag.
    ///
    /// All the typed helpers go through here. The name formatter and
    /// prefix are applied to `metric`; `rate` below 1.0 is annotated on
    /// the line.
    pub fn write_metric(&self, metric: &str, value: &str, tag: &str, rate: f64) -> Result<()> {
        let line = format_line(&self.metric_name(metric), value, tag, Some(rate));
        self.inner.append(&line)
    }

    fn send(&self, metric: &str, value: &dyn ToMetricValue, kind: MetricKind, rate: f64) -> Result<()> {
        self.write_metric(metric, &value.to_metric_value(), kind.tag(), rate)
    }

    fn metric_name(&self, metric: &str) -> String {
        let formatter = self.inner.formatter.read().clone();
        match formatter {
            Some(formatter) => format!("{}{}", self.inner.prefix, formatter(metric)),
            None => format!("{}{}", self.inner.prefix, metric),
        }
    }

    /// Flush buffered lines `times` times, or once if `times <= 0`.
    ///
    /// Flushing an empty buffer writes nothing.
    pub fn flush(&self, times: i32) -> Result<()> {
        for _ in 0..times.max(1) {
            self.inner.flush()?;
        }
        Ok(())
    }

    /// Flush on a background thread every `interval`, replacing any
    /// previous interval. A zero interval stops background flushing.
    ///
    /// Errors raised by background flushes are logged.
    pub fn flush_every(&self, interval: Duration) -> Result<()> {
        let mut timer = self.inner.timer.lock();
        if self.inner.is_closed() {
            return Err(StatsdError::Closed);
        }
        if let Some(previous) = timer.take() {
            previous.stop();
        }
        if interval.is_zero() {
            return Ok(());
        }

        let inner = Arc::downgrade(&self.inner);
        let started = FlushTimer::start(interval, move || flush_tick(&inner))
            .map_err(StatsdError::Timer)?;
        *timer = Some(started);
        Ok(())
    }

    /// The interval of the running flush timer, if any.
    pub fn flush_interval(&self) -> Option<Duration> {
        self.inner.timer.lock().as_ref().map(FlushTimer::interval)
    }

    /// Bytes currently waiting to be flushed.
    pub fn buffered_len(&self) -> usize {
        self.inner.state.lock().buffer.len()
    }

    pub fn max_packet_size(&self) -> usize {
        self.inner.state.lock().buffer.max_packet_size()
    }

    /// Applies to lines appended after the call.
    ///
    /// Each line's trailing newline counts toward the size, so a line
    /// of exactly `max_packet_size` bytes is sent as its own packet.
    pub fn set_max_packet_size(&self, max_packet_size: usize) {
        self.inner.state.lock().buffer.set_max_packet_size(max_packet_size);
    }

    /// Rewrite every metric name with `formatter` before sending.
    ///
    /// ```ignore
    /// client.set_formatter(|name| format!("{}.web-1", name));
    /// ```
    pub fn set_formatter<F>(&self, formatter: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        *self.inner.formatter.write() = Some(Arc::new(formatter));
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Stop the flush timer, flush what is buffered and close the
    /// transport.
    ///
    /// Closing an already closed client does nothing.
    pub fn close(&self) -> Result<()> {
        self.inner.close()
    }
}

fn flush_tick<T: Transport>(inner: &Weak<Inner<T>>) -> bool {
    let Some(inner) = inner.upgrade() else {
        return false;
    };
    match inner.flush() {
        Ok(()) => true,
        Err(StatsdError::Closed) => false,
        Err(e) => {
            warn!("statsd background flush failed: {}", e);
            true
        }
    }
}
