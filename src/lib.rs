/*!
A buffered, thread-safe statsd client.

The statsd protocol consists of plain-text lines such as
`myapp.requests:1|c`, usually sent over UDP. This client batches lines
into packets no larger than a configured size (512 bytes by default) and
writes a packet when it fills up, when asked to flush, on an optional
background interval, and when the client is closed.

Due to the inherent design of the system, there is no guarantee that metrics
will be received by the server. Transport errors are returned to the caller
that triggered the write, and the data in that packet is dropped.

```no_run
use std::time::Duration;
use statsd::Client;

let client = Client::connect("127.0.0.1:8125", "myapp.").unwrap();
client.flush_every(Duration::from_secs(1)).unwrap();

client.increment("requests").unwrap();
client.gauge("queue.depth", 12).unwrap();

let done = client.record("request.duration", 1.0);
// ... handle the request ...
done().unwrap();

client.close().unwrap();
```
*/
pub mod client;
pub mod transport;
mod buffer;
mod error;
mod metric;
mod ticker;
mod value;

pub use buffer::DEFAULT_MAX_PACKET_SIZE;
pub use client::{Client, ClientConfig, NameFormatter};
pub use error::{Result, StatsdError};
pub use metric::{format_line, MetricKind};
pub use transport::{MemoryTransport, StreamTransport, Transport, UdpTransport};
pub use value::{duration_millis, ToMetricValue};
