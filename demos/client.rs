use std::io;
use std::time::Duration;

// Import the client object.
use statsd::{Client, StreamTransport};

fn main() -> statsd::Result<()> {
    let client = Client::connect("127.0.0.1:8125", "myapp.")?;
    client.flush_every(Duration::from_secs(1))?;
    client.increment("some.metric")?;
    client.close()?;
    println!("Sent a metric!");

    // The same metrics, written to stdout instead.
    let client = Client::new(StreamTransport::new(io::stdout()), "myapp.");
    client.set_formatter(|name| format!("{}.demo-host", name));
    client.increment("some.metric")?;
    client.time_block("some.block", || std::thread::sleep(Duration::from_millis(15)))?;
    client.close()
}
