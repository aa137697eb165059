//! Polls a fake job until it reports `completed`, logging every run event.
//!
//! ```text
//! RUST_LOG=taskloop=debug cargo run --example poll_status
//! ```

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};
use std::time::Duration;

use taskloop::{
    schedule, BackoffPolicy, Bus, Config, JitterPolicy, LogWriter, Repeat, ScheduleOptions,
    SubscriberSet, WorkFn,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Queued,
    Running,
    Completed,
}

#[derive(Debug, thiserror::Error)]
#[error("job {0} not found")]
struct NotFound(u32);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "taskloop=debug".into()))
        .init();

    let cfg = Config {
        timeout: Duration::from_secs(5),
        ..Config::default()
    };
    let bus = Bus::from_config(&cfg);
    let subs = SubscriberSet::attach(&bus, vec![Arc::new(LogWriter::default()) as _]);

    // The fake backend answers Queued, Running, Running, then Completed.
    let hits = Arc::new(AtomicU32::new(0));
    let status = WorkFn::new("job-status", move |job: u32| {
        let n = hits.fetch_add(1, Ordering::SeqCst);
        async move {
            if job != 7 {
                return Err(NotFound(job));
            }
            Ok(match n {
                0 => Status::Queued,
                1 | 2 => Status::Running,
                _ => Status::Completed,
            })
        }
    });

    let backoff = BackoffPolicy {
        first: Duration::from_millis(50),
        max: Duration::from_millis(400),
        factor: 2.0,
        jitter: JitterPolicy::Equal,
    };
    let poll = schedule(
        status,
        ScheduleOptions::with_defaults(&cfg)
            .with_repeat(Repeat::predicate(|last: Option<&Status>, _| {
                last != Some(&Status::Completed)
            }))
            .with_delay(backoff)
            .with_bus(bus.clone()),
    );

    let outcome = poll.call(7).await?;
    println!("job 7 finished with {outcome:?}");

    match poll.call(8).await {
        Err(e) => println!("job 8 failed: {e} (label: {})", e.as_label()),
        Ok(v) => println!("job 8 unexpectedly finished with {v:?}"),
    }

    subs.shutdown().await;
    Ok(())
}
