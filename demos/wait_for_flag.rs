//! Waits for a flag flipped by another task, once in time and once too late.
//!
//! ```text
//! cargo run --example wait_for_flag
//! ```

use std::future;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use taskloop::{is_timeout_error, wait_for};

fn flip_after(after: Duration) -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let setter = Arc::clone(&flag);
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        setter.store(true, Ordering::SeqCst);
    });
    flag
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    let flag = flip_after(Duration::from_millis(200));
    let t0 = Instant::now();
    let res = wait_for(
        move |_| future::ready(flag.load(Ordering::SeqCst)),
        Duration::from_millis(30),
        Duration::from_secs(1),
    )
    .await;
    println!("flag at 200ms, timeout 1s: {res:?} after {:?}", t0.elapsed());

    let flag = flip_after(Duration::from_millis(500));
    let t0 = Instant::now();
    match wait_for(
        move |_| future::ready(flag.load(Ordering::SeqCst)),
        Duration::from_millis(30),
        Duration::from_millis(300),
    )
    .await
    {
        Ok(()) => println!("flag at 500ms, timeout 300ms: unexpectedly ready"),
        Err(e) => println!(
            "flag at 500ms, timeout 300ms: {e} after {:?} (timeout: {})",
            t0.elapsed(),
            is_timeout_error(&e)
        ),
    }
}
