//! Library-only walkthrough of the fixed-window limiter.
//!
//! Run with: cargo run --example basic

use quotagate::{FixedWindowLimiter, MemoryStore, Quota};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    let limiter = FixedWindowLimiter::new(MemoryStore::new(), Quota::per_minute(5));

    for i in 1..=7 {
        let decision = limiter.check_and_record("demo-client").await.unwrap();
        if decision.is_allowed() {
            println!(
                "request {i}: allowed, {} of {} remaining",
                decision.info().remaining,
                decision.info().limit
            );
        } else {
            println!("request {i}: rejected (count {})", decision.info().count);
        }
    }
}
