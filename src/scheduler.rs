//! Daily trigger for the recurring report
//!
//! Runs one tick per day at a fixed time of day. Ticks are awaited to
//! completion before the next run is scheduled, so they never overlap.

use anyhow::Result;
use chrono::{DateTime, Days, Local, NaiveDateTime, NaiveTime, TimeZone, Utc};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    pub at: NaiveTime,
    pub utc: bool,
}

impl DailySchedule {
    /// Next run time (RFC 3339) and how long to wait for it
    pub fn next_wait(&self) -> (String, Duration) {
        if self.utc {
            wait_from(Utc::now(), self.at)
        } else {
            wait_from(Local::now(), self.at)
        }
    }
}

fn wait_from<Tz: TimeZone>(now: DateTime<Tz>, at: NaiveTime) -> (String, Duration)
where
    Tz::Offset: Display,
{
    let next = next_run_after(&now, at);
    let wait = next
        .clone()
        .signed_duration_since(now)
        .to_std()
        .unwrap_or_default();
    (next.to_rfc3339(), wait)
}

/// First occurrence of `at` strictly after `now`, in `now`'s timezone.
///
/// When `at` falls in a DST gap the wall time is read as UTC; on a repeated
/// hour the earlier instant wins.
pub fn next_run_after<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();

    let candidate = resolve(&tz, today.and_time(at));
    if candidate > *now {
        return candidate;
    }
    resolve(&tz, (today + Days::new(1)).and_time(at))
}

fn resolve<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

/// Run `tick` every day at the scheduled time until Ctrl-C.
///
/// A failed tick is logged and the loop waits for the next day.
pub async fn run_daily<F, Fut>(schedule: DailySchedule, mut tick: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    loop {
        let (next, wait) = schedule.next_wait();
        info!("Next report scheduled at {}", next);

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping scheduler");
                return Ok(());
            }
        }

        if let Err(e) = tick().await {
            error!("Scheduled report failed: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_later_today() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 6, 0, 0).unwrap();
        let next = next_run_after(&now, at(8, 0));
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_already_passed_rolls_to_tomorrow() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap();
        let next = next_run_after(&now, at(8, 0));
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 10, 17, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_exact_time_is_not_reused() {
        let now = Utc.with_ymd_and_hms(2026, 12, 31, 8, 0, 0).unwrap();
        let next = next_run_after(&now, at(8, 0));
        assert_eq!(next, Utc.with_ymd_and_hms(2027, 1, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_respects_offset() {
        let bangkok = FixedOffset::east_opt(7 * 3600).unwrap();
        let now = bangkok.with_ymd_and_hms(2026, 10, 16, 7, 30, 0).unwrap();
        let next = next_run_after(&now, at(8, 0));
        assert_eq!(next, bangkok.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap());
        assert_eq!(next.naive_utc().to_string(), "2026-10-16 01:00:00");
    }

    #[test]
    fn test_wait_duration() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 7, 30, 0).unwrap();
        let (next, wait) = wait_from(now, at(8, 0));
        assert_eq!(wait, Duration::from_secs(30 * 60));
        assert!(next.starts_with("2026-10-16T08:00:00"));
    }
}
