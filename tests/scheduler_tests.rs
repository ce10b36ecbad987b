//! Scheduler behavior through the public API.

use chrono::Duration as ChronoDuration;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use umbrawatch::alert::buzzer::testing::RecordingBuzzer;
use umbrawatch::alert::{AlertKind, AlertScheduler, PageId, totality_alerts};
use umbrawatch::time_source::ManualTimeSource;
use umbrawatch::umbra::Totality;

const NOW: i64 = 50_000;

fn clock() -> Arc<ManualTimeSource> {
    Arc::new(ManualTimeSource::at_seconds_of_day(NOW))
}

fn wait_for_page(scheduler: &AlertScheduler, within: Duration) -> Option<PageId> {
    let deadline = Instant::now() + within;
    while Instant::now() < deadline {
        if let Some(page) = scheduler.change_to_page() {
            return Some(page);
        }
        thread::sleep(Duration::from_millis(5));
    }
    None
}

#[test]
fn test_offset_walks_through_totality_plan() {
    let buzzer = RecordingBuzzer::new();
    let scheduler = AlertScheduler::new(clock(), Some(Box::new(buzzer.clone()))).unwrap();

    // first contact notice lands at NOW + 318, so nothing starts in the past
    let totality = Totality {
        start: NOW + 5000,
        end: NOW + 5200,
    };
    for record in totality_alerts(&totality, 0) {
        scheduler.add(record.time, record.priority, record.page, record.sound);
    }
    assert_eq!(scheduler.pending_alerts(), 56);

    // jump to mid-totality; everything earlier is dropped
    scheduler.set_time_offset(5100);
    let page = wait_for_page(&scheduler, Duration::from_secs(3));
    assert_eq!(page, Some(umbrawatch::alert::TOTALITY_PAGE));

    // the warning beep played; totality end, seven partial prompts and
    // last contact remain with three records each
    let deadline = Instant::now() + Duration::from_secs(2);
    while buzzer.levels().len() < 2 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(buzzer.levels(), vec![true, false]);
    assert_eq!(scheduler.pending_alerts(), 27);
}

#[test]
fn test_equal_times_fire_once_by_priority() {
    let scheduler = AlertScheduler::new(clock(), None).unwrap();
    scheduler.add(NOW + 10, 5, 1, AlertKind::None);
    scheduler.add(NOW + 10, 2, 2, AlertKind::None);
    scheduler.add(NOW + 10, 9, 3, AlertKind::None);

    scheduler.set_time_offset(10);
    assert_eq!(wait_for_page(&scheduler, Duration::from_secs(3)), Some(2));
    assert_eq!(scheduler.pending_alerts(), 0);
    assert_eq!(wait_for_page(&scheduler, Duration::from_millis(200)), None);
}

#[test]
fn test_manual_clock_advance_is_seen_after_a_change() {
    let clock = clock();
    let scheduler = AlertScheduler::new(clock.clone(), None).unwrap();
    scheduler.add(NOW + 3600, 0, 4, AlertKind::None);

    clock.advance(ChronoDuration::seconds(3600));
    // any producer call wakes the worker to resample the clock
    scheduler.add(NOW + 7200, 0, 5, AlertKind::None);

    assert_eq!(wait_for_page(&scheduler, Duration::from_secs(3)), Some(4));
    assert_eq!(scheduler.pending_alerts(), 1);
}

#[test]
fn test_running_flag_shuts_worker_down() {
    let running = Arc::new(AtomicBool::new(true));
    let scheduler =
        AlertScheduler::with_running_flag(clock(), None, Arc::clone(&running)).unwrap();
    scheduler.add(NOW + 5, 0, 1, AlertKind::None);

    running.store(false, Ordering::SeqCst);
    scheduler.set_time_offset(5);
    assert_eq!(wait_for_page(&scheduler, Duration::from_millis(300)), None);

    let start = Instant::now();
    drop(scheduler);
    assert!(start.elapsed() < Duration::from_secs(1));
}
