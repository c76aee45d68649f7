use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use trajtrack::{
    BBox, Clock, DetectionFeed, MonotonicClock, RawDetection, Rect, Timestamp, TrajectoryTracker,
};

// Every ingested box keeps width == height, so a torn read would break it.
fn consistent(r: &Rect) -> bool {
    (r.width() - r.height()).abs() < 1e-3
}

#[test]
fn test_queries_never_see_half_written_track() {
    const READERS: usize = 4;
    const MIN_HITS: usize = 50;

    let tracker = Arc::new(TrajectoryTracker::default());
    let start = Arc::new(Barrier::new(READERS + 1));
    let done = Arc::new(AtomicBool::new(false));

    // latest ingest time in ms, queries never run ahead of it
    let now_ms = Arc::new(AtomicU64::new(0));
    let hits: Arc<Vec<AtomicUsize>> =
        Arc::new((0..READERS).map(|_| AtomicUsize::new(0)).collect());

    tracker.ingest(
        Some(trajtrack::Detection::new(0i64, Rect::ltwh(1.0, 0.0, 1.0, 1.0))),
        Timestamp::ZERO,
    );

    let readers: Vec<_> = (0..READERS)
        .map(|n| {
            let tracker = tracker.clone();
            let start = start.clone();
            let done = done.clone();
            let now_ms = now_ms.clone();
            let hits = hits.clone();

            thread::spawn(move || {
                start.wait();

                while !done.load(Ordering::Acquire) {
                    let now = Timestamp::from_millis(now_ms.load(Ordering::Acquire));

                    if let Some(r) = tracker.current_render_box(now) {
                        assert!(consistent(&r), "torn box: {:?}", r);
                        hits[n].fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    start.wait();

    for i in 1..2_000u64 {
        let v = (i % 50) as f32 + 1.0;
        let id = (i / 100) as i64;
        tracker.ingest(
            Some(trajtrack::Detection::new(id, Rect::ltwh(v, 0.0, v, v))),
            Timestamp::from_millis(i),
        );
        now_ms.store(i, Ordering::Release);
        thread::yield_now();
    }

    // the last track stays fresh at the published time, so readers keep hitting it
    while hits.iter().any(|h| h.load(Ordering::Relaxed) < MIN_HITS) {
        thread::yield_now();
    }

    done.store(true, Ordering::Release);

    for reader in readers {
        reader.join().expect("reader panicked");
    }

    for (n, h) in hits.iter().enumerate() {
        assert!(
            h.load(Ordering::Relaxed) >= MIN_HITS,
            "reader {} only saw {} boxes",
            n,
            h.load(Ordering::Relaxed)
        );
    }
}

#[test]
fn test_feed_with_detector_thread() {
    let tracker = Arc::new(TrajectoryTracker::default());
    let feed = Arc::new(DetectionFeed::new(tracker.clone(), MonotonicClock::new()));

    let mut skipped = 0;
    let mut workers = Vec::new();

    for frame in 0..20 {
        match feed.try_begin() {
            Some(guard) => {
                let feed = feed.clone();
                workers.push(thread::spawn(move || {
                    thread::sleep(Duration::from_millis(20));
                    let det = RawDetection::new(
                        Some(1),
                        BBox::ltrb(frame as f32, 0.0, frame as f32 + 10.0, 10.0),
                        100,
                        100,
                        0,
                    )
                    .map(Some)
                    .map_err(|e| e.to_string());

                    feed.complete(guard, det);
                }));
            }
            None => skipped += 1,
        }

        let _ = feed.render_box();
        thread::sleep(Duration::from_millis(1));
    }

    for w in workers {
        w.join().unwrap();
    }

    assert!(!feed.is_busy());
    assert!(skipped > 0, "overlapping detector runs were not suppressed");
    assert!(feed.tracker().current_render_box(feed.clock().now()).is_some());
}
