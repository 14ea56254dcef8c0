use std::time::Duration;
use sync_framework::{DelayRange, EngineHandle, Probe};
use sync_problems::barber::{self, Admission, BarberConfig, BarberEvent};
use sync_problems::lifecycle::run_for;

fn assert_seats_in_range(events: &[BarberEvent], chairs: usize) {
    for event in events {
        if let BarberEvent::SeatTaken { free_seats, .. } | BarberEvent::SeatFreed { free_seats } = *event {
            assert!(free_seats <= chairs, "free seats out of range in {event:?}");
        }
    }
}

/// With the barber busy, five near-simultaneous arrivals fill the three chairs and
/// the other two balk.
#[tokio::test(start_paused = true)]
async fn test_full_waiting_room_turns_customers_away() {
    let config = BarberConfig {
        waiting_chairs: 3,
        haircut: DelayRange::fixed(60_000),
        arrivals: None,
        seed: Some(3),
    };
    let (probe, mut recorder) = Probe::recording();
    let shop = barber::start(config, probe).unwrap();

    // The first customer is called straight into the chair and keeps the barber busy.
    let first = shop.spawn_customer(0).await.unwrap();
    assert_eq!(first, Admission::Granted);
    assert_eq!(shop.shop().free_seats(), 3);

    let visits: Vec<_> = (1..=5).map(|id| shop.spawn_customer(id)).collect();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let (done, waiting): (Vec<_>, Vec<_>) = visits.into_iter().partition(|v| v.is_finished());
    assert_eq!(done.len(), 2);
    assert_eq!(waiting.len(), 3);
    assert_eq!(shop.shop().free_seats(), 0);
    assert_eq!(shop.shop().waiting_chairs(), 3);
    for visit in done {
        assert_eq!(visit.await.unwrap(), Admission::Balked);
    }

    let report = shop.shutdown(Duration::from_secs(1)).await.unwrap();
    for visit in waiting {
        assert_eq!(visit.await.unwrap(), Admission::Cancelled);
    }

    assert_eq!(report.seated, 4);
    assert_eq!(report.balked, 2);
    assert_eq!(report.haircuts, 0);

    let events = recorder.drain();
    assert_seats_in_range(&events, 3);
    assert_eq!(
        &events[..3],
        &[
            BarberEvent::SeatTaken {
                customer: 0,
                free_seats: 2
            },
            BarberEvent::SeatFreed { free_seats: 3 },
            BarberEvent::ServiceStarted,
        ]
    );
    let balked = events
        .iter()
        .filter(|e| matches!(e, BarberEvent::Balked { .. }))
        .count();
    assert_eq!(balked, 2);
}

/// A waiting customer is released when it is called, not when the haircut ends.
#[tokio::test(start_paused = true)]
async fn test_customer_is_admitted_before_haircut_finishes() {
    let config = BarberConfig {
        haircut: DelayRange::fixed(1_000),
        arrivals: None,
        ..BarberConfig::default()
    };
    let shop = barber::start(config, Probe::disabled()).unwrap();

    let opened = tokio::time::Instant::now();
    assert_eq!(shop.spawn_customer(0).await.unwrap(), Admission::Granted);
    assert!(opened.elapsed() < Duration::from_millis(1_000), "first customer is called at once");

    // The second customer waits out the first haircut, then is called.
    assert_eq!(shop.spawn_customer(1).await.unwrap(), Admission::Granted);
    assert!(opened.elapsed() >= Duration::from_millis(1_000));

    let report = shop.shutdown(Duration::from_secs(1)).await.unwrap();
    assert_eq!(report.haircuts, 1);
    assert_eq!(report.seated, 2);
}

/// The built-in generator keeps the shop busy; seat bookkeeping stays consistent.
#[tokio::test(start_paused = true)]
async fn test_generated_arrivals_keep_invariants() {
    let config = BarberConfig {
        waiting_chairs: 3,
        haircut: DelayRange::new(20, 60),
        arrivals: Some(DelayRange::new(5, 30)),
        seed: Some(11),
    };
    let (probe, mut recorder) = Probe::recording();
    let shop = barber::start(config, probe).unwrap();

    let report = run_for(shop, Duration::from_secs(5), Duration::from_secs(1))
        .await
        .unwrap();

    assert!(report.seated > 0);
    assert!(report.balked > 0, "arrivals outpace haircuts, so someone must balk");
    assert!(report.haircuts <= report.seated);

    let events = recorder.drain();
    assert_seats_in_range(&events, 3);
    let taken = events
        .iter()
        .filter(|e| matches!(e, BarberEvent::SeatTaken { .. }))
        .count() as u64;
    assert_eq!(taken, report.seated);
}

#[test]
fn test_empty_waiting_room_is_rejected() {
    let config = BarberConfig {
        waiting_chairs: 0,
        ..BarberConfig::default()
    };
    assert!(config.validate().is_err());
}
