use super::*;

#[test]
fn fake_clock_only_advances_when_told() {
    let clock = FakeClock::new();
    let t0 = clock.now();
    assert_eq!(clock.now(), t0);
    clock.advance(Duration::from_secs(5));
    assert_eq!(clock.now(), t0 + Duration::from_secs(5));
}

#[test]
fn fake_clock_advances_wall_time_alongside_monotonic() {
    let clock = FakeClock::new();
    let utc0 = clock.now_utc();
    clock.advance(Duration::from_secs(30));
    assert_eq!(clock.now_utc(), utc0 + Duration::from_secs(30));
}

#[test]
fn system_clock_moves_forward() {
    let clock = SystemClock;
    let t0 = clock.now();
    std::thread::sleep(Duration::from_millis(1));
    assert!(clock.now() >= t0);
}
