use prevision::{PrevisionError, parse_duration, seconds_to_duration};

#[test]
fn parses_work_days_with_configured_hours() {
    assert_eq!(parse_duration("1d", 8).unwrap(), 28800);
    assert_eq!(parse_duration("0.5d", 8).unwrap(), 14400);
    assert_eq!(parse_duration("3d", 6).unwrap(), 3 * 6 * 3600);
}

#[test]
fn parses_clock_durations() {
    assert_eq!(parse_duration("15m", 8).unwrap(), 900);
    assert_eq!(parse_duration("15h", 8).unwrap(), 54000);
    assert_eq!(parse_duration("1h", 8).unwrap(), 3600);
    assert_eq!(parse_duration("86400s", 8).unwrap(), 86400);
    assert_eq!(parse_duration("2h30m", 8).unwrap(), 9000);
    assert_eq!(parse_duration("1.5h", 8).unwrap(), 5400);
    assert_eq!(parse_duration("10h35m10s", 8).unwrap(), 38110);
}

#[test]
fn formats_seconds_as_composite_duration() {
    assert_eq!(seconds_to_duration(3600).unwrap(), "1h");
    assert_eq!(seconds_to_duration(4500).unwrap(), "1h15m");
    assert_eq!(seconds_to_duration(36000).unwrap(), "10h");
    assert_eq!(seconds_to_duration(38110).unwrap(), "10h35m10s");
    assert_eq!(seconds_to_duration(1800).unwrap(), "30m");
}

#[test]
fn non_positive_seconds_are_rejected() {
    assert!(matches!(
        seconds_to_duration(-1),
        Err(PrevisionError::NonPositiveSeconds(-1))
    ));
    assert!(seconds_to_duration(0).is_err());
}

#[test]
fn format_then_parse_keeps_elapsed_time() {
    for input in ["1d", "2h30m", "45m", "3d", "1h0m5s", "7200s"] {
        let seconds = parse_duration(input, 8).unwrap();
        let formatted = seconds_to_duration(seconds).unwrap();
        assert_eq!(parse_duration(&formatted, 8).unwrap(), seconds, "{input} -> {formatted}");
    }
}

#[test]
fn malformed_durations_are_errors() {
    for input in ["", "d", "1w", "h2", "1h 30m", "-1h"] {
        assert!(
            matches!(parse_duration(input, 8), Err(PrevisionError::InvalidDuration(_))),
            "{input:?} should be rejected"
        );
    }
}

#[test]
fn fractional_clock_units_are_exact() {
    assert_eq!(parse_duration("4.1h", 8).unwrap(), 14760);
    assert_eq!(parse_duration("2.3h", 8).unwrap(), 8280);
    assert_eq!(parse_duration("0.7h", 8).unwrap(), 2520);
    assert_eq!(parse_duration("1.15h", 8).unwrap(), 4140);
    assert_eq!(parse_duration("1.5m", 8).unwrap(), 90);
    assert_eq!(parse_duration("0.1d", 8).unwrap(), 2880);
}

#[test]
fn oversized_durations_are_errors_not_panics() {
    for input in [
        "999999999999999999d",
        "99999999999999999999h",
        "9223372036854775807h",
        "2562047788015215h59m",
    ] {
        assert!(
            matches!(parse_duration(input, 8), Err(PrevisionError::InvalidDuration(_))),
            "{input:?} should be rejected"
        );
    }
}
