//! Property-based tests for rust_async_appender using proptest

use proptest::prelude::*;
use rust_async_appender::prelude::*;

fn level_strategy() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Trace),
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
        Just(LogLevel::Fatal),
    ]
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Test that LogLevel string conversions roundtrip correctly
    #[test]
    fn test_log_level_str_roundtrip(level in level_strategy()) {
        let parsed: LogLevel = level.as_str().parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    /// Test that parsing ignores case
    #[test]
    fn test_log_level_case_insensitive(level in level_strategy(), use_lower in any::<bool>()) {
        let text = if use_lower {
            level.as_str().to_lowercase()
        } else {
            level.as_str().to_string()
        };
        prop_assert_eq!(text.parse::<LogLevel>().unwrap(), level);
    }
}

// ============================================================================
// Queue Delivery Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Records that fit in the queue before the dispatcher starts are all
    /// delivered, in submission order, at their submitted level
    #[test]
    fn test_within_capacity_delivered_in_order(
        records in prop::collection::vec((level_strategy(), "[a-z0-9 ]{0,16}"), 1..24)
    ) {
        let memory = MemoryAppender::new("memory");
        let handle = memory.handle();
        let front = AsyncAppender::builder()
            .buffer_size(records.len())
            .overflow_policy(OverflowPolicy::Discard)
            .appender(memory)
            .build()
            .unwrap();

        for (level, message) in &records {
            front.log(*level, message);
        }
        front.activate().unwrap();
        front.close();

        let delivered: Vec<(LogLevel, String)> = handle
            .entries()
            .into_iter()
            .map(|e| (e.level, e.message))
            .collect();
        prop_assert_eq!(delivered, records);
    }

    /// Overflowing a discarding queue by K yields exactly one summary
    /// reporting K, after the C accepted records
    #[test]
    fn test_overflow_yields_single_summary(capacity in 1usize..8, extra in 0usize..20) {
        let memory = MemoryAppender::new("memory");
        let handle = memory.handle();
        let front = AsyncAppender::builder()
            .buffer_size(capacity)
            .blocking(false)
            .appender(memory)
            .build()
            .unwrap();

        for i in 0..capacity + extra {
            front.info(format!("message{}", i));
        }
        front.activate().unwrap();
        front.close();

        let messages = handle.messages();
        let expected_len = capacity + usize::from(extra > 0);
        prop_assert_eq!(messages.len(), expected_len);
        for (i, message) in messages.iter().take(capacity).enumerate() {
            prop_assert_eq!(message, &format!("message{}", i));
        }
        if extra > 0 {
            prop_assert_eq!(&messages[capacity], &format!("{} records discarded", extra));
        }
    }
}
