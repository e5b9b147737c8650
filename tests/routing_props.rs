//! Property tests for topic routing and payload handling.

use std::sync::Arc;

use kafkahook::{Hook, HookOptions, KafkaHook, Level, LogEntry, MemoryProducer, TextFormatter};
use proptest::prelude::*;
use serde_json::Value;

fn flag_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::String),
        Just(Value::Null),
    ]
}

proptest! {
    #[test]
    fn access_topic_used_only_for_boolean_true(
        message in ".{0,40}",
        flag in proptest::option::of(flag_value()),
        secondary in proptest::option::of("[a-z_]{1,12}"),
    ) {
        let producer = Arc::new(MemoryProducer::new());
        let mut options = HookOptions::new()
            .with_formatter(TextFormatter::new().without_timestamp());
        if let Some(topic) = &secondary {
            options = options.with_access_log_topic(topic.clone());
        }
        let hook = KafkaHook::new_sync("primary", producer.clone(), options);

        let mut entry = LogEntry::new("prop", Level::Info, &message);
        if let Some(value) = &flag {
            entry = entry.with_field("access_log", value.clone());
        }
        hook.fire(&entry).expect("memory producer accepts every message");

        let flagged = matches!(flag, Some(Value::Bool(true)));
        let expected = match (&secondary, flagged) {
            (Some(topic), true) => topic.as_str(),
            _ => "primary",
        };
        let published = producer.messages();
        prop_assert_eq!(published.len(), 1);
        prop_assert_eq!(published[0].topic.as_str(), expected);
        prop_assert!(!published[0].value.is_empty());
    }

    #[test]
    fn every_level_is_accepted_by_default(index in 0usize..Level::ALL.len()) {
        let hook = KafkaHook::new_sync(
            "primary",
            Arc::new(MemoryProducer::new()),
            HookOptions::default(),
        );
        prop_assert!(hook.levels().contains(&Level::ALL[index]));
    }
}
