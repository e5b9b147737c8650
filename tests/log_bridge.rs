//! Tests for the global `log` bridge.

mod test_utils;

use std::sync::{Arc, OnceLock};

use kafkahook::{
    HookOptions, InstallError, KafkaHook, Level, Logger, MemoryProducer, install_global_logger,
};
use serial_test::serial;
use test_utils::{CollectingHook, FailingFormatter};

struct Installed {
    logger: Arc<Logger>,
    hook: Arc<CollectingHook>,
}

fn installed() -> &'static Installed {
    static INSTALLED: OnceLock<Installed> = OnceLock::new();
    INSTALLED.get_or_init(|| {
        let logger = Arc::new(Logger::new("root"));
        let hook = Arc::new(CollectingHook::default());
        logger.add_hook(hook.clone());
        install_global_logger(Arc::clone(&logger)).expect("first install succeeds");
        Installed { logger, hook }
    })
}

#[test]
#[serial]
fn log_macros_reach_registered_hooks() {
    let installed = installed();
    installed.logger.set_level(Level::Info);
    let before = installed.hook.entries().len();

    log::debug!(target: "app::db", "filtered by logger level");
    log::warn!(target: "app::db", "pool exhausted");

    let entries = installed.hook.entries();
    let new = &entries[before..];
    assert_eq!(new.len(), 1);
    assert_eq!(new[0].logger, "app.db");
    assert_eq!(new[0].level, Level::Warn);
    assert_eq!(new[0].message, "pool exhausted");
}

#[test]
#[serial]
fn second_install_is_rejected() {
    let installed = installed();
    assert_eq!(
        install_global_logger(Arc::clone(&installed.logger)),
        Err(InstallError::AlreadyInstalled)
    );
}

#[test]
#[serial]
fn hook_warnings_do_not_feed_back_into_the_bridge() {
    let installed = installed();
    installed.logger.set_level(Level::Info);
    let producer = Arc::new(MemoryProducer::new());
    let hook = Arc::new(KafkaHook::new_sync(
        "logs",
        producer.clone(),
        HookOptions::new().with_formatter(FailingFormatter),
    ));
    installed.logger.add_hook(hook);
    let before = installed.hook.entries().len();

    log::error!(target: "app", "unrenderable");

    let entries = installed.hook.entries();
    assert_eq!(
        entries.len() - before,
        1,
        "only the original record is bridged"
    );
    let published = producer.messages();
    assert_eq!(published.len(), 1);
    assert!(published[0].value.is_empty());

    installed.logger.clear_hooks();
    installed.logger.add_hook(installed.hook.clone());
}
