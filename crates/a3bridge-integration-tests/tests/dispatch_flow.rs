//! End-to-end dispatch: configuration file, bridge, handlers, codec, and
//! the out-of-band error channel working together.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use a3bridge_config::{BridgeConfig, CONFIG_FILE_NAME, loader};
use a3bridge_core::ErrorRecord;
use a3bridge_runtime::Bridge;
use a3bridge_sqf::{SqfValue, decode, decode_map, encode};
use a3bridge_test::{ErrorCollector, RecordingCallback, init_test_logging, test_context_args};
use tempfile::TempDir;

fn config_from(toml: &str) -> BridgeConfig {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), toml).unwrap();
    loader::load_with_env(Some(dir.path()), |_: &str| None).unwrap()
}

#[test]
fn config_file_drives_the_bridge() {
    init_test_logging();
    let cfg = config_from(
        r#"
        [extension]
        name = "configured"
        version = "4.2.0"

        [dispatch]
        reply_deadline_ms = 40
        max_background = 2
        default_reply_capacity = 16
        "#,
    );
    let bridge = Bridge::from_config(&cfg).unwrap();
    assert_eq!(bridge.extension_name(), "configured");
    assert_eq!(bridge.version_reply(1024).as_str(), "4.2.0");
    assert_eq!(bridge.settings().reply_deadline, Some(Duration::from_millis(40)));
    assert_eq!(bridge.executor().available_permits(), Some(2));

    bridge
        .new_registration("banner")
        .handler(|_, _| Ok("a".repeat(64)))
        .register()
        .unwrap();
    assert_eq!(bridge.execute("banner").reply().as_str(), "a".repeat(15));
}

#[test]
fn env_override_beats_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[dispatch]\nmax_background = 8\n",
    )
    .unwrap();
    let cfg = loader::load_with_env(Some(dir.path()), |name: &str| {
        (name == "A3BRIDGE_MAX_BACKGROUND").then(|| "3".to_owned())
    })
    .unwrap();
    assert_eq!(cfg.dispatch.max_background, Some(3));
}

#[test]
fn structured_arguments_round_trip_through_a_handler() {
    let bridge = Bridge::builder().build().unwrap();
    bridge
        .new_registration("inventory")
        .args_handler(|_, args| {
            let items = decode_map(&args[0])?;
            let mut names: Vec<&String> = items.keys().collect();
            names.sort();
            let count = items.get("count").and_then(SqfValue::as_f64).unwrap_or_default();
            Ok(encode(&SqfValue::Array(vec![
                SqfValue::from(names.into_iter().cloned().collect::<Vec<_>>()),
                SqfValue::from(count * 2.0),
            ])))
        })
        .register()
        .unwrap();

    // The host sends one quote layer around stringified arrays.
    let arg = r#""[[""count"", 3], [""owner"", ""Bravo """"2""""""]]""#;
    let dispatch = bridge.call_with_args("inventory", vec![arg.to_owned()], 1024);
    assert!(!dispatch.is_failure(), "{}", dispatch.reply().as_str());

    let reply = decode(dispatch.reply().as_str()).unwrap();
    assert_eq!(
        reply,
        SqfValue::Array(vec![
            SqfValue::from(vec!["count", "owner"]),
            SqfValue::Number(6.0),
        ])
    );
}

#[test]
fn decode_errors_surface_as_handler_failures() {
    let bridge = Bridge::builder().build().unwrap();
    let mut errors = ErrorCollector::new(bridge.error_channel());
    bridge
        .new_registration("parse")
        .args_handler(|_, args| Ok(encode(&decode(&args[0])?)))
        .register()
        .unwrap();

    let dispatch = bridge.call_with_args("parse", vec!["[1,,2]".to_owned()], 1024);
    assert!(dispatch.is_failure());

    let failures = errors.drain();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].command, "parse");
    assert_eq!(
        dispatch.reply().as_str(),
        encode(&SqfValue::from(vec![
            failures[0].command.clone(),
            failures[0].message.clone()
        ]))
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn background_failures_only_reach_the_channel() {
    let bridge = Bridge::builder()
        .runtime_handle(tokio::runtime::Handle::current())
        .build()
        .unwrap();
    let mut errors = ErrorCollector::new(bridge.error_channel());
    bridge
        .new_registration("flaky")
        .default_response(r#"["accepted"]"#)
        .run_in_background(true)
        .handler(|_, _| Err(anyhow::anyhow!("storage offline")))
        .register()
        .unwrap();

    let dispatch = bridge.call("flaky", 1024);
    assert!(!dispatch.is_failure());
    assert_eq!(dispatch.reply().as_str(), r#"["accepted"]"#);
    drop(dispatch);

    let record = errors.next(Duration::from_secs(5)).await.unwrap();
    assert_eq!(record, ErrorRecord::new("flaky", "storage offline"));
}

#[test]
fn bounded_pool_queues_background_work() {
    let bridge = Bridge::builder().max_background(1).build().unwrap();
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    {
        let running = Arc::clone(&running);
        let peak = Arc::clone(&peak);
        bridge
            .new_registration("heavy")
            .run_in_background(true)
            .handler(move |_, _| {
                let now = running.fetch_add(1, Ordering::SeqCst).saturating_add(1);
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(15));
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(String::new())
            })
            .register()
            .unwrap();
    }

    let tasks: Vec<_> = (0..3)
        .map(|_| bridge.call("heavy", 64).release().unwrap())
        .collect();
    for task in tasks {
        task.wait().unwrap();
    }
    assert_eq!(peak.load(Ordering::SeqCst), 1);
}

#[test]
fn deadline_reply_then_late_result_is_dropped() {
    let cfg = config_from("[dispatch]\nreply_deadline_ms = 25\n");
    let bridge = Bridge::from_config(&cfg).unwrap();
    let mut errors = ErrorCollector::new(bridge.error_channel());
    let finished = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&finished);
    bridge
        .new_registration("stuck")
        .handler(move |inv, _| {
            while !inv.is_cancelled() {
                std::thread::sleep(Duration::from_millis(2));
            }
            seen.fetch_add(1, Ordering::SeqCst);
            Ok("finished anyway".to_owned())
        })
        .register()
        .unwrap();

    let dispatch = bridge.call("stuck", 1024);
    assert_eq!(
        dispatch.reply().as_str(),
        r#"["stuck", "deadline elapsed after 25ms"]"#
    );
    assert!(common::eventually(Duration::from_secs(5), || {
        finished.load(Ordering::SeqCst) == 1
    }));
    // Only the deadline itself was reported; the late success is discarded.
    assert_eq!(
        errors.drain(),
        vec![ErrorRecord::new("stuck", "deadline elapsed after 25ms")]
    );
}

#[test]
fn context_and_callback_flow() {
    let bridge = Bridge::builder().extension_name("flow").build().unwrap();
    let callback = RecordingCallback::new();
    bridge.register_callback(callback.clone());
    bridge.set_context_args(&test_context_args());
    bridge
        .new_registration("report")
        .run_in_background(true)
        .handler(|inv, _| {
            let ctx = inv.context();
            inv.push_result("reported", &[ctx.caller_id.as_str(), ctx.server_name.as_str()])?;
            Ok(String::new())
        })
        .register()
        .unwrap();

    bridge.call("report", 64).release().unwrap().wait().unwrap();
    let pushes = callback.wait_for(1, Duration::from_secs(1));
    assert_eq!(pushes[0].name, "flow");
    assert_eq!(pushes[0].function, "reported");
    assert_eq!(pushes[0].data, r#"["76561198000000000","Test Server"]"#);
}
