//! Example commands.
//!
//! | Command                 | Shape        | Runs       |
//! |-------------------------|--------------|------------|
//! | `test`                  | text or args | foreground |
//! | `testAsync`             | text or args | background |
//! | `returnJSONFromHashMap` | args         | foreground |
//! | `context`               | text         | foreground |

use a3bridge_runtime::{Bridge, Invocation};
use a3bridge_sqf::{SqfValue, decode, decode_as_map, encode};
use anyhow::Context as _;
use tracing::debug;

/// Register every example command.
///
/// # Errors
///
/// Fails if a command name is already taken.
pub fn register(bridge: &Bridge) -> anyhow::Result<()> {
    bridge
        .new_registration("test")
        .handler(receive_test)
        .args_handler(receive_test_args)
        .register()?;

    bridge
        .new_registration("testAsync")
        .default_response(r#"["testAsync called"]"#)
        .run_in_background(true)
        .handler(|inv, data| push_back(inv, receive_test(inv, data)?))
        .args_handler(|inv, args| push_back(inv, receive_test_args(inv, args)?))
        .register()?;

    bridge
        .new_registration("returnJSONFromHashMap")
        .default_response(r#"["returnJSONFromHashMap called"]"#)
        .args_handler(hash_map_to_json)
        .register()?;

    bridge
        .new_registration("context")
        .handler(|inv, _| Ok(encode(&inv.context().to_sqf())))
        .register()?;

    Ok(())
}

/// `test|a|b` replies `["Called by <id>", ["a", "b"]]`.
fn receive_test(invocation: &Invocation, data: &str) -> anyhow::Result<String> {
    let parts: Vec<SqfValue> = data.split('|').skip(1).map(SqfValue::from).collect();
    Ok(encode(&SqfValue::Array(vec![
        called_by(invocation),
        SqfValue::Array(parts),
    ])))
}

/// `["test", [a, b]]` replies `["Called by <id>", "test", [a, b, <stamp>]]`.
fn receive_test_args(invocation: &Invocation, args: &[String]) -> anyhow::Result<String> {
    Ok(encode(&SqfValue::Array(vec![
        called_by(invocation),
        SqfValue::from(invocation.command()),
        SqfValue::from(args.to_vec()),
    ])))
}

fn called_by(invocation: &Invocation) -> SqfValue {
    SqfValue::from(format!("Called by {}", invocation.context().caller_id))
}

fn push_back(invocation: &Invocation, result: String) -> anyhow::Result<String> {
    invocation.push_result(invocation.command(), &[result])?;
    Ok(String::new())
}

/// Decode an SQF hash map literal and reply with it as indented JSON.
fn hash_map_to_json(_: &Invocation, args: &[String]) -> anyhow::Result<String> {
    let literal = args.first().context("expected a hash map argument")?;
    let value = decode(literal)?;
    debug!(kind = value.kind(), "converting hash map argument");
    let map = decode_as_map(&value)?;
    let json = serde_json::Value::from(SqfValue::Map(map));
    Ok(serde_json::to_string_pretty(&json)?)
}
