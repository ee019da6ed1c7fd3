//! Hello contract scenario tests
//!
//! Runs the greeting contract through the full stack: tables, singleton,
//! nested self-invocation, console output and rollback.

#[path = "../common/mod.rs"]
mod common;
mod contract;

use std::sync::Arc;

use common::{Harness, T0};
use contract::{Greeting, Hello, Stats};
use tessera::{CallArgs, CallContext, Contract, Error, Ledger, Name, Result, SchemaRegistry};

fn deploy(harness: &Harness) -> Hello {
    harness
        .ledger
        .deploy("hello", Arc::new(Hello::new().unwrap()))
        .unwrap();
    Hello::new().unwrap()
}

fn hi(ledger: &Ledger, user: &str) -> Result<()> {
    ledger.transact(
        user,
        "hello",
        "hi",
        0,
        CallArgs::encode(&(Name::new(user),)).unwrap(),
    )
}

fn greeting(ledger: &Ledger, hello: &Hello, user: &str) -> Option<Greeting> {
    ledger
        .view("hello", |state| hello.greetings.find(state, &Name::new(user)))
        .unwrap()
}

type Snapshot = (Vec<Greeting>, Vec<Greeting>, Option<Stats>);

/// Every store of the contract as the current frame sees it
fn snapshot(hello: &Hello, ctx: &CallContext<'_>) -> Result<Snapshot> {
    let counter = if hello.counter.exists(ctx)? {
        Some(hello.counter.get(ctx)?)
    } else {
        None
    };
    Ok((hello.greetings.records(ctx)?, hello.hello.records(ctx)?, counter))
}

/// `Hello` whose `add` checks that it leaves every store as it found it
struct AuditedAdd(Hello);

impl Contract for AuditedAdd {
    fn methods(&self) -> &[&'static str] {
        self.0.methods()
    }

    fn schema(&self) -> Result<SchemaRegistry> {
        self.0.schema()
    }

    fn invoke(&self, ctx: &mut CallContext<'_>, method: &str, args: &CallArgs) -> Result<()> {
        if method != "add" {
            return self.0.invoke(ctx, method, args);
        }
        let before = snapshot(&self.0, ctx)?;
        self.0.invoke(ctx, method, args)?;
        let after = snapshot(&self.0, ctx)?;
        ctx.require(before == after, "add changed contract state")?;
        ctx.print(format!("add at depth {} kept state", ctx.depth()));
        Ok(())
    }
}

fn stats(ledger: &Ledger, hello: &Hello) -> Stats {
    ledger
        .view("hello", |state| hello.counter.get(state))
        .unwrap()
}

// ============================================================================
// Scenario
// ============================================================================

#[test]
fn test_first_greeting() {
    let harness = Harness::new();
    let hello = deploy(&harness);

    assert_eq!(greeting(&harness.ledger, &hello, "alice"), None);
    hi(&harness.ledger, "alice").unwrap();

    assert_eq!(
        greeting(&harness.ledger, &hello, "alice"),
        Some(Greeting {
            name: Name::new("alice"),
            count: 1,
            last_seen: T0,
        })
    );
    assert_eq!(stats(&harness.ledger, &hello), Stats { users: 1, visits: 1 });
}

#[test]
fn test_second_greeting() {
    let harness = Harness::new();
    let hello = deploy(&harness);

    hi(&harness.ledger, "alice").unwrap();
    let t1 = harness.tick(60);
    hi(&harness.ledger, "alice").unwrap();

    assert_eq!(
        greeting(&harness.ledger, &hello, "alice"),
        Some(Greeting {
            name: Name::new("alice"),
            count: 2,
            last_seen: t1,
        })
    );
    assert_eq!(stats(&harness.ledger, &hello), Stats { users: 1, visits: 2 });
}

#[test]
fn test_console_transcript() {
    let harness = Harness::new();
    deploy(&harness);

    hi(&harness.ledger, "alice").unwrap();
    hi(&harness.ledger, "bob").unwrap();

    assert_eq!(
        harness.console.messages(),
        vec![
            "Hello alice, we have met 1 times. I have greeted 1 persons, 1 greetings in total.",
            "sum of 123456 and 789 is 124245",
            "Cool, I just called another contract :)",
            "Hello bob, we have met 1 times. I have greeted 2 persons, 2 greetings in total.",
            "sum of 123456 and 789 is 124245",
            "Cool, I just called another contract :)",
        ]
    );
}

#[test]
fn test_nested_add_leaves_tables_unchanged() {
    let harness = Harness::new();
    harness
        .ledger
        .deploy("hello", Arc::new(AuditedAdd(Hello::new().unwrap())))
        .unwrap();

    hi(&harness.ledger, "alice").unwrap();
    hi(&harness.ledger, "alice").unwrap();

    let audits: Vec<String> = harness
        .console
        .messages()
        .into_iter()
        .filter(|m| m.starts_with("add at depth"))
        .collect();
    assert_eq!(audits, vec!["add at depth 1 kept state", "add at depth 1 kept state"]);
}

#[test]
fn test_each_hi_runs_two_frames() {
    let harness = Harness::new();
    deploy(&harness);
    hi(&harness.ledger, "alice").unwrap();

    let metrics = harness.ledger.metrics();
    assert_eq!(metrics.total_started, 2);
    assert_eq!(metrics.total_committed, 2);
    assert_eq!(metrics.max_depth_seen, 2);
}

// ============================================================================
// Indices
// ============================================================================

#[test]
fn test_indices_follow_updates() {
    let harness = Harness::new();
    let hello = deploy(&harness);

    hi(&harness.ledger, "alice").unwrap();
    hi(&harness.ledger, "bob").unwrap();
    let t1 = harness.tick(5);
    hi(&harness.ledger, "alice").unwrap();

    harness
        .ledger
        .view("hello", |state| {
            assert_eq!(
                hello.greetings.find_by(state, "count", &1u32)?,
                vec![Name::new("bob")]
            );
            assert_eq!(
                hello.greetings.find_by(state, "count", &2u32)?,
                vec![Name::new("alice")]
            );
            assert_eq!(
                hello.greetings.find_by(state, "last_seen", &t1)?,
                vec![Name::new("alice")]
            );
            assert_eq!(
                hello
                    .greetings
                    .range_by(state, "last_seen", &T0, &t1)?,
                vec![Name::new("bob")]
            );
            assert_eq!(
                hello.greetings.scan_index(state, "count")?,
                vec![Name::new("bob"), Name::new("alice")]
            );
            assert_eq!(hello.greetings.len(state)?, 2);
            assert!(hello.hello.is_empty(state)?);
            Ok(())
        })
        .unwrap();
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_failed_greeting_changes_nothing() {
    let harness = Harness::new();
    let hello = deploy(&harness);
    hi(&harness.ledger, "alice").unwrap();
    let before = harness.ledger.store().scan_namespace(&Name::new("hello"));

    // malformed argument list aborts the outermost frame
    let err = harness
        .ledger
        .transact("bob", "hello", "hi", 0, CallArgs::encode(&(7u8,)).unwrap())
        .unwrap_err();
    assert!(matches!(err, Error::SerializationError(_)));

    assert_eq!(harness.ledger.store().scan_namespace(&Name::new("hello")), before);
    assert_eq!(stats(&harness.ledger, &hello), Stats { users: 1, visits: 1 });
}

#[test]
fn test_overflowing_add_rolls_back() {
    let harness = Harness::new();
    deploy(&harness);

    let err = harness
        .ledger
        .transact(
            "hello",
            "hello",
            "add",
            0,
            CallArgs::encode(&(i32::MAX, 1i32)).unwrap(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::Aborted(_)));
    assert!(harness.console.messages().is_empty());
}

#[test]
fn test_unknown_method() {
    let harness = Harness::new();
    deploy(&harness);

    let err = harness
        .ledger
        .transact("alice", "hello", "bye", 0, CallArgs::empty())
        .unwrap_err();
    assert!(matches!(err, Error::MethodNotFound { .. }));
}

#[test]
fn test_schema_registered_on_deploy() {
    let harness = Harness::new();
    deploy(&harness);

    let schema = harness.ledger.schema_of(&Name::new("hello")).unwrap();
    assert_eq!(schema.len(), 3);
    assert_eq!(
        schema.get("table_greetings").unwrap().index_names(),
        vec!["count", "last_seen"]
    );
    assert!(schema.get("global_counters").is_some());
}
