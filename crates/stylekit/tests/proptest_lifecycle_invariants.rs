//! Property-based invariant tests for style application and teardown.
//!
//! Random operation sequences are run against a fixed style and a handful of
//! mock targets. After every step:
//!
//! 1. Each target's listener count equals the subscriptions the style holds
//!    for it (nothing leaks, nothing is double-counted).
//! 2. No animation ever has more than one completion watcher.
//! 3. Unapplied targets have zero listeners.
//!
//! After `destroy`, every target and animation is idle.
//!
//! Registry sequences check that names stay unique and that the registry
//! agrees with a simple model.

use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::Rc;

use proptest::prelude::*;
use stylekit::{
    AnimationConfig, AnimationHooks, StyleContext, StyleDefinition, StyleError, StyleRegistry,
    props,
};
use stylekit_harness::{ManualAnimationEngine, MockTarget};

// ── Helpers ─────────────────────────────────────────────────────────────

const EVENTS: [&str; 3] = ["MouseEnter", "MouseLeave", "Click"];
const TARGETS: usize = 3;

#[derive(Debug, Clone)]
enum Op {
    Apply(usize),
    Unapply(usize),
    Fire(usize, usize),
    FinishAll,
    Interrupt(usize),
    DisconnectAll(usize),
    DisconnectAllFn(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..TARGETS).prop_map(Op::Apply),
        1 => (0..TARGETS).prop_map(Op::Unapply),
        4 => (0..TARGETS, 0..EVENTS.len()).prop_map(|(t, e)| Op::Fire(t, e)),
        1 => Just(Op::FinishAll),
        1 => (0..8usize).prop_map(Op::Interrupt),
        1 => (0..EVENTS.len()).prop_map(Op::DisconnectAll),
        1 => (0..EVENTS.len()).prop_map(Op::DisconnectAllFn),
    ]
}

fn target(name: String) -> Rc<MockTarget> {
    MockTarget::builder(name)
        .property("color", "white")
        .event("MouseEnter")
        .event("MouseLeave")
        .event("Click")
        .build()
}

fn hover_style(ctx: &StyleContext, completions: &Rc<Cell<u32>>) -> StyleDefinition {
    let style = ctx.anonymous();
    let done = Rc::clone(completions);
    style
        .connect(
            "MouseEnter",
            AnimationConfig::new(0.2),
            props! { "color" => "blue" },
            AnimationHooks::new().on_complete(move |_| done.set(done.get() + 1)),
        )
        .unwrap()
        .connect(
            "MouseLeave",
            AnimationConfig::new(0.2),
            props! { "color" => "white" },
            AnimationHooks::new().on_complete(|_| {}),
        )
        .unwrap()
        .connect_fn("Click", |_| {})
        .unwrap()
        .connect_fn("MouseEnter", |_| {})
        .unwrap();
    style
}

fn check_invariants(
    style: &StyleDefinition,
    engine: &ManualAnimationEngine,
    targets: &[Rc<MockTarget>],
) -> Result<(), TestCaseError> {
    for t in targets {
        prop_assert_eq!(
            t.total_listeners(),
            style.subscription_count(t.as_ref()),
            "listener mismatch on {}",
            t.name()
        );
        if !style.is_applied(t.as_ref()) {
            prop_assert_eq!(t.total_listeners(), 0);
        }
    }
    for anim in engine.animations() {
        prop_assert!(anim.watcher_count() <= 1, "stacked watchers: {:?}", anim);
    }
    Ok(())
}

// ═════════════════════════════════════════════════════════════════════════
// 1-3. Subscription bookkeeping matches reality after every step
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn random_sequences_never_leak(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let engine = Rc::new(ManualAnimationEngine::new());
        let ctx = StyleContext::with_registry(engine.clone(), StyleRegistry::new());
        let completions = Rc::new(Cell::new(0));
        let style = hover_style(&ctx, &completions);
        let targets: Vec<_> = (0..TARGETS).map(|i| target(format!("t{i}"))).collect();

        for op in ops {
            match op {
                Op::Apply(i) => {
                    style.apply(&targets[i].as_target()).unwrap();
                }
                Op::Unapply(i) => {
                    style.unapply(targets[i].as_ref());
                }
                Op::Fire(i, e) => targets[i].fire(EVENTS[e]),
                Op::FinishAll => {
                    engine.finish_all().unwrap();
                }
                Op::Interrupt(n) => {
                    let anims = engine.animations();
                    if !anims.is_empty() {
                        anims[n % anims.len()].interrupt();
                    }
                }
                Op::DisconnectAll(e) => {
                    style.disconnect_all(EVENTS[e]);
                }
                Op::DisconnectAllFn(e) => {
                    style.disconnect_all_fn(EVENTS[e]);
                }
            }
            check_invariants(&style, &engine, &targets)?;
        }

        style.destroy();
        for t in &targets {
            prop_assert_eq!(t.total_listeners(), 0);
        }
        for anim in engine.animations() {
            prop_assert_eq!(anim.watcher_count(), 0);
        }

        let before = completions.get();
        engine.finish_all().unwrap();
        prop_assert_eq!(completions.get(), before, "no completion after destroy");
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Repeated apply never stacks listeners
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn repeated_apply_is_idempotent_for_listeners(times in 1usize..10) {
        let engine = Rc::new(ManualAnimationEngine::new());
        let ctx = StyleContext::with_registry(engine.clone(), StyleRegistry::new());
        let style = hover_style(&ctx, &Rc::new(Cell::new(0)));
        let t = target("repeat".into());

        for _ in 0..times {
            style.apply(&t.as_target()).unwrap();
        }
        prop_assert_eq!(t.listener_count("MouseEnter"), 2);
        prop_assert_eq!(t.listener_count("MouseLeave"), 1);
        prop_assert_eq!(t.listener_count("Click"), 1);
        prop_assert_eq!(engine.created_count(), 2 * times);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Completion fires at most once per run
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn completion_fires_once_per_finished_run(fires in 1usize..8, runs in 1usize..4) {
        let engine = Rc::new(ManualAnimationEngine::new());
        let ctx = StyleContext::with_registry(engine.clone(), StyleRegistry::new());
        let completions = Rc::new(Cell::new(0));
        let style = hover_style(&ctx, &completions);
        let t = target("runs".into());
        style.apply(&t.as_target()).unwrap();

        for _ in 0..runs {
            for _ in 0..fires {
                t.fire("MouseEnter");
            }
            engine.finish_all().unwrap();
        }
        prop_assert_eq!(completions.get() as usize, runs);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Registry names stay unique
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn registry_agrees_with_model(names in proptest::collection::vec(0..5usize, 1..20)) {
        let engine = Rc::new(ManualAnimationEngine::new());
        let ctx = StyleContext::with_registry(engine, StyleRegistry::new());
        let mut model = BTreeSet::new();
        let mut live = Vec::new();

        for n in names {
            let name = format!("Style{n}");
            match ctx.define(&name) {
                Ok(def) => {
                    prop_assert!(model.insert(name.clone()), "accepted duplicate {}", name);
                    live.push(def);
                }
                Err(StyleError::DuplicateName { name: taken }) => {
                    prop_assert_eq!(&taken, &name);
                    prop_assert!(model.contains(&name));
                }
                Err(other) => prop_assert!(false, "unexpected error {:?}", other),
            }
        }

        let expected: Vec<String> = model.iter().cloned().collect();
        prop_assert_eq!(ctx.registry().names(), expected);
        for def in &live {
            let name = def.name().unwrap();
            prop_assert!(ctx.get(&name).unwrap().ptr_eq(def));
        }

        for def in live {
            def.destroy();
        }
        prop_assert!(ctx.registry().is_empty());
    }
}
