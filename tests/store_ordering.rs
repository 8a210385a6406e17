//! Serial dispatch guarantees of the generic store

use std::time::Duration;

use proptest::prelude::*;
use rtc_audio_store::store::{ActionBox, Store, StoreDelay};
use rtc_audio_store::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Add(i64),
    Mul(i64),
    Set(i64),
}

fn apply(state: i64, op: &Op) -> Result<i64> {
    Ok(match *op {
        Op::Add(value) => state.wrapping_add(value),
        Op::Mul(value) => state.wrapping_mul(value),
        Op::Set(value) => value,
    })
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-100i64..100).prop_map(Op::Add),
        (-3i64..4).prop_map(Op::Mul),
        (-100i64..100).prop_map(Op::Set),
    ]
}

proptest! {
    #[test]
    fn prop_batch_matches_sequential_reduction(ops in prop::collection::vec(op_strategy(), 0..16)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let state = runtime.block_on(async {
            let store = Store::builder("ops", 0i64).reducer(apply).build();
            store.dispatch(ops.clone()).result().await.unwrap();
            store.state()
        });

        let expected = ops.iter().try_fold(0i64, |state, op| apply(state, op)).unwrap();
        prop_assert_eq!(state, expected);
    }
}

#[tokio::test]
async fn test_batches_from_many_tasks_are_serialized() {
    let store = Store::builder("ops", 0i64).reducer(apply).build();

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let dispatcher = store.dispatcher();
            tokio::spawn(async move { dispatcher.dispatch_async([Op::Add(1), Op::Mul(1)]).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(store.state(), 32);
}

#[tokio::test(start_paused = true)]
async fn test_delays_do_not_reorder_batches() {
    let store = Store::builder("ops", 1i64).reducer(apply).build();

    let slow = store.dispatch([
        ActionBox::delayed(Op::Add(1), StoreDelay::before(Duration::from_secs(1))),
        ActionBox::delayed(Op::Mul(10), StoreDelay::after(Duration::from_secs(1))),
    ]);
    let fast = store.dispatch([Op::Set(7)]);

    fast.result().await.unwrap();
    slow.result().await.unwrap();
    assert_eq!(store.state(), 7);
}

#[tokio::test]
async fn test_dispatch_after_shutdown_fails() {
    let store = Store::builder("ops", 0i64).reducer(apply).build();
    let dispatcher = store.dispatcher();
    drop(store);

    let result = dispatcher.dispatch_async([Op::Add(1)]).await;
    assert!(matches!(result, Err(Error::Store(_))));
    assert!(dispatcher.state().is_none());
}
