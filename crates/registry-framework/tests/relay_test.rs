use registry_framework::capture::with_entity_data;
use registry_framework::relay;
use serde_json::json;
use std::time::Duration;

/// Concurrent creations on a multi-threaded runtime each see only their own
/// document, even while they yield and resume on different workers.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_captures_are_isolated() {
    let mut handles = Vec::new();
    for i in 0..32u64 {
        handles.push(tokio::spawn(async move {
            let root = json!({ "WaterFacility": { "geoCode": format!("geo-{i}") } });
            with_entity_data(&root, async move {
                for _ in 0..5 {
                    tokio::time::sleep(Duration::from_millis(i % 4)).await;
                    let seen = relay::payload().expect("payload bound");
                    assert_eq!(seen["geoCode"], format!("geo-{i}"));
                }
                relay::entity_type()
            })
            .await
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().as_deref(), Some("WaterFacility"));
    }
}

/// Two captures interleaved inside one task via `join!` still do not leak.
#[tokio::test]
async fn test_interleaved_captures_on_one_task() {
    let first = json!({ "WaterFacility": { "geoCode": "a" } });
    let second = json!({ "Organisation": { "name": "b" } });

    let (a, b) = tokio::join!(
        with_entity_data(&first, async {
            tokio::task::yield_now().await;
            relay::current()
        }),
        with_entity_data(&second, async {
            tokio::task::yield_now().await;
            relay::current()
        }),
    );

    assert_eq!(a.unwrap().payload, json!({ "geoCode": "a" }));
    assert_eq!(b.unwrap().entity_type, "Organisation");
    assert!(relay::current().is_none());
}

#[tokio::test]
async fn test_nothing_remains_after_sequential_operations() {
    for i in 0..3 {
        let root = json!({ "WaterFacility": { "n": i } });
        let inside = with_entity_data(&root, async { relay::payload() }).await;
        assert_eq!(inside, Some(json!({ "n": i })));
    }
    let after = relay::scope(async { relay::current() }).await;
    assert!(after.is_none());
}
