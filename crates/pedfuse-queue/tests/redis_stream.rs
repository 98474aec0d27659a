//! Redis stream integration tests.

use pedfuse_models::{FusionResult, PedestrianRecord, PixelBox, RawBox};
use pedfuse_queue::{ImageMessage, ImageQueue};

fn pixel_box(x1: f32, y1: f32, x2: f32, y2: f32) -> PixelBox {
    RawBox::new(x1, y1, x2, y2).clamp(1920, 1080).unwrap()
}

/// Test Redis connection and basic operations.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_redis_connection() {
    dotenvy::dotenv().ok();

    let queue = ImageQueue::from_env().expect("Failed to create queue");
    queue.init().await.expect("Failed to initialize queue");

    // Stream length (should not error)
    let len = queue.len().await.expect("Failed to get stream length");
    println!("Image stream length: {}", len);
}

/// Test image publish and consume cycle.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_image_publish_consume() {
    dotenvy::dotenv().ok();

    let queue = ImageQueue::from_env().expect("Failed to create queue");
    queue.init().await.expect("Failed to initialize queue");

    let message = ImageMessage::new(vec![0x89, 0x50, 0x4e, 0x47]).with_file_name("it_frame.png");
    let message_id = queue
        .publish_image(&message)
        .await
        .expect("Failed to publish");
    println!("Published image as message {}", message_id);

    let consumed = queue
        .consume("test-consumer", 1000, 1)
        .await
        .expect("Failed to consume");

    assert_eq!(consumed.len(), 1);
    let (msg_id, msg) = &consumed[0];
    assert_eq!(msg.data, message.data);
    assert_eq!(msg.file_name.as_deref(), Some("it_frame.png"));

    queue.ack(msg_id).await.expect("Failed to ack");
    println!("Message {} acknowledged", msg_id);
}

/// Test result publish and downstream consumption.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_result_round_trip() {
    dotenvy::dotenv().ok();

    let queue = ImageQueue::from_env().expect("Failed to create queue");
    queue
        .init_results()
        .await
        .expect("Failed to initialize result group");

    let result = FusionResult::new(
        Some("it_result.png".to_string()),
        vec![PedestrianRecord::new(pixel_box(10.0, 20.0, 110.0, 220.0), 4.5)],
    );

    let message_id = queue
        .publish_result(&result)
        .await
        .expect("Failed to publish result");
    println!("Published result as message {}", message_id);

    let payloads = queue
        .consume_results("test-watcher", 1000, 10)
        .await
        .expect("Failed to consume results");
    assert!(!payloads.is_empty());

    let (msg_id, payload) = payloads
        .iter()
        .find(|(id, _)| id == &message_id)
        .expect("Published result not delivered");

    let parsed: FusionResult = serde_json::from_str(payload).expect("Result payload not JSON");
    assert_eq!(parsed, result);

    queue.ack_result(msg_id).await.expect("Failed to ack result");
}
