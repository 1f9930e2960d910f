//! Minimal embedding example for zonesync-core
//!
//! This example demonstrates using zonesync-core as a library in a
//! custom application: a memory backend, producer calls, and a
//! controller lifecycle fully managed by the application.

use std::sync::Arc;

use zonesync_core::{
    ControllerConfig, DnsController, MemoryZoneProvider, Record, RecordType, Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Embedded zonesync-core Example ===\n");

    // Create a backend hosting one zone
    let provider = Arc::new(MemoryZoneProvider::new(["example.com"]));

    // Create the controller
    println!("1. Creating controller...");
    let (controller, mut event_rx) =
        DnsController::new(provider.clone(), ControllerConfig::default())?;
    let controller = Arc::new(controller);

    // Spawn event listener (optional)
    let event_listener = tokio::spawn(async move {
        println!("2. Event listener started");
        while let Some(event) = event_rx.recv().await {
            println!("[Event] {:?}", event);
        }
        println!("Event listener stopped");
    });

    // Act as a producer: publish records, then declare the scope
    // synchronized
    println!("3. Publishing records...");
    controller.replace(
        "ingress",
        "api-backends",
        vec![
            Record::new("target.example.com", RecordType::A, "10.0.0.1").with_alias_target(true),
            Record::new("target.example.com", RecordType::A, "10.0.0.2").with_alias_target(true),
        ],
    );
    controller.replace(
        "ingress",
        "api",
        vec![Record::new(
            "api.example.com",
            RecordType::Alias,
            "target.example.com",
        )],
    );
    controller.mark_ready("ingress", true);

    // Run the reconcile loop in the background; the first iteration
    // applies immediately
    println!("4. Starting controller in background...");
    let run_handle = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.run().await }
    });

    // Give the loop a moment to converge
    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    println!("\n5. Backend state after convergence:");
    for record_set in provider.record_sets_in("example.com").await.unwrap() {
        println!(
            "   {} {} ttl={} rdata={:?}",
            record_set.name, record_set.record_type, record_set.ttl, record_set.rdata
        );
    }
    println!("   status: {:?}\n", controller.status());

    // Stop the controller
    println!("6. Stopping controller...");
    controller.stop();
    run_handle.await.expect("run task joins")?;

    // Wait for the event listener to drain
    drop(controller);
    let _ = tokio::time::timeout(tokio::time::Duration::from_millis(100), event_listener).await;

    println!("\n=== Embedding Successful ===");
    Ok(())
}
