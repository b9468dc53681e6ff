use order_store::{LineItem, NewOrder};
use std::time::Duration;
use tracing::{error, info, warn, Instrument};
use webstore_checkout::delivery::{render_command, CommandContext};
use webstore_checkout::lifecycle::{setup_tracing, CheckoutSystem};
use webstore_checkout::CheckoutConfig;

/// How long the simulated payment webhook takes to mark the order paid.
const WEBHOOK_DELAY: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = CheckoutConfig::from_env().map_err(|e| e.to_string())?;
    info!("Starting checkout confirmation demo");

    let system = CheckoutSystem::new(config)?;

    // Buyer places an order and is sent off to the payment provider
    let order_id = system
        .store_client
        .place(NewOrder {
            items: vec![LineItem::new("VIP", 1, 2599)],
            customer_email: Some("notch@example.com".to_string()),
        })
        .await
        .map_err(|e| e.to_string())?;
    info!(order_id = %order_id, "Order placed");

    // Payment provider calls the webhook a little later
    let webhook_client = system.store_client.clone();
    let webhook = tokio::spawn(
        async move {
            tokio::time::sleep(WEBHOOK_DELAY).await;
            let receipt = format!("https://pay.example.com/receipts/{order_id}");
            match webhook_client.complete(order_id, Some(receipt)).await {
                Ok(_) => info!("Payment captured"),
                Err(e) => error!(error = %e, "Webhook failed"),
            }
        }
        .instrument(tracing::info_span!("webhook", %order_id)),
    );

    // Buyer lands on the confirmation page
    let redirect = format!("?orderId={order_id}&session=cs_demo");
    let handle = system.confirm(&redirect).map_err(|e| e.to_string())?;
    let report = handle.join().await.map_err(|e| e.to_string())?;

    info!(
        phase = %report.final_phase(),
        queries = report.queries,
        rounds = report.rounds,
        "Polling finished"
    );

    match &report.result {
        Ok(order) => {
            info!(status = %order.status, total = order.total, "Order confirmed");
            if let Some(service) = system.delivery() {
                let ctx = CommandContext {
                    username: "Notch".to_string(),
                    quantity: 1,
                    order_id: order.id.to_string(),
                    product: "VIP".to_string(),
                };
                let commands = vec![render_command("lp user {username} parent add {product}", &ctx)];
                if let Err(e) = service.send_commands(&commands).await {
                    warn!(error = %e, "Command delivery failed");
                }
            }
        }
        Err(e) => warn!(error = %e, "{}", e.user_message()),
    }

    let _ = webhook.await;
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
