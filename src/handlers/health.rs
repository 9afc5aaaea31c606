use anyhow::Context;

use crate::services::client::ReservationClient;

pub async fn health(client: &ReservationClient) -> anyhow::Result<()> {
    let report = client.health().await.context("health check failed")?;

    println!("Status:           {}", report.status);
    if let Some(timestamp) = &report.timestamp {
        println!("Server time:      {timestamp}");
    }
    println!("Reservations:     {}", report.data_count);
    if let Some(next_id) = report.next_id {
        println!("Next id:          {next_id}");
    }
    if !report.supported_formats.is_empty() {
        println!("Formats:          {}", report.supported_formats.join(", "));
    }
    if !report.approved_resorts.is_empty() {
        println!("Resorts:          {}", report.approved_resorts.join(", "));
    }
    if !report.approved_payment_gateways.is_empty() {
        println!("Payment gateways: {}", report.approved_payment_gateways.join(", "));
    }

    anyhow::ensure!(report.is_healthy(), "server reports status {:?}", report.status);
    Ok(())
}
