use std::io::IsTerminal;

use anyhow::Context;

use crate::models::{Field, Format, RecordId};
use crate::services::client::{DeleteOutcome, ReservationClient, SubmitOutcome};
use crate::services::render::render_table;

/// Form fields as command-line flags. Unset flags leave the field alone.
#[derive(Debug, Default, Clone, clap::Args)]
pub struct ReservationArgs {
    #[arg(long)]
    pub guest_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub street_address: Option<String>,
    #[arg(long)]
    pub municipality: Option<String>,
    #[arg(long)]
    pub region: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
    #[arg(long = "resort")]
    pub resort_name: Option<String>,
    /// YYYY-MM-DD
    #[arg(long = "checkin")]
    pub checkin_date: Option<String>,
    /// YYYY-MM-DD
    #[arg(long = "checkout")]
    pub checkout_date: Option<String>,
    #[arg(long)]
    pub guests: Option<String>,
    #[arg(long)]
    pub payment_gateway: Option<String>,
}

impl ReservationArgs {
    pub fn values(&self) -> Vec<(Field, &str)> {
        let all = [
            (Field::GuestName, &self.guest_name),
            (Field::Email, &self.email),
            (Field::Phone, &self.phone),
            (Field::StreetAddress, &self.street_address),
            (Field::Municipality, &self.municipality),
            (Field::Region, &self.region),
            (Field::Country, &self.country),
            (Field::ResortName, &self.resort_name),
            (Field::CheckinDate, &self.checkin_date),
            (Field::CheckoutDate, &self.checkout_date),
            (Field::Guests, &self.guests),
            (Field::PaymentGateway, &self.payment_gateway),
        ];
        all.into_iter()
            .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
            .collect()
    }

    pub fn apply(&self, client: &ReservationClient) {
        for (field, value) in self.values() {
            client.set_field(field, value);
        }
    }
}

fn report(outcome: &SubmitOutcome) {
    for warning in &outcome.warnings {
        eprintln!("warning: {warning}");
    }
    println!("{}", outcome.message());
}

pub async fn list(client: &ReservationClient, query: Option<&str>, format: Format) -> anyhow::Result<()> {
    client
        .load_reservations(query, format)
        .await
        .context("failed to load reservations")?;
    print!("{}", render_table(&client.view().rows));
    Ok(())
}

pub async fn view(client: &ReservationClient, id: &RecordId, format: Format) -> anyhow::Result<()> {
    let detail = client
        .view_reservation(id, format)
        .await
        .with_context(|| format!("failed to load reservation #{id}"))?
        .value;

    if std::io::stdout().is_terminal() {
        print!("{}", detail.body.ansi());
    } else {
        print!("{}", detail.body.plain());
    }
    if !matches!(detail.body.plain().chars().last(), Some('\n')) {
        println!();
    }
    Ok(())
}

pub async fn create(client: &ReservationClient, args: &ReservationArgs, format: Format) -> anyhow::Result<()> {
    args.apply(client);
    let outcome = client.submit(format).await?;
    report(&outcome);
    Ok(())
}

pub async fn edit(
    client: &ReservationClient,
    id: &RecordId,
    args: &ReservationArgs,
    format: Format,
) -> anyhow::Result<()> {
    client
        .begin_edit(id)
        .await
        .with_context(|| format!("failed to load reservation #{id} for editing"))?;
    args.apply(client);
    let outcome = client.submit(format).await?;
    report(&outcome);
    Ok(())
}

pub async fn delete(client: &ReservationClient, id: &RecordId) -> anyhow::Result<()> {
    match client.delete_reservation(id).await? {
        DeleteOutcome::Deleted { message } => println!("{message}"),
        DeleteOutcome::Declined => println!("Delete cancelled"),
    }
    Ok(())
}
