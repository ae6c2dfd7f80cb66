//! Demo dataset for local runs (`SEED_DEMO_DATA=true`)

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tracing::info;

use crate::domain::aggregates::{
    Address, Client, ClientInput, Editable, Exporter, ExporterInput, Payment, PaymentInput, Product, ProductInput,
    ProductStatus, Quote, QuoteInput,
};
use crate::domain::value_objects::Incoterm;
use crate::repository::Repositories;
use crate::Result;

pub async fn load_demo_data(repos: &Repositories) -> Result<()> {
    let exporter = repos.exporters.create(Exporter::from_input(ExporterInput {
        legal_name: "Cerrado Export Ltda".into(),
        tax_id: "12.345.678/0001-90".into(),
        country: "BR".into(),
        address: Some(Address { street1: "Av. Brasil 1500".into(), city: "Santos".into(), state: Some("SP".into()), zip: "11060-000".into(), country: "BR".into(), ..Default::default() }),
        contact_email: Some("export@cerrado.test".into()),
    })?).await?;

    let client = repos.clients.create(Client::from_input(ClientInput {
        name: "Hans Weber".into(),
        company: Some("Hamburg Kaffee GmbH".into()),
        email: "einkauf@hamburg-kaffee.test".into(),
        country: "DE".into(),
        ..Default::default()
    })?).await?;

    let catalog = [
        ("CF-ARA-12", "Arabica green coffee, 12.5 kg bag", "0901.11.10", Decimal::new(125, 1), Decimal::new(45, 0)),
        ("CF-ROB-12", "Robusta green coffee, 12 kg bag", "0901.11.90", Decimal::new(12, 0), Decimal::new(38, 0)),
        ("SG-VHP-02", "VHP cane sugar, 2 kg pack", "1701.14.00", Decimal::new(2, 0), Decimal::new(12, 0)),
    ];
    let mut products = Vec::with_capacity(catalog.len());
    for (sku, name, ncm, weight, price) in catalog {
        let product = Product::from_input(ProductInput {
            sku: sku.into(), name: name.into(), description: String::new(), tariff_code: ncm.into(),
            unit_weight: weight, unit_price: price, exporter_id: Some(exporter.id), status: Some(ProductStatus::Active),
        })?;
        products.push(repos.products.create(product).await?);
    }

    let quantities = [Decimal::new(200, 0), Decimal::new(150, 0), Decimal::new(350, 0)];
    let items = products.iter().zip(quantities).map(|(p, qty)| p.to_line_item(qty)).collect();
    repos.quotes.create(Quote::from_input(QuoteInput {
        client_id: client.id,
        exporter_id: Some(exporter.id),
        incoterm: Incoterm::Cif,
        items,
        freight_amount: None,
        valid_until: Some((Utc::now() + Duration::days(30)).date_naive()),
        notes: Some("Shipment via Santos, 1 x 20' container".into()),
    })?).await?;

    repos.payments.create(Payment::from_input(PaymentInput {
        client_id: client.id,
        order_id: None,
        description: "30% advance".into(),
        amount: Decimal::new(567000, 2),
        due_date: (Utc::now() + Duration::days(7)).date_naive(),
        method: Some("wire transfer".into()),
        cancelled: None,
    })?).await?;

    info!(client = %client.id, exporter = %exporter.id, products = products.len(), "demo data loaded");
    Ok(())
}
