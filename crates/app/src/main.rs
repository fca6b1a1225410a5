use rust_decimal_macros::dec;
use tracing::{info, warn};

use storefront_app::services::build_services;
use storefront_core::{CustomerId, Price};
use storefront_infra::AppConfig;
use storefront_observability::ObservabilityConfig;
use storefront_parties::Customer;
use storefront_products::ProductError;
use storefront_sales::{OrderLineRequest, OrderRequest};

const DEMO_PRODUCT: &str = "Demo Widget";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storefront_observability::init(&ObservabilityConfig::from_env()?);

    let config = AppConfig::from_env()?;
    let services = build_services(&config).await?;

    let customer = Customer::new(CustomerId::new(), "Demo Customer");
    services.register_customer(customer.clone()).await?;

    let product = match services
        .create_product(DEMO_PRODUCT, Price::new(dec!(19.99))?, 10)
        .await
    {
        Ok(product) => product,
        Err(ProductError::DuplicateProduct(_)) => services
            .find_product(DEMO_PRODUCT)
            .await?
            .ok_or_else(|| anyhow::anyhow!("{DEMO_PRODUCT} vanished after a duplicate-name error"))?,
        Err(e) => return Err(e.into()),
    };

    let request = OrderRequest::new(customer.id, vec![OrderLineRequest::new(product.id, 2)]);
    match services.place_order(&request).await {
        Ok(order) => info!(order_id = %order.id, total = %order.total(), "demo order placed"),
        Err(e) if e.is_client_error() => warn!(error = %e, "demo order rejected"),
        Err(e) => return Err(e.into()),
    }

    let greedy = OrderRequest::new(customer.id, vec![OrderLineRequest::new(product.id, 1_000)]);
    if let Err(e) = services.place_order(&greedy).await {
        info!(error = %e, client_error = e.is_client_error(), "oversized order refused");
    }

    Ok(())
}
