use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{CreditCards, PaymentsError, PaymentsResult};
use crate::{config::StripeConfig, db::StripeCustomerRepo};

/// Stripe caps list pages at 100.
const PAGE_SIZE: &str = "100";

#[derive(Debug, Deserialize)]
struct PaymentMethodList {
    data: Vec<PaymentMethod>,
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct PaymentMethod {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Detaches card payment methods through the Stripe REST API.
pub struct StripeCreditCards {
    client: Client,
    base_url: String,
    secret_key: String,
    customers: Arc<dyn StripeCustomerRepo>,
}

impl StripeCreditCards {
    pub fn new(
        config: &StripeConfig,
        customers: Arc<dyn StripeCustomerRepo>,
    ) -> PaymentsResult<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
            customers,
        })
    }

    async fn check(response: reqwest::Response) -> PaymentsResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);

        Err(PaymentsError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn list_cards(
        &self,
        customer_id: &str,
        starting_after: Option<&str>,
    ) -> PaymentsResult<PaymentMethodList> {
        let mut query = vec![
            ("customer", customer_id),
            ("type", "card"),
            ("limit", PAGE_SIZE),
        ];
        if let Some(cursor) = starting_after {
            query.push(("starting_after", cursor));
        }

        let response = self
            .client
            .get(format!("{}/v1/payment_methods", self.base_url))
            .bearer_auth(&self.secret_key)
            .query(&query)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn detach(&self, payment_method_id: &str) -> PaymentsResult<()> {
        let response = self
            .client
            .post(format!(
                "{}/v1/payment_methods/{}/detach",
                self.base_url, payment_method_id
            ))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl CreditCards for StripeCreditCards {
    #[instrument(skip(self))]
    async fn remove_all(&self, user_id: Uuid) -> PaymentsResult<u64> {
        let Some(customer_id) = self.customers.get_customer_id(user_id).await? else {
            debug!("User has no Stripe customer; nothing to remove");
            return Ok(0);
        };

        // Collect first: detaching while paging would shift the cursor.
        let mut card_ids = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.list_cards(&customer_id, cursor.as_deref()).await?;
            cursor = page.data.last().map(|pm| pm.id.clone());
            card_ids.extend(page.data.into_iter().map(|pm| pm.id));
            if !page.has_more || cursor.is_none() {
                break;
            }
        }

        for id in &card_ids {
            self.detach(id).await?;
        }

        debug!(customer_id, removed = card_ids.len(), "Detached payment cards");
        Ok(card_ids.len() as u64)
    }
}
