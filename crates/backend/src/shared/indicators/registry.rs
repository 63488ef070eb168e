use anyhow::Result;
use contracts::shared::indicators::*;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use super::compute::sales;
use super::metadata::ids;

type ComputeFn =
    fn(&IndicatorContext) -> Pin<Box<dyn Future<Output = Result<IndicatorValue>> + Send + '_>>;

/// Central registry: maps `IndicatorId` to its async compute function.
pub struct IndicatorRegistry {
    fns: HashMap<String, ComputeFn>,
}

impl IndicatorRegistry {
    pub fn new() -> Self {
        let mut fns: HashMap<String, ComputeFn> = HashMap::new();

        fns.insert(ids::revenue().0, |ctx| Box::pin(sales::compute_revenue(ctx)));
        fns.insert(ids::services_count().0, |ctx| {
            Box::pin(sales::compute_services_count(ctx))
        });
        fns.insert(ids::avg_ticket().0, |ctx| {
            Box::pin(sales::compute_avg_ticket(ctx))
        });
        fns.insert(ids::cashback_liability().0, |ctx| {
            Box::pin(sales::compute_cashback_liability(ctx))
        });
        fns.insert(ids::active_customers().0, |ctx| {
            Box::pin(sales::compute_active_customers(ctx))
        });

        Self { fns }
    }

    pub fn contains(&self, id: &IndicatorId) -> bool {
        self.fns.contains_key(&id.0)
    }

    /// Compute a batch of indicators; a failing indicator yields a Neutral value with the error.
    pub async fn compute(
        &self,
        ids: &[IndicatorId],
        ctx: &IndicatorContext,
    ) -> Vec<IndicatorValue> {
        let mut results = Vec::with_capacity(ids.len());

        for id in ids {
            if let Some(compute_fn) = self.fns.get(&id.0) {
                match compute_fn(ctx).await {
                    Ok(val) => results.push(val),
                    Err(e) => {
                        tracing::warn!("indicator {} compute error: {e:#}", id.0);
                        results.push(IndicatorValue {
                            id: id.clone(),
                            value: None,
                            previous_value: None,
                            change_percent: None,
                            status: IndicatorStatus::Neutral,
                            subtitle: Some(format!("Erro: {e}")),
                        });
                    }
                }
            } else {
                tracing::warn!("indicator {} not found in registry", id.0);
            }
        }

        results
    }
}

impl Default for IndicatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_catalog() {
        let registry = IndicatorRegistry::new();
        for meta in super::super::metadata::build_catalog().indicators {
            assert!(registry.contains(&meta.id), "{:?}", meta.id);
        }
    }

    #[tokio::test]
    async fn test_unknown_and_invalid_context() {
        let registry = IndicatorRegistry::new();
        let ctx = IndicatorContext {
            date_from: "not-a-date".into(),
            date_to: "2024-06-30".into(),
            store: None,
        };
        let values = registry
            .compute(&[IndicatorId::new("nope"), ids::revenue()], &ctx)
            .await;
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].status, IndicatorStatus::Neutral);
        assert!(values[0].value.is_none());
        assert!(values[0].subtitle.as_deref().unwrap_or("").starts_with("Erro"));
    }
}
