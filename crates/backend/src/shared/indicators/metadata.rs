use contracts::shared::indicators::*;

/// Well-known indicator IDs (constants to avoid typos).
pub mod ids {
    use super::*;

    pub fn revenue() -> IndicatorId {
        IndicatorId::new("revenue")
    }
    pub fn services_count() -> IndicatorId {
        IndicatorId::new("services_count")
    }
    pub fn avg_ticket() -> IndicatorId {
        IndicatorId::new("avg_ticket")
    }
    pub fn cashback_liability() -> IndicatorId {
        IndicatorId::new("cashback_liability")
    }
    pub fn active_customers() -> IndicatorId {
        IndicatorId::new("active_customers")
    }
}

fn brl() -> ValueFormat {
    ValueFormat::Money {
        currency: "R$".into(),
    }
}

/// Build the full catalogue of indicators + sets.
pub fn build_catalog() -> IndicatorCatalogResponse {
    let indicators = vec![
        IndicatorMeta {
            id: ids::revenue(),
            label: "Receita".into(),
            format: brl(),
            description: "Soma do valor líquido das vendas (cashback não é deduzido)".into(),
        },
        IndicatorMeta {
            id: ids::services_count(),
            label: "Serviços".into(),
            format: ValueFormat::Integer,
            description: "Ciclos de lavagem e secagem no período".into(),
        },
        IndicatorMeta {
            id: ids::avg_ticket(),
            label: "Ticket médio".into(),
            format: brl(),
            description: "Receita / número de transações".into(),
        },
        IndicatorMeta {
            id: ids::cashback_liability(),
            label: "Cashback a pagar".into(),
            format: brl(),
            description: "Cashback gerado no período (passivo)".into(),
        },
        IndicatorMeta {
            id: ids::active_customers(),
            label: "Clientes ativos".into(),
            format: ValueFormat::Integer,
            description: "Clientes distintos (CPF) com compra no período".into(),
        },
    ];

    let sets = vec![IndicatorSet {
        id: "laundry_overview".into(),
        label: "Visão geral da lavanderia".into(),
        indicators: vec![
            ids::revenue(),
            ids::services_count(),
            ids::avg_ticket(),
            ids::cashback_liability(),
            ids::active_customers(),
        ],
    }];

    IndicatorCatalogResponse { indicators, sets }
}
