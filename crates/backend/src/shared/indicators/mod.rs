//! Карточки показателей (KPI) для дашборда прачечной.

pub mod compute;
pub mod metadata;
pub mod registry;
