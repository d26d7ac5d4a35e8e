//! Serializable production summaries.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::colony::Colony;
use crate::goods::AbstractGoods;
use crate::specification::Specification;

/// What one producer or consumer did, by goods name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerReport {
    /// Producer name.
    pub producer: String,
    /// Goods produced.
    pub production: BTreeMap<String, i32>,
    /// Goods consumed.
    pub consumption: BTreeMap<String, i32>,
}

/// Summary of a colony's production this turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionReport {
    /// Colony name.
    pub colony: String,
    /// Units living in the colony.
    pub units: usize,
    /// Warehouse capacity.
    pub warehouse_capacity: i32,
    /// Net production per goods name.
    pub net_production: BTreeMap<String, i32>,
    /// Stored goods per goods name.
    pub storage: BTreeMap<String, i32>,
    /// Every producer and consumer that did something.
    pub producers: Vec<ProducerReport>,
}

impl ProductionReport {
    /// Summarise a colony's current production.
    #[must_use]
    pub fn from_colony(colony: &Colony) -> Self {
        let spec = colony.specification();
        let snapshot = colony.production();

        let producers = snapshot
            .production_and_consumption
            .iter()
            .filter(|(_, info)| !info.is_empty())
            .map(|(&id, info)| ProducerReport {
                producer: colony.producer_name(id),
                production: by_name(spec, &info.production),
                consumption: by_name(spec, &info.consumption),
            })
            .collect();

        Self {
            colony: colony.name().to_string(),
            units: colony.unit_count(),
            warehouse_capacity: colony.warehouse_capacity(),
            net_production: snapshot
                .net_production
                .iter()
                .map(|(g, amount)| (spec.goods_name(g).to_string(), amount))
                .collect(),
            storage: colony
                .storage()
                .iter()
                .map(|(g, amount)| (spec.goods_name(g).to_string(), amount))
                .collect(),
            producers,
        }
    }
}

fn by_name(spec: &Specification, goods: &[AbstractGoods]) -> BTreeMap<String, i32> {
    let mut amounts = BTreeMap::new();
    for g in goods.iter().filter(|g| g.amount != 0) {
        *amounts
            .entry(spec.goods_name(g.goods_type).to_string())
            .or_insert(0) += g.amount;
    }
    amounts
}

fn write_amounts(f: &mut fmt::Formatter<'_>, amounts: &BTreeMap<String, i32>) -> fmt::Result {
    if amounts.is_empty() {
        return writeln!(f, "  (none)");
    }
    for (goods, amount) in amounts {
        writeln!(f, "  {goods:<12} {amount:>+6}")?;
    }
    Ok(())
}

impl fmt::Display for ProductionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Colony {} ({} units, warehouse {})",
            self.colony, self.units, self.warehouse_capacity
        )?;
        writeln!(f, "Net production:")?;
        write_amounts(f, &self.net_production)?;
        writeln!(f, "Storage:")?;
        write_amounts(f, &self.storage)?;
        writeln!(f, "Producers:")?;
        for producer in &self.producers {
            let lines: Vec<String> = producer
                .production
                .iter()
                .map(|(g, a)| format!("+{a} {g}"))
                .chain(producer.consumption.iter().map(|(g, a)| format!("-{a} {g}")))
                .collect();
            writeln!(f, "  {}: {}", producer.producer, lines.join(", "))?;
        }
        Ok(())
    }
}
