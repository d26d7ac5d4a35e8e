//! Unit data structures for data-driven unit definitions.

use serde::{Deserialize, Serialize};

use super::goods_data::GoodsAmount;

/// Data-driven unit definition.
///
/// # Example RON
///
/// ```ron
/// UnitData(
///     id: "expert_farmer",
///     expert_production: Some("grain"),
///     consumes: [(goods: "food", amount: 2), (goods: "bells", amount: 1)],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitData {
    /// Unique string identifier for this unit type.
    pub id: String,

    /// Goods this unit is an expert at producing.
    #[serde(default)]
    pub expert_production: Option<String>,

    /// Goods consumed every turn.
    #[serde(default)]
    pub consumes: Vec<GoodsAmount>,

    /// Goods needed to build or breed this unit.
    #[serde(default)]
    pub required_goods: Vec<GoodsAmount>,
}

impl UnitData {
    /// Every goods id this unit references.
    pub fn goods_references(&self) -> impl Iterator<Item = &str> {
        self.expert_production
            .iter()
            .map(String::as_str)
            .chain(self.consumes.iter().map(|g| g.goods.as_str()))
            .chain(self.required_goods.iter().map(|g| g.goods.as_str()))
    }

    /// Check if this unit is an expert at producing the given goods.
    #[must_use]
    pub fn is_expert_for(&self, goods_id: &str) -> bool {
        self.expert_production.as_deref() == Some(goods_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_unit() -> UnitData {
        UnitData {
            id: "expert_fisherman".to_string(),
            expert_production: Some("fish".to_string()),
            consumes: vec![GoodsAmount::new("food", 2)],
            required_goods: vec![GoodsAmount::new("food", 200)],
        }
    }

    #[test]
    fn test_is_expert_for() {
        let unit = create_test_unit();
        assert!(unit.is_expert_for("fish"));
        assert!(!unit.is_expert_for("grain"));
    }

    #[test]
    fn test_goods_references() {
        let unit = create_test_unit();
        let refs: Vec<&str> = unit.goods_references().collect();
        assert_eq!(refs, vec!["fish", "food", "food"]);
    }
}
