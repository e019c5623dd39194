//! Asset value projection
//!
//! Assets grow (or shrink) by their annual rate compounded monthly. There is
//! no amortization here; depreciation is just a negative growth rate.

use crate::models::Asset;

/// Monthly growth factor minus one, e.g. 0.005 for 6% a year
pub fn monthly_rate(asset: &Asset) -> f64 {
    asset.annual_growth_rate() / 100.0 / 12.0
}

/// Value of `asset` after `months` months of compounding, never negative
pub fn value_after(asset: &Asset, months: u32) -> f64 {
    let factor = (1.0 + monthly_rate(asset)).powi(months as i32);
    (asset.current_value * factor).max(0.0)
}

/// Combined value of `assets` after `months` months
pub fn total_value_after(assets: &[Asset], months: u32) -> f64 {
    assets.iter().map(|a| value_after(a, months)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(value: f64, appreciation: Option<f64>, depreciation: Option<f64>) -> Asset {
        Asset {
            id: "a1".to_string(),
            name: "Asset".to_string(),
            current_value: value,
            purchase_price: None,
            appreciation_rate: appreciation,
            depreciation_rate: depreciation,
        }
    }

    #[test]
    fn test_no_rate_keeps_value() {
        let a = asset(5000.0, None, None);
        assert_eq!(value_after(&a, 0), 5000.0);
        assert_eq!(value_after(&a, 24), 5000.0);
    }

    #[test]
    fn test_appreciation_compounds_monthly() {
        let a = asset(10_000.0, Some(12.0), None);
        assert!((value_after(&a, 1) - 10_100.0).abs() < 1e-9);
        assert!((value_after(&a, 2) - 10_201.0).abs() < 1e-9);
        let year = value_after(&a, 12);
        assert!(year > 11_200.0 && year < 11_300.0);
    }

    #[test]
    fn test_depreciation_shrinks_value() {
        let car = asset(20_000.0, None, Some(15.0));
        assert!(value_after(&car, 12) < 20_000.0);
        assert!(value_after(&car, 12) > value_after(&car, 24));
        assert!(value_after(&car, 1200) >= 0.0);
    }

    #[test]
    fn test_total_value() {
        let assets = vec![asset(100.0, None, None), asset(250.0, None, None)];
        assert_eq!(total_value_after(&assets, 6), 350.0);
        assert_eq!(total_value_after(&[], 6), 0.0);
    }
}
