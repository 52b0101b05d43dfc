//! Gross-to-net dividend math. Pure and deterministic; the foreign
//! withholding is credited against the home-country liability, and any
//! remainder is owed as a domestic top-up. A foreign rate at or above the
//! domestic rate means no top-up is due, never a refund.

use crate::types::TaxBreakdown;

fn round6(x: f64) -> f64 {
    (x * 1e6).round() / 1e6
}

/// Split a gross dividend amount into withholding, top-up and net.
///
/// `gross_total` is already in the home currency. Rates are fractions in
/// [0, 1]. All output fields are rounded to 6 decimals; display formatting
/// happens elsewhere at 2 decimals.
pub fn compute_net(gross_total: f64, foreign_rate: f64, domestic_rate: f64) -> TaxBreakdown {
    let foreign_withholding = gross_total * foreign_rate;
    let domestic_theoretical = gross_total * domestic_rate;
    let domestic_tax = (domestic_theoretical - foreign_withholding).max(0.0);
    let net = gross_total - foreign_withholding - domestic_tax;
    TaxBreakdown {
        gross: round6(gross_total),
        foreign_withholding: round6(foreign_withholding),
        domestic_tax: round6(domestic_tax),
        net: round6(net),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakdown_invariants_hold() {
        for &gross in &[0.0, 0.01, 12.34, 55.0, 10_000.0] {
            for &foreign in &[0.0, 0.128, 0.15, 0.19, 0.30, 1.0] {
                let b = compute_net(gross, foreign, 0.19);
                assert!(b.domestic_tax >= 0.0);
                assert!(b.net <= b.gross);
                let recomputed = b.gross - b.foreign_withholding - b.domestic_tax;
                assert!((b.net - recomputed).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn foreign_rate_at_or_above_domestic_means_no_topup() {
        assert_eq!(compute_net(100.0, 0.19, 0.19).domestic_tax, 0.0);
        assert_eq!(compute_net(100.0, 0.30, 0.19).domestic_tax, 0.0);
    }

    #[test]
    fn low_foreign_rate_tops_up_to_the_domestic_rate() {
        // GB withholds nothing, so the full 19% is owed at home.
        let b = compute_net(100.0, 0.0, 0.19);
        assert_eq!(b.foreign_withholding, 0.0);
        assert_eq!(b.domestic_tax, 19.0);
        assert_eq!(b.net, 81.0);
    }

    #[test]
    fn us_holding_scenario() {
        // 100 shares x 0.50 USD x 1.10 FX = 55.00 EUR gross.
        let b = compute_net(55.0, 0.30, 0.19);
        assert_eq!(b.gross, 55.0);
        assert_eq!(b.foreign_withholding, 16.5);
        assert_eq!(b.domestic_tax, 0.0);
        assert_eq!(b.net, 38.5);
    }

    #[test]
    fn fields_round_to_six_decimals() {
        let b = compute_net(1.0 / 3.0, 0.128, 0.19);
        for v in [b.gross, b.foreign_withholding, b.domestic_tax, b.net] {
            assert_eq!(v, (v * 1e6).round() / 1e6);
        }
    }
}
