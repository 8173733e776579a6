//! Monthly payment estimate for a listing price.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Down payment below this share of the price carries PMI
const PMI_THRESHOLD_PERCENT: f64 = 20.0;

/// Longest loan term accepted, in years
pub const MAX_LOAN_TERM_YEARS: u32 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageInputs {
    pub home_price: f64,
    pub down_payment_percent: f64,
    /// Years
    pub loan_term: u32,
    /// Annual, in percent
    pub interest_rate: f64,
    /// Annual, in percent of the home price
    pub property_tax_rate: f64,
    /// Yearly premium
    pub home_insurance: f64,
    /// Annual, in percent of the loan
    pub pmi_rate: f64,
}

impl Default for MortgageInputs {
    fn default() -> Self {
        Self {
            home_price: 500_000.0,
            down_payment_percent: 20.0,
            loan_term: 30,
            interest_rate: 6.5,
            property_tax_rate: 1.2,
            home_insurance: 1_200.0,
            pmi_rate: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MortgageError {
    #[error("homePrice must be greater than zero")]
    HomePrice,
    #[error("downPaymentPercent must be between 0 and 100")]
    DownPayment,
    #[error("loanTerm must be between 1 and 50 years")]
    LoanTerm,
    #[error("{0} must not be negative")]
    Negative(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageBreakdown {
    pub loan_amount: f64,
    pub down_payment: f64,
    pub monthly_principal_interest: f64,
    pub monthly_tax: f64,
    pub monthly_insurance: f64,
    pub monthly_pmi: f64,
    pub total_monthly: f64,
    pub total_interest: f64,
    pub total_paid: f64,
}

impl MortgageInputs {
    /// Read inputs from query parameters; missing or unparseable values keep
    /// their defaults.
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let mut inputs = Self::default();
        let num = |key: &str| -> Option<f64> {
            params
                .get(key)
                .and_then(|v| v.trim().replace(',', "").parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };

        if let Some(v) = num("homePrice") {
            inputs.home_price = v;
        }
        if let Some(v) = num("downPaymentPercent") {
            inputs.down_payment_percent = v;
        }
        if let Some(v) = num("loanTerm").filter(|v| *v >= 0.0) {
            inputs.loan_term = v.round() as u32;
        }
        if let Some(v) = num("interestRate") {
            inputs.interest_rate = v;
        }
        if let Some(v) = num("propertyTaxRate") {
            inputs.property_tax_rate = v;
        }
        if let Some(v) = num("homeInsurance") {
            inputs.home_insurance = v;
        }
        if let Some(v) = num("pmiRate") {
            inputs.pmi_rate = v;
        }
        inputs
    }

    pub fn calculate(&self) -> Result<MortgageBreakdown, MortgageError> {
        if !(self.home_price > 0.0) {
            return Err(MortgageError::HomePrice);
        }
        if !(0.0..=100.0).contains(&self.down_payment_percent) {
            return Err(MortgageError::DownPayment);
        }
        if !(1..=MAX_LOAN_TERM_YEARS).contains(&self.loan_term) {
            return Err(MortgageError::LoanTerm);
        }
        for (name, value) in [
            ("interestRate", self.interest_rate),
            ("propertyTaxRate", self.property_tax_rate),
            ("homeInsurance", self.home_insurance),
            ("pmiRate", self.pmi_rate),
        ] {
            if value < 0.0 {
                return Err(MortgageError::Negative(name));
            }
        }

        let down_payment = self.home_price * self.down_payment_percent / 100.0;
        let principal = self.home_price - down_payment;
        let monthly_rate = self.interest_rate / 100.0 / 12.0;
        let payments = f64::from(self.loan_term) * 12.0;

        let monthly_pi = if monthly_rate > 0.0 {
            let growth = (1.0 + monthly_rate).powf(payments);
            principal * (monthly_rate * growth) / (growth - 1.0)
        } else {
            principal / payments
        };

        let monthly_tax = self.home_price * (self.property_tax_rate / 100.0) / 12.0;
        let monthly_insurance = self.home_insurance / 12.0;
        let monthly_pmi = if self.down_payment_percent < PMI_THRESHOLD_PERCENT {
            principal * (self.pmi_rate / 100.0) / 12.0
        } else {
            0.0
        };

        let total_paid = monthly_pi * payments;
        Ok(MortgageBreakdown {
            loan_amount: principal,
            down_payment,
            monthly_principal_interest: monthly_pi,
            monthly_tax,
            monthly_insurance,
            monthly_pmi,
            total_monthly: monthly_pi + monthly_tax + monthly_insurance + monthly_pmi,
            total_interest: total_paid - principal,
            total_paid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn default_loan_matches_standard_amortization() {
        let result = MortgageInputs::default().calculate().unwrap();
        assert!(close(result.loan_amount, 400_000.0));
        assert!(close(result.down_payment, 100_000.0));
        // 400k at 6.5% over 30 years
        assert!(close(result.monthly_principal_interest, 2_528.27));
        assert!(close(result.monthly_tax, 500.0));
        assert!(close(result.monthly_insurance, 100.0));
        assert_eq!(result.monthly_pmi, 0.0);
        assert!(close(result.total_paid, result.monthly_principal_interest * 360.0));
    }

    #[test]
    fn pmi_applies_below_twenty_percent_down() {
        let inputs = MortgageInputs {
            down_payment_percent: 10.0,
            ..MortgageInputs::default()
        };
        let result = inputs.calculate().unwrap();
        // 450k * 0.5% / 12
        assert!(close(result.monthly_pmi, 187.5));
    }

    #[test]
    fn zero_interest_splits_principal_evenly() {
        let inputs = MortgageInputs {
            interest_rate: 0.0,
            loan_term: 10,
            ..MortgageInputs::default()
        };
        let result = inputs.calculate().unwrap();
        assert!(close(result.monthly_principal_interest, 400_000.0 / 120.0));
        assert!(close(result.total_interest, 0.0));
    }

    #[test]
    fn oversized_loan_term_is_rejected() {
        let params = HashMap::from([("loanTerm".to_string(), "400000000".to_string())]);
        let inputs = MortgageInputs::from_query(&params);
        assert_eq!(inputs.calculate(), Err(MortgageError::LoanTerm));

        let longest = MortgageInputs {
            loan_term: MAX_LOAN_TERM_YEARS,
            ..MortgageInputs::default()
        };
        assert!(longest.calculate().is_ok());
    }

    #[test]
    fn query_values_fall_back_to_defaults() {
        let params: HashMap<String, String> = [
            ("homePrice", "300,000"),
            ("interestRate", "abc"),
            ("loanTerm", "15"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let inputs = MortgageInputs::from_query(&params);
        assert_eq!(inputs.home_price, 300_000.0);
        assert_eq!(inputs.interest_rate, 6.5);
        assert_eq!(inputs.loan_term, 15);
    }

    #[test]
    fn rejects_out_of_range_inputs() {
        let bad_down = MortgageInputs {
            down_payment_percent: 120.0,
            ..MortgageInputs::default()
        };
        assert_eq!(bad_down.calculate(), Err(MortgageError::DownPayment));
        let no_term = MortgageInputs {
            loan_term: 0,
            ..MortgageInputs::default()
        };
        assert_eq!(no_term.calculate(), Err(MortgageError::LoanTerm));
    }
}
