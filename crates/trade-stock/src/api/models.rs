//! Wire models for Financial Modeling Prep responses

use serde::{Deserialize, Serialize};
use trade_scoring::{PeriodFigures, QuoteFields};

/// One element of the `/quote/{symbol}` array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRecord {
    #[serde(default)]
    pub symbol: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub price_avg50: Option<f64>,
    pub price_avg200: Option<f64>,
}

impl QuoteRecord {
    pub fn to_fields(&self) -> QuoteFields {
        QuoteFields {
            price: self.price,
            day_high: self.day_high,
            day_low: self.day_low,
            price_avg_50: self.price_avg50,
            price_avg_200: self.price_avg200,
            market_cap: self.market_cap,
        }
    }

    /// Whether either moving average has to be computed locally
    pub fn missing_moving_average(&self) -> bool {
        self.price_avg50.is_none() || self.price_avg200.is_none()
    }
}

/// One period of `/income-statement/{symbol}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    pub date: Option<String>,
    pub period: Option<String>,
    pub revenue: Option<f64>,
    pub net_income: Option<f64>,
}

impl IncomeStatement {
    pub fn figures(&self) -> PeriodFigures {
        PeriodFigures {
            revenue: self.revenue,
            net_income: self.net_income,
        }
    }
}

/// One daily bar of `/historical-price-full/{symbol}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPrice {
    pub date: String,
    pub close: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoricalResponse {
    #[serde(default)]
    pub historical: Vec<HistoricalPrice>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quote_record_field_names() {
        let record: QuoteRecord = serde_json::from_value(json!({
            "symbol": "AAPL",
            "name": "Apple Inc.",
            "price": 175.0,
            "marketCap": 2.7e12,
            "dayHigh": 177.5,
            "dayLow": 173.2,
            "priceAvg50": 171.3,
            "priceAvg200": 168.9,
            "volume": 51_000_000
        }))
        .unwrap();

        let fields = record.to_fields();
        assert_eq!(fields.price, Some(175.0));
        assert_eq!(fields.day_low, Some(173.2));
        assert_eq!(fields.price_avg_200, Some(168.9));
        assert!(!record.missing_moving_average());
    }

    #[test]
    fn test_nulls_become_none() {
        let record: QuoteRecord = serde_json::from_value(json!({
            "symbol": "NEWCO",
            "price": 12.0,
            "priceAvg50": null
        }))
        .unwrap();
        assert_eq!(record.price_avg50, None);
        assert_eq!(record.market_cap, None);
        assert!(record.missing_moving_average());
    }

    #[test]
    fn test_income_statement_figures() {
        let statement: IncomeStatement = serde_json::from_value(json!({
            "date": "2024-09-28",
            "period": "FY",
            "revenue": 391_035_000_000.0,
            "netIncome": 93_736_000_000.0
        }))
        .unwrap();
        let figures = statement.figures();
        assert_eq!(figures.revenue, Some(391_035_000_000.0));
        assert_eq!(figures.net_income, Some(93_736_000_000.0));
    }
}
