use crate::data::http_client::http_client;
use crate::error::PredictError;
use crate::types::{PricePoint, PriceSeries, SecurityInfo};

// Roughly fifteen years of trading days.
const HISTORY_LIMIT: usize = 3800;

fn parse_secid(symbol: &str) -> String {
    let code = symbol.trim();

    // 000001 is the Shanghai Composite, not the Shenzhen stock.
    if code == "000001" {
        return format!("1.{}", code);
    }

    if code.starts_with('6') {
        format!("1.{}", code)
    } else if code.starts_with('0') || code.starts_with('3') {
        format!("0.{}", code)
    } else if code.contains('.') {
        code.to_string()
    } else {
        format!("1.{}", code)
    }
}

fn parse_klines(json: &serde_json::Value, info: &SecurityInfo) -> Result<PriceSeries, PredictError> {
    let data = &json["data"];
    if data.is_null() {
        return Err(PredictError::EmptySeries(info.symbol.clone()));
    }

    let klines = data["klines"]
        .as_array()
        .ok_or_else(|| PredictError::Provider("No kline data".to_string()))?;

    let name = data["name"]
        .as_str()
        .filter(|n| !n.is_empty())
        .unwrap_or(&info.name)
        .to_string();

    let mut points = Vec::with_capacity(klines.len());
    for kline in klines {
        if let Some(line) = kline.as_str() {
            let parts: Vec<&str> = line.split(',').collect();
            if parts.len() >= 3 {
                let date = parts[0].to_string();
                if let Ok(close) = parts[2].parse::<f64>() {
                    points.push(PricePoint { date, close });
                }
            }
        }
    }

    // Provider data is chronological already; the sort and dedup make the
    // no-duplicate-dates invariant hold regardless.
    points.sort_by(|a, b| a.date.cmp(&b.date));
    points.dedup_by(|a, b| a.date == b.date);

    if points.is_empty() {
        return Err(PredictError::EmptySeries(info.symbol.clone()));
    }

    Ok(PriceSeries {
        symbol: info.symbol.clone(),
        name,
        points,
    })
}

/// Fetches the daily close history for the last fifteen years. Up to three
/// attempts with increasing delay on network or parse failures.
pub async fn fetch_daily_history(info: &SecurityInfo) -> Result<PriceSeries, PredictError> {
    let secid = parse_secid(&info.symbol);
    let url = format!(
        "http://push2his.eastmoney.com/api/qt/stock/kline/get?secid={}&fields1=f1,f2,f3,f4,f5,f6&fields2=f51,f52,f53,f54,f55,f56&klt=101&fqt=1&beg=0&end=20500000&lmt={}",
        secid, HISTORY_LIMIT
    );

    let client = http_client().await?;

    let mut last_error = None;
    for attempt in 0..3 {
        if attempt > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(500 * attempt as u64)).await;
            tracing::debug!(symbol = %info.symbol, attempt, "retrying history fetch");
        }

        let response = match client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                last_error = Some(PredictError::from(e));
                continue;
            }
        };

        if !response.status().is_success() {
            return Err(PredictError::Provider(format!(
                "API error: {}",
                response.status()
            )));
        }

        match response.json::<serde_json::Value>().await {
            Ok(json) => return parse_klines(&json, info),
            Err(e) => {
                last_error = Some(PredictError::Provider(format!("Parse error: {}", e)));
            }
        }
    }

    Err(last_error.unwrap_or_else(|| PredictError::Network("Unknown error".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(symbol: &str) -> SecurityInfo {
        SecurityInfo {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            exchange: String::new(),
        }
    }

    #[test]
    fn secid_prefixes_by_market() {
        assert_eq!(parse_secid("600519"), "1.600519");
        assert_eq!(parse_secid("000002"), "0.000002");
        assert_eq!(parse_secid("300750"), "0.300750");
        assert_eq!(parse_secid("000001"), "1.000001");
        assert_eq!(parse_secid("1.600000"), "1.600000");
    }

    #[test]
    fn parse_klines_extracts_dates_and_closes() {
        let json = serde_json::json!({
            "data": {
                "name": "Test Asset",
                "klines": [
                    "2024-01-02,10.0,10.5,10.6,9.9,1000",
                    "2024-01-03,10.5,10.8,10.9,10.4,1200",
                    "2024-01-03,10.5,10.8,10.9,10.4,1200"
                ]
            }
        });
        let series = parse_klines(&json, &info("600519")).unwrap();
        assert_eq!(series.name, "Test Asset");
        assert_eq!(series.len(), 2);
        assert_eq!(series.points[0].date, "2024-01-02");
        assert_eq!(series.points[0].close, 10.5);
        assert_eq!(series.points[1].close, 10.8);
    }

    #[test]
    fn null_data_is_an_empty_series() {
        let json = serde_json::json!({ "data": null });
        assert!(matches!(
            parse_klines(&json, &info("999999")),
            Err(PredictError::EmptySeries(_))
        ));
    }

    #[test]
    fn empty_klines_is_an_empty_series() {
        let json = serde_json::json!({ "data": { "name": "x", "klines": [] } });
        assert!(matches!(
            parse_klines(&json, &info("999999")),
            Err(PredictError::EmptySeries(_))
        ));
    }
}
