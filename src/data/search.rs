use crate::data::http_client::http_client;
use crate::error::PredictError;
use crate::types::SecurityInfo;

/// Resolves a free-text query to a concrete security. A bare six-digit code
/// is taken as-is; anything else goes through the provider suggest endpoint
/// and the first usable match wins.
pub async fn resolve_symbol(query: &str) -> Result<SecurityInfo, PredictError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(PredictError::EmptySeries(query.to_string()));
    }

    if trimmed.len() == 6 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Ok(SecurityInfo {
            symbol: trimmed.to_string(),
            name: trimmed.to_string(),
            exchange: String::new(),
        });
    }

    let encoded_query = urlencoding::encode(trimmed);
    let url = format!(
        "http://searchapi.eastmoney.com/api/suggest/get?input={}&type=14&token=D43BF722C8E33BDC906FB84D85E326E8&count=20",
        encoded_query
    );

    tracing::debug!(query = trimmed, "resolving symbol");

    let client = http_client().await?;
    let response = client.get(&url).send().await?;

    if !response.status().is_success() {
        return Err(PredictError::Provider(format!(
            "API error: {}",
            response.status()
        )));
    }

    let json: serde_json::Value = response
        .json()
        .await
        .map_err(|e| PredictError::Provider(format!("Parse error: {}", e)))?;

    let quotes = json["QuotationCodeTable"]["Data"]
        .as_array()
        .or_else(|| json["Data"].as_array())
        .ok_or_else(|| {
            PredictError::Provider("Invalid response format: missing Data array".to_string())
        })?;

    for quote in quotes {
        let code = quote["Code"].as_str().unwrap_or("");
        let name = quote["Name"].as_str().unwrap_or("");
        if code.is_empty() || name.is_empty() {
            continue;
        }
        let exchange = quote["SecurityTypeName"].as_str().unwrap_or("").to_string();
        return Ok(SecurityInfo {
            symbol: code.to_string(),
            name: name.to_string(),
            exchange,
        });
    }

    Err(PredictError::EmptySeries(query.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bare_code_skips_the_network() {
        let info = resolve_symbol("600519").await.unwrap();
        assert_eq!(info.symbol, "600519");
    }

    #[tokio::test]
    async fn empty_query_is_rejected() {
        assert!(matches!(
            resolve_symbol("   ").await,
            Err(PredictError::EmptySeries(_))
        ));
    }
}
