//! Yahoo Finance market data client.
//!
//! Two endpoints back the [`MarketDataClient`] contract:
//!
//! - `v10/finance/quoteSummary/{symbol}?modules=price,assetProfile` for
//!   quote/profile metadata
//! - `v8/finance/chart/{symbol}?period1=..&period2=..&interval=..` for
//!   intraday history
//!
//! Numeric metadata fields arrive wrapped as `{"raw": .., "fmt": ".."}`;
//! chart rows with missing OHLC values are skipped rather than zero-filled.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::{IntradayPoint, Interval, Symbol, UtcDateTime};
use crate::error::QuoteError;
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::market::{CompanyMetadata, HistoryWindow, MarketDataClient};

const DEFAULT_HOST: &str = "https://query1.finance.yahoo.com";
const REFERER: &str = "https://finance.yahoo.com/";
const NOT_FOUND_CODE: &str = "Not Found";

/// Upstream client for Yahoo's unofficial quote endpoints.
#[derive(Clone)]
pub struct YahooClient {
    http: Arc<dyn HttpClient>,
    host: String,
    timeout: Duration,
}

impl YahooClient {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            host: String::from(DEFAULT_HOST),
            timeout: Duration::from_secs(10),
        }
    }

    /// Override the upstream host, for tests against a local stub.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Bound every upstream call so one hung symbol cannot stall a basket.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn fetch(&self, url: String, symbol: &Symbol) -> Result<HttpResponse, QuoteError> {
        let request = HttpRequest::get(url)
            .with_header("referer", REFERER)
            .with_timeout(self.timeout);

        let response = self.http.execute(request).await.map_err(|error| {
            QuoteError::unavailable(symbol.as_str(), format!("transport error: {error}"))
        })?;

        if response.status == 404 {
            return Err(QuoteError::unknown(symbol.as_str()));
        }
        if !response.is_success() {
            return Err(QuoteError::unavailable(
                symbol.as_str(),
                format!("upstream returned status {}", response.status),
            ));
        }

        Ok(response)
    }
}

impl MarketDataClient for YahooClient {
    fn metadata<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<CompanyMetadata, QuoteError>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!(
                "{}/v10/finance/quoteSummary/{}?modules=price%2CassetProfile",
                self.host,
                urlencoding::encode(symbol.as_str())
            );
            let response = self.fetch(url, symbol).await?;
            parse_metadata(symbol, &response.body)
        })
    }

    fn history<'a>(
        &'a self,
        symbol: &'a Symbol,
        window: HistoryWindow,
        interval: Interval,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<IntradayPoint>, QuoteError>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!(
                "{}/v8/finance/chart/{}?period1={}&period2={}&interval={}",
                self.host,
                urlencoding::encode(symbol.as_str()),
                window.start.unix_timestamp(),
                window.end.unix_timestamp(),
                interval
            );
            let response = self.fetch(url, symbol).await?;
            parse_history(symbol, &response.body)
        })
    }
}

// ---------------------------------------------------------------------------
// quoteSummary payload
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryNode,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryNode {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(rename = "assetProfile", default)]
    asset_profile: Option<AssetProfileModule>,
}

#[derive(Debug, Default, Deserialize)]
struct PriceModule {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(rename = "longName", default)]
    long_name: Option<String>,
    #[serde(rename = "regularMarketPreviousClose", default)]
    previous_close: Option<RawValue>,
    #[serde(rename = "regularMarketPrice", default)]
    market_price: Option<RawValue>,
    #[serde(rename = "regularMarketTime", default)]
    market_time: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct AssetProfileModule {
    #[serde(default)]
    sector: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(rename = "longBusinessSummary", default)]
    business_summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

fn api_error_to_quote_error(symbol: &Symbol, error: &ApiError) -> QuoteError {
    let code = error.code.as_deref().unwrap_or_default();
    let description = error
        .description
        .as_deref()
        .unwrap_or("unspecified upstream error");
    if code == NOT_FOUND_CODE {
        QuoteError::unknown(symbol.as_str())
    } else {
        QuoteError::unavailable(symbol.as_str(), description)
    }
}

fn parse_metadata(symbol: &Symbol, body: &str) -> Result<CompanyMetadata, QuoteError> {
    let envelope: QuoteSummaryEnvelope = serde_json::from_str(body)
        .map_err(|e| QuoteError::malformed(symbol.as_str(), e.to_string()))?;

    if let Some(error) = &envelope.quote_summary.error {
        return Err(api_error_to_quote_error(symbol, error));
    }

    let result = envelope
        .quote_summary
        .result
        .and_then(|mut results| {
            if results.is_empty() {
                None
            } else {
                Some(results.swap_remove(0))
            }
        })
        .ok_or_else(|| QuoteError::unknown(symbol.as_str()))?;

    let price = result.price.unwrap_or_default();
    let profile = result.asset_profile.unwrap_or_default();

    Ok(CompanyMetadata {
        symbol: price.symbol,
        long_name: price.long_name,
        sector: profile.sector,
        country: profile.country,
        previous_close: price.previous_close.and_then(|v| v.raw),
        last_price: price.market_price.and_then(|v| v.raw),
        market_time: price.market_time,
        business_summary: profile.business_summary,
    })
}

// ---------------------------------------------------------------------------
// chart payload
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartNode,
}

#[derive(Debug, Deserialize)]
struct ChartNode {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

fn parse_history(symbol: &Symbol, body: &str) -> Result<Vec<IntradayPoint>, QuoteError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| QuoteError::malformed(symbol.as_str(), e.to_string()))?;

    if let Some(error) = &envelope.chart.error {
        return Err(api_error_to_quote_error(symbol, error));
    }

    let result = match envelope.chart.result.and_then(|mut results| {
        if results.is_empty() {
            None
        } else {
            Some(results.swap_remove(0))
        }
    }) {
        Some(result) => result,
        // A present-but-empty chart answer means "no samples today".
        None => return Ok(Vec::new()),
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut points = Vec::with_capacity(timestamps.len());
    for (i, &epoch) in timestamps.iter().enumerate() {
        let ts = match UtcDateTime::from_unix_timestamp(epoch) {
            Ok(ts) => ts,
            Err(_) => continue,
        };

        // Trading halts leave null rows in the arrays; skip them.
        if let (Some(Some(open)), Some(Some(high)), Some(Some(low)), Some(Some(close))) = (
            quote.open.get(i),
            quote.high.get(i),
            quote.low.get(i),
            quote.close.get(i),
        ) {
            let volume = quote.volume.get(i).copied().flatten();
            if let Ok(point) = IntradayPoint::new(ts, *open, *high, *low, *close, volume) {
                points.push(point);
            }
        }
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::http_client::HttpError;

    use super::*;

    fn sym(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("symbol should parse")
    }

    /// Transport returning a fixed response and recording requested URLs.
    struct CannedTransport {
        status: u16,
        body: &'static str,
        seen: Mutex<Vec<String>>,
    }

    impl CannedTransport {
        fn new(status: u16, body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                status,
                body,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl HttpClient for CannedTransport {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            Box::pin(async move {
                self.seen.lock().unwrap().push(request.url);
                Ok(HttpResponse {
                    status: self.status,
                    body: self.body.to_owned(),
                })
            })
        }
    }

    #[tokio::test]
    async fn metadata_request_targets_configured_host() {
        let transport = CannedTransport::new(200, METADATA_BODY);
        let client = YahooClient::new(Arc::clone(&transport) as Arc<dyn HttpClient>)
            .with_host("http://127.0.0.1:19099");

        let metadata = client.metadata(&sym("PETR4.SA")).await.expect("must fetch");

        assert_eq!(metadata.last_price, Some(38.95));
        let seen = transport.seen.lock().unwrap();
        assert!(seen[0].starts_with("http://127.0.0.1:19099/v10/finance/quoteSummary/PETR4.SA"));
    }

    #[tokio::test]
    async fn http_404_maps_to_unknown_symbol() {
        let transport = CannedTransport::new(404, "");
        let client = YahooClient::new(transport as Arc<dyn HttpClient>);

        let err = client.metadata(&sym("NOPE")).await.expect_err("must fail");
        assert!(matches!(err, QuoteError::UnknownSymbol { ref symbol } if symbol == "NOPE"));
    }

    #[tokio::test]
    async fn http_5xx_maps_to_unavailable() {
        let transport = CannedTransport::new(503, "overloaded");
        let client = YahooClient::new(transport as Arc<dyn HttpClient>);

        let err = client.metadata(&sym("PETR4.SA")).await.expect_err("must fail");
        assert!(matches!(err, QuoteError::Unavailable { .. }));
    }

    const METADATA_BODY: &str = r#"{
        "quoteSummary": {
            "result": [{
                "price": {
                    "symbol": "PETR4.SA",
                    "longName": "Petróleo Brasileiro S.A. - Petrobras",
                    "regularMarketPreviousClose": {"raw": 38.12, "fmt": "38.12"},
                    "regularMarketPrice": {"raw": 38.95, "fmt": "38.95"},
                    "regularMarketTime": 1700000000
                },
                "assetProfile": {
                    "sector": "Energy",
                    "country": "Brazil",
                    "longBusinessSummary": "Petrobras explores and produces oil and gas."
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_full_metadata() {
        let metadata = parse_metadata(&sym("PETR4.SA"), METADATA_BODY).expect("must parse");
        assert_eq!(metadata.symbol.as_deref(), Some("PETR4.SA"));
        assert_eq!(metadata.sector.as_deref(), Some("Energy"));
        assert_eq!(metadata.previous_close, Some(38.12));
        assert_eq!(metadata.last_price, Some(38.95));
        assert_eq!(metadata.market_time, Some(1_700_000_000));
        assert!(metadata
            .business_summary
            .as_deref()
            .is_some_and(|s| s.contains("oil and gas")));
    }

    #[test]
    fn missing_modules_degrade_to_empty_metadata() {
        let body = r#"{"quoteSummary": {"result": [{}], "error": null}}"#;
        let metadata = parse_metadata(&sym("XPTO3.SA"), body).expect("must parse");
        assert_eq!(metadata, CompanyMetadata::default());
    }

    #[test]
    fn not_found_error_maps_to_unknown_symbol() {
        let body = r#"{
            "quoteSummary": {
                "result": null,
                "error": {"code": "Not Found", "description": "Quote not found for ticker symbol: NOPE"}
            }
        }"#;
        let err = parse_metadata(&sym("NOPE"), body).expect_err("must fail");
        assert!(matches!(err, QuoteError::UnknownSymbol { ref symbol } if symbol == "NOPE"));
    }

    #[test]
    fn other_api_errors_map_to_unavailable() {
        let body = r#"{
            "quoteSummary": {
                "result": null,
                "error": {"code": "Internal Error", "description": "backend overloaded"}
            }
        }"#;
        let err = parse_metadata(&sym("PETR4.SA"), body).expect_err("must fail");
        assert!(matches!(err, QuoteError::Unavailable { ref message, .. } if message == "backend overloaded"));
    }

    #[test]
    fn garbage_body_is_malformed() {
        let err = parse_metadata(&sym("PETR4.SA"), "<html>rate limited</html>").expect_err("must fail");
        assert!(matches!(err, QuoteError::Malformed { .. }));
    }

    const CHART_BODY: &str = r#"{
        "chart": {
            "result": [{
                "timestamp": [1700000000, 1700000300, 1700000600],
                "indicators": {
                    "quote": [{
                        "open":  [38.10, null, 38.40],
                        "high":  [38.30, null, 38.60],
                        "low":   [38.00, null, 38.35],
                        "close": [38.25, null, 38.55],
                        "volume": [120000, null, 98000]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_chart_and_skips_null_rows() {
        let points = parse_history(&sym("PETR4.SA"), CHART_BODY).expect("must parse");
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].ts.unix_timestamp(), 1_700_000_000);
        assert_eq!(points[1].ts.unix_timestamp(), 1_700_000_600);
        assert_eq!(points[1].volume, Some(98_000));
    }

    #[test]
    fn empty_chart_result_is_empty_series() {
        let body = r#"{"chart": {"result": [], "error": null}}"#;
        let points = parse_history(&sym("PETR4.SA"), body).expect("must parse");
        assert!(points.is_empty());
    }

    #[test]
    fn chart_result_without_indicators_is_empty_series() {
        let body = r#"{"chart": {"result": [{"timestamp": [1700000000]}], "error": null}}"#;
        let points = parse_history(&sym("PETR4.SA"), body).expect("must parse");
        assert!(points.is_empty());
    }

    #[test]
    fn chart_not_found_maps_to_unknown_symbol() {
        let body = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        }"#;
        let err = parse_history(&sym("NOPE"), body).expect_err("must fail");
        assert!(matches!(err, QuoteError::UnknownSymbol { .. }));
    }
}
