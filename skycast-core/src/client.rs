use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    config::Config,
    error::{GatewayError, Result},
    model::{CurrentWeather, Forecast},
};

/// HTTP client for the weather gateway.
///
/// Wraps a shared `reqwest` connection pool and the resolved base URL;
/// cloning is cheap and clones share the pool. Every operation is a single
/// GET with no retry, so each call either resolves with a decoded body or
/// fails with a [`GatewayError`] the caller can branch on.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: Client,
    base_url: String,
}

impl GatewayClient {
    /// Create a client for the gateway named in `config`.
    pub fn new(config: Config) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Current conditions for a city name.
    ///
    /// Leading and trailing whitespace is trimmed before the name is
    /// percent-encoded into the query string.
    pub async fn fetch_weather_by_city(&self, city: &str) -> Result<CurrentWeather> {
        let url = format!(
            "{}/weather?city={}",
            self.base_url,
            urlencoding::encode(city.trim())
        );
        self.fetch_json(&url).await
    }

    /// Forecast for a city name, encoded the same way as
    /// [`fetch_weather_by_city`](Self::fetch_weather_by_city).
    pub async fn fetch_forecast(&self, city: &str) -> Result<Forecast> {
        let url = format!(
            "{}/forecast?city={}",
            self.base_url,
            urlencoding::encode(city.trim())
        );
        self.fetch_json(&url).await
    }

    /// Current conditions for a latitude/longitude pair.
    ///
    /// Coordinates are formatted with plain `f64` display (so `-74.0`
    /// becomes `lon=-74`) and are not range-checked; the gateway owns that
    /// validation.
    pub async fn fetch_weather_by_coords(&self, lat: f64, lon: f64) -> Result<CurrentWeather> {
        let url = format!("{}/weather?lat={}&lon={}", self.base_url, lat, lon);
        self.fetch_json(&url).await
    }

    /// Single-attempt GET returning the decoded JSON body.
    ///
    /// Reads the body as text first so that non-success responses can be
    /// mined for an error message and success bodies produce a
    /// [`GatewayError::Decode`] rather than a transport error when they
    /// fail to parse.
    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(%url, "requesting weather gateway");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GatewayError::Status {
                status,
                message: error_message(status, &body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl Default for GatewayClient {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Error-body shape shared by the gateway's two producers: API Gateway
/// itself answers `{"message": ...}`, the Lambda behind it `{"error": ...}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Derive a human-readable message for a non-success response.
///
/// Priority: a `message` (or `error`) string field from a JSON body, then
/// the raw body text, then the status line itself.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.message.or(parsed.error) {
            return message;
        }
    }

    let text = body.trim();
    if !text.is_empty() {
        return text.to_string();
    }

    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    const CURRENT_BODY: &str = r#"{
        "name": "Kyiv",
        "dt": 1756123200,
        "timezone": 10800,
        "main": {"temp": 12.3, "feels_like": 11.5, "temp_min": 11.8, "temp_max": 13.1, "pressure": 1012, "humidity": 76},
        "weather": [{"main": "Rain", "description": "light rain", "icon": "10d"}],
        "wind": {"speed": 4.6, "deg": 250},
        "sys": {"country": "UA"}
    }"#;

    const FORECAST_BODY: &str = r#"{
        "city": {"name": "Lviv", "country": "UA"},
        "list": [{
            "dt": 1756134000,
            "main": {"temp": 13.1, "feels_like": 12.2, "temp_min": 12.9, "temp_max": 13.5, "pressure": 1011, "humidity": 70},
            "weather": [{"main": "Clouds", "description": "scattered clouds", "icon": "03d"}],
            "wind": {"speed": 3.8}
        }]
    }"#;

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    /// One-shot gateway stand-in: serves a single canned response and
    /// reports the request target it saw.
    async fn spawn_gateway(response: String) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept connection");

            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.expect("read request");
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
                if head.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }

            let target = String::from_utf8_lossy(&head)
                .lines()
                .next()
                .and_then(|line| line.split_whitespace().nth(1))
                .unwrap_or_default()
                .to_string();

            socket
                .write_all(response.as_bytes())
                .await
                .expect("write response");
            socket.shutdown().await.ok();
            let _ = tx.send(target);
        });

        (format!("http://{addr}"), rx)
    }

    fn client_for(base_url: &str) -> GatewayClient {
        GatewayClient::new(Config::with_base_url(base_url))
    }

    #[tokio::test]
    async fn success_resolves_with_decoded_body() {
        let (base, rx) = spawn_gateway(http_response("200 OK", CURRENT_BODY)).await;

        let weather = client_for(&base)
            .fetch_weather_by_city("Kyiv")
            .await
            .expect("gateway served a valid body");

        assert_eq!(weather.name, "Kyiv");
        assert_eq!(weather.description(), Some("light rain"));
        assert_eq!(rx.await.expect("request captured"), "/weather?city=Kyiv");
    }

    #[tokio::test]
    async fn city_is_trimmed_and_percent_encoded() {
        let (base, rx) = spawn_gateway(http_response("200 OK", CURRENT_BODY)).await;

        client_for(&base)
            .fetch_weather_by_city("  New York  ")
            .await
            .expect("gateway served a valid body");

        assert_eq!(
            rx.await.expect("request captured"),
            "/weather?city=New%20York"
        );
    }

    #[tokio::test]
    async fn coordinates_use_plain_float_formatting() {
        let (base, rx) = spawn_gateway(http_response("200 OK", CURRENT_BODY)).await;

        client_for(&base)
            .fetch_weather_by_coords(40.7, -74.0)
            .await
            .expect("gateway served a valid body");

        assert_eq!(
            rx.await.expect("request captured"),
            "/weather?lat=40.7&lon=-74"
        );
    }

    #[tokio::test]
    async fn forecast_hits_the_forecast_path() {
        let (base, rx) = spawn_gateway(http_response("200 OK", FORECAST_BODY)).await;

        let forecast = client_for(&base)
            .fetch_forecast("Lviv")
            .await
            .expect("gateway served a valid body");

        assert_eq!(forecast.city.name, "Lviv");
        assert_eq!(forecast.list.len(), 1);
        assert_eq!(rx.await.expect("request captured"), "/forecast?city=Lviv");
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_trimmed() {
        let (base, rx) = spawn_gateway(http_response("200 OK", CURRENT_BODY)).await;

        client_for(&format!("{base}/"))
            .fetch_weather_by_city("Kyiv")
            .await
            .expect("gateway served a valid body");

        assert_eq!(rx.await.expect("request captured"), "/weather?city=Kyiv");
    }

    #[tokio::test]
    async fn error_status_prefers_json_message_field() {
        let (base, _rx) = spawn_gateway(http_response(
            "503 Service Unavailable",
            r#"{"message": "upstream unavailable"}"#,
        ))
        .await;

        let err = client_for(&base)
            .fetch_weather_by_city("Kyiv")
            .await
            .expect_err("gateway answered 503");

        assert_eq!(err.to_string(), "upstream unavailable");
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn error_status_honors_lambda_error_field() {
        let (base, _rx) = spawn_gateway(http_response(
            "500 Internal Server Error",
            r#"{"error": "Missing API key"}"#,
        ))
        .await;

        let err = client_for(&base)
            .fetch_weather_by_city("Kyiv")
            .await
            .expect_err("gateway answered 500");

        assert_eq!(err.to_string(), "Missing API key");
    }

    #[tokio::test]
    async fn error_status_falls_back_to_raw_text_body() {
        let (base, _rx) = spawn_gateway(http_response("502 Bad Gateway", "oops")).await;

        let err = client_for(&base)
            .fetch_weather_by_city("Kyiv")
            .await
            .expect_err("gateway answered 502");

        assert_eq!(err.to_string(), "oops");
    }

    #[tokio::test]
    async fn error_status_with_empty_body_reports_status_line() {
        let (base, _rx) = spawn_gateway(http_response("500 Internal Server Error", "")).await;

        let err = client_for(&base)
            .fetch_weather_by_city("Kyiv")
            .await
            .expect_err("gateway answered 500");

        assert_eq!(err.to_string(), "500 Internal Server Error");
    }

    #[tokio::test]
    async fn undecodable_success_body_is_a_decode_error() {
        let (base, _rx) = spawn_gateway(http_response("200 OK", "surprise!")).await;

        let err = client_for(&base)
            .fetch_weather_by_city("Kyiv")
            .await
            .expect_err("body is not weather JSON");

        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        // Grab a free port, then close the listener before the request.
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind probe listener");
        let addr = listener.local_addr().expect("listener addr");
        drop(listener);

        let err = client_for(&format!("http://{addr}"))
            .fetch_weather_by_city("Kyiv")
            .await
            .expect_err("nothing is listening");

        assert!(matches!(err, GatewayError::Transport(_)));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn error_message_prefers_message_over_error_field() {
        let status = StatusCode::BAD_GATEWAY;
        let body = r#"{"message": "from gateway", "error": "from lambda"}"#;
        assert_eq!(error_message(status, body), "from gateway");
    }

    #[test]
    fn error_message_uses_raw_text_for_json_without_known_fields() {
        let status = StatusCode::BAD_GATEWAY;
        let body = r#"{"cod": 401}"#;
        assert_eq!(error_message(status, body), body);
    }

    #[test]
    fn error_message_treats_whitespace_body_as_empty() {
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, "  \n"),
            "404 Not Found"
        );
    }

    #[test]
    fn error_message_degrades_to_bare_code_without_canonical_reason() {
        let status = StatusCode::from_u16(599).expect("valid non-standard code");
        assert_eq!(error_message(status, ""), "599");
    }
}
