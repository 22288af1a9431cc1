use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::Query,
    http::{header, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};

use skycast::{routes, ApiClient, Dashboard, Location, SubmitError, WeatherInput};

// ---

/// Serve `app` on an ephemeral local port and return its base URL.
async fn spawn_stub(app: Router) -> Result<String> {
    // ---
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    Ok(format!("http://{}", addr))
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sunny_input() -> WeatherInput {
    // ---
    WeatherInput {
        temperature_2m_mean: 25.0,
        apparent_temperature_mean: 24.0,
        windspeed_10m_max: 10.0,
        precipitation_sum: 0.0,
        date: day(2024, 6, 1),
    }
}

/// Prediction stub answering every `/predict` with `status` and `body`,
/// counting hits and keeping the last request body.
async fn prediction_stub(
    status: StatusCode,
    body: Value,
) -> Result<(String, Arc<AtomicUsize>, Arc<Mutex<Option<Value>>>)> {
    // ---
    let hits = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(None));

    let (h, s) = (hits.clone(), seen.clone());
    let app = Router::new().route(
        "/predict",
        post(move |Json(request): Json<Value>| {
            let (h, s) = (h.clone(), s.clone());
            let body = body.clone();
            async move {
                h.fetch_add(1, Ordering::SeqCst);
                *s.lock().unwrap() = Some(request);
                (status, Json(body))
            }
        }),
    );

    Ok((spawn_stub(app).await?, hits, seen))
}

#[tokio::test]
async fn sunny_prediction_is_appended_once() -> Result<()> {
    // ---
    let (base, hits, seen) =
        prediction_stub(StatusCode::OK, json!({"status": "success", "prediction": "Sunny"})).await?;
    let dashboard = Dashboard::new(ApiClient::new(&base, &base));

    assert_eq!(dashboard.history_len().await, 0);
    let result = assert_ok!(dashboard.submit(sunny_input()).await);
    assert_eq!(result.prediction, "Sunny");

    let history = dashboard.history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].prediction, "Sunny");
    assert_eq!(history[0].temperature_2m_mean, 25.0);
    assert_eq!(history[0].date, "2024-06-01T00:00:00.000Z");
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    // Body sent to the model
    let request = seen.lock().unwrap().clone().expect("request body recorded");
    assert_eq!(request["temperature_2m_mean"], 25.0);
    assert_eq!(request["apparent_temperature_mean"], 24.0);
    assert_eq!(request["windspeed_10m_max"], 10.0);
    assert_eq!(request["precipitation_sum"], 0.0);
    assert_eq!(request["date"], "2024-06-01T00:00:00.000Z");

    Ok(())
}

#[tokio::test]
async fn each_success_adds_exactly_one_entry() -> Result<()> {
    // ---
    let (base, _, _) = prediction_stub(StatusCode::OK, json!({"prediction": "Overcast"})).await?;
    let dashboard = Dashboard::new(ApiClient::new(&base, &base));

    for expected in 1..=3 {
        assert_ok!(dashboard.submit(sunny_input()).await);
        assert_eq!(dashboard.history_len().await, expected);
    }
    Ok(())
}

#[tokio::test]
async fn server_error_leaves_history_unchanged() -> Result<()> {
    // ---
    let (base, hits, _) =
        prediction_stub(StatusCode::INTERNAL_SERVER_ERROR, json!({"detail": "boom"})).await?;
    let dashboard = Dashboard::new(ApiClient::new(&base, &base));

    let err = assert_err!(dashboard.submit(sunny_input()).await);
    assert!(matches!(err, SubmitError::Request(_)));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(dashboard.history_len().await, 0);
    Ok(())
}

#[tokio::test]
async fn response_without_prediction_is_dropped() -> Result<()> {
    // ---
    let (base, _, _) = prediction_stub(StatusCode::OK, json!({"status": "success"})).await?;
    let dashboard = Dashboard::new(ApiClient::new(&base, &base));

    assert_err!(dashboard.submit(sunny_input()).await);
    assert_eq!(dashboard.history_len().await, 0);
    Ok(())
}

#[tokio::test]
async fn out_of_range_input_never_reaches_the_model() -> Result<()> {
    // ---
    let (base, hits, _) = prediction_stub(StatusCode::OK, json!({"prediction": "Sunny"})).await?;
    let dashboard = Dashboard::new(ApiClient::new(&base, &base));

    let cases = [
        WeatherInput {
            temperature_2m_mean: 100.5,
            ..sunny_input()
        },
        WeatherInput {
            apparent_temperature_mean: -100.5,
            ..sunny_input()
        },
        WeatherInput {
            windspeed_10m_max: -1.0,
            ..sunny_input()
        },
        WeatherInput {
            precipitation_sum: 1001.0,
            ..sunny_input()
        },
    ];
    for input in cases {
        let err = assert_err!(dashboard.submit(input).await);
        assert!(matches!(err, SubmitError::Invalid(_)));
    }

    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(dashboard.history_len().await, 0);
    Ok(())
}

#[tokio::test]
async fn overlapping_submissions_keep_arrival_order() -> Result<()> {
    // ---
    // A temperature of 1.0 marks the slow request; everything else answers at once.
    let app = Router::new().route(
        "/predict",
        post(|Json(request): Json<Value>| async move {
            if request["temperature_2m_mean"] == 1.0 {
                tokio::time::sleep(Duration::from_millis(400)).await;
                Json(json!({"prediction": "slow-first"}))
            } else {
                Json(json!({"prediction": "fast-second"}))
            }
        }),
    );
    let base = spawn_stub(app).await?;
    let dashboard = Dashboard::new(ApiClient::new(&base, &base));

    let slow = WeatherInput {
        temperature_2m_mean: 1.0,
        ..sunny_input()
    };
    let (first, second) = tokio::join!(dashboard.submit(slow), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        dashboard.submit(sunny_input()).await
    });
    assert_ok!(first);
    assert_ok!(second);

    // Last response wins: the earlier, slower submission lands last
    let labels: Vec<String> = dashboard
        .history()
        .await
        .into_iter()
        .map(|e| e.prediction)
        .collect();
    assert_eq!(labels, vec!["fast-second", "slow-first"]);

    let latest = dashboard.latest().await.expect("latest prediction");
    assert_eq!(latest.prediction, "slow-first");
    assert_eq!(latest.temperature_2m_mean, 1.0);
    Ok(())
}

#[tokio::test]
async fn feature_importance_keeps_response_order_and_survives_failures() -> Result<()> {
    // ---
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();
    let app = Router::new().route(
        "/feature-importance",
        get(move || {
            let c = c.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) == 0 {
                    (
                        StatusCode::OK,
                        [(header::CONTENT_TYPE, "application/json")],
                        r#"{"windspeed_10m_max":0.3,"temperature_2m_mean":0.4,"apparent_temperature_mean":0.2,"precipitation_sum":0.1}"#,
                    )
                } else {
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        [(header::CONTENT_TYPE, "application/json")],
                        r#"{"detail":"down"}"#,
                    )
                }
            }
        }),
    );
    let base = spawn_stub(app).await?;
    let dashboard = Dashboard::new(ApiClient::new(&base, &base));

    dashboard.refresh_feature_importance().await;
    let names: Vec<String> = dashboard
        .feature_importance()
        .await
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(
        names,
        vec![
            "Windspeed 10m Max",
            "Temperature 2m Mean",
            "Apparent Temperature Mean",
            "Precipitation Sum"
        ]
    );

    // Second fetch fails; the first result stays
    dashboard.refresh_feature_importance().await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(dashboard.feature_importance().await.len(), 4);
    Ok(())
}

const LOCATION_A: Location = Location {
    name: "a",
    latitude: 1.5,
    longitude: 10.0,
};
const LOCATION_B: Location = Location {
    name: "b",
    latitude: 2.5,
    longitude: 20.0,
};

/// Archive stub keyed on latitude; records every query it sees.
async fn archive_stub(
    fail_latitude: Option<&'static str>,
) -> Result<(String, Arc<Mutex<Vec<HashMap<String, String>>>>)> {
    // ---
    let queries = Arc::new(Mutex::new(Vec::new()));
    let q = queries.clone();
    let app = Router::new().route(
        "/v1/archive",
        get(move |Query(params): Query<HashMap<String, String>>| {
            let q = q.clone();
            async move {
                let latitude = params.get("latitude").cloned().unwrap_or_default();
                q.lock().unwrap().push(params);

                if Some(latitude.as_str()) == fail_latitude {
                    return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": true})));
                }
                let daily = match latitude.as_str() {
                    "1.5" => json!({"time": ["2024-01-01"], "temperature_2m_max": [20.0]}),
                    _ => json!({
                        "time": ["2024-01-01", "2024-01-02"],
                        "temperature_2m_max": [22.0, 23.0]
                    }),
                };
                (StatusCode::OK, Json(json!({"latitude": latitude, "daily": daily})))
            }
        }),
    );
    Ok((spawn_stub(app).await?, queries))
}

#[tokio::test]
async fn comparison_merges_locations_by_date() -> Result<()> {
    // ---
    let (base, queries) = archive_stub(None).await?;
    let dashboard =
        Dashboard::with_locations(ApiClient::new(&base, &base), vec![LOCATION_A, LOCATION_B]);

    dashboard.refresh_comparison(day(2024, 1, 8)).await;
    let merged = dashboard.comparison().await;

    assert_eq!(
        serde_json::to_value(&merged)?,
        json!([
            {"date": "2024-01-01", "a": 20.0, "b": 22.0},
            {"date": "2024-01-02", "b": 23.0}
        ])
    );

    let queries = queries.lock().unwrap().clone();
    assert_eq!(queries.len(), 2);
    for q in &queries {
        assert_eq!(q["start_date"], "2024-01-02");
        assert_eq!(q["end_date"], "2024-01-06");
        assert_eq!(q["daily"], "temperature_2m_max");
    }
    Ok(())
}

#[tokio::test]
async fn comparison_fails_as_a_whole() -> Result<()> {
    // ---
    let (base, _) = archive_stub(Some("2.5")).await?;
    let client = ApiClient::new(&base, &base);

    assert_err!(client.comparison(day(2024, 1, 8), &[LOCATION_A, LOCATION_B]).await);

    let dashboard = Dashboard::with_locations(client, vec![LOCATION_A, LOCATION_B]);
    dashboard.refresh_comparison(day(2024, 1, 8)).await;
    assert!(dashboard.comparison().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn dashboard_api_round_trip() -> Result<()> {
    // ---
    let (model, _, _) = prediction_stub(StatusCode::OK, json!({"prediction": "Fog"})).await?;
    let dashboard = Arc::new(Dashboard::new(ApiClient::new(&model, &model)));
    let base = spawn_stub(routes::router(dashboard.clone())).await?;
    let client = Client::new();

    let health: Value = client.get(format!("{}/health", base)).send().await?.json().await?;
    assert_eq!(health["status"], "ok");

    let response = client
        .get(format!("{}/api/predictions/latest", base))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .post(format!("{}/api/predictions", base))
        .json(&json!({
            "temperature_2m_mean": 25.0,
            "apparent_temperature_mean": 24.0,
            "windspeed_10m_max": 10.0,
            "precipitation_sum": 0.0,
            "date": "2024-06-01"
        }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await?;
    assert_eq!(created["prediction"], "Fog");

    let response = client
        .post(format!("{}/api/predictions", base))
        .json(&json!({
            "temperature_2m_mean": 25.0,
            "apparent_temperature_mean": 24.0,
            "windspeed_10m_max": 500.0,
            "precipitation_sum": 0.0,
            "date": "2024-06-01T00:00:00.000Z"
        }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let rejected: Value = response.json().await?;
    assert_eq!(rejected["violations"][0]["field"], "windspeed_10m_max");

    let history: Vec<Value> = client
        .get(format!("{}/api/predictions", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(history.len(), 1);

    let chart: Vec<Value> = client
        .get(format!("{}/api/predictions/chart", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(chart[0]["date"], "2024-06-01");

    let defaults: Value = client
        .get(format!("{}/api/form-defaults", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(defaults["windspeed_10m_max"], 15.0);
    assert_eq!(defaults["precipitation_sum"], 0.8);

    let importance: Vec<Value> = client
        .get(format!("{}/api/feature-importance", base))
        .send()
        .await?
        .json()
        .await?;
    assert!(importance.is_empty());

    Ok(())
}

#[tokio::test]
async fn dashboard_api_reports_model_failure_as_bad_gateway() -> Result<()> {
    // ---
    let (model, hits, _) =
        prediction_stub(StatusCode::INTERNAL_SERVER_ERROR, json!({"detail": "boom"})).await?;
    let dashboard = Arc::new(Dashboard::new(ApiClient::new(&model, &model)));
    let base = spawn_stub(routes::router(dashboard.clone())).await?;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/predictions", base))
        .json(&json!({
            "temperature_2m_mean": 25.0,
            "apparent_temperature_mean": 24.0,
            "windspeed_10m_max": 10.0,
            "precipitation_sum": 0.0,
            "date": "2024-06-01"
        }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await?;
    assert_eq!(body["violations"], json!([]));
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let history: Vec<Value> = client
        .get(format!("{}/api/predictions", base))
        .send()
        .await?
        .json()
        .await?;
    assert!(history.is_empty());
    assert_eq!(dashboard.history_len().await, 0);
    Ok(())
}
