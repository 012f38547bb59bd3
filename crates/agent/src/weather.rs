use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use stockwise_core::config::WeatherConfig;
use stockwise_core::{AdvisoryError, Region};

#[derive(Clone, Debug, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temperature: f64,
    pub rainfall: f64,
    pub humidity: f64,
    pub condition: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RegionForecast {
    pub region: Region,
    pub days: Vec<DailyForecast>,
}

impl RegionForecast {
    /// Headline condition: the first forecast day, if any.
    pub fn leading_condition(&self) -> Option<&str> {
        self.days.first().map(|day| day.condition.as_str())
    }

    pub fn leading_date(&self) -> Option<NaiveDate> {
        self.days.first().map(|day| day.date)
    }
}

/// Boundary around the hosted weather service; same shape as the
/// advisory boundary so failures degrade identically.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn forecast(&self, region: Region) -> Result<RegionForecast, AdvisoryError>;
}

/// Representative coordinates per region for the forecast lookup.
const REGION_COORDINATES: [(Region, f64, f64); 5] = [
    (Region::North, 28.7041, 77.1025),
    (Region::South, 13.0827, 80.2707),
    (Region::East, 22.5726, 88.3639),
    (Region::West, 19.0760, 72.8777),
    (Region::Central, 23.2599, 77.4126),
];

fn coordinates_for(region: Region) -> (f64, f64) {
    REGION_COORDINATES
        .iter()
        .find(|(candidate, _, _)| *candidate == region)
        .map(|(_, lat, lon)| (*lat, *lon))
        .unwrap_or((23.2599, 77.4126))
}

pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    forecast_days: u8,
    timeout_secs: u64,
}

impl OpenWeatherClient {
    pub fn from_config(config: &WeatherConfig) -> Result<Self, AdvisoryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| AdvisoryError::Transport(error.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            forecast_days: config.forecast_days,
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn forecast(&self, region: Region) -> Result<RegionForecast, AdvisoryError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| AdvisoryError::Transport("weather api key missing".to_string()))?;
        let (lat, lon) = coordinates_for(region);
        let url = format!("{}/forecast", self.base_url);
        let sample_count = u32::from(self.forecast_days) * 8;

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", api_key.expose_secret().to_string()),
                ("units", "metric".to_string()),
                ("cnt", sample_count.min(40).to_string()),
            ])
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    AdvisoryError::Timeout { waited_secs: self.timeout_secs }
                } else {
                    AdvisoryError::Transport(error.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AdvisoryError::Quota(format!("{url} returned 429")));
        }
        if !status.is_success() {
            return Err(AdvisoryError::Transport(format!("{url} returned {status}")));
        }

        let parsed: ForecastResponse = response
            .json()
            .await
            .map_err(|error| AdvisoryError::Malformed(error.to_string()))?;

        let samples = parsed
            .list
            .into_iter()
            .map(|entry| ForecastSample {
                timestamp: entry.dt,
                temperature: entry.main.temp,
                humidity: entry.main.humidity,
                rainfall: entry.rain.map(|rain| rain.three_hour).unwrap_or(0.0),
                condition: entry
                    .weather
                    .into_iter()
                    .next()
                    .map(|weather| weather.main)
                    .unwrap_or_else(|| "Unknown".to_string()),
            })
            .collect::<Vec<_>>();

        Ok(RegionForecast {
            region,
            days: aggregate_daily(samples, usize::from(self.forecast_days)),
        })
    }
}

#[derive(Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ForecastEntry>,
}

#[derive(Deserialize)]
struct ForecastEntry {
    dt: i64,
    main: ForecastMain,
    #[serde(default)]
    rain: Option<ForecastRain>,
    #[serde(default)]
    weather: Vec<ForecastWeather>,
}

#[derive(Deserialize)]
struct ForecastMain {
    temp: f64,
    humidity: f64,
}

#[derive(Deserialize)]
struct ForecastRain {
    #[serde(rename = "3h", default)]
    three_hour: f64,
}

#[derive(Deserialize)]
struct ForecastWeather {
    main: String,
}

pub(crate) struct ForecastSample {
    pub timestamp: i64,
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
    pub condition: String,
}

/// Collapses 3-hourly samples into per-day summaries: mean temperature
/// and humidity, summed rainfall, modal condition (ties resolve
/// lexicographically for determinism).
pub(crate) fn aggregate_daily(samples: Vec<ForecastSample>, max_days: usize) -> Vec<DailyForecast> {
    use std::collections::BTreeMap;

    struct DayAccumulator {
        temperatures: Vec<f64>,
        humidities: Vec<f64>,
        rainfall: f64,
        conditions: BTreeMap<String, usize>,
    }

    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    for sample in samples {
        let Some(date) = DateTime::<Utc>::from_timestamp(sample.timestamp, 0) else {
            continue;
        };
        let day = days.entry(date.date_naive()).or_insert_with(|| DayAccumulator {
            temperatures: Vec::new(),
            humidities: Vec::new(),
            rainfall: 0.0,
            conditions: BTreeMap::new(),
        });
        day.temperatures.push(sample.temperature);
        day.humidities.push(sample.humidity);
        day.rainfall += sample.rainfall;
        *day.conditions.entry(sample.condition).or_insert(0) += 1;
    }

    days.into_iter()
        .take(max_days)
        .map(|(date, day)| {
            let sample_count = day.temperatures.len().max(1) as f64;
            let condition = day
                .conditions
                .iter()
                .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
                .map(|(condition, _)| condition.clone())
                .unwrap_or_else(|| "Unknown".to_string());
            DailyForecast {
                date,
                temperature: day.temperatures.iter().sum::<f64>() / sample_count,
                rainfall: day.rainfall,
                humidity: day.humidities.iter().sum::<f64>() / sample_count,
                condition,
            }
        })
        .collect()
}

struct CacheEntry {
    stored_at: Instant,
    forecast: RegionForecast,
}

/// TTL cache keyed by (region, request date) wrapped around any
/// provider, bounding call volume to the hosted service. Explicitly
/// constructed and passed, never a module-level singleton.
pub struct CachedWeatherProvider<P> {
    inner: P,
    ttl: Duration,
    entries: Mutex<HashMap<(Region, NaiveDate), CacheEntry>>,
}

impl<P> CachedWeatherProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self { inner, ttl, entries: Mutex::new(HashMap::new()) }
    }

    fn cached(&self, key: &(Region, NaiveDate)) -> Option<RegionForecast> {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(_) => return None,
        };
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        entries.get(key).map(|entry| entry.forecast.clone())
    }

    fn store(&self, key: (Region, NaiveDate), forecast: RegionForecast) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, CacheEntry { stored_at: Instant::now(), forecast });
        }
    }
}

#[async_trait]
impl<P> WeatherProvider for CachedWeatherProvider<P>
where
    P: WeatherProvider,
{
    async fn forecast(&self, region: Region) -> Result<RegionForecast, AdvisoryError> {
        let key = (region, Utc::now().date_naive());
        if let Some(forecast) = self.cached(&key) {
            return Ok(forecast);
        }

        let forecast = self.inner.forecast(region).await?;
        self.store(key, forecast.clone());
        Ok(forecast)
    }
}
