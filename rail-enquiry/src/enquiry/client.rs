//! Enquiry HTTP client.
//!
//! Every enquiry goes to the same `CommonCaptcha` endpoint, told apart by
//! `inputPage`, and must carry the answer to a captcha issued earlier along
//! with the cookies that came with it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::COOKIE;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::captcha::{CaptchaError, CaptchaSolver, RetryPolicy, TextRecognizer};
use crate::domain::{Pnr, Quota, StationCode, TrainNumber, TravelClass, format_journey_date};
use crate::live::LiveStatus;
use crate::reference::{self, ReferenceClient, StationList, TrainList};
use crate::table::Records;

use super::config::EnquiryConfig;
use super::error::EnquiryError;
use super::page::EnquiryPage;
use super::session::{Session, store_cookies};
use super::types::{FareBreakdown, JourneyQuery};

/// Number of matches returned by station and train searches.
const SEARCH_LIMIT: usize = 5;

/// Configured defaults with their stations resolved to codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedDefaults {
    pub source: Option<StationCode>,
    pub destination: Option<StationCode>,
    pub date: Option<NaiveDate>,
}

/// Stations and date of one journey, already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Leg {
    pub source: StationCode,
    pub destination: StationCode,
    pub date: NaiveDate,
}

/// Client for the railway enquiry site.
///
/// Holds the station and train reference lists and the current captcha
/// session. The session is established lazily (or eagerly by
/// [`EnquiryClient::connect`]) and renewed once whenever the site reports
/// it expired.
pub struct EnquiryClient {
    http: reqwest::Client,
    base_url: String,
    live_base_url: String,
    solver: CaptchaSolver,
    retry: RetryPolicy,
    stations: StationList,
    trains: TrainList,
    defaults: ResolvedDefaults,
    session: Mutex<Option<Arc<Session>>>,
}

impl EnquiryClient {
    /// Load the reference lists (from cache, or downloading them) and
    /// establish a first session.
    pub async fn connect(
        config: EnquiryConfig,
        recognizer: Arc<dyn TextRecognizer>,
    ) -> Result<Self, EnquiryError> {
        let http = build_http(config.timeout_secs)?;
        let references = ReferenceClient::new(http.clone(), config.base_url.clone());

        let (stations, trains) = futures::try_join!(
            reference::load_or_fetch::<StationCode>(&references, &config.cache_dir),
            reference::load_or_fetch::<TrainNumber>(&references, &config.cache_dir),
        )?;

        let client = Self::assemble(http, config, recognizer, stations, trains)?;
        client.refresh_session().await?;
        Ok(client)
    }

    /// Build a client around reference lists the caller already has.
    ///
    /// Does no network I/O; the first query establishes the session.
    pub fn with_references(
        config: EnquiryConfig,
        recognizer: Arc<dyn TextRecognizer>,
        stations: StationList,
        trains: TrainList,
    ) -> Result<Self, EnquiryError> {
        let http = build_http(config.timeout_secs)?;
        Self::assemble(http, config, recognizer, stations, trains)
    }

    fn assemble(
        http: reqwest::Client,
        config: EnquiryConfig,
        recognizer: Arc<dyn TextRecognizer>,
        stations: StationList,
        trains: TrainList,
    ) -> Result<Self, EnquiryError> {
        let resolve = |query: Option<&str>| {
            query
                .map(|q| resolve_station(&stations, q))
                .transpose()
        };
        let defaults = ResolvedDefaults {
            source: resolve(config.defaults.source.as_deref())?,
            destination: resolve(config.defaults.destination.as_deref())?,
            date: config.defaults.date,
        };

        Ok(Self {
            http,
            base_url: config.base_url,
            live_base_url: config.live_base_url,
            solver: CaptchaSolver::new(recognizer),
            retry: config.retry,
            stations,
            trains,
            defaults,
            session: Mutex::new(None),
        })
    }

    pub fn stations(&self) -> &StationList {
        &self.stations
    }

    pub fn trains(&self) -> &TrainList {
        &self.trains
    }

    pub fn defaults(&self) -> &ResolvedDefaults {
        &self.defaults
    }

    /// Resolve a station code or name to a code.
    pub fn station_code(&self, query: &str) -> Result<StationCode, EnquiryError> {
        resolve_station(&self.stations, query)
    }

    /// The best matching station entries, best first.
    pub fn search_station(&self, query: &str) -> Vec<&str> {
        self.stations
            .search(query, SEARCH_LIMIT)
            .into_iter()
            .map(|m| m.entry)
            .collect()
    }

    /// The best matching train entries, best first.
    pub fn search_train(&self, query: &str) -> Vec<&str> {
        self.trains
            .search(query, SEARCH_LIMIT)
            .into_iter()
            .map(|m| m.entry)
            .collect()
    }

    // Sessions

    /// Replace the current session with a freshly established one.
    pub async fn refresh_session(&self) -> Result<(), EnquiryError> {
        let mut current = self.session.lock().await;
        *current = Some(Arc::new(self.establish_session().await?));
        Ok(())
    }

    async fn session(&self) -> Result<Arc<Session>, EnquiryError> {
        let mut current = self.session.lock().await;
        if let Some(session) = current.as_ref() {
            return Ok(Arc::clone(session));
        }

        let session = Arc::new(self.establish_session().await?);
        *current = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Replace `stale` unless someone already has.
    async fn renew_session(&self, stale: &Arc<Session>) -> Result<Arc<Session>, EnquiryError> {
        let mut current = self.session.lock().await;
        if let Some(session) = current.as_ref()
            && !Arc::ptr_eq(session, stale)
        {
            return Ok(Arc::clone(session));
        }

        let session = Arc::new(self.establish_session().await?);
        *current = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Fetch and solve captchas until one is readable or the retry policy
    /// runs out.
    async fn establish_session(&self) -> Result<Session, EnquiryError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.try_establish_session().await {
                Ok(session) => {
                    info!(attempt, "established enquiry session");
                    return Ok(session);
                }
                Err(EnquiryError::Captcha(err)) if attempt < max_attempts => {
                    let delay = self.retry.backoff(attempt);
                    warn!(attempt, error = %err, ?delay, "captcha not solved, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(EnquiryError::Captcha(err)) => {
                    return Err(CaptchaError::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(err),
                    }
                    .into());
                }
                Err(other) => return Err(other),
            }
        }
    }

    async fn try_establish_session(&self) -> Result<Session, EnquiryError> {
        let timestamp = Utc::now().timestamp_millis();
        let url = format!("{}/captchaDraw.png?{}", self.base_url, timestamp);

        let response = ensure_success(self.http.get(&url).send().await?).await?;
        let cookies = Arc::new(Jar::default());
        store_cookies(&cookies, &response);
        let image = response.bytes().await?;

        let solver = self.solver.clone();
        let answer = tokio::task::spawn_blocking(move || solver.solve(&image))
            .await
            .map_err(|e| CaptchaError::Ocr(format!("captcha task failed: {}", e)))??;

        Ok(Session::new(timestamp, answer, cookies))
    }

    // Queries

    async fn send_query(
        &self,
        page: EnquiryPage,
        params: &[(&'static str, String)],
        session: &Session,
    ) -> Result<Value, EnquiryError> {
        let mut query: Vec<(&str, String)> = vec![
            ("inputCaptcha", session.captcha_answer().to_string()),
            ("inputPage", page.input_page().to_string()),
            ("language", "en".to_string()),
        ];
        query.extend(params.iter().cloned());
        query.push(("_", session.timestamp().to_string()));

        let url = format!("{}/CommonCaptcha", self.base_url);
        let mut request = self.http.get(&url).query(&query).build()?;
        if let Some(cookie) = session.cookie_header(request.url()) {
            request.headers_mut().insert(COOKIE, cookie);
        }

        debug!(page = page.input_page(), "sending enquiry");
        let response = ensure_success(self.http.execute(request).await?).await?;
        let body = response.text().await?;

        let value: Value =
            serde_json::from_str(&body).map_err(|e| EnquiryError::json(&e, &body))?;
        page.extract(value)
    }

    /// Send an enquiry, renewing the session and retrying once if the site
    /// says it expired.
    async fn run_query(
        &self,
        page: EnquiryPage,
        params: &[(&'static str, String)],
    ) -> Result<Value, EnquiryError> {
        let session = self.session().await?;

        match self.send_query(page, params, &session).await {
            Err(EnquiryError::SessionExpired) => {
                warn!(page = page.input_page(), "session expired, renewing");
                let session = self.renew_session(&session).await?;
                self.send_query(page, params, &session).await
            }
            other => other,
        }
    }

    async fn list_query(
        &self,
        page: EnquiryPage,
        params: &[(&'static str, String)],
    ) -> Result<Records, EnquiryError> {
        let result = self.run_query(page, params).await?;
        Records::from_value(page.columns(), result).ok_or_else(|| {
            EnquiryError::MalformedResponse {
                page: page.input_page(),
                reason: "result is not a list".to_string(),
            }
        })
    }

    /// Trains running between two stations on a date.
    pub async fn trains_between(&self, query: &JourneyQuery) -> Result<Records, EnquiryError> {
        let source = self.source(query)?;
        let destination = self.destination(query)?;
        let date = self.journey_date(query)?;

        let params = [
            ("dt", format_journey_date(date)),
            ("sourceStation", source.to_string()),
            ("destinationStation", destination.to_string()),
            ("flexiWithDate", "y".to_string()),
        ];
        self.list_query(EnquiryPage::TrainsBetween, &params).await
    }

    /// Seat availability of a train over the days around the journey date.
    pub async fn seat_availability(
        &self,
        train_no: &TrainNumber,
        class: &TravelClass,
        quota: Quota,
        query: &JourneyQuery,
    ) -> Result<Records, EnquiryError> {
        let leg = self.leg(query)?;
        self.seat_availability_on(train_no, class, quota, &leg).await
    }

    pub(crate) async fn seat_availability_on(
        &self,
        train_no: &TrainNumber,
        class: &TravelClass,
        quota: Quota,
        leg: &Leg,
    ) -> Result<Records, EnquiryError> {
        let params = self.booking_params(train_no, class, quota, leg)?;
        self.list_query(EnquiryPage::SeatAvailability, &params)
            .await
    }

    /// Fare components for a class and quota.
    pub async fn fare(
        &self,
        train_no: &TrainNumber,
        class: &TravelClass,
        quota: Quota,
        query: &JourneyQuery,
    ) -> Result<FareBreakdown, EnquiryError> {
        let leg = self.leg(query)?;
        self.fare_on(train_no, class, quota, &leg).await
    }

    pub(crate) async fn fare_on(
        &self,
        train_no: &TrainNumber,
        class: &TravelClass,
        quota: Quota,
        leg: &Leg,
    ) -> Result<FareBreakdown, EnquiryError> {
        let params = self.booking_params(train_no, class, quota, leg)?;
        let result = self.run_query(EnquiryPage::Fare, &params).await?;

        let fare = FareBreakdown::from_response(&result);
        if fare.is_empty() {
            return Err(EnquiryError::MalformedResponse {
                page: EnquiryPage::Fare.input_page(),
                reason: "no fare fields".to_string(),
            });
        }
        Ok(fare)
    }

    /// Stations a train calls at, starting from the source station.
    pub async fn train_schedule(
        &self,
        train_no: &TrainNumber,
        query: &JourneyQuery,
    ) -> Result<Records, EnquiryError> {
        let source = self.source(query)?;
        let date = self.journey_date(query)?;

        let params = [
            ("trainNo", train_no.to_string()),
            ("journeyDate", format_journey_date(date)),
            ("sourceStation", source.to_string()),
        ];
        self.list_query(EnquiryPage::Schedule, &params).await
    }

    /// Booking status of a PNR, as the site returns it.
    pub async fn pnr_status(&self, pnr: &Pnr) -> Result<Map<String, Value>, EnquiryError> {
        let params = [("inputPnrNo", pnr.as_str().to_string())];

        match self.run_query(EnquiryPage::Pnr, &params).await? {
            Value::Object(map) => Ok(map),
            _ => Err(EnquiryError::MalformedResponse {
                page: EnquiryPage::Pnr.input_page(),
                reason: "expected a JSON object".to_string(),
            }),
        }
    }

    /// Live running status of a train.
    ///
    /// The live site needs no captcha, only cookies from a search page
    /// visited first.
    pub async fn train_status(&self, train_no: &TrainNumber) -> Result<LiveStatus, EnquiryError> {
        let cookies = Jar::default();

        let search_url = format!("{}/SearchTrain", self.live_base_url);
        let response = self
            .http
            .get(&search_url)
            .query(&[("trainNo", train_no.as_str())])
            .send()
            .await?;
        store_cookies(&cookies, &ensure_success(response).await?);

        let data_url = format!("{}/NTES", self.live_base_url);
        let mut request = self
            .http
            .get(&data_url)
            .query(&[("action", "getTrainData"), ("trainNo", train_no.as_str())])
            .build()?;
        if let Some(cookie) = cookies.cookies(request.url()) {
            request.headers_mut().insert(COOKIE, cookie);
        }

        let response = ensure_success(self.http.execute(request).await?).await?;
        let body = response.text().await?;
        debug!(train = %train_no, bytes = body.len(), "fetched live status");

        Ok(LiveStatus::parse(&body)?)
    }

    // Parameters

    fn booking_params(
        &self,
        train_no: &TrainNumber,
        class: &TravelClass,
        quota: Quota,
        leg: &Leg,
    ) -> Result<[(&'static str, String); 6], EnquiryError> {
        let entry = self.train_entry(train_no)?;

        Ok([
            ("trainNo", entry.to_string()),
            ("classc", class.as_str().to_string()),
            ("quota", quota.code().to_string()),
            ("dt", format_journey_date(leg.date)),
            ("sourceStation", leg.source.to_string()),
            ("destinationStation", leg.destination.to_string()),
        ])
    }

    /// The full `"NUMBER - NAME"` entry the site expects as `trainNo`.
    fn train_entry(&self, train_no: &TrainNumber) -> Result<&str, EnquiryError> {
        self.trains
            .get(train_no)
            .ok_or_else(|| EnquiryError::UnknownTrain(train_no.to_string()))
    }

    /// Resolve both stations and the date of a query, falling back to the
    /// configured defaults.
    pub(crate) fn leg(&self, query: &JourneyQuery) -> Result<Leg, EnquiryError> {
        Ok(Leg {
            source: self.source(query)?,
            destination: self.destination(query)?,
            date: self.journey_date(query)?,
        })
    }

    fn source(&self, query: &JourneyQuery) -> Result<StationCode, EnquiryError> {
        self.station_or_default(query.source.as_deref(), &self.defaults.source)
            .ok_or(EnquiryError::MissingParameter("source station"))?
    }

    fn destination(&self, query: &JourneyQuery) -> Result<StationCode, EnquiryError> {
        self.station_or_default(query.destination.as_deref(), &self.defaults.destination)
            .ok_or(EnquiryError::MissingParameter("destination station"))?
    }

    fn journey_date(&self, query: &JourneyQuery) -> Result<NaiveDate, EnquiryError> {
        query
            .date
            .or(self.defaults.date)
            .ok_or(EnquiryError::MissingParameter("journey date"))
    }

    fn station_or_default(
        &self,
        given: Option<&str>,
        default: &Option<StationCode>,
    ) -> Option<Result<StationCode, EnquiryError>> {
        match given {
            Some(query) => Some(self.station_code(query)),
            None => default.clone().map(Ok),
        }
    }
}

impl fmt::Debug for EnquiryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnquiryClient")
            .field("base_url", &self.base_url)
            .field("live_base_url", &self.live_base_url)
            .field("stations", &self.stations.len())
            .field("trains", &self.trains.len())
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

fn build_http(timeout_secs: u64) -> Result<reqwest::Client, EnquiryError> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

fn resolve_station(stations: &StationList, query: &str) -> Result<StationCode, EnquiryError> {
    stations
        .resolve(query)
        .cloned()
        .ok_or_else(|| EnquiryError::UnknownStation(query.to_string()))
}

pub(crate) fn parse_train_number(train_no: &str) -> Result<TrainNumber, EnquiryError> {
    TrainNumber::parse(train_no).map_err(|e| EnquiryError::InvalidInput(e.to_string()))
}

/// Turn a non-2xx response into an API error carrying its body.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, EnquiryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(EnquiryError::Api {
        status: status.as_u16(),
        message,
    })
}
