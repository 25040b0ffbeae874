//! Searching for trains with bookable seats.

use tracing::{debug, warn};

use crate::domain::{Quota, StationCode, TrainNumber, TravelClass};

use super::client::{EnquiryClient, Leg, parse_train_number};
use super::error::EnquiryError;
use super::types::{AvailabilityDay, FareBreakdown, JourneyQuery, TrainSummary};

/// A class of a train with seats available on at least one day.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailableOption {
    pub train: TrainSummary,
    pub class: TravelClass,
    /// `None` when the fare enquiry returned no total.
    pub total_fare: Option<f64>,
    /// Only the days with seats available.
    pub days: Vec<AvailabilityDay>,
}

impl EnquiryClient {
    /// Every train and class between two stations with seats available in
    /// the general quota, with its fare.
    ///
    /// Seats and fares are asked for between the stations each train
    /// reports (`fromStnCode`/`toStnCode`), sent as given. A failing enquiry
    /// for one train or class is logged and skipped.
    pub async fn find_available(
        &self,
        query: &JourneyQuery,
    ) -> Result<Vec<AvailableOption>, EnquiryError> {
        let journey = self.leg(query)?;
        let trains: Vec<TrainSummary> = self
            .trains_between(query)
            .await?
            .typed()
            .map_err(EnquiryError::shape)?;

        let mut options = Vec::new();
        for train in &trains {
            let number = match parse_train_number(&train.train_number) {
                Ok(number) => number,
                Err(err) => {
                    warn!(train = %train.train_number, error = %err, "skipping train");
                    continue;
                }
            };
            let leg = train_leg(train, &journey);

            for class in &train.avl_classes {
                match self.available_in_class(train, &number, class, &leg).await {
                    Ok(Some(option)) => options.push(option),
                    Ok(None) => {
                        debug!(train = %train.train_number, class = %class, "no seats available")
                    }
                    Err(err) => warn!(
                        train = %train.train_number,
                        class = %class,
                        error = %err,
                        "skipping class"
                    ),
                }
            }
        }

        Ok(options)
    }

    async fn available_in_class(
        &self,
        train: &TrainSummary,
        number: &TrainNumber,
        class: &str,
        leg: &Leg,
    ) -> Result<Option<AvailableOption>, EnquiryError> {
        let class = TravelClass::parse(class).map_err(|e| EnquiryError::InvalidInput(e.to_string()))?;

        let days: Vec<AvailabilityDay> = self
            .seat_availability_on(number, &class, Quota::General, leg)
            .await?
            .typed()
            .map_err(EnquiryError::shape)?;
        let days: Vec<AvailabilityDay> = days.into_iter().filter(AvailabilityDay::is_available).collect();
        if days.is_empty() {
            return Ok(None);
        }

        let fare: FareBreakdown = self
            .fare_on(number, &class, Quota::General, leg)
            .await?;

        Ok(Some(AvailableOption {
            train: train.clone(),
            class,
            total_fare: fare.total_fare(),
            days,
        }))
    }
}

/// The leg a train actually runs: its own station codes where it reports
/// valid ones, otherwise the searched stations.
fn train_leg(train: &TrainSummary, journey: &Leg) -> Leg {
    Leg {
        source: reported_station(train.from_stn_code.as_deref())
            .unwrap_or_else(|| journey.source.clone()),
        destination: reported_station(train.to_stn_code.as_deref())
            .unwrap_or_else(|| journey.destination.clone()),
        date: journey.date,
    }
}

fn reported_station(code: Option<&str>) -> Option<StationCode> {
    let code = code?;
    match StationCode::parse(code) {
        Ok(code) => Some(code),
        Err(err) => {
            warn!(code, error = %err, "ignoring reported station code");
            None
        }
    }
}
