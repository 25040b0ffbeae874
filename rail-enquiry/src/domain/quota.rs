//! Reservation quota codes.

use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an unknown quota code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown quota code: {0}")]
pub struct UnknownQuota(String);

/// A reservation category accepted by seat availability and fare enquiries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quota {
    #[default]
    General,
    Ladies,
    HeadQuarters,
    Defence,
    ParliamentHouse,
    ForeignTourist,
    DutyPass,
    Tatkal,
    SeniorCitizen,
    PhysicallyHandicapped,
    RailwayEmployee,
    GeneralRoadSide,
    OutStation,
    Pooled,
    PremiumTatkal,
    ReservationAgainstCancellation,
    RoadSide,
    Yuva,
    LowerBerth,
}

impl Quota {
    /// Every quota the enquiry site accepts, in the order it lists them.
    pub const ALL: [Quota; 19] = [
        Quota::General,
        Quota::Ladies,
        Quota::HeadQuarters,
        Quota::Defence,
        Quota::ParliamentHouse,
        Quota::ForeignTourist,
        Quota::DutyPass,
        Quota::Tatkal,
        Quota::SeniorCitizen,
        Quota::PhysicallyHandicapped,
        Quota::RailwayEmployee,
        Quota::GeneralRoadSide,
        Quota::OutStation,
        Quota::Pooled,
        Quota::PremiumTatkal,
        Quota::ReservationAgainstCancellation,
        Quota::RoadSide,
        Quota::Yuva,
        Quota::LowerBerth,
    ];

    /// The code sent upstream as the `quota` parameter.
    pub fn code(self) -> &'static str {
        match self {
            Quota::General => "GN",
            Quota::Ladies => "LD",
            Quota::HeadQuarters => "HO",
            Quota::Defence => "DF",
            Quota::ParliamentHouse => "PH",
            Quota::ForeignTourist => "FT",
            Quota::DutyPass => "DP",
            Quota::Tatkal => "CK",
            Quota::SeniorCitizen => "SS",
            Quota::PhysicallyHandicapped => "HP",
            Quota::RailwayEmployee => "RE",
            Quota::GeneralRoadSide => "GNRS",
            Quota::OutStation => "OS",
            Quota::Pooled => "PQ",
            Quota::PremiumTatkal => "PT",
            Quota::ReservationAgainstCancellation => "RC",
            Quota::RoadSide => "RS",
            Quota::Yuva => "YU",
            Quota::LowerBerth => "LB",
        }
    }

    /// Human-readable description.
    pub fn description(self) -> &'static str {
        match self {
            Quota::General => "General Quota",
            Quota::Ladies => "Ladies Quota",
            Quota::HeadQuarters => "Head quarters/high official Quota",
            Quota::Defence => "Defence Quota",
            Quota::ParliamentHouse => "Parliament house Quota",
            Quota::ForeignTourist => "Foreign Tourist Quota",
            Quota::DutyPass => "Duty Pass Quota",
            Quota::Tatkal => "Tatkal Quota",
            Quota::SeniorCitizen => "Female(above 45 Year)/Senior Citizen/Travelling alone",
            Quota::PhysicallyHandicapped => "Physically Handicapped Quota",
            Quota::RailwayEmployee => "Railway Employee Staff on Duty for the train",
            Quota::GeneralRoadSide => "General Quota Road Side",
            Quota::OutStation => "Out Station",
            Quota::Pooled => "Pooled Quota",
            Quota::PremiumTatkal => "Premium Tatkal Quota",
            Quota::ReservationAgainstCancellation => "Reservation Against Cancellation",
            Quota::RoadSide => "Road Side",
            Quota::Yuva => "Yuva",
            Quota::LowerBerth => "Lower Berth",
        }
    }
}

/// Available quota choices as `(code, description)` pairs.
pub fn quota_choices() -> Vec<(&'static str, &'static str)> {
    Quota::ALL
        .iter()
        .map(|q| (q.code(), q.description()))
        .collect()
}

impl FromStr for Quota {
    type Err = UnknownQuota;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Quota::ALL
            .into_iter()
            .find(|q| q.code() == upper)
            .ok_or(UnknownQuota(s.to_string()))
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_general() {
        assert_eq!(Quota::default(), Quota::General);
        assert_eq!(Quota::default().code(), "GN");
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("ck".parse::<Quota>().unwrap(), Quota::Tatkal);
        assert_eq!("GNRS".parse::<Quota>().unwrap(), Quota::GeneralRoadSide);
        assert!("ZZ".parse::<Quota>().is_err());
    }

    #[test]
    fn codes_are_unique() {
        let mut codes: Vec<_> = Quota::ALL.iter().map(|q| q.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), Quota::ALL.len());
    }

    #[test]
    fn choices_cover_all_quotas() {
        let choices = quota_choices();
        assert_eq!(choices.len(), 19);
        assert_eq!(choices[0], ("GN", "General Quota"));
    }
}
