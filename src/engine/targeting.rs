//! Pure targeting matcher
//!
//! A client matches when every present constraint holds: gender must be
//! included by the target (ALL covers both), the age range is inclusive on
//! both ends, and location compares as an exact string. Absent fields
//! constrain nothing, so empty targeting matches everyone.

use crate::models::{Client, Targeting};

pub fn matches(client: &Client, targeting: &Targeting) -> bool {
    if let Some(gender) = targeting.gender {
        if !gender.includes(client.gender) {
            return false;
        }
    }
    if let Some(age_from) = targeting.age_from {
        if client.age < age_from {
            return false;
        }
    }
    if let Some(age_to) = targeting.age_to {
        if client.age > age_to {
            return false;
        }
    }
    if let Some(location) = &targeting.location {
        if client.location != *location {
            return false;
        }
    }
    true
}
