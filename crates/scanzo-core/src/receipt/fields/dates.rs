//! Transaction date extraction.

use chrono::NaiveDate;

use crate::receipt::patterns::{DATE_FRENCH_LONG, DATE_NUMERIC};

use super::{ExtractionMatch, FieldExtractor};

/// Date extractor for `14/06/2025`, `03-07-25`, `14.06.2025` and
/// `14 juin 2025`. Numeric dates come first; impossible calendar dates are
/// skipped.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<ExtractionMatch<NaiveDate>> = Vec::new();

        // DD/MM/YYYY, DD-MM-YY, DD.MM.YYYY
        for caps in DATE_NUMERIC.captures_iter(text) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[2].parse().unwrap_or(0);
            let Some(year) = parse_year(&caps[3]) else {
                continue;
            };

            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                let full_match = &caps[0];
                let start = caps.get(0).map_or(0, |m| m.start());
                results.push(
                    ExtractionMatch::new(date, 0.9, full_match)
                        .with_position(start, start + full_match.len()),
                );
            }
        }

        // "14 juin 2025"
        for caps in DATE_FRENCH_LONG.captures_iter(text) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let Some(month) = french_month_to_number(&caps[2]) else {
                continue;
            };
            let year: i32 = caps[3].parse().unwrap_or(0);

            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                if results.iter().any(|r| r.value == date) {
                    continue;
                }

                let full_match = &caps[0];
                let start = caps.get(0).map_or(0, |m| m.start());
                results.push(
                    ExtractionMatch::new(date, 0.85, full_match)
                        .with_position(start, start + full_match.len()),
                );
            }
        }

        results
    }
}

/// Two-digit years are in the 2000s. Other lengths are taken as written,
/// except three digits which is never a year on a ticket.
fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    match s.len() {
        2 => Some(2000 + year),
        4 => Some(year),
        _ => None,
    }
}

fn french_month_to_number(month: &str) -> Option<u32> {
    let month = month.to_lowercase();
    let number = match month.trim_end_matches('.') {
        "janvier" | "janv" => 1,
        "février" | "fevrier" | "févr" | "fev" => 2,
        "mars" => 3,
        "avril" | "avr" => 4,
        "mai" => 5,
        "juin" => 6,
        "juillet" | "juil" => 7,
        "août" | "aout" => 8,
        "septembre" | "sept" => 9,
        "octobre" | "oct" => 10,
        "novembre" | "nov" => 11,
        "décembre" | "déc" | "dec" => 12,
        _ => return None,
    };
    Some(number)
}
