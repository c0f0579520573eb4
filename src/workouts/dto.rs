use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date};

use super::repo_types::{NewWorkout, Workout};
use crate::validation::{Checker, FieldError};

/// Raw body of `POST /log`; every field arrives as text and is checked by [`WorkoutForm::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkoutForm {
    #[serde(default)]
    pub exercise: String,
    #[serde(default)]
    pub reps: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub date: String,
}

impl WorkoutForm {
    pub fn validate(&self) -> Result<NewWorkout, Vec<FieldError>> {
        let mut c = Checker::new();

        let exercise = c.required("exercise", &self.exercise);

        let reps_raw = c.required("reps", &self.reps);
        let mut reps = 0;
        if !c.has("reps") {
            match reps_raw.parse::<i32>() {
                Ok(n) if n > 0 => reps = n,
                Ok(_) => c.push("reps", "Reps must be a positive number."),
                Err(_) => c.push("reps", "Not a valid integer value."),
            }
        }

        let weight_raw = c.required("weight", &self.weight);
        let mut weight = 0.0;
        if !c.has("weight") {
            match weight_raw.parse::<f64>() {
                Ok(w) if w.is_finite() => weight = w,
                _ => c.push("weight", "Not a valid float value."),
            }
        }

        let date_raw = c.required("date", &self.date);
        let mut date = Date::MIN;
        if !c.has("date") {
            match parse_date(date_raw) {
                Ok(d) => date = d,
                Err(_) => c.push("date", "Not a valid date value."),
            }
        }

        c.finish(|| NewWorkout {
            exercise: exercise.to_string(),
            reps,
            weight,
            date,
        })
    }
}

/// One plotted point on the dashboard chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: String,
    pub reps: i32,
    pub weight: f64,
}

impl From<&Workout> for ChartPoint {
    fn from(w: &Workout) -> Self {
        Self {
            date: format_date(w.date),
            reps: w.reps,
            weight: w.weight,
        }
    }
}

/// One CSV data row, in header order.
#[derive(Debug, Serialize)]
pub struct ExportRow<'a> {
    pub date: String,
    pub exercise: &'a str,
    pub reps: i32,
    pub weight: f64,
}

impl<'a> From<&'a Workout> for ExportRow<'a> {
    fn from(w: &'a Workout) -> Self {
        Self {
            date: format_date(w.date),
            exercise: &w.exercise,
            reps: w.reps,
            weight: w.weight,
        }
    }
}

pub fn parse_date(raw: &str) -> Result<Date, time::error::Parse> {
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
}

/// `YYYY-MM-DD`, the same shape the form accepts.
pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn form(exercise: &str, reps: &str, weight: &str, date: &str) -> WorkoutForm {
        WorkoutForm {
            exercise: exercise.into(),
            reps: reps.into(),
            weight: weight.into(),
            date: date.into(),
        }
    }

    fn failed_fields(f: &WorkoutForm) -> Vec<&'static str> {
        f.validate().unwrap_err().into_iter().map(|e| e.field).collect()
    }

    #[test]
    fn valid_form_is_parsed() {
        let w = form(" Squat ", "5", "100.5", "2024-01-01").validate().unwrap();
        assert_eq!(
            w,
            NewWorkout {
                exercise: "Squat".into(),
                reps: 5,
                weight: 100.5,
                date: date!(2024 - 01 - 01),
            }
        );
    }

    #[test]
    fn every_bad_field_is_reported() {
        assert_eq!(
            failed_fields(&form("", "0", "heavy", "01/02/2024")),
            vec!["exercise", "reps", "weight", "date"]
        );
    }

    #[test]
    fn reps_must_be_positive_integer() {
        assert_eq!(failed_fields(&form("Row", "-3", "10", "2024-01-01")), vec!["reps"]);
        assert_eq!(failed_fields(&form("Row", "2.5", "10", "2024-01-01")), vec!["reps"]);
    }

    #[test]
    fn weight_must_be_finite() {
        assert_eq!(failed_fields(&form("Row", "3", "NaN", "2024-01-01")), vec!["weight"]);
        assert_eq!(failed_fields(&form("Row", "3", "inf", "2024-01-01")), vec!["weight"]);
        assert!(form("Pull-up", "3", "0", "2024-01-01").validate().is_ok());
    }

    #[test]
    fn no_bounds_beyond_the_form_fields() {
        assert!(form("Deadlift", "100000", "9999.9", "2999-12-31").validate().is_ok());
    }

    #[test]
    fn impossible_dates_are_rejected() {
        assert_eq!(failed_fields(&form("Row", "3", "10", "2024-02-30")), vec!["date"]);
    }

    #[test]
    fn chart_point_formats_date() {
        let w = Workout {
            id: 1,
            user_id: 1,
            exercise: "Squat".into(),
            reps: 5,
            weight: 100.0,
            date: date!(2024 - 01 - 02),
        };
        let p = ChartPoint::from(&w);
        assert_eq!(p.date, "2024-01-02");
        assert_eq!((p.reps, p.weight), (5, 100.0));
    }
}
