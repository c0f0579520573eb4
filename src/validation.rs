use serde::Serialize;

/// One rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Collects field errors while a form is being checked.
#[derive(Debug, Default)]
pub struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the trimmed value, recording an error if it is blank.
    pub fn required<'a>(&mut self, field: &'static str, value: &'a str) -> &'a str {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.push(field, "This field is required.");
        }
        trimmed
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Yields `value` only when no error was recorded.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(value())
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_flags_blank_values() {
        let mut c = Checker::new();
        assert_eq!(c.required("a", "  x "), "x");
        assert!(!c.has("a"));
        c.required("b", "   ");
        assert!(c.has("b"));
        let errs = c.finish(|| ()).unwrap_err();
        assert_eq!(errs, vec![FieldError::new("b", "This field is required.")]);
    }

    #[test]
    fn finish_without_errors_returns_value() {
        assert_eq!(Checker::new().finish(|| 7).unwrap(), 7);
    }
}
