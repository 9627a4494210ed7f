/// Shortest accepted symptom description, counted on the trimmed text.
pub const MIN_SYMPTOM_CHARS: usize = 3;

/// Longest accepted symptom description, counted on the text as supplied.
pub const MAX_SYMPTOM_CHARS: usize = 2000;

/// Errors that can occur when creating validated text types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymptomTextError {
    /// The input text was empty or contained only whitespace
    #[error("Symptoms cannot be empty. Please describe your symptoms.")]
    Empty,
    /// The trimmed input was shorter than [`MIN_SYMPTOM_CHARS`]
    #[error("Symptom description is too short. Please provide more details.")]
    TooShort,
    /// The input exceeded [`MAX_SYMPTOM_CHARS`]
    #[error("Symptom description is too long. Please keep it under 2000 characters.")]
    TooLong,
}

/// A symptom description that has passed input validation.
///
/// The wrapped text is kept exactly as supplied (it is embedded verbatim into the model prompt);
/// only the length checks look at the trimmed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomText(String);

impl SymptomText {
    /// Creates a new `SymptomText` from the given input.
    ///
    /// # Arguments
    ///
    /// * `input` - Any type that can be converted to a string reference
    ///
    /// # Errors
    ///
    /// Returns [`SymptomTextError::Empty`] for blank input, [`SymptomTextError::TooShort`] when
    /// the trimmed text has fewer than 3 characters and [`SymptomTextError::TooLong`] when the
    /// text has more than 2000 characters.
    pub fn new(input: impl AsRef<str>) -> Result<Self, SymptomTextError> {
        let raw = input.as_ref();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SymptomTextError::Empty);
        }
        if trimmed.chars().count() < MIN_SYMPTOM_CHARS {
            return Err(SymptomTextError::TooShort);
        }
        if raw.chars().count() > MAX_SYMPTOM_CHARS {
            return Err(SymptomTextError::TooLong);
        }
        Ok(Self(raw.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SymptomText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SymptomText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> serde::Deserialize<'de> for SymptomText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SymptomText::new(&s).map_err(serde::de::Error::custom)
    }
}
