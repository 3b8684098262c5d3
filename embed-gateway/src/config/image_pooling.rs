use std::str::FromStr;

use crate::error_handler::{ConfigError, EmbedError};

/// Rule that reduces the visual encoder's last hidden state
/// (`tokens × dim`) to a single vector.
///
/// The rule is fixed for the lifetime of the process: every image query,
/// uploaded or otherwise, must use the same one or the resulting vectors
/// are not comparable with the indexed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImagePooling {
    /// First positional token (`[CLS]`) of the last hidden layer.
    #[default]
    Cls,
    /// Mean over all tokens.
    Mean,
}

impl ImagePooling {
    /// Applies the rule to a `tokens × dim` matrix.
    ///
    /// # Errors
    /// [`EmbedError::Encoding`] if there are no tokens or rows differ in length.
    pub fn apply(self, hidden: Vec<Vec<f32>>) -> Result<Vec<f32>, EmbedError> {
        let dim = match hidden.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => {
                return Err(EmbedError::Encoding(
                    "encoder returned an empty hidden state".into(),
                ));
            }
        };
        if hidden.iter().any(|row| row.len() != dim) {
            return Err(EmbedError::Encoding(
                "encoder returned ragged hidden state rows".into(),
            ));
        }

        match self {
            ImagePooling::Cls => Ok(hidden.into_iter().next().unwrap_or_default()),
            ImagePooling::Mean => {
                let n = hidden.len() as f32;
                let mut acc = vec![0.0f32; dim];
                for row in &hidden {
                    for (a, x) in acc.iter_mut().zip(row) {
                        *a += x;
                    }
                }
                acc.iter_mut().for_each(|a| *a /= n);
                Ok(acc)
            }
        }
    }
}

impl FromStr for ImagePooling {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cls" | "first" => Ok(ImagePooling::Cls),
            "mean" | "avg" => Ok(ImagePooling::Mean),
            other => Err(ConfigError::UnsupportedPooling(other.to_string())),
        }
    }
}
