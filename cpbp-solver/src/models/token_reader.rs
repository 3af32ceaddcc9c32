use std::path::Path;

use crate::CpbpError;
use crate::CpbpResult;

/// Reads whitespace-separated tokens one at a time; line breaks carry no meaning.
#[derive(Debug, Clone)]
pub struct TokenReader {
    tokens: Vec<String>,
    position: usize,
}

impl TokenReader {
    pub fn new(content: &str) -> Self {
        TokenReader {
            tokens: content.split_whitespace().map(str::to_owned).collect(),
            position: 0,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> CpbpResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(TokenReader::new(&content))
    }

    /// The number of tokens read so far.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn next_integer(&mut self) -> CpbpResult<i32> {
        let position = self.position;
        let token = self.next_token()?;
        token.parse::<i32>().map_err(|_| {
            CpbpError::malformed_input(position, format!("expected an integer, got '{token}'"))
        })
    }

    /// Reads a score, which has to be a finite non-negative number.
    pub fn next_score(&mut self) -> CpbpResult<f64> {
        let position = self.position;
        let token = self.next_token()?;
        match token.parse::<f64>() {
            Ok(score) if score.is_finite() && score >= 0.0 => Ok(score),
            _ => Err(CpbpError::malformed_input(
                position,
                format!("expected a non-negative score, got '{token}'"),
            )),
        }
    }

    fn next_token(&mut self) -> CpbpResult<&str> {
        let token = self
            .tokens
            .get(self.position)
            .ok_or_else(|| CpbpError::malformed_input(self.position, "unexpected end of input"))?;
        self.position += 1;
        Ok(token.as_str())
    }
}
