#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Price(f64);

impl Price {
    pub fn parse(value: f64) -> Result<Price, String> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(format!("{} is not a valid subscription price.", value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}
