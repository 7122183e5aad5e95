use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Days before renewal on which a reminder goes out.
///
/// Non-empty, strictly positive and free of duplicates, so at most one
/// offset can match a given day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderOffsets(Vec<u32>);

impl ReminderOffsets {
    pub fn parse(offsets: Vec<i64>) -> Result<ReminderOffsets, String> {
        if offsets.is_empty() {
            return Err("At least one reminder offset is required.".into());
        }
        let mut days_before = Vec::with_capacity(offsets.len());
        for offset in offsets {
            let days = u32::try_from(offset)
                .ok()
                .filter(|days| *days > 0)
                .ok_or_else(|| format!("{} is not a positive number of days.", offset))?;
            if days_before.contains(&days) {
                return Err(format!("Reminder offset {} is listed more than once.", days));
            }
            days_before.push(days);
        }
        Ok(Self(days_before))
    }

    pub fn days(&self) -> &[u32] {
        &self.0
    }
}

impl Default for ReminderOffsets {
    fn default() -> Self {
        Self(vec![7, 5, 2, 1])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ReminderLabel {
    days_before: u32,
}

impl ReminderLabel {
    pub fn days_before(&self) -> u32 {
        self.days_before
    }
}

impl std::fmt::Display for ReminderLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.days_before {
            1 => write!(f, "1 day before reminder"),
            days => write!(f, "{} days before reminder", days),
        }
    }
}

pub fn day_of(now: DateTime<Utc>) -> NaiveDate {
    now.naive_utc().date()
}

pub fn evaluate(
    renewal_date: NaiveDate,
    today: NaiveDate,
    offsets: &ReminderOffsets,
) -> Option<ReminderLabel> {
    offsets
        .days()
        .iter()
        .copied()
        .find(|days| {
            renewal_date.checked_sub_signed(Duration::days(i64::from(*days))) == Some(today)
        })
        .map(|days_before| ReminderLabel { days_before })
}
