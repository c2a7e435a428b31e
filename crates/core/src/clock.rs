//! Clock capability: the only source of wall-clock time in the core.
//!
//! The instruction assembler embeds a locale-formatted timestamp and the
//! memory store stamps entries with epoch milliseconds. Both read time
//! through this trait so tests can pin it.

use chrono::{DateTime, Local, Locale, TimeZone, Utc};

/// Time source injected into the assembler, memory, and controller.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Current instant as epoch milliseconds.
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }

    /// Human-readable "date at time" line for the caller's locale, with
    /// seconds stripped (e.g. `Monday, October 19, 2026 at 2:45 PM`).
    fn locale_date_time(&self) -> String;
}

/// Render an instant in the given locale: full date, then hour and minute.
pub fn format_locale_date_time<Tz: TimeZone>(instant: &DateTime<Tz>, locale: Locale) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let date = instant.format_localized("%A, %B %-d, %Y", locale);
    let time = instant.format_localized("%-I:%M %p", locale);
    format!("{date} at {time}")
}

/// The process clock, rendering in the local timezone.
#[derive(Debug, Clone)]
pub struct SystemClock {
    locale: Locale,
}

impl SystemClock {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// Build from a POSIX locale name such as `en_US` or `th_TH`.
    /// Unknown names fall back to `en_US`.
    pub fn from_locale_name(name: &str) -> Self {
        let locale = Locale::try_from(name).unwrap_or_else(|_| {
            tracing::warn!(locale = %name, "Unknown locale, falling back to en_US");
            Locale::en_US
        });
        Self::new(locale)
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(Locale::en_US)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn locale_date_time(&self) -> String {
        format_locale_date_time(&Local::now(), self.locale)
    }
}

/// A clock frozen at one instant. Rendered in UTC.
#[derive(Debug, Clone)]
pub struct FixedClock {
    instant: DateTime<Utc>,
    locale: Locale,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant,
            locale: Locale::en_US,
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }

    fn locale_date_time(&self) -> String {
        format_locale_date_time(&self.instant, self.locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn afternoon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 14, 45, 3).unwrap()
    }

    #[test]
    fn fixed_clock_strips_seconds() {
        let clock = FixedClock::new(afternoon());
        let rendered = clock.locale_date_time();
        assert_eq!(rendered, "Monday, October 19, 2026 at 2:45 PM");
        assert!(!rendered.contains(":03"));
    }

    #[test]
    fn fixed_clock_millis() {
        let clock = FixedClock::new(afternoon());
        assert_eq!(clock.now_millis(), afternoon().timestamp_millis());
    }

    #[test]
    fn unknown_locale_falls_back() {
        let clock = SystemClock::from_locale_name("xx_NOPE");
        assert_eq!(clock.locale, Locale::en_US);
    }

    #[test]
    fn thai_locale_renders_thai_weekday() {
        let clock = FixedClock::new(afternoon()).with_locale(Locale::th_TH);
        let rendered = clock.locale_date_time();
        assert!(rendered.contains("2026"));
        assert!(!rendered.contains("Monday"));
    }
}
