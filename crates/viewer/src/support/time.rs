#![forbid(unsafe_code)]

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// One reading of the UTC clock, rendered the ways API payloads need it.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Stamp(OffsetDateTime);

impl Stamp {
    pub(crate) fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    pub(crate) fn rfc3339(self) -> String {
        self.0
            .format(&Rfc3339)
            .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
    }

    /// Milliseconds since the epoch, clamped to `0..=i64::MAX`.
    pub(crate) fn unix_ms(self) -> i64 {
        let ms = self.0.unix_timestamp_nanos() / 1_000_000;
        i64::try_from(ms.max(0)).unwrap_or(i64::MAX)
    }

    /// `YYYY-MM-DD`, as stamped on exported comparisons.
    pub(crate) fn ymd(self) -> String {
        let at = self.0;
        format!("{:04}-{:02}-{:02}", at.year(), u8::from(at.month()), at.day())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_one_instant_consistently() {
        let stamp = Stamp(OffsetDateTime::from_unix_timestamp(1_704_153_600).unwrap());
        assert_eq!(stamp.ymd(), "2024-01-02");
        assert_eq!(stamp.rfc3339(), "2024-01-02T00:00:00Z");
        assert_eq!(stamp.unix_ms(), 1_704_153_600_000);
    }

    #[test]
    fn pre_epoch_instants_clamp_to_zero() {
        let stamp = Stamp(OffsetDateTime::from_unix_timestamp(-5).unwrap());
        assert_eq!(stamp.unix_ms(), 0);
    }
}
