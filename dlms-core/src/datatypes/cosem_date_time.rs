//! COSEM DateTime type for DLMS/COSEM protocol

use crate::error::{DlmsError, DlmsResult};
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::fmt;

/// Deviation value meaning "not specified" (0x8000 on the wire)
pub const DEVIATION_NOT_SPECIFIED: i16 = i16::MIN;

/// Field value meaning "not specified" for the one-byte fields
pub const NOT_SPECIFIED: u8 = 0xFF;

/// Class representing a COSEM date-time (12 octets)
///
/// Layout: year (2 bytes, big-endian), month, day of month, day of week,
/// hour, minute, second, hundredths, deviation (2 bytes), clock status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CosemDateTime {
    year: u16,
    month: u8,
    day_of_month: u8,
    day_of_week: u8,
    hour: u8,
    minute: u8,
    second: u8,
    hundredths: u8,
    deviation: i16,
    clock_status: u8,
}

impl CosemDateTime {
    pub const LENGTH: usize = 12;

    /// Constructs a COSEM DateTime with all details
    ///
    /// # Arguments
    ///
    /// * `month` - 1 to 12, or 0xff if not specified
    /// * `day_of_week` - 1 to 7, or 0xff if not specified
    /// * `deviation` - minutes from local time to GMT (-720 to 720), or `DEVIATION_NOT_SPECIFIED`
    #[allow(clippy::too_many_arguments)]
    pub fn new_with_details(
        year: u16,
        month: u8,
        day_of_month: u8,
        day_of_week: u8,
        hour: u8,
        minute: u8,
        second: u8,
        hundredths: u8,
        deviation: i16,
        clock_status: u8,
    ) -> DlmsResult<Self> {
        check_field("month", month, 1, 12)?;
        check_field("day of month", day_of_month, 1, 31)?;
        check_field("day of week", day_of_week, 1, 7)?;
        check_field("hour", hour, 0, 23)?;
        check_field("minute", minute, 0, 59)?;
        check_field("second", second, 0, 59)?;
        check_field("hundredths", hundredths, 0, 99)?;
        Self::validate_deviation(deviation)?;

        Ok(Self {
            year,
            month,
            day_of_month,
            day_of_week,
            hour,
            minute,
            second,
            hundredths,
            deviation,
            clock_status,
        })
    }

    /// Convert a Unix timestamp (seconds) to a UTC COSEM date-time
    ///
    /// Day of week is left unspecified, hundredths are zero, the deviation is
    /// unspecified and the clock status is zero.
    pub fn from_unix_utc(seconds: u64) -> DlmsResult<Self> {
        let utc = i64::try_from(seconds)
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .ok_or_else(|| {
                DlmsError::InvalidData(format!("Timestamp {} is out of calendar range", seconds))
            })?;

        let year = u16::try_from(utc.year())
            .ok()
            .filter(|year| *year != u16::MAX)
            .ok_or_else(|| {
                DlmsError::InvalidData(format!("Year {} does not fit a COSEM date", utc.year()))
            })?;

        Self::new_with_details(
            year,
            utc.month() as u8,
            utc.day() as u8,
            NOT_SPECIFIED,
            utc.hour() as u8,
            utc.minute() as u8,
            utc.second() as u8,
            0,
            DEVIATION_NOT_SPECIFIED,
            0,
        )
    }

    /// Decode a COSEM DateTime from a byte array
    pub fn decode(octet_string: &[u8]) -> DlmsResult<Self> {
        if octet_string.len() != Self::LENGTH {
            return Err(DlmsError::InvalidData(format!(
                "Array has an invalid length. Expected {}, got {}",
                Self::LENGTH,
                octet_string.len()
            )));
        }

        Self::new_with_details(
            u16::from_be_bytes([octet_string[0], octet_string[1]]),
            octet_string[2],
            octet_string[3],
            octet_string[4],
            octet_string[5],
            octet_string[6],
            octet_string[7],
            octet_string[8],
            i16::from_be_bytes([octet_string[9], octet_string[10]]),
            octet_string[11],
        )
    }

    /// Encode to the 12-octet wire form
    pub fn encode(&self) -> [u8; Self::LENGTH] {
        let year = self.year.to_be_bytes();
        let deviation = self.deviation.to_be_bytes();
        [
            year[0],
            year[1],
            self.month,
            self.day_of_month,
            self.day_of_week,
            self.hour,
            self.minute,
            self.second,
            self.hundredths,
            deviation[0],
            deviation[1],
            self.clock_status,
        ]
    }

    fn validate_deviation(deviation: i16) -> DlmsResult<()> {
        if !(-720..=720).contains(&deviation) && deviation != DEVIATION_NOT_SPECIFIED {
            Err(DlmsError::InvalidData(format!(
                "Deviation is out of range [-720, 720], got {}",
                deviation
            )))
        } else {
            Ok(())
        }
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day_of_month(&self) -> u8 {
        self.day_of_month
    }

    pub fn day_of_week(&self) -> u8 {
        self.day_of_week
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    pub fn hundredths(&self) -> u8 {
        self.hundredths
    }

    pub fn deviation(&self) -> i16 {
        self.deviation
    }

    pub fn clock_status(&self) -> u8 {
        self.clock_status
    }
}

fn check_field(name: &str, value: u8, low: u8, high: u8) -> DlmsResult<()> {
    if value == NOT_SPECIFIED || (low..=high).contains(&value) {
        Ok(())
    } else {
        Err(DlmsError::InvalidData(format!(
            "{} is out of range [{}, {}], got {}",
            name, low, high, value
        )))
    }
}

impl fmt::Display for CosemDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day_of_month, self.hour, self.minute, self.second
        )
    }
}
