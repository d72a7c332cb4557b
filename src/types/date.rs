//! Oracle `DATE` values.

use crate::{
    connection::Connection,
    environment::FormatKind,
    error::{Error, SourceKind},
    handles::ExtSword,
    oci::types::{OciDate, Sb4, Sword, Ub4},
    text::{DbText, TextBuffer},
};

/// An Oracle `DATE`: year to second, no fractional seconds, no time zone.
pub struct Date<'conn, 'env> {
    conn: &'conn Connection<'env>,
    raw: OciDate,
}

impl<'conn, 'env> Date<'conn, 'env> {
    /// Builds a date from its components. The client validates the combination.
    pub fn new(
        conn: &'conn Connection<'env>,
        year: i16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, Error> {
        let date = Date {
            conn,
            raw: OciDate {
                year,
                month,
                day,
                hour,
                minute,
                second,
            },
        };
        let mut valid: u32 = 0;
        let status = unsafe {
            (conn.environment().oci().date_check)(conn.err_ptr(), &date.raw, &mut valid)
        };
        date.resolve(status, "OCIDateCheck", "new")?;
        if valid != 0 {
            let error = Error::InvalidValue {
                argument: "date components",
            };
            conn.environment()
                .raise(&error, SourceKind::Date, "date", None, "new");
            return Err(error);
        }
        Ok(date)
    }

    /// Current date and time of the client host.
    pub fn sys_date(conn: &'conn Connection<'env>) -> Result<Self, Error> {
        let mut raw = OciDate::default();
        let status = unsafe { (conn.environment().oci().date_sys_date)(conn.err_ptr(), &mut raw) };
        let date = Date { conn, raw };
        date.resolve(status, "OCIDateSysDate", "sys_date")?;
        Ok(date)
    }

    /// Parses `text` with the given format, or the connection's date format.
    pub fn from_text(
        conn: &'conn Connection<'env>,
        text: &str,
        format: Option<&str>,
    ) -> Result<Self, Error> {
        let format = format
            .map(str::to_string)
            .unwrap_or_else(|| conn.format(FormatKind::Date));
        let format_text = DbText::new(&format);
        let value_text = DbText::new(text);
        let mut raw = OciDate::default();
        let status = unsafe {
            (conn.environment().oci().date_from_text)(
                conn.err_ptr(),
                value_text.ptr(),
                value_text.len_bytes() as Ub4,
                format_text.ptr(),
                format_text.len_bytes() as u8,
                std::ptr::null(),
                0,
                &mut raw,
            )
        };
        let date = Date { conn, raw };
        date.resolve(status, "OCIDateFromText", "from_text")?;
        Ok(date)
    }

    pub(crate) fn from_raw(conn: &'conn Connection<'env>, raw: OciDate) -> Self {
        Date { conn, raw }
    }

    pub fn year(&self) -> i16 {
        self.raw.year
    }

    pub fn month(&self) -> u8 {
        self.raw.month
    }

    pub fn day(&self) -> u8 {
        self.raw.day
    }

    pub fn hour(&self) -> u8 {
        self.raw.hour
    }

    pub fn minute(&self) -> u8 {
        self.raw.minute
    }

    pub fn second(&self) -> u8 {
        self.raw.second
    }

    /// Formats the date with the given format, or the connection's date format.
    pub fn to_text_with_format(&self, format: Option<&str>) -> Result<String, Error> {
        let format = format
            .map(str::to_string)
            .unwrap_or_else(|| self.conn.format(FormatKind::Date));
        let format_text = DbText::new(&format);
        let mut buffer = TextBuffer::with_capacity(128);
        let mut buf_size: Ub4 = buffer.capacity_bytes();
        let status = unsafe {
            (self.conn.environment().oci().date_to_text)(
                self.conn.err_ptr(),
                &self.raw,
                format_text.ptr(),
                format_text.len_bytes() as u8,
                std::ptr::null(),
                0,
                &mut buf_size,
                buffer.mut_buf_ptr(),
            )
        };
        self.resolve(status, "OCIDateToText", "to_text")?;
        buffer.set_actual_len_bytes(buf_size);
        Ok(buffer.to_utf8())
    }

    pub fn to_text(&self) -> Result<String, Error> {
        self.to_text_with_format(None)
    }

    pub fn add_days(&self, days: i32) -> Result<Date<'conn, 'env>, Error> {
        let mut result = OciDate::default();
        let status = unsafe {
            (self.conn.environment().oci().date_add_days)(
                self.conn.err_ptr(),
                &self.raw,
                days as Sb4,
                &mut result,
            )
        };
        self.resolve(status, "OCIDateAddDays", "add_days")?;
        Ok(Date {
            conn: self.conn,
            raw: result,
        })
    }

    pub fn add_months(&self, months: i32) -> Result<Date<'conn, 'env>, Error> {
        let mut result = OciDate::default();
        let status = unsafe {
            (self.conn.environment().oci().date_add_months)(
                self.conn.err_ptr(),
                &self.raw,
                months as Sb4,
                &mut result,
            )
        };
        self.resolve(status, "OCIDateAddMonths", "add_months")?;
        Ok(Date {
            conn: self.conn,
            raw: result,
        })
    }

    /// Last day of the month this date falls into.
    pub fn last_day(&self) -> Result<Date<'conn, 'env>, Error> {
        let mut result = OciDate::default();
        let status = unsafe {
            (self.conn.environment().oci().date_last_day)(
                self.conn.err_ptr(),
                &self.raw,
                &mut result,
            )
        };
        self.resolve(status, "OCIDateLastDay", "last_day")?;
        Ok(Date {
            conn: self.conn,
            raw: result,
        })
    }

    /// First date after this one falling on the named week day (server language).
    pub fn next_day(&self, day: &str) -> Result<Date<'conn, 'env>, Error> {
        let day_text = DbText::new(day);
        let mut result = OciDate::default();
        let status = unsafe {
            (self.conn.environment().oci().date_next_day)(
                self.conn.err_ptr(),
                &self.raw,
                day_text.ptr(),
                day_text.len_bytes() as Ub4,
                &mut result,
            )
        };
        self.resolve(status, "OCIDateNextDay", "next_day")?;
        Ok(Date {
            conn: self.conn,
            raw: result,
        })
    }

    pub fn days_between(&self, other: &Date<'_, '_>) -> Result<i32, Error> {
        let mut days: Sb4 = 0;
        let status = unsafe {
            (self.conn.environment().oci().date_days_between)(
                self.conn.err_ptr(),
                &self.raw,
                &other.raw,
                &mut days,
            )
        };
        self.resolve(status, "OCIDateDaysBetween", "days_between")?;
        Ok(days)
    }

    pub fn compare(&self, other: &Date<'_, '_>) -> Result<std::cmp::Ordering, Error> {
        let mut result: Sword = 0;
        let status = unsafe {
            (self.conn.environment().oci().date_compare)(
                self.conn.err_ptr(),
                &self.raw,
                &other.raw,
                &mut result,
            )
        };
        self.resolve(status, "OCIDateCompare", "compare")?;
        Ok(result.cmp(&0))
    }

    pub fn assign(&mut self, other: &Date<'_, '_>) -> Result<(), Error> {
        let status = unsafe {
            (self.conn.environment().oci().date_assign)(
                self.conn.err_ptr(),
                &other.raw,
                &mut self.raw,
            )
        };
        self.resolve(status, "OCIDateAssign", "assign")
    }

    fn resolve(
        &self,
        status: Sword,
        function: &'static str,
        location: &'static str,
    ) -> Result<(), Error> {
        self.conn
            .resolve_for(status.into_oci_result(function), SourceKind::Date, "date", location)
    }
}
