//! Oracle `TIMESTAMP` values in their three flavours.

use std::ffi::c_void;

use crate::{
    connection::Connection,
    environment::FormatKind,
    error::{Error, Feature, SourceKind},
    handles::ExtSword,
    oci::{
        constants::{OCI_DTYPE_TIMESTAMP, OCI_DTYPE_TIMESTAMP_LTZ, OCI_DTYPE_TIMESTAMP_TZ},
        types::{OciDateTime, Sb1, Sb2, Sword, Ub1, Ub4},
    },
    text::{DbText, TextBuffer},
    types::interval::Interval,
};

/// Flavour of a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampKind {
    Plain,
    WithTimeZone,
    WithLocalTimeZone,
}

impl TimestampKind {
    pub(crate) fn descriptor_type(self) -> u32 {
        match self {
            TimestampKind::Plain => OCI_DTYPE_TIMESTAMP,
            TimestampKind::WithTimeZone => OCI_DTYPE_TIMESTAMP_TZ,
            TimestampKind::WithLocalTimeZone => OCI_DTYPE_TIMESTAMP_LTZ,
        }
    }

    fn format_kind(self) -> FormatKind {
        match self {
            TimestampKind::Plain => FormatKind::Timestamp,
            TimestampKind::WithTimeZone | TimestampKind::WithLocalTimeZone => {
                FormatKind::TimestampTz
            }
        }
    }
}

/// A timestamp descriptor. Created values own the descriptor; fetched ones borrow it from the
/// result set that produced them.
pub struct Timestamp<'conn, 'env> {
    conn: &'conn Connection<'env>,
    handle: *mut OciDateTime,
    kind: TimestampKind,
    allocated: bool,
}

impl<'conn, 'env> Timestamp<'conn, 'env> {
    /// Allocates a timestamp descriptor. Requires a 9.0 or newer client.
    pub fn create(conn: &'conn Connection<'env>, kind: TimestampKind) -> Result<Self, Error> {
        let env = conn.environment();
        require_datetime_support(conn)?;
        let handle = env.counters().alloc_descriptor(
            env.oci(),
            env.env_ptr() as *const c_void,
            kind.descriptor_type(),
        )? as *mut OciDateTime;
        Ok(Timestamp {
            conn,
            handle,
            kind,
            allocated: true,
        })
    }

    pub(crate) fn fetched(
        conn: &'conn Connection<'env>,
        handle: *mut OciDateTime,
        kind: TimestampKind,
    ) -> Self {
        Timestamp {
            conn,
            handle,
            kind,
            allocated: false,
        }
    }

    pub fn kind(&self) -> TimestampKind {
        self.kind
    }

    /// Sets the timestamp from components. `time_zone` is e.g. `+02:00` or `Europe/Paris`; pass
    /// an empty string for the session time zone.
    #[allow(clippy::too_many_arguments)]
    pub fn construct(
        &mut self,
        year: i16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        nanosecond: u32,
        time_zone: &str,
    ) -> Result<(), Error> {
        let construct = self.api(self.conn.environment().oci().datetime_construct)?;
        let tz = DbText::new(time_zone);
        let status = unsafe {
            construct(
                self.conn.environment().env_ptr() as *mut c_void,
                self.conn.err_ptr(),
                self.handle,
                year as Sb2,
                month as Ub1,
                day as Ub1,
                hour as Ub1,
                minute as Ub1,
                second as Ub1,
                nanosecond as Ub4,
                if time_zone.is_empty() {
                    std::ptr::null()
                } else {
                    tz.ptr()
                },
                tz.len_bytes(),
            )
        };
        self.resolve(status, "OCIDateTimeConstruct", "construct")
    }

    /// Current system timestamp of the client host.
    pub fn sys_timestamp(&mut self) -> Result<(), Error> {
        let sys = self.api(self.conn.environment().oci().datetime_sys_timestamp)?;
        let status = unsafe {
            sys(
                self.conn.environment().env_ptr() as *mut c_void,
                self.conn.err_ptr(),
                self.handle,
            )
        };
        self.resolve(status, "OCIDateTimeSysTimeStamp", "sys_timestamp")
    }

    /// Date part: `(year, month, day)`.
    pub fn date(&self) -> Result<(i16, u8, u8), Error> {
        let get_date = self.api(self.conn.environment().oci().datetime_get_date)?;
        let (mut year, mut month, mut day) = (0 as Sb2, 0 as Ub1, 0 as Ub1);
        let status = unsafe {
            get_date(
                self.conn.environment().env_ptr() as *mut c_void,
                self.conn.err_ptr(),
                self.handle,
                &mut year,
                &mut month,
                &mut day,
            )
        };
        self.resolve(status, "OCIDateTimeGetDate", "date")?;
        Ok((year, month, day))
    }

    /// Time part: `(hour, minute, second, nanosecond)`.
    pub fn time(&self) -> Result<(u8, u8, u8, u32), Error> {
        let get_time = self.api(self.conn.environment().oci().datetime_get_time)?;
        let (mut hour, mut minute, mut second, mut nanosecond) =
            (0 as Ub1, 0 as Ub1, 0 as Ub1, 0 as Ub4);
        let status = unsafe {
            get_time(
                self.conn.environment().env_ptr() as *mut c_void,
                self.conn.err_ptr(),
                self.handle,
                &mut hour,
                &mut minute,
                &mut second,
                &mut nanosecond,
            )
        };
        self.resolve(status, "OCIDateTimeGetTime", "time")?;
        Ok((hour, minute, second, nanosecond))
    }

    /// Time zone name, e.g. `Europe/Paris` or `+02:00`.
    pub fn time_zone_name(&self) -> Result<String, Error> {
        let get_name = self.api(self.conn.environment().oci().datetime_get_time_zone_name)?;
        let mut buffer = vec![0u8; 64];
        let mut len: Ub4 = buffer.len() as Ub4;
        let status = unsafe {
            get_name(
                self.conn.environment().env_ptr() as *mut c_void,
                self.conn.err_ptr(),
                self.handle,
                buffer.as_mut_ptr(),
                &mut len,
            )
        };
        self.resolve(status, "OCIDateTimeGetTimeZoneName", "time_zone_name")?;
        buffer.truncate(len as usize);
        // The zone name is plain ASCII even in wide mode.
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Time zone offset as `(hours, minutes)`.
    pub fn time_zone_offset(&self) -> Result<(i8, i8), Error> {
        let get_offset =
            self.api(self.conn.environment().oci().datetime_get_time_zone_offset)?;
        let (mut hours, mut minutes) = (0 as Sb1, 0 as Sb1);
        let status = unsafe {
            get_offset(
                self.conn.environment().env_ptr() as *mut c_void,
                self.conn.err_ptr(),
                self.handle,
                &mut hours,
                &mut minutes,
            )
        };
        self.resolve(status, "OCIDateTimeGetTimeZoneOffset", "time_zone_offset")?;
        Ok((hours, minutes))
    }

    pub fn compare(&self, other: &Timestamp<'_, '_>) -> Result<std::cmp::Ordering, Error> {
        let compare = self.api(self.conn.environment().oci().datetime_compare)?;
        let mut result: Sword = 0;
        let status = unsafe {
            compare(
                self.conn.environment().env_ptr() as *mut c_void,
                self.conn.err_ptr(),
                self.handle,
                other.handle,
                &mut result,
            )
        };
        self.resolve(status, "OCIDateTimeCompare", "compare")?;
        Ok(result.cmp(&0))
    }

    /// Copies `other` into `self`, converting between flavours where they differ.
    pub fn assign(&mut self, other: &Timestamp<'_, '_>) -> Result<(), Error> {
        let oci = self.conn.environment().oci();
        if self.kind == other.kind {
            let assign = self.api(oci.datetime_assign)?;
            let status = unsafe {
                assign(
                    self.conn.environment().env_ptr() as *mut c_void,
                    self.conn.err_ptr(),
                    other.handle,
                    self.handle,
                )
            };
            self.resolve(status, "OCIDateTimeAssign", "assign")
        } else {
            let convert = self.api(oci.datetime_convert)?;
            let status = unsafe {
                convert(
                    self.conn.environment().env_ptr() as *mut c_void,
                    self.conn.err_ptr(),
                    other.handle,
                    self.handle,
                )
            };
            self.resolve(status, "OCIDateTimeConvert", "assign")
        }
    }

    /// Adds an interval, producing a new timestamp of the same flavour.
    pub fn add_interval(&self, interval: &Interval<'_, '_>) -> Result<Timestamp<'conn, 'env>, Error> {
        let add = self.api(self.conn.environment().oci().datetime_interval_add)?;
        let result = Timestamp::create(self.conn, self.kind)?;
        let status = unsafe {
            add(
                self.conn.environment().env_ptr() as *mut c_void,
                self.conn.err_ptr(),
                self.handle,
                interval.handle_ptr(),
                result.handle,
            )
        };
        self.resolve(status, "OCIDateTimeIntervalAdd", "add_interval")?;
        Ok(result)
    }

    /// Subtracts an interval, producing a new timestamp of the same flavour.
    pub fn sub_interval(&self, interval: &Interval<'_, '_>) -> Result<Timestamp<'conn, 'env>, Error> {
        let sub = self.api(self.conn.environment().oci().datetime_interval_sub)?;
        let result = Timestamp::create(self.conn, self.kind)?;
        let status = unsafe {
            sub(
                self.conn.environment().env_ptr() as *mut c_void,
                self.conn.err_ptr(),
                self.handle,
                interval.handle_ptr(),
                result.handle,
            )
        };
        self.resolve(status, "OCIDateTimeIntervalSub", "sub_interval")?;
        Ok(result)
    }

    /// Difference `self - other` as a day-to-second interval.
    pub fn subtract(&self, other: &Timestamp<'_, '_>) -> Result<Interval<'conn, 'env>, Error> {
        let subtract = self.api(self.conn.environment().oci().datetime_subtract)?;
        let result =
            Interval::create(self.conn, crate::types::interval::IntervalKind::DayToSecond)?;
        let status = unsafe {
            subtract(
                self.conn.environment().env_ptr() as *mut c_void,
                self.conn.err_ptr(),
                self.handle,
                other.handle,
                result.handle_ptr(),
            )
        };
        self.resolve(status, "OCIDateTimeSubtract", "subtract")?;
        Ok(result)
    }

    /// Parses `text` with the given format, or the connection's timestamp format.
    pub fn set_from_text(&mut self, text: &str, format: Option<&str>) -> Result<(), Error> {
        let from_text = self.api(self.conn.environment().oci().datetime_from_text)?;
        let format = format
            .map(str::to_string)
            .unwrap_or_else(|| self.conn.format(self.kind.format_kind()));
        let format_text = DbText::new(&format);
        let value_text = DbText::new(text);
        let status = unsafe {
            from_text(
                self.conn.environment().env_ptr() as *mut c_void,
                self.conn.err_ptr(),
                value_text.ptr(),
                value_text.len_bytes(),
                format_text.ptr(),
                format_text.len_bytes() as Ub1,
                std::ptr::null(),
                0,
                self.handle,
            )
        };
        self.resolve(status, "OCIDateTimeFromText", "set_from_text")
    }

    /// Formats the timestamp with the given format, or the connection's timestamp format.
    pub fn to_text_with_format(&self, format: Option<&str>) -> Result<String, Error> {
        let to_text = self.api(self.conn.environment().oci().datetime_to_text)?;
        let format = format
            .map(str::to_string)
            .unwrap_or_else(|| self.conn.format(self.kind.format_kind()));
        let format_text = DbText::new(&format);
        let mut buffer = TextBuffer::with_capacity(128);
        let mut buf_size: Ub4 = buffer.capacity_bytes();
        let status = unsafe {
            to_text(
                self.conn.environment().env_ptr() as *mut c_void,
                self.conn.err_ptr(),
                self.handle,
                format_text.ptr(),
                format_text.len_bytes() as Ub1,
                // Fractional seconds precision used when the format contains `FF`.
                6,
                std::ptr::null(),
                0,
                &mut buf_size,
                buffer.mut_buf_ptr(),
            )
        };
        self.resolve(status, "OCIDateTimeToText", "to_text")?;
        buffer.set_actual_len_bytes(buf_size);
        Ok(buffer.to_utf8())
    }

    pub fn to_text(&self) -> Result<String, Error> {
        self.to_text_with_format(None)
    }

    fn api<T>(&self, entry: Option<T>) -> Result<T, Error> {
        entry.ok_or_else(|| {
            let error = Error::NotAvailable {
                feature: Feature::Timestamps,
            };
            self.conn.environment().raise(
                &error,
                SourceKind::Timestamp,
                "timestamp",
                None,
                "timestamp",
            );
            error
        })
    }

    fn resolve(
        &self,
        status: Sword,
        function: &'static str,
        location: &'static str,
    ) -> Result<(), Error> {
        self.conn.resolve_for(
            status.into_oci_result(function),
            SourceKind::Timestamp,
            "timestamp",
            location,
        )
    }
}

fn require_datetime_support(conn: &Connection<'_>) -> Result<(), Error> {
    if conn.environment().oci().datetime_construct.is_none() {
        let error = Error::NotAvailable {
            feature: Feature::Timestamps,
        };
        conn.environment()
            .raise(&error, SourceKind::Timestamp, "timestamp", None, "create");
        return Err(error);
    }
    Ok(())
}

impl Drop for Timestamp<'_, '_> {
    fn drop(&mut self) {
        if self.allocated {
            let env = self.conn.environment();
            unsafe {
                env.counters().free_descriptor(
                    env.oci(),
                    self.handle as *mut c_void,
                    self.kind.descriptor_type(),
                );
            }
        }
    }
}
