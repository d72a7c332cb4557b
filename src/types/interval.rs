//! Oracle `INTERVAL` values.

use std::ffi::c_void;

use crate::{
    connection::Connection,
    error::{Error, Feature, SourceKind},
    handles::ExtSword,
    oci::{
        constants::{OCI_DTYPE_INTERVAL_DS, OCI_DTYPE_INTERVAL_YM},
        types::{OciIntervalDesc, Sb4, Sword, Ub1},
    },
    text::{DbText, TextBuffer},
};

/// Flavour of an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalKind {
    YearToMonth,
    DayToSecond,
}

impl IntervalKind {
    pub(crate) fn descriptor_type(self) -> u32 {
        match self {
            IntervalKind::YearToMonth => OCI_DTYPE_INTERVAL_YM,
            IntervalKind::DayToSecond => OCI_DTYPE_INTERVAL_DS,
        }
    }
}

/// An interval descriptor. Created values own the descriptor; fetched ones borrow it.
pub struct Interval<'conn, 'env> {
    conn: &'conn Connection<'env>,
    handle: *mut OciIntervalDesc,
    kind: IntervalKind,
    allocated: bool,
}

impl<'conn, 'env> Interval<'conn, 'env> {
    /// Allocates an interval descriptor. Requires a 9.0 or newer client.
    pub fn create(conn: &'conn Connection<'env>, kind: IntervalKind) -> Result<Self, Error> {
        if conn.environment().oci().interval_set_day_second.is_none() {
            let error = Error::NotAvailable {
                feature: Feature::Intervals,
            };
            conn.environment()
                .raise(&error, SourceKind::Interval, "interval", None, "create");
            return Err(error);
        }
        let env = conn.environment();
        let handle = env.counters().alloc_descriptor(
            env.oci(),
            env.env_ptr() as *const c_void,
            kind.descriptor_type(),
        )? as *mut OciIntervalDesc;
        Ok(Interval {
            conn,
            handle,
            kind,
            allocated: true,
        })
    }

    pub(crate) fn fetched(
        conn: &'conn Connection<'env>,
        handle: *mut OciIntervalDesc,
        kind: IntervalKind,
    ) -> Self {
        Interval {
            conn,
            handle,
            kind,
            allocated: false,
        }
    }

    pub fn kind(&self) -> IntervalKind {
        self.kind
    }

    /// Sets a day-to-second interval from components.
    pub fn set_day_second(
        &mut self,
        days: i32,
        hours: i32,
        minutes: i32,
        seconds: i32,
        nanoseconds: i32,
    ) -> Result<(), Error> {
        self.expect_kind(IntervalKind::DayToSecond, "set_day_second")?;
        let set = self.api(self.conn.environment().oci().interval_set_day_second)?;
        let status = unsafe {
            set(
                self.conn.environment().env_ptr() as *mut c_void,
                self.conn.err_ptr(),
                days,
                hours,
                minutes,
                seconds,
                nanoseconds,
                self.handle,
            )
        };
        self.resolve(status, "OCIIntervalSetDaySecond", "set_day_second")
    }

    /// Day-to-second components: `(days, hours, minutes, seconds, nanoseconds)`.
    pub fn day_second(&self) -> Result<(i32, i32, i32, i32, i32), Error> {
        self.expect_kind(IntervalKind::DayToSecond, "day_second")?;
        let get = self.api(self.conn.environment().oci().interval_get_day_second)?;
        let (mut days, mut hours, mut minutes, mut seconds, mut nanos) =
            (0 as Sb4, 0 as Sb4, 0 as Sb4, 0 as Sb4, 0 as Sb4);
        let status = unsafe {
            get(
                self.conn.environment().env_ptr() as *mut c_void,
                self.conn.err_ptr(),
                &mut days,
                &mut hours,
                &mut minutes,
                &mut seconds,
                &mut nanos,
                self.handle,
            )
        };
        self.resolve(status, "OCIIntervalGetDaySecond", "day_second")?;
        Ok((days, hours, minutes, seconds, nanos))
    }

    /// Sets a year-to-month interval from components.
    pub fn set_year_month(&mut self, years: i32, months: i32) -> Result<(), Error> {
        self.expect_kind(IntervalKind::YearToMonth, "set_year_month")?;
        let set = self.api(self.conn.environment().oci().interval_set_year_month)?;
        let status = unsafe {
            set(
                self.conn.environment().env_ptr() as *mut c_void,
                self.conn.err_ptr(),
                years,
                months,
                self.handle,
            )
        };
        self.resolve(status, "OCIIntervalSetYearMonth", "set_year_month")
    }

    /// Year-to-month components: `(years, months)`.
    pub fn year_month(&self) -> Result<(i32, i32), Error> {
        self.expect_kind(IntervalKind::YearToMonth, "year_month")?;
        let get = self.api(self.conn.environment().oci().interval_get_year_month)?;
        let (mut years, mut months) = (0 as Sb4, 0 as Sb4);
        let status = unsafe {
            get(
                self.conn.environment().env_ptr() as *mut c_void,
                self.conn.err_ptr(),
                &mut years,
                &mut months,
                self.handle,
            )
        };
        self.resolve(status, "OCIIntervalGetYearMonth", "year_month")?;
        Ok((years, months))
    }

    pub fn add(&self, other: &Interval<'_, '_>) -> Result<Interval<'conn, 'env>, Error> {
        let add = self.api(self.conn.environment().oci().interval_add)?;
        let result = Interval::create(self.conn, self.kind)?;
        let status = unsafe {
            add(
                self.conn.environment().env_ptr() as *mut c_void,
                self.conn.err_ptr(),
                self.handle,
                other.handle,
                result.handle,
            )
        };
        self.resolve(status, "OCIIntervalAdd", "add")?;
        Ok(result)
    }

    pub fn subtract(&self, other: &Interval<'_, '_>) -> Result<Interval<'conn, 'env>, Error> {
        let subtract = self.api(self.conn.environment().oci().interval_subtract)?;
        let result = Interval::create(self.conn, self.kind)?;
        let status = unsafe {
            subtract(
                self.conn.environment().env_ptr() as *mut c_void,
                self.conn.err_ptr(),
                self.handle,
                other.handle,
                result.handle,
            )
        };
        self.resolve(status, "OCIIntervalSubtract", "subtract")?;
        Ok(result)
    }

    pub fn compare(&self, other: &Interval<'_, '_>) -> Result<std::cmp::Ordering, Error> {
        let compare = self.api(self.conn.environment().oci().interval_compare)?;
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
        self.resolve(status, "OCIIntervalCompare", "compare")?;
        Ok(result.cmp(&0))
    }

    pub fn assign(&mut self, other: &Interval<'_, '_>) -> Result<(), Error> {
        let assign = self.api(self.conn.environment().oci().interval_assign)?;
        let status = unsafe {
            assign(
                self.conn.environment().env_ptr() as *mut c_void,
                self.conn.err_ptr(),
                other.handle,
                self.handle,
            )
        };
        self.resolve(status, "OCIIntervalAssign", "assign")
    }

    /// Parses an interval literal, e.g. `P1DT2H` or `1-3`.
    pub fn set_from_text(&mut self, text: &str) -> Result<(), Error> {
        let from_text = self.api(self.conn.environment().oci().interval_from_text)?;
        let value_text = DbText::new(text);
        let status = unsafe {
            from_text(
                self.conn.environment().env_ptr() as *mut c_void,
                self.conn.err_ptr(),
                value_text.ptr(),
                value_text.len_bytes(),
                self.handle,
            )
        };
        self.resolve(status, "OCIIntervalFromText", "set_from_text")
    }

    pub fn to_text(&self) -> Result<String, Error> {
        let to_text = self.api(self.conn.environment().oci().interval_to_text)?;
        let mut buffer = TextBuffer::with_capacity(64);
        let mut result_len: usize = 0;
        let status = unsafe {
            to_text(
                self.conn.environment().env_ptr() as *mut c_void,
                self.conn.err_ptr(),
                self.handle,
                // Leading field and fractional second precisions.
                9 as Ub1,
                9 as Ub1,
                buffer.mut_buf_ptr(),
                buffer.capacity_bytes() as usize,
                &mut result_len,
            )
        };
        self.resolve(status, "OCIIntervalToText", "to_text")?;
        buffer.set_actual_len_bytes(result_len as u32);
        Ok(buffer.to_utf8())
    }

    pub(crate) fn handle_ptr(&self) -> *mut OciIntervalDesc {
        self.handle
    }

    fn expect_kind(&self, expected: IntervalKind, location: &'static str) -> Result<(), Error> {
        if self.kind != expected {
            let error = Error::TypeMismatch {
                from: "interval flavour",
                to: "requested components",
            };
            self.conn.environment().raise(
                &error,
                SourceKind::Interval,
                "interval",
                None,
                location,
            );
            return Err(error);
        }
        Ok(())
    }

    fn api<T>(&self, entry: Option<T>) -> Result<T, Error> {
        entry.ok_or_else(|| {
            let error = Error::NotAvailable {
                feature: Feature::Intervals,
            };
            self.conn.environment().raise(
                &error,
                SourceKind::Interval,
                "interval",
                None,
                "interval",
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
            SourceKind::Interval,
            "interval",
            location,
        )
    }
}

impl Drop for Interval<'_, '_> {
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
