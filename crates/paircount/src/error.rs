// We define separate error types within the public and the internal crate:
// `paircount_nostd_internal` mostly reports problems with `&'static str`
// (it can't allocate a formatted message), and this crate wraps those
// messages, while attaching the name of the offending argument.
//
// The public type is opaque. Callers can query the broad category of a
// failure, and the Display impl names the argument and the problem.

use paircount_nostd_internal::OutOfDomain;

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

/// Broad classification of an [`Error`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A problem with the arguments that is detected before any pair gets
    /// examined (e.g. unsorted thresholds or mismatched array lengths).
    Configuration,
    /// A point lies outside of a non-periodic domain (or has a non-finite
    /// coordinate).
    Domain,
}

/// The underlying internal error type
#[non_exhaustive]
#[derive(Clone, Debug)]
enum ErrorKind {
    /// A problematic argument, described by a message from the internal crate
    Argument(ArgumentError),
    /// An integer lies outside of the acceptable range of values
    IntegerRange(IntegerRangeError),
    /// A jackknife label lies outside of the valid range
    JackknifeLabel(JackknifeLabelError),
    /// An array's length doesn't match the number of points
    LengthMismatch(LengthMismatchError),
    /// A point lies outside of the domain
    OutOfDomain(OutOfDomainError),
    /// The dedicated thread pool couldn't be constructed
    ThreadPool(ThreadPoolError),
}

// define constructor methods for Error
impl Error {
    /// produce an error indicating that `who` is problematic for the reason
    /// described by `what` (usually, a message from the internal crate)
    pub(crate) fn argument(who: &'static str, what: &'static str) -> Self {
        Error {
            kind: ErrorKind::Argument(ArgumentError { who, what }),
        }
    }

    /// produce an error indicating that an integer lies outside the acceptable
    /// range of values
    pub(crate) fn integer_range(
        description: &'static str,
        actual: i64,
        min_val: i64,
        max_val: i64,
    ) -> Self {
        Error {
            kind: ErrorKind::IntegerRange(IntegerRangeError {
                description,
                actual,
                min_val,
                max_val,
            }),
        }
    }

    pub(crate) fn jackknife_label(
        sample: &'static str,
        index: usize,
        label: u32,
        n_regions: usize,
    ) -> Self {
        Error {
            kind: ErrorKind::JackknifeLabel(JackknifeLabelError {
                sample,
                index,
                label,
                n_regions,
            }),
        }
    }

    /// produce an error indicating that `who` holds `actual` entries, rather
    /// than one entry per point
    pub(crate) fn length_mismatch(who: &'static str, expected: usize, actual: usize) -> Self {
        Error {
            kind: ErrorKind::LengthMismatch(LengthMismatchError {
                who,
                expected,
                actual,
            }),
        }
    }

    pub(crate) fn out_of_domain(sample: &'static str, err: OutOfDomain) -> Self {
        Error {
            kind: ErrorKind::OutOfDomain(OutOfDomainError { sample, err }),
        }
    }

    pub(crate) fn thread_pool(message: String) -> Self {
        Error {
            kind: ErrorKind::ThreadPool(ThreadPoolError(message)),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self.kind {
            ErrorKind::OutOfDomain(_) => ErrorCategory::Domain,
            _ => ErrorCategory::Configuration,
        }
    }
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for ErrorKind {}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            ErrorKind::Argument(ref err) => err.fmt(f),
            ErrorKind::IntegerRange(ref err) => err.fmt(f),
            ErrorKind::JackknifeLabel(ref err) => err.fmt(f),
            ErrorKind::LengthMismatch(ref err) => err.fmt(f),
            ErrorKind::OutOfDomain(ref err) => err.fmt(f),
            ErrorKind::ThreadPool(ref err) => err.fmt(f),
        }
    }
}

#[derive(Clone, Debug)]
struct ArgumentError {
    who: &'static str,
    what: &'static str,
}

impl std::error::Error for ArgumentError {}

impl core::fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let ArgumentError { who, what } = self;
        write!(f, "problem with {who}: {what}")
    }
}

/// An error that occurs when an integer lies outside of the acceptable
/// range of values
#[derive(Clone, Debug)]
struct IntegerRangeError {
    description: &'static str,
    actual: i64,
    min_val: i64,
    max_val: i64,
}

impl std::error::Error for IntegerRangeError {}

impl core::fmt::Display for IntegerRangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{} has a value of {}. The value should be no less than {} and \
             not exceed {}",
            self.description, self.actual, self.min_val, self.max_val
        )
    }
}

#[derive(Clone, Debug)]
struct JackknifeLabelError {
    sample: &'static str,
    index: usize,
    label: u32,
    n_regions: usize,
}

impl std::error::Error for JackknifeLabelError {}

impl core::fmt::Display for JackknifeLabelError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "point {} of {} has the jackknife label {}. Labels must lie \
             between 1 and {}",
            self.index, self.sample, self.label, self.n_regions
        )
    }
}

#[derive(Clone, Debug)]
struct LengthMismatchError {
    who: &'static str,
    expected: usize,
    actual: usize,
}

impl std::error::Error for LengthMismatchError {}

impl core::fmt::Display for LengthMismatchError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{} has {} entries. It should have {} entries (1 per point)",
            self.who, self.actual, self.expected
        )
    }
}

#[derive(Clone, Debug)]
struct OutOfDomainError {
    sample: &'static str,
    err: OutOfDomain,
}

impl std::error::Error for OutOfDomainError {}

impl core::fmt::Display for OutOfDomainError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let OutOfDomain {
            point,
            axis,
            value,
            length,
        } = self.err;
        let axis_name = ["x", "y", "z"][axis];
        if value.is_finite() {
            write!(
                f,
                "point {point} of {} has the {axis_name} coordinate {value}, which \
                 lies outside of the non-periodic domain [0, {length}]",
                self.sample
            )
        } else {
            write!(
                f,
                "point {point} of {} has a non-finite {axis_name} coordinate ({value})",
                self.sample
            )
        }
    }
}

#[derive(Clone, Debug)]
struct ThreadPoolError(String);

impl std::error::Error for ThreadPoolError {}

impl core::fmt::Display for ThreadPoolError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unable to build the thread pool: {}", self.0)
    }
}
