//! Policy constants for completion, grading and reporting

/// Minimum watched percentage for a video to count as completed
pub const VIDEO_COMPLETION_THRESHOLD: f64 = 90.0;

/// Minimum combined reading score for a PDF to count as completed
pub const PDF_COMPLETION_THRESHOLD: f64 = 80.0;
pub const PDF_MIN_TIME_THRESHOLD_SECS: f64 = 30.0;
pub const PDF_SECONDS_PER_PAGE: f64 = 10.0;
pub const PDF_PAGES_WEIGHT: f64 = 0.6;
pub const PDF_TIME_WEIGHT: f64 = 0.4;

/// Quiz pass mark, inclusive
pub const QUIZ_PASS_THRESHOLD_PERCENT: f64 = 70.0;

/// Progress records with a risk score strictly above this are at risk
pub const AT_RISK_THRESHOLD: i32 = 70;

pub const RECENT_WINDOW_DAYS: i64 = 30;
pub const MONTHLY_HISTOGRAM_MONTHS: u32 = 6;
pub const TOP_COURSES_LIMIT: i64 = 5;
pub const RECENT_ORGANIZATIONS_LIMIT: i64 = 5;

/// Catalog price in cents: base plus a per-module charge
pub const COURSE_BASE_PRICE_CENTS: i64 = 9999;
pub const COURSE_PRICE_PER_MODULE_CENTS: i64 = 4999;
