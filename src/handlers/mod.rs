// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod attendance;
mod auth;
mod consent;
mod health;
mod metrics;
mod photos;
mod root;
mod shared_types;

// Core handlers
pub use health::health_check;
pub use metrics::{metrics_handler, track_http_requests};
pub use root::root_handler;

// Attendance API
pub use attendance::{list_attendance, submit_attendance};
pub use photos::{upload_photo, view_photo};

// Storage consent
pub use consent::{consent_url, oauth_callback};

