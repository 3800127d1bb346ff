pub mod calendar;
pub mod claim;
mod clock;
mod errors;
mod metrics;
mod models;
mod policy;
mod repository;
mod service;
mod session;
mod storage;

// Publicly expose the Metrics abstraction
pub use metrics::{Metrics, MetricsPtr};

pub use clock::{Clock, ClockPtr, FixedClock, SystemClock};
pub use errors::{AttendanceError, InsertAttendanceError, StorageError};
pub use models::{
    AttendanceEntry, AttendanceEvent, AttendanceFilter, AttendancePhoto, AttendanceStatus,
    HistoryQuery, NewAttendance, PhotoReference, Role, User, UserSummary, DEFAULT_PHOTO_MIME,
};
pub use policy::PunctualityPolicy;
pub use repository::{Repository, RepositoryPtr};
pub use service::{AttendanceService, RecordedAttendance};
pub use session::{SessionInfo, SessionStore, SessionStorePtr};
pub use storage::{PhotoStorage, PhotoStoragePtr, StoredFile};
