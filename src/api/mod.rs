// ==========================================
// Competition Scheduler - API Layer
// ==========================================
// Workflow entry points over the engine + repositories.
// Enforces the schedule lock and the publish gate.
// ==========================================

pub mod error;
pub mod publish_api;
pub mod scheduling_api;
pub mod snapshot;

pub use error::{ApiError, ApiResult};
pub use publish_api::{FinalizeResponse, LateNumberResponse, PublishApi, PublishResponse};
pub use scheduling_api::{
    AutoScheduleResponse, ClearResponse, ManualAssignRequest, ManualAssignResponse, SchedulingApi,
    ValidationReport,
};
pub use snapshot::{ScheduleSnapshot, SnapshotLoader};
