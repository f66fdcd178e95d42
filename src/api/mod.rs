pub mod attendance;
pub mod salary;
pub mod worker;

use serde::Deserialize;
use utoipa::ToSchema;

/// Body of the archive actions. The period is always explicit.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ArchiveRequest {
    #[schema(example = "January")]
    pub month: String,
    #[schema(example = 2026)]
    pub year: i32,
}
