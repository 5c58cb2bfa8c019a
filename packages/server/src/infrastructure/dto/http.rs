//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use crate::registry::RoomSummary;

/// Summary of one course room
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub course_id: String,
    pub members: Vec<String>,
    pub message_count: usize,
}

impl From<RoomSummary> for RoomSummaryDto {
    fn from(summary: RoomSummary) -> Self {
        Self {
            course_id: summary.course_id.as_str().to_string(),
            members: summary.member_names,
            message_count: summary.message_count,
        }
    }
}
