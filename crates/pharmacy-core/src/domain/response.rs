//! 약국의 주문 수락/거절 응답.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::pharmacy::PharmacyId;

/// 약국 응답.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PharmacyResponse {
    /// 응답한 약국 ID
    pub pharmacy_id: PharmacyId,
    /// 수락 여부
    pub accepted: bool,
}

impl PharmacyResponse {
    /// 새 응답 생성.
    pub fn new(pharmacy_id: PharmacyId, accepted: bool) -> Self {
        Self {
            pharmacy_id,
            accepted,
        }
    }

    /// 응답 결정.
    pub fn decision(&self) -> Decision {
        if self.accepted {
            Decision::Accepted
        } else {
            Decision::Rejected
        }
    }
}

/// 수락/거절 결정.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Accepted,
    Rejected,
}

impl Decision {
    /// 메트릭 라벨 및 로그용 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Accepted => "accepted",
            Decision::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
