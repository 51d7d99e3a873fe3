//! 약국 식별자.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::NotifyError;

/// 약국 식별자.
///
/// 클라이언트가 스스로 선언하는 불투명한 문자열 토큰입니다.
/// 디렉토리 검증은 하지 않으며, 같은 문자열이면 같은 약국입니다.
/// 빈 문자열만 거부합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PharmacyId(String);

impl PharmacyId {
    /// 새 약국 식별자를 생성합니다.
    ///
    /// # Errors
    /// 빈 문자열이면 `NotifyError::Validation`을 반환합니다.
    pub fn new(id: impl Into<String>) -> Result<Self, NotifyError> {
        let id = id.into();
        if id.is_empty() {
            return Err(NotifyError::validation("pharmacy_id must not be empty"));
        }
        Ok(Self(id))
    }

    /// 문자열 참조 반환.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PharmacyId {
    type Error = NotifyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PharmacyId> for String {
    fn from(id: PharmacyId) -> Self {
        id.0
    }
}

impl AsRef<str> for PharmacyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PharmacyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
