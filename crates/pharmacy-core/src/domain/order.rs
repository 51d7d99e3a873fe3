//! 주문 알림 요청 및 정규화.
//!
//! 트리거 엔드포인트로 들어오는 원시 요청([`NotifyRequest`])을 검증하여
//! 브로드캐스트 가능한 [`OrderNotification`]으로 변환합니다.
//!
//! # 정규화 규칙
//!
//! - `pharmacy_id`: 비어있지 않은 문자열
//! - `drugs`: 문자열 배열 또는 줄바꿈으로 구분된 단일 문자열 (빈 줄 제거)
//! - `total`: 정수, 정수값 실수, 또는 숫자 문자열 (범위 검증 없음)

use serde::{Deserialize, Serialize};

use super::pharmacy::PharmacyId;
use crate::error::{NotifyError, NotifyResult};

/// 약품 목록 입력.
///
/// 이미 분리된 배열이거나 줄바꿈으로 구분된 텍스트입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DrugsInput {
    /// 분리된 약품명 목록
    List(Vec<String>),
    /// 줄바꿈 구분 텍스트
    Text(String),
}

impl DrugsInput {
    /// 순서를 유지한 약품명 목록으로 정규화합니다.
    ///
    /// 텍스트는 `\n`과 `\r\n`을 모두 줄바꿈으로 보고 나눕니다.
    /// 빈 줄과 공백만 있는 줄은 약품명으로 취급하지 않으므로,
    /// `"A\n\nB"`는 `["A", "B"]`가 되고 `"\n"`만 있으면 빈 목록이 됩니다.
    /// 배열 입력은 그대로 사용합니다.
    pub fn normalize(self) -> Vec<String> {
        match self {
            DrugsInput::List(drugs) => drugs,
            DrugsInput::Text(text) => text
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl From<Vec<String>> for DrugsInput {
    fn from(drugs: Vec<String>) -> Self {
        DrugsInput::List(drugs)
    }
}

impl From<&str> for DrugsInput {
    fn from(text: &str) -> Self {
        DrugsInput::Text(text.to_string())
    }
}

/// 주문 총액 입력.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TotalInput {
    /// 정수
    Integer(i64),
    /// 실수 (소수부가 없어야 함)
    Float(f64),
    /// 숫자 문자열
    Text(String),
}

impl TotalInput {
    /// 총액을 정수로 변환합니다.
    ///
    /// 빈 문자열은 값이 없는 것으로 간주하여 `Ok(None)`을 반환합니다.
    pub fn coerce(self) -> NotifyResult<Option<i64>> {
        match self {
            TotalInput::Integer(value) => Ok(Some(value)),
            TotalInput::Float(value) => float_to_total(value).map(Some),
            TotalInput::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Ok(None);
                }
                if let Ok(value) = text.parse::<i64>() {
                    return Ok(Some(value));
                }
                match text.parse::<f64>() {
                    Ok(value) => float_to_total(value).map(Some),
                    Err(_) => Err(NotifyError::validation(format!(
                        "Invalid total: {:?} is not a number",
                        text
                    ))),
                }
            }
        }
    }
}

impl From<i64> for TotalInput {
    fn from(value: i64) -> Self {
        TotalInput::Integer(value)
    }
}

fn float_to_total(value: f64) -> NotifyResult<i64> {
    // i64::MAX as f64는 2^63으로 올림되므로 상한은 미만 비교
    if !value.is_finite() || value.fract() != 0.0 || value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(NotifyError::validation(format!(
            "Invalid total: {} is not an integer amount",
            value
        )));
    }
    Ok(value as i64)
}

/// 트리거 엔드포인트 요청 본문.
///
/// 모든 필드는 선택적으로 역직렬화한 뒤 [`NotifyRequest::into_notification`]에서
/// 검증합니다. 누락 필드에 대해 일관된 에러 메시지를 반환하기 위함입니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct NotifyRequest {
    /// 대상 약국 ID
    #[serde(default)]
    pub pharmacy_id: Option<String>,
    /// 약품 목록 (배열 또는 줄바꿈 구분 문자열)
    #[serde(default)]
    #[cfg_attr(feature = "utoipa-support", schema(value_type = Object))]
    pub drugs: Option<DrugsInput>,
    /// 주문 총액 (정수 화폐 단위)
    #[serde(default)]
    #[cfg_attr(feature = "utoipa-support", schema(value_type = Object))]
    pub total: Option<TotalInput>,
}

impl NotifyRequest {
    /// 요청 생성 헬퍼.
    pub fn new(
        pharmacy_id: impl Into<String>,
        drugs: impl Into<DrugsInput>,
        total: impl Into<TotalInput>,
    ) -> Self {
        Self {
            pharmacy_id: Some(pharmacy_id.into()),
            drugs: Some(drugs.into()),
            total: Some(total.into()),
        }
    }

    /// 요청을 검증하고 주문 알림으로 변환합니다.
    ///
    /// # Errors
    /// 필드가 누락되었거나 형식이 잘못되면 `NotifyError::Validation`을 반환합니다.
    pub fn into_notification(self) -> NotifyResult<OrderNotification> {
        let pharmacy_id = match self.pharmacy_id {
            Some(id) if !id.is_empty() => PharmacyId::new(id)?,
            _ => return Err(NotifyError::missing_fields()),
        };

        let drugs = self.drugs.map(DrugsInput::normalize).unwrap_or_default();
        if drugs.is_empty() {
            return Err(NotifyError::missing_fields());
        }

        let total = match self.total {
            Some(total) => total.coerce()?,
            None => None,
        };
        let Some(total) = total else {
            return Err(NotifyError::missing_fields());
        };

        Ok(OrderNotification {
            pharmacy_id,
            drugs,
            total,
        })
    }
}

/// 약국으로 전송되는 주문 알림.
///
/// 저장되지 않으며 디스패치 동안에만 존재합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderNotification {
    /// 대상 약국 ID
    pub pharmacy_id: PharmacyId,
    /// 약품명 목록 (순서 유지)
    pub drugs: Vec<String>,
    /// 주문 총액 (정수 화폐 단위)
    pub total: i64,
}
