//! 조건 폴링 결과.

use super::zone::Zone;

/// 폴링 종료 상태. 폴링 호출 사이에 보존되는 상태는 없다.
#[derive(Debug, Clone, PartialEq)]
pub enum PollResult {
    /// 정지 단어 발견: 해당 반복의 모든 존
    Matched(Vec<Zone>),
    /// 제한 시간 초과 (에러가 아닌 정상 결과)
    TimedOut,
}

impl PollResult {
    pub fn is_matched(&self) -> bool {
        matches!(self, PollResult::Matched(_))
    }

    /// 존 목록 (타임아웃이면 빈 목록)
    pub fn into_zones(self) -> Vec<Zone> {
        match self {
            PollResult::Matched(zones) => zones,
            PollResult::TimedOut => Vec::new(),
        }
    }
}
