//! 지역 조회: IP 주소를 사람이 읽는 지역 라벨로 변환
//!
//! 엔진은 구체 구현(MaxMind DB 등)을 모르고 [`GeoLookup`] trait만 사용합니다.
//! 테스트에서는 고정 테이블을 반환하는 구현으로 대체할 수 있습니다.

/// IP 주소 → 지역 라벨 조회 인터페이스
///
/// 조회는 읽기 전용이며 여러 질의에서 동시에 호출될 수 있습니다.
pub trait GeoLookup: Send + Sync {
    /// 주소의 지역 라벨을 반환합니다.
    ///
    /// 주소가 IP로 파싱되지 않거나 데이터베이스에 없으면 `None`입니다.
    /// 반환 라벨은 "국가 행정구역 도시" 중 알려진 부분만 공백으로 이은 문자열입니다.
    fn area(&self, address: &str) -> Option<String>;
}

/// 조회 결과를 이벤트에 넣을 문자열로 바꿉니다. 실패는 빈 문자열입니다.
pub fn area_or_empty(lookup: Option<&dyn GeoLookup>, address: &str) -> String {
    lookup
        .and_then(|geo| geo.area(address))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedLookup;

    impl GeoLookup for FixedLookup {
        fn area(&self, address: &str) -> Option<String> {
            (address == "1.2.3.4").then(|| "Korea Seoul".to_owned())
        }
    }

    #[test]
    fn area_or_empty_uses_lookup() {
        let geo = FixedLookup;
        assert_eq!(area_or_empty(Some(&geo), "1.2.3.4"), "Korea Seoul");
        assert_eq!(area_or_empty(Some(&geo), "9.9.9.9"), "");
    }

    #[test]
    fn area_or_empty_without_lookup_is_empty() {
        assert_eq!(area_or_empty(None, "1.2.3.4"), "");
    }
}
