//! 라인 분류 및 이벤트 파싱
//!
//! 필터를 통과한 라인을 세 가지 형태 중 하나로 분류하고,
//! 공백으로 나눈 토큰의 고정 위치에서 필드를 꺼냅니다.
//!
//! | 형태               | method | user | address | port | 결과    |
//! |--------------------|--------|------|---------|------|---------|
//! | accepted           | 6      | 8    | 10      | 12   | success |
//! | failed password    | 6      | 8    | 10      | 12   | failed  |
//! | connection closed  | 8      | 10   | 11      | 13   | failed  |
//!
//! 분류는 failed password → connection closed → accepted 순으로 검사합니다.
//! 토큰이 [`MIN_TOKENS`]개 미만인 라인은 이벤트도 카운트도 만들지 않습니다.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use authpost_core::types::{AuthEvent, Outcome};

use crate::filter::{ACCEPTED_MARKER, CONNECTION_CLOSED_MARKER, FAILED_PASSWORD_MARKER};

/// 이벤트로 인정하는 최소 토큰 수
pub const MIN_TOKENS: usize = 14;

/// 실패 메시지 구분자
const MESSAGE_SEPARATOR: &str = ": ";

/// 연도를 붙인 syslog 타임스탬프 형식
const TIMESTAMP_FORMAT: &str = "%Y %b %d %H:%M:%S";

/// 인증 라인 형태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineShape {
    /// `Failed password for ...`
    FailedPassword,
    /// `Connection closed by authenticating user ...`
    ConnectionClosed,
    /// `Accepted <method> for ...`
    Accepted,
}

#[derive(Debug, Clone, Copy)]
struct FieldOffsets {
    method: usize,
    user: usize,
    address: usize,
    port: usize,
}

impl LineShape {
    /// 마커로 라인 형태를 판별합니다.
    pub fn classify(line: &str) -> Option<Self> {
        if line.contains(FAILED_PASSWORD_MARKER) {
            Some(Self::FailedPassword)
        } else if line.contains(CONNECTION_CLOSED_MARKER) {
            Some(Self::ConnectionClosed)
        } else if line.contains(ACCEPTED_MARKER) {
            Some(Self::Accepted)
        } else {
            None
        }
    }

    pub fn outcome(self) -> Outcome {
        match self {
            Self::Accepted => Outcome::Success,
            Self::FailedPassword | Self::ConnectionClosed => Outcome::Failure,
        }
    }

    fn offsets(self) -> FieldOffsets {
        match self {
            Self::Accepted | Self::FailedPassword => FieldOffsets {
                method: 6,
                user: 8,
                address: 10,
                port: 12,
            },
            Self::ConnectionClosed => FieldOffsets {
                method: 8,
                user: 10,
                address: 11,
                port: 13,
            },
        }
    }
}

/// 원시 라인에서 꺼낸 필드 (라인을 빌려 씀)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    pub shape: LineShape,
    pub month: &'a str,
    pub day: &'a str,
    pub time: &'a str,
    pub user: &'a str,
    pub address: &'a str,
    pub port: &'a str,
    pub auth_method: &'a str,
    /// 실패 형태의 `": "` 뒤 텍스트, 성공이면 빈 문자열
    pub message: &'a str,
}

impl ParsedLine<'_> {
    pub fn outcome(&self) -> Outcome {
        self.shape.outcome()
    }

    /// 원본 날짜 토큰 (`"Jan 2 03:04:05"`)
    pub fn raw_date(&self) -> String {
        format!("{} {} {}", self.month, self.day, self.time)
    }

    /// 페이지 창에 든 라인을 이벤트로 만듭니다.
    pub fn into_event(self, timestamp: Option<DateTime<FixedOffset>>, area: String) -> AuthEvent {
        AuthEvent {
            timestamp,
            raw_date: self.raw_date(),
            user: self.user.to_owned(),
            address: self.address.to_owned(),
            port: self.port.to_owned(),
            auth_method: self.auth_method.to_owned(),
            outcome: self.outcome(),
            message: self.message.to_owned(),
            area,
        }
    }
}

/// 라인 하나를 파싱합니다.
///
/// 알려진 형태가 아니거나 토큰이 부족하면 `None`.
pub fn parse_line(line: &str) -> Option<ParsedLine<'_>> {
    let shape = LineShape::classify(line)?;

    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < MIN_TOKENS {
        return None;
    }

    let offsets = shape.offsets();
    let message = match shape.outcome() {
        Outcome::Failure => line.split(MESSAGE_SEPARATOR).nth(1).unwrap_or_default(),
        Outcome::Success => "",
    };

    Some(ParsedLine {
        shape,
        month: tokens[0],
        day: tokens[1],
        time: tokens[2],
        user: tokens[offsets.user],
        address: tokens[offsets.address],
        port: tokens[offsets.port],
        auth_method: tokens[offsets.method],
        message,
    })
}

/// 연도 없는 syslog 타임스탬프를 설정된 시간대의 시각으로 복원합니다.
#[derive(Debug, Clone, Copy)]
pub struct TimestampResolver {
    tz: Tz,
}

impl TimestampResolver {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// `year month day time`을 해석합니다.
    ///
    /// 파싱 실패나 DST 공백 시각이면 `None`, 겹치는 시각은 이른 쪽으로 정합니다.
    pub fn resolve(
        &self,
        year: i32,
        month: &str,
        day: &str,
        time: &str,
    ) -> Option<DateTime<FixedOffset>> {
        let text = format!("{year} {month} {day} {time}");
        let naive = NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT).ok()?;
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.fixed_offset())
    }

    /// 파싱된 라인의 날짜 토큰을 해석합니다.
    pub fn resolve_line(&self, year: i32, line: &ParsedLine<'_>) -> Option<DateTime<FixedOffset>> {
        self.resolve(year, line.month, line.day, line.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCEPTED: &str =
        "Jan 2 03:04:05 host sshd[123]: Accepted password for root from 1.2.3.4 port 22 ssh2";
    const FAILED: &str =
        "Mar 15 22:10:01 host sshd[77]: Failed password for alice from 5.6.7.8 port 50022 ssh2";
    const CLOSED: &str = "Feb  9 11:00:00 host sshd[9]: Connection closed by authenticating user bob 9.8.7.6 port 4242 [preauth]";

    #[test]
    fn parses_accepted_line() {
        let parsed = parse_line(ACCEPTED).unwrap();
        assert_eq!(parsed.shape, LineShape::Accepted);
        assert_eq!(parsed.outcome(), Outcome::Success);
        assert_eq!(parsed.user, "root");
        assert_eq!(parsed.address, "1.2.3.4");
        assert_eq!(parsed.port, "22");
        assert_eq!(parsed.auth_method, "password");
        assert_eq!(parsed.message, "");
        assert_eq!(parsed.raw_date(), "Jan 2 03:04:05");
    }

    #[test]
    fn parses_failed_password_line() {
        let parsed = parse_line(FAILED).unwrap();
        assert_eq!(parsed.shape, LineShape::FailedPassword);
        assert_eq!(parsed.outcome(), Outcome::Failure);
        assert_eq!(parsed.user, "alice");
        assert_eq!(parsed.address, "5.6.7.8");
        assert_eq!(parsed.port, "50022");
        assert_eq!(parsed.auth_method, "password");
        assert_eq!(
            parsed.message,
            "Failed password for alice from 5.6.7.8 port 50022 ssh2"
        );
    }

    #[test]
    fn parses_connection_closed_line() {
        let parsed = parse_line(CLOSED).unwrap();
        assert_eq!(parsed.shape, LineShape::ConnectionClosed);
        assert_eq!(parsed.user, "bob");
        assert_eq!(parsed.address, "9.8.7.6");
        assert_eq!(parsed.port, "4242");
        assert_eq!(parsed.auth_method, "authenticating");
        assert_eq!(parsed.day, "9");
    }

    #[test]
    fn message_stops_at_next_separator() {
        let line = "Jan 2 03:04:05 host sshd[1]: Failed password for x from 1.1.1.1 port 2 ssh2: extra: tail";
        let parsed = parse_line(line).unwrap();
        assert_eq!(parsed.message, "Failed password for x from 1.1.1.1 port 2 ssh2");
    }

    #[test]
    fn short_line_is_dropped() {
        let line = "Jan 2 03:04:05 host sshd[1]: Accepted password for root";
        assert!(line.split_whitespace().count() < MIN_TOKENS);
        assert!(parse_line(line).is_none());
    }

    #[test]
    fn unknown_shape_is_dropped() {
        let line = "Jan 2 03:04:05 host sshd[1]: Received disconnect from 1.2.3.4 port 22:11: disconnected by user x y";
        assert!(parse_line(line).is_none());
    }

    #[test]
    fn failed_password_wins_over_accepted() {
        let line = "Jan 2 03:04:05 host sshd[1]: Failed password for Accepted from 1.2.3.4 port 22 ssh2 x";
        assert_eq!(parse_line(line).unwrap().shape, LineShape::FailedPassword);
    }

    #[test]
    fn resolves_timestamp_in_utc() {
        let resolver = TimestampResolver::new(chrono_tz::UTC);
        let parsed = parse_line(ACCEPTED).unwrap();
        let ts = resolver.resolve_line(2023, &parsed).unwrap();
        assert_eq!(ts.to_rfc3339(), "2023-01-02T03:04:05+00:00");
    }

    #[test]
    fn resolves_timestamp_in_named_zone() {
        let resolver = TimestampResolver::new(chrono_tz::Asia::Seoul);
        let ts = resolver.resolve(2023, "Jan", "2", "03:04:05").unwrap();
        assert_eq!(ts.to_rfc3339(), "2023-01-02T03:04:05+09:00");
    }

    #[test]
    fn unparsable_timestamp_is_none() {
        let resolver = TimestampResolver::new(chrono_tz::UTC);
        assert!(resolver.resolve(2023, "Foo", "2", "03:04:05").is_none());
        assert!(resolver.resolve(2023, "Feb", "30", "03:04:05").is_none());
        assert!(resolver.resolve(2023, "Jan", "2", "25:00:00").is_none());
    }

    #[test]
    fn dst_gap_is_none_and_overlap_is_earliest() {
        let resolver = TimestampResolver::new(chrono_tz::America::New_York);
        // 2023-03-12 02:30은 존재하지 않음
        assert!(resolver.resolve(2023, "Mar", "12", "02:30:00").is_none());
        // 2023-11-05 01:30은 두 번 존재, EDT(-04:00) 쪽
        let ts = resolver.resolve(2023, "Nov", "5", "01:30:00").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), -4 * 3600);
    }

    #[test]
    fn into_event_carries_fields() {
        let parsed = parse_line(FAILED).unwrap();
        let event = parsed.into_event(None, "Korea".to_owned());
        assert_eq!(event.user, "alice");
        assert_eq!(event.outcome, Outcome::Failure);
        assert_eq!(event.raw_date, "Mar 15 22:10:01");
        assert_eq!(event.area, "Korea");
        assert!(event.timestamp.is_none());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn parse_arbitrary_line_does_not_panic(line in ".{0,300}") {
                let _ = parse_line(&line);
            }

            #[test]
            fn short_lines_never_parse(tokens in prop::collection::vec("[a-zA-Z0-9:.]{1,8}", 0..MIN_TOKENS)) {
                // 마커를 넣어도 토큰이 모자라면 이벤트가 아님
                let line = format!("Accepted {}", tokens.join(" "));
                prop_assume!(line.split_whitespace().count() < MIN_TOKENS);
                prop_assert!(parse_line(&line).is_none());
            }

            #[test]
            fn accepted_fields_come_from_fixed_offsets(
                user in "[a-z][a-z0-9]{0,7}",
                a in 0u8..=255, b in 0u8..=255,
                port in 1u16..,
            ) {
                let address = format!("10.0.{a}.{b}");
                let line = format!(
                    "Jun 30 23:59:59 host sshd[42]: Accepted publickey for {user} from {address} port {port} ssh2"
                );
                let parsed = parse_line(&line).unwrap();
                prop_assert_eq!(parsed.user, user.as_str());
                prop_assert_eq!(parsed.address, address.as_str());
                prop_assert_eq!(parsed.port, port.to_string());
                prop_assert_eq!(parsed.auth_method, "publickey");
            }
        }
    }
}
