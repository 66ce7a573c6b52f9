//! 계열별 파일 처리 순서
//!
//! 줄 단위 역순 처리와 합쳐져 전체 이벤트 흐름이 최신순이 되도록
//! 계열마다 파일 순서를 정합니다.
//!
//! - `auth`: 파일 이름 오름차순 (`auth.log`, `auth.log.1`, `auth.log.2`, ...)
//! - `secure`: 이름 내림차순으로 정렬한 뒤 마지막 원소(현재 파일 `secure`)를 먼저,
//!   이어서 내림차순 목록에서 마지막 두 원소를 뺀 나머지를 처리합니다.
//!   가장 오래된 로테이션 하나는 이 규칙 때문에 빠집니다.
//!
//! 한 계열의 파일이 둘 미만이면 순서를 바꾸지 않습니다.
//! 두 계열이 모두 있으면 `auth` 계열을 먼저 처리합니다.

use authpost_core::types::LogFamily;

use crate::discovery::LogFileRef;

/// 탐색 결과를 처리 순서로 정렬합니다.
pub fn order_for_processing(files: Vec<LogFileRef>) -> Vec<LogFileRef> {
    let (auth, secure): (Vec<_>, Vec<_>) = files
        .into_iter()
        .partition(|f| f.family == LogFamily::Auth);

    let mut ordered = order_family(LogFamily::Auth, auth);
    ordered.extend(order_family(LogFamily::Secure, secure));
    ordered
}

/// 한 계열 안의 처리 순서
pub fn order_family(family: LogFamily, mut files: Vec<LogFileRef>) -> Vec<LogFileRef> {
    if files.len() < 2 {
        return files;
    }

    match family {
        LogFamily::Auth => {
            files.sort_by(by_name);
            files
        }
        LogFamily::Secure => {
            files.sort_by(|a, b| by_name(b, a));
            let n = files.len();
            let mut ordered = Vec::with_capacity(n - 1);
            // 내림차순 마지막 = 가장 작은 이름 = 현재 파일
            ordered.push(files[n - 1].clone());
            ordered.extend(files.drain(..n - 2));
            ordered
        }
    }
}

/// 파일 이름 우선, 같은 이름(다른 디렉토리)은 경로로 비교
fn by_name(a: &LogFileRef, b: &LogFileRef) -> std::cmp::Ordering {
    a.file_name()
        .cmp(b.file_name())
        .then_with(|| a.path.cmp(&b.path))
}
