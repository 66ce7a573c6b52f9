//! 라인 소스: 파일에서 필터를 통과한 원시 라인을 꺼냄
//!
//! 엔진은 [`LineSource`] trait만 알고, 기본 구현 [`FileLineSource`]는
//! 파일을 직접 읽어 [`LinePredicate`]로 거릅니다. 외부 명령은 쓰지 않습니다.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::config::DEFAULT_MAX_LINE_LENGTH;
use crate::error::LogSearchError;
use crate::filter::LinePredicate;

/// 파일 하나에서 필터를 통과한 라인을 파일 순서대로 반환합니다.
///
/// 실패하면 엔진은 해당 파일을 건너뛰고 다음 파일로 넘어갑니다.
pub trait LineSource: Send + Sync {
    fn matching_lines(
        &self,
        path: &Path,
        predicate: &LinePredicate,
    ) -> Result<Vec<String>, LogSearchError>;
}

/// 파일을 직접 스캔하는 기본 라인 소스
///
/// UTF-8이 아닌 바이트는 대체 문자로 바꿔 계속 읽고,
/// `max_line_length`보다 긴 라인은 버립니다.
#[derive(Debug, Clone)]
pub struct FileLineSource {
    max_line_length: usize,
}

impl FileLineSource {
    pub fn new(max_line_length: usize) -> Self {
        Self { max_line_length }
    }
}

impl Default for FileLineSource {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LENGTH)
    }
}

impl LineSource for FileLineSource {
    fn matching_lines(
        &self,
        path: &Path,
        predicate: &LinePredicate,
    ) -> Result<Vec<String>, LogSearchError> {
        let fail = |e: std::io::Error| LogSearchError::LineSource {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        let mut reader = BufReader::new(File::open(path).map_err(fail)?);
        let mut buf = Vec::with_capacity(256);
        let mut lines = Vec::new();
        let mut oversized = 0u64;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).map_err(fail)? == 0 {
                break;
            }

            if buf.last() == Some(&b'\n') {
                buf.pop();
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
            }

            if buf.len() > self.max_line_length {
                oversized += 1;
                continue;
            }

            let line = String::from_utf8_lossy(&buf);
            if predicate.matches(&line) {
                lines.push(line.into_owned());
            }
        }

        if oversized > 0 {
            debug!(path = %path.display(), oversized, "dropped lines over length limit");
        }

        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authpost_core::types::{LogFamily, OutcomeFilter};
    use std::fs;

    fn any_secure() -> LinePredicate {
        LinePredicate::new(LogFamily::Secure, OutcomeFilter::Any, None).unwrap()
    }

    #[test]
    fn returns_matching_lines_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secure");
        fs::write(
            &path,
            "a Accepted x\nnoise\nb Failed password for y\r\nc Accepted z",
        )
        .unwrap();

        let lines = FileLineSource::default()
            .matching_lines(&path, &any_secure())
            .unwrap();
        assert_eq!(
            lines,
            vec!["a Accepted x", "b Failed password for y", "c Accepted z"]
        );
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secure");
        let mut content = b"Accepted \xff\xfe bytes\n".to_vec();
        content.extend_from_slice(b"Accepted clean\n");
        fs::write(&path, content).unwrap();

        let lines = FileLineSource::default()
            .matching_lines(&path, &any_secure())
            .unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains('\u{FFFD}'));
    }

    #[test]
    fn overlong_lines_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secure");
        let long = format!("Accepted {}\n", "x".repeat(100));
        fs::write(&path, format!("{long}Accepted short\n")).unwrap();

        let lines = FileLineSource::new(32)
            .matching_lines(&path, &any_secure())
            .unwrap();
        assert_eq!(lines, vec!["Accepted short"]);
    }

    #[test]
    fn missing_file_is_line_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileLineSource::default()
            .matching_lines(&dir.path().join("gone"), &any_secure())
            .unwrap_err();
        assert!(matches!(err, LogSearchError::LineSource { .. }));
    }
}
