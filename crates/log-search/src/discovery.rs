//! 로그 파일 탐색 및 로테이션 아카이브 해제
//!
//! 로그 루트를 재귀적으로 탐색하여 `secure*` / `auth.log*` 파일을 찾습니다.
//! `.gz` 아카이브는 같은 경로에서 `.gz`를 뗀 짝 파일이 없을 때만
//! 같은 디렉토리의 임시 파일로 해제한 뒤 짝 경로로 원자적으로 옮깁니다.
//!
//! # 멱등성
//!
//! - 짝 파일이 이미 있으면 아카이브는 건드리지 않습니다.
//! - 짝 파일은 아카이브의 수정 시각을 물려받으므로 재실행해도 로테이션 연도가 같습니다.
//! - 동시에 같은 아카이브를 해제하는 질의가 있어도 `persist_noclobber`가
//!   먼저 끝난 쪽의 결과를 유지합니다.
//!
//! 이 모듈의 함수는 모두 blocking I/O이므로 `spawn_blocking` 안에서 호출해야 합니다.

use std::collections::HashSet;
use std::fs::{self, File, Metadata};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use flate2::read::MultiGzDecoder;
use tracing::{debug, warn};

use authpost_core::types::{LogFamily, SkipReason, SkippedFile};

use crate::error::LogSearchError;

/// 아카이브 확장자
pub const ARCHIVE_SUFFIX: &str = ".gz";

/// 처리 대상 로그 파일
///
/// 탐색 중에 만들어지고 이후에는 바뀌지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileRef {
    /// 파일 경로 (해제된 아카이브라면 짝 파일 경로)
    pub path: PathBuf,
    /// 파일 계열
    pub family: LogFamily,
    /// 연도 없는 타임스탬프에 붙일 연도 (파일 수정 시각 기준)
    pub rotation_year: i32,
}

impl LogFileRef {
    /// 파일 이름 (UTF-8이 아니면 빈 문자열)
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// 탐색 결과
#[derive(Debug, Default)]
pub struct Discovery {
    /// 발견한 후보 파일 (경로 오름차순)
    pub files: Vec<LogFileRef>,
    /// 제외된 파일과 사유
    pub skipped: Vec<SkippedFile>,
    /// 이번 탐색에서 새로 해제한 아카이브 수
    pub decompressed: u64,
}

/// 로그 루트 탐색기
#[derive(Debug, Clone)]
pub struct FileDiscoverer {
    decompress_archives: bool,
    timezone: Tz,
}

impl FileDiscoverer {
    /// 새 탐색기를 생성합니다.
    ///
    /// `timezone`은 파일 수정 시각을 로테이션 연도로 바꿀 때 사용합니다.
    pub fn new(decompress_archives: bool, timezone: Tz) -> Self {
        Self {
            decompress_archives,
            timezone,
        }
    }

    /// 로그 루트를 탐색합니다.
    ///
    /// # Errors
    ///
    /// 루트 디렉토리 자체를 열거할 수 없으면 `LogSearchError::RootUnreadable`.
    /// 하위 디렉토리 실패나 해제 실패는 [`Discovery::skipped`]에 기록됩니다.
    pub fn discover(&self, root: &Path) -> Result<Discovery, LogSearchError> {
        let entries = snapshot_dir(root).map_err(|source| LogSearchError::RootUnreadable {
            path: root.display().to_string(),
            source,
        })?;

        let mut discovery = Discovery::default();
        self.visit(entries, &mut discovery);
        discovery.files.sort_by(|a, b| a.path.cmp(&b.path));

        debug!(
            root = %root.display(),
            files = discovery.files.len(),
            skipped = discovery.skipped.len(),
            decompressed = discovery.decompressed,
            "log root discovered"
        );
        Ok(discovery)
    }

    fn visit(&self, entries: Vec<DirEntrySnapshot>, discovery: &mut Discovery) {
        // 짝 파일 판정은 해제 전에 찍은 스냅샷 기준
        let snapshot: HashSet<PathBuf> = entries.iter().map(|e| e.path.clone()).collect();

        for entry in entries {
            match entry.kind {
                EntryKind::Dir => match snapshot_dir(&entry.path) {
                    Ok(children) => self.visit(children, discovery),
                    Err(e) => {
                        warn!(dir = %entry.path.display(), error = %e, "unreadable directory, skipping");
                        discovery.skipped.push(SkippedFile::new(
                            &entry.path,
                            SkipReason::UnreadableDir,
                            e.to_string(),
                        ));
                    }
                },
                EntryKind::File => self.visit_file(&entry.path, &snapshot, discovery),
                EntryKind::Other => {}
            }
        }
    }

    fn visit_file(&self, path: &Path, snapshot: &HashSet<PathBuf>, discovery: &mut Discovery) {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return;
        };
        let Some(family) = LogFamily::from_file_name(name) else {
            return;
        };

        let Some(stem) = name.strip_suffix(ARCHIVE_SUFFIX) else {
            self.register(path, family, discovery);
            return;
        };

        let twin = path.with_file_name(stem);
        if snapshot.contains(&twin) {
            // 짝 파일은 자기 차례에 등록됨
            return;
        }

        if twin.is_file() {
            // 다른 질의가 방금 해제한 경우
            self.register(&twin, family, discovery);
            return;
        }

        if !self.decompress_archives {
            debug!(archive = %path.display(), "archive without twin, decompression disabled");
            return;
        }

        match decompress_archive(path, &twin) {
            Ok(written) => {
                if written {
                    discovery.decompressed += 1;
                    debug!(archive = %path.display(), twin = %twin.display(), "archive decompressed");
                }
                self.register(&twin, family, discovery);
            }
            Err(e) => {
                warn!(archive = %path.display(), error = %e, "failed to decompress archive, skipping");
                discovery
                    .skipped
                    .push(SkippedFile::new(path, SkipReason::Decompress, e.to_string()));
            }
        }
    }

    fn register(&self, path: &Path, family: LogFamily, discovery: &mut Discovery) {
        let rotation_year = match fs::metadata(path) {
            Ok(meta) => self.rotation_year(path, &meta),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to stat log file, using current year");
                self.current_year()
            }
        };

        discovery.files.push(LogFileRef {
            path: path.to_path_buf(),
            family,
            rotation_year,
        });
    }

    /// 파일 수정 시각이 속한 연도 (설정된 시간대 기준)
    fn rotation_year(&self, path: &Path, meta: &Metadata) -> i32 {
        match meta.modified() {
            Ok(mtime) => DateTime::<Utc>::from(mtime)
                .with_timezone(&self.timezone)
                .year(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "modification time unavailable, using current year");
                self.current_year()
            }
        }
    }

    fn current_year(&self) -> i32 {
        Utc::now().with_timezone(&self.timezone).year()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Dir,
    Other,
}

#[derive(Debug)]
struct DirEntrySnapshot {
    path: PathBuf,
    kind: EntryKind,
}

/// 디렉토리 항목을 한 번에 읽어 경로 순으로 정렬합니다.
///
/// 심볼릭 링크는 따라가지 않고 `Other`로 분류합니다.
fn snapshot_dir(dir: &Path) -> io::Result<Vec<DirEntrySnapshot>> {
    let mut entries = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "failed to read directory entry");
                continue;
            }
        };

        let kind = match entry.file_type() {
            Ok(ft) if ft.is_file() => EntryKind::File,
            Ok(ft) if ft.is_dir() => EntryKind::Dir,
            Ok(_) => EntryKind::Other,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "failed to read file type");
                continue;
            }
        };

        entries.push(DirEntrySnapshot {
            path: entry.path(),
            kind,
        });
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

/// `.gz` 아카이브를 짝 경로로 해제합니다.
///
/// 같은 디렉토리의 임시 파일에 쓴 뒤 `persist_noclobber`로 옮기므로
/// 반쯤 쓰인 짝 파일은 보이지 않습니다. 다른 쪽이 먼저 옮겼다면 `Ok(false)`.
/// 원본 아카이브는 그대로 둡니다.
pub fn decompress_archive(archive: &Path, twin: &Path) -> Result<bool, LogSearchError> {
    let fail = |reason: String| LogSearchError::Decompress {
        path: archive.display().to_string(),
        reason,
    };

    let dir = twin
        .parent()
        .ok_or_else(|| fail("archive has no parent directory".to_owned()))?;

    let src = File::open(archive).map_err(|e| fail(format!("open: {e}")))?;
    let meta = src.metadata().map_err(|e| fail(format!("stat: {e}")))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".authpost-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| fail(format!("create temp file: {e}")))?;

    let mut decoder = MultiGzDecoder::new(BufReader::new(src));
    io::copy(&mut decoder, tmp.as_file_mut()).map_err(|e| fail(format!("inflate: {e}")))?;

    if let Err(e) = tmp.as_file().set_permissions(meta.permissions()) {
        debug!(archive = %archive.display(), error = %e, "failed to copy archive permissions");
    }
    match meta.modified() {
        Ok(mtime) => {
            if let Err(e) = tmp.as_file().set_modified(mtime) {
                warn!(archive = %archive.display(), error = %e, "failed to copy archive mtime");
            }
        }
        Err(e) => {
            warn!(archive = %archive.display(), error = %e, "archive mtime unavailable");
        }
    }

    match tmp.persist_noclobber(twin) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(fail(format!("persist: {}", e.error))),
    }
}
