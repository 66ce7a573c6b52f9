//! MaxMind DB 기반 지역 조회
//!
//! GeoLite2-City 형식의 `.mmdb` 파일을 한 번 읽어 메모리에 두고,
//! 여러 질의가 동시에 읽기 전용으로 조회합니다.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use maxminddb::PathElement;

use authpost_core::geo::GeoLookup;

use crate::error::LogSearchError;

/// 읽기 전용 지역 DB
pub struct GeoDatabase {
    reader: maxminddb::Reader<Vec<u8>>,
    path: PathBuf,
}

impl GeoDatabase {
    /// `.mmdb` 파일을 엽니다.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LogSearchError> {
        let path = path.as_ref();
        let reader =
            maxminddb::Reader::open_readfile(path).map_err(|e| LogSearchError::GeoDatabase {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            reader,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for GeoDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoDatabase")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl GeoLookup for GeoDatabase {
    fn area(&self, address: &str) -> Option<String> {
        let ip: IpAddr = address.parse().ok()?;
        let lookup = self.reader.lookup(ip).ok()?;

        let name = |path: &[PathElement]| lookup.decode_path::<String>(path).ok().flatten();

        let parts = [
            name(&[
                PathElement::Key("country"),
                PathElement::Key("names"),
                PathElement::Key("en"),
            ]),
            name(&[
                PathElement::Key("subdivisions"),
                PathElement::Index(0),
                PathElement::Key("names"),
                PathElement::Key("en"),
            ]),
            name(&[
                PathElement::Key("city"),
                PathElement::Key("names"),
                PathElement::Key("en"),
            ]),
        ];

        let area = parts
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        (!area.is_empty()).then_some(area)
    }
}
