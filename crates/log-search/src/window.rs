//! 파일을 가로지르는 페이지 창
//!
//! 질의 페이지는 전체 최신순 이벤트 흐름 위의 반열린 구간 `[from, to)`입니다.
//! 흐름 전체를 만들지 않고, 파일 하나를 끝낼 때마다 그 파일의 매칭 수만큼
//! 구간을 앞으로 당깁니다. 경계는 음수가 될 수 있으며 같은 비교로
//! 이후 이벤트를 모두 걸러냅니다.

/// 남은 페이지 창
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    from: i64,
    to: i64,
}

impl PageWindow {
    /// `page`(1부터)와 `page_size`로 창을 만듭니다.
    ///
    /// 호출 전에 질의 검증을 거쳐야 합니다 (`page >= 1`, `page_size >= 1`).
    pub fn for_page(page: u32, page_size: u32) -> Self {
        let size = i64::from(page_size);
        let from = (i64::from(page) - 1) * size;
        Self {
            from,
            to: from + size,
        }
    }

    /// 현재 파일 기준 위치 `position`이 창 안에 있는지 확인합니다.
    pub fn contains(&self, position: u64) -> bool {
        let position = i64::try_from(position).unwrap_or(i64::MAX);
        position >= self.from && position < self.to
    }

    /// 파일 하나에서 소비한 매칭 수만큼 창을 당깁니다.
    pub fn advance(&mut self, consumed: u64) {
        let consumed = i64::try_from(consumed).unwrap_or(i64::MAX);
        self.from = self.from.saturating_sub(consumed);
        self.to = self.to.saturating_sub(consumed);
    }

    pub fn from(&self) -> i64 {
        self.from
    }

    pub fn to(&self) -> i64 {
        self.to
    }
}
