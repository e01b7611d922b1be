use serde::Serialize;

use super::Schedule;

/// 同一清真寺的讲座安排
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MosqueGroup {
    pub mosque_name: String,
    pub mosque_location: String,
    pub schedules: Vec<Schedule>,
}

/// 按 `mosque_name` 分组
///
/// 分组顺序为首次出现的顺序；组内按星期排序，无法识别的星期排在最后，
/// 同一天保持输入顺序。
pub fn group_by_mosque(schedules: impl IntoIterator<Item = Schedule>) -> Vec<MosqueGroup> {
    let mut groups: Vec<MosqueGroup> = Vec::new();

    for schedule in schedules {
        match groups
            .iter_mut()
            .find(|g| g.mosque_name == schedule.mosque_name)
        {
            Some(group) => group.schedules.push(schedule),
            None => groups.push(MosqueGroup {
                mosque_name: schedule.mosque_name.clone(),
                mosque_location: schedule.mosque_location.clone(),
                schedules: vec![schedule],
            }),
        }
    }

    for group in &mut groups {
        // sort_by_key 是稳定排序
        group.schedules.sort_by_key(|s| s.weekday().map_or(usize::MAX, |d| d as usize));
    }

    groups
}

/// 桌面宽度（≥1024px）每屏两组，否则一组
pub fn slides_per_view(viewport_width: u32) -> usize {
    if viewport_width >= 1024 { 2 } else { 1 }
}

/// 清真寺轮播的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    index: usize,
    len: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    /// 从任意下标开始，超出范围时取模
    pub fn at(index: usize, len: usize) -> Self {
        let index = if len == 0 { 0 } else { index % len };
        Self { index, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn next(&mut self) {
        if !self.is_empty() {
            self.index = (self.index + 1) % self.len;
        }
    }

    pub fn prev(&mut self) {
        if !self.is_empty() {
            self.index = (self.index + self.len - 1) % self.len;
        }
    }

    /// 当前屏可见的分组下标，最多 `min(per_slide, len)` 个，循环取值
    pub fn visible(&self, per_slide: usize) -> Vec<usize> {
        (0..per_slide.min(self.len))
            .map(|i| (self.index + i) % self.len)
            .collect()
    }
}
