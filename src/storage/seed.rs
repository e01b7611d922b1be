use serde::Deserialize;

use crate::{
    content::{Article, AudioContent, Schedule, Video},
    error::Result,
};

const SAMPLE: &str = include_str!("../../seed/sample.yaml");

/// 内存存储的初始数据
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub articles: Vec<Article>,
    pub audio: Vec<AudioContent>,
    pub videos: Vec<Video>,
    pub schedules: Vec<Schedule>,
}

impl Seed {
    /// 内置的示例数据
    pub fn sample() -> Result<Self> {
        Self::from_yaml(SAMPLE)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    /// 示例数据中最大的 id
    pub fn max_id(&self) -> i32 {
        let ids = self.articles.iter().map(|a| a.id);
        let ids = ids.chain(self.audio.iter().map(|a| a.id));
        let ids = ids.chain(self.videos.iter().map(|v| v.id));
        let ids = ids.chain(self.schedules.iter().map(|s| s.id));
        ids.max().unwrap_or(0)
    }
}
