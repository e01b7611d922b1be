mod article;
mod audio;
mod carousel;
mod columns;
mod schedule;
mod validate;
mod video;

pub use self::{
    article::{Article, ArticlePatch, NewArticle},
    audio::{AudioContent, AudioPatch, NewAudio},
    carousel::{Carousel, MosqueGroup, group_by_mosque, slides_per_view},
    columns::{Columns, Table, Value},
    schedule::{NewSchedule, Schedule, SchedulePatch, Weekday},
    validate::Validate,
    video::{NewVideo, Video, VideoPatch},
};
