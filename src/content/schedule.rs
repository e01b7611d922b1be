use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{
    Table,
    columns::{insert_columns, nullable, patch_columns},
    validate::{Validate, not_blank, required},
};
use crate::error::{Error, Result};

/// 清真寺的每周讲座安排
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: i32,
    pub mosque_name: String,
    pub mosque_location: String,
    /// 斯瓦希里语星期名，见 [`Weekday`]
    pub day_of_week: String,
    pub time_slot: String,
    pub subject: String,
    pub teacher: String,
    pub additional_info: Option<String>,
    /// 停用的安排保留在表中，但不出现在任何读取结果里
    pub is_active: bool,
}

impl Table for Schedule {
    const NAME: &'static str = "schedules";

    fn id(&self) -> i32 {
        self.id
    }
}

impl Schedule {
    pub fn weekday(&self) -> Option<Weekday> {
        self.day_of_week.parse().ok()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewSchedule {
    pub mosque_name: String,
    pub mosque_location: String,
    pub day_of_week: String,
    pub time_slot: String,
    pub subject: String,
    pub teacher: String,
    #[serde(default)]
    pub additional_info: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl NewSchedule {
    pub fn into_record(self, id: i32) -> Schedule {
        Schedule {
            id,
            mosque_name: self.mosque_name,
            mosque_location: self.mosque_location,
            day_of_week: self.day_of_week,
            time_slot: self.time_slot,
            subject: self.subject,
            teacher: self.teacher,
            additional_info: self.additional_info,
            is_active: self.is_active,
        }
    }
}

insert_columns!(NewSchedule {
    mosque_name,
    mosque_location,
    day_of_week,
    time_slot,
    subject,
    teacher,
    additional_info,
    is_active,
});

impl Validate for NewSchedule {
    fn validate(&self) -> Result<()> {
        required("mosqueName", &self.mosque_name)?;
        required("mosqueLocation", &self.mosque_location)?;
        self.day_of_week.parse::<Weekday>()?;
        required("timeSlot", &self.time_slot)?;
        required("subject", &self.subject)?;
        required("teacher", &self.teacher)
    }
}

/// 讲座安排的部分更新，`isActive` 用于停用或恢复
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SchedulePatch {
    pub mosque_name: Option<String>,
    pub mosque_location: Option<String>,
    pub day_of_week: Option<String>,
    pub time_slot: Option<String>,
    pub subject: Option<String>,
    pub teacher: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub additional_info: Option<Option<String>>,
    pub is_active: Option<bool>,
}

patch_columns!(SchedulePatch => Schedule {
    mosque_name,
    mosque_location,
    day_of_week,
    time_slot,
    subject,
    teacher,
    additional_info,
    is_active,
});

impl Validate for SchedulePatch {
    fn validate(&self) -> Result<()> {
        not_blank("mosqueName", self.mosque_name.as_ref())?;
        not_blank("mosqueLocation", self.mosque_location.as_ref())?;
        if let Some(day) = &self.day_of_week {
            day.parse::<Weekday>()?;
        }
        not_blank("timeSlot", self.time_slot.as_ref())?;
        not_blank("subject", self.subject.as_ref())?;
        not_blank("teacher", self.teacher.as_ref())
    }
}

/// 斯瓦希里语的星期，从 Jumamosi（周六）开始
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    Jumamosi,
    Jumapili,
    Jumatatu,
    Jumanne,
    Jumatano,
    Alhamisi,
    Ijumaa,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Jumamosi,
        Weekday::Jumapili,
        Weekday::Jumatatu,
        Weekday::Jumanne,
        Weekday::Jumatano,
        Weekday::Alhamisi,
        Weekday::Ijumaa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Jumamosi => "Jumamosi",
            Weekday::Jumapili => "Jumapili",
            Weekday::Jumatatu => "Jumatatu",
            Weekday::Jumanne => "Jumanne",
            Weekday::Jumatano => "Jumatano",
            Weekday::Alhamisi => "Alhamisi",
            Weekday::Ijumaa => "Ijumaa",
        }
    }
}

impl FromStr for Weekday {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Weekday::ALL
            .into_iter()
            .find(|day| day.as_str() == s)
            .ok_or_else(|| Error::validation(format!("invalid dayOfWeek: {s}")))
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::content::Columns;

    #[test]
    fn test_weekday_parse_is_exact() {
        assert_eq!("Jumatano".parse::<Weekday>().unwrap(), Weekday::Jumatano);
        assert!("jumatano".parse::<Weekday>().is_err());
        assert!("Monday".parse::<Weekday>().is_err());
    }

    #[test]
    fn test_weekday_order_starts_on_saturday() {
        assert!(Weekday::Jumamosi < Weekday::Jumapili);
        assert!(Weekday::Alhamisi < Weekday::Ijumaa);
        assert_eq!(Weekday::ALL.len(), 7);
    }

    #[test]
    fn test_new_schedule_defaults_active() {
        let schedule: NewSchedule = serde_json::from_value(json!({
            "mosqueName": "Masjid X",
            "mosqueLocation": "Mombasa",
            "dayOfWeek": "Jumamosi",
            "timeSlot": "Baada Ya Alfajri",
            "subject": "Tawheed",
            "teacher": "Ustadh Omar"
        }))
        .unwrap();

        assert!(schedule.is_active);
        assert!(schedule.additional_info.is_none());
        assert!(schedule.validate().is_ok());
    }

    #[test]
    fn test_new_schedule_rejects_unknown_day() {
        let schedule: NewSchedule = serde_json::from_value(json!({
            "mosqueName": "Masjid X",
            "mosqueLocation": "Mombasa",
            "dayOfWeek": "Friday",
            "timeSlot": "Baada Ya Alfajri",
            "subject": "Tawheed",
            "teacher": "Ustadh Omar"
        }))
        .unwrap();
        assert!(schedule.validate().is_err());
    }

    #[test]
    fn test_patch_null_clears_additional_info() {
        let patch: SchedulePatch =
            serde_json::from_value(json!({ "additionalInfo": null })).unwrap();
        assert_eq!(patch.additional_info, Some(None));
        assert_eq!(
            patch.columns(),
            vec![("additional_info", crate::content::Value::NullableText(None))]
        );

        let absent: SchedulePatch = serde_json::from_value(json!({ "subject": "Fiqh" })).unwrap();
        assert!(absent.additional_info.is_none());

        let set: SchedulePatch =
            serde_json::from_value(json!({ "additionalInfo": "Darsa la Vijana" })).unwrap();
        assert_eq!(set.additional_info, Some(Some("Darsa la Vijana".to_string())));
    }

    #[test]
    fn test_patch_deactivate() {
        let patch: SchedulePatch = serde_json::from_value(json!({ "isActive": false })).unwrap();
        let columns = patch.columns();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].0, "is_active");
    }
}
