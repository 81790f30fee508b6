//! 每日触发时刻计算
//!
//! 调度循环本身在 App 里；这里只做纯粹的时间计算，便于测试。

use chrono::{DateTime, Duration as ChronoDuration, Local, TimeZone};

use crate::error::ConfigError;

/// 下一次触发时刻（严格晚于 now）
pub fn next_fire_at(
    now: DateTime<Local>,
    hour: u32,
    minute: u32,
) -> Result<DateTime<Local>, ConfigError> {
    if hour > 23 || minute > 59 {
        return Err(ConfigError::InvalidFireTime { hour, minute });
    }

    let mut date = now.date_naive();
    // 今天的触发时刻已过（或落在夏令时空洞里）就顺延到后一天
    loop {
        let naive = date
            .and_hms_opt(hour, minute, 0)
            .ok_or(ConfigError::InvalidFireTime { hour, minute })?;
        if let Some(fire) = Local.from_local_datetime(&naive).earliest() {
            if fire > now {
                return Ok(fire);
            }
        }
        date = date
            .succ_opt()
            .ok_or(ConfigError::InvalidFireTime { hour, minute })?;
    }
}

/// 到下一次触发时刻的等待时长
pub fn until_next_fire(
    now: DateTime<Local>,
    hour: u32,
    minute: u32,
) -> Result<std::time::Duration, ConfigError> {
    let fire = next_fire_at(now, hour, minute)?;
    Ok((fire - now).to_std().unwrap_or_default())
}

/// 剩余回目的预计发布日期（启动时打印排期用）
pub fn remaining_schedule(
    now: DateTime<Local>,
    last_published: u32,
    total: u32,
    hour: u32,
    minute: u32,
) -> Result<Vec<(u32, DateTime<Local>)>, ConfigError> {
    let first_fire = next_fire_at(now, hour, minute)?;

    let mut schedule = Vec::new();
    for (offset, sequence) in (last_published + 1..=total).enumerate() {
        schedule.push((sequence, first_fire + ChronoDuration::days(offset as i64)));
    }
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn fires_later_today_when_time_not_yet_reached() {
        let now = local(2026, 8, 7, 8, 0);
        let fire = next_fire_at(now, 9, 0).unwrap();

        assert_eq!(fire.date_naive(), now.date_naive());
        assert_eq!((fire.hour(), fire.minute()), (9, 0));
        assert_eq!(until_next_fire(now, 9, 0).unwrap().as_secs(), 3600);
    }

    #[test]
    fn fires_tomorrow_when_time_already_passed() {
        let now = local(2026, 8, 7, 10, 30);
        let fire = next_fire_at(now, 9, 0).unwrap();

        assert_eq!(fire.date_naive(), now.date_naive().succ_opt().unwrap());
        assert_eq!((fire.hour(), fire.minute()), (9, 0));
    }

    #[test]
    fn exact_fire_time_rolls_to_next_day() {
        let now = local(2026, 8, 7, 9, 0);
        let fire = next_fire_at(now, 9, 0).unwrap();
        assert!(fire > now);
        assert_eq!(fire.date_naive(), now.date_naive().succ_opt().unwrap());
    }

    #[test]
    fn invalid_fire_time_is_rejected() {
        let now = local(2026, 8, 7, 8, 0);
        assert!(next_fire_at(now, 24, 0).is_err());
        assert!(next_fire_at(now, 9, 60).is_err());
    }

    #[test]
    fn remaining_schedule_is_one_per_day() {
        let now = local(2026, 8, 7, 8, 0);
        let schedule = remaining_schedule(now, 3, 6, 9, 0).unwrap();

        let sequences: Vec<u32> = schedule.iter().map(|(s, _)| *s).collect();
        assert_eq!(sequences, vec![4, 5, 6]);

        assert_eq!(schedule[0].1.date_naive(), now.date_naive());
        assert_eq!(
            schedule[2].1.date_naive(),
            now.date_naive() + ChronoDuration::days(2)
        );
    }

    #[test]
    fn remaining_schedule_is_empty_when_complete() {
        let now = local(2026, 8, 7, 8, 0);
        let schedule = remaining_schedule(now, 10, 10, 9, 0).unwrap();
        assert!(schedule.is_empty());
    }
}
