//! Resolver for upcoming bin-collection dates.
//!
//! Collections recur weekly or biweekly on a fixed weekday, phase-anchored to
//! a known historical collection date. Council holiday tables can move a
//! single pickup to another date, and the evening before a pickup is the date
//! shown to the user (bins go out the night before). The resolver is a pure
//! function of the wall clock and the static configuration; it owns no state
//! and is recomputed from scratch on every refresh tick.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};

use crate::model::{CollectionRule, Frequency, HolidayException, ResolvedCollection};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Resolve the next collection for every rule and keep the subset sharing the
/// earliest display date.
///
/// `now` is local wall-clock time, already projected into the display's
/// timezone. An empty rule list yields an empty result. Rules whose
/// `day_of_week` is out of range are skipped; configuration loading rejects
/// them before they get here.
#[must_use]
pub fn resolve_next_collections(
    now: NaiveDateTime,
    collections: &[CollectionRule],
    exceptions: &[HolidayException],
    cutoff_hour: u32,
) -> Vec<ResolvedCollection> {
    let today = now.date();
    let current_hour = now.hour();

    let mut resolved: Vec<ResolvedCollection> = collections
        .iter()
        .filter_map(|rule| {
            let (mut display_date, mut days_delay) = resolve_rule(rule, today, exceptions)?;

            // The pickup happens the morning after the display evening. Once
            // the cutoff hour has passed on the pickup day itself, the current
            // cycle can no longer be acted on.
            let collection_date = display_date + Duration::days(1);
            if collection_date == today && current_hour >= cutoff_hour {
                let next_collection =
                    collection_date + Duration::weeks(rule.frequency.cycle_weeks());
                let next_display = next_collection - Duration::days(1);
                let (shifted, delay) = apply_holiday_exception(next_display, exceptions);
                display_date = shifted;
                days_delay = delay;
            }

            Some(ResolvedCollection {
                name: rule.name.clone(),
                accent: rule.accent.clone(),
                display_date,
                days_until: days_until(display_date, now),
                days_delay,
                is_display_day: display_date == today,
                is_collection_day: display_date + Duration::days(1) == today,
                before_cutoff: current_hour < cutoff_hour,
            })
        })
        .collect();

    resolved.sort_by_key(|collection| collection.display_date);

    let Some(earliest) = resolved.first().map(|collection| collection.display_date) else {
        return Vec::new();
    };
    resolved.retain(|collection| collection.display_date == earliest);
    resolved
}

/// Display date and holiday delay for a single rule.
///
/// Applies the holiday table to the computed collection day, converts it to
/// the evening-before display date, and rolls one full cycle forward when that
/// evening has already passed.
fn resolve_rule(
    rule: &CollectionRule,
    today: NaiveDate,
    exceptions: &[HolidayException],
) -> Option<(NaiveDate, i64)> {
    let candidate = next_occurrence(rule, today)?;

    let (collection_date, days_delay) = apply_holiday_exception(candidate, exceptions);
    let display_date = collection_date - Duration::days(1);

    if display_date < today {
        let next_candidate = candidate + Duration::weeks(rule.frequency.cycle_weeks());
        let (next_collection, next_delay) = apply_holiday_exception(next_candidate, exceptions);
        return Some((next_collection - Duration::days(1), next_delay));
    }

    Some((display_date, days_delay))
}

/// Next collection day on or after `today`, before any holiday shift.
///
/// The anchor date itself is used verbatim until it has passed; afterwards the
/// candidate is today (when the weekday matches) or the next matching weekday.
/// Biweekly rules check the parity of whole weeks elapsed since the anchor and
/// advance one week when they are in the off week.
fn next_occurrence(rule: &CollectionRule, today: NaiveDate) -> Option<NaiveDate> {
    let target = rule.weekday()?;
    let reference = rule.reference_date;

    let mut candidate = if today <= reference {
        reference
    } else if today.weekday() == target {
        today
    } else {
        next_weekday_after(today, target)
    };

    if rule.frequency == Frequency::Biweekly {
        // Adding a week preserves the weekday, so one shift is always enough.
        let weeks_since_reference = (candidate - reference).num_days().div_euclid(7);
        if weeks_since_reference.rem_euclid(2) != i64::from(rule.week_offset) {
            candidate = candidate + Duration::weeks(1);
        }
    }

    Some(candidate)
}

/// Substitute a collection day via the holiday table.
///
/// The first entry in list order whose `original_date` matches wins; the
/// revised date is not looked up again, so chained substitutions are not
/// followed. Returns the date unchanged with a zero delay when nothing
/// matches.
fn apply_holiday_exception(date: NaiveDate, exceptions: &[HolidayException]) -> (NaiveDate, i64) {
    match exceptions
        .iter()
        .find(|exception| exception.original_date == date)
    {
        Some(exception) => (
            exception.revised_date,
            (exception.revised_date - date).num_days(),
        ),
        None => (date, 0),
    }
}

/// Next date strictly after `from` that falls on `target`.
fn next_weekday_after(from: NaiveDate, target: Weekday) -> NaiveDate {
    let from_index = i64::from(from.weekday().num_days_from_sunday());
    let target_index = i64::from(target.num_days_from_sunday());
    let mut delta = (target_index - from_index).rem_euclid(7);
    if delta == 0 {
        delta = 7;
    }
    from + Duration::days(delta)
}

/// Whole days from `now` until midnight of `display_date`, rounded up so a
/// partial day still counts as one.
fn days_until(display_date: NaiveDate, now: NaiveDateTime) -> i64 {
    let midnight = display_date.and_time(NaiveTime::MIN);
    let seconds = (midnight - now).num_seconds();
    seconds.div_euclid(SECONDS_PER_DAY) + i64::from(seconds.rem_euclid(SECONDS_PER_DAY) != 0)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, Weekday};

    use super::{
        apply_holiday_exception, next_occurrence, next_weekday_after, resolve_next_collections,
        resolve_rule,
    };
    use crate::model::{CollectionRule, Frequency, HolidayException};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        date(year, month, day)
            .and_hms_opt(hour, minute, 0)
            .expect("valid time")
    }

    fn weekly(name: &str, day_of_week: u8, reference: NaiveDate) -> CollectionRule {
        CollectionRule {
            name: name.to_owned(),
            day_of_week,
            frequency: Frequency::Weekly,
            week_offset: 0,
            reference_date: reference,
            accent: String::new(),
        }
    }

    fn biweekly(
        name: &str,
        day_of_week: u8,
        week_offset: u8,
        reference: NaiveDate,
    ) -> CollectionRule {
        CollectionRule {
            name: name.to_owned(),
            day_of_week,
            frequency: Frequency::Biweekly,
            week_offset,
            reference_date: reference,
            accent: String::new(),
        }
    }

    #[test]
    fn weekday_advance_is_strictly_after() {
        // 2025-06-11 is a Wednesday.
        let wednesday = date(2025, 6, 11);
        assert_eq!(
            next_weekday_after(wednesday, Weekday::Wed),
            date(2025, 6, 18)
        );
        assert_eq!(
            next_weekday_after(wednesday, Weekday::Thu),
            date(2025, 6, 12)
        );
        assert_eq!(
            next_weekday_after(wednesday, Weekday::Tue),
            date(2025, 6, 17)
        );
    }

    #[test]
    fn exception_substitutes_matching_date_only() {
        let exceptions = vec![HolidayException {
            original_date: date(2025, 12, 25),
            revised_date: date(2025, 12, 27),
        }];

        assert_eq!(
            apply_holiday_exception(date(2025, 12, 25), &exceptions),
            (date(2025, 12, 27), 2)
        );
        assert_eq!(
            apply_holiday_exception(date(2025, 12, 18), &exceptions),
            (date(2025, 12, 18), 0)
        );
        // The revised date is not chained through the table again.
        assert_eq!(
            apply_holiday_exception(date(2025, 12, 27), &exceptions),
            (date(2025, 12, 27), 0)
        );
    }

    #[test]
    fn anchor_is_used_verbatim_until_passed() {
        // Weekly Wednesdays anchored at 2025-06-11; today is the anchor.
        let rule = weekly("general", 3, date(2025, 6, 11));
        assert_eq!(
            next_occurrence(&rule, date(2025, 6, 11)),
            Some(date(2025, 6, 11))
        );
        // Today before the anchor still yields the anchor.
        assert_eq!(
            next_occurrence(&rule, date(2025, 6, 2)),
            Some(date(2025, 6, 11))
        );
        // After the anchor, the next matching weekday wins.
        assert_eq!(
            next_occurrence(&rule, date(2025, 6, 12)),
            Some(date(2025, 6, 18))
        );
    }

    #[test]
    fn biweekly_fires_on_alternating_weeks() {
        // 2024-12-03 is a Tuesday.
        let rule = biweekly("recycling", 2, 0, date(2024, 12, 3));

        assert_eq!(
            next_occurrence(&rule, date(2024, 12, 3)),
            Some(date(2024, 12, 3))
        );
        // Off week: the Tuesday in between is skipped.
        assert_eq!(
            next_occurrence(&rule, date(2024, 12, 4)),
            Some(date(2024, 12, 17))
        );
        assert_eq!(
            next_occurrence(&rule, date(2024, 12, 10)),
            Some(date(2024, 12, 17))
        );
        assert_eq!(
            next_occurrence(&rule, date(2024, 12, 24)),
            Some(date(2024, 12, 31))
        );
        assert_eq!(
            next_occurrence(&rule, date(2024, 12, 30)),
            Some(date(2024, 12, 31))
        );
    }

    #[test]
    fn biweekly_off_week_phase_selects_other_tuesdays() {
        let rule = biweekly("paper", 2, 1, date(2024, 12, 3));
        assert_eq!(
            next_occurrence(&rule, date(2024, 12, 4)),
            Some(date(2024, 12, 10))
        );
        assert_eq!(
            next_occurrence(&rule, date(2024, 12, 11)),
            Some(date(2024, 12, 24))
        );
    }

    #[test]
    fn display_date_is_evening_before_collection() {
        // Weekly Wednesdays; today is Monday.
        let rule = weekly("general", 3, date(2025, 5, 7));
        let resolved = resolve_rule(&rule, date(2025, 6, 9), &[]);
        assert_eq!(resolved, Some((date(2025, 6, 10), 0)));
    }

    #[test]
    fn holiday_shift_moves_display_and_reports_delay() {
        // Weekly Thursdays; Christmas Day 2025 pickup moves to the 27th.
        let rule = weekly("general", 4, date(2025, 12, 4));
        let exceptions = vec![HolidayException {
            original_date: date(2025, 12, 25),
            revised_date: date(2025, 12, 27),
        }];

        let resolved = resolve_rule(&rule, date(2025, 12, 22), &exceptions);
        assert_eq!(resolved, Some((date(2025, 12, 26), 2)));

        let collections =
            resolve_next_collections(at(2025, 12, 22, 10, 0), &[rule], &exceptions, 7);
        let first = collections.first().expect("one collection");
        assert_eq!(first.display_date, date(2025, 12, 26));
        assert_eq!(first.days_delay, 2);
        assert_eq!(first.days_until, 4);
    }

    #[test]
    fn passed_display_date_rolls_one_cycle_forward() {
        // On the collection Wednesday itself the display evening was
        // yesterday, so the resolver reports next week.
        let weekly_rule = weekly("general", 3, date(2025, 5, 7));
        let resolved = resolve_rule(&weekly_rule, date(2025, 6, 11), &[]);
        assert_eq!(resolved, Some((date(2025, 6, 17), 0)));

        // Biweekly rolls two weeks.
        let biweekly_rule = biweekly("recycling", 2, 0, date(2024, 12, 3));
        let resolved = resolve_rule(&biweekly_rule, date(2024, 12, 17), &[]);
        assert_eq!(resolved, Some((date(2024, 12, 30), 0)));
    }

    #[test]
    fn collection_morning_after_cutoff_reports_following_cycle() {
        // 2025-06-11 is the collection Wednesday; at 08:00 with a 07:00
        // cutoff the next reported date must belong to the following cycle.
        let rule = weekly("general", 3, date(2025, 5, 7));
        let collections = resolve_next_collections(at(2025, 6, 11, 8, 0), &[rule], &[], 7);
        let first = collections.first().expect("one collection");
        assert_eq!(first.display_date, date(2025, 6, 17));
        assert!(!first.before_cutoff);
    }

    #[test]
    fn cutoff_guard_rolls_exception_shifted_collection() {
        // An exception pulls next week's pickup back onto today, so the
        // resolved display evening is yesterday and today is collection day.
        let rule = weekly("general", 3, date(2025, 5, 7));
        let exceptions = vec![HolidayException {
            original_date: date(2025, 6, 18),
            revised_date: date(2025, 6, 11),
        }];

        // Before the cutoff the current cycle is still actionable.
        let collections =
            resolve_next_collections(at(2025, 6, 11, 6, 0), &[rule.clone()], &exceptions, 7);
        let first = collections.first().expect("one collection");
        assert_eq!(first.display_date, date(2025, 6, 10));
        assert!(first.is_collection_day);
        assert!(first.before_cutoff);

        // After the cutoff the resolver skips a full cycle ahead.
        let collections = resolve_next_collections(at(2025, 6, 11, 8, 0), &[rule], &exceptions, 7);
        let first = collections.first().expect("one collection");
        assert_eq!(first.display_date, date(2025, 6, 17));
        assert!(!first.is_collection_day);
        assert!(!first.before_cutoff);
    }

    #[test]
    fn display_day_flag_set_on_the_evening_before() {
        let rule = weekly("general", 3, date(2025, 5, 7));
        let collections = resolve_next_collections(at(2025, 6, 10, 19, 0), &[rule], &[], 7);
        let first = collections.first().expect("one collection");
        assert_eq!(first.display_date, date(2025, 6, 10));
        assert!(first.is_display_day);
        assert!(!first.is_collection_day);
        assert_eq!(first.days_until, 0);
    }

    #[test]
    fn days_until_counts_partial_days_up() {
        let rule = weekly("general", 3, date(2025, 5, 7));
        // Monday 18:00 → display Tuesday: 6 hours away still counts as 1 day.
        let collections = resolve_next_collections(at(2025, 6, 9, 18, 0), &[rule.clone()], &[], 7);
        assert_eq!(collections.first().expect("one").days_until, 1);
        // Thursday noon → display next Tuesday.
        let collections = resolve_next_collections(at(2025, 6, 5, 12, 0), &[rule], &[], 7);
        assert_eq!(collections.first().expect("one").days_until, 5);
    }

    #[test]
    fn ties_on_the_earliest_evening_are_grouped() {
        // General waste collects every Wednesday, recycling on the anchored
        // alternating Wednesday, paper on Fridays: the first two tie.
        let rules = vec![
            weekly("general", 3, date(2025, 5, 7)),
            biweekly("recycling", 3, 0, date(2025, 6, 11)),
            weekly("paper", 5, date(2025, 5, 9)),
        ];
        let collections = resolve_next_collections(at(2025, 6, 9, 12, 0), &rules, &[], 7);

        let names: Vec<&str> = collections
            .iter()
            .map(|collection| collection.name.as_str())
            .collect();
        assert_eq!(names, vec!["general", "recycling"]);
        assert!(
            collections
                .iter()
                .all(|collection| collection.display_date == date(2025, 6, 10))
        );
    }

    #[test]
    fn empty_rule_list_resolves_to_nothing() {
        assert!(resolve_next_collections(at(2025, 6, 9, 12, 0), &[], &[], 7).is_empty());
    }

    #[test]
    fn resolution_is_idempotent() {
        let rules = vec![
            weekly("general", 3, date(2025, 5, 7)),
            biweekly("recycling", 2, 1, date(2024, 12, 10)),
        ];
        let exceptions = vec![HolidayException {
            original_date: date(2025, 6, 18),
            revised_date: date(2025, 6, 20),
        }];

        let now = at(2025, 6, 11, 8, 30);
        let first = resolve_next_collections(now, &rules, &exceptions, 7);
        let second = resolve_next_collections(now, &rules, &exceptions, 7);
        assert_eq!(first, second);
    }

    #[test]
    fn out_of_range_weekday_is_skipped() {
        let mut rule = weekly("general", 3, date(2025, 5, 7));
        rule.day_of_week = 9;
        assert!(resolve_next_collections(at(2025, 6, 9, 12, 0), &[rule], &[], 7).is_empty());
    }
}
