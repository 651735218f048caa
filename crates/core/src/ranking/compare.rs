//! Per-key value extraction and comparison.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::iter::Peekable;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::{SortDirection, SortDirective, SortKey};
use crate::record::ResultRecord;

/// A record's value for one sort key, already in comparable form.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue<'a> {
    Text(&'a str),
    Number(u64),
    Instant(DateTime<Utc>),
}

/// Extract the value `record` holds for `key`.
///
/// `None` means the value is missing, including dates that do not parse.
pub fn sort_value(record: &ResultRecord, key: SortKey) -> Option<SortValue<'_>> {
    match key {
        SortKey::Title => record.title.as_deref().map(SortValue::Text),
        SortKey::CategoryLabel => record.category_label.as_deref().map(SortValue::Text),
        SortKey::Tracker => record.tracker.as_deref().map(SortValue::Text),
        SortKey::SizeBytes => record.size_bytes.map(SortValue::Number),
        SortKey::SeederCount => record.seeder_count.map(SortValue::Number),
        SortKey::PeerCount => record.peer_count.map(SortValue::Number),
        SortKey::PublishDate => record.published_at().map(SortValue::Instant),
    }
}

/// Ascending-sense comparison of two present values.
pub fn compare_values(a: &SortValue<'_>, b: &SortValue<'_>) -> Ordering {
    match (a, b) {
        (SortValue::Text(a), SortValue::Text(b)) => natural_cmp(a, b),
        (SortValue::Number(a), SortValue::Number(b)) => a.cmp(b),
        (SortValue::Instant(a), SortValue::Instant(b)) => a.cmp(b),
        // Values of one key always share a variant
        _ => Ordering::Equal,
    }
}

/// Compare two possibly-missing values under `direction`.
///
/// Missing values go last whichever way the list is sorted; only the
/// comparison between present values is reversed for descending order.
pub fn compare_optional(
    a: Option<&SortValue<'_>>,
    b: Option<&SortValue<'_>>,
    direction: SortDirection,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ordering = compare_values(a, b);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        }
    }
}

/// Full comparator for two records under a directive.
pub fn compare_records(a: &ResultRecord, b: &ResultRecord, directive: SortDirective) -> Ordering {
    compare_optional(
        sort_value(a, directive.key).as_ref(),
        sort_value(b, directive.key).as_ref(),
        directive.direction,
    )
}

/// Accent- and case-insensitive string comparison with numeric digit runs.
///
/// Letters are compared after folding: decomposed to NFD with combining
/// marks dropped, then lowercased, so "résumé" equals "resume" and
/// "Éclair" sorts among the e's. Whitespace and punctuation sort before
/// digits, digits before letters.
///
/// "Episode 9" sorts before "Episode 10". Digit runs are compared by
/// value regardless of length, so leading zeros are ignored and runs
/// longer than any integer type still compare correctly.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = fold(a).peekable();
    let mut right = fold(b).peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_run = take_digit_run(&mut left);
                let r_run = take_digit_run(&mut right);
                let ordering = compare_digit_runs(&l_run, &r_run);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(l), Some(r)) => {
                let ordering = char_class(l).cmp(&char_class(r)).then(l.cmp(&r));
                if ordering != Ordering::Equal {
                    return ordering;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn fold(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(fold_letter)
        .flat_map(char::to_lowercase)
}

/// Letters with no canonical decomposition that still read as a base letter.
fn fold_letter(c: char) -> char {
    match c {
        'ø' | 'Ø' => 'o',
        'ł' | 'Ł' => 'l',
        'đ' | 'Đ' => 'd',
        'ħ' | 'Ħ' => 'h',
        'ı' => 'i',
        _ => c,
    }
}

fn char_class(c: char) -> u8 {
    if c.is_alphabetic() {
        2
    } else if c.is_numeric() {
        1
    } else {
        0
    }
}

fn take_digit_run<I: Iterator<Item = char>>(chars: &mut Peekable<I>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
        run.push(c);
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_cmp_numeric_runs() {
        assert_eq!(natural_cmp("Episode 9", "Episode 10"), Ordering::Less);
        assert_eq!(natural_cmp("Episode 10", "Episode 2"), Ordering::Greater);
        assert_eq!(natural_cmp("S01E05", "S01E5"), Ordering::Equal);
        assert_eq!(
            natural_cmp("track 99999999999999999999999", "track 100000000000000000000000"),
            Ordering::Less
        );
    }

    #[test]
    fn test_natural_cmp_case_insensitive() {
        assert_eq!(natural_cmp("ubuntu", "Ubuntu"), Ordering::Equal);
        assert_eq!(natural_cmp("alpha", "Beta"), Ordering::Less);
        assert_eq!(natural_cmp("ÉCOLE", "école"), Ordering::Equal);
    }

    #[test]
    fn test_natural_cmp_folds_accents() {
        assert_eq!(natural_cmp("résumé", "resume"), Ordering::Equal);
        assert_eq!(natural_cmp("Éclair", "Apple"), Ordering::Greater);
        assert_eq!(natural_cmp("Éclair", "Zebra"), Ordering::Less);
        assert_eq!(natural_cmp("Ørsted", "Oslo"), Ordering::Less);
        assert_eq!(natural_cmp("Amélie 2", "Amelie 10"), Ordering::Less);
    }

    #[test]
    fn test_natural_cmp_punctuation_before_digits_before_letters() {
        assert_eq!(natural_cmp("_extras", "1080p"), Ordering::Less);
        assert_eq!(natural_cmp("~tilde", "alpha"), Ordering::Less);
        assert_eq!(natural_cmp("Movie (2019)", "Movie 2019"), Ordering::Less);
    }

    #[test]
    fn test_rank_titles_with_accents() {
        let records = vec![
            ResultRecord::new(1, "Zebra"),
            ResultRecord::new(2, "Éclair"),
            ResultRecord::new(3, "Apple"),
        ];
        let mut sorted = records.clone();
        let directive = SortDirective::new(SortKey::Title, SortDirection::Ascending);
        sorted.sort_by(|a, b| compare_records(a, b, directive));

        let titles: Vec<_> = sorted.iter().filter_map(|r| r.title.as_deref()).collect();
        assert_eq!(titles, vec!["Apple", "Éclair", "Zebra"]);
    }

    #[test]
    fn test_natural_cmp_prefix() {
        assert_eq!(natural_cmp("Movie", "Movie 2"), Ordering::Less);
        assert_eq!(natural_cmp("", "a"), Ordering::Less);
        assert_eq!(natural_cmp("", ""), Ordering::Equal);
    }

    #[test]
    fn test_natural_cmp_digits_versus_letters() {
        assert_eq!(natural_cmp("1984", "Abbey Road"), Ordering::Less);
    }

    #[test]
    fn test_sort_value_unparseable_date_is_missing() {
        let record = ResultRecord::new(1, "x").with_publish_date("last tuesday");
        assert!(sort_value(&record, SortKey::PublishDate).is_none());

        let record = ResultRecord::new(1, "x").with_publish_date("2024-01-01T00:00:00Z");
        assert!(matches!(
            sort_value(&record, SortKey::PublishDate),
            Some(SortValue::Instant(_))
        ));
    }

    #[test]
    fn test_compare_optional_missing_last_both_directions() {
        let present = SortValue::Number(1);
        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            assert_eq!(
                compare_optional(None, Some(&present), direction),
                Ordering::Greater
            );
            assert_eq!(
                compare_optional(Some(&present), None, direction),
                Ordering::Less
            );
            assert_eq!(compare_optional(None, None, direction), Ordering::Equal);
        }
    }

    #[test]
    fn test_compare_records_direction() {
        let small = ResultRecord::new(1, "a").with_size(10);
        let large = ResultRecord::new(2, "b").with_size(20);

        let asc = SortDirective::new(SortKey::SizeBytes, SortDirection::Ascending);
        let desc = SortDirective::new(SortKey::SizeBytes, SortDirection::Descending);

        assert_eq!(compare_records(&small, &large, asc), Ordering::Less);
        assert_eq!(compare_records(&small, &large, desc), Ordering::Greater);
    }
}
