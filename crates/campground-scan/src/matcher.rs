use chrono::NaiveDate;

use crate::scan_types::MonthlyAvailability;

/// Find the sites that are available for every one of `nights`.
///
/// An empty `nights` slice matches no sites: a stay without nights is a malformed
/// request, not a stay every site satisfies. The result is sorted by site id.
pub fn find_fully_available_sites(
    availability: &MonthlyAvailability,
    nights: &[NaiveDate],
) -> Vec<String> {
    if nights.is_empty() {
        return Vec::new();
    }

    let mut sites: Vec<String> = availability
        .sites
        .iter()
        .filter(|(_, site)| nights.iter().all(|night| site.is_available_on(*night)))
        .map(|(site_id, _)| site_id.clone())
        .collect();

    sites.sort();
    sites
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_range::build_nights;
    use crate::scan_types::SiteAvailability;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn month(sites: Vec<SiteAvailability>) -> MonthlyAvailability {
        let mut availability = MonthlyAvailability::new("232447");
        for site in sites {
            availability.insert_site(site);
        }
        availability
    }

    fn site(id: &str, statuses: &[(NaiveDate, &str)]) -> SiteAvailability {
        statuses
            .iter()
            .fold(SiteAvailability::new(id), |site, (date, status)| {
                site.with_status(*date, *status)
            })
    }

    #[test]
    fn test_reserved_night_excludes_site() {
        let availability = month(vec![
            site(
                "A",
                &[
                    (date(2024, 3, 5), "Available"),
                    (date(2024, 3, 6), "Available"),
                    (date(2024, 3, 7), "Available"),
                ],
            ),
            site(
                "B",
                &[
                    (date(2024, 3, 5), "Available"),
                    (date(2024, 3, 6), "Reserved"),
                    (date(2024, 3, 7), "Available"),
                ],
            ),
        ]);
        let nights = build_nights(date(2024, 3, 5), date(2024, 3, 8));

        assert_eq!(find_fully_available_sites(&availability, &nights), vec!["A"]);
    }

    #[test]
    fn test_empty_nights_match_nothing() {
        let availability = month(vec![site("A", &[(date(2024, 3, 5), "Available")])]);
        assert!(find_fully_available_sites(&availability, &[]).is_empty());

        let reversed = build_nights(date(2024, 3, 8), date(2024, 3, 5));
        assert!(find_fully_available_sites(&availability, &reversed).is_empty());
    }

    #[test]
    fn test_empty_month_matches_nothing() {
        let nights = build_nights(date(2024, 3, 5), date(2024, 3, 8));
        assert!(find_fully_available_sites(&MonthlyAvailability::default(), &nights).is_empty());
    }

    #[test]
    fn test_missing_night_excludes_site() {
        let availability = month(vec![site(
            "A",
            &[(date(2024, 3, 5), "Available"), (date(2024, 3, 7), "Available")],
        )]);
        let nights = build_nights(date(2024, 3, 5), date(2024, 3, 8));

        assert!(find_fully_available_sites(&availability, &nights).is_empty());
    }

    #[test]
    fn test_any_single_flip_removes_site() {
        let nights = build_nights(date(2024, 6, 10), date(2024, 6, 15));
        let all_available: Vec<(NaiveDate, &str)> =
            nights.iter().map(|night| (*night, "Available")).collect();

        assert_eq!(
            find_fully_available_sites(&month(vec![site("A", &all_available)]), &nights),
            vec!["A"]
        );

        for flipped in 0..nights.len() {
            for label in ["Reserved", "Not Available", "Walk-up", "available", "A"] {
                let mut statuses = all_available.clone();
                statuses[flipped].1 = label;
                let availability = month(vec![site("A", &statuses), site("B", &all_available)]);

                assert_eq!(
                    find_fully_available_sites(&availability, &nights),
                    vec!["B"],
                    "night {} labelled {:?} should exclude site A",
                    flipped,
                    label
                );
            }
        }
    }

    #[test]
    fn test_result_is_sorted() {
        let nights = vec![date(2024, 3, 5)];
        let availability = month(
            ["7", "10", "003", "B12", "A01"]
                .into_iter()
                .map(|id| site(id, &[(date(2024, 3, 5), "Available")]))
                .collect(),
        );

        assert_eq!(
            find_fully_available_sites(&availability, &nights),
            vec!["003", "10", "7", "A01", "B12"]
        );
    }
}
