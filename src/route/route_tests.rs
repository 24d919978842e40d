// ─────────────────────────────── Tests ───────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::config::{ChannelId, Pipeline};
    use crate::route::*;
    use crate::route::{RouteShape, tokenize};

    fn pipeline(name: &str, scope: &[&str], targets: &[ChannelId]) -> Pipeline {
        Pipeline {
            name: name.to_string(),
            city_scope: scope.iter().map(|s| s.to_string()).collect(),
            target_channel_ids: targets.to_vec(),
        }
    }

    fn scoped(scope: &[&str]) -> Vec<Pipeline> {
        vec![pipeline("test", scope, &[1])]
    }

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    // ── Extraction ──

    #[test]
    fn from_to_route() {
        let pipelines = vec![
            pipeline("delhi", &["Delhi"], &[1]),
            pipeline("tricity", &["Mohali", "Chandigarh"], &[2]),
        ];
        assert_eq!(
            extract_cities_for_pipelines("need taxi from Delhi to Mohali", &pipelines),
            vec!["Delhi", "Mohali"]
        );
    }

    #[test]
    fn single_city_with_business_noise() {
        assert_eq!(
            extract_cities_for_pipelines(
                "Singh Travels Amritsar contact 9876543210",
                &scoped(&["Amritsar"])
            ),
            vec!["Amritsar"]
        );
    }

    #[test]
    fn only_configured_cities_are_reported() {
        // Mohali is mentioned but no pipeline asks for it.
        assert_eq!(
            extract_cities_for_pipelines("delhi to mohali", &scoped(&["Delhi"])),
            vec!["Delhi"]
        );
    }

    #[test]
    fn longest_phrase_wins() {
        // "noida sector" claims the sector before "sector 62" could.
        assert_eq!(
            extract_cities_for_pipelines("noida sector 62", &scoped(&["Noida", "Chandigarh"])),
            vec!["Noida"]
        );
        assert_eq!(
            extract_cities_for_pipelines("noida sector 62 to delhi", &scoped(&["Noida", "Delhi"])),
            vec!["Noida", "Delhi"]
        );
    }

    #[test]
    fn unnamed_sector_is_not_chandigarh() {
        let pipelines = scoped(&["Chandigarh", "Mohali", "Delhi"]);
        assert_eq!(
            extract_cities_for_pipelines("sector 70 mohali to delhi 9876543210", &pipelines),
            vec!["Mohali", "Delhi"]
        );
        assert_eq!(
            extract_cities_for_pipelines("sector 17 to delhi", &pipelines),
            vec!["Chandigarh", "Delhi"]
        );
    }

    #[test]
    fn aliases_resolve_to_configured_spelling() {
        assert_eq!(
            extract_cities_for_pipelines(
                "Pickup: Kharar   Drop: CHD",
                &scoped(&["mohali", "Chandigarh"])
            ),
            vec!["mohali", "Chandigarh"]
        );
    }

    #[test]
    fn hindi_se_route() {
        assert_eq!(
            extract_cities_for_pipelines("मोहाली से दिल्ली टैक्सी चाहिए", &scoped(&["Delhi", "Mohali"])),
            vec!["Mohali", "Delhi"]
        );
    }

    #[test]
    fn hinglish_se_route() {
        assert_eq!(
            extract_cities_for_pipelines("kharar se dilli innova chahiye", &scoped(&["Delhi", "Mohali"])),
            vec!["Mohali", "Delhi"]
        );
    }

    #[test]
    fn segments_separated_by_punctuation() {
        assert_eq!(
            extract_cities_for_pipelines(
                "Amb / Ptl | Zirakpur, Delhi",
                &scoped(&["Ambala", "Patiala", "Zirakpur", "Delhi"])
            ),
            vec!["Ambala", "Patiala", "Zirakpur", "Delhi"]
        );
    }

    #[test]
    fn two_letter_codes_must_stand_alone() {
        assert_eq!(
            extract_cities_for_pipelines("cp to airport", &scoped(&["Delhi"])),
            vec!["Delhi"]
        );
        assert!(extract_cities_for_pipelines("tcp to airport", &scoped(&["Delhi"])).is_empty());
    }

    #[test]
    fn fallback_scan_keeps_noise_words() {
        // "taxi" is noise for the regular scan, but it is part of this name.
        assert_eq!(
            extract_cities_for_pipelines(
                "drop at airport taxi stand 9876543210",
                &scoped(&["Airport Taxi Stand"])
            ),
            vec!["Airport Taxi Stand"]
        );
    }

    #[test]
    fn no_cities_without_concrete_scopes() {
        assert!(extract_cities_for_pipelines("delhi to mohali", &scoped(&["*"])).is_empty());
        assert!(extract_cities_for_pipelines("delhi to mohali", &scoped(&[])).is_empty());
        assert!(extract_cities_for_pipelines("", &scoped(&["Delhi"])).is_empty());
    }

    #[test]
    fn duplicates_reported_once() {
        assert_eq!(
            extract_cities_for_pipelines("delhi to mohali, back to delhi", &scoped(&["Delhi", "Mohali"])),
            vec!["Delhi", "Mohali"]
        );
    }

    // ── Route shapes ──

    fn tokens(text: &str) -> HashSet<&str> {
        tokenize(text).into_iter().collect()
    }

    #[test]
    fn from_to_shape() {
        let text = "need taxi from kharar to delhi airport 9876543210";
        assert!(RouteShape::FromTo.applies(&tokens(text)));
        assert_eq!(
            RouteShape::FromTo.captures(text),
            strings(&["kharar", "delhi airport"])
        );
        assert!(RouteShape::FromTo.captures("kharar to delhi").is_empty());
    }

    #[test]
    fn bare_to_shape_needs_no_from() {
        let text = "kharar to delhi call 9876543210";
        assert!(RouteShape::BareTo.applies(&tokens(text)));
        assert_eq!(RouteShape::BareTo.captures(text), strings(&["kharar", "delhi"]));

        assert!(!RouteShape::BareTo.applies(&tokens("from kharar to delhi")));
    }

    #[test]
    fn se_shape_needs_no_to() {
        let text = "kharar se delhi";
        assert!(RouteShape::HindiSe.applies(&tokens(text)));
        assert_eq!(RouteShape::HindiSe.captures(text), strings(&["kharar", "delhi"]));
        assert_eq!(
            RouteShape::HindiSe.captures("खरड़ से दिल्ली"),
            strings(&["खरड़", "दिल्ली"])
        );

        assert!(!RouteShape::HindiSe.applies(&tokens("kharar se to delhi")));
    }

    #[test]
    fn hyphen_shape_rejects_numeric_sides() {
        assert!(RouteShape::Hyphen.applies(&tokens("kharar - delhi")));
        assert_eq!(RouteShape::Hyphen.captures("kharar - delhi"), strings(&["kharar", "delhi"]));
        assert!(RouteShape::Hyphen.captures("12 - 34").is_empty());
        assert!(RouteShape::Hyphen.captures("ambala - 9876").is_empty());
    }

    #[test]
    fn labeled_shape() {
        assert!(RouteShape::Labeled.applies(&tokens("place: zirakpur")));
        assert_eq!(RouteShape::Labeled.captures("place: zirakpur"), strings(&["zirakpur"]));
        assert_eq!(
            RouteShape::Labeled.captures("pickup: kharar drop: delhi airport"),
            strings(&["kharar", "delhi airport"])
        );
        assert_eq!(
            RouteShape::Labeled.captures("pick up amb, drop ptl 9876543210"),
            strings(&["amb", "ptl"])
        );
        assert!(RouteShape::Labeled.captures("drop: 9876543210").is_empty());
    }

    // ── Matching ──

    #[test]
    fn wildcard_scope_matches_everything() {
        assert!(matches_pipeline(&[], &strings(&["*"])));
        assert!(matches_pipeline(&strings(&["Agra"]), &strings(&["Delhi", "*"])));
    }

    #[test]
    fn empty_scope_matches_nothing() {
        assert!(!matches_pipeline(&strings(&["Delhi"]), &[]));
    }

    #[test]
    fn one_overlapping_city_is_enough() {
        let scope = strings(&["Mohali", "Chandigarh"]);
        assert!(matches_pipeline(&strings(&["Delhi", "Mohali"]), &scope));
        assert!(!matches_pipeline(&strings(&["Delhi"]), &scope));
        assert!(!matches_pipeline(&[], &scope));
    }

    #[test]
    fn matching_ignores_case() {
        assert!(matches_pipeline(&strings(&["delhi"]), &strings(&["Delhi"])));
        assert!(matches_pipeline(&strings(&["DELHI"]), &strings(&[" delhi "])));
    }

    #[test]
    fn targets_are_unioned_in_pipeline_order() {
        let pipelines = vec![
            pipeline("delhi", &["Delhi"], &[1, 2]),
            pipeline("tricity", &["Mohali"], &[2, 3]),
            pipeline("agra", &["Agra"], &[4]),
            pipeline("all", &["*"], &[5, 1]),
        ];
        let m = match_pipelines(&strings(&["Delhi", "Mohali"]), &pipelines);
        assert_eq!(m.pipelines, vec!["delhi", "tricity", "all"]);
        assert_eq!(m.targets, vec![1, 2, 3, 5]);
    }

    #[test]
    fn nothing_matches_without_cities() {
        let pipelines = vec![pipeline("delhi", &["Delhi"], &[1])];
        let m = match_pipelines(&[], &pipelines);
        assert!(m.pipelines.is_empty());
        assert!(m.targets.is_empty());
    }
}
