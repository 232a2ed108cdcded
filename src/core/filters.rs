use crate::models::{Place, PlaceCategory};

/// The filter token that disables category filtering
pub const ALL_FILTER: &str = "all";

/// Check if a place matches a free-text query
///
/// Case-insensitive substring match against the name or the address.
/// An empty query matches every place.
#[inline]
pub fn matches_query(place: &Place, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }

    let query = query.to_lowercase();
    place.name.to_lowercase().contains(&query) || place.address.to_lowercase().contains(&query)
}

/// Check if a place matches a category filter token
///
/// The place's category text must contain the token itself, or the
/// keyword the token is aliased to (`lodging` matches `Hotel`).
#[inline]
pub fn matches_category(place: &Place, filter: &str) -> bool {
    if filter == ALL_FILTER {
        return true;
    }

    let category = place.category.to_lowercase();
    if category.contains(&filter.to_lowercase()) {
        return true;
    }

    filter
        .parse::<PlaceCategory>()
        .ok()
        .and_then(|c| c.keyword())
        .is_some_and(|keyword| category.contains(keyword))
}

/// Filter places by query and category, keeping their relative order
pub fn filter_places<'a, I>(places: I, query: &str, filter: &str) -> Vec<Place>
where
    I: IntoIterator<Item = &'a Place>,
{
    places
        .into_iter()
        // Stage 1: text match
        .filter(|place| matches_query(place, query))
        // Stage 2: category filter
        .filter(|place| matches_category(place, filter))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_place(name: &str, address: &str, category: &str) -> Place {
        Place {
            id: name.to_lowercase(),
            name: name.to_string(),
            address: address.to_string(),
            category: category.to_string(),
            rating: Some(4.0),
            image_url: None,
            phone: None,
            opening_hours: None,
            is_open: Some(true),
            distance: None,
            website: None,
            price_level: None,
            coordinates: None,
        }
    }

    #[test]
    fn test_query_matches_name_case_insensitive() {
        let place = create_test_place("Artisan Coffee House", "321 Coffee Lane", "Cafe");
        assert!(matches_query(&place, "coffee"));
        assert!(matches_query(&place, "ARTISAN"));
        assert!(!matches_query(&place, "tea"));
    }

    #[test]
    fn test_query_matches_address() {
        let place = create_test_place("City Hospital", "987 Health Drive, Medical Center", "Hospital");
        assert!(matches_query(&place, "medical"));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let place = create_test_place("Anything", "Anywhere", "Other");
        assert!(matches_query(&place, ""));
    }

    #[test]
    fn test_all_filter_matches_everything() {
        let place = create_test_place("Anything", "Anywhere", "Other");
        assert!(matches_category(&place, "all"));
    }

    #[test]
    fn test_aliased_filters() {
        let hotel = create_test_place("Grand Plaza Hotel", "456 Commerce Ave", "Hotel");
        let mall = create_test_place("Central Mall", "789 Shopping Blvd", "Shopping");
        let gas = create_test_place("Shell", "654 Highway 101", "Gas Station");

        assert!(matches_category(&hotel, "lodging"));
        assert!(matches_category(&mall, "shopping_mall"));
        assert!(matches_category(&gas, "gas_station"));
        assert!(!matches_category(&hotel, "gas_station"));
    }

    #[test]
    fn test_unknown_filter_falls_back_to_substring() {
        let gas = create_test_place("Shell", "654 Highway 101", "Gas Station");
        assert!(matches_category(&gas, "Station"));
        assert!(!matches_category(&gas, "museum"));
    }

    #[test]
    fn test_filter_places_preserves_order() {
        let places = vec![
            create_test_place("B Cafe", "1 Road", "Cafe"),
            create_test_place("A Hotel", "2 Road", "Hotel"),
            create_test_place("C Cafe", "3 Road", "Cafe"),
        ];

        let result = filter_places(&places, "road", "cafe");
        let names: Vec<&str> = result.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["B Cafe", "C Cafe"]);
    }
}
