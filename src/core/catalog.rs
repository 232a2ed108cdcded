use crate::models::Place;

struct Entry {
    id: &'static str,
    name: &'static str,
    address: &'static str,
    rating: f32,
    category: &'static str,
    image_url: &'static str,
    phone: &'static str,
    opening_hours: &'static str,
    distance: f64,
}

const ENTRIES: [Entry; 6] = [
    Entry {
        id: "1",
        name: "The Garden Cafe",
        address: "123 Main Street, Downtown",
        rating: 4.5,
        category: "Restaurant",
        image_url: "https://images.pexels.com/photos/262978/pexels-photo-262978.jpeg",
        phone: "+1 (555) 123-4567",
        opening_hours: "8:00 AM - 10:00 PM",
        distance: 250.0,
    },
    Entry {
        id: "2",
        name: "Grand Plaza Hotel",
        address: "456 Commerce Ave, Business District",
        rating: 4.2,
        category: "Hotel",
        image_url: "https://images.pexels.com/photos/258154/pexels-photo-258154.jpeg",
        phone: "+1 (555) 987-6543",
        opening_hours: "24 hours",
        distance: 800.0,
    },
    Entry {
        id: "3",
        name: "Central Shopping Mall",
        address: "789 Shopping Blvd, Mall District",
        rating: 4.0,
        category: "Shopping",
        image_url: "https://images.pexels.com/photos/1058277/pexels-photo-1058277.jpeg",
        phone: "+1 (555) 456-7890",
        opening_hours: "10:00 AM - 9:00 PM",
        distance: 1200.0,
    },
    Entry {
        id: "4",
        name: "Artisan Coffee House",
        address: "321 Coffee Lane, Arts Quarter",
        rating: 4.7,
        category: "Cafe",
        image_url: "https://images.pexels.com/photos/302899/pexels-photo-302899.jpeg",
        phone: "+1 (555) 234-5678",
        opening_hours: "6:00 AM - 6:00 PM",
        distance: 450.0,
    },
    Entry {
        id: "5",
        name: "City Hospital",
        address: "987 Health Drive, Medical Center",
        rating: 4.3,
        category: "Hospital",
        image_url: "https://images.pexels.com/photos/263402/pexels-photo-263402.jpeg",
        phone: "+1 (555) 345-6789",
        opening_hours: "24 hours",
        distance: 2100.0,
    },
    Entry {
        id: "6",
        name: "Shell Gas Station",
        address: "654 Highway 101, Transit Hub",
        rating: 3.8,
        category: "Gas Station",
        image_url: "https://images.pexels.com/photos/1563356/pexels-photo-1563356.jpeg",
        phone: "+1 (555) 567-8901",
        opening_hours: "24 hours",
        distance: 600.0,
    },
];

/// The built-in six-place demo catalog
pub fn demo_places() -> Vec<Place> {
    ENTRIES
        .iter()
        .map(|e| Place {
            id: e.id.to_string(),
            name: e.name.to_string(),
            address: e.address.to_string(),
            category: e.category.to_string(),
            rating: Some(e.rating),
            image_url: Some(e.image_url.to_string()),
            phone: Some(e.phone.to_string()),
            opening_hours: Some(e.opening_hours.to_string()),
            is_open: Some(true),
            distance: Some(e.distance),
            website: None,
            price_level: None,
            coordinates: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_ids_are_unique() {
        let places = demo_places();
        let ids: HashSet<&str> = places.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(places.len(), 6);
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_catalog_ratings_in_range() {
        for place in demo_places() {
            let rating = place.rating.unwrap_or_default();
            assert!((0.0..=5.0).contains(&rating), "{} has rating {}", place.name, rating);
        }
    }
}
