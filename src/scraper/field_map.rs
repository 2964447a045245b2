// Mapping table: portal label (Turkish) -> canonical detail key.
// This is the source of truth for detail field names. If the portal's UI
// labels change, only this table needs updating.

pub fn canonical_key(label: &str) -> Option<&'static str> {
    let key = match label.trim() {
        // Identity & meta
        "İlan no" => "listing_id",
        "Son Güncelleme" => "last_updated",
        "İlan Durumu" => "listing_type",

        // Physical
        "Konut Tipi" => "property_type",
        "Konut Şekli" => "housing_form",

        // Dimensions & rooms
        "Oda Sayısı" => "room_count",
        "Banyo Sayısı" => "bathroom_count",
        "Brüt / Net M2" => "m2_info",

        // Floor info
        "Kat Sayısı" => "total_floors",
        "Bulunduğu Kat" => "floor_location",

        // Utilities & comfort
        "Isınma Tipi" => "heating_type",
        "Eşya Durumu" => "is_furnished",
        "Cephe" => "facade",

        // Financial & legal
        "Bina Yaşı" => "building_age",
        "Krediye Uygunluk" => "credit_eligibility",
        // The portal truncates this label on narrow layouts.
        "Krediye Uygunlu..." => "credit_eligibility",
        "Tapu Durumu" => "title_deed_status",
        "Takas" => "swap_available",

        _ => return None,
    };
    Some(key)
}
