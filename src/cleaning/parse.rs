// src/cleaning/parse.rs
//
// Pure parsers for the field formats the portal actually uses. Every parser
// tolerates surrounding whitespace and returns None on garbage.

use chrono::NaiveDate;

/// Canonical text folding for any string that participates in matching:
/// trim, collapse inner whitespace, lowercase with Turkish dotted/dotless I
/// handled, then flatten diacritics to ASCII.
pub fn fold_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, word) in s.split_whitespace().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        for c in word.chars() {
            match c {
                // Turkish I rules first: İ lowercases to i, I to ı (then to i).
                'İ' | 'I' | 'ı' => out.push('i'),
                'Ç' | 'ç' => out.push('c'),
                'Ğ' | 'ğ' => out.push('g'),
                'Ö' | 'ö' => out.push('o'),
                'Ş' | 'ş' => out.push('s'),
                'Ü' | 'ü' => out.push('u'),
                _ => out.extend(c.to_lowercase()),
            }
        }
    }
    out
}

/// "2.450.000 TL" -> 2_450_000. Dots are thousands separators; an optional
/// currency suffix is stripped; a stray comma-decimal is truncated.
pub fn parse_price(s: &str) -> Option<i64> {
    let mut t = s.trim();
    for suffix in ["TL", "tl", "₺"] {
        t = t.trim_end_matches(suffix).trim();
    }
    // "1.250.000,50" -> keep the lira part only
    if let Some(idx) = t.find(',') {
        t = &t[..idx];
    }
    let digits: String = t.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// "120 m2" / "120 m²" / "120,5 m2" -> 120.0 / 120.5.
pub fn parse_area(s: &str) -> Option<f64> {
    let t = s
        .trim()
        .trim_end_matches("m²")
        .trim_end_matches("m2")
        .trim_end_matches("M2")
        .trim()
        .replace('.', "")
        .replace(',', ".");
    if t.is_empty() {
        return None;
    }
    t.parse().ok().filter(|v: &f64| v.is_finite() && *v > 0.0)
}

/// "Brüt / Net" pair: "130 m2 / 110 m2" -> (Some(130.0), Some(110.0)).
pub fn parse_m2_info(s: &str) -> (Option<f64>, Option<f64>) {
    let mut parts = s.splitn(2, '/');
    let gross = parts.next().and_then(parse_area);
    let net = parts.next().and_then(parse_area);
    (gross, net)
}

/// "3+1" -> (3, 1); "Stüdyo" -> (1, 0); bare "2" -> (2, 0).
pub fn parse_rooms(s: &str) -> Option<(u32, u32)> {
    let folded = fold_text(s);
    if folded.is_empty() {
        return None;
    }
    if folded.contains("studyo") {
        return Some((1, 0));
    }
    if let Some((a, b)) = folded.split_once('+') {
        let rooms = a.trim().parse().ok()?;
        let living = b.trim().parse().unwrap_or(0);
        return Some((rooms, living));
    }
    folded.trim().parse().ok().map(|r| (r, 0))
}

/// Named and numbered floors to integers; basements negative. "Çatı Katı"
/// maps to the top floor when the total is known, otherwise stays unknown.
pub fn parse_floor(s: &str, total_floors: Option<u32>) -> Option<i32> {
    let folded = fold_text(s);
    if folded.is_empty() {
        return None;
    }
    match folded.as_str() {
        "giris kati" | "bahce kati" | "zemin kat" | "yuksek giris" => return Some(0),
        "bodrum kat" | "bodrum" => return Some(-1),
        "cati kati" => return total_floors.map(|t| t as i32),
        _ => {}
    }
    if let Some(rest) = folded.strip_prefix("kot ") {
        return rest.trim().parse::<i32>().ok().map(|k| -k);
    }
    // "5. kat" or a bare number
    let digits: String = folded.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// "Sıfır Bina"/"0" -> 0; "5-10 arası" -> 7 (midpoint, rounded down);
/// "21 Ve Üzeri" -> 25.
pub fn parse_building_age(s: &str) -> Option<u32> {
    let folded = fold_text(s);
    if folded.is_empty() {
        return None;
    }
    if folded.contains("sifir") {
        return Some(0);
    }
    if let Some((a, b)) = folded.split_once('-') {
        let lo: u32 = a.trim().parse().ok()?;
        let hi: u32 = b
            .trim()
            .split_whitespace()
            .next()
            .and_then(|t| t.parse().ok())?;
        return Some((lo + hi) / 2);
    }
    if folded.contains("ve uzeri") {
        let base: u32 = folded.split_whitespace().next()?.parse().ok()?;
        return Some(base + 4);
    }
    folded.trim().parse().ok()
}

/// "Var" -> true, "Yok" -> false.
pub fn parse_yes_no(s: &str) -> Option<bool> {
    match fold_text(s).as_str() {
        "var" => Some(true),
        "yok" => Some(false),
        _ => None,
    }
}

/// "Eşyalı" -> furnished; "Boş"/"Eşyasız" -> unfurnished.
pub fn parse_furnished(s: &str) -> Option<bool> {
    match fold_text(s).as_str() {
        "esyali" => Some(true),
        "bos" | "esyasiz" => Some(false),
        _ => None,
    }
}

const TURKISH_MONTHS: [&str; 12] = [
    "ocak", "subat", "mart", "nisan", "mayis", "haziran", "temmuz", "agustos", "eylul", "ekim",
    "kasim", "aralik",
];

/// "18 Ağustos 2025" -> 2025-08-18.
pub fn parse_turkish_date(s: &str) -> Option<NaiveDate> {
    let folded = fold_text(s);
    let mut parts = folded.split_whitespace();
    let day: u32 = parts.next()?.parse().ok()?;
    let month_name = parts.next()?;
    let year: i32 = parts.next()?.parse().ok()?;
    let month = TURKISH_MONTHS.iter().position(|m| *m == month_name)? as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// "Kadıköy, Caferağa" -> (district, Some(neighborhood)); a single token is
/// district only. Values keep their original casing; folding happens at
/// match time.
pub fn parse_location(s: &str) -> Option<(String, Option<String>)> {
    let mut parts = s.splitn(2, ',');
    let district = parts.next()?.trim();
    if district.is_empty() {
        return None;
    }
    let neighborhood = parts
        .next()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    Some((district.to_string(), neighborhood))
}

/// Trim and collapse inner whitespace without changing case.
pub fn tidy_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folding_handles_turkish_letters() {
        assert_eq!(fold_text("  Kadıköy  "), "kadikoy");
        assert_eq!(fold_text("ÇAĞLAYAN"), "caglayan");
        assert_eq!(fold_text("İstanbul"), "istanbul");
        assert_eq!(fold_text("ISPARTA"), "isparta");
        assert_eq!(fold_text("Şişli   Merkez"), "sisli merkez");
    }

    #[test]
    fn price_parsing() {
        assert_eq!(parse_price("2.450.000 TL"), Some(2_450_000));
        assert_eq!(parse_price("2.450.000"), Some(2_450_000));
        assert_eq!(parse_price("  15.000 ₺ "), Some(15_000));
        assert_eq!(parse_price("1.250.000,50 TL"), Some(1_250_000));
        assert_eq!(parse_price("TL"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn area_parsing() {
        assert_eq!(parse_area("120 m2"), Some(120.0));
        assert_eq!(parse_area("120 m²"), Some(120.0));
        assert_eq!(parse_area("120,5 m2"), Some(120.5));
        assert_eq!(parse_area("garbage"), None);
        assert_eq!(parse_m2_info("130 m2 / 110 m2"), (Some(130.0), Some(110.0)));
        assert_eq!(parse_m2_info("130 m2"), (Some(130.0), None));
    }

    #[test]
    fn rooms_parsing() {
        assert_eq!(parse_rooms("3+1"), Some((3, 1)));
        assert_eq!(parse_rooms("Stüdyo"), Some((1, 0)));
        assert_eq!(parse_rooms("2"), Some((2, 0)));
        assert_eq!(parse_rooms("4.5+1"), None);
    }

    #[test]
    fn floor_parsing() {
        assert_eq!(parse_floor("5. Kat", None), Some(5));
        assert_eq!(parse_floor("Giriş Katı", None), Some(0));
        assert_eq!(parse_floor("Bahçe Katı", None), Some(0));
        assert_eq!(parse_floor("Zemin Kat", None), Some(0));
        assert_eq!(parse_floor("Yüksek Giriş", None), Some(0));
        assert_eq!(parse_floor("Kot 2", None), Some(-2));
        assert_eq!(parse_floor("Bodrum Kat", None), Some(-1));
        assert_eq!(parse_floor("Çatı Katı", Some(6)), Some(6));
        assert_eq!(parse_floor("Çatı Katı", None), None);
    }

    #[test]
    fn building_age_parsing() {
        assert_eq!(parse_building_age("Sıfır Bina"), Some(0));
        assert_eq!(parse_building_age("0"), Some(0));
        assert_eq!(parse_building_age("5-10 arası"), Some(7));
        assert_eq!(parse_building_age("21 Ve Üzeri"), Some(25));
        assert_eq!(parse_building_age("3"), Some(3));
        assert_eq!(parse_building_age("eski"), None);
    }

    #[test]
    fn boolean_parsing() {
        assert_eq!(parse_yes_no("Var"), Some(true));
        assert_eq!(parse_yes_no("Yok"), Some(false));
        assert_eq!(parse_yes_no("belki"), None);
        assert_eq!(parse_furnished("Eşyalı"), Some(true));
        assert_eq!(parse_furnished("Boş"), Some(false));
        assert_eq!(parse_furnished("Eşyasız"), Some(false));
    }

    #[test]
    fn turkish_date_parsing() {
        assert_eq!(
            parse_turkish_date("18 Ağustos 2025"),
            NaiveDate::from_ymd_opt(2025, 8, 18)
        );
        assert_eq!(
            parse_turkish_date("1 Ocak 2024"),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(parse_turkish_date("yesterday"), None);
    }

    #[test]
    fn location_parsing() {
        assert_eq!(
            parse_location("Kadıköy, Caferağa"),
            Some(("Kadıköy".to_string(), Some("Caferağa".to_string())))
        );
        assert_eq!(
            parse_location("Beşiktaş"),
            Some(("Beşiktaş".to_string(), None))
        );
        assert_eq!(parse_location("  "), None);
    }
}
